//! Build metadata injected at compile time
//!
//! Set `TODO_VERSION`, `TODO_GIT_COMMIT`, `TODO_GIT_DESCRIBE`, `TODO_GIT_DIRTY`
//! and `TODO_BUILD_TIME` in the build environment to fill these in.

use std::fmt;

/// Immutable description of the running build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    /// Release version
    pub version: &'static str,
    /// Commit hash
    pub git_commit: &'static str,
    /// `git describe` output
    pub git_describe: &'static str,
    /// Whether the tree had local changes
    pub git_dirty: &'static str,
    /// Build timestamp
    pub build_time: &'static str,
}

impl BuildInfo {
    /// Metadata captured when this crate was compiled
    pub const fn current() -> Self {
        Self {
            version: match option_env!("TODO_VERSION") {
                Some(v) => v,
                None => env!("CARGO_PKG_VERSION"),
            },
            git_commit: match option_env!("TODO_GIT_COMMIT") {
                Some(v) => v,
                None => "No GitCommit Provided",
            },
            git_describe: match option_env!("TODO_GIT_DESCRIBE") {
                Some(v) => v,
                None => "No GitDescribe Provided",
            },
            git_dirty: match option_env!("TODO_GIT_DIRTY") {
                Some(v) => v,
                None => "No GitDirty Provided",
            },
            build_time: match option_env!("TODO_BUILD_TIME") {
                Some(v) => v,
                None => "No BuildTime Provided",
            },
        }
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "version:{:?}\tbuild-time:{:?}\tgit-commit:{:?}\tgit-describe:{:?}\tgit-dirty:{:?}",
            self.version, self.build_time, self.git_commit, self.git_describe, self.git_dirty
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_format() {
        let info = BuildInfo {
            version: "1.2.3",
            git_commit: "abc",
            git_describe: "v1.2.3-1-gabc",
            git_dirty: "false",
            build_time: "2020-01-01",
        };
        assert_eq!(
            info.to_string(),
            "version:\"1.2.3\"\tbuild-time:\"2020-01-01\"\tgit-commit:\"abc\"\tgit-describe:\"v1.2.3-1-gabc\"\tgit-dirty:\"false\""
        );
    }

    #[test]
    fn test_current_has_a_version() {
        assert!(!BuildInfo::current().version.is_empty());
    }
}
