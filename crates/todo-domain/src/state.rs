//! State module - lifecycle stages of a todo item

/// Lifecycle stage of a todo item
///
/// Persisted by its canonical name (see [`State::as_str`]). `NotStarted` is the
/// zero value: anything unrecognised decodes to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum State {
    /// Nothing done yet
    #[default]
    NotStarted,

    /// Being worked on
    InProgress,

    /// Finished
    Done,
}

impl State {
    /// Every state, in declaration order
    pub const ALL: [State; 3] = [State::NotStarted, State::InProgress, State::Done];

    /// Canonical name used in storage and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            State::NotStarted => "NOT_STARTED",
            State::InProgress => "IN_PROGRESS",
            State::Done => "DONE",
        }
    }

    /// Parse a canonical name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "NOT_STARTED" => Some(State::NotStarted),
            "IN_PROGRESS" => Some(State::InProgress),
            "DONE" => Some(State::Done),
            _ => None,
        }
    }

    /// Parse a canonical name, mapping unknown names to `NotStarted`
    pub fn from_name_or_default(s: &str) -> Self {
        Self::parse(s).unwrap_or_default()
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for State {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid state: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_names_roundtrip() {
        for state in State::ALL {
            assert_eq!(State::parse(state.as_str()), Some(state));
        }
    }

    #[test]
    fn test_unknown_name_is_not_started() {
        assert_eq!(State::from_name_or_default("ARCHIVED"), State::NotStarted);
        assert_eq!(State::from_name_or_default(""), State::NotStarted);
        // names are case sensitive, like the stored values
        assert_eq!(State::parse("done"), None);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("IN_PROGRESS".parse::<State>(), Ok(State::InProgress));
        assert!("later".parse::<State>().is_err());
    }
}
