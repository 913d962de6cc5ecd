//! Search criteria and the store-neutral filter they compile into

use crate::{Document, State};
use regex::Regex;

/// Optional constraints of a search request
///
/// Each field is optional: `None`, an empty pattern or an empty list all mean
/// "no constraint on that field".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    /// Regular expression matched against the description
    pub pattern: Option<String>,

    /// Tags that must all be present on a match
    pub tags: Vec<String>,

    /// Accepted states
    pub states: Vec<State>,
}

/// One constraint of a [`Filter`]
#[derive(Debug, Clone)]
pub enum Clause {
    /// Description matches the expression (unanchored unless the pattern anchors itself)
    DescriptionMatches(Regex),

    /// Stored state name is one of these canonical names
    StateIn(Vec<String>),

    /// Stored tags are a superset of these
    TagsAll(Vec<String>),
}

impl Clause {
    /// Evaluate this clause against a document
    pub fn matches(&self, document: &Document) -> bool {
        match self {
            Clause::DescriptionMatches(regex) => regex.is_match(&document.description),
            Clause::StateIn(names) => names.iter().any(|name| *name == document.state),
            Clause::TagsAll(tags) => tags.iter().all(|tag| document.tags.contains(tag)),
        }
    }
}

/// Conjunction of clauses; the empty filter matches every document
#[derive(Debug, Clone, Default)]
pub struct Filter {
    clauses: Vec<Clause>,
}

impl Filter {
    /// The filter that matches everything
    pub fn all() -> Self {
        Self::default()
    }

    /// Add a clause
    pub fn and(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    /// Clauses in insertion order
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// True when no clause constrains the result
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Reference evaluation; every store must agree with it
    pub fn matches(&self, document: &Document) -> bool {
        self.clauses.iter().all(|clause| clause.matches(document))
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.clauses.is_empty() {
            return f.write_str("{}");
        }
        let parts: Vec<String> = self
            .clauses
            .iter()
            .map(|clause| match clause {
                Clause::DescriptionMatches(regex) => format!("description =~ /{}/", regex.as_str()),
                Clause::StateIn(names) => format!("state in {:?}", names),
                Clause::TagsAll(tags) => format!("tags all {:?}", tags),
            })
            .collect();
        write!(f, "{{{}}}", parts.join(" and "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(description: &str, tags: &[&str], state: State) -> Document {
        Document {
            id: None,
            title: "t".to_string(),
            description: description.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            state: state.as_str().to_string(),
            reminder: 0,
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = Filter::all();
        assert!(filter.is_empty());
        assert!(filter.matches(&doc("", &[], State::Done)));
        assert_eq!(filter.to_string(), "{}");
    }

    #[test]
    fn test_tags_all_requires_every_tag() {
        let filter = Filter::all().and(Clause::TagsAll(vec!["a".into(), "b".into()]));

        assert!(!filter.matches(&doc("", &["a"], State::Done)));
        assert!(filter.matches(&doc("", &["b", "a"], State::Done)));
        assert!(filter.matches(&doc("", &["a", "b", "c"], State::Done)));
    }

    #[test]
    fn test_pattern_is_unanchored() {
        let filter = Filter::all().and(Clause::DescriptionMatches(Regex::new("micro").unwrap()));
        assert!(filter.matches(&doc("a micro service", &[], State::Done)));

        let anchored = Filter::all().and(Clause::DescriptionMatches(Regex::new("^micro").unwrap()));
        assert!(!anchored.matches(&doc("a micro service", &[], State::Done)));
    }

    #[test]
    fn test_clauses_are_conjunctive() {
        let filter = Filter::all()
            .and(Clause::StateIn(vec!["DONE".into()]))
            .and(Clause::TagsAll(vec!["go".into()]));

        assert!(filter.matches(&doc("", &["go"], State::Done)));
        assert!(!filter.matches(&doc("", &["go"], State::InProgress)));
        assert!(!filter.matches(&doc("", &["rust"], State::Done)));
        assert_eq!(filter.to_string(), r#"{state in ["DONE"] and tags all ["go"]}"#);
    }
}
