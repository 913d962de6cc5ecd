//! Search filter construction
//!
//! Only criteria that are present and non-empty add a clause, so an empty
//! request compiles to the match-everything filter.

use crate::error::ServiceError;
use regex::Regex;
use todo_domain::{Clause, Filter, SearchCriteria};

/// Build a store filter from search criteria
///
/// # Errors
/// Returns [`ServiceError::InvalidPattern`] if the pattern is not a valid
/// regular expression.
pub fn build_filter(criteria: &SearchCriteria) -> Result<Filter, ServiceError> {
    let mut filter = Filter::all();

    if let Some(pattern) = criteria.pattern.as_deref().filter(|p| !p.is_empty()) {
        filter = filter.and(Clause::DescriptionMatches(Regex::new(pattern)?));
    }

    if !criteria.states.is_empty() {
        let names = criteria.states.iter().map(|s| s.as_str().to_string()).collect();
        filter = filter.and(Clause::StateIn(names));
    }

    if !criteria.tags.is_empty() {
        filter = filter.and(Clause::TagsAll(criteria.tags.clone()));
    }

    Ok(filter)
}
