//! Type conversions between proto and domain types
//!
//! Handles bidirectional conversion between the wire record (`proto::ToDo`)
//! and the persisted document, plus identifier decoding.

use crate::error::ServiceError;
use crate::proto::{self, to_do};
use todo_domain::{Document, DocumentId, DocumentUpdate, SearchCriteria, State};

/// Convert proto State to domain State
pub fn state_from_proto(state: to_do::State) -> State {
    match state {
        to_do::State::NotStarted => State::NotStarted,
        to_do::State::InProgress => State::InProgress,
        to_do::State::Done => State::Done,
    }
}

/// Convert domain State to proto State
pub fn state_to_proto(state: State) -> to_do::State {
    match state {
        State::NotStarted => to_do::State::NotStarted,
        State::InProgress => to_do::State::InProgress,
        State::Done => to_do::State::Done,
    }
}

/// Decode a raw enum value; unrecognised values become `NotStarted`
pub fn state_from_wire(value: i32) -> State {
    to_do::State::try_from(value)
        .map(state_from_proto)
        .unwrap_or_default()
}

/// Decode a wire identifier into a store key
pub fn parse_id(id: &str) -> Result<DocumentId, ServiceError> {
    DocumentId::parse(id).map_err(ServiceError::from)
}

/// Convert proto ToDo to a document ready for insertion
///
/// Any caller-supplied identifier is dropped; the store assigns one.
pub fn record_to_document(record: proto::ToDo) -> Document {
    Document {
        id: None,
        title: record.title,
        description: record.description,
        tags: record.tags,
        state: state_from_wire(record.state).as_str().to_string(),
        reminder: record.reminder.map(|ts| ts.seconds).unwrap_or(0),
    }
}

/// Convert a document to proto ToDo
pub fn document_to_record(document: Document) -> proto::ToDo {
    proto::ToDo {
        id: document.id.map(|id| id.to_string()).unwrap_or_default(),
        title: document.title,
        description: document.description,
        tags: document.tags,
        state: state_to_proto(State::from_name_or_default(&document.state)) as i32,
        reminder: Some(prost_types::Timestamp {
            seconds: document.reminder,
            nanos: 0,
        }),
    }
}

/// Split an update request into the target key and the partial update
///
/// Tags and state are always overwritten. Empty title and description mean
/// "not supplied", and so does an absent reminder.
pub fn record_to_update(record: proto::ToDo) -> Result<(DocumentId, DocumentUpdate), ServiceError> {
    let id = parse_id(&record.id)?;
    let update = DocumentUpdate {
        title: Some(record.title).filter(|t| !t.is_empty()),
        description: Some(record.description).filter(|d| !d.is_empty()),
        tags: record.tags,
        state: state_from_wire(record.state).as_str().to_string(),
        reminder: record.reminder.map(|ts| ts.seconds),
    };
    Ok((id, update))
}

/// Convert a search request to search criteria
pub fn criteria_from_proto(request: proto::SearchRequest) -> SearchCriteria {
    SearchCriteria {
        pattern: Some(request.pattern).filter(|p| !p.is_empty()),
        tags: request.tags,
        states: request.states.into_iter().map(state_from_wire).collect(),
    }
}
