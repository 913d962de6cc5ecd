//! Client-side todo record.

use serde::{Deserialize, Serialize};
use todo_domain::State;
use todo_grpc::conversions::{state_from_wire, state_to_proto};
use todo_grpc::proto::ToDo;

/// A todo item as the SDK hands it out
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Server-assigned identifier; empty before creation
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Title
    #[serde(default)]
    pub title: String,
    /// Free-text description
    #[serde(default)]
    pub description: String,
    /// Tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Canonical state name (`NOT_STARTED`, `IN_PROGRESS`, `DONE`)
    #[serde(default = "default_state")]
    pub state: String,
    /// Reminder as Unix seconds; `None` means "not supplied"
    #[serde(default)]
    pub reminder: Option<i64>,
}

fn default_state() -> String {
    State::default().as_str().to_string()
}

impl Todo {
    /// A record with only a title set
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            state: default_state(),
            ..Default::default()
        }
    }

    /// Wire form; unknown state names are sent as `NOT_STARTED`
    pub fn to_proto(&self) -> ToDo {
        ToDo {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            tags: self.tags.clone(),
            state: state_to_proto(State::from_name_or_default(&self.state)) as i32,
            reminder: self.reminder.map(|seconds| prost_types::Timestamp { seconds, nanos: 0 }),
        }
    }

    /// Build from the wire form
    pub fn from_proto(record: ToDo) -> Self {
        Self {
            id: record.id,
            title: record.title,
            description: record.description,
            tags: record.tags,
            state: state_from_wire(record.state).as_str().to_string(),
            reminder: record.reminder.map(|ts| ts.seconds),
        }
    }
}
