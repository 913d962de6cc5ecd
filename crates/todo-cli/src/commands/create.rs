//! Create command implementation.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::cli::CreateArgs;
use crate::error::Result;
use crate::output::Formatter;
use todo_sdk::{ToDoClient, Todo};

/// Execute the create command.
pub async fn execute_create(
    args: CreateArgs,
    client: &mut ToDoClient,
    formatter: &Formatter,
) -> Result<String> {
    let reminder = args.reminder.unwrap_or_else(now);

    let todo = Todo {
        id: String::new(),
        title: args.title,
        description: args.description,
        tags: args.tags,
        state: args.state,
        reminder: Some(reminder),
    };

    let id = client.create(&todo).await?;
    formatter.created(&id)
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
