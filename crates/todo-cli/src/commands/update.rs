//! Update command implementation.

use crate::cli::UpdateArgs;
use crate::error::Result;
use crate::output::Formatter;
use todo_sdk::{ToDoClient, Todo};

/// Execute the update command.
pub async fn execute_update(
    args: UpdateArgs,
    client: &mut ToDoClient,
    formatter: &Formatter,
) -> Result<String> {
    let todo = Todo {
        id: args.id,
        title: args.title,
        description: args.description,
        tags: args.tags,
        state: args.state,
        reminder: args.reminder,
    };

    let updated = client.update(&todo).await?;
    formatter.changed("updated", &todo.id, updated)
}
