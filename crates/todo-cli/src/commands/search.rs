//! Search command implementation.

use crate::cli::SearchArgs;
use crate::error::Result;
use crate::output::Formatter;
use todo_sdk::ToDoClient;

/// Execute the search command.
pub async fn execute_search(
    args: SearchArgs,
    client: &mut ToDoClient,
    formatter: &Formatter,
) -> Result<String> {
    let todos = client
        .search(args.pattern.as_deref(), &args.tags, &args.states)
        .await?;
    formatter.format_todos(&todos)
}
