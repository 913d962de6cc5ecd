//! Read command implementation.

use crate::cli::IdArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use todo_sdk::ToDoClient;

/// Execute the read command.
pub async fn execute_read(args: IdArgs, client: &mut ToDoClient, formatter: &Formatter) -> Result<String> {
    match client.read(&args.id).await? {
        Some(todo) => formatter.format_todo(&todo),
        None => Err(CliError::NotFound(args.id)),
    }
}
