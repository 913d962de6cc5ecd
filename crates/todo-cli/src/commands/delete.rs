//! Delete command implementation.

use crate::cli::IdArgs;
use crate::error::Result;
use crate::output::Formatter;
use todo_sdk::ToDoClient;

/// Execute the delete command.
pub async fn execute_delete(args: IdArgs, client: &mut ToDoClient, formatter: &Formatter) -> Result<String> {
    let deleted = client.delete(&args.id).await?;
    formatter.changed("deleted", &args.id, deleted)
}
