//! Health command implementation.

use crate::error::Result;
use crate::output::Formatter;
use todo_sdk::ToDoClient;

/// Execute the health command.
pub async fn execute_health(client: &mut ToDoClient, formatter: &Formatter) -> Result<String> {
    let health = client.health().await?;
    formatter.health(&health)
}
