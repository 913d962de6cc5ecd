//! Output formatting for the CLI.

use crate::error::Result;
use colored::*;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};
use todo_domain::BuildInfo;
use todo_sdk::{HealthStatus, Todo};

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a list of todos.
    pub fn format_todos(&self, todos: &[Todo]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(todos)?),
            OutputFormat::Table => Ok(self.format_todos_table(todos)),
        }
    }

    /// Format a single todo.
    pub fn format_todo(&self, todo: &Todo) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(todo)?),
            OutputFormat::Table => Ok(self.format_todos_table(std::slice::from_ref(todo))),
        }
    }

    fn format_todos_table(&self, todos: &[Todo]) -> String {
        if todos.is_empty() {
            return self.colorize("No todos found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["ID", "Title", "Description", "Tags", "State", "Reminder"]);

        for todo in todos {
            let tags = todo.tags.join(",");
            let reminder = todo.reminder.map(|r| r.to_string()).unwrap_or_default();
            builder.push_record([
                todo.id.as_str(),
                todo.title.as_str(),
                todo.description.as_str(),
                tags.as_str(),
                todo.state.as_str(),
                reminder.as_str(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format the ID of a created todo.
    pub fn created(&self, id: &str) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::json!({ "id": id }).to_string()),
            OutputFormat::Table => Ok(self.success(&format!("Todo created: {}", id))),
        }
    }

    /// Format the outcome of an update or delete.
    pub fn changed(&self, operation: &str, id: &str, changed: bool) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let mut value = serde_json::json!({ "id": id });
                value[operation] = serde_json::Value::Bool(changed);
                Ok(value.to_string())
            }
            OutputFormat::Table if changed => Ok(self.success(&format!("Todo {}: {}", operation, id))),
            OutputFormat::Table => Ok(self.warning(&format!("Nothing {} for {}", operation, id))),
        }
    }

    /// Format a liveness answer, with the failure reason when there is one.
    pub fn health(&self, health: &HealthStatus) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::json!({
                "status": health.status,
                "failure": health.failure,
            })
            .to_string()),
            OutputFormat::Table if health.is_serving() => Ok(self.success(&health.status)),
            OutputFormat::Table => match &health.failure {
                Some(failure) => Ok(self.error(&format!("{}: {}", health.status, failure))),
                None => Ok(self.error(&health.status)),
            },
        }
    }

    /// Format build information.
    pub fn version(&self, build: &BuildInfo) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::json!({
                "version": build.version,
                "build_time": build.build_time,
                "git_commit": build.git_commit,
                "git_describe": build.git_describe,
                "git_dirty": build.git_dirty,
            })
            .to_string()),
            OutputFormat::Table => Ok(build.to_string()),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}
