//! CLI command definitions and argument parsing.

use clap::{Args, Parser, Subcommand};
use todo_domain::State;

/// Todo CLI - Manage todos on a todod server.
#[derive(Debug, Parser)]
#[command(name = "todo")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Server host
    #[arg(short = 'o', long, global = true, default_value = "localhost")]
    pub host: String,

    /// Server port
    #[arg(short, long, global = true, default_value_t = 8080)]
    pub port: u16,

    /// Per-call timeout in seconds
    #[arg(short, long, global = true, default_value_t = 3)]
    pub timeout: u64,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Server URL built from host and port
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a todo
    Create(CreateArgs),

    /// Read a todo
    Read(IdArgs),

    /// Update a todo
    Update(UpdateArgs),

    /// Delete a todo
    Delete(IdArgs),

    /// Search todos
    Search(SearchArgs),

    /// Check server liveness
    Health,

    /// Print build information
    Version,
}

/// Arguments naming one todo.
#[derive(Debug, Args)]
pub struct IdArgs {
    /// The ID of the todo
    #[arg(long)]
    pub id: String,
}

/// Arguments for the create command.
#[derive(Debug, Args)]
pub struct CreateArgs {
    /// The title of the todo
    #[arg(long, default_value = "title")]
    pub title: String,

    /// The description of the todo
    #[arg(long, default_value = "description")]
    pub description: String,

    /// The state [NOT_STARTED, IN_PROGRESS, DONE]
    #[arg(long, default_value = "NOT_STARTED", value_parser = parse_state)]
    pub state: String,

    /// The tags tag1,...,tagN
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// The reminder as Unix seconds (defaults to now)
    #[arg(long)]
    pub reminder: Option<i64>,
}

/// Arguments for the update command.
///
/// Empty title and description keep the stored values; tags and state are
/// always replaced.
#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// The ID of the todo
    #[arg(long)]
    pub id: String,

    /// The new title (kept when empty)
    #[arg(long, default_value = "")]
    pub title: String,

    /// The new description (kept when empty)
    #[arg(long, default_value = "")]
    pub description: String,

    /// The state [NOT_STARTED, IN_PROGRESS, DONE]
    #[arg(long, default_value = "NOT_STARTED", value_parser = parse_state)]
    pub state: String,

    /// The tags tag1,...,tagN
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// The reminder as Unix seconds (kept when omitted)
    #[arg(long)]
    pub reminder: Option<i64>,
}

/// Arguments for the search command.
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Regular expression matched against the description
    #[arg(long)]
    pub pattern: Option<String>,

    /// Only todos carrying all of these tags
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Only todos in one of these states
    #[arg(long, value_delimiter = ',', value_parser = parse_state)]
    pub states: Vec<String>,
}

/// Accept a state name in any case and return its canonical form.
pub fn parse_state(s: &str) -> Result<String, String> {
    State::parse(&s.trim().to_uppercase())
        .map(|state| state.as_str().to_string())
        .ok_or_else(|| format!("unknown state '{}', expected NOT_STARTED, IN_PROGRESS or DONE", s))
}
