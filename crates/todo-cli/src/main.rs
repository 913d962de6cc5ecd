//! Todo CLI - Command-line client for todod.

use std::time::Duration;

use clap::Parser;
use todo_cli::commands;
use todo_cli::{Cli, Command, Formatter, OutputFormat};
use todo_domain::BuildInfo;
use todo_sdk::ToDoClient;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> todo_cli::Result<()> {
    let cli = Cli::parse();
    let endpoint = cli.endpoint();
    let timeout = Duration::from_secs(cli.timeout);

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };
    let formatter = Formatter::new(format, !cli.no_color);

    if let Command::Version = cli.command {
        println!("{}", formatter.version(&BuildInfo::current())?);
        return Ok(());
    }

    // Commands that talk to the server
    let mut client = ToDoClient::connect(endpoint).await?.with_timeout(timeout);

    let output = match cli.command {
        Command::Create(args) => commands::execute_create(args, &mut client, &formatter).await?,
        Command::Read(args) => commands::execute_read(args, &mut client, &formatter).await?,
        Command::Update(args) => commands::execute_update(args, &mut client, &formatter).await?,
        Command::Delete(args) => commands::execute_delete(args, &mut client, &formatter).await?,
        Command::Search(args) => commands::execute_search(args, &mut client, &formatter).await?,
        Command::Health => commands::execute_health(&mut client, &formatter).await?,
        Command::Version => formatter.version(&BuildInfo::current())?,
    };

    println!("{}", output);
    Ok(())
}
