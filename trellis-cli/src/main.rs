//! Trellis CLI - kanban task tracking in a `.trellis` directory.
//!
//! Commands:
//! - `trellis init <name>`: Initialize a workspace in the current directory
//! - `trellis show`: Render the board, column by column
//! - `trellis add <name>`: Add a task
//! - `trellis move <id> <column>`: Move a task, optionally `--index <n>`
//! - `trellis list`: List tasks as JSON
//! - `trellis remove <id>`: Delete a task (admin only)
//!
//! Environment variables:
//! - TRELLIS_USER: Acting user when `--as` is not given
//! - RUST_LOG: Log filter (logs go to stderr)
//!
//! Exit codes:
//! - 0: Success
//! - 1: Error

mod cli;
mod commands;
mod render;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let user = commands::acting_user(cli.acting_user)?;

    match cli.command {
        Commands::Init {
            name,
            project,
            display_name,
        } => commands::init(&name, &project, &user, display_name.as_deref()).await,
        Commands::Show { project } => commands::show(&project, &user).await,
        Commands::Add {
            name,
            project,
            description,
            assignee,
            due,
            status,
        } => {
            commands::add(
                &name,
                &project,
                description.as_deref(),
                assignee.as_deref(),
                due.as_deref(),
                &status,
                &user,
            )
            .await
        }
        Commands::Move {
            id,
            to,
            project,
            index,
        } => commands::mv(&id, &to, &project, index, &user).await,
        Commands::List {
            project,
            status,
            assignee,
            search,
        } => {
            commands::list(
                &project,
                status.as_deref(),
                assignee.as_deref(),
                search.as_deref(),
                &user,
            )
            .await
        }
        Commands::Remove { id } => commands::remove(&id, &user).await,
    }
}
