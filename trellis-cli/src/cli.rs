//! CLI definition for the trellis command-line interface.

use clap::{Parser, Subcommand};

/// Trellis - kanban task tracking in a `.trellis` directory.
///
/// One repository holds one workspace. Tasks live as JSON files under
/// `.trellis/`, discovered by walking up from the current directory, so the
/// board travels with the repo.
#[derive(Parser, Debug)]
#[command(name = "trellis")]
#[command(version)]
#[command(about = "Kanban task tracking in a .trellis directory")]
pub struct Cli {
    /// Act as this user (defaults to $TRELLIS_USER)
    #[arg(long = "as", global = true, value_name = "USER")]
    pub acting_user: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a workspace in the current directory
    Init {
        /// Workspace name
        name: String,
        /// Name of the first project
        #[arg(long, default_value = "main")]
        project: String,
        /// Display name for the acting user, who becomes the admin
        #[arg(long, value_name = "NAME")]
        display_name: Option<String>,
    },

    /// Show the board, column by column
    Show {
        /// Project name or id
        #[arg(long, default_value = "main")]
        project: String,
    },

    /// Add a task
    Add {
        /// Task name
        name: String,
        /// Project name or id
        #[arg(long, default_value = "main")]
        project: String,
        /// Detailed description
        #[arg(long)]
        description: Option<String>,
        /// Assignee user id (defaults to the acting user)
        #[arg(long)]
        assignee: Option<String>,
        /// Due date, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        due: Option<String>,
        /// Initial column (backlog, todo, in-progress, in-review, done)
        #[arg(long, default_value = "backlog")]
        status: String,
    },

    /// Move a task to a column, optionally at an index
    Move {
        /// Task id
        id: String,
        /// Destination column
        to: String,
        /// Project name or id
        #[arg(long, default_value = "main")]
        project: String,
        /// Insertion index within the column (defaults to the end)
        #[arg(long)]
        index: Option<usize>,
    },

    /// List tasks as JSON
    List {
        /// Project name or id
        #[arg(long, default_value = "main")]
        project: String,
        /// Restrict to one column
        #[arg(long)]
        status: Option<String>,
        /// Restrict to one assignee
        #[arg(long)]
        assignee: Option<String>,
        /// Case-insensitive substring match on the name
        #[arg(long)]
        search: Option<String>,
    },

    /// Delete a task (admin only)
    Remove {
        /// Task id
        id: String,
    },
}
