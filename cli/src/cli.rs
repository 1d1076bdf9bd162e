//! Command-line arguments.
//!
//! Every flag that configures the client can also come from the environment:
//! `CLOCKWORK_API_BASE_URL` for the API root and `CLOCKWORK_LOG` for the
//! tracing filter.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use uuid::Uuid;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5000;

#[derive(Debug, Parser)]
#[command(name = "clockwork", version, about = "Track time against projects and categories")]
pub struct Cli {
    /// Root URL of the Clockwork API.
    #[arg(
        long,
        global = true,
        env = "CLOCKWORK_API_BASE_URL",
        default_value = DEFAULT_BASE_URL
    )]
    pub base_url: String,

    /// Tracing filter, e.g. `debug` or `clockwork_core=trace`.
    #[arg(long, global = true, env = "CLOCKWORK_LOG")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the API is reachable.
    Health,
    /// Manage projects.
    Projects {
        #[command(subcommand)]
        action: ProjectCommand,
    },
    /// Manage the categories of a project.
    Categories {
        #[command(subcommand)]
        action: CategoryCommand,
    },
    /// Start, stop and inspect the active timer.
    Timer {
        #[command(subcommand)]
        action: TimerCommand,
    },
    /// List time entries for a category.
    Entries {
        #[arg(long)]
        category: Uuid,
        /// Inclusive lower bound on the start time (RFC 3339).
        #[arg(long)]
        from: Option<DateTime<Utc>>,
        /// Inclusive upper bound on the start time (RFC 3339).
        #[arg(long)]
        to: Option<DateTime<Utc>>,
    },
}

#[derive(Debug, Subcommand)]
pub enum ProjectCommand {
    List,
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    Show {
        id: Uuid,
    },
    Rename {
        id: Uuid,
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        id: Uuid,
    },
}

#[derive(Debug, Subcommand)]
pub enum CategoryCommand {
    /// Flat listing in server order.
    List {
        #[arg(long)]
        project: Uuid,
    },
    /// Sorted hierarchy.
    Tree {
        #[arg(long)]
        project: Uuid,
    },
    Create {
        #[arg(long)]
        project: Uuid,
        name: String,
        /// Parent category; omit for a top-level category.
        #[arg(long)]
        parent: Option<Uuid>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Replace name, description and parent. Omitting `--parent` moves the
    /// category to the top level.
    Update {
        #[arg(long)]
        project: Uuid,
        id: Uuid,
        name: String,
        #[arg(long)]
        parent: Option<Uuid>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        #[arg(long)]
        project: Uuid,
        id: Uuid,
    },
}

#[derive(Debug, Subcommand)]
pub enum TimerCommand {
    Start {
        #[arg(long)]
        category: Uuid,
    },
    Stop,
    Status,
    /// Poll the active timer until interrupted.
    Watch {
        #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL_MS)]
        interval_ms: u64,
    },
}
