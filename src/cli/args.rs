// ABOUTME: Command line argument definitions and parsing using Clap
// ABOUTME: Defines the main CLI structure and subcommands for taskmill

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "taskmill")]
#[command(about = "A workflow engine for long-lived tasks advancing through named statuses")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Path to configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Disable colored output")]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new task in the Created status
    Create {
        #[arg(long, help = "Correlation id; a fresh UUID when omitted")]
        reference: Option<String>,

        #[arg(long, default_value = "default", help = "Task group")]
        group: String,

        #[arg(long = "type", default_value = "default", help = "Task type")]
        task_type: String,

        #[arg(long, help = "Respawn a fresh task when the workflow ends")]
        recurring: bool,

        #[arg(long, help = "Initial timeout in seconds")]
        timeout: Option<i32>,

        #[arg(long, help = "Opaque task payload")]
        properties: Option<String>,
    },

    /// Start a created task's workflow
    Start {
        #[arg(help = "Task id")]
        id: i64,
    },

    /// Deliver the outcome a suspended task was waiting on
    Notify {
        #[arg(help = "Task id")]
        id: i64,

        #[arg(help = "Wait outcome: 'success' or 'error'")]
        outcome: String,

        #[arg(short, long, help = "Diagnostic message for error outcomes")]
        message: Option<String>,
    },

    /// Show a single task
    Show {
        #[arg(help = "Task id")]
        id: i64,
    },

    /// List tasks with optional filters
    List {
        #[arg(long, help = "Filter by task group")]
        group: Option<String>,

        #[arg(long = "type", help = "Filter by task type")]
        task_type: Option<String>,

        #[arg(long, help = "Filter by status")]
        status: Option<String>,

        #[arg(long, help = "Filter by reference id prefix")]
        reference: Option<String>,

        #[arg(long, help = "Maximum number of rows")]
        limit: Option<u64>,

        #[arg(long, default_value_t = 0, help = "Number of rows to skip")]
        offset: u64,
    },

    /// Delete a task
    Delete {
        #[arg(help = "Task id")]
        id: i64,
    },
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
