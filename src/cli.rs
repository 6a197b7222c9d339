// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! NOTE: this expects `clap` to be built with the `derive` feature, e.g.:
//! `clap = { version = "4.5.53", features = ["derive"] }` in `Cargo.toml`.

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `plandag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "plandag",
    version,
    about = "Orchestrate a DAG of tasks: dispatch ready work, track retries, advance phases.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the state snapshot file (JSON).
    ///
    /// A sibling `<PATH>.bak` holds the immediately-prior snapshot.
    #[arg(long, value_name = "PATH", default_value = ".plandag/state.json")]
    pub state: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PLANDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Build the initial snapshot from a plan file.
    ///
    /// Fails without producing any state if the plan contains a dependency
    /// cycle or references unknown tasks.
    Init {
        /// Path to the plan file (TOML).
        #[arg(long, value_name = "PATH", default_value = "Plandag.toml")]
        plan: String,
    },

    /// Compute the ready frontier and dispatch a batch of tasks.
    ///
    /// Dispatched tasks are moved to `in_progress` and printed to stdout as
    /// JSON, one routing record per task.
    Next {
        /// Global concurrency budget for this dispatch call.
        #[arg(long, value_name = "N", default_value_t = 5)]
        max: usize,
    },

    /// Report a status change for a task.
    Update {
        /// Task id as declared in the plan (e.g. "T2.1").
        task: String,

        /// The new status for the task.
        status: StatusArg,

        /// Error summary for a failure or a retry requeue.
        ///
        /// `update <ID> failed --error MSG` records a failure;
        /// `update <ID> ready --error MSG` requeues the task after a reported
        /// failure (both count against the task's retry budget).
        #[arg(long, value_name = "MSG")]
        error: Option<String>,
    },

    /// Print summary statistics for the run.
    Status,

    /// Report completion state of the current phase.
    Phase,

    /// Advance to the next phase, if any.
    Advance,
}

/// Task status as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum StatusArg {
    Pending,
    Ready,
    InProgress,
    Completed,
    Failed,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
