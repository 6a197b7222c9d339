// src/lib.rs

pub mod cli;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod plan;
pub mod state;

use anyhow::Result;
use tracing::info;

use crate::cli::{CliArgs, Command, StatusArg};
use crate::dag::Transition;
use crate::engine::Engine;
use crate::plan::loader::load_and_validate;
use crate::state::snapshot::TaskStatus;
use crate::state::store::JsonFileStore;

/// High-level entry point used by `main.rs`.
///
/// Wires together plan loading, the snapshot store and the engine facade,
/// then runs a single boundary operation. Results go to stdout as JSON;
/// logs go to stderr.
pub fn run(args: CliArgs) -> Result<()> {
    let engine = Engine::new(JsonFileStore::new(&args.state));

    match args.command {
        Command::Init { plan } => {
            let plan = load_and_validate(&plan)?;
            let snapshot = engine.init(&plan)?;
            println!("{}", serde_json::to_string_pretty(&snapshot.stats)?);
        }
        Command::Next { max } => {
            let batch = engine.next(max)?;
            info!(dispatched = batch.len(), "dispatch complete");
            println!("{}", serde_json::to_string_pretty(&batch)?);
        }
        Command::Update {
            task,
            status,
            error,
        } => {
            engine.update(&task, transition_from_args(status, error))?;
            println!("ok");
        }
        Command::Status => {
            let stats = engine.status()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::Phase => {
            let report = engine.phase_check()?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Advance => {
            let advanced = engine.advance_phase()?;
            println!("{advanced}");
        }
    }

    Ok(())
}

/// Map the CLI surface onto transition kinds.
///
/// `failed` is always a failure-class transition (a missing `--error` still
/// counts against the retry budget, with a placeholder summary); `ready`
/// with `--error` is a retry requeue rather than a fresh readiness move.
fn transition_from_args(status: StatusArg, error: Option<String>) -> Transition {
    match (status, error) {
        (StatusArg::Failed, summary) => {
            Transition::Fail(summary.unwrap_or_else(|| "unspecified failure".to_string()))
        }
        (StatusArg::Ready, Some(summary)) => Transition::Requeue(summary),
        (status, _) => Transition::To(task_status_from_arg(status)),
    }
}

fn task_status_from_arg(status: StatusArg) -> TaskStatus {
    match status {
        StatusArg::Pending => TaskStatus::Pending,
        StatusArg::Ready => TaskStatus::Ready,
        StatusArg::InProgress => TaskStatus::InProgress,
        StatusArg::Completed => TaskStatus::Completed,
        StatusArg::Failed => TaskStatus::Failed,
    }
}
