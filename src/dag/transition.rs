// src/dag/transition.rs

//! The status state machine: the only mutator of task status outside
//! dispatch.
//!
//! Encodes the retry/failure escalation policy: failure-class transitions
//! increment the task's retry counter and append to the bounded error log,
//! and a task whose counter reaches [`RETRY_LIMIT`] is forced into `Failed`
//! terminally, whatever transition was requested. Exhaustion never aborts the
//! run — independent branches of the DAG keep making progress, and dependents
//! of a permanently-failed task simply never become ready.

use tracing::{debug, warn};

use crate::errors::{PlandagError, Result};
use crate::state::snapshot::{ErrorLogEntry, OrchestrationSnapshot, TaskStatus};

/// Failure-driven retries allowed before a task is pinned in `Failed`.
pub const RETRY_LIMIT: u32 = 10;

/// A requested status change for a task.
///
/// `Fail` and `Requeue` are the failure-class transitions; a plain
/// `To(Ready)` is a fresh readiness move and never touches the retry
/// counter. (An earlier shape of this API overloaded "`Ready` with an error
/// summary" to mean a retry requeue; the distinct kind removes that
/// ambiguity.)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Move to the given status with no retry accounting.
    To(TaskStatus),
    /// The external worker reported a failure.
    Fail(String),
    /// Put a previously-failed task back in the ready queue for another
    /// attempt.
    Requeue(String),
}

/// Apply a status transition to the snapshot.
///
/// Fails loudly with `UnknownTask` if the id is not in any bucket. Derived
/// stats are recomputed before returning.
pub fn apply_transition(
    snapshot: &mut OrchestrationSnapshot,
    task_id: &str,
    transition: Transition,
) -> Result<()> {
    if !snapshot.tasks.contains(task_id) {
        return Err(PlandagError::UnknownTask(task_id.to_string()));
    }

    let (requested, failure_summary) = match transition {
        Transition::To(status) => (status, None),
        Transition::Fail(summary) => (TaskStatus::Failed, Some(summary)),
        Transition::Requeue(summary) => (TaskStatus::Ready, Some(summary)),
    };

    if let Some(summary) = failure_summary {
        let counter = snapshot
            .retry_counts
            .entry(task_id.to_string())
            .or_insert(0);
        *counter += 1;
        let retry_number = *counter;

        snapshot
            .error_log
            .push(ErrorLogEntry::new(task_id, &summary, retry_number));

        warn!(
            task = %task_id,
            retry = retry_number,
            summary = %summary,
            "recorded task failure"
        );
    }

    // Hard cap: once the budget is spent the task cannot re-enter
    // circulation from this engine, whatever the caller asked for.
    let target = if snapshot.retries_of(task_id) >= RETRY_LIMIT {
        if requested != TaskStatus::Failed {
            warn!(
                task = %task_id,
                requested = %requested,
                "retry budget exhausted; forcing task into failed"
            );
        }
        TaskStatus::Failed
    } else {
        requested
    };

    let old_status = snapshot.tasks.set_status(task_id, target)?;
    debug!(task = %task_id, from = %old_status, to = %target, "applied status transition");

    snapshot.recompute_stats();
    snapshot.touch();

    Ok(())
}
