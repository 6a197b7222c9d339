// src/dag/phase.rs

//! Phase completion and advancement.
//!
//! Phase membership is derived from `TaskRecord.phase`, never stored
//! separately. A phase counts as complete once every member has *resolved* —
//! completed or permanently failed; tasks starved by a failed prerequisite
//! keep a phase open indefinitely, which is the intended consequence of the
//! dependency model.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, info};

use crate::dag::task_info::TaskRecord;
use crate::dag::TaskName;
use crate::state::snapshot::{OrchestrationSnapshot, TaskStatus};

/// Completion report for the snapshot's current phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseReport {
    pub phase: u32,
    pub completed: bool,
    pub total: usize,
    pub done: usize,
    /// Member tasks not yet resolved, sorted.
    pub remaining: Vec<TaskName>,
}

/// Ids of all tasks belonging to the given phase, sorted.
pub fn phase_tasks(records: &BTreeMap<TaskName, TaskRecord>, phase: u32) -> Vec<TaskName> {
    records
        .iter()
        .filter(|(_, record)| record.phase == phase)
        .map(|(id, _)| id.clone())
        .collect()
}

/// Report whether every task in the current phase has resolved.
pub fn check_completion(snapshot: &OrchestrationSnapshot) -> PhaseReport {
    let phase = snapshot.execution.current_phase;
    let members = phase_tasks(&snapshot.task_details, phase);
    let total = members.len();

    let remaining: Vec<TaskName> = members
        .into_iter()
        .filter(|id| {
            !matches!(
                snapshot.tasks.status_of(id),
                Some(TaskStatus::Completed) | Some(TaskStatus::Failed)
            )
        })
        .collect();

    let report = PhaseReport {
        phase,
        completed: remaining.is_empty(),
        total,
        done: total - remaining.len(),
        remaining,
    };
    debug!(
        phase,
        total = report.total,
        done = report.done,
        completed = report.completed,
        "checked phase completion"
    );
    report
}

/// Move `current_phase` to the next higher distinct phase value.
///
/// Returns `false` without changing anything when already at the last phase —
/// a normal terminal condition, not an error.
pub fn advance_phase(snapshot: &mut OrchestrationSnapshot) -> bool {
    let phases: BTreeSet<u32> = snapshot
        .task_details
        .values()
        .map(|record| record.phase)
        .collect();

    let current = snapshot.execution.current_phase;
    let Some(next) = phases.iter().copied().find(|p| *p > current) else {
        debug!(phase = current, "already at the last phase; not advancing");
        return false;
    };

    snapshot.execution.current_phase = next;
    snapshot.execution.phases_completed += 1;
    snapshot.touch();
    info!(from = current, to = next, "advanced to next phase");
    true
}
