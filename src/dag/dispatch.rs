// src/dag/dispatch.rs

//! Parallel group selection and batch dispatch.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::dag::task_info::{DispatchItem, TaskRecord};
use crate::dag::TaskName;
use crate::errors::Result;
use crate::state::snapshot::{OrchestrationSnapshot, TaskStatus};

/// Expand a single ready task into a co-dispatchable batch.
///
/// Starts with the task itself, appends any of its `parallel_with` peers
/// that are *currently* ready, and truncates to `parallel_limit` entries.
/// The hints are advisory and not enforced bidirectionally: `T2` listing
/// `T1` does not pull `T2` into `T1`'s group.
pub fn select_group(
    ready: &[TaskName],
    task_id: &TaskName,
    records: &BTreeMap<TaskName, TaskRecord>,
    parallel_limit: usize,
) -> Vec<TaskName> {
    let mut group = vec![task_id.clone()];

    if let Some(record) = records.get(task_id) {
        for peer in &record.parallel_with {
            if group.len() >= parallel_limit {
                break;
            }
            if peer != task_id && !group.contains(peer) && ready.contains(peer) {
                group.push(peer.clone());
            }
        }
    }

    group.truncate(parallel_limit);
    group
}

/// Turn the ready queue into a dispatch batch, moving every selected task to
/// `InProgress` within this call.
///
/// The batch is bounded by `min(parallel_limit, max_dispatch − |InProgress|)`.
/// The ready queue is walked in FIFO order — no priority scoring; ties break
/// by insertion order — and each not-yet-chosen id is expanded via
/// [`select_group`], deduplicating against already-chosen ids, until the
/// slots are full.
pub fn dispatch(
    snapshot: &mut OrchestrationSnapshot,
    max_dispatch: usize,
) -> Result<Vec<DispatchItem>> {
    let in_progress = snapshot.tasks.count(TaskStatus::InProgress);
    let budget = max_dispatch.saturating_sub(in_progress);
    let slots = budget.min(snapshot.execution.parallel_limit);

    if slots == 0 {
        debug!(
            max_dispatch,
            in_progress, "no dispatch slots available; returning empty batch"
        );
        return Ok(Vec::new());
    }

    let ready: Vec<TaskName> = snapshot.tasks.ready_ids().to_vec();
    let mut chosen: Vec<TaskName> = Vec::new();

    'queue: for id in &ready {
        if chosen.contains(id) {
            continue;
        }
        if !snapshot.task_details.contains_key(id) {
            // Cannot happen with a validated plan.
            warn!(task = %id, "ready task has no record; skipping");
            continue;
        }

        let group = select_group(
            &ready,
            id,
            &snapshot.task_details,
            snapshot.execution.parallel_limit,
        );

        for member in group {
            if chosen.contains(&member) {
                continue;
            }
            chosen.push(member);
            if chosen.len() >= slots {
                break 'queue;
            }
        }
    }

    let mut batch = Vec::with_capacity(chosen.len());
    for id in &chosen {
        snapshot.tasks.set_status(id, TaskStatus::InProgress)?;
        if let Some(record) = snapshot.task_details.get(id) {
            info!(
                task = %id,
                phase = record.phase,
                specialist = %record.specialist,
                "dispatching task"
            );
            batch.push(DispatchItem::from_record(id, record));
        }
    }

    if !batch.is_empty() {
        snapshot.recompute_stats();
        snapshot.touch();
    }

    Ok(batch)
}
