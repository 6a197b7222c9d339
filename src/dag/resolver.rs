// src/dag/resolver.rs

//! Stateless readiness recomputation.
//!
//! This is deliberately *not* a one-shot topological sort: the ready set is
//! recomputed from scratch after every status mutation, purely as a function
//! of `(pending, completed, records)`. Cost is O(P * D) per call, which buys
//! simplicity and self-healing — there are no auxiliary in-degree counters
//! that can drift out of sync, and calling it twice with no intervening
//! mutation yields an identical result.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, warn};

use crate::dag::task_info::TaskRecord;
use crate::dag::TaskName;

/// Split the pending set into tasks that are now ready and tasks that must
/// keep waiting.
///
/// A pending task is promoted iff every id in its `depends_on` set is present
/// in `completed`. Order of `pending` is preserved in both outputs.
///
/// Note the deliberate asymmetry with the cycle detector: a `depends_on` id
/// absent from `records` is *skipped* there, but here it can simply never
/// appear in `completed`, so the dependent task is starved in pending
/// forever. Plan validation rejects such references up front; this function
/// keeps the contract observable for hand-built graphs.
pub fn compute_ready(
    pending: &[TaskName],
    completed: &HashSet<TaskName>,
    records: &BTreeMap<TaskName, TaskRecord>,
) -> (Vec<TaskName>, Vec<TaskName>) {
    let mut ready = Vec::new();
    let mut still_pending = Vec::new();

    for id in pending {
        let Some(record) = records.get(id) else {
            // Cannot happen with a validated plan.
            warn!(task = %id, "pending task has no record; leaving it pending");
            still_pending.push(id.clone());
            continue;
        };

        let satisfied = record.depends_on.iter().all(|dep| completed.contains(dep));

        if satisfied {
            debug!(task = %id, "all prerequisites completed; promoting to ready");
            ready.push(id.clone());
        } else {
            still_pending.push(id.clone());
        }
    }

    (ready, still_pending)
}
