// src/state/snapshot.rs

//! The orchestration snapshot: the aggregate the whole engine operates on.
//!
//! The snapshot is the durable system of record. It is created once from a
//! validated, acyclic plan, mutated only through the status state machine,
//! the dispatcher and the phase manager, and written back in full after every
//! operation.
//!
//! Task statuses are held in a single `id -> status` map
//! ([`StatusBuckets`]) rather than five parallel lists, so the partition
//! invariant — every id lives in exactly one bucket — holds by construction
//! instead of by call-site discipline. The five disjoint lists of the
//! persisted layout are a serialization view; loading a document whose lists
//! overlap is rejected as corrupt.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dag::resolver::compute_ready;
use crate::dag::task_info::TaskRecord;
use crate::dag::{detect_cycle, TaskName};
use crate::errors::{PlandagError, Result};
use crate::plan::model::PlanFile;

/// Maximum number of entries retained in the error log.
pub const ERROR_LOG_CAP: usize = 50;

/// Maximum length of a stored error summary, in characters.
pub const SUMMARY_MAX_CHARS: usize = 100;

/// Task status in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Waiting on prerequisites.
    Pending,
    /// All prerequisites completed; eligible for dispatch.
    Ready,
    /// Handed to an external worker; awaiting its report.
    InProgress,
    /// Finished successfully.
    Completed,
    /// Failed (possibly terminally, once the retry budget is spent).
    Failed,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Ready => "ready",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// The five status buckets, stored as a single partition-enforcing map.
///
/// The `ready` bucket additionally carries a FIFO order: dispatch walks it in
/// promotion order, and the persisted `ready` list preserves it across runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(into = "TaskLists", try_from = "TaskLists")]
pub struct StatusBuckets {
    status: HashMap<TaskName, TaskStatus>,
    ready_order: Vec<TaskName>,
}

impl StatusBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a task during initial snapshot construction.
    pub fn seed(&mut self, id: TaskName, status: TaskStatus) {
        if status == TaskStatus::Ready {
            self.ready_order.push(id.clone());
        }
        self.status.insert(id, status);
    }

    pub fn status_of(&self, id: &str) -> Option<TaskStatus> {
        self.status.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.status.contains_key(id)
    }

    /// Move a task between buckets; the single chokepoint that keeps the
    /// ready FIFO consistent with the map.
    ///
    /// Returns the previous status, or `UnknownTask` if the id is absent —
    /// a caller error that must fail loudly rather than silently no-op.
    pub fn set_status(&mut self, id: &str, new_status: TaskStatus) -> Result<TaskStatus> {
        let Some(slot) = self.status.get_mut(id) else {
            return Err(PlandagError::UnknownTask(id.to_string()));
        };
        let old_status = *slot;
        *slot = new_status;

        if old_status == TaskStatus::Ready && new_status != TaskStatus::Ready {
            self.ready_order.retain(|t| t != id);
        } else if new_status == TaskStatus::Ready && old_status != TaskStatus::Ready {
            self.ready_order.push(id.to_string());
        }

        Ok(old_status)
    }

    /// Ids currently in the ready bucket, in dispatch (FIFO) order.
    pub fn ready_ids(&self) -> &[TaskName] {
        &self.ready_order
    }

    /// Ids currently in the given bucket, sorted for determinism.
    ///
    /// For `Ready` this sorts too; use [`ready_ids`](Self::ready_ids) when
    /// dispatch order matters.
    pub fn ids_with(&self, status: TaskStatus) -> Vec<TaskName> {
        let mut ids: Vec<TaskName> = self
            .status
            .iter()
            .filter(|(_, s)| **s == status)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    pub fn completed_set(&self) -> HashSet<TaskName> {
        self.status
            .iter()
            .filter(|(_, s)| **s == TaskStatus::Completed)
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn count(&self, status: TaskStatus) -> usize {
        self.status.values().filter(|s| **s == status).count()
    }

    pub fn len(&self) -> usize {
        self.status.len()
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_empty()
    }
}

/// Persisted view of [`StatusBuckets`]: five disjoint lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TaskLists {
    #[serde(default)]
    pending: Vec<TaskName>,
    #[serde(default)]
    ready: Vec<TaskName>,
    #[serde(default)]
    in_progress: Vec<TaskName>,
    #[serde(default)]
    completed: Vec<TaskName>,
    #[serde(default)]
    failed: Vec<TaskName>,
}

impl From<StatusBuckets> for TaskLists {
    fn from(buckets: StatusBuckets) -> Self {
        Self {
            pending: buckets.ids_with(TaskStatus::Pending),
            ready: buckets.ready_order.clone(),
            in_progress: buckets.ids_with(TaskStatus::InProgress),
            completed: buckets.ids_with(TaskStatus::Completed),
            failed: buckets.ids_with(TaskStatus::Failed),
        }
    }
}

impl TryFrom<TaskLists> for StatusBuckets {
    type Error = String;

    fn try_from(lists: TaskLists) -> std::result::Result<Self, Self::Error> {
        let mut buckets = StatusBuckets::new();

        let tagged = [
            (TaskStatus::Pending, &lists.pending),
            (TaskStatus::Ready, &lists.ready),
            (TaskStatus::InProgress, &lists.in_progress),
            (TaskStatus::Completed, &lists.completed),
            (TaskStatus::Failed, &lists.failed),
        ];

        for (status, ids) in tagged {
            for id in ids {
                if buckets.status.contains_key(id.as_str()) {
                    return Err(format!(
                        "task '{id}' appears in more than one status bucket"
                    ));
                }
                buckets.seed(id.clone(), status);
            }
        }

        Ok(buckets)
    }
}

/// One recorded failure (or retry requeue) of a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorLogEntry {
    pub task_id: TaskName,
    pub timestamp: DateTime<Utc>,
    pub error_summary: String,
    pub retry_number: u32,
}

impl ErrorLogEntry {
    /// Build an entry with the summary truncated to
    /// [`SUMMARY_MAX_CHARS`] characters.
    pub fn new(task_id: &str, error_summary: &str, retry_number: u32) -> Self {
        Self {
            task_id: task_id.to_string(),
            timestamp: Utc::now(),
            error_summary: error_summary.chars().take(SUMMARY_MAX_CHARS).collect(),
            retry_number,
        }
    }
}

/// Bounded ring of the most recent failures, oldest evicted first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorLog {
    entries: Vec<ErrorLogEntry>,
}

impl ErrorLog {
    pub fn push(&mut self, entry: ErrorLogEntry) {
        self.entries.push(entry);
        if self.entries.len() > ERROR_LOG_CAP {
            let excess = self.entries.len() - ERROR_LOG_CAP;
            self.entries.drain(..excess);
        }
    }

    pub fn entries(&self) -> &[ErrorLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Global execution settings carried in the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionContext {
    pub current_phase: u32,

    /// Maximum size of a single dispatch batch.
    pub parallel_limit: usize,

    /// How many phases `advance_phase` has moved past so far.
    #[serde(default)]
    pub phases_completed: u32,
}

/// Derived summary statistics; never mutated independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub success_rate: f64,
}

impl Stats {
    pub fn from_buckets(buckets: &StatusBuckets) -> Self {
        let total = buckets.len();
        let completed = buckets.count(TaskStatus::Completed);
        let failed = buckets.count(TaskStatus::Failed);
        let success_rate = if total > 0 {
            completed as f64 / total as f64
        } else {
            0.0
        };
        Self {
            total,
            completed,
            failed,
            success_rate,
        }
    }
}

/// The aggregate root: everything the engine persists between invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationSnapshot {
    /// Optimistic-concurrency stamp, bumped by the store on every save.
    pub version: u64,

    pub execution: ExecutionContext,

    /// Status buckets, persisted as five disjoint lists under `tasks`.
    pub tasks: StatusBuckets,

    /// Static per-task records, keyed by task id.
    pub task_details: BTreeMap<TaskName, TaskRecord>,

    /// Failure-driven retry counters; monotonically non-decreasing.
    #[serde(default)]
    pub retry_counts: BTreeMap<TaskName, u32>,

    #[serde(default)]
    pub error_log: ErrorLog,

    pub stats: Stats,

    pub updated_at: DateTime<Utc>,
}

impl OrchestrationSnapshot {
    /// Refresh the ready bucket from current pending/completed membership.
    ///
    /// Stateless and idempotent: promotion order is the sorted pending scan
    /// order, appended to the existing ready FIFO. Returns how many tasks
    /// were promoted.
    pub fn refresh_ready(&mut self) -> Result<usize> {
        let pending = self.tasks.ids_with(TaskStatus::Pending);
        let completed = self.tasks.completed_set();
        let (ready, _still_pending) = compute_ready(&pending, &completed, &self.task_details);

        for id in &ready {
            self.tasks.set_status(id, TaskStatus::Ready)?;
        }

        if !ready.is_empty() {
            debug!(promoted = ready.len(), "readiness pass promoted tasks");
            self.recompute_stats();
        }

        Ok(ready.len())
    }

    /// Recompute derived stats from bucket cardinalities.
    pub fn recompute_stats(&mut self) {
        self.stats = Stats::from_buckets(&self.tasks);
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn retries_of(&self, id: &str) -> u32 {
        self.retry_counts.get(id).copied().unwrap_or(0)
    }
}

/// Construct the initial snapshot from a validated plan.
///
/// The cycle check runs first and is fatal: no partial state is produced.
/// Bucket membership is seeded from each task's source-declared `completed`
/// flag, followed by a single readiness pass.
pub fn build_initial_snapshot(plan: &PlanFile) -> Result<OrchestrationSnapshot> {
    let task_details = TaskRecord::records_from_specs(&plan.task);

    if let Some(path) = detect_cycle(&task_details) {
        return Err(PlandagError::CircularDependency { path });
    }

    let mut tasks = StatusBuckets::new();
    for (id, spec) in plan.task.iter() {
        let status = if spec.completed {
            TaskStatus::Completed
        } else {
            TaskStatus::Pending
        };
        tasks.seed(id.clone(), status);
    }

    let stats = Stats::from_buckets(&tasks);
    let mut snapshot = OrchestrationSnapshot {
        version: 0,
        execution: ExecutionContext {
            current_phase: plan.execution.current_phase,
            parallel_limit: plan.execution.parallel_limit,
            phases_completed: 0,
        },
        tasks,
        task_details,
        retry_counts: BTreeMap::new(),
        error_log: ErrorLog::default(),
        stats,
        updated_at: Utc::now(),
    };

    snapshot.refresh_ready()?;

    Ok(snapshot)
}
