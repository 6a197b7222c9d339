// src/dag/task_info.rs

//! Static task metadata and the dispatch routing record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dag::TaskName;
use crate::plan::model::TaskSpec;

/// Static information about a task, fixed at graph-build time.
///
/// Records are keyed by task id in a `BTreeMap` (the id is the map key, not a
/// field), which both matches the persisted `task_details` layout and keeps
/// iteration deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Phase this task belongs to.
    pub phase: u32,

    /// Prerequisite task ids; edges point at prerequisites.
    #[serde(default)]
    pub depends_on: Vec<TaskName>,

    /// Advisory co-schedulability hints; not enforced bidirectionally.
    #[serde(default)]
    pub parallel_with: Vec<TaskName>,

    /// Which kind of external worker should execute this task.
    #[serde(default = "crate::plan::model::default_specialist")]
    pub specialist: String,
}

impl TaskRecord {
    pub fn from_spec(spec: &TaskSpec) -> Self {
        Self {
            phase: spec.phase,
            depends_on: spec.depends_on.clone(),
            parallel_with: spec.parallel_with.clone(),
            specialist: spec.specialist.clone(),
        }
    }

    /// Build the record map for a whole plan's task table.
    pub fn records_from_specs(
        specs: &BTreeMap<TaskName, TaskSpec>,
    ) -> BTreeMap<TaskName, TaskRecord> {
        specs
            .iter()
            .map(|(id, spec)| (id.clone(), TaskRecord::from_spec(spec)))
            .collect()
    }
}

/// Description of a task the engine wants an external worker to run now.
///
/// Carries exactly the information needed to route the task to the correct
/// executor; the worker reports the outcome back via a status update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchItem {
    pub task_id: TaskName,
    pub phase: u32,
    pub specialist: String,
}

impl DispatchItem {
    pub fn from_record(id: &TaskName, record: &TaskRecord) -> Self {
        Self {
            task_id: id.clone(),
            phase: record.phase,
            specialist: record.specialist.clone(),
        }
    }
}
