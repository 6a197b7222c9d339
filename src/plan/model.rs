// src/plan/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::dag::TaskName;

/// Top-level plan as read from a TOML file, before validation.
///
/// This is a direct mapping of a plan document:
///
/// ```toml
/// [execution]
/// parallel_limit = 5
///
/// [task."T1"]
/// phase = 1
///
/// [task."T1.2"]
/// phase = 1
/// depends_on = ["T1"]
/// parallel_with = ["T1.3"]
/// specialist = "backend"
/// ```
///
/// The `[execution]` section is optional and has reasonable defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPlanFile {
    /// Global execution settings from `[execution]`.
    #[serde(default)]
    pub execution: ExecutionSection,

    /// All tasks from `[task.<id>]`.
    ///
    /// Keys are the *task ids* (conventionally `"T<phase>[.<seq>[.<subseq>]]"`,
    /// e.g. `"T1"`, `"T2.3"`, though any unique string is accepted).
    #[serde(default)]
    pub task: BTreeMap<TaskName, TaskSpec>,
}

/// A plan that has passed validation (see `plan::validate`).
///
/// Constructed only through `PlanFile::try_from(RawPlanFile)`; holding one is
/// the proof that dependency references resolve and the graph is acyclic.
#[derive(Debug, Clone)]
pub struct PlanFile {
    pub execution: ExecutionSection,
    pub task: BTreeMap<TaskName, TaskSpec>,
}

impl PlanFile {
    /// Internal constructor used by validation; not part of the public API
    /// contract.
    pub(crate) fn new_unchecked(
        execution: ExecutionSection,
        task: BTreeMap<TaskName, TaskSpec>,
    ) -> Self {
        Self { execution, task }
    }
}

/// `[execution]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionSection {
    /// Phase the run starts in.
    #[serde(default)]
    pub current_phase: u32,

    /// Maximum size of a single dispatch batch.
    #[serde(default = "default_parallel_limit")]
    pub parallel_limit: usize,
}

fn default_parallel_limit() -> usize {
    5
}

impl Default for ExecutionSection {
    fn default() -> Self {
        Self {
            current_phase: 0,
            parallel_limit: default_parallel_limit(),
        }
    }
}

/// `[task.<id>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskSpec {
    /// Phase this task belongs to.
    pub phase: u32,

    /// Prerequisite task ids: this task waits for all of them to complete.
    #[serde(default)]
    pub depends_on: Vec<TaskName>,

    /// Advisory co-schedulability hints: tasks that may be dispatched in the
    /// same batch as this one. Not enforced bidirectionally.
    #[serde(default)]
    pub parallel_with: Vec<TaskName>,

    /// Which kind of external worker should execute this task.
    #[serde(default = "default_specialist")]
    pub specialist: String,

    /// Source-declared completion state: `true` seeds the task directly into
    /// the `completed` bucket (e.g. work finished in an earlier run).
    #[serde(default)]
    pub completed: bool,
}

pub(crate) fn default_specialist() -> String {
    "general-purpose".to_string()
}
