// src/dag/mod.rs

//! DAG orchestration core.
//!
//! This module ties together:
//! - the static task graph model ([`task_info`])
//! - cycle detection over `depends_on` edges ([`cycle`])
//! - stateless readiness recomputation ([`resolver`])
//! - parallel-group selection and batch dispatch ([`dispatch`])
//! - the status state machine with retry accounting ([`transition`])
//! - phase completion and advancement ([`phase`])
//!
//! All functions here operate on an in-memory
//! [`OrchestrationSnapshot`](crate::state::OrchestrationSnapshot); loading and
//! persisting snapshots is the `state` module's concern.

/// Canonical task id type used throughout the engine.
pub type TaskName = String;

pub mod cycle;
pub mod dispatch;
pub mod phase;
pub mod resolver;
pub mod task_info;
pub mod transition;

pub use cycle::detect_cycle;
pub use dispatch::{dispatch, select_group};
pub use phase::{advance_phase, check_completion, phase_tasks, PhaseReport};
pub use resolver::compute_ready;
pub use task_info::{DispatchItem, TaskRecord};
pub use transition::{apply_transition, Transition, RETRY_LIMIT};
