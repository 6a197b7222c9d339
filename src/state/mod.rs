// src/state/mod.rs

//! Snapshot model and persistence.

pub mod snapshot;
pub mod store;

pub use snapshot::{
    build_initial_snapshot, ErrorLog, ErrorLogEntry, ExecutionContext, OrchestrationSnapshot,
    Stats, StatusBuckets, TaskStatus, ERROR_LOG_CAP, SUMMARY_MAX_CHARS,
};
pub use store::{JsonFileStore, MemoryStore, SnapshotStore};
