// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlandagError {
    #[error("Plan error: {0}")]
    PlanError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Task not found in any status bucket: {0}")]
    UnknownTask(String),

    #[error("Circular dependency: {}", path.join(" -> "))]
    CircularDependency { path: Vec<String> },

    #[error("State file not found: {0}")]
    StateNotFound(PathBuf),

    #[error("State file corrupt: {0}")]
    StateCorrupt(String),

    #[error("Stale snapshot: loaded at version {loaded}, but version {on_disk} is on disk")]
    StaleSnapshot { loaded: u64, on_disk: u64 },

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, PlandagError>;
