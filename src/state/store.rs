// src/state/store.rs

//! Snapshot persistence.
//!
//! The engine is stateless between invocations: every operation loads the
//! full snapshot, mutates it in memory, and writes it back. Two invocations
//! racing on the same file would silently drop one writer's changes, so
//! `save` carries an optimistic-concurrency check: the on-disk `version` must
//! still match the version the snapshot was loaded at, and each successful
//! save bumps it. The previous document is kept in a sibling `.bak` file.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Deserialize;
use tracing::{debug, info};

use crate::errors::{PlandagError, Result};
use crate::state::snapshot::OrchestrationSnapshot;

/// Store interface for the orchestration snapshot.
pub trait SnapshotStore {
    fn load(&self) -> Result<OrchestrationSnapshot>;

    /// Persist the snapshot, rejecting stale writers and bumping `version`.
    fn save(&self, snapshot: &mut OrchestrationSnapshot) -> Result<()>;

    /// Persist unconditionally (initialisation / explicit re-init), still
    /// preserving the previous document as a backup when one exists.
    fn replace(&self, snapshot: &mut OrchestrationSnapshot) -> Result<()>;
}

/// Just enough of the document to read its version stamp.
#[derive(Debug, Deserialize)]
struct VersionProbe {
    version: u64,
}

fn parse_snapshot(contents: &str) -> Result<OrchestrationSnapshot> {
    serde_json::from_str(contents).map_err(|e| PlandagError::StateCorrupt(e.to_string()))
}

fn probe_version(contents: &str) -> Result<u64> {
    let probe: VersionProbe =
        serde_json::from_str(contents).map_err(|e| PlandagError::StateCorrupt(e.to_string()))?;
    Ok(probe.version)
}

fn render_snapshot(snapshot: &OrchestrationSnapshot) -> Result<String> {
    let mut doc = serde_json::to_string_pretty(snapshot)?;
    doc.push('\n');
    Ok(doc)
}

/// JSON-file snapshot store: one document, plus a `.bak` sibling holding the
/// immediately-prior snapshot.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> PathBuf {
        let mut os = self.path.clone().into_os_string();
        os.push(".bak");
        PathBuf::from(os)
    }

    fn read_current(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_through(
        &self,
        snapshot: &mut OrchestrationSnapshot,
        previous: Option<String>,
    ) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Backup-before-write: keep the prior document reachable even if the
        // write below is interrupted.
        if let Some(previous) = previous {
            fs::write(self.backup_path(), previous)?;
        }

        snapshot.version += 1;
        snapshot.touch();
        fs::write(&self.path, render_snapshot(snapshot)?)?;

        debug!(
            path = %self.path.display(),
            version = snapshot.version,
            "persisted snapshot"
        );
        Ok(())
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<OrchestrationSnapshot> {
        let contents = self
            .read_current()?
            .ok_or_else(|| PlandagError::StateNotFound(self.path.clone()))?;
        parse_snapshot(&contents)
    }

    fn save(&self, snapshot: &mut OrchestrationSnapshot) -> Result<()> {
        let previous = self.read_current()?;

        if let Some(contents) = previous.as_deref() {
            let on_disk = probe_version(contents)?;
            if on_disk != snapshot.version {
                return Err(PlandagError::StaleSnapshot {
                    loaded: snapshot.version,
                    on_disk,
                });
            }
        }

        self.write_through(snapshot, previous)
    }

    fn replace(&self, snapshot: &mut OrchestrationSnapshot) -> Result<()> {
        let previous = self.read_current()?;
        if previous.is_some() {
            info!(path = %self.path.display(), "replacing existing snapshot");
        }
        self.write_through(snapshot, previous)
    }
}

/// In-memory store for tests and embedding; same versioning semantics as
/// [`JsonFileStore`], keyed on the serialized document so load/save behaviour
/// matches the file store exactly.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<OrchestrationSnapshot> {
        let guard = self.lock();
        let contents = guard
            .as_deref()
            .ok_or_else(|| PlandagError::StateNotFound(PathBuf::from("<memory>")))?;
        parse_snapshot(contents)
    }

    fn save(&self, snapshot: &mut OrchestrationSnapshot) -> Result<()> {
        let mut guard = self.lock();

        if let Some(contents) = guard.as_deref() {
            let on_disk = probe_version(contents)?;
            if on_disk != snapshot.version {
                return Err(PlandagError::StaleSnapshot {
                    loaded: snapshot.version,
                    on_disk,
                });
            }
        }

        snapshot.version += 1;
        snapshot.touch();
        *guard = Some(render_snapshot(snapshot)?);
        Ok(())
    }

    fn replace(&self, snapshot: &mut OrchestrationSnapshot) -> Result<()> {
        let mut guard = self.lock();
        snapshot.version += 1;
        snapshot.touch();
        *guard = Some(render_snapshot(snapshot)?);
        Ok(())
    }
}
