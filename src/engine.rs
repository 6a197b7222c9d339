// src/engine.rs

//! Engine facade: the boundary operations, one snapshot round-trip each.
//!
//! Every operation is a pure function of the snapshot it loads: load the
//! document, mutate in memory, write it back. The engine never blocks
//! waiting on task execution — external workers run the dispatched tasks and
//! report outcomes through [`update`](Engine::update) on a later invocation.

use tracing::info;

use crate::dag::dispatch::dispatch;
use crate::dag::phase::{advance_phase, check_completion, PhaseReport};
use crate::dag::transition::{apply_transition, Transition};
use crate::dag::DispatchItem;
use crate::errors::Result;
use crate::plan::model::PlanFile;
use crate::state::snapshot::{build_initial_snapshot, OrchestrationSnapshot, Stats};
use crate::state::store::SnapshotStore;

pub struct Engine<S: SnapshotStore> {
    store: S,
}

impl<S: SnapshotStore> Engine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Build and persist the initial snapshot from a validated plan.
    ///
    /// Fails with `CircularDependency` before any state is written if the
    /// graph has a cycle. Replaces existing state (the prior document is kept
    /// as the backup).
    pub fn init(&self, plan: &PlanFile) -> Result<OrchestrationSnapshot> {
        let mut snapshot = build_initial_snapshot(plan)?;
        self.store.replace(&mut snapshot)?;
        info!(
            tasks = snapshot.task_details.len(),
            phase = snapshot.execution.current_phase,
            "initialised orchestration state"
        );
        Ok(snapshot)
    }

    /// Refresh readiness, dispatch a batch bounded by `max_dispatch`, and
    /// persist. Dispatched tasks are now `InProgress`.
    pub fn next(&self, max_dispatch: usize) -> Result<Vec<DispatchItem>> {
        let mut snapshot = self.store.load()?;
        snapshot.refresh_ready()?;
        let batch = dispatch(&mut snapshot, max_dispatch)?;
        self.store.save(&mut snapshot)?;
        Ok(batch)
    }

    /// Apply a reported status transition, re-resolve readiness, persist.
    pub fn update(&self, task_id: &str, transition: Transition) -> Result<()> {
        let mut snapshot = self.store.load()?;
        apply_transition(&mut snapshot, task_id, transition)?;
        snapshot.refresh_ready()?;
        self.store.save(&mut snapshot)?;
        Ok(())
    }

    /// Read-only summary statistics.
    pub fn status(&self) -> Result<Stats> {
        let snapshot = self.store.load()?;
        Ok(snapshot.stats)
    }

    /// Read-only completion report for the current phase.
    pub fn phase_check(&self) -> Result<PhaseReport> {
        let snapshot = self.store.load()?;
        Ok(check_completion(&snapshot))
    }

    /// Advance to the next phase if one exists; persists only on change.
    pub fn advance_phase(&self) -> Result<bool> {
        let mut snapshot = self.store.load()?;
        let advanced = advance_phase(&mut snapshot);
        if advanced {
            self.store.save(&mut snapshot)?;
        }
        Ok(advanced)
    }
}
