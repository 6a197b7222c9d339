// src/plan/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::Result;
use crate::plan::model::{PlanFile, RawPlanFile};

/// Load a plan file from a given path and return the raw `RawPlanFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation (dependency resolution, acyclicity, etc.). Use
/// [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawPlanFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let plan: RawPlanFile = toml::from_str(&contents)?;

    Ok(plan)
}

/// Load a plan file from path and run validation.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks for:
///   - unknown or self-referential `depends_on` references,
///   - dependency cycles (with full cycle-path reporting),
///   - basic execution-section sanity.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<PlanFile> {
    let raw_plan = load_from_path(&path)?;
    let plan = PlanFile::try_from(raw_plan)?;
    Ok(plan)
}

/// Helper to resolve a default plan path.
///
/// Currently this just returns `Plandag.toml` in the current working
/// directory, but this function exists so you can later:
///
/// - Respect an env var (e.g. `PLANDAG_PLAN`).
/// - Support project-local plan discovery.
pub fn default_plan_path() -> PathBuf {
    PathBuf::from("Plandag.toml")
}
