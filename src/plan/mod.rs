// src/plan/mod.rs

//! Plan file handling: the structured task document the engine consumes.
//!
//! A plan is a TOML file mapping task ids to their static declaration
//! (`phase`, `depends_on`, `parallel_with`, `specialist`, initial
//! `completed` flag). Parsing of human-authored task documents into this
//! shape happens upstream; here we only deserialize and validate.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_plan_path, load_and_validate, load_from_path};
pub use model::{ExecutionSection, PlanFile, RawPlanFile, TaskSpec};
