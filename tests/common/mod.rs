#![allow(dead_code)]

pub use plandag_test_utils::builders::{PlanFileBuilder, TaskSpecBuilder};
pub use plandag_test_utils::init_tracing;
