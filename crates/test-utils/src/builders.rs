#![allow(dead_code)]

use std::collections::BTreeMap;

use plandag::errors::Result;
use plandag::plan::{ExecutionSection, PlanFile, RawPlanFile, TaskSpec};

/// Builder for `PlanFile` to simplify test setup.
pub struct PlanFileBuilder {
    plan: RawPlanFile,
}

impl PlanFileBuilder {
    pub fn new() -> Self {
        Self {
            plan: RawPlanFile {
                execution: ExecutionSection::default(),
                task: BTreeMap::new(),
            },
        }
    }

    pub fn with_task(mut self, id: &str, task: TaskSpec) -> Self {
        self.plan.task.insert(id.to_string(), task);
        self
    }

    pub fn with_current_phase(mut self, phase: u32) -> Self {
        self.plan.execution.current_phase = phase;
        self
    }

    pub fn with_parallel_limit(mut self, limit: usize) -> Self {
        self.plan.execution.parallel_limit = limit;
        self
    }

    pub fn build(self) -> PlanFile {
        PlanFile::try_from(self.plan).expect("Failed to build valid plan from builder")
    }

    /// Variant for tests that expect validation to reject the plan.
    pub fn try_build(self) -> Result<PlanFile> {
        PlanFile::try_from(self.plan)
    }
}

impl Default for PlanFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskSpec`.
pub struct TaskSpecBuilder {
    task: TaskSpec,
}

impl TaskSpecBuilder {
    pub fn new(phase: u32) -> Self {
        Self {
            task: TaskSpec {
                phase,
                depends_on: vec![],
                parallel_with: vec![],
                specialist: "general-purpose".to_string(),
                completed: false,
            },
        }
    }

    pub fn depends_on(mut self, dep: &str) -> Self {
        self.task.depends_on.push(dep.to_string());
        self
    }

    pub fn parallel_with(mut self, peer: &str) -> Self {
        self.task.parallel_with.push(peer.to_string());
        self
    }

    pub fn specialist(mut self, specialist: &str) -> Self {
        self.task.specialist = specialist.to_string();
        self
    }

    pub fn completed(mut self, val: bool) -> Self {
        self.task.completed = val;
        self
    }

    pub fn build(self) -> TaskSpec {
        self.task
    }
}
