// src/plan/validate.rs

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::warn;

use crate::dag::cycle::detect_cycle;
use crate::dag::task_info::TaskRecord;
use crate::errors::{PlandagError, Result};
use crate::plan::model::{PlanFile, RawPlanFile};

impl TryFrom<RawPlanFile> for PlanFile {
    type Error = crate::errors::PlandagError;

    fn try_from(raw: RawPlanFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_plan(&raw)?;
        Ok(PlanFile::new_unchecked(raw.execution, raw.task))
    }
}

fn validate_raw_plan(plan: &RawPlanFile) -> Result<()> {
    ensure_has_tasks(plan)?;
    validate_execution_section(plan)?;
    validate_task_dependencies(plan)?;
    validate_dag(plan)?;
    Ok(())
}

fn ensure_has_tasks(plan: &RawPlanFile) -> Result<()> {
    if plan.task.is_empty() {
        return Err(PlandagError::PlanError(
            "plan must contain at least one [task.<id>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_execution_section(plan: &RawPlanFile) -> Result<()> {
    if plan.execution.parallel_limit == 0 {
        return Err(PlandagError::PlanError(
            "[execution].parallel_limit must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

/// Reject unknown and self-referential `depends_on` entries.
///
/// A dangling prerequisite can never be completed, so the dependent task
/// would be starved in `Pending` forever; rejecting at plan time is the one
/// consistent policy. `parallel_with` is advisory only, so unknown entries
/// there are merely warned about.
fn validate_task_dependencies(plan: &RawPlanFile) -> Result<()> {
    for (id, task) in plan.task.iter() {
        for dep in task.depends_on.iter() {
            if !plan.task.contains_key(dep) {
                return Err(PlandagError::PlanError(format!(
                    "task '{}' has unknown prerequisite '{}' in `depends_on`",
                    id, dep
                )));
            }
            if dep == id {
                return Err(PlandagError::PlanError(format!(
                    "task '{}' cannot depend on itself in `depends_on`",
                    id
                )));
            }
        }
        for peer in task.parallel_with.iter() {
            if !plan.task.contains_key(peer) {
                warn!(
                    task = %id,
                    peer = %peer,
                    "unknown task in `parallel_with`; hint will never match"
                );
            }
        }
    }
    Ok(())
}

fn validate_dag(plan: &RawPlanFile) -> Result<()> {
    // Build a simple petgraph graph from the tasks and their prerequisites.
    //
    // Edge direction: dep -> task
    // For:
    //   [task."T2"]
    //   depends_on = ["T1"]
    // we add edge T1 -> T2.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for id in plan.task.keys() {
        graph.add_node(id.as_str());
    }

    for (id, task) in plan.task.iter() {
        for dep in task.depends_on.iter() {
            graph.add_edge(dep.as_str(), id.as_str(), ());
        }
    }

    // A topological sort will fail iff there is a cycle. The toposort error
    // only names a single node on the cycle, so on failure we rerun our own
    // DFS to reconstruct the full path for the error message.
    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(_cycle) => {
            let records = TaskRecord::records_from_specs(&plan.task);
            match detect_cycle(&records) {
                Some(path) => Err(PlandagError::CircularDependency { path }),
                None => Err(PlandagError::PlanError(
                    "cycle detected in task DAG but path reconstruction failed".to_string(),
                )),
            }
        }
    }
}
