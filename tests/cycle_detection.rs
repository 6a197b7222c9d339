mod common;

use std::collections::BTreeMap;

use common::{init_tracing, PlanFileBuilder, TaskSpecBuilder};
use plandag::dag::{detect_cycle, TaskName, TaskRecord};
use plandag::errors::PlandagError;

fn record(phase: u32, deps: &[&str]) -> TaskRecord {
    TaskRecord {
        phase,
        depends_on: deps.iter().map(|d| d.to_string()).collect(),
        parallel_with: vec![],
        specialist: "general-purpose".to_string(),
    }
}

fn records(entries: &[(&str, &[&str])]) -> BTreeMap<TaskName, TaskRecord> {
    entries
        .iter()
        .map(|(id, deps)| (id.to_string(), record(1, deps)))
        .collect()
}

#[test]
fn test_two_node_cycle_reports_full_path() {
    init_tracing();
    let records = records(&[("T1", &["T2"]), ("T2", &["T1"])]);

    let path = detect_cycle(&records).expect("cycle should be detected");
    assert_eq!(path, vec!["T1", "T2", "T1"]);
}

#[test]
fn test_self_dependency_is_a_cycle() {
    init_tracing();
    let records = records(&[("T1", &["T1"])]);

    let path = detect_cycle(&records).expect("self-loop should be detected");
    assert_eq!(path, vec!["T1", "T1"]);
}

#[test]
fn test_acyclic_chain_has_no_cycle() {
    init_tracing();
    let records = records(&[("T1", &[]), ("T2", &["T1"]), ("T3", &["T2", "T1"])]);

    assert!(detect_cycle(&records).is_none());
}

#[test]
fn test_diamond_is_not_a_cycle() {
    init_tracing();
    // T1 <- T2, T1 <- T3, {T2, T3} <- T4: shared ancestors are fine.
    let records = records(&[
        ("T1", &[]),
        ("T2", &["T1"]),
        ("T3", &["T1"]),
        ("T4", &["T2", "T3"]),
    ]);

    assert!(detect_cycle(&records).is_none());
}

#[test]
fn test_dangling_edge_cannot_form_a_cycle() {
    init_tracing();
    let records = records(&[("T1", &["ghost"]), ("T2", &["T1"])]);

    assert!(detect_cycle(&records).is_none());
}

#[test]
fn test_cycle_in_later_component_is_found() {
    init_tracing();
    let records = records(&[("A", &[]), ("X", &["Y"]), ("Y", &["Z"]), ("Z", &["X"])]);

    let path = detect_cycle(&records).expect("cycle should be detected");
    assert_eq!(path, vec!["X", "Y", "Z", "X"]);
}

#[test]
fn test_plan_validation_rejects_cyclic_plan() {
    init_tracing();
    let result = PlanFileBuilder::new()
        .with_task("T1", TaskSpecBuilder::new(1).depends_on("T2").build())
        .with_task("T2", TaskSpecBuilder::new(1).depends_on("T1").build())
        .try_build();

    match result {
        Err(PlandagError::CircularDependency { path }) => {
            assert_eq!(path.first(), path.last());
            assert!(path.contains(&"T1".to_string()));
            assert!(path.contains(&"T2".to_string()));
        }
        other => panic!("expected CircularDependency, got {other:?}"),
    }
}

#[test]
fn test_plan_validation_rejects_unknown_dependency() {
    init_tracing();
    let result = PlanFileBuilder::new()
        .with_task("T1", TaskSpecBuilder::new(1).depends_on("nope").build())
        .try_build();

    match result {
        Err(PlandagError::PlanError(msg)) => {
            assert!(msg.contains("nope"), "message should name the missing id: {msg}");
        }
        other => panic!("expected PlanError, got {other:?}"),
    }
}

#[test]
fn test_plan_validation_rejects_self_dependency() {
    init_tracing();
    let result = PlanFileBuilder::new()
        .with_task("T1", TaskSpecBuilder::new(1).depends_on("T1").build())
        .try_build();

    assert!(matches!(result, Err(PlandagError::PlanError(_))));
}
