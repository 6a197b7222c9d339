mod common;

use common::{init_tracing, PlanFileBuilder, TaskSpecBuilder};
use plandag::dag::{advance_phase, apply_transition, check_completion, Transition};
use plandag::state::{build_initial_snapshot, TaskStatus};

#[test]
fn test_phase_completes_and_advances() {
    init_tracing();
    let plan = PlanFileBuilder::new()
        .with_current_phase(1)
        .with_task("T1", TaskSpecBuilder::new(1).build())
        .with_task("T2", TaskSpecBuilder::new(2).depends_on("T1").build())
        .build();
    let mut snapshot = build_initial_snapshot(&plan).expect("snapshot should build");

    let report = check_completion(&snapshot);
    assert_eq!(report.phase, 1);
    assert!(!report.completed);
    assert_eq!(report.total, 1);
    assert_eq!(report.done, 0);
    assert_eq!(report.remaining, vec!["T1"]);

    apply_transition(&mut snapshot, "T1", Transition::To(TaskStatus::Completed))
        .expect("transition should apply");

    let report = check_completion(&snapshot);
    assert!(report.completed);
    assert_eq!(report.done, 1);
    assert!(report.remaining.is_empty());

    assert!(advance_phase(&mut snapshot));
    assert_eq!(snapshot.execution.current_phase, 2);
    assert_eq!(snapshot.execution.phases_completed, 1);
}

#[test]
fn test_advance_stops_at_the_last_phase() {
    init_tracing();
    let plan = PlanFileBuilder::new()
        .with_current_phase(2)
        .with_task("T1", TaskSpecBuilder::new(1).build())
        .with_task("T2", TaskSpecBuilder::new(2).build())
        .build();
    let mut snapshot = build_initial_snapshot(&plan).expect("snapshot should build");

    assert!(!advance_phase(&mut snapshot));
    assert_eq!(snapshot.execution.current_phase, 2);
    assert_eq!(snapshot.execution.phases_completed, 0);
}

#[test]
fn test_advance_skips_phase_number_gaps() {
    init_tracing();
    let plan = PlanFileBuilder::new()
        .with_current_phase(1)
        .with_task("T1", TaskSpecBuilder::new(1).build())
        .with_task("T5", TaskSpecBuilder::new(5).build())
        .build();
    let mut snapshot = build_initial_snapshot(&plan).expect("snapshot should build");

    assert!(advance_phase(&mut snapshot));
    assert_eq!(snapshot.execution.current_phase, 5);
}

#[test]
fn test_advance_from_before_the_first_phase() {
    init_tracing();
    // Default current_phase is 0; no task lives there, so the phase report is
    // vacuously complete and advancing lands on the first real phase.
    let plan = PlanFileBuilder::new()
        .with_task("T1", TaskSpecBuilder::new(1).build())
        .build();
    let mut snapshot = build_initial_snapshot(&plan).expect("snapshot should build");

    let report = check_completion(&snapshot);
    assert_eq!(report.phase, 0);
    assert!(report.completed);
    assert_eq!(report.total, 0);

    assert!(advance_phase(&mut snapshot));
    assert_eq!(snapshot.execution.current_phase, 1);
}

#[test]
fn test_failed_tasks_count_as_resolved() {
    init_tracing();
    let plan = PlanFileBuilder::new()
        .with_current_phase(1)
        .with_task("T1", TaskSpecBuilder::new(1).build())
        .with_task("T2", TaskSpecBuilder::new(1).build())
        .build();
    let mut snapshot = build_initial_snapshot(&plan).expect("snapshot should build");

    apply_transition(&mut snapshot, "T1", Transition::To(TaskStatus::Completed))
        .expect("transition should apply");
    apply_transition(&mut snapshot, "T2", Transition::Fail("gave up".into()))
        .expect("transition should apply");

    // A failed member no longer holds the phase open.
    let report = check_completion(&snapshot);
    assert!(report.completed);
    assert_eq!(report.done, 2);
}

#[test]
fn test_in_progress_member_keeps_phase_open() {
    init_tracing();
    let plan = PlanFileBuilder::new()
        .with_current_phase(1)
        .with_task("T1", TaskSpecBuilder::new(1).build())
        .build();
    let mut snapshot = build_initial_snapshot(&plan).expect("snapshot should build");

    apply_transition(&mut snapshot, "T1", Transition::To(TaskStatus::InProgress))
        .expect("transition should apply");

    let report = check_completion(&snapshot);
    assert!(!report.completed);
    assert_eq!(report.remaining, vec!["T1"]);
}
