mod common;

use std::collections::BTreeMap;

use common::{init_tracing, PlanFileBuilder, TaskSpecBuilder};
use plandag::dag::{apply_transition, dispatch, select_group, TaskName, TaskRecord, Transition};
use plandag::state::{build_initial_snapshot, TaskStatus};

fn batch_ids(batch: &[plandag::dag::DispatchItem]) -> Vec<&str> {
    batch.iter().map(|item| item.task_id.as_str()).collect()
}

#[test]
fn test_parallel_group_dispatched_within_limit() {
    init_tracing();
    // T1 hints that T2 can ride along; with a limit of 2, T3 must wait even
    // though the caller allows up to 5 in flight.
    let plan = PlanFileBuilder::new()
        .with_parallel_limit(2)
        .with_task("T1", TaskSpecBuilder::new(1).parallel_with("T2").build())
        .with_task("T2", TaskSpecBuilder::new(1).build())
        .with_task("T3", TaskSpecBuilder::new(1).build())
        .build();
    let mut snapshot = build_initial_snapshot(&plan).expect("snapshot should build");

    let batch = dispatch(&mut snapshot, 5).expect("dispatch should succeed");
    assert_eq!(batch_ids(&batch), vec!["T1", "T2"]);

    assert_eq!(snapshot.tasks.status_of("T1"), Some(TaskStatus::InProgress));
    assert_eq!(snapshot.tasks.status_of("T2"), Some(TaskStatus::InProgress));
    assert_eq!(snapshot.tasks.status_of("T3"), Some(TaskStatus::Ready));
}

#[test]
fn test_batch_carries_routing_metadata() {
    init_tracing();
    let plan = PlanFileBuilder::new()
        .with_task("T1", TaskSpecBuilder::new(3).specialist("backend").build())
        .build();
    let mut snapshot = build_initial_snapshot(&plan).expect("snapshot should build");

    let batch = dispatch(&mut snapshot, 5).expect("dispatch should succeed");
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].task_id, "T1");
    assert_eq!(batch[0].phase, 3);
    assert_eq!(batch[0].specialist, "backend");
}

#[test]
fn test_in_progress_tasks_consume_the_budget() {
    init_tracing();
    let plan = PlanFileBuilder::new()
        .with_parallel_limit(5)
        .with_task("T1", TaskSpecBuilder::new(1).build())
        .with_task("T2", TaskSpecBuilder::new(1).build())
        .with_task("T3", TaskSpecBuilder::new(1).build())
        .with_task("T4", TaskSpecBuilder::new(1).build())
        .build();
    let mut snapshot = build_initial_snapshot(&plan).expect("snapshot should build");

    for id in ["T1", "T2", "T3"] {
        apply_transition(&mut snapshot, id, Transition::To(TaskStatus::InProgress))
            .expect("transition should apply");
    }

    // max_dispatch 4 minus 3 already in flight leaves one slot.
    let batch = dispatch(&mut snapshot, 4).expect("dispatch should succeed");
    assert_eq!(batch_ids(&batch), vec!["T4"]);
}

#[test]
fn test_no_slots_yields_empty_batch() {
    init_tracing();
    let plan = PlanFileBuilder::new()
        .with_task("T1", TaskSpecBuilder::new(1).build())
        .with_task("T2", TaskSpecBuilder::new(1).build())
        .build();
    let mut snapshot = build_initial_snapshot(&plan).expect("snapshot should build");

    apply_transition(&mut snapshot, "T1", Transition::To(TaskStatus::InProgress))
        .expect("transition should apply");

    let batch = dispatch(&mut snapshot, 1).expect("dispatch should succeed");
    assert!(batch.is_empty());
    assert_eq!(snapshot.tasks.status_of("T2"), Some(TaskStatus::Ready));
}

#[test]
fn test_ready_queue_is_drained_in_fifo_order() {
    init_tracing();
    let plan = PlanFileBuilder::new()
        .with_parallel_limit(1)
        .with_task("T1", TaskSpecBuilder::new(1).build())
        .with_task("T2", TaskSpecBuilder::new(1).build())
        .with_task("T3", TaskSpecBuilder::new(1).build())
        .build();
    let mut snapshot = build_initial_snapshot(&plan).expect("snapshot should build");

    for expected in ["T1", "T2", "T3"] {
        let batch = dispatch(&mut snapshot, 5).expect("dispatch should succeed");
        assert_eq!(batch_ids(&batch), vec![expected]);
        apply_transition(&mut snapshot, expected, Transition::To(TaskStatus::Completed))
            .expect("transition should apply");
    }
}

#[test]
fn test_group_hint_to_unready_peer_is_ignored() {
    init_tracing();
    // T2 is blocked behind T9; T1's hint cannot pull it into the batch.
    let plan = PlanFileBuilder::new()
        .with_parallel_limit(3)
        .with_task("T1", TaskSpecBuilder::new(1).parallel_with("T2").build())
        .with_task("T2", TaskSpecBuilder::new(1).depends_on("T9").build())
        .with_task("T9", TaskSpecBuilder::new(1).build())
        .build();
    let mut snapshot = build_initial_snapshot(&plan).expect("snapshot should build");

    let batch = dispatch(&mut snapshot, 1).expect("dispatch should succeed");
    assert_eq!(batch_ids(&batch), vec!["T1"]);
    assert_eq!(snapshot.tasks.status_of("T2"), Some(TaskStatus::Pending));
}

#[test]
fn test_select_group_dedupes_and_truncates() {
    init_tracing();
    let records: BTreeMap<TaskName, TaskRecord> = [
        (
            "A".to_string(),
            TaskRecord {
                phase: 1,
                depends_on: vec![],
                parallel_with: vec!["B".into(), "A".into(), "C".into(), "B".into()],
                specialist: "general-purpose".to_string(),
            },
        ),
        (
            "B".to_string(),
            TaskRecord {
                phase: 1,
                depends_on: vec![],
                parallel_with: vec![],
                specialist: "general-purpose".to_string(),
            },
        ),
        (
            "C".to_string(),
            TaskRecord {
                phase: 1,
                depends_on: vec![],
                parallel_with: vec![],
                specialist: "general-purpose".to_string(),
            },
        ),
    ]
    .into_iter()
    .collect();

    let ready: Vec<TaskName> = vec!["A".into(), "B".into(), "C".into()];
    let group = select_group(&ready, &"A".to_string(), &records, 2);
    assert_eq!(group, vec!["A", "B"]);
}

#[test]
fn test_group_hints_are_not_bidirectional() {
    init_tracing();
    // Only T2 declares the pairing; seeding from T1 yields a singleton group.
    let records: BTreeMap<TaskName, TaskRecord> = [
        (
            "T1".to_string(),
            TaskRecord {
                phase: 1,
                depends_on: vec![],
                parallel_with: vec![],
                specialist: "general-purpose".to_string(),
            },
        ),
        (
            "T2".to_string(),
            TaskRecord {
                phase: 1,
                depends_on: vec![],
                parallel_with: vec!["T1".into()],
                specialist: "general-purpose".to_string(),
            },
        ),
    ]
    .into_iter()
    .collect();

    let ready: Vec<TaskName> = vec!["T1".into(), "T2".into()];
    let group = select_group(&ready, &"T1".to_string(), &records, 5);
    assert_eq!(group, vec!["T1"]);
}

#[test]
fn test_overlapping_groups_do_not_double_dispatch() {
    init_tracing();
    // Both T1 and T2 hint at T3; it must appear in the batch exactly once.
    let plan = PlanFileBuilder::new()
        .with_parallel_limit(5)
        .with_task("T1", TaskSpecBuilder::new(1).parallel_with("T3").build())
        .with_task("T2", TaskSpecBuilder::new(1).parallel_with("T3").build())
        .with_task("T3", TaskSpecBuilder::new(1).build())
        .build();
    let mut snapshot = build_initial_snapshot(&plan).expect("snapshot should build");

    let batch = dispatch(&mut snapshot, 5).expect("dispatch should succeed");
    let mut ids = batch_ids(&batch);
    ids.sort();
    assert_eq!(ids, vec!["T1", "T2", "T3"]);
}
