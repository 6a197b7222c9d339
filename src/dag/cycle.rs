// src/dag/cycle.rs

//! Cycle detection over `depends_on` edges.
//!
//! Runs once, before any snapshot is constructed; a detected cycle aborts
//! graph construction entirely. The DFS uses an explicit frame stack rather
//! than recursion so that pathological dependency chains cannot overflow the
//! call stack, while keeping the same cycle-path reconstruction a recursive
//! walk would produce.

use std::collections::{BTreeMap, HashSet};

use crate::dag::task_info::TaskRecord;
use crate::dag::TaskName;

/// Search the dependency graph for a cycle.
///
/// Returns the cycle as a path slice running from the first occurrence of the
/// repeated node through the closing repeat, e.g. `["T1", "T2", "T1"]`, or
/// `None` if the graph is acyclic.
///
/// A `depends_on` edge pointing at an id not present in `records` is treated
/// as absent: it cannot participate in a cycle. (Validated plans never
/// contain such edges; see `plan::validate`.)
pub fn detect_cycle(records: &BTreeMap<TaskName, TaskRecord>) -> Option<Vec<TaskName>> {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut on_stack: HashSet<&str> = HashSet::new();

    // BTreeMap order makes the reported cycle deterministic.
    for root in records.keys() {
        if visited.contains(root.as_str()) {
            continue;
        }

        // Each frame is (node, index of the next dependency edge to follow).
        let mut frames: Vec<(&str, usize)> = vec![(root.as_str(), 0)];
        let mut path: Vec<&str> = vec![root.as_str()];
        visited.insert(root.as_str());
        on_stack.insert(root.as_str());

        while let Some(frame) = frames.last_mut() {
            let node = frame.0;
            let deps = records
                .get(node)
                .map(|r| r.depends_on.as_slice())
                .unwrap_or(&[]);

            if frame.1 >= deps.len() {
                // All edges explored; retreat.
                frames.pop();
                on_stack.remove(node);
                path.pop();
                continue;
            }

            let dep = deps[frame.1].as_str();
            frame.1 += 1;

            if !records.contains_key(dep) {
                // Dangling edge: skipped for cycle-detection purposes.
                continue;
            }

            if on_stack.contains(dep) {
                // Back edge into the current recursion stack: reconstruct the
                // cycle from the first occurrence of `dep` on the path.
                let start = path
                    .iter()
                    .position(|n| *n == dep)
                    .unwrap_or(0);
                let mut cycle: Vec<TaskName> =
                    path[start..].iter().map(|n| n.to_string()).collect();
                cycle.push(dep.to_string());
                return Some(cycle);
            }

            if visited.contains(dep) {
                continue;
            }

            visited.insert(dep);
            on_stack.insert(dep);
            frames.push((dep, 0));
            path.push(dep);
        }
    }

    None
}
