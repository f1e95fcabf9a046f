//! Whole-corpus function classification and the inter-procedural call graph.
//!
//! The registry is a pure accumulator plus query engine: pass 1 of the
//! analysis populates it (additive, order-independent), pass 2 queries it.
//! No operation errors; an empty registry simply answers `false` to every
//! reachability query.

pub mod builder;

use crate::core::{Edge, QualifiedName};
use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Debug, Default)]
pub struct WorkflowRegistry {
    workflow_funcs: HashSet<QualifiedName>,
    activity_funcs: HashSet<QualifiedName>,
    call_graph: HashMap<QualifiedName, Vec<QualifiedName>>,
}

impl WorkflowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_workflow(&mut self, name: QualifiedName) {
        self.workflow_funcs.insert(name);
    }

    pub fn mark_activity(&mut self, name: QualifiedName) {
        self.activity_funcs.insert(name);
    }

    pub fn add_edges(&mut self, edges: Vec<Edge>) {
        for edge in edges {
            self.call_graph.entry(edge.caller).or_default().push(edge.callee);
        }
    }

    pub fn is_workflow(&self, name: &QualifiedName) -> bool {
        self.workflow_funcs.contains(name)
    }

    pub fn is_activity(&self, name: &QualifiedName) -> bool {
        self.activity_funcs.contains(name)
    }

    pub fn workflow_count(&self) -> usize {
        self.workflow_funcs.len()
    }

    pub fn activity_count(&self) -> usize {
        self.activity_funcs.len()
    }

    /// True if the function is workflow-classified itself or reachable from
    /// a workflow-classified function without traversing into an
    /// activity-classified node.
    pub fn is_workflow_reachable(&self, name: &QualifiedName) -> bool {
        self.shortest_path_from_workflow(name).is_some()
    }

    /// A shortest example call path from some workflow entry point to
    /// `name`, or empty when unreachable. Deterministic for a fixed graph
    /// and edge insertion order: seeds are visited in sorted order and the
    /// traversal is breadth-first.
    pub fn call_path_to(&self, name: &QualifiedName) -> Vec<QualifiedName> {
        self.shortest_path_from_workflow(name).unwrap_or_default()
    }

    /// Multi-source BFS seeded from every workflow-classified node. Edges
    /// into activity-classified nodes are pruned at the entering edge only;
    /// the same node reached via a non-activity path still counts. An
    /// explicit queue and visited set keep cyclic graphs finite.
    fn shortest_path_from_workflow(&self, target: &QualifiedName) -> Option<Vec<QualifiedName>> {
        if self.workflow_funcs.contains(target) {
            return Some(vec![target.clone()]);
        }
        if self.workflow_funcs.is_empty() {
            return None;
        }

        let mut seeds: Vec<&QualifiedName> = self.workflow_funcs.iter().collect();
        seeds.sort();

        let mut visited: HashSet<&QualifiedName> = seeds.iter().copied().collect();
        let mut parent: HashMap<&QualifiedName, &QualifiedName> = HashMap::new();
        let mut queue: VecDeque<&QualifiedName> = seeds.into_iter().collect();

        while let Some(node) = queue.pop_front() {
            let Some(callees) = self.call_graph.get(node) else {
                continue;
            };
            for callee in callees {
                if self.activity_funcs.contains(callee) {
                    continue;
                }
                if !visited.insert(callee) {
                    continue;
                }
                parent.insert(callee, node);
                if callee == target {
                    return Some(reconstruct(&parent, callee));
                }
                queue.push_back(callee);
            }
        }
        None
    }
}

fn reconstruct(
    parent: &HashMap<&QualifiedName, &QualifiedName>,
    end: &QualifiedName,
) -> Vec<QualifiedName> {
    let mut path = vec![end.clone()];
    let mut current = end;
    while let Some(prev) = parent.get(current) {
        path.push((*prev).clone());
        current = *prev;
    }
    path.reverse();
    path
}
