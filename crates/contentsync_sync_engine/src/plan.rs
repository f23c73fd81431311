//! Execution planning.

use contentsync_core::{Child, DependencyGraph, DependencyNode};
use contentsync_model::{ItemKind, NodeKey};
use serde::Serialize;
use std::collections::HashSet;

/// The order in which a graph's items are written.
///
/// Built by a post-order walk over every stored node in discovery order, so
/// each dependency precedes its dependents. Under one parent, asset children
/// are visited before entry children. Pruned nodes are left out.
#[derive(Debug, Clone)]
pub struct ExecutionPlan<'g> {
    steps: Vec<&'g DependencyNode>,
    skipped: usize,
}

impl<'g> ExecutionPlan<'g> {
    /// Plans `graph`.
    pub fn build(graph: &'g DependencyGraph) -> Self {
        let mut visited = HashSet::with_capacity(graph.len());
        let mut steps = Vec::with_capacity(graph.len());

        for node in graph.nodes() {
            visit(graph, node, &mut visited, &mut steps);
        }

        Self {
            steps,
            skipped: graph.pruned_count(),
        }
    }

    /// Nodes to write, in order.
    pub fn steps(&self) -> &[&'g DependencyNode] {
        &self.steps
    }

    /// Number of nodes to write.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if nothing is to be written.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Stored nodes left out because they are pruned.
    pub fn skipped_count(&self) -> usize {
        self.skipped
    }

    /// Identifier summary of the plan.
    pub fn summary(&self) -> SyncPlan {
        let mut plan = SyncPlan::default();
        for node in &self.steps {
            match node.kind() {
                ItemKind::Entry => plan.entries.push(node.id().to_string()),
                ItemKind::Asset => plan.assets.push(node.id().to_string()),
            }
            plan.order.push(node.key().clone());
        }
        plan
    }
}

fn visit<'g>(
    graph: &'g DependencyGraph,
    node: &'g DependencyNode,
    visited: &mut HashSet<&'g NodeKey>,
    steps: &mut Vec<&'g DependencyNode>,
) {
    if !visited.insert(node.key()) || node.is_pruned() {
        return;
    }

    let mut children: Vec<&Child> = node.children().iter().collect();
    children.sort_by_key(|child| child.kind() == ItemKind::Entry);

    for child in children {
        // An entry-loop edge stands for a pruned copy of an ancestor.
        if child.is_entry_loop() {
            continue;
        }
        if let Some(target) = graph.node(child.key()) {
            visit(graph, target, visited, steps);
        }
    }

    steps.push(node);
}

/// Identifiers of the items a plan would write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncPlan {
    /// Entry identifiers, in write order.
    pub entries: Vec<String>,
    /// Asset identifiers, in write order.
    pub assets: Vec<String>,
    /// Every key, in write order.
    pub order: Vec<NodeKey>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use contentsync_core::{NodeStatus, PruneReason};
    use contentsync_model::{Asset, Entry};

    fn ids(plan: &ExecutionPlan<'_>) -> Vec<String> {
        plan.steps().iter().map(|n| n.key().to_string()).collect()
    }

    #[test]
    fn single_root() {
        let graph = DependencyGraph::new(
            NodeKey::entry("root"),
            vec![DependencyNode::resolved(Entry::new("root", "page"), 0)],
        )
        .unwrap();

        let plan = ExecutionPlan::build(&graph);
        assert_eq!(ids(&plan), vec!["entry:root"]);
        assert_eq!(plan.skipped_count(), 0);
    }

    #[test]
    fn assets_precede_entry_siblings() {
        let root = DependencyNode::resolved(Entry::new("root", "page"), 0)
            .with_child(Child::Node(NodeKey::entry("e1")))
            .with_child(Child::Node(NodeKey::asset("a1")))
            .with_child(Child::Node(NodeKey::entry("e2")))
            .with_child(Child::Node(NodeKey::asset("a2")));
        let graph = DependencyGraph::new(
            NodeKey::entry("root"),
            vec![
                root,
                DependencyNode::resolved(Entry::new("e1", "card"), 1),
                DependencyNode::resolved(Asset::new("a1"), 1),
                DependencyNode::resolved(Entry::new("e2", "card"), 1),
                DependencyNode::resolved(Asset::new("a2"), 1),
            ],
        )
        .unwrap();

        let plan = ExecutionPlan::build(&graph);
        assert_eq!(
            ids(&plan),
            vec!["asset:a1", "asset:a2", "entry:e1", "entry:e2", "entry:root"]
        );

        let summary = plan.summary();
        assert_eq!(summary.assets, vec!["a1", "a2"]);
        assert_eq!(summary.entries, vec!["e1", "e2", "root"]);
    }

    #[test]
    fn pruned_nodes_are_skipped() {
        let root = DependencyNode::resolved(Entry::new("offer-1", "offer"), 0)
            .with_child(Child::Node(NodeKey::entry("home")));
        let home = DependencyNode::resolved(Entry::new("home", "offerHomePage"), 1)
            .with_child(Child::Node(NodeKey::entry("offer-2")))
            .with_child(Child::EntryLoop(NodeKey::entry("offer-1")));
        let pruned = DependencyNode::new(
            Entry::new("offer-2", "offer"),
            2,
            NodeStatus::Pruned(PruneReason::ContentTypeLoop),
        );
        let graph =
            DependencyGraph::new(NodeKey::entry("offer-1"), vec![root, home, pruned]).unwrap();

        let plan = ExecutionPlan::build(&graph);
        assert_eq!(ids(&plan), vec!["entry:home", "entry:offer-1"]);
        assert_eq!(plan.skipped_count(), 1);
        assert_eq!(plan.len(), 2);
    }

    #[test]
    fn shared_nodes_are_planned_once() {
        let root = DependencyNode::resolved(Entry::new("root", "page"), 0)
            .with_child(Child::Node(NodeKey::entry("left")))
            .with_child(Child::Node(NodeKey::entry("right")));
        let left = DependencyNode::resolved(Entry::new("left", "column"), 1)
            .with_child(Child::Node(NodeKey::asset("logo")));
        let right = DependencyNode::resolved(Entry::new("right", "column"), 1)
            .with_child(Child::Node(NodeKey::asset("logo")));
        let graph = DependencyGraph::new(
            NodeKey::entry("root"),
            vec![root, left, DependencyNode::resolved(Asset::new("logo"), 2), right],
        )
        .unwrap();

        let plan = ExecutionPlan::build(&graph);
        assert_eq!(
            ids(&plan),
            vec!["asset:logo", "entry:left", "entry:right", "entry:root"]
        );
    }
}
