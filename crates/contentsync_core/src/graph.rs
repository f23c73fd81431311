//! Dependency graph types.

use crate::error::{CoreError, CoreResult};
use contentsync_model::{ContentItem, ItemKind, NodeKey};
use std::collections::HashMap;
use std::fmt;

/// Why traversal stopped at a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PruneReason {
    /// The entry is its own ancestor on the current path.
    EntryLoop,
    /// The entry's content type already occurs on the current path.
    ContentTypeLoop,
}

impl PruneReason {
    /// Returns the kebab-case name used in reports.
    pub const fn as_str(self) -> &'static str {
        match self {
            PruneReason::EntryLoop => "entry-loop",
            PruneReason::ContentTypeLoop => "content-type-loop",
        }
    }
}

impl fmt::Display for PruneReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolution status of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeStatus {
    /// The node was fetched and its links followed.
    Resolved,
    /// Traversal stopped here; the node has no children.
    Pruned(PruneReason),
}

impl NodeStatus {
    /// Returns true if the node was pruned.
    pub fn is_pruned(&self) -> bool {
        matches!(self, NodeStatus::Pruned(_))
    }

    /// Returns the prune reason, if pruned.
    pub fn prune_reason(&self) -> Option<PruneReason> {
        match self {
            NodeStatus::Pruned(reason) => Some(*reason),
            NodeStatus::Resolved => None,
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeStatus::Resolved => f.write_str("resolved"),
            NodeStatus::Pruned(_) => f.write_str("pruned"),
        }
    }
}

/// An edge from a node to one of its children.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Child {
    /// The child is the node stored under this key.
    Node(NodeKey),
    /// The child closes a cycle back to an ancestor.
    ///
    /// At this occurrence the ancestor is shown as pruned with no children;
    /// the stored node keeps its real children everywhere else.
    EntryLoop(NodeKey),
}

impl Child {
    /// Key of the referenced node.
    pub fn key(&self) -> &NodeKey {
        match self {
            Child::Node(key) | Child::EntryLoop(key) => key,
        }
    }

    /// Kind of the referenced node.
    pub fn kind(&self) -> ItemKind {
        self.key().kind
    }

    /// Returns true if this edge closes an entry loop.
    pub fn is_entry_loop(&self) -> bool {
        matches!(self, Child::EntryLoop(_))
    }
}

/// A discovered entry or asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyNode {
    key: NodeKey,
    item: ContentItem,
    children: Vec<Child>,
    depth: usize,
    status: NodeStatus,
}

impl DependencyNode {
    /// Creates a node with no children. The key is taken from the item.
    pub fn new(item: impl Into<ContentItem>, depth: usize, status: NodeStatus) -> Self {
        let item = item.into();
        Self {
            key: item.key(),
            item,
            children: Vec::new(),
            depth,
            status,
        }
    }

    /// Creates a resolved node.
    pub fn resolved(item: impl Into<ContentItem>, depth: usize) -> Self {
        Self::new(item, depth, NodeStatus::Resolved)
    }

    /// Appends a child edge. Pruned nodes ignore children.
    pub fn with_child(mut self, child: Child) -> Self {
        self.push_child(child);
        self
    }

    /// Appends a child edge unless one with the same key is present.
    pub(crate) fn push_child(&mut self, child: Child) {
        if self.status.is_pruned() || self.children.iter().any(|c| c.key() == child.key()) {
            return;
        }
        self.children.push(child);
    }

    /// Node key.
    pub fn key(&self) -> &NodeKey {
        &self.key
    }

    /// Item identifier.
    pub fn id(&self) -> &str {
        &self.key.id
    }

    /// Item kind.
    pub fn kind(&self) -> ItemKind {
        self.key.kind
    }

    /// The fetched item.
    pub fn item(&self) -> &ContentItem {
        &self.item
    }

    /// Child edges in discovery order.
    pub fn children(&self) -> &[Child] {
        &self.children
    }

    /// Edges from the root along the path this node was first found on.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Resolution status.
    pub fn status(&self) -> NodeStatus {
        self.status
    }

    /// Returns true if the node was pruned.
    pub fn is_pruned(&self) -> bool {
        self.status.is_pruned()
    }
}

/// The result of resolving a root entry.
///
/// Nodes are stored once per key, in the order they were discovered. The graph
/// is immutable once built.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    root: usize,
    nodes: Vec<DependencyNode>,
    index: HashMap<NodeKey, usize>,
    entry_count: usize,
    asset_count: usize,
}

impl DependencyGraph {
    /// Builds a graph from nodes listed in discovery order.
    ///
    /// Fails if a key repeats, the root is missing, an edge points at a node
    /// that is not in the list, or `Node` edges form a cycle. A cycle must be
    /// closed with a [`Child::EntryLoop`] edge.
    pub fn new(root: NodeKey, nodes: Vec<DependencyNode>) -> CoreResult<Self> {
        let mut index = HashMap::with_capacity(nodes.len());
        for (slot, node) in nodes.iter().enumerate() {
            if index.insert(node.key.clone(), slot).is_some() {
                return Err(CoreError::InvalidGraph {
                    message: format!("duplicate node {}", node.key),
                });
            }
        }

        let root = *index.get(&root).ok_or_else(|| CoreError::InvalidGraph {
            message: format!("root {root} is not among the nodes"),
        })?;

        for node in &nodes {
            if let Some(missing) = node.children.iter().find(|c| !index.contains_key(c.key())) {
                return Err(CoreError::InvalidGraph {
                    message: format!("{} links to unknown node {}", node.key, missing.key()),
                });
            }
        }

        if let Some(key) = find_node_cycle(&nodes, &index) {
            return Err(CoreError::InvalidGraph {
                message: format!("node edges form a cycle through {key}"),
            });
        }

        let entry_count = nodes.iter().filter(|n| n.kind() == ItemKind::Entry).count();
        let asset_count = nodes.len() - entry_count;

        Ok(Self {
            root,
            nodes,
            index,
            entry_count,
            asset_count,
        })
    }

    pub(crate) fn from_parts(
        root: usize,
        nodes: Vec<DependencyNode>,
        index: HashMap<NodeKey, usize>,
        entry_count: usize,
        asset_count: usize,
    ) -> Self {
        Self {
            root,
            nodes,
            index,
            entry_count,
            asset_count,
        }
    }

    /// The root node.
    pub fn root(&self) -> &DependencyNode {
        &self.nodes[self.root]
    }

    /// A view of the root node.
    pub fn root_view(&self) -> NodeView<'_> {
        NodeView {
            graph: self,
            node: self.root(),
            entry_loop: false,
        }
    }

    /// Looks up a node by key.
    pub fn node(&self, key: &NodeKey) -> Option<&DependencyNode> {
        self.index.get(key).map(|&slot| &self.nodes[slot])
    }

    /// Returns true if a node is stored under `key`.
    pub fn contains(&self, key: &NodeKey) -> bool {
        self.index.contains_key(key)
    }

    /// All distinct nodes in discovery order.
    pub fn nodes(&self) -> impl Iterator<Item = &DependencyNode> {
        self.nodes.iter()
    }

    /// Number of distinct nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a graph holds at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Distinct entries discovered, including content-type-loop prunes.
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    /// Distinct assets discovered.
    pub fn asset_count(&self) -> usize {
        self.asset_count
    }

    /// Stored nodes whose status is pruned.
    pub fn pruned_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_pruned()).count()
    }

    /// Views of a node's children, in discovery order.
    pub fn children<'g>(&'g self, node: &'g DependencyNode) -> impl Iterator<Item = NodeView<'g>> {
        node.children.iter().filter_map(move |child| {
            self.node(child.key()).map(|target| NodeView {
                graph: self,
                node: target,
                entry_loop: child.is_entry_loop(),
            })
        })
    }
}

/// A node as seen from one particular edge.
///
/// Reached through an entry-loop edge, the node reads as pruned with reason
/// `entry-loop` and no children.
#[derive(Debug, Clone, Copy)]
pub struct NodeView<'g> {
    graph: &'g DependencyGraph,
    node: &'g DependencyNode,
    entry_loop: bool,
}

impl<'g> NodeView<'g> {
    /// The stored node behind this view.
    pub fn node(&self) -> &'g DependencyNode {
        self.node
    }

    /// Node key.
    pub fn key(&self) -> &'g NodeKey {
        &self.node.key
    }

    /// Item identifier.
    pub fn id(&self) -> &'g str {
        self.node.id()
    }

    /// Item kind.
    pub fn kind(&self) -> ItemKind {
        self.node.kind()
    }

    /// The fetched item.
    pub fn item(&self) -> &'g ContentItem {
        &self.node.item
    }

    /// Depth of the stored node.
    pub fn depth(&self) -> usize {
        self.node.depth
    }

    /// Status at this occurrence.
    pub fn status(&self) -> NodeStatus {
        if self.entry_loop {
            NodeStatus::Pruned(PruneReason::EntryLoop)
        } else {
            self.node.status
        }
    }

    /// Returns true if pruned at this occurrence.
    pub fn is_pruned(&self) -> bool {
        self.status().is_pruned()
    }

    /// Prune reason at this occurrence.
    pub fn prune_reason(&self) -> Option<PruneReason> {
        self.status().prune_reason()
    }

    /// Children at this occurrence; empty when pruned.
    pub fn children(&self) -> Vec<NodeView<'g>> {
        if self.entry_loop {
            return Vec::new();
        }
        self.graph.children(self.node).collect()
    }

    /// Finds a child by identifier.
    pub fn child(&self, id: &str) -> Option<NodeView<'g>> {
        self.children().into_iter().find(|c| c.id() == id)
    }
}

/// Returns a key on a cycle of `Node` edges, if there is one.
fn find_node_cycle<'a>(
    nodes: &'a [DependencyNode],
    index: &HashMap<NodeKey, usize>,
) -> Option<&'a NodeKey> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark {
        New,
        Open,
        Done,
    }

    let mut marks = vec![Mark::New; nodes.len()];
    for start in 0..nodes.len() {
        if marks[start] != Mark::New {
            continue;
        }
        marks[start] = Mark::Open;
        let mut stack = vec![(start, 0usize)];

        while let Some(&(slot, next)) = stack.last() {
            let edge = nodes[slot].children[next..]
                .iter()
                .position(|c| !c.is_entry_loop())
                .map(|offset| next + offset);

            let Some(i) = edge else {
                marks[slot] = Mark::Done;
                stack.pop();
                continue;
            };
            if let Some(top) = stack.last_mut() {
                top.1 = i + 1;
            }
            let Some(&child) = index.get(nodes[slot].children[i].key()) else {
                continue;
            };
            match marks[child] {
                Mark::Open => return Some(&nodes[child].key),
                Mark::New => {
                    marks[child] = Mark::Open;
                    stack.push((child, 0));
                }
                Mark::Done => {}
            }
        }
    }
    None
}
