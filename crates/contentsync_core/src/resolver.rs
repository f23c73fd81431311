//! Dependency graph resolution.

use crate::client::{ClientError, ContentClient};
use crate::config::ResolverConfig;
use crate::error::{CoreError, CoreResult};
use crate::graph::{Child, DependencyGraph, DependencyNode, NodeStatus, PruneReason};
use contentsync_model::{ItemKind, Link, NodeKey};
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Bookkeeping for one `resolve` call.
#[derive(Default)]
struct Traversal {
    visited: HashSet<NodeKey>,
    nodes: Vec<DependencyNode>,
    index: HashMap<NodeKey, usize>,
    entry_count: usize,
    asset_count: usize,
    dropped: Vec<(NodeKey, ClientError)>,
}

impl Traversal {
    /// Stores a node and returns the edge pointing at it.
    fn record(&mut self, node: DependencyNode) -> (usize, Child) {
        let slot = self.nodes.len();
        let key = node.key().clone();
        self.index.insert(key.clone(), slot);
        self.nodes.push(node);
        (slot, Child::Node(key))
    }

    /// Edge to an already stored node, if there is one.
    fn existing(&self, key: NodeKey) -> Option<Child> {
        self.index.contains_key(&key).then(|| Child::Node(key))
    }
}

/// Content types and entry ids on the path from the root to the current entry.
#[derive(Default)]
struct Path {
    content_types: Vec<String>,
    entries: Vec<String>,
}

impl Path {
    fn has_entry(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e == id)
    }

    fn has_content_type(&self, content_type: &str) -> bool {
        self.content_types.iter().any(|ct| ct == content_type)
    }

    fn push(&mut self, id: &str, content_type: &str) {
        self.entries.push(id.to_string());
        self.content_types.push(content_type.to_string());
    }

    fn pop(&mut self) {
        self.entries.pop();
        self.content_types.pop();
    }
}

/// Discovers every entry and asset reachable from a root entry.
///
/// Traversal is depth-first with one fetch in flight at a time. All traversal
/// state lives in the `resolve` call, so one resolver may serve several
/// threads at once.
pub struct DependencyResolver<C: ContentClient> {
    client: C,
    config: ResolverConfig,
}

impl<C: ContentClient> DependencyResolver<C> {
    /// Creates a resolver with the default configuration.
    pub fn new(client: C) -> Self {
        Self::with_config(client, ResolverConfig::default())
    }

    /// Creates a resolver with the given configuration.
    pub fn with_config(client: C, config: ResolverConfig) -> Self {
        Self { client, config }
    }

    /// Gets the configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Gets the underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Builds the dependency graph of `root_id`.
    ///
    /// Failures to fetch anything but the root drop that edge. Failing to
    /// fetch the root returns [`CoreError::ResolutionFailed`].
    pub fn resolve(&self, root_id: &str) -> CoreResult<DependencyGraph> {
        let start = Instant::now();
        let mut traversal = Traversal::default();
        let mut path = Path::default();

        let Some(root) = self.resolve_entry(root_id, 0, &mut path, &mut traversal) else {
            let root_key = NodeKey::entry(root_id);
            let reason = traversal
                .dropped
                .iter()
                .find(|(key, _)| *key == root_key)
                .map(|(_, err)| err.to_string())
                .unwrap_or_else(|| format!("depth limit {} reached", self.config.max_depth));
            return Err(CoreError::resolution_failed(root_id, reason));
        };

        let root = traversal.index[root.key()];
        let graph = DependencyGraph::from_parts(
            root,
            traversal.nodes,
            traversal.index,
            traversal.entry_count,
            traversal.asset_count,
        );

        info!(
            root = root_id,
            title = graph.root().item().display_title(&self.config.default_locale),
            entries = graph.entry_count(),
            assets = graph.asset_count(),
            pruned = graph.pruned_count(),
            dropped = traversal.dropped.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "resolved dependency graph"
        );

        Ok(graph)
    }

    fn resolve_entry(
        &self,
        id: &str,
        depth: usize,
        path: &mut Path,
        traversal: &mut Traversal,
    ) -> Option<Child> {
        let key = NodeKey::entry(id);

        if path.has_entry(id) {
            debug!(entry = id, depth, "entry is its own ancestor, pruning");
            return traversal
                .index
                .contains_key(&key)
                .then(|| Child::EntryLoop(key));
        }

        if traversal.visited.contains(&key) {
            return traversal.existing(key);
        }

        if depth >= self.config.max_depth {
            debug!(entry = id, depth, "depth limit reached");
            return traversal.existing(key);
        }

        traversal.visited.insert(key.clone());

        let entry = match self.client.fetch_entry(id) {
            Ok(entry) => entry,
            Err(err) => {
                warn!(%key, error = %err, "fetch failed, dropping edge");
                traversal.dropped.push((key, err));
                return None;
            }
        };

        if path.has_content_type(&entry.content_type) {
            debug!(
                entry = id,
                content_type = %entry.content_type,
                depth,
                "content type already on path, pruning"
            );
            traversal.entry_count += 1;
            let node = DependencyNode::new(
                entry,
                depth,
                NodeStatus::Pruned(PruneReason::ContentTypeLoop),
            );
            return Some(traversal.record(node).1);
        }

        let links: Vec<Link> = entry.links().into_iter().cloned().collect();
        let content_type = entry.content_type.clone();
        debug!(entry = id, %content_type, depth, links = links.len(), "resolved entry");

        traversal.entry_count += 1;
        let (slot, edge) = traversal.record(DependencyNode::resolved(entry, depth));

        path.push(id, &content_type);
        for link in links {
            let child = match link.kind {
                ItemKind::Entry => self.resolve_entry(&link.id, depth + 1, path, traversal),
                ItemKind::Asset => self.resolve_asset(&link.id, depth + 1, traversal),
            };
            if let Some(child) = child {
                traversal.nodes[slot].push_child(child);
            }
        }
        path.pop();

        Some(edge)
    }

    fn resolve_asset(&self, id: &str, depth: usize, traversal: &mut Traversal) -> Option<Child> {
        let key = NodeKey::asset(id);

        if traversal.visited.contains(&key) {
            return traversal.existing(key);
        }

        if depth >= self.config.max_depth {
            debug!(asset = id, depth, "depth limit reached");
            return traversal.existing(key);
        }

        traversal.visited.insert(key.clone());

        let asset = match self.client.fetch_asset(id) {
            Ok(asset) => asset,
            Err(err) => {
                warn!(%key, error = %err, "fetch failed, dropping edge");
                traversal.dropped.push((key, err));
                return None;
            }
        };

        debug!(asset = id, depth, "resolved asset");
        traversal.asset_count += 1;
        Some(traversal.record(DependencyNode::resolved(asset, depth)).1)
    }
}
