//! Resolve command implementation.

use crate::export::ExportClient;
use crate::{Format, SourceArgs};
use contentsync_core::{DependencyGraph, NodeView, PruneReason};
use contentsync_model::{ItemKind, NodeKey};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt::Write;

/// One occurrence of a node in the printed tree.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    /// Item identifier.
    pub id: String,
    /// Item kind.
    pub kind: ItemKind,
    /// Content type (entries only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Display title.
    pub title: String,
    /// Depth of the stored node.
    pub depth: usize,
    /// `resolved` or `pruned`.
    pub status: String,
    /// Prune reason, if pruned here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    /// The node was already expanded at an earlier occurrence.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub shared: bool,
    /// Children at this occurrence; empty for shared occurrences.
    pub children: Vec<TreeNode>,
}

/// Resolution result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveOutput {
    /// Root entry identifier.
    pub root: String,
    /// Distinct entries discovered.
    pub entry_count: usize,
    /// Distinct assets discovered.
    pub asset_count: usize,
    /// Stored nodes that were pruned.
    pub pruned_count: usize,
    /// Dependency tree.
    pub tree: TreeNode,
}

impl ResolveOutput {
    /// Summarizes `graph`.
    pub fn new(graph: &DependencyGraph, locale: &str) -> Self {
        Self {
            root: graph.root().id().to_string(),
            entry_count: graph.entry_count(),
            asset_count: graph.asset_count(),
            pruned_count: graph.pruned_count(),
            tree: tree(graph.root_view(), locale),
        }
    }
}

/// Builds the tree below `view`.
///
/// Each stored node is expanded once, at its first occurrence in depth-first
/// order. Later occurrences are leaves marked `shared`, so the tree has one
/// entry per edge of the graph.
pub fn tree(view: NodeView<'_>, locale: &str) -> TreeNode {
    build(view, locale, &mut HashSet::new())
}

fn build<'g>(view: NodeView<'g>, locale: &str, expanded: &mut HashSet<&'g NodeKey>) -> TreeNode {
    let reason = view.prune_reason();
    let shared = reason != Some(PruneReason::EntryLoop) && !expanded.insert(view.key());
    let children = if shared {
        Vec::new()
    } else {
        view.children()
            .into_iter()
            .map(|child| build(child, locale, expanded))
            .collect()
    };

    TreeNode {
        id: view.id().to_string(),
        kind: view.kind(),
        content_type: view.item().content_type().map(str::to_string),
        title: view.item().display_title(locale).to_string(),
        depth: view.depth(),
        status: view.status().to_string(),
        reason: reason.map(|r| r.as_str()),
        shared,
        children,
    }
}

/// Number of nodes in the tree.
pub fn tree_size(node: &TreeNode) -> usize {
    1 + node.children.iter().map(tree_size).sum::<usize>()
}

/// Renders the tree as indented text.
pub fn render_text(node: &TreeNode) -> String {
    let mut out = String::new();
    render_node(node, 0, &mut out);
    out
}

fn render_node(node: &TreeNode, level: usize, out: &mut String) {
    let _ = write!(out, "{}- {} {} \"{}\"", "  ".repeat(level), node.kind, node.id, node.title);
    if let Some(content_type) = &node.content_type {
        let _ = write!(out, " [{content_type}]");
    }
    if let Some(reason) = node.reason {
        let _ = write!(out, " (pruned: {reason})");
    }
    if node.shared {
        out.push_str(" (see above)");
    }
    out.push('\n');

    for child in &node.children {
        render_node(child, level + 1, out);
    }
}

/// Runs the resolve command.
pub fn run(args: &SourceArgs) -> Result<(), Box<dyn std::error::Error>> {
    let client = ExportClient::open(&args.source, None)?;
    let graph = super::resolve_graph(args, &client)?;
    let output = ResolveOutput::new(&graph, &args.locale);

    match args.format {
        Format::Json => {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Format::Text => {
            print!("{}", render_text(&output.tree));
            println!();
            println!(
                "{} entries, {} assets, {} pruned",
                output.entry_count, output.asset_count, output.pruned_count
            );
        }
    }

    Ok(())
}
