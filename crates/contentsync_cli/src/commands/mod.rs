//! CLI command implementations.

pub mod plan;
pub mod resolve;
pub mod sync;

use crate::export::ExportClient;
use crate::SourceArgs;
use contentsync_core::{CoreResult, DependencyGraph, DependencyResolver, ResolverConfig};

/// Resolves the requested root against `client`.
pub fn resolve_graph(args: &SourceArgs, client: &ExportClient) -> CoreResult<DependencyGraph> {
    let config = ResolverConfig::new()
        .with_max_depth(args.max_depth)
        .with_default_locale(&args.locale);
    DependencyResolver::with_config(client, config).resolve(&args.id)
}
