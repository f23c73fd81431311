//! Plan command implementation.

use crate::export::ExportClient;
use crate::{Format, SourceArgs};
use contentsync_sync_engine::{ExecutionPlan, SyncPlan};
use serde::Serialize;

/// Planned writes for one root.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanOutput {
    /// Root entry identifier.
    pub root: String,
    /// Items in write order.
    pub plan: SyncPlan,
    /// Pruned nodes left out.
    pub skipped_count: usize,
}

/// Runs the plan command.
pub fn run(args: &SourceArgs) -> Result<(), Box<dyn std::error::Error>> {
    let client = ExportClient::open(&args.source, None)?;
    let graph = super::resolve_graph(args, &client)?;
    let plan = ExecutionPlan::build(&graph);

    match args.format {
        Format::Json => {
            let output = PlanOutput {
                root: args.id.clone(),
                plan: plan.summary(),
                skipped_count: plan.skipped_count(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Format::Text => {
            println!(
                "Execution order ({} items, {} skipped)",
                plan.len(),
                plan.skipped_count()
            );
            for (i, node) in plan.steps().iter().enumerate() {
                println!(
                    "{:>4}. {} {}  {}",
                    i + 1,
                    node.kind(),
                    node.id(),
                    node.item().display_title(&args.locale)
                );
            }
        }
    }

    Ok(())
}
