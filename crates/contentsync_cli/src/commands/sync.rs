//! Sync command implementation.

use crate::export::ExportClient;
use crate::{Format, SourceArgs};
use contentsync_sync_engine::{SyncEngine, SyncPhase, SyncProgress, SyncReport};
use std::path::Path;
use tracing::info;

fn print_progress(progress: &SyncProgress) {
    if progress.phase == SyncPhase::Syncing && progress.current > 0 {
        println!("[{}/{}] {}", progress.current, progress.total, progress.message);
    } else {
        println!("{}", progress.message);
    }
}

fn print_report(report: &SyncReport) {
    println!();
    println!("Entries synced: {}", report.entries_synced);
    println!("Assets synced:  {}", report.assets_synced);
    println!("Skipped:        {}", report.skipped_count);
    println!("Duration:       {:?}", report.duration);

    if !report.errors.is_empty() {
        println!();
        println!("Errors:");
        for error in &report.errors {
            println!("  {error}");
        }
    }
}

/// Copies the root entry and its dependencies into `target`.
pub fn sync(args: &SourceArgs, target: &Path) -> Result<SyncReport, Box<dyn std::error::Error>> {
    let client = ExportClient::open(&args.source, Some(target))?;
    let (entries, assets) = client.source_counts();
    info!(root = %args.id, entries, assets, target = %target.display(), "opened exports");
    let text = args.format == Format::Text;

    if text {
        print_progress(&SyncProgress::new(
            SyncPhase::Resolving,
            0,
            0,
            format!("Resolving dependencies of {}...", args.id),
        ));
    }

    let graph = match super::resolve_graph(args, &client) {
        Ok(graph) => graph,
        Err(err) => {
            if text {
                print_progress(&SyncProgress::new(SyncPhase::Error, 0, 0, err.to_string()));
            }
            return Err(err.into());
        }
    };

    let engine = SyncEngine::new(&client);
    let report = engine.execute_with_progress(&graph, &mut |p: &SyncProgress| {
        if text {
            print_progress(p);
        }
    });
    client.save()?;

    Ok(report)
}

/// Runs the sync command.
pub fn run(args: &SourceArgs, target: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let report = sync(args, target)?;

    match args.format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        Format::Text => print_report(&report),
    }

    if report.success {
        Ok(())
    } else {
        Err(format!("{} item(s) failed to sync", report.errors.len()).into())
    }
}
