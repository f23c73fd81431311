//! Sync engine state machine.

use crate::error::SyncItemError;
use crate::plan::ExecutionPlan;
use crate::progress::{NoProgress, ProgressSink, SyncPhase, SyncProgress};
use contentsync_core::{ContentClient, DependencyGraph, DependencyNode};
use contentsync_model::{ContentItem, ItemKind};
use parking_lot::RwLock;
use serde::{Serialize, Serializer};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// The current state of the sync engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No run has started.
    Idle,
    /// A run is writing items.
    Syncing,
    /// The last run has finished.
    Complete,
}

impl SyncState {
    /// Returns true while a run is in progress.
    pub fn is_active(&self) -> bool {
        matches!(self, SyncState::Syncing)
    }
}

/// Statistics accumulated over every run of one engine.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Runs that reached `Complete`.
    pub runs_completed: u64,
    /// Entries written.
    pub entries_synced: u64,
    /// Assets written.
    pub assets_synced: u64,
    /// Writes that failed.
    pub items_failed: u64,
    /// Pruned nodes left out.
    pub items_skipped: u64,
    /// When the last run finished.
    pub last_run_time: Option<Instant>,
    /// Message of the last failed write.
    pub last_error: Option<String>,
}

/// Outcome of one run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// True if no write failed.
    pub success: bool,
    /// Entries written.
    pub entries_synced: usize,
    /// Assets written.
    pub assets_synced: usize,
    /// Pruned nodes in the graph.
    pub skipped_count: usize,
    /// Failed writes, in plan order.
    pub errors: Vec<SyncItemError>,
    /// Time spent planning and writing.
    #[serde(rename = "durationMs", serialize_with = "serialize_millis")]
    pub duration: Duration,
}

impl SyncReport {
    /// Items written successfully.
    pub fn synced_count(&self) -> usize {
        self.entries_synced + self.assets_synced
    }
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

/// Writes resolved graphs to the target environment.
pub struct SyncEngine<C: ContentClient> {
    client: C,
    state: RwLock<SyncState>,
    stats: RwLock<SyncStats>,
}

impl<C: ContentClient> SyncEngine<C> {
    /// Creates a new sync engine.
    pub fn new(client: C) -> Self {
        Self {
            client,
            state: RwLock::new(SyncState::Idle),
            stats: RwLock::new(SyncStats::default()),
        }
    }

    /// Gets the current state.
    pub fn state(&self) -> SyncState {
        *self.state.read()
    }

    /// Gets the accumulated stats.
    pub fn stats(&self) -> SyncStats {
        self.stats.read().clone()
    }

    /// Gets the underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }

    fn set_state(&self, state: SyncState) {
        *self.state.write() = state;
    }

    /// Writes every planned item of `graph`.
    pub fn execute(&self, graph: &DependencyGraph) -> SyncReport {
        self.execute_with_progress(graph, &mut NoProgress)
    }

    /// Writes every planned item of `graph`, reporting progress to `progress`.
    ///
    /// Failed writes are recorded in the report and the run continues.
    pub fn execute_with_progress<P>(&self, graph: &DependencyGraph, progress: &mut P) -> SyncReport
    where
        P: ProgressSink + ?Sized,
    {
        let start = Instant::now();
        self.set_state(SyncState::Syncing);

        let plan = ExecutionPlan::build(graph);
        let total = plan.len();
        info!(
            root = %graph.root().key(),
            items = total,
            skipped = plan.skipped_count(),
            "starting sync"
        );

        progress.on_progress(&SyncProgress::new(
            SyncPhase::Syncing,
            0,
            total,
            "Starting sync...",
        ));

        let mut entries_synced = 0;
        let mut assets_synced = 0;
        let mut errors = Vec::new();

        for (i, node) in plan.steps().iter().enumerate() {
            progress.on_progress(
                &SyncProgress::new(
                    SyncPhase::Syncing,
                    i + 1,
                    total,
                    format!("Syncing {}: {}", node.kind(), node.id()),
                )
                .with_item(node.id()),
            );

            match self.write_node(node) {
                Ok(()) => {
                    debug!(key = %node.key(), "wrote item");
                    match node.kind() {
                        ItemKind::Entry => entries_synced += 1,
                        ItemKind::Asset => assets_synced += 1,
                    }
                }
                Err(message) => {
                    warn!(key = %node.key(), error = %message, "write failed");
                    errors.push(SyncItemError::new(node.id(), node.kind(), message));
                }
            }
        }

        let report = SyncReport {
            success: errors.is_empty(),
            entries_synced,
            assets_synced,
            skipped_count: plan.skipped_count(),
            errors,
            duration: start.elapsed(),
        };

        progress.on_progress(&SyncProgress::new(
            SyncPhase::Complete,
            total,
            total,
            format!(
                "Sync complete: {} entries, {} assets",
                report.entries_synced, report.assets_synced
            ),
        ));

        self.record(&report);
        self.set_state(SyncState::Complete);

        info!(
            entries = report.entries_synced,
            assets = report.assets_synced,
            skipped = report.skipped_count,
            failed = report.errors.len(),
            elapsed_ms = report.duration.as_millis() as u64,
            "sync complete"
        );

        report
    }

    /// Writes one node, turning a panic in the client into an error message.
    fn write_node(&self, node: &DependencyNode) -> Result<(), String> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| match node.item() {
            ContentItem::Entry(entry) => self.client.write_entry(entry),
            ContentItem::Asset(asset) => self.client.write_asset(asset),
        }));

        match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(err.to_string()),
            Err(payload) => Err(panic_message(payload.as_ref())),
        }
    }

    fn record(&self, report: &SyncReport) {
        let mut stats = self.stats.write();
        stats.runs_completed += 1;
        stats.entries_synced += report.entries_synced as u64;
        stats.assets_synced += report.assets_synced as u64;
        stats.items_failed += report.errors.len() as u64;
        stats.items_skipped += report.skipped_count as u64;
        stats.last_run_time = Some(Instant::now());
        if let Some(last) = report.errors.last() {
            stats.last_error = Some(last.to_string());
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("client panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("client panicked: {message}")
    } else {
        "client panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contentsync_core::{
        Child, ClientResult, DependencyResolver, MemoryContentClient, NodeStatus, PruneReason,
    };
    use contentsync_model::{Asset, Entry, FieldValue, Fields, Link, NodeKey};

    fn linking(id: &str, content_type: &str, links: &[Link]) -> Entry {
        let items: Vec<FieldValue> = links.iter().cloned().map(FieldValue::Link).collect();
        let mut refs = Fields::new();
        refs.insert("en-US", items);
        Entry::new(id, content_type).with_field("refs", refs)
    }

    #[test]
    fn sync_state_checks() {
        assert!(SyncState::Syncing.is_active());
        assert!(!SyncState::Idle.is_active());
        assert!(!SyncState::Complete.is_active());
    }

    #[test]
    fn sync_engine_initial_state() {
        let engine = SyncEngine::new(MemoryContentClient::new());
        assert_eq!(engine.state(), SyncState::Idle);
        assert_eq!(engine.stats().runs_completed, 0);
    }

    #[test]
    fn writes_asset_before_entry() {
        let client = MemoryContentClient::new()
            .with_entry(linking("page", "page", &[Link::asset("hero")]))
            .with_asset(Asset::new("hero"));
        let graph = DependencyResolver::new(&client).resolve("page").unwrap();

        let engine = SyncEngine::new(&client);
        let report = engine.execute(&graph);

        assert!(report.success);
        assert_eq!(report.entries_synced, 1);
        assert_eq!(report.assets_synced, 1);
        assert_eq!(
            client.write_log(),
            vec![NodeKey::asset("hero"), NodeKey::entry("page")]
        );
        assert_eq!(engine.state(), SyncState::Complete);
    }

    #[test]
    fn failed_write_does_not_stop_the_run() {
        let client = MemoryContentClient::new()
            .with_entry(linking(
                "root",
                "page",
                &[Link::entry("first"), Link::entry("second")],
            ))
            .with_entry(Entry::new("first", "card"))
            .with_entry(Entry::new("second", "card"));
        client.fail_write(NodeKey::entry("first"), "validation failed");
        let graph = DependencyResolver::new(&client).resolve("root").unwrap();

        let engine = SyncEngine::new(&client);
        let report = engine.execute(&graph);

        assert!(!report.success);
        assert_eq!(report.entries_synced, 2);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].item_id, "first");
        assert_eq!(report.errors[0].item_type, ItemKind::Entry);
        assert!(report.errors[0].message.contains("validation failed"));
        assert_eq!(engine.state(), SyncState::Complete);

        let stats = engine.stats();
        assert_eq!(stats.items_failed, 1);
        assert!(stats.last_error.unwrap().contains("first"));
    }

    #[test]
    fn progress_events_in_order() {
        let client = MemoryContentClient::new()
            .with_entry(linking("root", "page", &[Link::asset("img")]))
            .with_asset(Asset::new("img"));
        let graph = DependencyResolver::new(&client).resolve("root").unwrap();

        let mut events = Vec::new();
        let report = SyncEngine::new(&client)
            .execute_with_progress(&graph, &mut |p: &SyncProgress| events.push(p.clone()));

        assert!(report.success);
        assert_eq!(events.len(), 4);
        assert_eq!(events[0].current, 0);
        assert_eq!(events[0].message, "Starting sync...");
        assert_eq!(events[1].current_item.as_deref(), Some("img"));
        assert_eq!(events[1].message, "Syncing asset: img");
        assert_eq!(events[2].current, 2);
        assert_eq!(events[2].total, 2);
        assert_eq!(events[3].phase, SyncPhase::Complete);
        assert_eq!(events[3].message, "Sync complete: 1 entries, 1 assets");
    }

    #[test]
    fn item_event_precedes_its_write() {
        let client = MemoryContentClient::new()
            .with_entry(linking(
                "root",
                "page",
                &[Link::entry("card"), Link::asset("img")],
            ))
            .with_entry(Entry::new("card", "card"))
            .with_asset(Asset::new("img"));
        let graph = DependencyResolver::new(&client).resolve("root").unwrap();

        let mut seen = Vec::new();
        SyncEngine::new(&client).execute_with_progress(&graph, &mut |p: &SyncProgress| {
            seen.push((p.phase, p.current, client.write_log().len()))
        });

        assert_eq!(
            seen,
            vec![
                (SyncPhase::Syncing, 0, 0),
                (SyncPhase::Syncing, 1, 0),
                (SyncPhase::Syncing, 2, 1),
                (SyncPhase::Syncing, 3, 2),
                (SyncPhase::Complete, 3, 3),
            ]
        );
    }

    #[test]
    fn pruned_nodes_are_counted_not_written() {
        let client = MemoryContentClient::new()
            .with_entry(linking("offer-1", "offer", &[Link::entry("home")]))
            .with_entry(linking("home", "offerHomePage", &[Link::entry("offer-2")]))
            .with_entry(Entry::new("offer-2", "offer"));
        let graph = DependencyResolver::new(&client).resolve("offer-1").unwrap();

        let report = SyncEngine::new(&client).execute(&graph);

        assert_eq!(report.skipped_count, 1);
        assert_eq!(report.entries_synced, 2);
        assert!(client.target_entry("offer-2").is_none());
    }

    #[test]
    fn hand_built_graph_with_entry_loop() {
        let a = DependencyNode::resolved(Entry::new("a", "x"), 0)
            .with_child(Child::Node(NodeKey::entry("b")));
        let b = DependencyNode::resolved(Entry::new("b", "y"), 1)
            .with_child(Child::EntryLoop(NodeKey::entry("a")));
        let graph = DependencyGraph::new(NodeKey::entry("a"), vec![a, b]).unwrap();
        assert_eq!(graph.node(&NodeKey::entry("a")).unwrap().status(), NodeStatus::Resolved);
        assert!(graph
            .root_view()
            .child("b")
            .and_then(|b| b.child("a"))
            .is_some_and(|a| a.prune_reason() == Some(PruneReason::EntryLoop)));

        let client = MemoryContentClient::new();
        let report = SyncEngine::new(&client).execute(&graph);

        assert_eq!(report.entries_synced, 2);
        assert_eq!(report.skipped_count, 0);
        assert_eq!(client.write_log(), vec![NodeKey::entry("b"), NodeKey::entry("a")]);
    }

    struct PanickingClient;

    impl ContentClient for PanickingClient {
        fn fetch_entry(&self, id: &str) -> ClientResult<Entry> {
            Ok(Entry::new(id, "page"))
        }

        fn fetch_asset(&self, id: &str) -> ClientResult<Asset> {
            Ok(Asset::new(id))
        }

        fn write_entry(&self, _entry: &Entry) -> ClientResult<()> {
            panic!("connection reset");
        }

        fn write_asset(&self, _asset: &Asset) -> ClientResult<()> {
            Ok(())
        }
    }

    #[test]
    fn client_panic_becomes_item_error() {
        let graph = DependencyGraph::new(
            NodeKey::entry("e1"),
            vec![DependencyNode::resolved(Entry::new("e1", "page"), 0)],
        )
        .unwrap();

        let report = SyncEngine::new(PanickingClient).execute(&graph);

        assert!(!report.success);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].message, "client panicked: connection reset");
    }

    #[test]
    fn report_json_shape() {
        let client = MemoryContentClient::new().with_entry(Entry::new("solo", "page"));
        let graph = DependencyResolver::new(&client).resolve("solo").unwrap();
        let report = SyncEngine::new(&client).execute(&graph);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["entriesSynced"], 1);
        assert!(json["durationMs"].is_u64());
        assert_eq!(report.synced_count(), 1);
    }

    #[test]
    fn stats_accumulate_across_runs() {
        let client = MemoryContentClient::new().with_entry(Entry::new("solo", "page"));
        let graph = DependencyResolver::new(&client).resolve("solo").unwrap();
        let engine = SyncEngine::new(&client);

        engine.execute(&graph);
        engine.execute(&graph);

        let stats = engine.stats();
        assert_eq!(stats.runs_completed, 2);
        assert_eq!(stats.entries_synced, 2);
        assert!(stats.last_run_time.is_some());
        assert_eq!(client.target_entry("solo").unwrap().metadata.version, Some(2));
    }
}
