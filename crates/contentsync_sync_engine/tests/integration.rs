//! Integration tests for resolution followed by replay.

use contentsync_core::{DependencyResolver, MemoryContentClient, NodeStatus, PruneReason};
use contentsync_model::{ItemKind, Link, NodeKey};
use contentsync_sync_engine::{ExecutionPlan, SyncEngine, SyncPhase, SyncProgress, SyncState};
use contentsync_testkit::prelude::*;
use std::collections::{HashMap, HashSet};

fn keys(client: &MemoryContentClient) -> Vec<String> {
    client.write_log().iter().map(|k| k.to_string()).collect()
}

#[test]
fn direct_cycle_end_to_end() {
    let scenario = direct_cycle();
    let graph = DependencyResolver::new(&scenario.client)
        .resolve(scenario.root)
        .unwrap();

    assert_eq!(graph.entry_count(), 2);
    let looped = graph
        .root_view()
        .child("entry-b")
        .and_then(|b| b.child("entry-a"))
        .unwrap();
    assert_eq!(looped.status(), NodeStatus::Pruned(PruneReason::EntryLoop));

    let report = SyncEngine::new(&scenario.client).execute(&graph);

    assert!(report.success);
    assert_eq!(report.entries_synced, 2);
    assert_eq!(report.skipped_count, 0);
    assert_eq!(keys(&scenario.client), vec!["entry:entry-b", "entry:entry-a"]);
}

#[test]
fn content_type_loop_end_to_end() {
    let scenario = content_type_loop();
    let graph = DependencyResolver::new(&scenario.client)
        .resolve(scenario.root)
        .unwrap();

    assert_eq!(graph.entry_count(), 3);
    assert!(!graph.contains(&NodeKey::entry("category-1")));

    let report = SyncEngine::new(&scenario.client).execute(&graph);

    assert_eq!(report.skipped_count, 1);
    assert_eq!(report.entries_synced, 2);
    assert_eq!(
        keys(&scenario.client),
        vec!["entry:homepage-1", "entry:offer-1"]
    );
}

#[test]
fn shared_references_end_to_end() {
    let scenario = shared_references();
    let graph = DependencyResolver::new(&scenario.client)
        .resolve(scenario.root)
        .unwrap();

    assert_eq!(graph.entry_count(), 4);
    assert_eq!(graph.asset_count(), 2);

    let mut events = Vec::new();
    let engine = SyncEngine::new(&scenario.client);
    let report = engine.execute_with_progress(&graph, &mut |p: &SyncProgress| {
        events.push(p.clone())
    });

    assert!(report.success);
    assert_eq!(report.assets_synced, 2);
    assert_eq!(
        keys(&scenario.client),
        vec![
            "asset:hero",
            "asset:logo",
            "entry:footer",
            "entry:left",
            "entry:right",
            "entry:landing",
        ]
    );
    assert_eq!(events.len(), 8);
    assert!(events[1..7].iter().all(|e| e.phase == SyncPhase::Syncing));
    assert_eq!(events[7].phase, SyncPhase::Complete);
    assert_eq!(engine.state(), SyncState::Complete);
}

#[test]
fn partial_failure_between_siblings() {
    let client = MemoryContentClient::new()
        .with_entry(
            entry("parent", "page")
                .links("items", &[Link::entry("first"), Link::entry("second")])
                .build(),
        )
        .with_entry(entry("first", "card").build())
        .with_entry(entry("second", "teaser").build());
    client.fail_write(NodeKey::entry("first"), "validation failed");

    let graph = DependencyResolver::new(&client).resolve("parent").unwrap();
    let engine = SyncEngine::new(&client);
    let report = engine.execute(&graph);

    assert!(!report.success);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].item_id, "first");
    assert!(client.target_entry("second").is_some());
    assert!(client.target_entry("parent").is_some());
    assert_eq!(engine.state(), SyncState::Complete);
}

#[test]
fn root_not_found_returns_no_graph() {
    let client = MemoryContentClient::new();
    let result = DependencyResolver::new(&client).resolve("nonexistent");
    assert!(result.is_err());
    assert!(client.write_log().is_empty());
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn resolution_dedups_and_counts(set in content_set_strategy(10, 5)) {
            let client = set.client();
            let graph = DependencyResolver::new(&client).resolve(set.root()).unwrap();

            let log = client.fetch_log();
            let unique: HashSet<_> = log.iter().collect();
            prop_assert_eq!(unique.len(), log.len());

            let entries = graph.nodes().filter(|n| n.kind() == ItemKind::Entry).count();
            prop_assert_eq!(graph.entry_count(), entries);
            prop_assert_eq!(graph.asset_count(), graph.len() - entries);

            for node in graph.nodes() {
                if node.is_pruned() {
                    prop_assert!(node.children().is_empty());
                }
                prop_assert!(!node.key().id.starts_with(MISSING_ID));
            }
        }

        #[test]
        fn plan_respects_dependencies(set in content_set_strategy(10, 5)) {
            let client = set.client();
            let graph = DependencyResolver::new(&client).resolve(set.root()).unwrap();
            let plan = ExecutionPlan::build(&graph);

            let position: HashMap<&NodeKey, usize> = plan
                .steps()
                .iter()
                .enumerate()
                .map(|(i, n)| (n.key(), i))
                .collect();
            prop_assert_eq!(position.len(), plan.len());
            prop_assert_eq!(plan.len() + plan.skipped_count(), graph.len());

            let mut parents: HashMap<&NodeKey, usize> = HashMap::new();
            for node in graph.nodes() {
                for child in node.children().iter().filter(|c| !c.is_entry_loop()) {
                    *parents.entry(child.key()).or_default() += 1;
                }
            }

            for node in plan.steps() {
                prop_assert!(!node.is_pruned());
                let here = position[node.key()];
                let scheduled: Vec<_> = node
                    .children()
                    .iter()
                    .filter(|c| !c.is_entry_loop())
                    .filter_map(|c| position.get(c.key()).map(|&p| (c, p)))
                    .collect();

                for (_, p) in &scheduled {
                    prop_assert!(*p < here);
                }

                // An entry child only this node links to is reached after
                // every asset sibling.
                let entries = scheduled.iter().filter(|(c, _)| c.kind() == ItemKind::Entry);
                for (entry_child, entry_pos) in entries {
                    if parents[entry_child.key()] > 1 {
                        continue;
                    }
                    for (_, asset_pos) in scheduled.iter().filter(|(c, _)| c.kind() == ItemKind::Asset) {
                        prop_assert!(asset_pos < entry_pos);
                    }
                }
            }
        }

        #[test]
        fn replay_writes_every_planned_item_once(set in content_set_strategy(10, 5)) {
            let client = set.client();
            let graph = DependencyResolver::new(&client).resolve(set.root()).unwrap();
            let planned = ExecutionPlan::build(&graph).summary();

            let report = SyncEngine::new(&client).execute(&graph);

            prop_assert!(report.success);
            prop_assert_eq!(report.synced_count(), planned.order.len());
            prop_assert_eq!(report.skipped_count, graph.pruned_count());
            prop_assert_eq!(client.write_log(), planned.order);
        }
    }
}
