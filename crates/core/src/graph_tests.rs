// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::service::ServiceId;
use crate::test_support::{graph_with, service_spec};
use chrono::TimeZone;

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap()
}

fn active_ids(graph: &WorkspaceGraph) -> Vec<&str> {
    graph
        .workspaces
        .iter()
        .filter(|w| w.is_active)
        .map(|w| w.id.as_str())
        .collect()
}

#[test]
fn default_graph_has_active_personal() {
    let graph = WorkspaceGraph::with_default_workspace(WorkspaceId::new("ws-0"), at(0));
    assert_eq!(graph.workspaces.len(), 1);
    let ws = &graph.workspaces[0];
    assert_eq!(ws.name, DEFAULT_WORKSPACE_NAME);
    assert!(ws.is_active);
    assert_eq!(graph.active_workspace_id.as_ref().unwrap(), "ws-0");
}

#[test]
fn activate_moves_the_single_active_flag() {
    let mut graph = graph_with(&["ws-a", "ws-b", "ws-c"]);
    assert_eq!(graph.activate("ws-a", at(1)), Some(None));
    assert_eq!(active_ids(&graph), vec!["ws-a"]);

    let previous = graph.activate("ws-c", at(2)).unwrap();
    assert_eq!(previous.unwrap(), "ws-a");
    assert_eq!(active_ids(&graph), vec!["ws-c"]);
    assert_eq!(graph.workspace("ws-c").unwrap().last_accessed, at(2));
    assert_eq!(graph.active_workspace_id.as_ref().unwrap(), "ws-c");
}

#[test]
fn activate_unknown_changes_nothing() {
    let mut graph = graph_with(&["ws-a"]);
    graph.activate("ws-a", at(1));
    assert_eq!(graph.activate("missing", at(2)), None);
    assert_eq!(active_ids(&graph), vec!["ws-a"]);
}

#[test]
fn remove_clears_references() {
    let mut graph = graph_with(&["ws-a", "ws-b"]);
    graph.activate("ws-a", at(1));
    graph.settings.default_workspace = Some(WorkspaceId::new("ws-a"));
    graph.partitions.push(PartitionRecord {
        key: PartitionKey::new("ws-a"),
        label: Some("main".into()),
        persistent: true,
        created: at(0),
    });

    let removed = graph.remove("ws-a").unwrap();
    assert_eq!(removed.id, "ws-a");
    assert!(graph.active_workspace_id.is_none());
    assert!(graph.settings.default_workspace.is_none());
    assert!(graph.partitions.is_empty());
    assert!(graph.active().is_none());
}

#[test]
fn normalize_enforces_single_active() {
    let mut graph = graph_with(&["ws-a", "ws-b", "ws-c"]);
    for ws in &mut graph.workspaces {
        ws.is_active = true;
    }
    graph.active_workspace_id = Some(WorkspaceId::new("ws-b"));
    graph.normalize();
    assert_eq!(active_ids(&graph), vec!["ws-b"]);

    // Dangling pointer falls back to the first flagged workspace
    graph.active_workspace_id = Some(WorkspaceId::new("gone"));
    graph.workspaces[2].is_active = true;
    graph.normalize();
    assert_eq!(active_ids(&graph), vec!["ws-b"]);
    assert_eq!(graph.active_workspace_id.as_ref().unwrap(), "ws-b");
}

#[test]
fn normalize_backfills_abbreviation() {
    let mut graph = graph_with(&["ws-a"]);
    graph.workspaces[0].name = "Deep Work".into();
    graph.workspaces[0].abbreviation = String::new();
    graph.normalize();
    assert_eq!(graph.workspaces[0].abbreviation, "DW");
}

#[test]
fn partition_keys_follow_isolation_mode() {
    let mut graph = graph_with(&["ws-a", "ws-b"]);
    graph.workspaces[1].isolation_mode = IsolationMode::Isolated;
    for ws in &mut graph.workspaces {
        for n in 1..=2 {
            let id = format!("{}-svc-{n}", ws.id);
            ws.services.push(Service::new(ServiceId::new(id), service_spec()));
        }
    }

    let keys: Vec<(String, usize)> = graph
        .partition_keys()
        .into_iter()
        .map(|(k, _, services)| (k.to_string(), services.len()))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("ws-a".to_string(), 2),
            ("ws-b.ws-b-svc-1".to_string(), 1),
            ("ws-b.ws-b-svc-2".to_string(), 1),
        ]
    );
}

#[test]
fn empty_shared_workspace_still_has_a_key() {
    let graph = graph_with(&["ws-a"]);
    let keys = graph.partition_keys();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].0, "ws-a");
}

#[test]
fn prune_drops_records_of_removed_services() {
    let mut graph = graph_with(&["ws-a"]);
    graph.workspaces[0].isolation_mode = IsolationMode::Isolated;
    graph.workspaces[0]
        .services
        .push(Service::new(ServiceId::new("svc-1"), service_spec()));
    graph.partitions.push(PartitionRecord {
        key: PartitionKey::new("ws-a.svc-1"),
        label: None,
        persistent: false,
        created: at(0),
    });
    assert!(graph.is_live_key("ws-a.svc-1"));
    assert_eq!(
        graph.workspace_partition_keys("ws-a").unwrap(),
        vec![PartitionKey::new("ws-a.svc-1")]
    );

    graph.workspaces[0].services.clear();
    graph.prune_partitions();
    assert!(graph.partitions.is_empty());
    assert!(!graph.is_live_key("ws-a.svc-1"));
    assert!(graph.workspace_partition_keys("missing").is_none());
}
