// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::migration::MigrationError;
use berth_core::test_support::{fixed_time, workspace_with_services};
use berth_core::{IsolationMode, PartitionKey, PartitionRecord, WorkspaceId};
use chrono::{DateTime, Utc};
use serde_json::json;
use similar_asserts::assert_eq;

fn sample_graph() -> WorkspaceGraph {
    let mut personal = workspace_with_services("ws-1", IsolationMode::Shared, &["svc-1"]);
    personal.is_active = true;
    let work = workspace_with_services("ws-2", IsolationMode::Isolated, &["svc-2", "svc-3"]);
    let mut graph = WorkspaceGraph {
        workspaces: vec![personal, work],
        active_workspace_id: Some(WorkspaceId::new("ws-1")),
        ..WorkspaceGraph::default()
    };
    graph.settings.auto_switch_on_activity = true;
    graph.partitions.push(PartitionRecord {
        key: PartitionKey::new("ws-2.svc-2"),
        label: Some("work mail".into()),
        persistent: false,
        created: fixed_time(),
    });
    graph
}

#[test]
fn encode_then_decode_is_equal() {
    let graph = sample_graph();
    let bytes = encode(&graph).unwrap();
    let decoded = decode(&bytes, &MigrationRegistry::new()).unwrap();
    assert_eq!(decoded, graph);
}

#[test]
fn encoded_document_shape() {
    let bytes = encode(&sample_graph()).unwrap();
    let value: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(value["v"], CURRENT_VERSION);
    assert_eq!(value["activeWorkspaceId"], "ws-1");
    assert_eq!(value["settings"]["autoSwitchOnActivity"], true);
    let ws = &value["workspaces"][1];
    assert_eq!(ws["isolationMode"], "isolated");
    assert_eq!(ws["created"], "2024-01-01T00:00:00Z");
    assert_eq!(ws["services"][0]["type"], "slack");
    assert_eq!(ws["services"][0]["isEnabled"], true);
    assert_eq!(value["partitions"][0]["key"], "ws-2.svc-2");
}

#[test]
fn unknown_fields_survive_a_round_trip() {
    let doc = json!({
        "v": 2,
        "theme": "dark",
        "workspaces": [{
            "id": "ws-1",
            "name": "Personal",
            "abbreviation": "P",
            "color": "#000",
            "isolationMode": "shared",
            "services": [{
                "id": "svc-1", "name": "Chat", "type": "slack", "url": "https://x",
                "isEnabled": true, "config": {}, "badge": 3
            }],
            "created": "2024-01-01T00:00:00Z",
            "lastAccessed": "2024-01-01T00:00:00Z",
            "isActive": true,
            "sortOrder": 7
        }],
        "settings": { "autoSwitchOnActivity": false, "fontSize": 14 }
    });
    let registry = MigrationRegistry::new();
    let graph = decode(&serde_json::to_vec(&doc).unwrap(), &registry).unwrap();
    let written: Value = serde_json::from_slice(&encode(&graph).unwrap()).unwrap();

    assert_eq!(written["theme"], "dark");
    assert_eq!(written["settings"]["fontSize"], 14);
    assert_eq!(written["workspaces"][0]["sortOrder"], 7);
    assert_eq!(written["workspaces"][0]["services"][0]["badge"], 3);
}

#[test]
fn service_missing_is_enabled_defaults_true() {
    let doc = json!({
        "v": 2,
        "workspaces": [{
            "id": "ws-1", "name": "Personal",
            "services": [{ "id": "svc-1", "name": "Chat", "url": "https://x" }],
            "created": "2024-01-01T00:00:00Z",
            "lastAccessed": "2024-01-01T00:00:00Z"
        }]
    });
    let graph = decode(&serde_json::to_vec(&doc).unwrap(), &MigrationRegistry::new()).unwrap();
    assert!(graph.workspaces[0].services[0].is_enabled);
    assert_eq!(graph.workspaces[0].abbreviation, "P");
}

#[test]
fn missing_timestamps_do_not_reject_the_document() {
    let doc = json!({
        "v": 2,
        "workspaces": [
            { "id": "ws-1", "name": "Personal", "isActive": true },
            { "id": "ws-2", "name": "Work", "created": "2024-01-01T00:00:00Z" }
        ],
        "partitions": [{ "key": "ws-2", "persistent": false }]
    });
    let graph = decode(&serde_json::to_vec(&doc).unwrap(), &MigrationRegistry::new()).unwrap();

    assert_eq!(graph.workspaces.len(), 2);
    assert_eq!(graph.workspaces[0].created, DateTime::<Utc>::default());
    assert_eq!(graph.workspaces[0].last_accessed, DateTime::<Utc>::default());
    assert_eq!(graph.workspaces[1].created, fixed_time());
    assert_eq!(graph.workspaces[1].last_accessed, DateTime::<Utc>::default());
    assert_eq!(graph.active_workspace_id, Some(WorkspaceId::new("ws-1")));
}

#[test]
fn decode_rejects_garbage() {
    let err = decode(b"\xe5\x03not json", &MigrationRegistry::new()).unwrap_err();
    assert!(matches!(err, StoreError::Snapshot(_)));
}

#[test]
fn decode_rejects_newer_documents() {
    let err = decode(br#"{"v": 99}"#, &MigrationRegistry::new()).unwrap_err();
    assert!(matches!(err, StoreError::Migration(MigrationError::TooNew(99, _))));
}
