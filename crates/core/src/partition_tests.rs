// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::service::ServiceSpec;
use crate::workspace::WorkspaceSpec;

fn workspace(mode: IsolationMode) -> Workspace {
    Workspace::new(
        WorkspaceId::new("ws-1"),
        WorkspaceSpec::named("Work"),
        mode,
        Utc::now(),
    )
}

fn service(id: &str) -> Service {
    Service::new(
        ServiceId::new(id),
        ServiceSpec::new("Chat", "slack", "https://chat.example.com"),
    )
}

#[test]
fn shared_mode_uses_workspace_id() {
    let ws = workspace(IsolationMode::Shared);
    assert_eq!(resolve_key(&ws, &service("svc-1")), "ws-1");
    assert_eq!(resolve_key(&ws, &service("svc-2")), "ws-1");
}

#[test]
fn isolated_mode_appends_service_id() {
    let ws = workspace(IsolationMode::Isolated);
    assert_eq!(resolve_key(&ws, &service("svc-1")), "ws-1.svc-1");
    assert_eq!(resolve_key(&ws, &service("svc-2")), "ws-1.svc-2");
}

#[test]
fn resolution_is_deterministic_across_reloads() {
    let ws = workspace(IsolationMode::Isolated);
    let svc = service("svc-9");
    let json = serde_json::to_string(&ws).unwrap();
    let reloaded: Workspace = serde_json::from_str(&json).unwrap();
    assert_eq!(resolve_key(&ws, &svc), resolve_key(&reloaded, &svc));
}

#[test]
fn record_defaults_to_persistent() {
    let record: PartitionRecord = serde_json::from_value(serde_json::json!({
        "key": "ws-1",
        "created": "2024-05-01T10:00:00Z"
    }))
    .unwrap();
    assert!(record.persistent);
    assert_eq!(record.label, None);
}
