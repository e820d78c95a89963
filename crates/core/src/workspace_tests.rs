// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap()
}

#[yare::parameterized(
    single_word = { "Personal", "P" },
    two_words = { "Side project", "SP" },
    three_words = { "Acme Corp Sales", "AC" },
    hyphenated = { "open-source", "OS" },
    lowercase = { "work", "W" },
    extra_spaces = { "  deep   work ", "DW" },
    empty = { "", "" },
)]
fn abbreviation_from_name(name: &str, expected: &str) {
    assert_eq!(derive_abbreviation(name), expected);
}

#[test]
fn new_workspace_fills_defaults() {
    let ws = Workspace::new(
        WorkspaceId::new("ws-1"),
        WorkspaceSpec::named("Work Stuff"),
        IsolationMode::Isolated,
        at(10),
    );
    assert_eq!(ws.abbreviation, "WS");
    assert_eq!(ws.color, DEFAULT_COLOR);
    assert_eq!(ws.isolation_mode, IsolationMode::Isolated);
    assert!(!ws.is_active);
    assert_eq!(ws.created, ws.last_accessed);
    assert!(ws.services.is_empty());
}

#[test]
fn explicit_abbreviation_wins() {
    let spec = WorkspaceSpec {
        abbreviation: Some("XY".into()),
        isolation_mode: Some(IsolationMode::Shared),
        ..WorkspaceSpec::named("Work")
    };
    let ws = Workspace::new(WorkspaceId::new("ws-1"), spec, IsolationMode::Isolated, at(0));
    assert_eq!(ws.abbreviation, "XY");
    assert_eq!(ws.isolation_mode, IsolationMode::Shared);
}

#[test]
fn patch_renames_and_rederives_abbreviation() {
    let mut ws = Workspace::new(
        WorkspaceId::new("ws-1"),
        WorkspaceSpec::named("Work"),
        IsolationMode::Shared,
        at(0),
    );
    let changed = ws.apply(WorkspacePatch {
        name: Some("Client Hub".into()),
        icon: Some("briefcase".into()),
        ..Default::default()
    });
    assert!(!changed);
    assert_eq!(ws.name, "Client Hub");
    assert_eq!(ws.abbreviation, "CH");
    assert_eq!(ws.icon.as_deref(), Some("briefcase"));

    ws.apply(WorkspacePatch {
        icon: Some(String::new()),
        ..Default::default()
    });
    assert_eq!(ws.icon, None);
}

#[test]
fn patch_reports_isolation_change() {
    let mut ws = Workspace::new(
        WorkspaceId::new("ws-1"),
        WorkspaceSpec::named("Work"),
        IsolationMode::Shared,
        at(0),
    );
    let same = WorkspacePatch {
        isolation_mode: Some(IsolationMode::Shared),
        ..Default::default()
    };
    assert!(!ws.apply(same));
    let flip = WorkspacePatch {
        isolation_mode: Some(IsolationMode::Isolated),
        ..Default::default()
    };
    assert!(ws.apply(flip));
    assert_eq!(ws.isolation_mode, IsolationMode::Isolated);
}

#[test]
fn serializes_camel_case_and_keeps_unknown_fields() {
    let json = r#"{
        "id": "ws-1",
        "name": "Work",
        "abbreviation": "W",
        "color": "red",
        "isolationMode": "isolated",
        "services": [],
        "created": "2024-01-01T00:00:00Z",
        "lastAccessed": "2024-01-02T00:00:00Z",
        "isActive": true,
        "pinnedOrder": 3
    }"#;
    let ws: Workspace = serde_json::from_str(json).unwrap();
    assert_eq!(ws.isolation_mode, IsolationMode::Isolated);
    assert!(ws.is_active);
    assert_eq!(ws.extra.get("pinnedOrder"), Some(&serde_json::json!(3)));

    let out = serde_json::to_value(&ws).unwrap();
    assert_eq!(out["pinnedOrder"], 3);
    assert_eq!(out["lastAccessed"], "2024-01-02T00:00:00Z");
    assert!(out.get("icon").is_none());
}

#[yare::parameterized(
    shared = { "shared", IsolationMode::Shared },
    isolated = { "Isolated", IsolationMode::Isolated },
    padded = { " shared ", IsolationMode::Shared },
)]
fn isolation_mode_parses(input: &str, expected: IsolationMode) {
    assert_eq!(input.parse::<IsolationMode>().unwrap(), expected);
}

#[test]
fn isolation_mode_rejects_unknown() {
    assert!("sandboxed".parse::<IsolationMode>().is_err());
}
