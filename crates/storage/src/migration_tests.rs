// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use yare::parameterized;

fn v1_document() -> Value {
    json!({
        "workspaces": [{
            "id": "ws-1",
            "name": "Side project",
            "color": "#fff",
            "services": [
                { "id": "svc-1", "name": "Mail", "type": "gmail", "url": "https://mail.example.com" }
            ],
            "created": 1_700_000_000_000_i64,
            "isActive": true,
            "pinnedNote": "kept"
        }]
    })
}

#[test]
fn v1_backfills_missing_fields() {
    let migrated = MigrationRegistry::new().migrate_to(v1_document(), 2).unwrap();

    assert_eq!(migrated["v"], 2);
    let ws = &migrated["workspaces"][0];
    assert_eq!(ws["isolationMode"], "shared");
    assert_eq!(ws["abbreviation"], "SP");
    assert_eq!(ws["created"], "2023-11-14T22:13:20.000Z");
    assert_eq!(ws["lastAccessed"], ws["created"]);
    assert_eq!(ws["pinnedNote"], "kept");

    let svc = &ws["services"][0];
    assert_eq!(svc["isEnabled"], true);
    assert_eq!(svc["config"], json!({}));
    assert_eq!(migrated["activeWorkspaceId"], "ws-1");
}

#[test]
fn v1_keeps_explicit_values() {
    let doc = json!({
        "workspaces": [{
            "id": "ws-1",
            "name": "Work",
            "abbreviation": "WK",
            "isolationMode": "isolated",
            "services": [{ "id": "s", "name": "s", "url": "u", "isEnabled": false }],
            "created": "2024-05-01T10:00:00Z",
            "lastAccessed": "2024-05-02T10:00:00Z"
        }],
        "activeWorkspaceId": "ws-other"
    });
    let migrated = MigrationRegistry::new().migrate_to(doc, 2).unwrap();
    let ws = &migrated["workspaces"][0];
    assert_eq!(ws["abbreviation"], "WK");
    assert_eq!(ws["isolationMode"], "isolated");
    assert_eq!(ws["services"][0]["isEnabled"], false);
    assert_eq!(ws["lastAccessed"], "2024-05-02T10:00:00Z");
    assert_eq!(migrated["activeWorkspaceId"], "ws-other");
}

#[test]
fn current_version_is_untouched() {
    let doc = json!({ "v": 2, "workspaces": [] });
    let migrated = MigrationRegistry::new().migrate_to(doc.clone(), 2).unwrap();
    assert_eq!(migrated, doc);
}

#[test]
fn too_new_is_rejected() {
    let err = MigrationRegistry::new()
        .migrate_to(json!({ "v": 9 }), 2)
        .unwrap_err();
    assert!(matches!(err, MigrationError::TooNew(9, 2)));
}

#[test]
fn missing_path_is_reported() {
    let err = MigrationRegistry::new()
        .migrate_to(json!({ "v": 2 }), 3)
        .unwrap_err();
    assert!(matches!(err, MigrationError::NoPath(2, 3)));
}

#[parameterized(
    workspaces_not_array = { json!({ "workspaces": 4 }) },
    entry_not_object = { json!({ "workspaces": ["ws"] }) },
    bad_timestamp = { json!({ "workspaces": [{ "id": "a", "name": "a", "created": true }] }) },
    root_not_object = { json!([1, 2]) },
)]
fn malformed_v1_fails(doc: Value) {
    let err = MigrationRegistry::new().migrate_to(doc, 2).unwrap_err();
    assert!(matches!(err, MigrationError::Failed { from: 1, to: 2, .. }));
}
