// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use berth_core::WorkspaceId;

#[test]
fn json_lines_are_compact_and_tagged() {
    let event = ManagerEvent::WorkspaceSwitched {
        from: None,
        to: WorkspaceId::new("ws-2"),
    };
    let line = render_event(&event, OutputFormat::Json).unwrap();
    assert!(!line.contains('\n'));
    let value: serde_json::Value = serde_json::from_str(&line).unwrap();
    assert_eq!(value["type"], "workspace:switched");
}

#[test]
fn text_lines_use_the_event_summary() {
    let event = ManagerEvent::WorkspaceCreated {
        workspace_id: WorkspaceId::new("ws-1"),
    };
    let line = render_event(&event, OutputFormat::Text).unwrap();
    assert!(line.ends_with("workspace:created workspace=ws-1"));
}
