// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn serializes_with_type_tag() {
    let event = ManagerEvent::WorkspaceSwitched {
        from: None,
        to: WorkspaceId::new("ws-1"),
    };
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "workspace:switched");
    assert_eq!(json["to"], "ws-1");
    assert!(json.get("from").is_none());
}

#[test]
fn tag_matches_name() {
    let events = vec![
        ManagerEvent::ViewEvicted {
            workspace_id: WorkspaceId::new("ws-1"),
            service_id: ServiceId::new("svc-1"),
            reason: EvictionReason::MemoryPressure,
        },
        ManagerEvent::PartitionCleared {
            partition: PartitionKey::new("ws-1"),
        },
        ManagerEvent::SettingsUpdated,
    ];
    for event in events {
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.name());
        let back: ManagerEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}

#[test]
fn eviction_reason_is_snake_case() {
    let json = serde_json::to_string(&EvictionReason::MemoryPressure).unwrap();
    assert_eq!(json, "\"memory_pressure\"");
}

#[test]
fn log_summary_includes_ids() {
    let event = ManagerEvent::ServiceRemoved {
        workspace_id: WorkspaceId::new("ws-1"),
        service_id: ServiceId::new("svc-9"),
    };
    assert_eq!(
        event.log_summary(),
        "service:removed workspace=ws-1 service=svc-9"
    );
    assert_eq!(
        ManagerEvent::WorkspaceSwitched {
            from: Some(WorkspaceId::new("a")),
            to: WorkspaceId::new("b"),
        }
        .log_summary(),
        "workspace:switched from=a to=b"
    );
}

#[test]
fn view_events_name_their_workspace() {
    let event = ManagerEvent::ViewClosed {
        workspace_id: WorkspaceId::new("w2"),
        service_id: ServiceId::new("mail"),
    };
    assert_eq!(event.log_summary(), "view:closed workspace=w2 service=mail");
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["workspace_id"], "w2");
}
