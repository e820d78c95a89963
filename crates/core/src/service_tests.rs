// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

fn slack() -> Service {
    Service::new(
        ServiceId::new("svc-1"),
        ServiceSpec::new("Slack", "slack", "https://app.slack.com"),
    )
}

#[test]
fn missing_is_enabled_defaults_to_true() {
    let svc: Service = serde_json::from_value(json!({
        "id": "svc-1",
        "name": "Mail",
        "type": "gmail",
        "url": "https://mail.google.com"
    }))
    .unwrap();
    assert!(svc.is_enabled);
    assert!(svc.config.is_empty());
}

#[test]
fn type_field_round_trips() {
    let value = serde_json::to_value(slack()).unwrap();
    assert_eq!(value["type"], "slack");
    assert_eq!(value["isEnabled"], true);
    assert!(value.get("kind").is_none());
}

#[yare::parameterized(
    rename_only = { ServicePatch { name: Some("Team chat".into()), ..Default::default() }, false },
    same_url = { ServicePatch { url: Some("https://app.slack.com".into()), ..Default::default() }, false },
    new_url = { ServicePatch { url: Some("https://acme.slack.com".into()), ..Default::default() }, true },
    disable = { ServicePatch { is_enabled: Some(false), ..Default::default() }, true },
    enable = { ServicePatch { is_enabled: Some(true), ..Default::default() }, false },
)]
fn patch_reports_view_invalidation(patch: ServicePatch, expected: bool) {
    let mut svc = slack();
    assert_eq!(svc.apply(patch), expected);
}

#[test]
fn patch_merges_config_and_null_removes() {
    let mut svc = slack();
    svc.config.insert("zoom".into(), json!(1.0));
    svc.config.insert("ua".into(), json!("custom"));

    let mut config = Map::new();
    config.insert("ua".into(), Value::Null);
    config.insert("muted".into(), json!(true));
    svc.apply(ServicePatch {
        config: Some(config),
        ..Default::default()
    });

    assert_eq!(svc.config.get("zoom"), Some(&json!(1.0)));
    assert_eq!(svc.config.get("muted"), Some(&json!(true)));
    assert!(!svc.config.contains_key("ua"));
}
