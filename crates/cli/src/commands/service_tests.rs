// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use berth_core::{test_support, IsolationMode};

#[yare::parameterized(
    neither = { false, false, None },
    enable = { true, false, Some(true) },
    disable = { false, true, Some(false) },
)]
fn enable_flags(enable: bool, disable: bool, expected: Option<bool>) {
    assert_eq!(enabled_patch(enable, disable), expected);
}

#[test]
fn table_shows_state_and_url() {
    let mut ws = test_support::workspace_with_services("ws-1", IsolationMode::Shared, &["svc-1", "svc-2"]);
    ws.services[1].is_enabled = false;

    let mut buf = Vec::new();
    service_table(&ws.services, |cols| Table::with_color(cols, false)).render(&mut buf);
    let out = String::from_utf8(buf).unwrap();
    let lines: Vec<&str> = out.lines().collect();

    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("svc-1"));
    assert!(lines[1].contains("enabled"));
    assert!(lines[1].ends_with("https://chat.example.com"));
    assert!(lines[2].contains("disabled"));
}
