// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[test]
#[serial(env)]
fn renderer_template_ignores_blank() {
    std::env::set_var("BERTH_RENDERER", "   ");
    assert_eq!(renderer_template(), None);
    std::env::set_var("BERTH_RENDERER", "chromium --app={url}");
    assert_eq!(renderer_template().as_deref(), Some("chromium --app={url}"));
    std::env::remove_var("BERTH_RENDERER");
    assert_eq!(renderer_template(), None);
}

#[test]
#[serial(env)]
fn close_timeout_default_and_override() {
    std::env::remove_var("BERTH_VIEW_CLOSE_TIMEOUT_MS");
    assert_eq!(view_close_timeout(), Duration::from_secs(5));
    std::env::set_var("BERTH_VIEW_CLOSE_TIMEOUT_MS", "250");
    assert_eq!(view_close_timeout(), Duration::from_millis(250));
    std::env::set_var("BERTH_VIEW_CLOSE_TIMEOUT_MS", "soon");
    assert_eq!(view_close_timeout(), Duration::from_secs(5));
    std::env::remove_var("BERTH_VIEW_CLOSE_TIMEOUT_MS");
}
