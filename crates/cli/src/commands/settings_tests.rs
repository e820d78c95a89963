// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn empty_set_is_an_error() {
    let err = settings_patch(None, false, None).unwrap_err();
    assert!(err.to_string().contains("nothing to change"));
}

#[test]
fn clearing_the_default_sends_empty_id() {
    let patch = settings_patch(None, true, None).unwrap();
    assert_eq!(patch.default_workspace.as_deref(), Some(""));
    assert_eq!(patch.auto_switch_on_activity, None);
}

#[test]
fn default_and_auto_switch_pass_through() {
    let patch = settings_patch(Some("ws-2".into()), false, Some(true)).unwrap();
    similar_asserts::assert_eq!(
        patch,
        SettingsPatch {
            default_workspace: Some("ws-2".into()),
            auto_switch_on_activity: Some(true),
        }
    );
}
