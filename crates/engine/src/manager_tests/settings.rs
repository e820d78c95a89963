// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use berth_core::SettingsPatch;

#[tokio::test]
async fn settings_start_empty() {
    let ctx = setup().await;
    let settings = ctx.manager.get_settings();
    assert!(settings.default_workspace.is_none());
    assert!(!settings.auto_switch_on_activity);
}

#[tokio::test]
async fn default_workspace_must_exist() {
    let ctx = setup().await;
    let err = ctx
        .manager
        .update_settings(SettingsPatch {
            default_workspace: Some("nope".into()),
            ..SettingsPatch::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(ctx.manager.get_settings().default_workspace.is_none());
}

#[tokio::test]
async fn default_workspace_is_set_and_cleared() {
    let ctx = setup().await;
    let personal = ctx.personal();
    let mut rx = ctx.manager.subscribe();

    let settings = ctx
        .manager
        .update_settings(SettingsPatch {
            default_workspace: Some(personal.to_string()),
            ..SettingsPatch::default()
        })
        .await
        .unwrap();
    assert_eq!(settings.default_workspace, Some(personal));
    assert_eq!(ctx.store.saved_graph().unwrap().settings, settings);

    let cleared = ctx
        .manager
        .update_settings(SettingsPatch {
            default_workspace: Some(String::new()),
            ..SettingsPatch::default()
        })
        .await
        .unwrap();
    assert!(cleared.default_workspace.is_none());
    assert_eq!(drain(&mut rx), vec!["settings:updated", "settings:updated"]);
}

#[tokio::test]
async fn deleting_default_workspace_clears_setting() {
    let ctx = setup().await;
    let work = ctx.workspace("Work", IsolationMode::Shared).await;
    ctx.manager
        .update_settings(SettingsPatch {
            default_workspace: Some(work.to_string()),
            ..SettingsPatch::default()
        })
        .await
        .unwrap();

    ctx.manager.delete_workspace(work.as_str()).await.unwrap();

    assert!(ctx.manager.get_settings().default_workspace.is_none());
}
