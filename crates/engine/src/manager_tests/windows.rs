// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use berth_core::window::{DEFAULT_HEIGHT, DEFAULT_WIDTH};

#[tokio::test]
async fn window_defaults_to_workspace_name_and_size() {
    let ctx = setup().await;
    let personal = ctx.personal();
    let mut rx = ctx.manager.subscribe();

    let window = ctx
        .manager
        .create_window(personal.as_str(), WindowSpec::default())
        .await
        .unwrap();

    assert_eq!(window.title, "Personal");
    assert_eq!((window.width, window.height), (DEFAULT_WIDTH, DEFAULT_HEIGHT));
    assert_eq!(window.workspace_id, personal);
    assert_eq!(drain(&mut rx), vec!["window:created"]);
}

#[tokio::test]
async fn zero_sized_window_is_rejected() {
    let ctx = setup().await;
    let err = ctx
        .manager
        .create_window(
            ctx.personal().as_str(),
            WindowSpec {
                width: Some(0),
                ..WindowSpec::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);
}

#[tokio::test]
async fn windows_are_listed_per_workspace() {
    let ctx = setup().await;
    let personal = ctx.personal();
    let work = ctx.workspace("Work", IsolationMode::Shared).await;
    ctx.manager
        .create_window(personal.as_str(), WindowSpec::default())
        .await
        .unwrap();
    let titled = ctx
        .manager
        .create_window(
            work.as_str(),
            WindowSpec {
                title: Some("Inbox".into()),
                ..WindowSpec::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(ctx.manager.get_windows(None).await.unwrap().len(), 2);
    assert_eq!(
        ctx.manager.get_windows(Some(work.as_str())).await.unwrap(),
        vec![titled]
    );
    assert!(ctx.manager.get_windows(Some("nope")).await.is_err());
}

#[tokio::test]
async fn closing_unknown_window_is_not_found() {
    let ctx = setup().await;
    let err = ctx.manager.close_window("nope").await.unwrap_err();
    assert!(matches!(err, ManagerError::WindowNotFound(_)));
}
