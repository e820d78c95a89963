// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[tokio::test]
async fn added_service_is_enabled_and_saved() {
    let ctx = setup().await;
    let personal = ctx.personal();
    let mut rx = ctx.manager.subscribe();

    let chat = ctx.add(personal.as_str(), "Chat").await;

    let ws = ctx.manager.get_workspace(personal.as_str()).unwrap();
    assert_eq!(ws.services.len(), 1);
    assert!(ws.services[0].is_enabled);
    assert_eq!(ws.services[0].id, chat);
    assert_eq!(
        ctx.store.saved_graph().unwrap().service(personal.as_str(), chat.as_str()),
        ws.service(chat.as_str())
    );
    assert_eq!(drain(&mut rx), vec!["service:added"]);
}

#[parameterized(
    relative = { "chat.example.com" },
    empty = { "" },
    spaces = { "https://exa mple.com" },
)]
fn invalid_urls_are_rejected(url: &str) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(async {
        let ctx = setup().await;
        let err = ctx
            .manager
            .add_service(ctx.personal().as_str(), ServiceSpec::new("Chat", "web", url))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
        assert!(ctx.manager.list_workspaces()[0].services.is_empty());
    });
}

#[tokio::test]
async fn service_name_is_required() {
    let ctx = setup().await;
    let err = ctx
        .manager
        .add_service(
            ctx.personal().as_str(),
            ServiceSpec::new(" ", "web", "https://chat.example.com"),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);
}

#[tokio::test]
async fn adding_to_unknown_workspace_is_not_found() {
    let ctx = setup().await;
    let err = ctx
        .manager
        .add_service("nope", ServiceSpec::new("Chat", "web", "https://chat.example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, ManagerError::WorkspaceNotFound(_)));
}

#[tokio::test]
async fn url_change_closes_live_view() {
    let ctx = setup().await;
    let personal = ctx.personal();
    let chat = ctx.add(personal.as_str(), "Chat").await;
    ctx.manager
        .load_service(personal.as_str(), chat.as_str())
        .await
        .unwrap();

    let updated = ctx
        .manager
        .update_service(
            personal.as_str(),
            chat.as_str(),
            ServicePatch {
                url: Some("https://new.example.com".into()),
                ..ServicePatch::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.url, "https://new.example.com");
    assert!(ctx.manager.list_views().await.is_empty());
}

#[tokio::test]
async fn rename_keeps_live_view() {
    let ctx = setup().await;
    let personal = ctx.personal();
    let chat = ctx.add(personal.as_str(), "Chat").await;
    ctx.manager
        .load_service(personal.as_str(), chat.as_str())
        .await
        .unwrap();

    ctx.manager
        .update_service(
            personal.as_str(),
            chat.as_str(),
            ServicePatch {
                name: Some("Team chat".into()),
                ..ServicePatch::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(ctx.manager.list_views().await.len(), 1);
}

#[tokio::test]
async fn disabling_closes_view_and_blocks_loading() {
    let ctx = setup().await;
    let personal = ctx.personal();
    let chat = ctx.add(personal.as_str(), "Chat").await;
    ctx.manager
        .load_service(personal.as_str(), chat.as_str())
        .await
        .unwrap();

    ctx.manager
        .update_service(
            personal.as_str(),
            chat.as_str(),
            ServicePatch {
                is_enabled: Some(false),
                ..ServicePatch::default()
            },
        )
        .await
        .unwrap();

    assert!(ctx.manager.list_views().await.is_empty());
    let err = ctx
        .manager
        .load_service(personal.as_str(), chat.as_str())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);
}

#[tokio::test]
async fn update_rejects_bad_url_without_change() {
    let ctx = setup().await;
    let personal = ctx.personal();
    let chat = ctx.add(personal.as_str(), "Chat").await;

    let err = ctx
        .manager
        .update_service(
            personal.as_str(),
            chat.as_str(),
            ServicePatch {
                url: Some("not a url".into()),
                ..ServicePatch::default()
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ValidationError);
    let ws = ctx.manager.get_workspace(personal.as_str()).unwrap();
    assert_eq!(ws.services[0].url, "https://chat.example.com");
}

#[tokio::test]
async fn remove_closes_view_and_forgets_service() {
    let ctx = setup().await;
    let personal = ctx.personal();
    let chat = ctx.add(personal.as_str(), "Chat").await;
    ctx.manager
        .load_service(personal.as_str(), chat.as_str())
        .await
        .unwrap();
    let mut rx = ctx.manager.subscribe();

    ctx.manager
        .remove_service(personal.as_str(), chat.as_str())
        .await
        .unwrap();

    assert!(ctx.manager.get_workspace(personal.as_str()).unwrap().services.is_empty());
    assert_eq!(ctx.views.open_count(), 0);
    assert_eq!(drain(&mut rx), vec!["view:closed", "service:removed"]);

    let err = ctx
        .manager
        .remove_service(personal.as_str(), chat.as_str())
        .await
        .unwrap_err();
    assert!(matches!(err, ManagerError::ServiceNotFound { .. }));
}
