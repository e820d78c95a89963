// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn shared_workspace_has_one_partition() {
    let ctx = setup().await;
    let personal = ctx.personal();
    let a = ctx.add(personal.as_str(), "A").await;
    let b = ctx.add(personal.as_str(), "B").await;
    ctx.partitions.set_usage(personal.as_str(), 4096);
    ctx.manager.load_service(personal.as_str(), a.as_str()).await.unwrap();

    let partitions = ctx.manager.list_partitions(None).await.unwrap();

    assert_eq!(partitions.len(), 1);
    let info = &partitions[0];
    assert_eq!(info.key, personal.as_str());
    assert_eq!(info.service_ids, vec![a, b]);
    assert_eq!(info.usage_bytes, 4096);
    assert_eq!(info.active_views, 1);
    assert!(info.persistent);
}

#[tokio::test]
async fn isolated_workspace_has_partition_per_service() {
    let ctx = setup().await;
    let work = ctx.workspace("Work", IsolationMode::Isolated).await;
    let a = ctx.add(work.as_str(), "A").await;
    let b = ctx.add(work.as_str(), "B").await;

    let partitions = ctx.manager.list_partitions(Some(work.as_str())).await.unwrap();

    let keys: Vec<String> = partitions.iter().map(|p| p.key.to_string()).collect();
    assert_eq!(keys, vec![format!("{work}.{a}"), format!("{work}.{b}")]);
    assert!(partitions.iter().all(|p| p.isolation_mode == IsolationMode::Isolated));
}

#[tokio::test]
async fn listing_unknown_workspace_is_not_found() {
    let ctx = setup().await;
    let err = ctx.manager.list_partitions(Some("nope")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn clearing_partition_closes_bound_views_first() {
    let ctx = setup().await;
    let personal = ctx.personal();
    let a = ctx.add(personal.as_str(), "A").await;
    ctx.manager.load_service(personal.as_str(), a.as_str()).await.unwrap();
    let mut rx = ctx.manager.subscribe();

    ctx.manager.clear_partition(personal.as_str()).await.unwrap();

    assert!(ctx.manager.list_views().await.is_empty());
    assert_eq!(ctx.partitions.cleared(), vec![PartitionKey::new(personal.as_str())]);
    assert_eq!(drain(&mut rx), vec!["view:closed", "partition:cleared"]);
}

#[tokio::test]
async fn clearing_unknown_partition_is_not_found() {
    let ctx = setup().await;
    let err = ctx.manager.clear_partition("ghost").await.unwrap_err();
    assert!(matches!(err, ManagerError::PartitionNotFound(_)));
    assert!(ctx.partitions.cleared().is_empty());
}

#[tokio::test]
async fn clear_failure_is_reported_after_views_close() {
    let ctx = setup().await;
    let personal = ctx.personal();
    let a = ctx.add(personal.as_str(), "A").await;
    ctx.manager.load_service(personal.as_str(), a.as_str()).await.unwrap();
    ctx.partitions.fail_clear(personal.as_str());

    let err = ctx.manager.clear_partition(personal.as_str()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PartitionClearFailure);
    assert!(ctx.manager.list_views().await.is_empty());
}

#[tokio::test]
async fn clear_workspace_data_clears_every_partition() {
    let ctx = setup().await;
    let work = ctx.workspace("Work", IsolationMode::Isolated).await;
    let a = ctx.add(work.as_str(), "A").await;
    let b = ctx.add(work.as_str(), "B").await;
    ctx.manager.load_service(work.as_str(), b.as_str()).await.unwrap();

    let cleared = ctx.manager.clear_workspace_data(work.as_str()).await.unwrap();

    let expected = vec![
        PartitionKey::new(format!("{work}.{a}")),
        PartitionKey::new(format!("{work}.{b}")),
    ];
    assert_eq!(cleared, expected);
    assert_eq!(ctx.partitions.cleared(), expected);
    assert!(ctx.manager.list_views().await.is_empty());
    // Services and settings survive
    assert_eq!(ctx.manager.get_workspace(work.as_str()).unwrap().services.len(), 2);
}

#[tokio::test]
async fn clear_workspace_data_of_unknown_workspace_is_not_found() {
    let ctx = setup().await;
    let err = ctx.manager.clear_workspace_data("nope").await.unwrap_err();
    assert!(matches!(err, ManagerError::WorkspaceNotFound(_)));
}

#[tokio::test]
async fn created_partition_carries_metadata() {
    let ctx = setup().await;
    let personal = ctx.personal();
    ctx.add(personal.as_str(), "A").await;

    let info = ctx
        .manager
        .create_partition(
            personal.as_str(),
            None,
            PartitionPatch {
                label: Some("Home".into()),
                persistent: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(info.label.as_deref(), Some("Home"));
    assert!(info.persistent);
    let saved = ctx.store.saved_graph().unwrap();
    assert_eq!(
        saved.partition_record(personal.as_str()).and_then(|r| r.label.clone()),
        Some("Home".to_string())
    );
}

#[tokio::test]
async fn isolated_partition_needs_a_service() {
    let ctx = setup().await;
    let work = ctx.workspace("Work", IsolationMode::Isolated).await;

    let err = ctx
        .manager
        .create_partition(work.as_str(), None, PartitionPatch::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);
}

#[tokio::test]
async fn update_partition_edits_existing_record() {
    let ctx = setup().await;
    let personal = ctx.personal();
    ctx.manager
        .create_partition(
            personal.as_str(),
            None,
            PartitionPatch {
                label: Some("Home".into()),
                persistent: None,
            },
        )
        .await
        .unwrap();

    let info = ctx
        .manager
        .update_partition(
            personal.as_str(),
            PartitionPatch {
                label: Some(String::new()),
                persistent: Some(false),
            },
        )
        .await
        .unwrap();

    assert_eq!(info.label, None);
    assert!(!info.persistent);
    assert_eq!(ctx.manager.graph().partitions.len(), 1);
}

#[tokio::test]
async fn update_of_underived_key_is_not_found() {
    let ctx = setup().await;
    let err = ctx
        .manager
        .update_partition("ghost", PartitionPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ManagerError::PartitionNotFound(_)));
}

#[tokio::test]
async fn shutdown_wipes_non_persistent_partitions() {
    let ctx = setup().await;
    let personal = ctx.personal();
    let work = ctx.workspace("Work", IsolationMode::Shared).await;
    let a = ctx.add(personal.as_str(), "A").await;
    ctx.manager.load_service(personal.as_str(), a.as_str()).await.unwrap();
    ctx.manager
        .create_partition(
            work.as_str(),
            None,
            PartitionPatch {
                label: None,
                persistent: Some(false),
            },
        )
        .await
        .unwrap();

    ctx.manager.shutdown().await.unwrap();

    assert_eq!(ctx.partitions.cleared(), vec![PartitionKey::new(work.as_str())]);
    assert!(ctx.manager.list_views().await.is_empty());
    assert_eq!(ctx.views.open_count(), 0);
}
