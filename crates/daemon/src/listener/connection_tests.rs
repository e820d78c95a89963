// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use berth_adapters::{FakePartitionStore, FakeViewAdapter};
use berth_core::{FakeClock, ManagerConfig, ManagerEvent, SequentialIdGen, WorkspaceSpec};
use berth_engine::ManagerDeps;
use berth_storage::MemoryStore;
use std::time::Duration;
use tempfile::tempdir;

pub(super) type TestCtx = ListenCtx<FakeViewAdapter, FakePartitionStore, FakeClock, SequentialIdGen>;

/// Context over a manager backed entirely by fakes.
pub(super) async fn test_ctx() -> TestCtx {
    let manager = WorkspaceManager::open(
        ManagerDeps {
            views: FakeViewAdapter::new(),
            partitions: FakePartitionStore::new(),
            store: Arc::new(MemoryStore::new()),
        },
        ManagerConfig::default(),
        FakeClock::new(),
        SequentialIdGen::new("id"),
    )
    .await;
    ListenCtx {
        manager: Arc::new(manager),
        start_time: Instant::now(),
        shutdown: Arc::new(Notify::new()),
    }
}

/// Bind a listener in a temp dir; returns the socket path and the context.
async fn serve() -> (tempfile::TempDir, std::path::PathBuf, Arc<TestCtx>) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("daemon.sock");
    let socket = UnixListener::bind(&path).unwrap();
    let listener = Listener::new(socket, test_ctx().await);
    let ctx = Arc::clone(&listener.ctx);
    tokio::spawn(listener.run());
    (dir, path, ctx)
}

async fn roundtrip(path: &std::path::Path, request: &Request) -> Response {
    let stream = UnixStream::connect(path).await.unwrap();
    let (mut reader, mut writer) = stream.into_split();
    protocol::write_request(&mut writer, request, DEFAULT_TIMEOUT)
        .await
        .unwrap();
    protocol::read_response(&mut reader, DEFAULT_TIMEOUT)
        .await
        .unwrap()
}

#[tokio::test]
async fn ping_over_socket() {
    let (_dir, path, _ctx) = serve().await;
    assert_eq!(roundtrip(&path, &Request::Ping).await, Response::Pong);
}

#[tokio::test]
async fn each_connection_gets_its_own_answer() {
    let (_dir, path, _ctx) = serve().await;

    let created = roundtrip(
        &path,
        &Request::CreateWorkspace {
            spec: WorkspaceSpec::named("Work"),
        },
    )
    .await;
    assert!(matches!(created, Response::Workspace { workspace: Some(_) }));

    match roundtrip(&path, &Request::ListWorkspaces).await {
        Response::Workspaces { workspaces } => assert_eq!(workspaces.len(), 2),
        other => panic!("unexpected response: {other:?}"),
    }
}

#[tokio::test]
async fn shutdown_request_notifies() {
    let (_dir, path, ctx) = serve().await;
    let notified = ctx.shutdown.notified();

    assert_eq!(
        roundtrip(&path, &Request::Shutdown).await,
        Response::ShuttingDown
    );
    tokio::time::timeout(Duration::from_secs(1), notified)
        .await
        .unwrap();
}

#[tokio::test]
async fn subscriber_receives_events_in_order() {
    let (_dir, path, ctx) = serve().await;

    let stream = UnixStream::connect(&path).await.unwrap();
    let (mut reader, mut writer) = stream.into_split();
    protocol::write_request(&mut writer, &Request::Subscribe, DEFAULT_TIMEOUT)
        .await
        .unwrap();
    assert_eq!(
        protocol::read_response(&mut reader, DEFAULT_TIMEOUT)
            .await
            .unwrap(),
        Response::Subscribed
    );

    let created = ctx
        .manager
        .create_workspace(WorkspaceSpec::named("Work"))
        .await
        .unwrap();
    ctx.manager.switch_workspace(created.id.as_str()).await.unwrap();

    let first = protocol::read_response(&mut reader, DEFAULT_TIMEOUT)
        .await
        .unwrap();
    assert_eq!(
        first,
        Response::Event {
            event: ManagerEvent::WorkspaceCreated {
                workspace_id: created.id.clone(),
            }
        }
    );
    match protocol::read_response(&mut reader, DEFAULT_TIMEOUT)
        .await
        .unwrap()
    {
        Response::Event {
            event: ManagerEvent::WorkspaceSwitched { to, .. },
        } => assert_eq!(to, created.id),
        other => panic!("unexpected frame: {other:?}"),
    }
}

#[tokio::test]
async fn subscriber_hangup_ends_stream() {
    let (events_tx, events) = broadcast::channel::<ManagerEvent>(4);
    let (client, server) = tokio::io::duplex(256);
    let (mut server_read, mut server_write) = tokio::io::split(server);

    let task = tokio::spawn(async move {
        stream_events(events, &mut server_read, &mut server_write).await
    });
    drop(client);

    tokio::time::timeout(Duration::from_secs(1), task)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    drop(events_tx);
}

#[test]
fn reads_are_logged_as_queries() {
    assert!(is_query(&Request::ListViews));
    assert!(!is_query(&Request::Shutdown));
}
