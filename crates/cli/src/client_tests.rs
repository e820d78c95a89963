// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for daemon client behavior.

use super::*;
use crate::daemon_process::{cleanup_stale_socket, daemon_dir};
use berth_core::WorkspaceId;
use serial_test::serial;
use std::fs;
use tempfile::tempdir;
use tokio::net::UnixListener;

/// Serve one connection: read a request, answer with each response in turn.
fn fake_daemon(path: &std::path::Path, responses: Vec<Response>) -> tokio::task::JoinHandle<Request> {
    let listener = UnixListener::bind(path).unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (mut reader, mut writer) = stream.into_split();
        let request = protocol::read_request(&mut reader, protocol::DEFAULT_TIMEOUT)
            .await
            .unwrap();
        for response in &responses {
            protocol::write_response(&mut writer, response, protocol::DEFAULT_TIMEOUT)
                .await
                .unwrap();
        }
        request
    })
}

/// connect() must not touch state files when the daemon is not running;
/// a half-started daemon may own them.
#[test]
#[serial]
fn connect_does_not_delete_pid_file() {
    let state_dir = tempdir().unwrap();
    std::env::set_var("BERTH_STATE_DIR", state_dir.path());

    let dir = daemon_dir().unwrap();
    let pid_path = dir.join("daemon.pid");
    fs::write(&pid_path, "12345\n").unwrap();

    let result = DaemonClient::connect();
    std::env::remove_var("BERTH_STATE_DIR");

    assert!(matches!(result, Err(ClientError::DaemonNotRunning)));
    assert!(pid_path.exists(), "connect() must not delete pid file");
}

#[test]
#[serial]
fn connection_errors_are_logged() {
    let state_dir = tempdir().unwrap();
    std::env::set_var("BERTH_STATE_DIR", state_dir.path());

    log_connection_error(&ClientError::DaemonNotRunning);
    std::env::remove_var("BERTH_STATE_DIR");

    let content = fs::read_to_string(state_dir.path().join("cli.log")).unwrap();
    assert!(content.contains("pid="));
    assert!(content.contains("socket="));
    assert!(content.contains("error=Daemon not running"));
}

#[test]
#[serial]
fn stale_socket_without_live_pid_is_removed() {
    let state_dir = tempdir().unwrap();
    std::env::set_var("BERTH_STATE_DIR", state_dir.path());
    let socket = state_dir.path().join("daemon.sock");
    let pid = state_dir.path().join("daemon.pid");
    fs::write(&socket, "").unwrap();
    fs::write(&pid, "not-a-pid\n").unwrap();

    cleanup_stale_socket().unwrap();
    std::env::remove_var("BERTH_STATE_DIR");

    assert!(!socket.exists());
    assert!(!pid.exists());
}

#[test]
fn not_running_detection() {
    assert!(ClientError::DaemonNotRunning.is_not_running());
    assert!(ClientError::Io(std::io::ErrorKind::ConnectionRefused.into()).is_not_running());
    assert!(!ClientError::UnexpectedResponse.is_not_running());
}

#[tokio::test]
async fn error_responses_become_rejections() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("daemon.sock");
    let server = fake_daemon(
        &path,
        vec![Response::Error {
            kind: ErrorKind::NotFound,
            message: "workspace not found: nope".to_string(),
        }],
    );

    let client = DaemonClient::at(path);
    let err = client.get_workspace("nope").await.unwrap_err();

    match err {
        ClientError::Rejected { kind, message } => {
            assert_eq!(kind, ErrorKind::NotFound);
            assert_eq!(message, "workspace not found: nope");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        server.await.unwrap(),
        Request::GetWorkspace {
            id: "nope".to_string()
        }
    );
}

#[tokio::test]
async fn mismatched_response_is_unexpected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("daemon.sock");
    let _server = fake_daemon(&path, vec![Response::Pong]);

    let client = DaemonClient::at(path);
    assert!(matches!(
        client.list_views().await,
        Err(ClientError::UnexpectedResponse)
    ));
}

#[tokio::test]
async fn subscription_yields_events_then_ends() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("daemon.sock");
    let event = ManagerEvent::WorkspaceCreated {
        workspace_id: WorkspaceId::new("ws-1"),
    };
    let server = fake_daemon(
        &path,
        vec![
            Response::Subscribed,
            Response::Event {
                event: event.clone(),
            },
        ],
    );

    let client = DaemonClient::at(path);
    let mut events = client.subscribe().await.unwrap();

    assert_eq!(events.next().await.unwrap(), Some(event));
    assert_eq!(server.await.unwrap(), Request::Subscribe);
    assert_eq!(events.next().await.unwrap(), None);
}
