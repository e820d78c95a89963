// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use berth_core::{PartitionKey, ServiceId};
use std::path::PathBuf;

fn request(profile_dir: Option<PathBuf>) -> ViewRequest {
    ViewRequest {
        service_id: ServiceId::new("svc-1"),
        partition: PartitionKey::new("ws-1.svc-1"),
        url: "https://chat.example.com".into(),
        profile_dir,
    }
}

#[test]
fn empty_template_is_rejected() {
    assert!(matches!(
        ProcessViewAdapter::new("  "),
        Err(ViewError::OpenFailed(_))
    ));
}

#[test]
fn placeholders_are_substituted() {
    let adapter =
        ProcessViewAdapter::new("renderer --profile={profile} --app={url} {partition}/{service}")
            .unwrap();
    let args = adapter.render_args(&request(Some(PathBuf::from("/p/ws-1.svc-1"))));
    assert_eq!(
        args,
        vec![
            "--profile=/p/ws-1.svc-1",
            "--app=https://chat.example.com",
            "ws-1.svc-1/svc-1",
        ]
    );
}

#[tokio::test]
async fn open_and_close_renderer_process() {
    let dir = tempfile::tempdir().unwrap();
    let profile = dir.path().join("ws-1.svc-1");
    let adapter = ProcessViewAdapter::new("sleep 30").unwrap();

    let handle = adapter.open(&request(Some(profile.clone()))).await.unwrap();
    assert!(profile.is_dir());
    assert_eq!(adapter.live_count(), 1);
    adapter.memory_bytes(&handle).await.unwrap();

    adapter.close(&handle).await.unwrap();
    assert_eq!(adapter.live_count(), 0);
    // Second close is a no-op
    adapter.close(&handle).await.unwrap();
    assert!(matches!(
        adapter.memory_bytes(&handle).await,
        Err(ViewError::NotFound(_))
    ));
}

#[tokio::test]
async fn missing_program_fails_to_open() {
    let adapter = ProcessViewAdapter::new("/nonexistent/renderer {url}").unwrap();
    let err = adapter.open(&request(None)).await.unwrap_err();
    assert!(matches!(err, ViewError::OpenFailed(_)));
    assert_eq!(adapter.live_count(), 0);
}
