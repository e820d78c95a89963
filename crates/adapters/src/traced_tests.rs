// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::partition::FakePartitionStore;
use crate::view::FakeViewAdapter;
use berth_core::ServiceId;
use serial_test::serial;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// A writer that captures log output for testing
#[derive(Clone, Default)]
struct CapturedLogs {
    logs: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    fn contents(&self) -> String {
        let logs = self.logs.lock().unwrap();
        String::from_utf8_lossy(&logs).to_string()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run a test with captured tracing output
fn with_tracing<F, Fut>(f: F) -> (String, Fut::Output)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future,
{
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs.clone())
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, || {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(f())
    });

    (logs.contents(), result)
}

fn assert_log(logs: &str, label: &str, expected: &str) {
    assert!(logs.contains(expected), "Should log {label}. Logs:\n{logs}");
}

fn request() -> ViewRequest {
    ViewRequest {
        service_id: ServiceId::new("svc-1"),
        partition: PartitionKey::new("ws-1"),
        url: "https://chat.example.com".into(),
        profile_dir: None,
    }
}

#[test]
#[serial(tracing)]
fn traced_view_open_logs_entry_and_completion() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedView::new(FakeViewAdapter::new());
        traced.open(&request()).await
    });

    assert!(result.is_ok(), "open should succeed: {:?}", result);
    assert_log(&logs, "span name", "view.open");
    assert_log(&logs, "service id", "svc-1");
    assert_log(&logs, "entry message", "starting");
    assert_log(&logs, "completion", "view opened");
    assert_log(&logs, "timing", "elapsed_ms");
}

#[test]
#[serial(tracing)]
fn traced_view_open_logs_failure() {
    let (logs, result) = with_tracing(|| async {
        let fake = FakeViewAdapter::new();
        fake.fail_open("svc-1");
        TracedView::new(fake).open(&request()).await
    });

    assert!(result.is_err());
    assert_log(&logs, "failure", "open failed");
}

#[test]
#[serial(tracing)]
fn traced_view_close_logs_operation() {
    let (logs, _) = with_tracing(|| async {
        let traced = TracedView::new(FakeViewAdapter::new());
        let handle = traced.open(&request()).await.unwrap();
        traced.close(&handle).await
    });

    assert_log(&logs, "close span", "view.close");
    assert_log(&logs, "close completion", "view closed");
}

#[test]
#[serial(tracing)]
fn traced_partition_clear_logs_error() {
    let (logs, result) = with_tracing(|| async {
        let fake = FakePartitionStore::new();
        fake.fail_clear("ws-1");
        TracedPartitionStore::new(fake)
            .clear(&PartitionKey::new("ws-1"))
            .await
    });

    assert!(result.is_err());
    assert_log(&logs, "clear span", "partition.clear");
    assert_log(&logs, "clear failure", "clear failed");
}

#[tokio::test]
async fn traced_wrappers_delegate() {
    let fake_view = FakeViewAdapter::new();
    fake_view.set_memory("svc-1", 42);
    let traced = TracedView::new(fake_view.clone());
    let handle = traced.open(&request()).await.unwrap();
    assert_eq!(traced.memory_bytes(&handle).await.unwrap(), 42);
    assert_eq!(fake_view.open_count(), 1);

    let fake_store = FakePartitionStore::new();
    fake_store.set_usage("ws-1", 9);
    let traced = TracedPartitionStore::new(fake_store.clone());
    assert_eq!(traced.usage_bytes(&PartitionKey::new("ws-1")).await.unwrap(), 9);
    traced.clear(&PartitionKey::new("ws-1")).await.unwrap();
    assert_eq!(fake_store.cleared(), vec![PartitionKey::new("ws-1")]);
}
