// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hosted view adapters.
//!
//! A view is the native resource rendering one service's remote content
//! inside its partition. The adapter only creates, measures and destroys
//! views; which views exist is decided by the session lifecycle.

mod noop;
mod process;

pub use noop::NoOpViewAdapter;
pub use process::ProcessViewAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeView, FakeViewAdapter, ViewCall};

use async_trait::async_trait;
use berth_core::{PartitionKey, ServiceId};
use std::path::PathBuf;
use thiserror::Error;

/// Errors from view operations
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("view not found: {0}")]
    NotFound(String),
    #[error("open failed: {0}")]
    OpenFailed(String),
    #[error("close failed: {0}")]
    CloseFailed(String),
}

/// Everything needed to materialize a view
#[derive(Debug, Clone, PartialEq)]
pub struct ViewRequest {
    pub service_id: ServiceId,
    pub partition: PartitionKey,
    pub url: String,
    /// Directory holding the partition's cookies and storage, if on disk
    pub profile_dir: Option<PathBuf>,
}

/// Adapter for creating and destroying hosted views
#[async_trait]
pub trait ViewAdapter: Clone + Send + Sync + 'static {
    /// Create a view, returning its native handle
    async fn open(&self, request: &ViewRequest) -> Result<String, ViewError>;

    /// Destroy a view. Closing an unknown handle is not an error.
    async fn close(&self, handle: &str) -> Result<(), ViewError>;

    /// Estimated memory held by a view, in bytes
    async fn memory_bytes(&self, handle: &str) -> Result<u64, ViewError>;
}
