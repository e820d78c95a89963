// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Partition storage adapters.
//!
//! A partition's cookies and site storage live wherever the renderer keeps
//! them; this adapter can measure and wipe them per key.

mod fs;

pub use fs::FsPartitionStore;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakePartitionStore, PartitionCall};

use async_trait::async_trait;
use berth_core::PartitionKey;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from partition storage operations
#[derive(Debug, Error)]
pub enum PartitionError {
    #[error("invalid partition key: {0:?}")]
    InvalidKey(String),
    #[error("failed to clear partition {key}: {reason}")]
    ClearFailed { key: String, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Adapter over persisted partition state
#[async_trait]
pub trait PartitionStore: Clone + Send + Sync + 'static {
    /// Directory backing the partition, if it lives on disk
    fn location(&self, key: &PartitionKey) -> Option<PathBuf>;

    /// Wipe all persisted state for `key`. Atomic per key.
    async fn clear(&self, key: &PartitionKey) -> Result<(), PartitionError>;

    /// Bytes of persisted state held by `key`
    async fn usage_bytes(&self, key: &PartitionKey) -> Result<u64, PartitionError>;
}
