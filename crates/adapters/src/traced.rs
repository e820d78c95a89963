// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::partition::{PartitionError, PartitionStore};
use crate::view::{ViewAdapter, ViewError, ViewRequest};
use async_trait::async_trait;
use berth_core::PartitionKey;
use std::path::PathBuf;
use tracing::Instrument;

/// Wrapper that adds tracing to any ViewAdapter
#[derive(Clone)]
pub struct TracedView<V> {
    inner: V,
}

impl<V> TracedView<V> {
    pub fn new(inner: V) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<V: ViewAdapter> ViewAdapter for TracedView<V> {
    async fn open(&self, request: &ViewRequest) -> Result<String, ViewError> {
        let span = tracing::info_span!(
            "view.open",
            service_id = %request.service_id,
            partition = %request.partition,
        );
        async {
            tracing::info!(url = %request.url, "starting");
            let start = std::time::Instant::now();
            let result = self.inner.open(request).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(handle) => tracing::info!(handle = handle.as_str(), elapsed_ms, "view opened"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "open failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn close(&self, handle: &str) -> Result<(), ViewError> {
        let start = std::time::Instant::now();
        let result = self.inner.close(handle).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        tracing::info_span!("view.close", handle).in_scope(|| match &result {
            Ok(()) => tracing::info!(elapsed_ms, "view closed"),
            Err(e) => tracing::warn!(elapsed_ms, error = %e, "close failed"),
        });
        result
    }

    async fn memory_bytes(&self, handle: &str) -> Result<u64, ViewError> {
        let result = self.inner.memory_bytes(handle).await;
        tracing::trace!(handle, bytes = ?result.as_ref().ok(), "measured");
        result
    }
}

/// Wrapper that adds tracing to any PartitionStore
#[derive(Clone)]
pub struct TracedPartitionStore<P> {
    inner: P,
}

impl<P> TracedPartitionStore<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<P: PartitionStore> PartitionStore for TracedPartitionStore<P> {
    fn location(&self, key: &PartitionKey) -> Option<PathBuf> {
        self.inner.location(key)
    }

    async fn clear(&self, key: &PartitionKey) -> Result<(), PartitionError> {
        let start = std::time::Instant::now();
        let result = self.inner.clear(key).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        tracing::info_span!("partition.clear", key = %key).in_scope(|| match &result {
            Ok(()) => tracing::info!(elapsed_ms, "partition cleared"),
            Err(e) => tracing::error!(elapsed_ms, error = %e, "clear failed"),
        });
        result
    }

    async fn usage_bytes(&self, key: &PartitionKey) -> Result<u64, PartitionError> {
        let result = self.inner.usage_bytes(key).await;
        if let Err(ref e) = result {
            tracing::warn!(key = %key, error = %e, "usage lookup failed");
        }
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
