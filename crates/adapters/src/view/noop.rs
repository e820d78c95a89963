// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op view adapter for headless deployments.

use super::{ViewAdapter, ViewError, ViewRequest};
use async_trait::async_trait;

/// View adapter that renders nothing.
///
/// Used when no renderer is configured; views are tracked but hold no
/// native resources.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpViewAdapter;

impl NoOpViewAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ViewAdapter for NoOpViewAdapter {
    async fn open(&self, request: &ViewRequest) -> Result<String, ViewError> {
        Ok(format!("noop-{}", request.service_id))
    }

    async fn close(&self, _handle: &str) -> Result<(), ViewError> {
        Ok(())
    }

    async fn memory_bytes(&self, _handle: &str) -> Result<u64, ViewError> {
        Ok(0)
    }
}

#[cfg(test)]
#[path = "noop_tests.rs"]
mod tests;
