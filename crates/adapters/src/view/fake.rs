// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake view adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ViewAdapter, ViewError, ViewRequest};
use async_trait::async_trait;
use berth_core::ServiceId;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// Recorded view call
#[derive(Debug, Clone, PartialEq)]
pub enum ViewCall {
    Open(ViewRequest),
    Close { handle: String },
}

/// Fake view state
#[derive(Debug, Clone)]
pub struct FakeView {
    pub request: ViewRequest,
    pub memory_bytes: u64,
}

#[derive(Default)]
struct FakeViewState {
    views: BTreeMap<String, FakeView>,
    calls: Vec<ViewCall>,
    next_id: u64,
    memory: HashMap<ServiceId, u64>,
    failing_opens: HashSet<ServiceId>,
    failing_closes: bool,
}

/// Fake view adapter for testing
#[derive(Clone, Default)]
pub struct FakeViewAdapter {
    inner: Arc<Mutex<FakeViewState>>,
}

impl FakeViewAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ViewCall> {
        self.inner.lock().calls.clone()
    }

    /// Service ids with an open view, in handle order
    pub fn open_services(&self) -> Vec<ServiceId> {
        self.inner
            .lock()
            .views
            .values()
            .map(|v| v.request.service_id.clone())
            .collect()
    }

    pub fn open_count(&self) -> usize {
        self.inner.lock().views.len()
    }

    pub fn get_view(&self, handle: &str) -> Option<FakeView> {
        self.inner.lock().views.get(handle).cloned()
    }

    /// Memory reported for views of `service_id` (existing and future)
    pub fn set_memory(&self, service_id: &str, bytes: u64) {
        let mut inner = self.inner.lock();
        inner.memory.insert(ServiceId::new(service_id), bytes);
        for view in inner.views.values_mut() {
            if view.request.service_id == service_id {
                view.memory_bytes = bytes;
            }
        }
    }

    /// Make opens for `service_id` fail
    pub fn fail_open(&self, service_id: &str) {
        self.inner
            .lock()
            .failing_opens
            .insert(ServiceId::new(service_id));
    }

    /// Make every close fail (the view is still destroyed)
    pub fn fail_closes(&self, fail: bool) {
        self.inner.lock().failing_closes = fail;
    }
}

#[async_trait]
impl ViewAdapter for FakeViewAdapter {
    async fn open(&self, request: &ViewRequest) -> Result<String, ViewError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ViewCall::Open(request.clone()));

        if inner.failing_opens.contains(&request.service_id) {
            return Err(ViewError::OpenFailed(format!(
                "injected failure for {}",
                request.service_id
            )));
        }

        inner.next_id += 1;
        let handle = format!("view-{:04}", inner.next_id);
        let memory_bytes = inner
            .memory
            .get(&request.service_id)
            .copied()
            .unwrap_or_default();
        inner.views.insert(
            handle.clone(),
            FakeView {
                request: request.clone(),
                memory_bytes,
            },
        );
        Ok(handle)
    }

    async fn close(&self, handle: &str) -> Result<(), ViewError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ViewCall::Close {
            handle: handle.to_string(),
        });
        inner.views.remove(handle);
        if inner.failing_closes {
            return Err(ViewError::CloseFailed(format!("injected failure for {handle}")));
        }
        Ok(())
    }

    async fn memory_bytes(&self, handle: &str) -> Result<u64, ViewError> {
        self.inner
            .lock()
            .views
            .get(handle)
            .map(|v| v.memory_bytes)
            .ok_or_else(|| ViewError::NotFound(handle.to_string()))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
