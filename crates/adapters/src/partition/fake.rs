// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake partition store for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{PartitionError, PartitionStore};
use async_trait::async_trait;
use berth_core::PartitionKey;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

/// Recorded partition call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionCall {
    Clear(PartitionKey),
    Usage(PartitionKey),
}

#[derive(Default)]
struct FakePartitionState {
    usage: HashMap<PartitionKey, u64>,
    failing: HashSet<PartitionKey>,
    calls: Vec<PartitionCall>,
}

/// Fake partition store for testing
#[derive(Clone, Default)]
pub struct FakePartitionStore {
    inner: Arc<Mutex<FakePartitionState>>,
}

impl FakePartitionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<PartitionCall> {
        self.inner.lock().calls.clone()
    }

    /// Keys cleared so far, in call order
    pub fn cleared(&self) -> Vec<PartitionKey> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                PartitionCall::Clear(key) => Some(key.clone()),
                PartitionCall::Usage(_) => None,
            })
            .collect()
    }

    pub fn set_usage(&self, key: &str, bytes: u64) {
        self.inner.lock().usage.insert(PartitionKey::new(key), bytes);
    }

    /// Make clears of `key` fail
    pub fn fail_clear(&self, key: &str) {
        self.inner.lock().failing.insert(PartitionKey::new(key));
    }
}

#[async_trait]
impl PartitionStore for FakePartitionStore {
    fn location(&self, _key: &PartitionKey) -> Option<PathBuf> {
        None
    }

    async fn clear(&self, key: &PartitionKey) -> Result<(), PartitionError> {
        let mut inner = self.inner.lock();
        inner.calls.push(PartitionCall::Clear(key.clone()));
        if inner.failing.contains(key) {
            return Err(PartitionError::ClearFailed {
                key: key.to_string(),
                reason: "injected failure".into(),
            });
        }
        inner.usage.remove(key);
        Ok(())
    }

    async fn usage_bytes(&self, key: &PartitionKey) -> Result<u64, PartitionError> {
        let mut inner = self.inner.lock();
        inner.calls.push(PartitionCall::Usage(key.clone()));
        Ok(inner.usage.get(key).copied().unwrap_or_default())
    }
}
