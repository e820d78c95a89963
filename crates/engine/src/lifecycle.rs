// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session lifecycle: the registry of live views.
//!
//! At most `max_active` views exist at once. Opening a view at the cap
//! evicts the least recently used unpinned view first. The memory sweep
//! evicts LRU views while the aggregate estimate is above a threshold,
//! sparing pinned views, the focused view and the last remaining view.
//! Ties on access time go to the lowest workspace id, then the lowest
//! service id.
//!
//! Views are keyed by workspace and service together, so the same service
//! id in two workspaces owns two independent views.
//!
//! Every teardown removes the registry entry before the native view is
//! released, so a failing close never leaves a dangling entry.

use crate::error::LifecycleError;
use berth_adapters::{ViewAdapter, ViewRequest};
use berth_core::{PartitionKey, ServiceId, WorkspaceId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identity of a live view: the owning workspace and the service.
///
/// Ordered by workspace id, then service id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewKey {
    pub workspace_id: WorkspaceId,
    pub service_id: ServiceId,
}

impl ViewKey {
    pub fn new(workspace_id: impl Into<WorkspaceId>, service_id: impl Into<ServiceId>) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            service_id: service_id.into(),
        }
    }
}

impl fmt::Display for ViewKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.workspace_id, self.service_id)
    }
}

/// A live view owned by the lifecycle
#[derive(Debug, Clone)]
struct ActiveView {
    partition: PartitionKey,
    handle: String,
    last_access_ms: u64,
    memory_bytes: u64,
    pinned: bool,
}

/// Read-only description of a live view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewInfo {
    pub service_id: ServiceId,
    pub workspace_id: WorkspaceId,
    pub partition: PartitionKey,
    pub handle: String,
    pub last_access: DateTime<Utc>,
    pub memory_bytes: u64,
    pub pinned: bool,
    pub focused: bool,
}

impl ViewInfo {
    pub fn key(&self) -> ViewKey {
        ViewKey::new(self.workspace_id.clone(), self.service_id.clone())
    }
}

/// Result of [`SessionLifecycle::activate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    pub view: ViewInfo,
    /// False when an existing view was reused
    pub created: bool,
    /// Views evicted to make room, oldest first
    pub evicted: Vec<ViewKey>,
}

/// Registry of live views, keyed by workspace and service
pub struct SessionLifecycle<V> {
    adapter: V,
    max_active: usize,
    views: BTreeMap<ViewKey, ActiveView>,
    focused: Option<ViewKey>,
}

impl<V: ViewAdapter> SessionLifecycle<V> {
    pub fn new(adapter: V, max_active: usize) -> Self {
        Self {
            adapter,
            max_active,
            views: BTreeMap::new(),
            focused: None,
        }
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn is_live(&self, key: &ViewKey) -> bool {
        self.views.contains_key(key)
    }

    pub fn focused(&self) -> Option<&ViewKey> {
        self.focused.as_ref()
    }

    pub fn info(&self, key: &ViewKey) -> Option<ViewInfo> {
        let (key, view) = self.views.get_key_value(key)?;
        Some(self.describe(key, view))
    }

    /// All live views, ordered by workspace id then service id.
    pub fn list(&self) -> Vec<ViewInfo> {
        self.views
            .iter()
            .map(|(key, view)| self.describe(key, view))
            .collect()
    }

    /// Views bound to `partition`.
    pub fn views_in_partition(&self, partition: &str) -> Vec<ViewKey> {
        self.views
            .iter()
            .filter(|(_, v)| v.partition == partition)
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Views owned by `workspace_id`.
    pub fn views_in_workspace(&self, workspace_id: &str) -> Vec<ViewKey> {
        self.views
            .keys()
            .filter(|key| key.workspace_id == workspace_id)
            .cloned()
            .collect()
    }

    /// Sum of the last memory estimates of every live view.
    pub fn total_memory(&self) -> u64 {
        self.views.values().map(|v| v.memory_bytes).sum()
    }

    /// Return the live view for `(workspace_id, request.service_id)`,
    /// creating it if needed.
    ///
    /// An existing view is only touched. A new view is opened before any
    /// LRU unpinned view is evicted to make room, so a failed open leaves
    /// the registry untouched. If nothing can be evicted the call fails
    /// with [`LifecycleError::CapacityExceeded`] before opening.
    pub async fn activate(
        &mut self,
        workspace_id: &WorkspaceId,
        request: ViewRequest,
        now_ms: u64,
    ) -> Result<Activation, LifecycleError> {
        let key = ViewKey::new(workspace_id.clone(), request.service_id.clone());
        if let Some(view) = self.views.get_mut(&key) {
            view.last_access_ms = now_ms;
            self.focused = Some(key.clone());
            return Ok(Activation {
                view: self.describe_key(&key)?,
                created: false,
                evicted: Vec::new(),
            });
        }

        let unpinned = self.views.values().filter(|v| !v.pinned).count();
        let needed = (self.views.len() + 1).saturating_sub(self.max_active);
        if needed > unpinned {
            return Err(LifecycleError::CapacityExceeded {
                cap: self.max_active,
                pinned: self.views.len() - unpinned,
            });
        }

        let handle = self.adapter.open(&request).await?;
        let memory_bytes = self.adapter.memory_bytes(&handle).await.unwrap_or_default();

        let mut evicted = Vec::with_capacity(needed);
        while self.views.len() >= self.max_active {
            let Some(victim) = self.lru_candidate(&[&key]) else {
                break;
            };
            tracing::info!(view = %victim, cap = self.max_active, "evicting view at capacity");
            self.teardown(&victim).await;
            evicted.push(victim);
        }

        self.views.insert(
            key.clone(),
            ActiveView {
                partition: request.partition,
                handle,
                last_access_ms: now_ms,
                memory_bytes,
                pinned: false,
            },
        );
        self.focused = Some(key.clone());

        Ok(Activation {
            view: self.describe_key(&key)?,
            created: true,
            evicted,
        })
    }

    /// Tear down a view. Returns false if none was live.
    pub async fn deactivate(&mut self, key: &ViewKey) -> bool {
        self.teardown(key).await
    }

    /// Update a view's access time. Returns false if none was live.
    pub fn touch(&mut self, key: &ViewKey, now_ms: u64) -> bool {
        match self.views.get_mut(key) {
            Some(view) => {
                view.last_access_ms = now_ms;
                self.focused = Some(key.clone());
                true
            }
            None => false,
        }
    }

    /// Exempt a view from eviction (or make it evictable again).
    pub fn set_pinned(&mut self, key: &ViewKey, pinned: bool) -> bool {
        match self.views.get_mut(key) {
            Some(view) => {
                view.pinned = pinned;
                true
            }
            None => false,
        }
    }

    /// Evict LRU views while estimated memory exceeds `threshold_bytes`.
    ///
    /// Memory estimates are refreshed from the adapter first. Returns the
    /// evicted views, oldest first.
    pub async fn run_eviction_sweep(&mut self, threshold_bytes: u64) -> Vec<ViewKey> {
        let handles: Vec<(ViewKey, String)> = self
            .views
            .iter()
            .map(|(key, v)| (key.clone(), v.handle.clone()))
            .collect();
        for (key, handle) in handles {
            match self.adapter.memory_bytes(&handle).await {
                Ok(bytes) => {
                    if let Some(view) = self.views.get_mut(&key) {
                        view.memory_bytes = bytes;
                    }
                }
                Err(e) => tracing::warn!(view = %key, error = %e, "memory estimate failed"),
            }
        }

        let mut evicted = Vec::new();
        while self.total_memory() > threshold_bytes && self.views.len() > 1 {
            let focused = self.focused.clone();
            let exclude: Vec<&ViewKey> = focused.iter().collect();
            let Some(victim) = self.lru_candidate(&exclude) else {
                break;
            };
            tracing::info!(
                view = %victim,
                total_bytes = self.total_memory(),
                threshold_bytes,
                "evicting view under memory pressure"
            );
            self.teardown(&victim).await;
            evicted.push(victim);
        }
        evicted
    }

    /// Tear down every view (shutdown).
    pub async fn close_all(&mut self) -> Vec<ViewKey> {
        let keys: Vec<ViewKey> = self.views.keys().cloned().collect();
        for key in &keys {
            self.teardown(key).await;
        }
        keys
    }

    /// Least recently used unpinned view, excluding `exclude`.
    fn lru_candidate(&self, exclude: &[&ViewKey]) -> Option<ViewKey> {
        self.views
            .iter()
            .filter(|(key, v)| !v.pinned && !exclude.contains(key))
            .min_by(|(a_key, a), (b_key, b)| {
                a.last_access_ms
                    .cmp(&b.last_access_ms)
                    .then_with(|| a_key.cmp(b_key))
            })
            .map(|(key, _)| key.clone())
    }

    /// Single teardown path: unregister, then release the native view.
    async fn teardown(&mut self, key: &ViewKey) -> bool {
        let Some(view) = self.views.remove(key) else {
            return false;
        };
        if self.focused.as_ref() == Some(key) {
            self.focused = None;
        }
        if let Err(e) = self.adapter.close(&view.handle).await {
            tracing::warn!(view = %key, handle = %view.handle, error = %e, "view close failed");
        }
        true
    }

    fn describe(&self, key: &ViewKey, view: &ActiveView) -> ViewInfo {
        ViewInfo {
            service_id: key.service_id.clone(),
            workspace_id: key.workspace_id.clone(),
            partition: view.partition.clone(),
            handle: view.handle.clone(),
            last_access: DateTime::from_timestamp_millis(view.last_access_ms as i64)
                .unwrap_or_default(),
            memory_bytes: view.memory_bytes,
            pinned: view.pinned,
            focused: self.focused.as_ref() == Some(key),
        }
    }

    fn describe_key(&self, key: &ViewKey) -> Result<ViewInfo, LifecycleError> {
        self.info(key)
            .ok_or_else(|| LifecycleError::View(berth_adapters::ViewError::NotFound(key.to_string())))
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
