// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Partition keys: the isolation boundary for cookies and storage.
//!
//! Keys are never persisted as identity. They are re-derived from the
//! workspace isolation mode and the workspace/service ids, so reloading a
//! graph reproduces the same boundaries.

use crate::service::{Service, ServiceId};
use crate::workspace::{IsolationMode, Workspace, WorkspaceId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Isolation key scoping cookies/storage for one or more services.
    pub struct PartitionKey;
}

/// Separator between workspace and service ids in an isolated key
pub const KEY_SEPARATOR: char = '.';

impl PartitionKey {
    /// Key for a workspace/service pair under the given isolation mode.
    pub fn derive(mode: IsolationMode, workspace_id: &WorkspaceId, service_id: &ServiceId) -> Self {
        match mode {
            IsolationMode::Shared => Self::new(workspace_id.as_str()),
            IsolationMode::Isolated => {
                Self::new(format!("{workspace_id}{KEY_SEPARATOR}{service_id}"))
            }
        }
    }
}

/// Resolve the partition key for a service in its workspace.
pub fn resolve_key(workspace: &Workspace, service: &Service) -> PartitionKey {
    PartitionKey::derive(workspace.isolation_mode, &workspace.id, &service.id)
}

fn default_persistent() -> bool {
    true
}

/// User-facing metadata attached to a derived partition key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionRecord {
    pub key: PartitionKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Whether storage survives a manager shutdown (false wipes it)
    #[serde(default = "default_persistent")]
    pub persistent: bool,
    #[serde(default)]
    pub created: DateTime<Utc>,
}

/// Partial update of partition metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistent: Option<bool>,
}

/// Derived view of a partition for listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionInfo {
    pub key: PartitionKey,
    pub workspace_id: WorkspaceId,
    pub isolation_mode: IsolationMode,
    pub service_ids: Vec<ServiceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub persistent: bool,
    pub usage_bytes: u64,
    pub active_views: usize,
}

#[cfg(test)]
#[path = "partition_tests.rs"]
mod tests;
