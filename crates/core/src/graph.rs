// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The workspace graph: every workspace, its services, settings and
//! partition metadata. This is the unit the store loads and saves.

use crate::partition::{PartitionKey, PartitionRecord};
use crate::service::Service;
use crate::workspace::{derive_abbreviation, Workspace, WorkspaceId, WorkspaceSpec};
use crate::IsolationMode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Name of the workspace created when no durable record exists
pub const DEFAULT_WORKSPACE_NAME: &str = "Personal";

/// Global preferences stored alongside the graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_workspace: Option<WorkspaceId>,
    /// Switch to a workspace when one of its services is loaded
    #[serde(default)]
    pub auto_switch_on_activity: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Partial update of [`Settings`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    /// `Some("")` clears the default workspace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_workspace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_switch_on_activity: Option<bool>,
}

/// Complete in-memory workspace graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceGraph {
    #[serde(default)]
    pub workspaces: Vec<Workspace>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_workspace_id: Option<WorkspaceId>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partitions: Vec<PartitionRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WorkspaceGraph {
    /// Graph holding a single active "Personal" workspace.
    pub fn with_default_workspace(id: WorkspaceId, now: DateTime<Utc>) -> Self {
        let mut workspace = Workspace::new(
            id.clone(),
            WorkspaceSpec::named(DEFAULT_WORKSPACE_NAME),
            IsolationMode::Shared,
            now,
        );
        workspace.is_active = true;
        Self {
            workspaces: vec![workspace],
            active_workspace_id: Some(id),
            ..Self::default()
        }
    }

    pub fn workspace(&self, id: &str) -> Option<&Workspace> {
        self.workspaces.iter().find(|w| w.id == id)
    }

    pub fn workspace_mut(&mut self, id: &str) -> Option<&mut Workspace> {
        self.workspaces.iter_mut().find(|w| w.id == id)
    }

    pub fn service(&self, workspace_id: &str, service_id: &str) -> Option<&Service> {
        self.workspace(workspace_id)?.service(service_id)
    }

    /// The active workspace, if any.
    pub fn active(&self) -> Option<&Workspace> {
        self.workspaces.iter().find(|w| w.is_active)
    }

    /// Make `id` the only active workspace.
    ///
    /// Returns the previously active workspace id, or `None` if `id` does not
    /// exist (in which case nothing changes).
    pub fn activate(
        &mut self,
        id: &str,
        now: DateTime<Utc>,
    ) -> Option<Option<WorkspaceId>> {
        self.workspace(id)?;
        let previous = self.active().map(|w| w.id.clone());
        for workspace in &mut self.workspaces {
            workspace.is_active = workspace.id == id;
            if workspace.is_active {
                workspace.last_accessed = now;
                self.active_workspace_id = Some(workspace.id.clone());
            }
        }
        Some(previous)
    }

    /// Remove a workspace, returning it. Clears references held by settings,
    /// the active pointer and partition metadata.
    pub fn remove(&mut self, id: &str) -> Option<Workspace> {
        let idx = self.workspaces.iter().position(|w| w.id == id)?;
        let removed = self.workspaces.remove(idx);
        if self.active_workspace_id.as_ref().is_some_and(|a| a == id) {
            self.active_workspace_id = None;
        }
        if self
            .settings
            .default_workspace
            .as_ref()
            .is_some_and(|d| d == id)
        {
            self.settings.default_workspace = None;
        }
        let keys = partition_keys_of(&removed);
        self.partitions.retain(|p| !keys.contains_key(&p.key));
        Some(removed)
    }

    pub fn partition_record(&self, key: &str) -> Option<&PartitionRecord> {
        self.partitions.iter().find(|p| p.key == key)
    }

    pub fn partition_record_mut(&mut self, key: &str) -> Option<&mut PartitionRecord> {
        self.partitions.iter_mut().find(|p| p.key == key)
    }

    /// Every derived partition key, with its owning workspace and services.
    ///
    /// A shared workspace with no services still owns its workspace-level key.
    pub fn partition_keys(&self) -> Vec<(PartitionKey, &Workspace, Vec<&Service>)> {
        let mut out = Vec::new();
        for workspace in &self.workspaces {
            for (key, services) in partition_keys_of(workspace) {
                out.push((key, workspace, services));
            }
        }
        out
    }

    /// Repair a freshly loaded graph.
    ///
    /// Back-fills empty abbreviations and enforces the single-active
    /// invariant: the workspace named by `activeWorkspaceId` wins, otherwise
    /// the first workspace flagged active.
    pub fn normalize(&mut self) {
        for workspace in &mut self.workspaces {
            if workspace.abbreviation.trim().is_empty() {
                workspace.abbreviation = derive_abbreviation(&workspace.name);
            }
        }

        let winner = self
            .active_workspace_id
            .as_ref()
            .filter(|id| self.workspace(id.as_str()).is_some())
            .cloned()
            .or_else(|| self.active().map(|w| w.id.clone()));

        for workspace in &mut self.workspaces {
            workspace.is_active = winner.as_ref().is_some_and(|w| *w == workspace.id);
        }
        self.active_workspace_id = winner;

        self.prune_partitions();
    }

    /// Partition keys owned by one workspace, or `None` if it does not exist.
    pub fn workspace_partition_keys(&self, id: &str) -> Option<Vec<PartitionKey>> {
        let workspace = self.workspace(id)?;
        Some(partition_keys_of(workspace).into_keys().collect())
    }

    /// Whether `key` is derived by some workspace/service in the graph.
    pub fn is_live_key(&self, key: &str) -> bool {
        self.partition_keys().iter().any(|(k, _, _)| k == key)
    }

    /// Drop partition metadata whose key no longer derives from the graph.
    pub fn prune_partitions(&mut self) {
        let live: Vec<PartitionKey> = self
            .partition_keys()
            .into_iter()
            .map(|(k, _, _)| k)
            .collect();
        self.partitions.retain(|p| live.contains(&p.key));
    }
}

fn partition_keys_of(workspace: &Workspace) -> BTreeMap<PartitionKey, Vec<&Service>> {
    let mut keys: BTreeMap<PartitionKey, Vec<&Service>> = BTreeMap::new();
    if workspace.isolation_mode == IsolationMode::Shared {
        keys.insert(PartitionKey::new(workspace.id.as_str()), Vec::new());
    }
    for service in &workspace.services {
        keys.entry(crate::resolve_key(workspace, service))
            .or_default()
            .push(service);
    }
    keys
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
