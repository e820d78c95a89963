// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace records.
//!
//! A workspace groups services under one isolation policy. Unknown fields
//! found in the durable record are kept in `extra` and written back verbatim.

use crate::service::Service;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;

crate::define_id! {
    /// Unique identifier for a workspace, generated at creation and never changed.
    pub struct WorkspaceId;
}

/// Accent used when a workspace is created without a color
pub const DEFAULT_COLOR: &str = "#4a90e2";

/// How services in a workspace share cookies and storage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IsolationMode {
    /// All services share one partition keyed by the workspace id
    #[default]
    Shared,
    /// Every service gets its own partition
    Isolated,
}

impl fmt::Display for IsolationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IsolationMode::Shared => f.write_str("shared"),
            IsolationMode::Isolated => f.write_str("isolated"),
        }
    }
}

impl std::str::FromStr for IsolationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shared" => Ok(IsolationMode::Shared),
            "isolated" => Ok(IsolationMode::Isolated),
            other => Err(format!("unknown isolation mode: {other}")),
        }
    }
}

/// A named grouping of services
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: WorkspaceId,
    pub name: String,
    #[serde(default)]
    pub abbreviation: String,
    #[serde(default)]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub isolation_mode: IsolationMode,
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub members: BTreeSet<String>,
    /// Missing timestamps decode as the Unix epoch
    #[serde(default)]
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub last_accessed: DateTime<Utc>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Workspace {
    /// Build a new, inactive workspace from a creation request.
    pub fn new(
        id: WorkspaceId,
        spec: WorkspaceSpec,
        default_isolation: IsolationMode,
        now: DateTime<Utc>,
    ) -> Self {
        let abbreviation = spec
            .abbreviation
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| derive_abbreviation(&spec.name));
        Self {
            id,
            abbreviation,
            color: spec.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            icon: spec.icon,
            isolation_mode: spec.isolation_mode.unwrap_or(default_isolation),
            services: Vec::new(),
            members: spec.members,
            created: now,
            last_accessed: now,
            is_active: false,
            extra: Map::new(),
            name: spec.name,
        }
    }

    pub fn service(&self, id: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.id == id)
    }

    pub fn service_mut(&mut self, id: &str) -> Option<&mut Service> {
        self.services.iter_mut().find(|s| s.id == id)
    }

    /// Apply a partial update. Returns true if the isolation mode changed.
    pub fn apply(&mut self, patch: WorkspacePatch) -> bool {
        if let Some(name) = patch.name {
            if patch.abbreviation.is_none() {
                self.abbreviation = derive_abbreviation(&name);
            }
            self.name = name;
        }
        if let Some(abbreviation) = patch.abbreviation {
            self.abbreviation = abbreviation;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(icon) = patch.icon {
            // Empty string clears the icon
            self.icon = Some(icon).filter(|i| !i.is_empty());
        }
        if let Some(members) = patch.members {
            self.members = members;
        }
        match patch.isolation_mode {
            Some(mode) if mode != self.isolation_mode => {
                self.isolation_mode = mode;
                true
            }
            _ => false,
        }
    }
}

/// Request to create a workspace
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isolation_mode: Option<IsolationMode>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub members: BTreeSet<String>,
}

impl WorkspaceSpec {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Partial update of a workspace; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspacePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isolation_mode: Option<IsolationMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<BTreeSet<String>>,
}

/// Derive display initials from a workspace name.
///
/// Takes the first letter of up to two words (split on whitespace, `-` and
/// `_`), uppercased: `"Personal"` → `"P"`, `"Side project"` → `"SP"`.
pub fn derive_abbreviation(name: &str) -> String {
    name.split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter_map(|word| word.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
