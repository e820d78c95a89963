// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service records: remote endpoints surfaced inside a workspace.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

crate::define_id! {
    /// Identifier for a service, unique within its workspace.
    pub struct ServiceId;
}

fn default_enabled() -> bool {
    true
}

/// A configured remote endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: ServiceId,
    pub name: String,
    /// Free-form classification (e.g. "slack", "gmail", "custom")
    #[serde(rename = "type", default)]
    pub kind: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default = "default_enabled")]
    pub is_enabled: bool,
    /// Renderer/display hints; never interpreted by the lifecycle manager
    #[serde(default)]
    pub config: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Service {
    pub fn new(id: ServiceId, spec: ServiceSpec) -> Self {
        Self {
            id,
            name: spec.name,
            kind: spec.kind,
            url: spec.url,
            icon_url: spec.icon_url,
            is_enabled: true,
            config: spec.config,
            extra: Map::new(),
        }
    }

    /// Apply a partial update.
    ///
    /// Returns true when the change invalidates a live view (URL changed or
    /// the service was disabled).
    pub fn apply(&mut self, patch: ServicePatch) -> bool {
        let mut invalidates = false;
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(url) = patch.url {
            invalidates |= url != self.url;
            self.url = url;
        }
        if let Some(icon_url) = patch.icon_url {
            self.icon_url = Some(icon_url).filter(|u| !u.is_empty());
        }
        if let Some(enabled) = patch.is_enabled {
            invalidates |= self.is_enabled && !enabled;
            self.is_enabled = enabled;
        }
        if let Some(config) = patch.config {
            // Shallow merge; null removes a key
            for (key, value) in config {
                if value.is_null() {
                    self.config.remove(&key);
                } else {
                    self.config.insert(key, value);
                }
            }
        }
        invalidates
    }
}

/// Request to add a service to a workspace
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSpec {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub config: Map<String, Value>,
}

impl ServiceSpec {
    pub fn new(name: impl Into<String>, kind: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            url: url.into(),
            ..Self::default()
        }
    }
}

/// Partial update of a service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Map<String, Value>>,
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
