// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Encoding of the workspace graph as a versioned JSON document.

use crate::migration::MigrationRegistry;
use crate::store::StoreError;
use berth_core::WorkspaceGraph;
use serde_json::Value;

/// Version written by this build
pub const CURRENT_VERSION: u32 = 2;

/// Serialize a graph, stamping the current version.
pub fn encode(graph: &WorkspaceGraph) -> Result<Vec<u8>, StoreError> {
    let mut value = serde_json::to_value(graph)?;
    if let Some(obj) = value.as_object_mut() {
        obj.insert("v".into(), CURRENT_VERSION.into());
    }
    Ok(serde_json::to_vec_pretty(&value)?)
}

/// Parse, migrate and normalize a stored document.
pub fn decode(bytes: &[u8], migrations: &MigrationRegistry) -> Result<WorkspaceGraph, StoreError> {
    let raw: Value = serde_json::from_slice(bytes)?;
    let mut document = migrations.migrate_to(raw, CURRENT_VERSION)?;
    if let Some(obj) = document.as_object_mut() {
        obj.remove("v");
    }
    let mut graph: WorkspaceGraph = serde_json::from_value(document)?;
    graph.normalize();
    Ok(graph)
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
