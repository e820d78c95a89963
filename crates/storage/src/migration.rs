// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Document migration system for schema evolution.
//!
//! Migrations transform the raw JSON document from one version to the next.
//! The registry chains migrations to reach the current version. A document
//! without a `v` field is version 1.

use berth_core::derive_abbreviation;
use chrono::{DateTime, SecondsFormat};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors that can occur during migration
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("migration v{from}→v{to} failed: {reason}")]
    Failed { from: u32, to: u32, reason: String },
    #[error("no migration path from v{0} to v{1}")]
    NoPath(u32, u32),
    #[error("document version {0} is newer than supported ({1})")]
    TooNew(u32, u32),
}

/// A migration from one document version to the next.
pub trait Migration: Send + Sync {
    fn source_version(&self) -> u32;
    fn target_version(&self) -> u32;
    fn migrate(&self, document: &mut Value) -> Result<(), MigrationError>;
}

/// Registry of migrations for upgrading documents.
pub struct MigrationRegistry {
    migrations: Vec<Box<dyn Migration>>,
}

impl MigrationRegistry {
    /// Create a new registry with all known migrations.
    pub fn new() -> Self {
        Self {
            migrations: vec![Box::new(V1ToV2)],
        }
    }

    /// Version recorded in a raw document.
    pub fn version_of(document: &Value) -> u32 {
        document.get("v").and_then(|v| v.as_u64()).unwrap_or(1) as u32
    }

    /// Migrate a document to the target version.
    pub fn migrate_to(&self, mut document: Value, target: u32) -> Result<Value, MigrationError> {
        let current = Self::version_of(&document);

        if current == target {
            return Ok(document);
        }
        if current > target {
            return Err(MigrationError::TooNew(current, target));
        }

        let mut version = current;
        while version < target {
            let migration = self
                .migrations
                .iter()
                .find(|m| m.source_version() == version)
                .ok_or(MigrationError::NoPath(version, target))?;

            migration.migrate(&mut document)?;
            version = migration.target_version();

            if let Some(obj) = document.as_object_mut() {
                obj.insert("v".into(), version.into());
            }
        }
        Ok(document)
    }
}

impl Default for MigrationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// v1 records predate isolation modes, service toggles and RFC 3339 dates.
///
/// Back-fills `isolationMode`, `abbreviation`, `isEnabled` and `config`,
/// converts epoch-millisecond timestamps and derives `activeWorkspaceId`
/// from the first workspace flagged active.
struct V1ToV2;

const EPOCH_RFC3339: &str = "1970-01-01T00:00:00.000Z";

impl Migration for V1ToV2 {
    fn source_version(&self) -> u32 {
        1
    }

    fn target_version(&self) -> u32 {
        2
    }

    fn migrate(&self, document: &mut Value) -> Result<(), MigrationError> {
        let fail = |reason: &str| MigrationError::Failed {
            from: 1,
            to: 2,
            reason: reason.to_string(),
        };
        let root = document
            .as_object_mut()
            .ok_or_else(|| fail("document is not an object"))?;

        let workspaces = match root.get_mut("workspaces") {
            None | Some(Value::Null) => return Ok(()),
            Some(Value::Array(list)) => list,
            Some(_) => return Err(fail("workspaces is not an array")),
        };

        let mut first_active: Option<Value> = None;
        for workspace in workspaces.iter_mut() {
            let ws = workspace
                .as_object_mut()
                .ok_or_else(|| fail("workspace entry is not an object"))?;
            migrate_workspace(ws).map_err(|reason| fail(&reason))?;
            if first_active.is_none() && ws.get("isActive").and_then(Value::as_bool) == Some(true) {
                first_active = ws.get("id").cloned();
            }
        }

        if !root.contains_key("activeWorkspaceId") {
            if let Some(id) = first_active {
                root.insert("activeWorkspaceId".into(), id);
            }
        }
        Ok(())
    }
}

fn migrate_workspace(ws: &mut Map<String, Value>) -> Result<(), String> {
    ws.entry("isolationMode")
        .or_insert_with(|| Value::from("shared"));

    let missing_abbreviation = ws
        .get("abbreviation")
        .and_then(Value::as_str)
        .is_none_or(|a| a.trim().is_empty());
    if missing_abbreviation {
        let name = ws.get("name").and_then(Value::as_str).unwrap_or_default();
        ws.insert("abbreviation".into(), derive_abbreviation(name).into());
    }

    let created = convert_timestamp(ws.get("created"))?;
    let last_accessed = match ws.get("lastAccessed") {
        None | Some(Value::Null) => created.clone(),
        value => convert_timestamp(value)?,
    };
    ws.insert("created".into(), created.into());
    ws.insert("lastAccessed".into(), last_accessed.into());

    if let Some(Value::Array(services)) = ws.get_mut("services") {
        for service in services.iter_mut().filter_map(Value::as_object_mut) {
            service.entry("isEnabled").or_insert(Value::Bool(true));
            service
                .entry("config")
                .or_insert_with(|| Value::Object(Map::new()));
        }
    }
    Ok(())
}

/// Accept RFC 3339 strings as-is; convert epoch milliseconds.
fn convert_timestamp(value: Option<&Value>) -> Result<String, String> {
    match value {
        None | Some(Value::Null) => Ok(EPOCH_RFC3339.to_string()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
            .ok_or_else(|| format!("timestamp out of range: {n}")),
        Some(other) => Err(format!("unsupported timestamp: {other}")),
    }
}

#[cfg(test)]
#[path = "migration_tests.rs"]
mod tests;
