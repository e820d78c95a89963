// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine

use berth_adapters::{PartitionError, ViewError};
use berth_storage::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors from the session lifecycle
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("no view slot available (cap {cap}, {pinned} pinned)")]
    CapacityExceeded { cap: usize, pinned: usize },
    #[error("view error: {0}")]
    View(#[from] ViewError),
}

/// Errors returned by workspace manager operations
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("workspace not found: {0}")]
    WorkspaceNotFound(String),
    #[error("service not found: {service} in workspace {workspace}")]
    ServiceNotFound { workspace: String, service: String },
    #[error("partition not found: {0}")]
    PartitionNotFound(String),
    #[error("window not found: {0}")]
    WindowNotFound(String),
    #[error("service has no loaded view: {0}")]
    ViewNotLoaded(String),
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("capacity exceeded: {0}")]
    CapacityExceeded(String),
    #[error("failed to clear partition: {0}")]
    PartitionClear(#[source] PartitionError),
    /// The change was applied in memory but could not be saved
    #[error("failed to persist workspace graph: {0}")]
    Persistence(Arc<StoreError>),
    #[error("view error: {0}")]
    View(#[source] ViewError),
}

impl From<LifecycleError> for ManagerError {
    fn from(e: LifecycleError) -> Self {
        match e {
            LifecycleError::CapacityExceeded { .. } => ManagerError::CapacityExceeded(e.to_string()),
            LifecycleError::View(view) => ManagerError::View(view),
        }
    }
}

/// Stable error category reported to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    CapacityExceeded,
    PersistenceFailure,
    PartitionClearFailure,
    ValidationError,
    ViewFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::CapacityExceeded => "capacity_exceeded",
            ErrorKind::PersistenceFailure => "persistence_failure",
            ErrorKind::PartitionClearFailure => "partition_clear_failure",
            ErrorKind::ValidationError => "validation_error",
            ErrorKind::ViewFailure => "view_failure",
        };
        f.write_str(s)
    }
}

impl ManagerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ManagerError::WorkspaceNotFound(_)
            | ManagerError::ServiceNotFound { .. }
            | ManagerError::PartitionNotFound(_)
            | ManagerError::WindowNotFound(_)
            | ManagerError::ViewNotLoaded(_) => ErrorKind::NotFound,
            ManagerError::Validation(_) => ErrorKind::ValidationError,
            ManagerError::CapacityExceeded(_) => ErrorKind::CapacityExceeded,
            ManagerError::PartitionClear(_) => ErrorKind::PartitionClearFailure,
            ManagerError::Persistence(_) => ErrorKind::PersistenceFailure,
            ManagerError::View(_) => ErrorKind::ViewFailure,
        }
    }
}
