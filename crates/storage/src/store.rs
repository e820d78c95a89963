// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The durable store for the workspace graph.
//!
//! Loading never fails because of bad content: an unreadable or too-new
//! record is moved aside and reported as [`Loaded::Quarantined`] so the
//! caller can start from a fresh graph.

use crate::document::{decode, encode};
use crate::migration::{MigrationError, MigrationRegistry};
use crate::snapshot::{quarantine, write_atomic, SnapshotError};
use berth_core::WorkspaceGraph;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, warn};

/// Errors from loading or saving the graph
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Migration(#[from] MigrationError),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Snapshot(SnapshotError::Io(e))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Snapshot(SnapshotError::Json(e))
    }
}

/// Outcome of reading the durable record
#[derive(Debug)]
pub enum Loaded {
    Found(WorkspaceGraph),
    /// No record exists yet
    Missing,
    /// The record could not be used and was moved aside
    Quarantined {
        backup: Option<PathBuf>,
        reason: String,
    },
}

/// Reads and writes the whole workspace graph
pub trait Store: Send + Sync + 'static {
    fn load(&self) -> Result<Loaded, StoreError>;

    /// Replace the durable record with `graph`.
    fn save(&self, graph: &WorkspaceGraph) -> Result<(), StoreError>;
}

/// JSON file store with atomic replace
pub struct FileStore {
    path: PathBuf,
    migrations: MigrationRegistry,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            migrations: MigrationRegistry::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Store for FileStore {
    fn load(&self) -> Result<Loaded, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Loaded::Missing),
            Err(e) => return Err(e.into()),
        };

        match decode(&bytes, &self.migrations) {
            Ok(graph) => Ok(Loaded::Found(graph)),
            Err(e) => {
                let reason = e.to_string();
                let backup = match quarantine(&self.path) {
                    Ok(bak) => {
                        warn!(
                            error = %reason,
                            path = %self.path.display(),
                            bak = %bak.display(),
                            "unusable workspace record, moved to .bak and starting fresh",
                        );
                        Some(bak)
                    }
                    Err(qe) => {
                        error!(
                            error = %reason,
                            quarantine_error = %qe,
                            path = %self.path.display(),
                            "unusable workspace record could not be moved aside",
                        );
                        None
                    }
                };
                Ok(Loaded::Quarantined { backup, reason })
            }
        }
    }

    fn save(&self, graph: &WorkspaceGraph) -> Result<(), StoreError> {
        let bytes = encode(graph)?;
        write_atomic(&self.path, &bytes)?;
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
mod memory {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Default)]
    struct MemoryState {
        document: Option<Vec<u8>>,
        saves: usize,
        fail_saves: bool,
        save_delay: Option<Duration>,
    }

    /// In-memory store for tests. Clones share state.
    #[derive(Clone, Default)]
    pub struct MemoryStore {
        inner: Arc<Mutex<MemoryState>>,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Store seeded with raw document bytes.
        pub fn with_document(bytes: impl Into<Vec<u8>>) -> Self {
            let store = Self::default();
            store.inner.lock().document = Some(bytes.into());
            store
        }

        /// Make every subsequent save fail (or succeed again).
        pub fn fail_saves(&self, fail: bool) {
            self.inner.lock().fail_saves = fail;
        }

        /// Sleep inside each save to widen race windows.
        pub fn set_save_delay(&self, delay: Duration) {
            self.inner.lock().save_delay = Some(delay);
        }

        /// Number of successful saves.
        pub fn saves(&self) -> usize {
            self.inner.lock().saves
        }

        /// The last saved graph, decoded.
        pub fn saved_graph(&self) -> Option<WorkspaceGraph> {
            let bytes = self.inner.lock().document.clone()?;
            decode(&bytes, &MigrationRegistry::new()).ok()
        }
    }

    impl Store for MemoryStore {
        fn load(&self) -> Result<Loaded, StoreError> {
            let mut inner = self.inner.lock();
            let Some(bytes) = inner.document.as_ref() else {
                return Ok(Loaded::Missing);
            };
            match decode(bytes, &MigrationRegistry::new()) {
                Ok(graph) => Ok(Loaded::Found(graph)),
                Err(e) => {
                    inner.document = None;
                    Ok(Loaded::Quarantined {
                        backup: None,
                        reason: e.to_string(),
                    })
                }
            }
        }

        fn save(&self, graph: &WorkspaceGraph) -> Result<(), StoreError> {
            let delay = self.inner.lock().save_delay;
            if let Some(delay) = delay {
                std::thread::sleep(delay);
            }
            let bytes = encode(graph)?;
            let mut inner = self.inner.lock();
            if inner.fail_saves {
                return Err(std::io::Error::other("injected save failure").into());
            }
            inner.document = Some(bytes);
            inner.saves += 1;
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryStore;

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
