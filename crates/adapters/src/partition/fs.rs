// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem partition store: one directory per partition key.

use super::{PartitionError, PartitionStore};
use async_trait::async_trait;
use berth_core::PartitionKey;
use std::path::{Path, PathBuf};

/// Partitions stored as `<root>/<key>/`
#[derive(Clone, Debug)]
pub struct FsPartitionStore {
    root: PathBuf,
}

impl FsPartitionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn dir(&self, key: &PartitionKey) -> Result<PathBuf, PartitionError> {
        let k = key.as_str();
        let valid = !k.is_empty()
            && !k.starts_with('.')
            && !k.contains("..")
            && !k.contains(['/', '\\', '\0']);
        if !valid {
            return Err(PartitionError::InvalidKey(k.to_string()));
        }
        Ok(self.root.join(k))
    }
}

#[async_trait]
impl PartitionStore for FsPartitionStore {
    fn location(&self, key: &PartitionKey) -> Option<PathBuf> {
        self.dir(key).ok()
    }

    async fn clear(&self, key: &PartitionKey) -> Result<(), PartitionError> {
        let dir = self.dir(key)?;
        if !tokio::fs::try_exists(&dir).await? {
            return Ok(());
        }

        // Rename first so the key is observed either full or empty
        let doomed = self
            .root
            .join(format!(".{}.clearing-{}", key, uuid::Uuid::new_v4()));
        let fail = |e: std::io::Error| PartitionError::ClearFailed {
            key: key.to_string(),
            reason: e.to_string(),
        };
        tokio::fs::rename(&dir, &doomed).await.map_err(fail)?;
        tokio::fs::remove_dir_all(&doomed).await.map_err(fail)?;
        Ok(())
    }

    async fn usage_bytes(&self, key: &PartitionKey) -> Result<u64, PartitionError> {
        let dir = self.dir(key)?;
        let total = tokio::task::spawn_blocking(move || dir_size(&dir))
            .await
            .map_err(|e| PartitionError::Io(std::io::Error::other(e)))??;
        Ok(total)
    }
}

fn dir_size(path: &Path) -> std::io::Result<u64> {
    let entries = match std::fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };
    let mut total = 0;
    for entry in entries {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            total += dir_size(&entry.path())?;
        } else if file_type.is_file() {
            total += entry.metadata()?.len();
        }
    }
    Ok(total)
}

#[cfg(test)]
#[path = "fs_tests.rs"]
mod tests;
