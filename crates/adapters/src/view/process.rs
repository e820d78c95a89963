// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! View adapter that runs one renderer process per view.
//!
//! The renderer is described by a command template such as
//! `chromium --user-data-dir={profile} --app={url}`. Placeholders are
//! substituted per argument; the template is split on whitespace.

use super::{ViewAdapter, ViewError, ViewRequest};
use crate::subprocess::{rss_bytes, terminate};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::process::{Child, Command};

/// Renderer-process view adapter
#[derive(Clone)]
pub struct ProcessViewAdapter {
    program: String,
    args: Vec<String>,
    close_timeout: Duration,
    children: Arc<Mutex<HashMap<String, Child>>>,
    next_id: Arc<AtomicU64>,
}

impl ProcessViewAdapter {
    /// Build an adapter from a command template.
    pub fn new(template: &str) -> Result<Self, ViewError> {
        let mut parts = template.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| ViewError::OpenFailed("empty renderer command".into()))?;
        Ok(Self {
            program,
            args: parts.collect(),
            close_timeout: crate::env::view_close_timeout(),
            children: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    /// Adapter configured from `BERTH_RENDERER`, if set.
    pub fn from_env() -> Option<Result<Self, ViewError>> {
        crate::env::renderer_template().map(|t| Self::new(&t))
    }

    /// Number of renderer processes currently tracked.
    pub fn live_count(&self) -> usize {
        self.children.lock().len()
    }

    fn render_args(&self, request: &ViewRequest) -> Vec<String> {
        let profile = request
            .profile_dir
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{url}", &request.url)
                    .replace("{profile}", &profile)
                    .replace("{partition}", request.partition.as_str())
                    .replace("{service}", request.service_id.as_str())
            })
            .collect()
    }
}

#[async_trait]
impl ViewAdapter for ProcessViewAdapter {
    async fn open(&self, request: &ViewRequest) -> Result<String, ViewError> {
        if let Some(dir) = &request.profile_dir {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| ViewError::OpenFailed(format!("{}: {}", dir.display(), e)))?;
        }

        let mut cmd = Command::new(&self.program);
        cmd.args(self.render_args(request))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        let child = cmd
            .spawn()
            .map_err(|e| ViewError::OpenFailed(format!("{}: {}", self.program, e)))?;

        let handle = format!("proc-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        tracing::debug!(handle, pid = ?child.id(), "renderer started");
        self.children.lock().insert(handle.clone(), child);
        Ok(handle)
    }

    async fn close(&self, handle: &str) -> Result<(), ViewError> {
        let Some(child) = self.children.lock().remove(handle) else {
            return Ok(());
        };
        terminate(child, self.close_timeout, "renderer")
            .await
            .map_err(ViewError::CloseFailed)
    }

    async fn memory_bytes(&self, handle: &str) -> Result<u64, ViewError> {
        let pid = {
            let mut children = self.children.lock();
            let child = children
                .get_mut(handle)
                .ok_or_else(|| ViewError::NotFound(handle.to_string()))?;
            child.id()
        };
        Ok(pid.and_then(rss_bytes).unwrap_or(0))
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
