// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup and shutdown.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use berth_adapters::{
    FsPartitionStore, NoOpViewAdapter, ProcessViewAdapter, TracedPartitionStore, TracedView,
    ViewAdapter, ViewError, ViewRequest,
};
use berth_core::{ConfigError, ManagerConfig, SystemClock, UuidIdGen};
use berth_engine::{ManagerDeps, WorkspaceManager};
use berth_storage::FileStore;
use fs2::FileExt;
use thiserror::Error;
use tokio::net::UnixListener;
use tracing::{info, warn};

use crate::env;

/// Renderer backing the daemon's views
#[derive(Clone)]
pub enum Renderer {
    /// One external process per view (`BERTH_RENDERER`)
    Process(ProcessViewAdapter),
    /// No native views; handles are bookkeeping only
    Headless(NoOpViewAdapter),
}

impl Renderer {
    /// Process renderer if `BERTH_RENDERER` is set, headless otherwise.
    pub fn from_env() -> Result<Self, StartupError> {
        match ProcessViewAdapter::from_env() {
            Some(adapter) => Ok(Renderer::Process(adapter?)),
            None => {
                info!("BERTH_RENDERER not set, running headless");
                Ok(Renderer::Headless(NoOpViewAdapter::new()))
            }
        }
    }
}

#[async_trait]
impl ViewAdapter for Renderer {
    async fn open(&self, request: &ViewRequest) -> Result<String, ViewError> {
        match self {
            Renderer::Process(inner) => inner.open(request).await,
            Renderer::Headless(inner) => inner.open(request).await,
        }
    }

    async fn close(&self, handle: &str) -> Result<(), ViewError> {
        match self {
            Renderer::Process(inner) => inner.close(handle).await,
            Renderer::Headless(inner) => inner.close(handle).await,
        }
    }

    async fn memory_bytes(&self, handle: &str) -> Result<u64, ViewError> {
        match self {
            Renderer::Process(inner) => inner.memory_bytes(handle).await,
            Renderer::Headless(inner) => inner.memory_bytes(handle).await,
        }
    }
}

/// Workspace manager with the daemon's concrete adapters (wrapped with tracing)
pub type DaemonManager = WorkspaceManager<
    TracedView<Renderer>,
    TracedPartitionStore<FsPartitionStore>,
    SystemClock,
    UuidIdGen,
>;

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (e.g. ~/.local/state/berth)
    pub state_dir: PathBuf,
    /// Path to Unix socket
    pub socket_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Path to the workspace graph record
    pub store_path: PathBuf,
    /// Path to the optional manager configuration
    pub config_path: PathBuf,
    /// Root of on-disk partition storage
    pub partitions_path: PathBuf,
}

impl Config {
    /// Load configuration for the user-level daemon.
    ///
    /// Uses fixed paths under `~/.local/state/berth/` (or `$XDG_STATE_HOME/berth/`).
    pub fn load() -> Result<Self, StartupError> {
        Ok(Self::at(env::state_dir()?))
    }

    /// Configuration rooted at `state_dir`.
    pub fn at(state_dir: PathBuf) -> Self {
        Self {
            socket_path: state_dir.join("daemon.sock"),
            lock_path: state_dir.join("daemon.pid"),
            log_path: state_dir.join("daemon.log"),
            store_path: state_dir.join("workspaces.json"),
            config_path: state_dir.join("config.toml"),
            partitions_path: state_dir.join("partitions"),
            state_dir,
        }
    }

    /// Manager limits: `config.toml` if present, then `BERTH_*` overrides.
    pub fn manager_config(&self) -> Result<ManagerConfig, StartupError> {
        let mut manager = match std::fs::read_to_string(&self.config_path) {
            Ok(source) => ManagerConfig::from_toml(&source)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ManagerConfig::default(),
            Err(e) => return Err(e.into()),
        };
        env::apply_overrides(&mut manager)?;
        manager.validate()?;
        Ok(manager)
    }
}

/// Daemon state during operation.
pub struct DaemonState {
    /// Configuration
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    /// Workspace manager (shared with the listener and sweep)
    pub manager: Arc<DaemonManager>,
    /// When daemon started
    pub start_time: Instant,
}

/// Result of daemon startup: the daemon state and the bound socket.
pub struct StartupResult {
    pub daemon: DaemonState,
    /// The Unix socket listener to spawn as a task
    pub listener: UnixListener,
}

impl DaemonState {
    /// Shutdown the daemon gracefully.
    ///
    /// Closes every view, wipes non-persistent partitions and flushes a
    /// final save before removing the socket and PID file.
    pub async fn shutdown(&mut self) {
        info!("Shutting down daemon...");

        if let Err(e) = self.manager.shutdown().await {
            warn!(error = %e, "final save failed");
        }

        if self.config.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.socket_path) {
                warn!("Failed to remove socket file: {}", e);
            }
        }
        if self.config.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.lock_path) {
                warn!("Failed to remove PID file: {}", e);
            }
        }

        info!("Daemon shutdown complete");
    }
}

/// Startup errors
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("Invalid value {value:?} for {var}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Renderer error: {0}")]
    Renderer(#[from] ViewError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the daemon
pub async fn startup(config: &Config) -> Result<StartupResult, StartupError> {
    match startup_inner(config).await {
        Ok(result) => Ok(result),
        Err(e) => {
            // On lock failure the files belong to the running daemon
            if !matches!(e, StartupError::LockFailed(_)) {
                cleanup_on_failure(config);
            }
            Err(e)
        }
    }
}

async fn startup_inner(config: &Config) -> Result<StartupResult, StartupError> {
    // 1. Create state directory (needed for socket, lock, etc.)
    std::fs::create_dir_all(&config.state_dir)?;

    // 2. Acquire lock file FIRST - prevents races.
    // Open without truncating so a running daemon's PID survives a failed attempt.
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(StartupError::LockFailed)?;

    use std::io::Write;
    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    // 3. Configuration and adapters
    let manager_config = config.manager_config()?;
    std::fs::create_dir_all(&config.partitions_path)?;
    let views = TracedView::new(Renderer::from_env()?);
    let partitions = TracedPartitionStore::new(FsPartitionStore::new(&config.partitions_path));

    // 4. Load the workspace graph
    info!(
        path = %config.store_path.display(),
        max_active_views = manager_config.max_active_views,
        "opening workspace manager"
    );
    let manager = WorkspaceManager::open(
        ManagerDeps {
            views,
            partitions,
            store: Arc::new(FileStore::new(&config.store_path)),
        },
        manager_config,
        SystemClock,
        UuidIdGen,
    )
    .await;

    // 5. Remove stale socket and bind (LAST - only after all validation passes)
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|e| StartupError::BindFailed(config.socket_path.clone(), e))?;

    Ok(StartupResult {
        daemon: DaemonState {
            config: config.clone(),
            lock_file,
            manager: Arc::new(manager),
            start_time: Instant::now(),
        },
        listener,
    })
}

/// Remove files created by a failed startup.
fn cleanup_on_failure(config: &Config) {
    for path in [&config.socket_path, &config.lock_path] {
        if path.exists() {
            if let Err(e) = std::fs::remove_file(path) {
                warn!(path = %path.display(), error = %e, "failed to clean up after startup failure");
            }
        }
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
