// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon client for CLI commands

use std::path::PathBuf;
use std::time::{Duration, Instant};

use berth_core::{
    ManagerEvent, PartitionInfo, PartitionKey, PartitionPatch, Service, ServicePatch,
    ServiceSpec, Settings, SettingsPatch, WindowRecord, WindowSpec, Workspace, WorkspacePatch,
    WorkspaceSpec,
};
use berth_daemon::protocol::{self, ProtocolError};
use berth_daemon::{Request, Response, PROTOCOL_VERSION};
use berth_engine::{ErrorKind, ViewInfo, ViewKey};
use serde::Serialize;
use thiserror::Error;
use tokio::net::unix::OwnedReadHalf;
use tokio::net::UnixStream;

use crate::client_lifecycle::log_connection_error;
use crate::daemon_process::{
    cleanup_stale_socket, daemon_socket, probe_socket, read_startup_error,
    start_daemon_background, wrap_with_startup_error,
};

/// Timeout for IPC requests
pub fn timeout_ipc() -> Duration {
    crate::env::timeout_ipc_ms().unwrap_or(Duration::from_secs(5))
}

/// Timeout for waiting for daemon to start
pub fn timeout_connect() -> Duration {
    crate::env::timeout_connect_ms().unwrap_or(Duration::from_secs(5))
}

/// Timeout for waiting for process to exit
pub fn timeout_exit() -> Duration {
    crate::env::timeout_exit_ms().unwrap_or(Duration::from_secs(2))
}

/// Polling interval for connection retries
pub fn poll_interval() -> Duration {
    crate::env::connect_poll_ms().unwrap_or(Duration::from_millis(50))
}

/// Client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Daemon not running")]
    DaemonNotRunning,

    #[error("Failed to start daemon: {0}")]
    DaemonStartFailed(String),

    #[error("Connection timeout waiting for daemon to start")]
    DaemonStartTimeout,

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("{message}")]
    Rejected { kind: ErrorKind, message: String },

    #[error("Unexpected response from daemon")]
    UnexpectedResponse,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not determine state directory")]
    NoStateDir,
}

impl ClientError {
    /// True when the daemon is simply not there (no socket or refused).
    pub fn is_not_running(&self) -> bool {
        match self {
            ClientError::DaemonNotRunning => true,
            ClientError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::ConnectionRefused | std::io::ErrorKind::NotFound
            ),
            _ => false,
        }
    }
}

/// Map a non-matching response to an error.
fn unexpected(response: Response) -> ClientError {
    match response {
        Response::Error { kind, message } => ClientError::Rejected { kind, message },
        _ => ClientError::UnexpectedResponse,
    }
}

/// Daemon status summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaemonStatus {
    pub uptime_secs: u64,
    pub workspaces: usize,
    pub active_workspace: Option<String>,
    pub active_views: usize,
}

/// Daemon client
pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    /// Connect to existing daemon (no auto-start)
    pub fn connect() -> Result<Self, ClientError> {
        let socket_path = daemon_socket()?;

        if !socket_path.exists() {
            let err = ClientError::DaemonNotRunning;
            log_connection_error(&err);
            return Err(err);
        }

        Ok(Self { socket_path })
    }

    /// Connect to daemon, auto-starting if not running
    pub fn connect_or_start() -> Result<Self, ClientError> {
        match Self::connect() {
            Ok(client) => {
                // Daemon may have crashed, leaving a stale socket file
                if probe_socket(&client.socket_path) {
                    Ok(client)
                } else {
                    cleanup_stale_socket()?;
                    let child = start_daemon_background()?;
                    Self::connect_with_retry(timeout_connect(), child)
                }
            }
            Err(ClientError::DaemonNotRunning) => {
                let child = start_daemon_background()?;
                Self::connect_with_retry(timeout_connect(), child)
            }
            Err(e) => Err(wrap_with_startup_error(e)),
        }
    }

    fn connect_with_retry(
        timeout: Duration,
        mut child: std::process::Child,
    ) -> Result<Self, ClientError> {
        let start = Instant::now();
        while start.elapsed() < timeout {
            if let Ok(Some(status)) = child.try_wait() {
                // Exited early: look for the reason in the log
                let poll_start = Instant::now();
                while poll_start.elapsed() < timeout_exit() {
                    if let Some(err) = read_startup_error() {
                        return Err(ClientError::DaemonStartFailed(err));
                    }
                    std::thread::sleep(poll_interval());
                }
                return Err(ClientError::DaemonStartFailed(format!(
                    "exited with {}",
                    status
                )));
            }

            match Self::connect() {
                Ok(client) if probe_socket(&client.socket_path) => return Ok(client),
                Ok(_) | Err(ClientError::DaemonNotRunning) => {
                    std::thread::sleep(poll_interval());
                }
                Err(e) => return Err(wrap_with_startup_error(e)),
            }
        }

        Err(wrap_with_startup_error(ClientError::DaemonStartTimeout))
    }

    #[cfg(test)]
    pub fn at(socket_path: PathBuf) -> Self {
        Self { socket_path }
    }

    /// Send a request and receive a response
    pub async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let result = self.exchange(request).await;
        if let Err(e) = &result {
            log_connection_error(e);
        }
        result
    }

    async fn exchange(&self, request: &Request) -> Result<Response, ClientError> {
        let stream = UnixStream::connect(&self.socket_path).await?;
        let (mut reader, mut writer) = stream.into_split();
        protocol::write_request(&mut writer, request, timeout_ipc()).await?;
        Ok(protocol::read_response(&mut reader, timeout_ipc()).await?)
    }

    /// Helper for requests that expect `Ok` or `Error`
    async fn send_simple(&self, request: &Request) -> Result<(), ClientError> {
        match self.send(request).await? {
            Response::Ok => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Get daemon version via Hello handshake
    pub async fn hello(&self) -> Result<String, ClientError> {
        let request = Request::Hello {
            version: PROTOCOL_VERSION.to_string(),
        };
        match self.send(&request).await? {
            Response::Hello { version } => Ok(version),
            other => Err(unexpected(other)),
        }
    }

    pub async fn status(&self) -> Result<DaemonStatus, ClientError> {
        match self.send(&Request::Status).await? {
            Response::Status {
                uptime_secs,
                workspaces,
                active_workspace,
                active_views,
            } => Ok(DaemonStatus {
                uptime_secs,
                workspaces,
                active_workspace: active_workspace.map(|id| id.to_string()),
                active_views,
            }),
            other => Err(unexpected(other)),
        }
    }

    /// Request daemon shutdown
    pub async fn shutdown(&self) -> Result<(), ClientError> {
        match self.send(&Request::Shutdown).await? {
            Response::Ok | Response::ShuttingDown => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    // -- workspaces --

    pub async fn list_workspaces(&self) -> Result<Vec<Workspace>, ClientError> {
        match self.send(&Request::ListWorkspaces).await? {
            Response::Workspaces { workspaces } => Ok(workspaces),
            other => Err(unexpected(other)),
        }
    }

    pub async fn get_workspace(&self, id: &str) -> Result<Workspace, ClientError> {
        let request = Request::GetWorkspace { id: id.to_string() };
        self.workspace(&request).await
    }

    pub async fn get_active_workspace(&self) -> Result<Option<Workspace>, ClientError> {
        match self.send(&Request::GetActiveWorkspace).await? {
            Response::Workspace { workspace } => Ok(workspace.map(|w| *w)),
            other => Err(unexpected(other)),
        }
    }

    pub async fn create_workspace(&self, spec: WorkspaceSpec) -> Result<Workspace, ClientError> {
        self.workspace(&Request::CreateWorkspace { spec }).await
    }

    pub async fn update_workspace(
        &self,
        id: &str,
        patch: WorkspacePatch,
    ) -> Result<Workspace, ClientError> {
        let request = Request::UpdateWorkspace {
            id: id.to_string(),
            patch,
        };
        self.workspace(&request).await
    }

    pub async fn delete_workspace(&self, id: &str) -> Result<(), ClientError> {
        self.send_simple(&Request::DeleteWorkspace { id: id.to_string() })
            .await
    }

    pub async fn switch_workspace(&self, id: &str) -> Result<Workspace, ClientError> {
        self.workspace(&Request::SwitchWorkspace { id: id.to_string() })
            .await
    }

    async fn workspace(&self, request: &Request) -> Result<Workspace, ClientError> {
        match self.send(request).await? {
            Response::Workspace {
                workspace: Some(workspace),
            } => Ok(*workspace),
            other => Err(unexpected(other)),
        }
    }

    // -- services --

    pub async fn add_service(
        &self,
        workspace_id: &str,
        spec: ServiceSpec,
    ) -> Result<Service, ClientError> {
        let request = Request::AddService {
            workspace_id: workspace_id.to_string(),
            spec,
        };
        self.service(&request).await
    }

    pub async fn update_service(
        &self,
        workspace_id: &str,
        service_id: &str,
        patch: ServicePatch,
    ) -> Result<Service, ClientError> {
        let request = Request::UpdateService {
            workspace_id: workspace_id.to_string(),
            service_id: service_id.to_string(),
            patch,
        };
        self.service(&request).await
    }

    pub async fn remove_service(
        &self,
        workspace_id: &str,
        service_id: &str,
    ) -> Result<(), ClientError> {
        self.send_simple(&Request::RemoveService {
            workspace_id: workspace_id.to_string(),
            service_id: service_id.to_string(),
        })
        .await
    }

    async fn service(&self, request: &Request) -> Result<Service, ClientError> {
        match self.send(request).await? {
            Response::Service { service } => Ok(*service),
            other => Err(unexpected(other)),
        }
    }

    // -- views --

    pub async fn load_service(
        &self,
        workspace_id: &str,
        service_id: &str,
    ) -> Result<ViewInfo, ClientError> {
        self.view(&Request::LoadService {
            workspace_id: workspace_id.to_string(),
            service_id: service_id.to_string(),
        })
        .await
    }

    pub async fn close_service(
        &self,
        workspace_id: &str,
        service_id: &str,
    ) -> Result<(), ClientError> {
        self.send_simple(&Request::CloseService {
            workspace_id: workspace_id.to_string(),
            service_id: service_id.to_string(),
        })
        .await
    }

    pub async fn touch_service(
        &self,
        workspace_id: &str,
        service_id: &str,
    ) -> Result<(), ClientError> {
        self.send_simple(&Request::TouchService {
            workspace_id: workspace_id.to_string(),
            service_id: service_id.to_string(),
        })
        .await
    }

    pub async fn pin_service(
        &self,
        workspace_id: &str,
        service_id: &str,
        pinned: bool,
    ) -> Result<ViewInfo, ClientError> {
        self.view(&Request::PinService {
            workspace_id: workspace_id.to_string(),
            service_id: service_id.to_string(),
            pinned,
        })
        .await
    }

    pub async fn list_views(&self) -> Result<Vec<ViewInfo>, ClientError> {
        match self.send(&Request::ListViews).await? {
            Response::Views { views } => Ok(views),
            other => Err(unexpected(other)),
        }
    }

    pub async fn run_eviction_sweep(&self) -> Result<Vec<ViewKey>, ClientError> {
        match self.send(&Request::RunEvictionSweep).await? {
            Response::Evicted { views } => Ok(views),
            other => Err(unexpected(other)),
        }
    }

    async fn view(&self, request: &Request) -> Result<ViewInfo, ClientError> {
        match self.send(request).await? {
            Response::View { view } => Ok(view),
            other => Err(unexpected(other)),
        }
    }

    // -- partitions --

    pub async fn list_partitions(
        &self,
        workspace_id: Option<&str>,
    ) -> Result<Vec<PartitionInfo>, ClientError> {
        let request = Request::ListPartitions {
            workspace_id: workspace_id.map(String::from),
        };
        match self.send(&request).await? {
            Response::Partitions { partitions } => Ok(partitions),
            other => Err(unexpected(other)),
        }
    }

    pub async fn create_partition(
        &self,
        workspace_id: &str,
        service_id: Option<&str>,
        patch: PartitionPatch,
    ) -> Result<PartitionInfo, ClientError> {
        self.partition(&Request::CreatePartition {
            workspace_id: workspace_id.to_string(),
            service_id: service_id.map(String::from),
            patch,
        })
        .await
    }

    pub async fn update_partition(
        &self,
        key: &str,
        patch: PartitionPatch,
    ) -> Result<PartitionInfo, ClientError> {
        self.partition(&Request::UpdatePartition {
            key: key.to_string(),
            patch,
        })
        .await
    }

    pub async fn clear_partition(&self, key: &str) -> Result<Vec<PartitionKey>, ClientError> {
        self.cleared(&Request::ClearPartition {
            key: key.to_string(),
        })
        .await
    }

    pub async fn clear_workspace_data(
        &self,
        workspace_id: &str,
    ) -> Result<Vec<PartitionKey>, ClientError> {
        self.cleared(&Request::ClearWorkspaceData {
            workspace_id: workspace_id.to_string(),
        })
        .await
    }

    async fn partition(&self, request: &Request) -> Result<PartitionInfo, ClientError> {
        match self.send(request).await? {
            Response::Partition { partition } => Ok(partition),
            other => Err(unexpected(other)),
        }
    }

    async fn cleared(&self, request: &Request) -> Result<Vec<PartitionKey>, ClientError> {
        match self.send(request).await? {
            Response::Cleared { partitions } => Ok(partitions),
            other => Err(unexpected(other)),
        }
    }

    // -- windows --

    pub async fn get_windows(
        &self,
        workspace_id: Option<&str>,
    ) -> Result<Vec<WindowRecord>, ClientError> {
        let request = Request::GetWindows {
            workspace_id: workspace_id.map(String::from),
        };
        match self.send(&request).await? {
            Response::Windows { windows } => Ok(windows),
            other => Err(unexpected(other)),
        }
    }

    pub async fn create_window(
        &self,
        workspace_id: &str,
        spec: WindowSpec,
    ) -> Result<WindowRecord, ClientError> {
        let request = Request::CreateWindow {
            workspace_id: workspace_id.to_string(),
            spec,
        };
        match self.send(&request).await? {
            Response::Window { window } => Ok(window),
            other => Err(unexpected(other)),
        }
    }

    pub async fn close_window(&self, window_id: &str) -> Result<(), ClientError> {
        self.send_simple(&Request::CloseWindow {
            window_id: window_id.to_string(),
        })
        .await
    }

    // -- settings --

    pub async fn get_settings(&self) -> Result<Settings, ClientError> {
        match self.send(&Request::GetSettings).await? {
            Response::Settings { settings } => Ok(settings),
            other => Err(unexpected(other)),
        }
    }

    pub async fn update_settings(&self, patch: SettingsPatch) -> Result<Settings, ClientError> {
        match self.send(&Request::UpdateSettings { patch }).await? {
            Response::Settings { settings } => Ok(settings),
            other => Err(unexpected(other)),
        }
    }

    // -- events --

    /// Open a subscription; events arrive until the daemon stops.
    pub async fn subscribe(&self) -> Result<EventStream, ClientError> {
        let stream = UnixStream::connect(&self.socket_path).await?;
        let (mut reader, mut writer) = stream.into_split();
        protocol::write_request(&mut writer, &Request::Subscribe, timeout_ipc()).await?;
        match protocol::read_response(&mut reader, timeout_ipc()).await? {
            Response::Subscribed => Ok(EventStream {
                reader,
                _writer: writer,
            }),
            other => Err(unexpected(other)),
        }
    }
}

/// Streamed manager events from a `Subscribe` connection
pub struct EventStream {
    reader: OwnedReadHalf,
    // Dropping the write half would signal hang-up to the daemon
    _writer: tokio::net::unix::OwnedWriteHalf,
}

impl EventStream {
    /// Next event, or `None` once the daemon closes the stream.
    pub async fn next(&mut self) -> Result<Option<ManagerEvent>, ClientError> {
        let payload = match protocol::read_message(&mut self.reader).await {
            Ok(payload) => payload,
            Err(ProtocolError::ConnectionClosed) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match protocol::decode::<Response>(&payload)? {
            Response::Event { event } => Ok(Some(event)),
            other => Err(unexpected(other)),
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
