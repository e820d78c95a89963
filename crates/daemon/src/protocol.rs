// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC protocol for daemon communication.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload

use berth_core::{
    ManagerEvent, PartitionInfo, PartitionKey, PartitionPatch, Service, ServicePatch,
    ServiceSpec, Settings, SettingsPatch, WindowRecord, WindowSpec, Workspace, WorkspaceId,
    WorkspacePatch, WorkspaceSpec,
};
use berth_engine::{ErrorKind, ViewInfo, ViewKey};
use serde::{Deserialize, Serialize};

#[path = "protocol_wire.rs"]
mod wire;
pub use wire::{
    decode, encode, read_message, read_request, read_response, recv, send, write_message,
    write_request, write_response, ProtocolError, DEFAULT_TIMEOUT, MAX_MESSAGE_SIZE,
    PROTOCOL_VERSION,
};

/// Request from CLI to daemon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check ping
    Ping,

    /// Version handshake
    Hello { version: String },

    /// Get daemon status
    Status,

    /// Close every view, flush a final save and stop
    Shutdown,

    /// Keep the connection open and stream every manager event
    Subscribe,

    ListWorkspaces,

    GetWorkspace { id: String },

    GetActiveWorkspace,

    CreateWorkspace { spec: WorkspaceSpec },

    UpdateWorkspace { id: String, patch: WorkspacePatch },

    DeleteWorkspace { id: String },

    SwitchWorkspace { id: String },

    AddService { workspace_id: String, spec: ServiceSpec },

    UpdateService {
        workspace_id: String,
        service_id: String,
        patch: ServicePatch,
    },

    RemoveService { workspace_id: String, service_id: String },

    /// Materialize (or reuse) a service's view
    LoadService { workspace_id: String, service_id: String },

    CloseService { workspace_id: String, service_id: String },

    TouchService { workspace_id: String, service_id: String },

    PinService {
        workspace_id: String,
        service_id: String,
        pinned: bool,
    },

    ListViews,

    /// Run the memory-pressure sweep now
    RunEvictionSweep,

    ListPartitions {
        #[serde(default)]
        workspace_id: Option<String>,
    },

    CreatePartition {
        workspace_id: String,
        #[serde(default)]
        service_id: Option<String>,
        #[serde(default)]
        patch: PartitionPatch,
    },

    UpdatePartition { key: String, patch: PartitionPatch },

    ClearPartition { key: String },

    /// Wipe every partition of a workspace
    ClearWorkspaceData { workspace_id: String },

    GetWindows {
        #[serde(default)]
        workspace_id: Option<String>,
    },

    CreateWindow {
        workspace_id: String,
        #[serde(default)]
        spec: WindowSpec,
    },

    CloseWindow { window_id: String },

    GetSettings,

    UpdateSettings { patch: SettingsPatch },
}

/// Response from daemon to CLI
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    /// Generic success
    Ok,

    /// Health check response
    Pong,

    /// Version handshake response
    Hello { version: String },

    /// Daemon is shutting down
    ShuttingDown,

    Status {
        uptime_secs: u64,
        workspaces: usize,
        active_workspace: Option<WorkspaceId>,
        active_views: usize,
    },

    /// Subscription accepted; events follow on the same connection
    Subscribed,

    /// One streamed manager event
    Event { event: ManagerEvent },

    Workspaces { workspaces: Vec<Workspace> },

    Workspace { workspace: Option<Box<Workspace>> },

    Service { service: Box<Service> },

    View { view: ViewInfo },

    Views { views: Vec<ViewInfo> },

    Evicted { views: Vec<ViewKey> },

    Partitions { partitions: Vec<PartitionInfo> },

    Partition { partition: PartitionInfo },

    Cleared { partitions: Vec<PartitionKey> },

    Windows { windows: Vec<WindowRecord> },

    Window { window: WindowRecord },

    Settings { settings: Settings },

    /// A failed request, with a stable error category
    Error { kind: ErrorKind, message: String },
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
