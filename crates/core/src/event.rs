// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Change notifications published by the workspace manager

use crate::partition::PartitionKey;
use crate::service::ServiceId;
use crate::window::WindowId;
use crate::workspace::WorkspaceId;
use serde::{Deserialize, Serialize};

/// Why a view was closed without being asked to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionReason {
    /// The live-view cap was reached
    Capacity,
    /// Aggregate view memory crossed the threshold
    MemoryPressure,
}

/// Events emitted after a state change has been applied.
///
/// Serializes with `{"type": "event:name", ...fields}` format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ManagerEvent {
    // -- workspace --
    #[serde(rename = "workspace:created")]
    WorkspaceCreated { workspace_id: WorkspaceId },

    #[serde(rename = "workspace:updated")]
    WorkspaceUpdated { workspace_id: WorkspaceId },

    #[serde(rename = "workspace:deleted")]
    WorkspaceDeleted { workspace_id: WorkspaceId },

    #[serde(rename = "workspace:switched")]
    WorkspaceSwitched {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<WorkspaceId>,
        to: WorkspaceId,
    },

    // -- service --
    #[serde(rename = "service:added")]
    ServiceAdded {
        workspace_id: WorkspaceId,
        service_id: ServiceId,
    },

    #[serde(rename = "service:updated")]
    ServiceUpdated {
        workspace_id: WorkspaceId,
        service_id: ServiceId,
    },

    #[serde(rename = "service:removed")]
    ServiceRemoved {
        workspace_id: WorkspaceId,
        service_id: ServiceId,
    },

    // -- view --
    #[serde(rename = "view:activated")]
    ViewActivated {
        workspace_id: WorkspaceId,
        service_id: ServiceId,
        partition: PartitionKey,
    },

    #[serde(rename = "view:closed")]
    ViewClosed {
        workspace_id: WorkspaceId,
        service_id: ServiceId,
    },

    #[serde(rename = "view:evicted")]
    ViewEvicted {
        workspace_id: WorkspaceId,
        service_id: ServiceId,
        reason: EvictionReason,
    },

    // -- partition --
    #[serde(rename = "partition:cleared")]
    PartitionCleared { partition: PartitionKey },

    #[serde(rename = "partition:updated")]
    PartitionUpdated { partition: PartitionKey },

    // -- window --
    #[serde(rename = "window:created")]
    WindowCreated {
        window_id: WindowId,
        workspace_id: WorkspaceId,
    },

    #[serde(rename = "window:closed")]
    WindowClosed { window_id: WindowId },

    // -- settings / persistence --
    #[serde(rename = "settings:updated")]
    SettingsUpdated,

    /// A save failed; in-memory state was kept
    #[serde(rename = "persistence:failed")]
    PersistenceFailed { message: String },
}

impl ManagerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ManagerEvent::WorkspaceCreated { .. } => "workspace:created",
            ManagerEvent::WorkspaceUpdated { .. } => "workspace:updated",
            ManagerEvent::WorkspaceDeleted { .. } => "workspace:deleted",
            ManagerEvent::WorkspaceSwitched { .. } => "workspace:switched",
            ManagerEvent::ServiceAdded { .. } => "service:added",
            ManagerEvent::ServiceUpdated { .. } => "service:updated",
            ManagerEvent::ServiceRemoved { .. } => "service:removed",
            ManagerEvent::ViewActivated { .. } => "view:activated",
            ManagerEvent::ViewClosed { .. } => "view:closed",
            ManagerEvent::ViewEvicted { .. } => "view:evicted",
            ManagerEvent::PartitionCleared { .. } => "partition:cleared",
            ManagerEvent::PartitionUpdated { .. } => "partition:updated",
            ManagerEvent::WindowCreated { .. } => "window:created",
            ManagerEvent::WindowClosed { .. } => "window:closed",
            ManagerEvent::SettingsUpdated => "settings:updated",
            ManagerEvent::PersistenceFailed { .. } => "persistence:failed",
        }
    }

    /// One-line summary for log output
    pub fn log_summary(&self) -> String {
        let t = self.name();
        match self {
            ManagerEvent::WorkspaceCreated { workspace_id }
            | ManagerEvent::WorkspaceUpdated { workspace_id }
            | ManagerEvent::WorkspaceDeleted { workspace_id } => {
                format!("{t} workspace={workspace_id}")
            }
            ManagerEvent::WorkspaceSwitched { from, to } => match from {
                Some(from) => format!("{t} from={from} to={to}"),
                None => format!("{t} to={to}"),
            },
            ManagerEvent::ServiceAdded {
                workspace_id,
                service_id,
            }
            | ManagerEvent::ServiceUpdated {
                workspace_id,
                service_id,
            }
            | ManagerEvent::ServiceRemoved {
                workspace_id,
                service_id,
            } => format!("{t} workspace={workspace_id} service={service_id}"),
            ManagerEvent::ViewActivated {
                workspace_id,
                service_id,
                partition,
            } => format!("{t} workspace={workspace_id} service={service_id} partition={partition}"),
            ManagerEvent::ViewClosed {
                workspace_id,
                service_id,
            } => format!("{t} workspace={workspace_id} service={service_id}"),
            ManagerEvent::ViewEvicted {
                workspace_id,
                service_id,
                reason,
            } => {
                format!("{t} workspace={workspace_id} service={service_id} reason={reason:?}")
            }
            ManagerEvent::PartitionCleared { partition }
            | ManagerEvent::PartitionUpdated { partition } => {
                format!("{t} partition={partition}")
            }
            ManagerEvent::WindowCreated {
                window_id,
                workspace_id,
            } => format!("{t} window={window_id} workspace={workspace_id}"),
            ManagerEvent::WindowClosed { window_id } => format!("{t} window={window_id}"),
            ManagerEvent::SettingsUpdated => t.to_string(),
            ManagerEvent::PersistenceFailed { message } => format!("{t} error={message}"),
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
