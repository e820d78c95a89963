// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! berth-core: data model shared by the berth workspace manager

pub mod clock;
pub mod config;
pub mod event;
pub mod graph;
pub mod id;
pub mod partition;
pub mod service;
pub mod window;
pub mod workspace;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{ConfigError, ManagerConfig};
pub use event::{EvictionReason, ManagerEvent};
pub use graph::{Settings, SettingsPatch, WorkspaceGraph, DEFAULT_WORKSPACE_NAME};
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use partition::{resolve_key, PartitionInfo, PartitionKey, PartitionPatch, PartitionRecord};
pub use service::{Service, ServiceId, ServicePatch, ServiceSpec};
pub use window::{WindowId, WindowRecord, WindowSpec};
pub use workspace::{
    derive_abbreviation, IsolationMode, Workspace, WorkspaceId, WorkspacePatch, WorkspaceSpec,
};
