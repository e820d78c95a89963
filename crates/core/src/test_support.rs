// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{
    IsolationMode, Service, ServiceId, ServiceSpec, Workspace, WorkspaceGraph, WorkspaceId,
    WorkspaceSpec,
};
use chrono::{DateTime, TimeZone, Utc};

/// Fixed timestamp used by builders (2024-01-01T00:00:00Z)
pub fn fixed_time() -> DateTime<Utc> {
    Utc.timestamp_opt(1_704_067_200, 0)
        .single()
        .unwrap_or_default()
}

pub fn service_spec() -> ServiceSpec {
    ServiceSpec::new("Chat", "slack", "https://chat.example.com")
}

/// An inactive, shared workspace with the given id and no services.
pub fn workspace(id: &str) -> Workspace {
    Workspace::new(
        WorkspaceId::new(id),
        WorkspaceSpec::named(format!("Workspace {id}")),
        IsolationMode::Shared,
        fixed_time(),
    )
}

/// A workspace holding one service per entry of `service_ids`.
pub fn workspace_with_services(id: &str, mode: IsolationMode, service_ids: &[&str]) -> Workspace {
    let mut ws = workspace(id);
    ws.isolation_mode = mode;
    ws.services = service_ids
        .iter()
        .map(|sid| Service::new(ServiceId::new(*sid), service_spec()))
        .collect();
    ws
}

/// A graph of inactive, empty workspaces.
pub fn graph_with(ids: &[&str]) -> WorkspaceGraph {
    WorkspaceGraph {
        workspaces: ids.iter().map(|id| workspace(id)).collect(),
        ..WorkspaceGraph::default()
    }
}
