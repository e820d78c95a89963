// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! berth engine: session lifecycle, persistence queue and the workspace manager

mod error;
mod lifecycle;
mod manager;
mod persist;
mod sweep;

pub use error::{ErrorKind, LifecycleError, ManagerError};
pub use lifecycle::{Activation, SessionLifecycle, ViewInfo, ViewKey};
pub use manager::{ManagerDeps, WorkspaceManager};
pub use persist::{Persister, SaveResult, SaveTicket};
pub use sweep::spawn_eviction_sweep;
