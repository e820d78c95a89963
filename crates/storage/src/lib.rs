// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Durable storage for the berth workspace graph

mod document;
mod migration;
mod snapshot;
mod store;

pub use document::{decode, encode, CURRENT_VERSION};
pub use migration::{Migration, MigrationError, MigrationRegistry};
pub use snapshot::{quarantine, rotate_bak_path, write_atomic, SnapshotError};
pub use store::{FileStore, Loaded, Store, StoreError};

#[cfg(any(test, feature = "test-support"))]
pub use store::MemoryStore;
