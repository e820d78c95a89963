// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for hosted views and partition storage

mod env;
pub mod partition;
pub mod subprocess;
pub mod traced;
pub mod view;

pub use partition::{FsPartitionStore, PartitionError, PartitionStore};
pub use traced::{TracedPartitionStore, TracedView};
pub use view::{NoOpViewAdapter, ProcessViewAdapter, ViewAdapter, ViewError, ViewRequest};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use partition::{FakePartitionStore, PartitionCall};
#[cfg(any(test, feature = "test-support"))]
pub use view::{FakeView, FakeViewAdapter, ViewCall};
