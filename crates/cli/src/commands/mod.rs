// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod daemon;
pub mod events;
pub mod partition;
pub mod service;
pub mod settings;
pub mod view;
pub mod window;
pub mod workspace;
