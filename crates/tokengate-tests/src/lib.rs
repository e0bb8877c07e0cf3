// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # tokengate Integration Tests
//!
//! Integration tests and shared test utilities for tokengate.
//!
//! ## Module Structure
//!
//! - [`common`]: Shared test utilities
//!   - `fixtures`: Standard accounts, roles and engine configurations
//!   - `mocks`: Latency- and failure-injecting collaborators with call counters
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p tokengate-tests
//! cargo test -p tokengate-tests --test integration_engine
//! cargo test -p tokengate-tests --test integration_session
//! cargo test -p tokengate-tests --test integration_config
//! ```
//!
//! ## Test Categories
//!
//! ### Engine Tests (`integration_engine.rs`)
//! - Authentication pipeline and its rejection reasons
//! - Authorization, snapshot caching and invalidation
//! - Collaborator timeouts and outages
//!
//! ### Session Tests (`integration_session.rs`)
//! - Login, logout and refresh lifecycle
//! - TTL-driven session expiry
//! - Concurrent activity across subjects
//!
//! ### Config Tests (`integration_config.rs`)
//! - Loading YAML, TOML and JSON files
//! - Environment placeholders and validation

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::fixtures::*;
    pub use crate::common::mocks::*;
    pub use crate::common::{init_test_logging, temp_test_dir};
}
