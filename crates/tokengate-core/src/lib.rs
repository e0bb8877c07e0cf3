// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # tokengate-core
//!
//! Stateful token authentication and authorization core.
//!
//! This crate provides:
//!
//! - **Token**: signed token issuance and verification with per-subject keys
//! - **Session**: revocable sessions over an injected expiring key-value store
//! - **Authz**: role/permission resolution with a short-lived snapshot cache
//! - **Engine**: the `authenticate` / `authorize` contract tying them together
//! - **Config**: engine configuration and file loading
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tokengate_core::{AuthConfig, AuthEngine, MemoryDirectory, MemoryExpiringStore};
//!
//! let directory = MemoryDirectory::new()
//!     .with_account("alice", "alice-key")
//!     .with_role("alice", "admin")
//!     .with_grants("admin", ["user:read", "user:write"]);
//!
//! let engine = AuthEngine::new(
//!     AuthConfig::default(),
//!     Arc::new(directory),
//!     Arc::new(MemoryExpiringStore::new()),
//! )?;
//!
//! let issued = engine.login("alice").await?;
//! let principal = engine.authenticate(&issued.token).await?;
//! assert!(engine.authorize(&principal, "user:write").await?);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod authz;
pub mod config;
pub mod directory;
pub mod engine;
pub mod error;
pub mod session;
pub mod token;

mod deadline;

pub use authz::{AuthorizationResolver, AuthorizationSnapshot, PermissionCode, PermissionSet, Role};
pub use config::{AuthConfig, ConfigFormat, ConfigLoader};
pub use directory::{DirectoryProvider, MemoryDirectory};
pub use engine::{AuthEngine, AuthStage, Principal};
pub use error::{
    AuthError, AuthResult, Component, ConfigError, DirectoryError, EncodingError, StoreError,
    TokenError,
};
pub use session::{ExpiringKeyValueStore, MemoryExpiringStore, SessionStore};
pub use token::{Claims, IssuedToken, TokenCodec};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
