// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authorization: roles, permissions and resolved snapshots.
//!
//! This module provides:
//! - Permission codes and permission sets
//! - Roles and authorization snapshots
//! - The directory-backed resolver with its snapshot cache

mod cache;
pub mod permission;
mod resolver;
mod snapshot;

pub use cache::SnapshotCache;
pub use permission::{PermissionCode, PermissionSet};
pub use resolver::AuthorizationResolver;
pub use snapshot::{AuthorizationSnapshot, Role};
