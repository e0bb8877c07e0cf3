// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Account directory collaborator.
//!
//! The directory owns accounts, their verification keys and the
//! role/permission graph. Persistence is external; [`MemoryDirectory`] is a
//! reference implementation.

use async_trait::async_trait;

use crate::authz::PermissionCode;
use crate::error::DirectoryError;

mod memory;

pub use memory::MemoryDirectory;

/// Lookup of accounts, roles and permissions.
#[async_trait]
pub trait DirectoryProvider: Send + Sync {
    /// Returns the verification key for `subject`, or `None` if the account
    /// does not exist.
    async fn find_key_for_subject(&self, subject: &str) -> Result<Option<String>, DirectoryError>;

    /// Returns the names of the roles assigned to `subject`, in directory order.
    async fn find_roles_for_subject(&self, subject: &str) -> Result<Vec<String>, DirectoryError>;

    /// Returns the permissions granted to `role`.
    async fn find_permissions_for_role(
        &self,
        role: &str,
    ) -> Result<Vec<PermissionCode>, DirectoryError>;
}
