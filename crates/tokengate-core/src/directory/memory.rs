// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory directory.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::DirectoryProvider;
use crate::authz::PermissionCode;
use crate::error::DirectoryError;

#[derive(Debug, Default)]
struct DirectoryData {
    keys: HashMap<String, String>,
    subject_roles: HashMap<String, Vec<String>>,
    role_permissions: HashMap<String, Vec<PermissionCode>>,
}

/// An in-memory [`DirectoryProvider`].
///
/// Mutations take effect immediately. Callers caching snapshots must
/// invalidate them after changing roles or grants.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    data: RwLock<DirectoryData>,
}

impl MemoryDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an account with its verification key.
    pub fn with_account(self, subject: impl Into<String>, key: impl Into<String>) -> Self {
        self.add_account(subject, key);
        self
    }

    /// Assigns a role to a subject.
    pub fn with_role(self, subject: impl Into<String>, role: impl Into<String>) -> Self {
        self.assign_role(subject, role);
        self
    }

    /// Grants permissions to a role.
    pub fn with_grants<I, P>(self, role: impl Into<String>, permissions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PermissionCode>,
    {
        self.grant(role, permissions);
        self
    }

    /// Registers or replaces an account.
    pub fn add_account(&self, subject: impl Into<String>, key: impl Into<String>) {
        self.data.write().keys.insert(subject.into(), key.into());
    }

    /// Removes an account and its role assignments.
    pub fn remove_account(&self, subject: &str) {
        let mut data = self.data.write();
        data.keys.remove(subject);
        data.subject_roles.remove(subject);
    }

    /// Appends a role to a subject, ignoring duplicates.
    pub fn assign_role(&self, subject: impl Into<String>, role: impl Into<String>) {
        let role = role.into();
        let mut data = self.data.write();
        let roles = data.subject_roles.entry(subject.into()).or_default();
        if !roles.contains(&role) {
            roles.push(role);
        }
    }

    /// Removes a role from a subject.
    pub fn unassign_role(&self, subject: &str, role: &str) {
        if let Some(roles) = self.data.write().subject_roles.get_mut(subject) {
            roles.retain(|r| r != role);
        }
    }

    /// Adds permissions to a role.
    pub fn grant<I, P>(&self, role: impl Into<String>, permissions: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PermissionCode>,
    {
        let mut data = self.data.write();
        let entry = data.role_permissions.entry(role.into()).or_default();
        for permission in permissions {
            let permission = permission.into();
            if !entry.contains(&permission) {
                entry.push(permission);
            }
        }
    }

    /// Removes a permission from a role.
    pub fn revoke_grant(&self, role: &str, permission: &str) {
        if let Some(perms) = self.data.write().role_permissions.get_mut(role) {
            perms.retain(|p| p.as_str() != permission);
        }
    }
}

#[async_trait]
impl DirectoryProvider for MemoryDirectory {
    async fn find_key_for_subject(&self, subject: &str) -> Result<Option<String>, DirectoryError> {
        Ok(self.data.read().keys.get(subject).cloned())
    }

    async fn find_roles_for_subject(&self, subject: &str) -> Result<Vec<String>, DirectoryError> {
        Ok(self
            .data
            .read()
            .subject_roles
            .get(subject)
            .cloned()
            .unwrap_or_default())
    }

    async fn find_permissions_for_role(
        &self,
        role: &str,
    ) -> Result<Vec<PermissionCode>, DirectoryError> {
        Ok(self
            .data
            .read()
            .role_permissions
            .get(role)
            .cloned()
            .unwrap_or_default())
    }
}
