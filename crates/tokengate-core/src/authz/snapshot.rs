// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Roles and authorization snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PermissionSet;

// =============================================================================
// Role
// =============================================================================

/// A named bundle of permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role name.
    pub name: String,
    /// Permissions granted by this role.
    pub permissions: PermissionSet,
}

impl Role {
    /// Creates a role.
    pub fn new(name: impl Into<String>, permissions: PermissionSet) -> Self {
        Self {
            name: name.into(),
            permissions,
        }
    }
}

// =============================================================================
// AuthorizationSnapshot
// =============================================================================

/// A subject's resolved roles and permissions at a point in time.
///
/// Built only through [`AuthorizationSnapshot::from_roles`], so the permission
/// set is always exactly the union of the roles' permissions. Serialize-only
/// for the same reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationSnapshot {
    subject: String,
    roles: Vec<Role>,
    permissions: PermissionSet,
    resolved_at: DateTime<Utc>,
}

impl AuthorizationSnapshot {
    /// Builds a snapshot from roles in directory order.
    ///
    /// Duplicate role names keep their first position.
    pub fn from_roles(subject: impl Into<String>, roles: Vec<Role>) -> Self {
        let mut unique: Vec<Role> = Vec::with_capacity(roles.len());
        let mut permissions = PermissionSet::new();

        for role in roles {
            permissions.merge(&role.permissions);
            match unique.iter_mut().find(|r| r.name == role.name) {
                Some(existing) => existing.permissions.merge(&role.permissions),
                None => unique.push(role),
            }
        }

        Self {
            subject: subject.into(),
            roles: unique,
            permissions,
            resolved_at: Utc::now(),
        }
    }

    /// Creates a snapshot with no roles.
    pub fn empty(subject: impl Into<String>) -> Self {
        Self::from_roles(subject, Vec::new())
    }

    /// Returns the subject.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the roles in directory order.
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Returns the role names in directory order.
    pub fn role_names(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(|r| r.name.as_str())
    }

    /// Returns the union of all role permissions.
    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    /// Returns when the snapshot was resolved.
    pub fn resolved_at(&self) -> DateTime<Utc> {
        self.resolved_at
    }

    /// Returns `true` if the subject holds the role.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.name == role)
    }

    /// Returns `true` if the subject holds the permission.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// Returns `true` if the subject has neither roles nor permissions.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty() && self.permissions.is_empty()
    }
}
