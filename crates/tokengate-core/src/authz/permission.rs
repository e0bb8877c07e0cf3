// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Permission codes and sets.

use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// PermissionCode
// =============================================================================

/// An opaque permission identifier, such as `user:read`.
///
/// Codes are compared exactly; no wildcard or hierarchy semantics apply.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionCode(String);

impl PermissionCode {
    /// Creates a permission code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the code as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the part before the first `:`, if any.
    pub fn category(&self) -> Option<&str> {
        self.0.split_once(':').map(|(category, _)| category)
    }
}

impl fmt::Display for PermissionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PermissionCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PermissionCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for PermissionCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PermissionCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// PermissionSet
// =============================================================================

/// A set of permission codes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    permissions: HashSet<PermissionCode>,
}

impl PermissionSet {
    /// Creates an empty permission set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a permission set from a list of permissions.
    pub fn from_permissions<I, P>(permissions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PermissionCode>,
    {
        Self {
            permissions: permissions.into_iter().map(Into::into).collect(),
        }
    }

    /// Adds a permission to the set.
    pub fn add(&mut self, permission: impl Into<PermissionCode>) {
        self.permissions.insert(permission.into());
    }

    /// Removes a permission from the set.
    pub fn remove(&mut self, permission: &str) {
        self.permissions.remove(permission);
    }

    /// Returns `true` if the set contains the given permission.
    pub fn contains(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// Returns `true` if the set contains all of the given permissions.
    pub fn contains_all(&self, permissions: &[&str]) -> bool {
        permissions.iter().all(|p| self.contains(p))
    }

    /// Returns `true` if the set contains any of the given permissions.
    pub fn contains_any(&self, permissions: &[&str]) -> bool {
        permissions.iter().any(|p| self.contains(p))
    }

    /// Returns `true` if every permission in `self` is also in `other`.
    pub fn is_subset(&self, other: &PermissionSet) -> bool {
        self.permissions.is_subset(&other.permissions)
    }

    /// Returns the number of permissions in the set.
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Returns `true` if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    /// Returns an iterator over the permissions.
    pub fn iter(&self) -> impl Iterator<Item = &PermissionCode> {
        self.permissions.iter()
    }

    /// Returns the permissions sorted, for stable display.
    pub fn sorted(&self) -> Vec<&PermissionCode> {
        let mut codes: Vec<_> = self.permissions.iter().collect();
        codes.sort();
        codes
    }

    /// Merges another permission set into this one.
    pub fn merge(&mut self, other: &PermissionSet) {
        self.permissions.extend(other.permissions.iter().cloned());
    }
}

impl<P: Into<PermissionCode>> FromIterator<P> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self::from_permissions(iter)
    }
}

// =============================================================================
// Tests
// =============================================================================
