// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Directory-backed authorization resolver.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::{AuthorizationSnapshot, PermissionSet, Role, SnapshotCache};
use crate::config::AuthConfig;
use crate::deadline::within;
use crate::directory::DirectoryProvider;
use crate::error::{AuthResult, Component};

/// Resolves a subject's roles and permissions from the directory.
///
/// Designed to be created once and shared across requests.
#[derive(Clone)]
pub struct AuthorizationResolver {
    directory: Arc<dyn DirectoryProvider>,
    cache: Option<Arc<SnapshotCache>>,
    timeout: Duration,
}

impl AuthorizationResolver {
    /// Creates a resolver without caching.
    pub fn new(directory: Arc<dyn DirectoryProvider>, timeout: Duration) -> Self {
        Self {
            directory,
            cache: None,
            timeout,
        }
    }

    /// Creates a resolver with cache settings and timeout from `config`.
    pub fn from_config(directory: Arc<dyn DirectoryProvider>, config: &AuthConfig) -> Self {
        let resolver = Self::new(directory, config.directory_timeout);
        if config.snapshot_cache_enabled {
            resolver.with_cache(config.snapshot_cache_ttl)
        } else {
            resolver
        }
    }

    /// Enables snapshot caching with the given TTL.
    pub fn with_cache(mut self, ttl: Duration) -> Self {
        self.cache = Some(Arc::new(SnapshotCache::new(ttl)));
        self
    }

    /// Returns the snapshot cache, if enabled.
    pub fn cache(&self) -> Option<&SnapshotCache> {
        self.cache.as_deref()
    }

    /// Resolves the subject's snapshot.
    ///
    /// Queries roles for the subject, then permissions for each role, and
    /// unions them. A subject with no roles yields an empty snapshot. Only
    /// directory faults and timeouts are errors.
    pub async fn resolve(&self, subject: &str) -> AuthResult<Arc<AuthorizationSnapshot>> {
        if let Some(snapshot) = self.cache.as_ref().and_then(|c| c.get(subject)) {
            return Ok(snapshot);
        }

        let role_names = within(
            Component::Directory,
            self.timeout,
            self.directory.find_roles_for_subject(subject),
        )
        .await?;

        let mut roles = Vec::with_capacity(role_names.len());
        for name in role_names {
            let permissions = within(
                Component::Directory,
                self.timeout,
                self.directory.find_permissions_for_role(&name),
            )
            .await?;

            roles.push(Role::new(name, PermissionSet::from_permissions(permissions)));
        }

        let snapshot = Arc::new(AuthorizationSnapshot::from_roles(subject, roles));
        debug!(
            subject = %subject,
            roles = snapshot.roles().len(),
            permissions = snapshot.permissions().len(),
            "Authorization snapshot resolved"
        );

        if let Some(cache) = &self.cache {
            cache.put(snapshot.clone());
        }

        Ok(snapshot)
    }

    /// Drops the cached snapshot for `subject`.
    pub fn invalidate(&self, subject: &str) {
        if let Some(cache) = &self.cache {
            cache.invalidate(subject);
        }
    }

    /// Drops every cached snapshot.
    pub fn invalidate_all(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate_all();
        }
    }
}

impl std::fmt::Debug for AuthorizationResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationResolver")
            .field("cached", &self.cache.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}
