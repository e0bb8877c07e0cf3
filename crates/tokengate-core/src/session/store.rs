// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session store.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::ExpiringKeyValueStore;
use crate::config::AuthConfig;
use crate::deadline::within;
use crate::error::{AuthResult, Component};

/// Tracks which subjects hold an active session.
///
/// Each subject maps to `<prefix><subject>` in the backing store, holding the
/// ID of the token that opened the session. Concurrent writes for the same
/// subject are last-write-wins; different subjects never interfere.
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn ExpiringKeyValueStore>,
    key_prefix: String,
    timeout: Duration,
}

impl SessionStore {
    /// Creates a session store over `backend`.
    pub fn new(
        backend: Arc<dyn ExpiringKeyValueStore>,
        key_prefix: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            backend,
            key_prefix: key_prefix.into(),
            timeout,
        }
    }

    /// Creates a session store using prefix and timeout from `config`.
    pub fn from_config(backend: Arc<dyn ExpiringKeyValueStore>, config: &AuthConfig) -> Self {
        Self::new(backend, config.session_key_prefix.clone(), config.session_store_timeout)
    }

    /// Returns the backing key for a subject.
    pub fn key_for(&self, subject: &str) -> String {
        format!("{}{}", self.key_prefix, subject)
    }

    /// Marks the subject's session active for `ttl`, replacing prior state.
    pub async fn activate(&self, subject: &str, token_id: &str, ttl: Duration) -> AuthResult<()> {
        let key = self.key_for(subject);
        within(Component::SessionStore, self.timeout, self.backend.set(&key, token_id, ttl)).await?;

        debug!(subject = %subject, ttl = ?ttl, "Session activated");
        Ok(())
    }

    /// Returns `true` if the subject's session is active.
    ///
    /// A missing key, whether revoked, expired or never written, is `false`.
    pub async fn is_active(&self, subject: &str) -> AuthResult<bool> {
        let key = self.key_for(subject);
        within(Component::SessionStore, self.timeout, self.backend.exists(&key)).await
    }

    /// Returns the token ID recorded for the active session.
    pub async fn current_token_id(&self, subject: &str) -> AuthResult<Option<String>> {
        let key = self.key_for(subject);
        within(Component::SessionStore, self.timeout, self.backend.get(&key)).await
    }

    /// Ends the subject's session immediately.
    pub async fn revoke(&self, subject: &str) -> AuthResult<()> {
        let key = self.key_for(subject);
        within(Component::SessionStore, self.timeout, self.backend.delete(&key)).await?;

        debug!(subject = %subject, "Session revoked");
        Ok(())
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("key_prefix", &self.key_prefix)
            .field("timeout", &self.timeout)
            .finish()
    }
}
