// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication and authorization engine.
//!
//! Authentication is a linear pipeline that stops at the first failure:
//!
//! ```text
//! Presented → Decoded → KeyResolved → Verified → SessionChecked → Authenticated
//!     └──────────┴───────────┴────────────┴─────────────┴──→ Rejected
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::authz::{AuthorizationResolver, AuthorizationSnapshot};
use crate::config::AuthConfig;
use crate::deadline::within;
use crate::directory::DirectoryProvider;
use crate::error::{AuthError, AuthResult, Component, ConfigResult};
use crate::session::{ExpiringKeyValueStore, SessionStore};
use crate::token::{IssuedToken, TokenCodec};

// =============================================================================
// Principal
// =============================================================================

/// A verified identity.
///
/// Returned by [`AuthEngine::authenticate`] and owned by the caller for the
/// duration of one request.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Subject (account identifier).
    pub subject: String,
    /// The token the subject authenticated with.
    #[serde(skip_serializing, default)]
    pub raw_token: String,
}

impl Principal {
    /// Returns the subject.
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("subject", &self.subject)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// AuthStage
// =============================================================================

/// Stage of an authentication attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthStage {
    /// Raw token received.
    Presented,
    /// Subject extracted from the token.
    Decoded,
    /// Subject's key found in the directory.
    KeyResolved,
    /// Signature and expiry checked.
    Verified,
    /// Session found active.
    SessionChecked,
    /// Principal returned.
    Authenticated,
}

impl AuthStage {
    /// Returns the stage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthStage::Presented => "presented",
            AuthStage::Decoded => "decoded",
            AuthStage::KeyResolved => "key_resolved",
            AuthStage::Verified => "verified",
            AuthStage::SessionChecked => "session_checked",
            AuthStage::Authenticated => "authenticated",
        }
    }
}

impl fmt::Display for AuthStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logs a rejection with the last stage the attempt reached.
fn rejected(stage: AuthStage, err: AuthError) -> AuthError {
    if err.is_retryable() {
        warn!(stage = %stage, code = err.error_code(), error = %err, "Authentication aborted");
    } else {
        debug!(stage = %stage, code = err.error_code(), error = %err, "Authentication rejected");
    }
    err
}

// =============================================================================
// AuthEngine
// =============================================================================

/// Orchestrates token verification, session checks and authorization.
///
/// Cheap to clone; all collaborators are shared.
#[derive(Clone)]
pub struct AuthEngine {
    config: Arc<AuthConfig>,
    codec: TokenCodec,
    directory: Arc<dyn DirectoryProvider>,
    sessions: SessionStore,
    resolver: AuthorizationResolver,
}

impl AuthEngine {
    /// Creates an engine from configuration and collaborators.
    pub fn new(
        config: AuthConfig,
        directory: Arc<dyn DirectoryProvider>,
        store: Arc<dyn ExpiringKeyValueStore>,
    ) -> ConfigResult<Self> {
        config.validate()?;

        let codec = TokenCodec::from_config(&config);
        let sessions = SessionStore::from_config(store, &config);
        let resolver = AuthorizationResolver::from_config(directory.clone(), &config);

        info!(
            issuer = %config.issuer,
            snapshot_cache = config.snapshot_cache_enabled,
            "Auth engine initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            codec,
            directory,
            sessions,
            resolver,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Returns the token codec.
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Returns the session store.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Returns the authorization resolver.
    pub fn resolver(&self) -> &AuthorizationResolver {
        &self.resolver
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Authenticates a raw token.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Malformed`] if the token cannot be decoded or its subject is blank
    /// - [`AuthError::UnknownAccount`] if the subject is not in the directory
    /// - [`AuthError::InvalidToken`] if the signature or expiry check fails
    /// - [`AuthError::SessionExpired`] if the subject has no active session
    /// - [`AuthError::InfrastructureUnavailable`] if a collaborator fails or times out
    pub async fn authenticate(&self, raw_token: &str) -> AuthResult<Principal> {
        let subject = self
            .codec
            .decode_subject(raw_token)
            .map_err(|e| rejected(AuthStage::Presented, AuthError::malformed(e.to_string())))?;

        let key = self
            .resolve_key(&subject)
            .await
            .map_err(|e| rejected(AuthStage::Decoded, e))?;

        self.codec
            .verify(raw_token, &key)
            .map_err(|e| rejected(AuthStage::KeyResolved, AuthError::InvalidToken(e)))?;

        let active = self
            .sessions
            .is_active(&subject)
            .await
            .map_err(|e| rejected(AuthStage::Verified, e))?;
        if !active {
            return Err(rejected(
                AuthStage::Verified,
                AuthError::session_expired(&subject),
            ));
        }

        debug!(subject = %subject, stage = %AuthStage::Authenticated, "Authenticated");
        Ok(Principal {
            subject,
            raw_token: raw_token.to_string(),
        })
    }

    async fn resolve_key(&self, subject: &str) -> AuthResult<String> {
        within(
            Component::Directory,
            self.config.directory_timeout,
            self.directory.find_key_for_subject(subject),
        )
        .await?
        .ok_or_else(|| AuthError::unknown_account(subject))
    }

    // =========================================================================
    // Session Lifecycle
    // =========================================================================

    /// Issues a token for `subject` and opens its session.
    ///
    /// Any previous session for the subject is replaced, so tokens issued
    /// earlier can no longer be refreshed.
    pub async fn login(&self, subject: &str) -> AuthResult<IssuedToken> {
        let key = self.resolve_key(subject).await?;
        let issued = self.codec.issue(subject, &key, self.config.token_ttl)?;

        self.sessions
            .activate(subject, &issued.token_id, self.config.session_ttl)
            .await?;

        info!(subject = %subject, expires_at = %issued.expires_at, "Login");
        Ok(issued)
    }

    /// Ends the subject's session and drops its cached authorization.
    pub async fn logout(&self, subject: &str) -> AuthResult<()> {
        self.sessions.revoke(subject).await?;
        self.resolver.invalidate(subject);

        info!(subject = %subject, "Logout");
        Ok(())
    }

    /// Exchanges a correctly signed token, expired or not, for a new one.
    ///
    /// The session must still be active and must have been opened (or last
    /// refreshed) by this very token. The session is rotated to the new token.
    pub async fn refresh(&self, raw_token: &str) -> AuthResult<IssuedToken> {
        let subject = self
            .codec
            .decode_subject(raw_token)
            .map_err(|e| AuthError::malformed(e.to_string()))?;
        let key = self.resolve_key(&subject).await?;
        let claims = self.codec.verify_signature(raw_token, &key)?;

        match self.sessions.current_token_id(&subject).await? {
            Some(current) if current == claims.jti => {}
            Some(_) => {
                debug!(subject = %subject, "Refresh rejected: token superseded");
                return Err(AuthError::session_expired(&subject));
            }
            None => {
                debug!(subject = %subject, "Refresh rejected: no active session");
                return Err(AuthError::session_expired(&subject));
            }
        }

        let issued = self.codec.issue(&subject, &key, self.config.token_ttl)?;
        self.sessions
            .activate(&subject, &issued.token_id, self.config.session_ttl)
            .await?;

        debug!(subject = %subject, "Token refreshed");
        Ok(issued)
    }

    // =========================================================================
    // Authorization
    // =========================================================================

    /// Returns `true` if the principal holds `permission`.
    ///
    /// Denial is `Ok(false)`. Only directory faults are errors.
    pub async fn authorize(&self, principal: &Principal, permission: &str) -> AuthResult<bool> {
        let snapshot = self.resolver.resolve(&principal.subject).await?;
        let allowed = snapshot.has_permission(permission);

        debug!(
            subject = %principal.subject,
            permission = %permission,
            allowed,
            "Authorization check"
        );
        Ok(allowed)
    }

    /// Returns `true` if the principal holds every permission.
    pub async fn authorize_all(
        &self,
        principal: &Principal,
        permissions: &[&str],
    ) -> AuthResult<bool> {
        let snapshot = self.resolver.resolve(&principal.subject).await?;
        Ok(snapshot.permissions().contains_all(permissions))
    }

    /// Returns `true` if the principal holds at least one permission.
    pub async fn authorize_any(
        &self,
        principal: &Principal,
        permissions: &[&str],
    ) -> AuthResult<bool> {
        let snapshot = self.resolver.resolve(&principal.subject).await?;
        Ok(snapshot.permissions().contains_any(permissions))
    }

    /// Returns `true` if the principal holds `role`.
    pub async fn has_role(&self, principal: &Principal, role: &str) -> AuthResult<bool> {
        let snapshot = self.resolver.resolve(&principal.subject).await?;
        Ok(snapshot.has_role(role))
    }

    /// Returns the principal's resolved roles and permissions.
    pub async fn snapshot(&self, principal: &Principal) -> AuthResult<Arc<AuthorizationSnapshot>> {
        self.resolver.resolve(&principal.subject).await
    }

    /// Drops the subject's cached authorization after an upstream change.
    pub fn invalidate_authorization(&self, subject: &str) {
        self.resolver.invalidate(subject);
    }
}

impl fmt::Debug for AuthEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthEngine")
            .field("issuer", &self.config.issuer)
            .field("sessions", &self.sessions)
            .field("resolver", &self.resolver)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
