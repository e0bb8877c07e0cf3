// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error hierarchy for tokengate.
//!
//! # Error Hierarchy
//!
//! ```text
//! AuthError (engine surface)
//! ├── Malformed / UnknownAccount / SessionExpired  - credential failures
//! ├── InvalidToken(TokenError)                     - codec rejection reason
//! ├── InfrastructureUnavailable { component }      - collaborator fault or timeout
//! └── Encoding(EncodingError)                      - token issuance
//!
//! DirectoryError   - DirectoryProvider collaborator
//! StoreError       - ExpiringKeyValueStore collaborator
//! ConfigError      - configuration loading and validation
//! ```
//!
//! Simple authorization denial is never an error; see
//! [`AuthEngine::authorize`](crate::engine::AuthEngine::authorize).

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type alias for engine operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// TokenError
// =============================================================================

/// Reason a token failed verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The signature does not match the subject's key.
    #[error("token signature mismatch")]
    SignatureMismatch,

    /// The token was correctly signed but its expiry has passed.
    #[error("token expired")]
    Expired,

    /// The token was issued by someone else, or names no issuer.
    #[error("token issuer mismatch")]
    IssuerMismatch,

    /// The token is not a structurally valid signed token.
    #[error("malformed token: {0}")]
    Malformed(String),
}

impl TokenError {
    /// Creates a malformed token error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }
}

// =============================================================================
// EncodingError
// =============================================================================

/// Token issuance failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// The subject was empty or blank.
    #[error("cannot issue a token for an empty subject")]
    EmptySubject,

    /// The TTL puts the expiry past the representable timestamp range.
    #[error("token ttl of {ttl_secs}s is out of range")]
    TtlOutOfRange {
        /// The requested TTL in seconds.
        ttl_secs: u64,
    },

    /// The underlying signer failed.
    #[error("failed to sign token: {0}")]
    Signing(String),
}

// =============================================================================
// Collaborator Errors
// =============================================================================

/// Errors raised by a [`DirectoryProvider`](crate::directory::DirectoryProvider).
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    /// The directory backend could not be reached.
    #[error("directory unreachable: {0}")]
    Unreachable(String),

    /// The directory returned data that could not be interpreted.
    #[error("directory returned invalid data: {0}")]
    InvalidData(String),
}

impl DirectoryError {
    /// Creates an unreachable error.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable(message.into())
    }
}

/// Errors raised by an [`ExpiringKeyValueStore`](crate::session::ExpiringKeyValueStore).
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The store backend could not be reached.
    #[error("session store unreachable: {0}")]
    Unreachable(String),

    /// A TTL of zero, or one too large to schedule, was supplied.
    #[error("invalid ttl for key '{key}'")]
    InvalidTtl {
        /// The key being written.
        key: String,
    },
}

impl StoreError {
    /// Creates an unreachable error.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable(message.into())
    }
}

// =============================================================================
// Component
// =============================================================================

/// Infrastructure component that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    /// The user/role/permission directory.
    Directory,
    /// The expiring session store.
    SessionStore,
}

impl Component {
    /// Returns the component name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Directory => "directory",
            Component::SessionStore => "session_store",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// AuthError
// =============================================================================

/// Errors surfaced by [`AuthEngine`](crate::engine::AuthEngine).
///
/// Each variant carries the reason attached by the stage that rejected, so
/// callers can tell bad credentials apart from a backend outage.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// Token is structurally invalid or carries a blank subject.
    #[error("malformed token: {message}")]
    Malformed {
        /// Decoder message.
        message: String,
    },

    /// The token subject does not exist in the directory.
    #[error("unknown account: {subject}")]
    UnknownAccount {
        /// The subject that was looked up.
        subject: String,
    },

    /// Signature or expiry check failed.
    #[error("invalid token: {0}")]
    InvalidToken(#[from] TokenError),

    /// The subject's session is not active.
    #[error("session expired for {subject}")]
    SessionExpired {
        /// The subject whose session is inactive.
        subject: String,
    },

    /// A collaborator failed or timed out.
    #[error("{component} unavailable: {message}")]
    InfrastructureUnavailable {
        /// The failing component.
        component: Component,
        /// Failure detail.
        message: String,
    },

    /// Token issuance failed.
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),
}

impl AuthError {
    /// Creates a malformed token error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Creates an unknown account error.
    pub fn unknown_account(subject: impl Into<String>) -> Self {
        Self::UnknownAccount {
            subject: subject.into(),
        }
    }

    /// Creates a session expired error.
    pub fn session_expired(subject: impl Into<String>) -> Self {
        Self::SessionExpired {
            subject: subject.into(),
        }
    }

    /// Creates an infrastructure error.
    pub fn unavailable(component: Component, message: impl Into<String>) -> Self {
        Self::InfrastructureUnavailable {
            component,
            message: message.into(),
        }
    }

    /// Creates an infrastructure error for a call that exceeded its timeout.
    pub fn timeout(component: Component, timeout: Duration) -> Self {
        Self::unavailable(component, format!("timed out after {:?}", timeout))
    }

    /// Returns `true` if the caller presented bad credentials.
    pub fn is_credential_failure(&self) -> bool {
        matches!(
            self,
            AuthError::Malformed { .. }
                | AuthError::UnknownAccount { .. }
                | AuthError::InvalidToken(_)
                | AuthError::SessionExpired { .. }
        )
    }

    /// Returns `true` if retrying may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AuthError::InfrastructureUnavailable { .. })
    }

    /// Returns the failing component for infrastructure errors.
    pub fn component(&self) -> Option<Component> {
        match self {
            AuthError::InfrastructureUnavailable { component, .. } => Some(*component),
            _ => None,
        }
    }

    /// Returns the error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::Malformed { .. } => "MALFORMED",
            AuthError::UnknownAccount { .. } => "UNKNOWN_ACCOUNT",
            AuthError::InvalidToken(TokenError::Expired) => "TOKEN_EXPIRED",
            AuthError::InvalidToken(TokenError::SignatureMismatch) => "SIGNATURE_MISMATCH",
            AuthError::InvalidToken(TokenError::IssuerMismatch) => "ISSUER_MISMATCH",
            AuthError::InvalidToken(TokenError::Malformed(_)) => "INVALID_TOKEN",
            AuthError::SessionExpired { .. } => "SESSION_EXPIRED",
            AuthError::InfrastructureUnavailable { .. } => "INFRASTRUCTURE_UNAVAILABLE",
            AuthError::Encoding(_) => "ENCODING_ERROR",
        }
    }
}

impl From<DirectoryError> for AuthError {
    fn from(err: DirectoryError) -> Self {
        AuthError::unavailable(Component::Directory, err.to_string())
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        AuthError::unavailable(Component::SessionStore, err.to_string())
    }
}

// =============================================================================
// ConfigError
// =============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration content.
    #[error("Failed to parse config '{path}': {message}")]
    Parse {
        /// Path of the source (or `<string>`).
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// A field failed validation.
    #[error("Validation failed for '{field}': {message}")]
    Validation {
        /// The offending field.
        field: String,
        /// Error message.
        message: String,
    },

    /// File I/O error.
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Unsupported file extension.
    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat {
        /// The extension found.
        extension: String,
    },

    /// An environment override could not be parsed.
    #[error("Invalid environment variable '{name}': {message}")]
    InvalidEnvVar {
        /// Variable name.
        name: String,
        /// Error message.
        message: String,
    },
}

impl ConfigError {
    /// Creates a validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a parse error.
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
