// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token codec.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::Claims;
use crate::config::AuthConfig;
use crate::error::{EncodingError, TokenError};

// =============================================================================
// IssuedToken
// =============================================================================

/// A freshly signed token together with its identifying claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// The signed token string.
    pub token: String,
    /// The subject it was issued for.
    pub subject: String,
    /// The token ID (`jti`).
    pub token_id: String,
    /// Expiration time.
    pub expires_at: DateTime<Utc>,
}

// =============================================================================
// TokenCodec
// =============================================================================

/// Signs and verifies tokens.
///
/// The codec holds no key material. Every call takes the subject's secret,
/// which keeps it a pure function of its inputs.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    issuer: String,
    algorithm: Algorithm,
    leeway_secs: u64,
}

impl TokenCodec {
    /// Creates a codec with the given issuer and clock skew tolerance.
    pub fn new(issuer: impl Into<String>, leeway_secs: u64) -> Self {
        Self {
            issuer: issuer.into(),
            algorithm: Algorithm::HS256,
            leeway_secs,
        }
    }

    /// Creates a codec from engine configuration.
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.issuer.clone(), config.leeway_secs)
    }

    /// Returns the issuer written into tokens.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Returns claims for `subject` carrying this codec's issuer.
    pub fn claims_for(&self, subject: &str, expires_in_secs: i64) -> Claims {
        Claims::new(subject, expires_in_secs).with_issuer(&self.issuer)
    }

    /// Issues a token for `subject`, signed with `key`, valid for `ttl`.
    ///
    /// Fails with [`EncodingError::TtlOutOfRange`] when `now + ttl` is not a
    /// representable timestamp.
    pub fn issue(
        &self,
        subject: &str,
        key: &str,
        ttl: Duration,
    ) -> Result<IssuedToken, EncodingError> {
        let expires_at = i64::try_from(ttl.as_secs())
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|delta| Utc::now().checked_add_signed(delta))
            .ok_or(EncodingError::TtlOutOfRange {
                ttl_secs: ttl.as_secs(),
            })?;

        let claims = self.claims_for(subject, 0).with_expiry(expires_at);
        let token = self.sign(&claims, key)?;

        Ok(IssuedToken {
            token,
            subject: claims.sub.clone(),
            token_id: claims.jti.clone(),
            expires_at,
        })
    }

    /// Signs arbitrary claims with `key`.
    pub fn sign(&self, claims: &Claims, key: &str) -> Result<String, EncodingError> {
        if claims.sub.trim().is_empty() {
            return Err(EncodingError::EmptySubject);
        }

        encode(
            &Header::new(self.algorithm),
            claims,
            &EncodingKey::from_secret(key.as_bytes()),
        )
        .map_err(|e| EncodingError::Signing(e.to_string()))
    }

    /// Verifies signature, issuer and expiry, returning the subject.
    pub fn verify(&self, token: &str, key: &str) -> Result<String, TokenError> {
        self.verify_claims(token, key).map(|claims| claims.sub)
    }

    /// Verifies signature, issuer and expiry, returning all claims.
    pub fn verify_claims(&self, token: &str, key: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = self.leeway_secs;
        validation.set_issuer(&[&self.issuer]);

        self.decode_with(token, key, &validation)
    }

    /// Verifies signature and issuer; an expired token is accepted.
    ///
    /// Used when refreshing, where expiry is expected.
    pub fn verify_signature(&self, token: &str, key: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.set_issuer(&[&self.issuer]);

        self.decode_with(token, key, &validation)
    }

    /// Decodes the claims without checking signature or expiry.
    ///
    /// Fails with [`TokenError::Malformed`] when the token is not a JWT or
    /// its subject is blank.
    pub fn decode_unverified(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.insecure_disable_signature_validation();

        let claims = self.decode_with(token, "", &validation)?;
        if claims.sub.trim().is_empty() {
            return Err(TokenError::malformed("subject is blank"));
        }
        Ok(claims)
    }

    /// Extracts the subject without verification.
    pub fn decode_subject(&self, token: &str) -> Result<String, TokenError> {
        self.decode_unverified(token).map(|claims| claims.sub)
    }

    fn decode_with(
        &self,
        token: &str,
        key: &str,
        validation: &Validation,
    ) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &DecodingKey::from_secret(key.as_bytes()), validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::SignatureMismatch,
                ErrorKind::InvalidIssuer => TokenError::IssuerMismatch,
                ErrorKind::MissingRequiredClaim(claim) if claim == "iss" => {
                    TokenError::IssuerMismatch
                }
                _ => TokenError::malformed(e.to_string()),
            })
    }
}

// =============================================================================
// Tests
// =============================================================================
