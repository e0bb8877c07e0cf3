// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Engine Integration Tests
//!
//! - `test_authenticate_*`: pipeline stages and rejection reasons
//! - `test_authorize_*`: permission checks and snapshot caching
//! - `test_infra_*`: collaborator timeouts and outages

use std::sync::Arc;
use std::time::Duration;

use tokengate_core::{
    AuthConfig, AuthEngine, AuthError, Component, PermissionSet, Principal, TokenCodec, TokenError,
};
use tokengate_tests::prelude::*;

fn engine_with_mocks(config: AuthConfig) -> (AuthEngine, Arc<MockDirectory>, Arc<MockStore>) {
    init_test_logging();

    let directory = MockDirectory::shared(DirectoryFixtures::standard());
    let store = MockStore::shared();
    let engine = AuthEngine::new(config, directory.clone(), store.clone()).expect("valid config");
    (engine, directory, store)
}

fn principal_for(subject: &str) -> Principal {
    Principal {
        subject: subject.to_string(),
        raw_token: String::new(),
    }
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_authenticate_after_login() {
    let (engine, directory, store) = engine_with_mocks(ConfigFixtures::fast());

    let issued = engine.login(AccountFixtures::ALICE).await.unwrap();
    let principal = engine.authenticate(&issued.token).await.unwrap();

    assert_eq!(principal.subject, AccountFixtures::ALICE);
    assert_eq!(principal.raw_token, issued.token);
    assert_eq!(directory.key_lookups(), 2);
    assert_eq!(store.sets(), 1);
    assert_eq!(store.exists_checks(), 1);
}

#[tokio::test]
async fn test_authenticate_session_revoked() {
    // Scenario B: valid signature, but bob has logged out.
    let (engine, _, _) = engine_with_mocks(ConfigFixtures::fast());

    let issued = engine.login(AccountFixtures::BOB).await.unwrap();
    engine.logout(AccountFixtures::BOB).await.unwrap();

    let err = engine.authenticate(&issued.token).await.unwrap_err();
    assert!(matches!(err, AuthError::SessionExpired { ref subject } if subject == "bob"));
    assert!(err.is_credential_failure());
}

#[tokio::test]
async fn test_authenticate_never_logged_in() {
    let (engine, _, _) = engine_with_mocks(ConfigFixtures::fast());
    let token = engine
        .codec()
        .issue(AccountFixtures::BOB, &AccountFixtures::key_for("bob"), Duration::from_secs(60))
        .unwrap();

    let err = engine.authenticate(&token.token).await.unwrap_err();
    assert!(matches!(err, AuthError::SessionExpired { .. }));
}

#[tokio::test]
async fn test_authenticate_unknown_account_skips_verification() {
    // Scenario C: eve is not in the directory.
    let (engine, directory, store) = engine_with_mocks(ConfigFixtures::fast());
    let token = engine
        .codec()
        .sign(&engine.codec().claims_for(AccountFixtures::EVE, 60), "forged-key")
        .unwrap();

    let err = engine.authenticate(&token).await.unwrap_err();

    assert!(matches!(err, AuthError::UnknownAccount { ref subject } if subject == "eve"));
    assert_eq!(directory.key_lookups(), 1);
    assert_eq!(store.exists_checks(), 0);
}

#[tokio::test]
async fn test_authenticate_malformed() {
    let (engine, directory, _) = engine_with_mocks(ConfigFixtures::fast());

    for token in ["", "not-a-token", "a.b.c"] {
        let err = engine.authenticate(token).await.unwrap_err();
        assert!(matches!(err, AuthError::Malformed { .. }), "{token}: {err}");
    }
    assert_eq!(directory.key_lookups(), 0);
}

#[tokio::test]
async fn test_authenticate_wrong_key() {
    let (engine, _, store) = engine_with_mocks(ConfigFixtures::fast());
    engine.login(AccountFixtures::ALICE).await.unwrap();

    let forged = engine
        .codec()
        .sign(
            &engine.codec().claims_for(AccountFixtures::ALICE, 60),
            &AccountFixtures::key_for("bob"),
        )
        .unwrap();

    let err = engine.authenticate(&forged).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidToken(TokenError::SignatureMismatch)));
    assert_eq!(store.exists_checks(), 0);
}

#[tokio::test]
async fn test_authenticate_expired_token() {
    let (engine, _, _) = engine_with_mocks(ConfigFixtures::fast());
    engine.login(AccountFixtures::ALICE).await.unwrap();

    let expired = engine
        .codec()
        .sign(
            &engine.codec().claims_for(AccountFixtures::ALICE, -600),
            &AccountFixtures::key_for("alice"),
        )
        .unwrap();

    let err = engine.authenticate(&expired).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidToken(TokenError::Expired)));
    assert_eq!(err.error_code(), "TOKEN_EXPIRED");
}

#[tokio::test]
async fn test_authenticate_foreign_issuer_rejected() {
    // Same subject and key, but minted by another service.
    let (engine, _, store) = engine_with_mocks(ConfigFixtures::fast());
    engine.login(AccountFixtures::ALICE).await.unwrap();

    let foreign = TokenCodec::new("some-other-service", 0)
        .issue(
            AccountFixtures::ALICE,
            &AccountFixtures::key_for("alice"),
            Duration::from_secs(60),
        )
        .unwrap();

    let err = engine.authenticate(&foreign.token).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidToken(TokenError::IssuerMismatch)));
    assert_eq!(err.error_code(), "ISSUER_MISMATCH");
    assert_eq!(store.exists_checks(), 0);
    assert!(engine.refresh(&foreign.token).await.is_err());
}

#[tokio::test]
async fn test_authenticate_key_rotation_invalidates_tokens() {
    let (engine, directory, _) = engine_with_mocks(ConfigFixtures::fast());
    let issued = engine.login(AccountFixtures::ALICE).await.unwrap();

    directory.inner().add_account(AccountFixtures::ALICE, "rotated-key");

    let err = engine.authenticate(&issued.token).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidToken(TokenError::SignatureMismatch)));
}

// =============================================================================
// Authorization
// =============================================================================

#[tokio::test]
async fn test_authorize_admin_can_write() {
    // Scenario A.
    let (engine, _, _) = engine_with_mocks(ConfigFixtures::fast());

    let issued = engine.login(AccountFixtures::ALICE).await.unwrap();
    let principal = engine.authenticate(&issued.token).await.unwrap();

    assert!(engine.authorize(&principal, "user:write").await.unwrap());
    assert!(engine.authorize(&principal, "user:read").await.unwrap());
    assert!(!engine.authorize(&principal, "audit:read").await.unwrap());
}

#[tokio::test]
async fn test_authorize_no_roles_is_denial() {
    let (engine, _, _) = engine_with_mocks(ConfigFixtures::fast());
    let principal = principal_for(AccountFixtures::DAVE);

    assert!(!engine.authorize(&principal, "user:read").await.unwrap());
    assert!(engine.snapshot(&principal).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_authorize_snapshot_is_union_of_roles() {
    let (engine, _, _) = engine_with_mocks(ConfigFixtures::uncached());
    let principal = principal_for(AccountFixtures::CAROL);

    let snapshot = engine.snapshot(&principal).await.unwrap();

    let expected: PermissionSet = ["user:read", "audit:read"].into_iter().collect();
    assert_eq!(snapshot.permissions(), &expected);
    assert_eq!(snapshot.role_names().collect::<Vec<_>>(), vec!["reader", "auditor"]);
    assert!(engine.has_role(&principal, "auditor").await.unwrap());
}

#[tokio::test]
async fn test_authorize_uses_cache() {
    let (engine, directory, _) = engine_with_mocks(ConfigFixtures::fast());
    let principal = principal_for(AccountFixtures::CAROL);

    for _ in 0..5 {
        assert!(engine.authorize(&principal, "audit:read").await.unwrap());
    }

    assert_eq!(directory.role_lookups(), 1);
    assert_eq!(directory.permission_lookups(), 2);
}

#[tokio::test]
async fn test_authorize_invalidation_after_upstream_change() {
    let (engine, directory, _) = engine_with_mocks(ConfigFixtures::fast());
    let principal = principal_for(AccountFixtures::BOB);

    assert!(!engine.authorize(&principal, "audit:read").await.unwrap());

    directory.inner().assign_role(AccountFixtures::BOB, "auditor");
    assert!(!engine.authorize(&principal, "audit:read").await.unwrap());

    engine.invalidate_authorization(AccountFixtures::BOB);
    assert!(engine.authorize(&principal, "audit:read").await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_authorize_cache_expires() {
    let (engine, directory, _) = engine_with_mocks(ConfigFixtures::fast());
    let principal = principal_for(AccountFixtures::BOB);

    engine.authorize(&principal, "user:read").await.unwrap();
    tokio::time::advance(Duration::from_secs(31)).await;
    engine.authorize(&principal, "user:read").await.unwrap();

    assert_eq!(directory.role_lookups(), 2);
}

// =============================================================================
// Infrastructure Faults
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_infra_directory_timeout_on_authenticate() {
    // Scenario D.
    let (engine, directory, _) = engine_with_mocks(ConfigFixtures::fast());
    let issued = engine.login(AccountFixtures::ALICE).await.unwrap();

    directory.set_latency(Duration::from_secs(5));
    let err = engine.authenticate(&issued.token).await.unwrap_err();

    assert!(matches!(
        err,
        AuthError::InfrastructureUnavailable { component: Component::Directory, .. }
    ));
    assert!(err.is_retryable());
}

#[tokio::test(start_paused = true)]
async fn test_infra_directory_timeout_on_authorize() {
    let (engine, directory, _) = engine_with_mocks(ConfigFixtures::uncached());
    directory.set_latency(Duration::from_secs(5));

    let err = engine
        .authorize(&principal_for(AccountFixtures::ALICE), "user:read")
        .await
        .unwrap_err();
    assert_eq!(err.component(), Some(Component::Directory));
}

#[tokio::test]
async fn test_infra_directory_outage() {
    let (engine, directory, _) = engine_with_mocks(ConfigFixtures::uncached());
    directory.set_fail_all(true);

    let err = engine
        .authorize(&principal_for(AccountFixtures::ALICE), "user:read")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InfrastructureUnavailable { .. }));

    directory.set_fail_all(false);
    assert!(engine
        .authorize(&principal_for(AccountFixtures::ALICE), "user:read")
        .await
        .unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_infra_session_store_timeout() {
    let (engine, _, store) = engine_with_mocks(ConfigFixtures::fast());
    let issued = engine.login(AccountFixtures::ALICE).await.unwrap();

    store.set_latency(Duration::from_secs(5));
    let err = engine.authenticate(&issued.token).await.unwrap_err();

    assert_eq!(err.component(), Some(Component::SessionStore));
}

#[tokio::test]
async fn test_infra_session_store_outage_on_login() {
    let (engine, _, store) = engine_with_mocks(ConfigFixtures::fast());
    store.set_fail_all(true);

    let err = engine.login(AccountFixtures::ALICE).await.unwrap_err();
    assert_eq!(err.component(), Some(Component::SessionStore));
}
