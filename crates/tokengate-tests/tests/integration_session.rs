// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Session Integration Tests
//!
//! Login, logout, refresh and TTL behaviour against the in-memory store.

use std::time::Duration;

use tokengate_core::{AuthError, ExpiringKeyValueStore};
use tokengate_tests::prelude::*;

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn test_login_writes_prefixed_session_key() {
    init_test_logging();
    let fixture = TestEngine::standard();

    let issued = fixture.engine.login(AccountFixtures::ALICE).await.unwrap();

    let value = fixture.store.get("shiro:access:alice").await.unwrap();
    assert_eq!(value.as_deref(), Some(issued.token_id.as_str()));
    assert_eq!(issued.subject, AccountFixtures::ALICE);
}

#[tokio::test]
async fn test_login_unknown_account() {
    let fixture = TestEngine::standard();

    let err = fixture.engine.login(AccountFixtures::EVE).await.unwrap_err();
    assert!(matches!(err, AuthError::UnknownAccount { .. }));
    assert!(fixture.store.is_empty());
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let fixture = TestEngine::standard();

    fixture.engine.logout(AccountFixtures::BOB).await.unwrap();
    fixture.engine.logout(AccountFixtures::BOB).await.unwrap();
    assert!(!fixture.engine.sessions().is_active(AccountFixtures::BOB).await.unwrap());
}

#[tokio::test]
async fn test_relogin_restores_access() {
    let fixture = TestEngine::standard();
    let engine = &fixture.engine;

    let first = engine.login(AccountFixtures::BOB).await.unwrap();
    engine.logout(AccountFixtures::BOB).await.unwrap();
    assert!(engine.authenticate(&first.token).await.is_err());

    let second = engine.login(AccountFixtures::BOB).await.unwrap();
    assert!(engine.authenticate(&second.token).await.is_ok());
}

#[tokio::test]
async fn test_session_is_per_subject_not_per_token() {
    // Any unexpired token of an active subject authenticates.
    let fixture = TestEngine::standard();
    let engine = &fixture.engine;

    let first = engine.login(AccountFixtures::ALICE).await.unwrap();
    let second = engine.login(AccountFixtures::ALICE).await.unwrap();

    assert!(engine.authenticate(&first.token).await.is_ok());
    assert!(engine.authenticate(&second.token).await.is_ok());
}

#[tokio::test]
async fn test_revoke_isolated_to_subject() {
    let fixture = TestEngine::standard();
    let engine = &fixture.engine;

    let alice = engine.login(AccountFixtures::ALICE).await.unwrap();
    let bob = engine.login(AccountFixtures::BOB).await.unwrap();

    engine.logout(AccountFixtures::BOB).await.unwrap();

    assert!(engine.authenticate(&alice.token).await.is_ok());
    assert!(matches!(
        engine.authenticate(&bob.token).await.unwrap_err(),
        AuthError::SessionExpired { .. }
    ));
}

// =============================================================================
// Refresh
// =============================================================================

#[tokio::test]
async fn test_refresh_after_logout_rejected() {
    let fixture = TestEngine::standard();
    let engine = &fixture.engine;

    let issued = engine.login(AccountFixtures::CAROL).await.unwrap();
    engine.logout(AccountFixtures::CAROL).await.unwrap();

    let err = engine.refresh(&issued.token).await.unwrap_err();
    assert!(matches!(err, AuthError::SessionExpired { .. }));
}

#[tokio::test]
async fn test_refresh_superseded_by_new_login() {
    let fixture = TestEngine::standard();
    let engine = &fixture.engine;

    let first = engine.login(AccountFixtures::CAROL).await.unwrap();
    let second = engine.login(AccountFixtures::CAROL).await.unwrap();

    assert!(engine.refresh(&first.token).await.is_err());
    let refreshed = engine.refresh(&second.token).await.unwrap();
    assert_eq!(
        engine.sessions().current_token_id(AccountFixtures::CAROL).await.unwrap(),
        Some(refreshed.token_id)
    );
}

#[tokio::test]
async fn test_refresh_rejects_forged_token() {
    let fixture = TestEngine::standard();
    let engine = &fixture.engine;
    engine.login(AccountFixtures::ALICE).await.unwrap();

    let forged = engine
        .codec()
        .issue(AccountFixtures::ALICE, "wrong-key", Duration::from_secs(60))
        .unwrap();

    assert!(matches!(
        engine.refresh(&forged.token).await.unwrap_err(),
        AuthError::InvalidToken(_)
    ));
}

// =============================================================================
// Expiry
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_session_expires_after_ttl() {
    let fixture = TestEngine::standard();
    let engine = &fixture.engine;

    let issued = engine.login(AccountFixtures::ALICE).await.unwrap();

    tokio::time::advance(Duration::from_secs(599)).await;
    assert!(engine.authenticate(&issued.token).await.is_ok());

    tokio::time::advance(Duration::from_secs(2)).await;
    let err = engine.authenticate(&issued.token).await.unwrap_err();
    assert!(matches!(err, AuthError::SessionExpired { .. }));
    assert!(engine.refresh(&issued.token).await.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_refresh_extends_session() {
    let fixture = TestEngine::standard();
    let engine = &fixture.engine;

    let first = engine.login(AccountFixtures::ALICE).await.unwrap();
    tokio::time::advance(Duration::from_secs(500)).await;

    let second = engine.refresh(&first.token).await.unwrap();
    tokio::time::advance(Duration::from_secs(500)).await;

    assert!(engine.authenticate(&second.token).await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_expired_entries_evicted() {
    let fixture = TestEngine::standard();
    for subject in AccountFixtures::registered() {
        fixture.engine.login(subject).await.unwrap();
    }
    assert_eq!(fixture.store.len(), 4);

    tokio::time::advance(Duration::from_secs(601)).await;
    assert_eq!(fixture.store.evict_expired(), 4);
    assert!(fixture.store.is_empty());
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_logins_across_subjects() {
    init_test_logging();
    let fixture = TestEngine::with(DirectoryFixtures::readers(32), ConfigFixtures::fast());

    let mut handles = Vec::new();
    for i in 0..32 {
        let engine = fixture.engine.clone();
        handles.push(tokio::spawn(async move {
            let subject = format!("user-{:03}", i);
            let issued = engine.login(&subject).await.unwrap();
            let principal = engine.authenticate(&issued.token).await.unwrap();
            assert_eq!(principal.subject, subject);
            engine.authorize(&principal, "user:read").await.unwrap()
        }));
    }

    for handle in handles {
        assert!(handle.await.unwrap());
    }
    assert_eq!(fixture.store.len(), 32);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_logout_and_login_other_subject() {
    let fixture = TestEngine::with(DirectoryFixtures::readers(2), ConfigFixtures::fast());
    let engine = fixture.engine.clone();

    let a = engine.login("user-000").await.unwrap();
    engine.login("user-001").await.unwrap();

    let logout = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.logout("user-001").await })
    };
    let relogin = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.login("user-000").await })
    };
    logout.await.unwrap().unwrap();
    relogin.await.unwrap().unwrap();

    assert!(engine.authenticate(&a.token).await.is_ok());
    assert!(!engine.sessions().is_active("user-001").await.unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_refresh_last_write_wins() {
    let fixture = TestEngine::standard();
    let engine = fixture.engine.clone();
    let original = engine.login(AccountFixtures::ALICE).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let engine = engine.clone();
        let token = original.token.clone();
        handles.push(tokio::spawn(async move { engine.refresh(&token).await }));
    }

    let mut minted = Vec::new();
    for handle in handles {
        if let Ok(issued) = handle.await.unwrap() {
            minted.push(issued);
        }
    }
    assert!(!minted.is_empty());

    let current = engine
        .sessions()
        .current_token_id(AccountFixtures::ALICE)
        .await
        .unwrap()
        .unwrap();
    let winner = minted.iter().find(|issued| issued.token_id == current).unwrap();

    for loser in minted.iter().filter(|issued| issued.token_id != current) {
        assert!(engine.refresh(&loser.token).await.is_err());
    }
    assert!(engine.authenticate(&winner.token).await.is_ok());
    assert!(engine.refresh(&winner.token).await.is_ok());
}
