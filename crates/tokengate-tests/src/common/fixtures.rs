// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! Pre-built accounts, directories and engines.
//!
//! The standard directory holds:
//!
//! | subject | key         | roles           | permissions                          |
//! |---------|-------------|-----------------|--------------------------------------|
//! | alice   | alice-key   | admin           | user:read, user:write                |
//! | bob     | bob-key     | reader          | user:read                            |
//! | carol   | carol-key   | reader, auditor | user:read, audit:read                |
//! | dave    | dave-key    | (none)          | (none)                               |

use std::sync::Arc;
use std::time::Duration;

use tokengate_core::{AuthConfig, AuthEngine, MemoryDirectory, MemoryExpiringStore};

// =============================================================================
// Account Fixtures
// =============================================================================

/// Fixture providing standard account names and keys.
pub struct AccountFixtures;

impl AccountFixtures {
    /// Administrator with user read/write.
    pub const ALICE: &'static str = "alice";
    /// Reader.
    pub const BOB: &'static str = "bob";
    /// Reader and auditor.
    pub const CAROL: &'static str = "carol";
    /// Account with no roles.
    pub const DAVE: &'static str = "dave";
    /// Subject absent from the directory.
    pub const EVE: &'static str = "eve";

    /// Returns the verification key for a fixture account.
    pub fn key_for(subject: &str) -> String {
        format!("{}-key", subject)
    }

    /// Names of every registered fixture account.
    pub fn registered() -> [&'static str; 4] {
        [Self::ALICE, Self::BOB, Self::CAROL, Self::DAVE]
    }
}

// =============================================================================
// Directory Fixtures
// =============================================================================

/// Fixture providing pre-populated directories.
pub struct DirectoryFixtures;

impl DirectoryFixtures {
    /// The standard directory described in the module docs.
    pub fn standard() -> MemoryDirectory {
        let directory = MemoryDirectory::new()
            .with_role(AccountFixtures::ALICE, "admin")
            .with_role(AccountFixtures::BOB, "reader")
            .with_role(AccountFixtures::CAROL, "reader")
            .with_role(AccountFixtures::CAROL, "auditor")
            .with_grants("admin", ["user:read", "user:write"])
            .with_grants("reader", ["user:read"])
            .with_grants("auditor", ["audit:read"]);

        for subject in AccountFixtures::registered() {
            directory.add_account(subject, AccountFixtures::key_for(subject));
        }
        directory
    }

    /// A directory with `count` numbered reader accounts (`user-000`, ...).
    pub fn readers(count: usize) -> MemoryDirectory {
        let directory = MemoryDirectory::new().with_grants("reader", ["user:read"]);
        for i in 0..count {
            let subject = format!("user-{:03}", i);
            directory.add_account(&subject, AccountFixtures::key_for(&subject));
            directory.assign_role(subject, "reader");
        }
        directory
    }
}

// =============================================================================
// Config Fixtures
// =============================================================================

/// Fixture providing engine configurations.
pub struct ConfigFixtures;

impl ConfigFixtures {
    /// Short timeouts so fault tests finish quickly.
    pub fn fast() -> AuthConfig {
        AuthConfig::default()
            .with_issuer("tokengate-test")
            .with_token_ttl(Duration::from_secs(60))
            .with_session_ttl(Duration::from_secs(600))
            .with_directory_timeout(Duration::from_millis(100))
            .with_session_store_timeout(Duration::from_millis(100))
            .with_snapshot_cache_ttl(Duration::from_secs(30))
    }

    /// Fast configuration with the snapshot cache disabled.
    pub fn uncached() -> AuthConfig {
        Self::fast().without_snapshot_cache()
    }
}

// =============================================================================
// Engine Fixtures
// =============================================================================

/// An engine wired to in-memory collaborators, with handles to both.
pub struct TestEngine {
    /// The engine under test.
    pub engine: AuthEngine,
    /// The directory behind the engine.
    pub directory: Arc<MemoryDirectory>,
    /// The session backend behind the engine.
    pub store: Arc<MemoryExpiringStore>,
}

impl TestEngine {
    /// Standard directory, fast configuration.
    pub fn standard() -> Self {
        Self::with(DirectoryFixtures::standard(), ConfigFixtures::fast())
    }

    /// Custom directory and configuration.
    pub fn with(directory: MemoryDirectory, config: AuthConfig) -> Self {
        let directory = Arc::new(directory);
        let store = Arc::new(MemoryExpiringStore::new());
        let engine = AuthEngine::new(config, directory.clone(), store.clone())
            .expect("fixture configuration is valid");

        Self {
            engine,
            directory,
            store,
        }
    }
}
