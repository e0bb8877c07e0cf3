// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Expiring key-value store abstraction.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreError;

/// An expiring key-value store, such as Redis.
///
/// Every operation must be atomic per key. Eviction is time based; an
/// expired key behaves exactly like a key that was never written.
#[async_trait]
pub trait ExpiringKeyValueStore: Send + Sync {
    /// Writes `value` under `key`, replacing any previous value, for `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Returns `true` if `key` is present and not expired.
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Reads the value under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}
