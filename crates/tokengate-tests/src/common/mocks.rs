// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Implementations
//!
//! Mock collaborators for testing the engine in isolation.
//!
//! ## Design Principles
//!
//! - Delegate to the in-memory implementations for real behaviour
//! - Configurable latency and failure injection
//! - Call counters for verifying which stages ran
//! - Thread-safe for concurrent testing

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use tokengate_core::{
    DirectoryError, DirectoryProvider, ExpiringKeyValueStore, MemoryDirectory,
    MemoryExpiringStore, PermissionCode, StoreError,
};

// =============================================================================
// Mock Directory
// =============================================================================

/// A directory with latency and failure injection.
#[derive(Debug)]
pub struct MockDirectory {
    /// The directory that answers lookups.
    inner: MemoryDirectory,

    /// Simulated latency per call.
    latency: Mutex<Duration>,

    /// Force every call to fail.
    fail_all: AtomicBool,

    /// Key lookups performed.
    key_lookups: AtomicU64,

    /// Role lookups performed.
    role_lookups: AtomicU64,

    /// Permission lookups performed.
    permission_lookups: AtomicU64,
}

impl MockDirectory {
    /// Wraps an in-memory directory.
    pub fn new(inner: MemoryDirectory) -> Self {
        Self {
            inner,
            latency: Mutex::new(Duration::ZERO),
            fail_all: AtomicBool::new(false),
            key_lookups: AtomicU64::new(0),
            role_lookups: AtomicU64::new(0),
            permission_lookups: AtomicU64::new(0),
        }
    }

    /// Wraps an in-memory directory in an `Arc`.
    pub fn shared(inner: MemoryDirectory) -> Arc<Self> {
        Arc::new(Self::new(inner))
    }

    /// Returns the wrapped directory for mutation.
    pub fn inner(&self) -> &MemoryDirectory {
        &self.inner
    }

    /// Sets the latency applied to every call.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = latency;
    }

    /// Makes every call fail (or succeed again).
    pub fn set_fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    /// Number of key lookups performed.
    pub fn key_lookups(&self) -> u64 {
        self.key_lookups.load(Ordering::SeqCst)
    }

    /// Number of role lookups performed.
    pub fn role_lookups(&self) -> u64 {
        self.role_lookups.load(Ordering::SeqCst)
    }

    /// Number of permission lookups performed.
    pub fn permission_lookups(&self) -> u64 {
        self.permission_lookups.load(Ordering::SeqCst)
    }

    async fn before_call(&self, counter: &AtomicU64) -> Result<(), DirectoryError> {
        counter.fetch_add(1, Ordering::SeqCst);

        let latency = *self.latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if self.fail_all.load(Ordering::SeqCst) {
            return Err(DirectoryError::unreachable("mock directory offline"));
        }
        Ok(())
    }
}

#[async_trait]
impl DirectoryProvider for MockDirectory {
    async fn find_key_for_subject(&self, subject: &str) -> Result<Option<String>, DirectoryError> {
        self.before_call(&self.key_lookups).await?;
        self.inner.find_key_for_subject(subject).await
    }

    async fn find_roles_for_subject(&self, subject: &str) -> Result<Vec<String>, DirectoryError> {
        self.before_call(&self.role_lookups).await?;
        self.inner.find_roles_for_subject(subject).await
    }

    async fn find_permissions_for_role(
        &self,
        role: &str,
    ) -> Result<Vec<PermissionCode>, DirectoryError> {
        self.before_call(&self.permission_lookups).await?;
        self.inner.find_permissions_for_role(role).await
    }
}

// =============================================================================
// Mock Store
// =============================================================================

/// An expiring store with latency and failure injection.
#[derive(Debug, Default)]
pub struct MockStore {
    /// The store that holds the data.
    inner: MemoryExpiringStore,

    /// Simulated latency per call.
    latency: Mutex<Duration>,

    /// Force every call to fail.
    fail_all: AtomicBool,

    /// Calls to `set`.
    sets: AtomicU64,

    /// Calls to `exists`.
    exists_checks: AtomicU64,

    /// Calls to `get`.
    gets: AtomicU64,

    /// Calls to `delete`.
    deletes: AtomicU64,
}

impl MockStore {
    /// Creates an empty mock store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty mock store in an `Arc`.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Sets the latency applied to every call.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = latency;
    }

    /// Makes every call fail (or succeed again).
    pub fn set_fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    /// Number of `set` calls.
    pub fn sets(&self) -> u64 {
        self.sets.load(Ordering::SeqCst)
    }

    /// Number of `exists` calls.
    pub fn exists_checks(&self) -> u64 {
        self.exists_checks.load(Ordering::SeqCst)
    }

    /// Number of `delete` calls.
    pub fn deletes(&self) -> u64 {
        self.deletes.load(Ordering::SeqCst)
    }

    async fn before_call(&self, counter: &AtomicU64) -> Result<(), StoreError> {
        counter.fetch_add(1, Ordering::SeqCst);

        let latency = *self.latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if self.fail_all.load(Ordering::SeqCst) {
            return Err(StoreError::unreachable("mock store offline"));
        }
        Ok(())
    }
}

#[async_trait]
impl ExpiringKeyValueStore for MockStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        self.before_call(&self.sets).await?;
        self.inner.set(key, value, ttl).await
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        self.before_call(&self.exists_checks).await?;
        self.inner.exists(key).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.before_call(&self.gets).await?;
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.before_call(&self.deletes).await?;
        self.inner.delete(key).await
    }
}
