// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Short-lived snapshot cache.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;
use tracing::warn;

use super::AuthorizationSnapshot;

#[derive(Debug, Clone)]
struct CacheEntry {
    snapshot: Arc<AuthorizationSnapshot>,
    expires_at: Instant,
}

/// Per-subject TTL cache of resolved snapshots.
///
/// Reads and invalidations lock only the subject's shard.
#[derive(Debug)]
pub struct SnapshotCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SnapshotCache {
    /// Creates a cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns the cached snapshot for `subject` if it has not expired.
    pub fn get(&self, subject: &str) -> Option<Arc<AuthorizationSnapshot>> {
        let now = Instant::now();
        let cached = self
            .entries
            .get(subject)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.snapshot.clone());

        match cached {
            Some(snapshot) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(snapshot)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Stores a snapshot for its subject.
    ///
    /// Nothing is stored if the TTL cannot be scheduled.
    pub fn put(&self, snapshot: Arc<AuthorizationSnapshot>) {
        let Some(expires_at) = Instant::now().checked_add(self.ttl) else {
            warn!(ttl = ?self.ttl, "Snapshot cache TTL out of range, not caching");
            return;
        };
        let entry = CacheEntry {
            expires_at,
            snapshot: snapshot.clone(),
        };
        self.entries.insert(snapshot.subject().to_string(), entry);
    }

    /// Drops the cached snapshot for `subject`.
    pub fn invalidate(&self, subject: &str) {
        self.entries.remove(subject);
    }

    /// Drops every cached snapshot.
    pub fn invalidate_all(&self) {
        self.entries.clear();
    }

    /// Removes expired entries.
    pub fn evict_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.expires_at > now);
    }

    /// Returns the number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `(hits, misses)` since creation.
    pub fn stats(&self) -> (u64, u64) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }
}
