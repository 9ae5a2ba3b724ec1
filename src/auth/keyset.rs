// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Folda Finances

//! Verification key cache.
//!
//! A single key set exists for the process lifetime, shared by every
//! concurrent verification. Readers take the lock concurrently; a refresh
//! replaces the whole map under the write lock, so an in-flight lookup sees
//! either the old set or the new one in full, never a mix.
//!
//! Staleness is evaluated only at the whole-cache level; entries are never
//! invalidated individually. Under a sudden key rotation several requests may
//! each trigger their own refresh before the first one lands; correct, just
//! not throughput-optimal.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::DecodingKey;
use tokio::sync::RwLock;

/// Default maximum age of the key set before a lookup forces a refresh.
pub const DEFAULT_KEY_MAX_AGE: Duration = Duration::from_secs(3600);

/// A verification key from the issuer's key set.
///
/// Immutable once constructed: keys are only ever replaced wholesale on
/// refresh. The `curve` is the JWK `crv` parameter the key was parsed under.
#[derive(Clone)]
pub struct VerificationKey {
    /// Parsed elliptic-curve public key
    pub key: DecodingKey,
    /// Curve identifier (currently always `P-256`)
    pub curve: String,
}

/// The cached key set plus its last-refresh timestamp.
struct KeySet {
    keys: HashMap<String, VerificationKey>,
    last_fetched_at: Option<Instant>,
}

/// Thread-safe key-id → verification-key cache.
#[derive(Clone)]
pub struct KeySetCache {
    inner: Arc<RwLock<KeySet>>,
    max_age: Duration,
}

impl KeySetCache {
    /// Create an empty cache with the given staleness threshold.
    pub fn new(max_age: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(KeySet {
                keys: HashMap::new(),
                last_fetched_at: None,
            })),
            max_age,
        }
    }

    /// Look up the verification key for a key id.
    pub async fn lookup(&self, kid: &str) -> Option<VerificationKey> {
        let set = self.inner.read().await;
        set.keys.get(kid).cloned()
    }

    /// Discard the previous map wholesale and install `entries`, stamping
    /// the current time as the last fetch.
    pub async fn replace_all(&self, entries: HashMap<String, VerificationKey>) {
        let mut set = self.inner.write().await;
        set.keys = entries;
        set.last_fetched_at = Some(Instant::now());
    }

    /// Whether the cache is older than its staleness threshold.
    ///
    /// A never-populated cache is stale by definition.
    pub async fn is_stale(&self) -> bool {
        let set = self.inner.read().await;
        match set.last_fetched_at {
            Some(at) => at.elapsed() > self.max_age,
            None => true,
        }
    }

    /// Number of keys currently cached.
    pub async fn key_count(&self) -> usize {
        self.inner.read().await.keys.len()
    }
}

impl Default for KeySetCache {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_MAX_AGE)
    }
}
