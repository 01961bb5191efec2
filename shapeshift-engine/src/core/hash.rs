//! Snapshot Hashing
//!
//! A replayed session must end in the state the live one did. Snapshots are
//! folded field by field into a domain-separated SHA-256, independent of
//! any serialization format.

use std::time::Duration;
use sha2::{Sha256, Digest};

/// 32-byte snapshot digest.
pub type StateHash = [u8; 32];

const SNAPSHOT_DOMAIN: &[u8] = b"SHAPESHIFT_SNAPSHOT_V1";

/// Field-by-field hasher. Update order is part of the hash.
pub struct StateHasher {
    inner: Sha256,
}

impl StateHasher {
    /// Hasher seeded with a domain tag.
    pub fn new(domain: &[u8]) -> Self {
        Self {
            inner: Sha256::new_with_prefix(domain),
        }
    }

    /// Hasher for game snapshots.
    pub fn for_snapshot() -> Self {
        Self::new(SNAPSHOT_DOMAIN)
    }

    /// One byte.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.inner.update([value]);
    }

    /// Little-endian `u32`.
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.inner.update(value.to_le_bytes());
    }

    /// Little-endian `u64`.
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.inner.update(value.to_le_bytes());
    }

    /// IEEE-754 bit pattern, so `-0.0` and `0.0` differ.
    #[inline]
    pub fn update_f64(&mut self, value: f64) {
        self.update_u64(value.to_bits());
    }

    /// `0` or `1`.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(u8::from(value));
    }

    /// Whole nanoseconds, saturated to `u64`.
    #[inline]
    pub fn update_duration(&mut self, value: Duration) {
        self.update_u64(u64::try_from(value.as_nanos()).unwrap_or(u64::MAX));
    }

    /// Presence flag followed by the value.
    #[inline]
    pub fn update_opt_u32(&mut self, value: Option<u32>) {
        self.update_bool(value.is_some());
        if let Some(v) = value {
            self.update_u32(v);
        }
    }

    /// Length-prefixed UTF-8.
    #[inline]
    pub fn update_str(&mut self, value: &str) {
        self.update_u32(value.len() as u32);
        self.inner.update(value.as_bytes());
    }

    /// Finish the digest.
    pub fn finalize(self) -> StateHash {
        self.inner.finalize().into()
    }
}

/// Hash a snapshot: round and seed first, then whatever `add_state` feeds.
pub fn compute_snapshot_hash<F>(round: u32, rng_seed: u64, add_state: F) -> StateHash
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::for_snapshot();
    hasher.update_u32(round);
    hasher.update_u64(rng_seed);
    add_state(&mut hasher);
    hasher.finalize()
}

// =============================================================================
// TESTS
// =============================================================================
