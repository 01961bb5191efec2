//! Session RNG
//!
//! Xorshift128+ seeded through SplitMix64. Target picks and horizontal
//! shape placement are the only consumers, and they draw in a fixed order,
//! so a replay with the same seed sees the same targets in the same places.

use serde::{Serialize, Deserialize};
use sha2::{Sha256, Digest};

/// Domain tag mixed into session-id seeds.
const SEED_DOMAIN: &[u8] = b"SHAPESHIFT_SEED_V1";

/// Deterministic PRNG (Xorshift128+).
///
/// ```
/// use shapeshift::core::rng::DeterministicRng;
///
/// let mut rng = DeterministicRng::new(12345);
/// assert_eq!(rng.next_u64(), 6233086606872742541);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeterministicRng {
    s0: u64,
    s1: u64,
}

impl DeterministicRng {
    /// Seed the generator. Any seed is valid, including zero.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        let s0 = splitmix64(&mut sm);
        let s1 = splitmix64(&mut sm);
        if s0 | s1 == 0 {
            // Xorshift never leaves the all-zero state.
            return Self { s0: 1, s1: 1 };
        }
        Self { s0, s1 }
    }

    /// Next raw 64-bit value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let (s0, mut s1) = (self.s0, self.s1);
        let out = s0.wrapping_add(s1);
        s1 ^= s0;
        self.s0 = s0.rotate_left(24) ^ s1 ^ (s1 << 16);
        self.s1 = s1.rotate_left(37);
        out
    }

    /// Index in `0..len`; `0` when `len` is zero.
    #[inline]
    pub fn next_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        (self.next_u64() % len as u64) as usize
    }

    /// Uniform in `[0, 1)` from the top 53 bits.
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform in `[min, max)`. An empty or inverted range yields `min`
    /// without drawing.
    #[inline]
    pub fn next_f64_range(&mut self, min: f64, max: f64) -> f64 {
        if max <= min {
            return min;
        }
        min + (max - min) * self.next_f64()
    }

    /// `true` with the given probability.
    #[inline]
    pub fn next_bool(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }

    /// Uniform pick from a slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.next_index(items.len());
        items.get(idx)
    }
}

#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Seed for a session that did not configure one: first 8 bytes of
/// `SHA-256(domain || session_id)`, little-endian.
pub fn derive_session_seed(session_id: &[u8; 16]) -> u64 {
    let digest = Sha256::new()
        .chain_update(SEED_DOMAIN)
        .chain_update(session_id)
        .finalize();
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(head)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = DeterministicRng::new(2024);
        let mut b = DeterministicRng::new(2024);
        for _ in 0..500 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
        assert_eq!(a, b);
    }

    #[test]
    fn test_known_sequence() {
        // Recorded sessions depend on these exact values.
        let mut rng = DeterministicRng::new(42);
        assert_eq!(rng.next_u64(), 16629283624882167704);
        assert_eq!(rng.next_u64(), 1420492921613871959);
        assert_eq!(rng.next_u64(), 9768315062676884790);
    }

    #[test]
    fn test_zero_seed_is_usable() {
        let mut rng = DeterministicRng::new(0);
        let first = rng.next_u64();
        assert!((0..10).any(|_| rng.next_u64() != first));
    }

    #[test]
    fn test_next_index_bounds() {
        let mut rng = DeterministicRng::new(77);
        for len in 1..20 {
            assert!(rng.next_index(len) < len);
        }
        assert_eq!(rng.next_index(0), 0);
    }

    #[test]
    fn test_placement_range() {
        let mut rng = DeterministicRng::new(9999);
        for _ in 0..1000 {
            assert!((0.0..1.0).contains(&rng.next_f64()));
            let x = rng.next_f64_range(0.15, 0.85);
            assert!((0.15..0.85).contains(&x));
        }

        let before = rng.clone();
        assert_eq!(rng.next_f64_range(0.4, 0.4), 0.4);
        assert_eq!(rng.next_f64_range(0.5, 0.1), 0.5);
        assert_eq!(rng, before, "empty range must not consume a draw");
    }

    #[test]
    fn test_choose_reaches_every_target() {
        let mut rng = DeterministicRng::new(31337);
        let none: [&str; 0] = [];
        assert!(rng.choose(&none).is_none());

        let targets = ["tpose", "hands-up", "star"];
        let mut seen = [false; 3];
        for _ in 0..200 {
            let picked = rng.choose(&targets).unwrap();
            let i = targets.iter().position(|t| t == picked).unwrap();
            seen[i] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_session_seed_derivation() {
        let id = [7u8; 16];
        assert_eq!(derive_session_seed(&id), derive_session_seed(&id));
        assert_ne!(derive_session_seed(&id), derive_session_seed(&[8u8; 16]));
    }
}
