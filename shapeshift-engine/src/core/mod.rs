//! Core primitives.
//!
//! Value types and deterministic helpers shared by every gameplay module.

pub mod point;
pub mod rng;
pub mod hash;

// Re-export core types
pub use point::{Point, Keypoint, Landmark};
pub use rng::DeterministicRng;
pub use hash::{StateHash, StateHasher, compute_snapshot_hash};
