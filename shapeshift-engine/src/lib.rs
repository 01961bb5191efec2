//! # Shapeshift Engine
//!
//! Gameplay engine for Shapeshift: a target outline or pose is shown, a wall
//! approaches, and the player's tracked body must match before it arrives.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    SHAPESHIFT ENGINE                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Primitives                                │
//! │  ├── point.rs    - Point, Keypoint, Landmark                 │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  └── hash.rs     - Snapshot hashing for replay checks        │
//! │                                                              │
//! │  game/           - Game logic (deterministic)                │
//! │  ├── shape.rs    - Outline shapes and catalog                │
//! │  ├── geometry.rs - Containment and fit evaluation            │
//! │  ├── pose.rs     - Reference pose catalog                    │
//! │  ├── matching.rs - Pose normalization and scoring            │
//! │  ├── difficulty.rs - Checkpoints and round score             │
//! │  ├── state.rs    - Phase, player, round, snapshot            │
//! │  ├── timer.rs    - Cancelable phase timers                   │
//! │  ├── tick.rs     - Game controller state machine             │
//! │  └── replay.rs   - Session recording and replay              │
//! │                                                              │
//! │  tracking/       - Pose tracker boundary                     │
//! │  store/          - High score and settings persistence       │
//! │  config.rs       - Session configuration                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//!
//! The `core/` and `game/` modules never read the wall clock or touch I/O.
//! Time enters only through [`GameController::tick`], and randomness only
//! from a seeded Xorshift128+. Given the same seed and inputs a session
//! produces identical snapshots, which [`game::replay`] checks by hash.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod game;
pub mod store;
pub mod tracking;

// Re-export commonly used types
pub use config::{GameConfig, GameMode, ConfigError};
pub use core::point::{Point, Keypoint, Landmark};
pub use core::rng::DeterministicRng;
pub use game::state::{GamePhase, GameSnapshot, PlayerState};
pub use game::tick::{GameController, GameError, Command, TickResult};
pub use store::{ScoreStore, MemoryStore, JsonSettingsStore, StoreError};
pub use tracking::{PoseFeed, PoseSubscriber, PoseFrame, TrackingStatus};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game loop rate (Hz)
pub const TICK_RATE: u32 = 60;

/// Typical tracker frame rate (Hz)
pub const TRACKER_RATE: u32 = 30;
