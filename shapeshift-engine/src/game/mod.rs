//! Game Logic Module
//!
//! Everything that decides a round. No I/O, no wall clock.
//!
//! ## Module Structure
//!
//! - `shape`: Outline sum type and shape catalog
//! - `geometry`: Point containment and fit evaluation
//! - `landmarks`: 33-joint index table and scoring weights
//! - `pose`: Difficulty tiers and reference pose catalog
//! - `matching`: Pose normalization and similarity scoring
//! - `difficulty`: Checkpoint table and round scoring
//! - `state`: Phase, player, round, and snapshot types
//! - `timer`: Generation-keyed phase timers
//! - `events`: Events emitted by transitions
//! - `tick`: The game controller (state machine)
//! - `replay`: Session recording and deterministic replay

pub mod shape;
pub mod geometry;
pub mod landmarks;
pub mod pose;
pub mod matching;
pub mod difficulty;
pub mod state;
pub mod timer;
pub mod events;
pub mod tick;
pub mod replay;

// Re-export key types
pub use shape::{Shape, ShapeKind, ShapeTemplate, ShapeError, default_shapes};
pub use geometry::{FitOptions, FitResult, evaluate_fit, is_inside, randomize_horizontal_placement};
pub use pose::{Difficulty, PoseShape, PoseCatalog};
pub use matching::{MatchResult, MatchQuality, compare_poses, normalize_pose, calculate_bonus};
pub use difficulty::{Checkpoint, CHECKPOINTS, checkpoint_for_round, round_score};
pub use state::{GamePhase, PlayerState, Target, RoundState, RoundOutcome, GameSnapshot};
pub use events::{GameEvent, GameEventData};
pub use tick::{GameController, GameError, Command, TickResult};
pub use replay::{SessionRecording, ReplayOutcome, ReplayError, replay_session};
