//! Game State Definitions
//!
//! Phase, player progress, and the per-round state owned by the controller.
//! Renderers only see these through an owned [`GameSnapshot`].

use std::fmt;
use std::time::Duration;
use serde::{Serialize, Deserialize};
use uuid::Uuid;

use crate::core::hash::{compute_snapshot_hash, StateHash, StateHasher};
use crate::game::geometry::FitResult;
use crate::game::matching::MatchResult;
use crate::game::pose::{Difficulty, PoseShape};
use crate::game::shape::{Shape, ShapeTemplate};
use crate::tracking::TrackingStatus;

// =============================================================================
// GAME PHASE
// =============================================================================

/// Current phase of the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum GamePhase {
    /// Title screen, no active timer
    #[default]
    Menu = 0,
    /// Counting down to the next round
    Countdown = 1,
    /// Wall approaching
    Playing = 2,
    /// Round passed, showing feedback
    Success = 3,
    /// Round failed, showing feedback
    Fail = 4,
    /// Out of lives, terminal until reset
    GameOver = 5,
    /// Playing, suspended
    Paused = 6,
}

impl GamePhase {
    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            GamePhase::Menu => "menu",
            GamePhase::Countdown => "countdown",
            GamePhase::Playing => "playing",
            GamePhase::Success => "success",
            GamePhase::Fail => "fail",
            GamePhase::GameOver => "gameover",
            GamePhase::Paused => "paused",
        }
    }

    /// Feedback phases advance to the next round.
    pub fn is_feedback(self) -> bool {
        matches!(self, GamePhase::Success | GamePhase::Fail)
    }

    /// A round is in progress (possibly suspended).
    pub fn has_active_round(self) -> bool {
        matches!(self, GamePhase::Playing | GamePhase::Paused)
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// PLAYER STATE
// =============================================================================

/// Player progress within one game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Remaining lives
    pub lives: u8,
    /// Cumulative score
    pub score: u32,
    /// Current round number (0 before the first game starts)
    pub round: u32,
    /// Checkpoint level of the current round
    pub checkpoint: u8,
    /// Best score across sessions
    pub high_score: u32,
}

impl PlayerState {
    /// Fresh player.
    pub fn new(lives: u8, high_score: u32) -> Self {
        Self {
            lives,
            score: 0,
            round: 0,
            checkpoint: 1,
            high_score,
        }
    }

    /// Add points, raising the high score if beaten. Returns true on a new record.
    pub fn add_score(&mut self, points: u32) -> bool {
        self.score = self.score.saturating_add(points);
        self.update_high_score()
    }

    /// Raise the high score to the current score if beaten.
    pub fn update_high_score(&mut self) -> bool {
        if self.score > self.high_score {
            self.high_score = self.score;
            true
        } else {
            false
        }
    }

    /// Feed this player into a hasher.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u8(self.lives);
        hasher.update_u32(self.score);
        hasher.update_u32(self.round);
        hasher.update_u8(self.checkpoint);
        hasher.update_u32(self.high_score);
    }
}

// =============================================================================
// TARGET
// =============================================================================

/// What the player has to match this round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Target {
    /// A reference pose
    Pose(PoseShape),
    /// An outline, already placed for this round
    Shape(ShapeTemplate),
}

impl Target {
    /// Catalog identifier.
    pub fn id(&self) -> &str {
        match self {
            Target::Pose(pose) => &pose.id,
            Target::Shape(template) => &template.id,
        }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        match self {
            Target::Pose(pose) => &pose.name,
            Target::Shape(template) => &template.name,
        }
    }

    /// Difficulty tier.
    pub fn difficulty(&self) -> Difficulty {
        match self {
            Target::Pose(pose) => pose.difficulty,
            Target::Shape(template) => template.difficulty,
        }
    }

    /// Outline geometry, in shape mode.
    pub fn shape(&self) -> Option<&Shape> {
        match self {
            Target::Pose(_) => None,
            Target::Shape(template) => Some(&template.shape),
        }
    }

    fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_str(self.id());
        if let Target::Shape(template) = self {
            let (min_x, max_x) = template.shape.horizontal_bounds();
            hasher.update_f64(min_x);
            hasher.update_f64(max_x);
        }
    }
}

// =============================================================================
// ROUND OUTCOME
// =============================================================================

/// Latest evaluation of the player against the round's target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RoundOutcome {
    /// Shape mode result
    Fit(FitResult),
    /// Pose mode result
    Match(MatchResult),
}

impl RoundOutcome {
    /// Whether this outcome would pass the round.
    pub fn passed(&self) -> bool {
        match self {
            RoundOutcome::Fit(fit) => fit.pass,
            RoundOutcome::Match(result) => result.is_match,
        }
    }

    /// 0-100 score used for round scoring.
    pub fn score(&self) -> u32 {
        match self {
            RoundOutcome::Fit(fit) => fit.score(),
            RoundOutcome::Match(result) => result.score,
        }
    }
}

// =============================================================================
// ROUND STATE
// =============================================================================

/// One round. Parameters are fixed when the round starts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundState {
    /// Round number
    pub number: u32,
    /// Target to match
    pub target: Target,
    /// Checkpoint level in effect
    pub checkpoint_level: u8,
    /// Wall arrival time (ms)
    pub wall_speed_ms: u32,
    /// Matching tolerance
    pub tolerance: f64,
    /// Time spent playing, excluding pauses
    pub elapsed: Duration,
    /// Most recent evaluation
    pub last_outcome: Option<RoundOutcome>,
    /// Wall arrival already handled
    pub resolved: bool,
}

impl RoundState {
    /// Wall progress in `[0,1]`.
    pub fn wall_progress(&self) -> f64 {
        if self.wall_speed_ms == 0 {
            return 1.0;
        }
        let elapsed_ms = self.elapsed.as_secs_f64() * 1000.0;
        (elapsed_ms / f64::from(self.wall_speed_ms)).clamp(0.0, 1.0)
    }

    /// Whether the wall has arrived.
    pub fn wall_arrived(&self) -> bool {
        self.wall_progress() >= 1.0
    }

    /// Live 0-100 score for the HUD.
    pub fn live_score(&self) -> u32 {
        self.last_outcome.as_ref().map_or(0, RoundOutcome::score)
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Everything a renderer needs, by value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Session identifier
    pub session_id: Uuid,
    /// Seed the session RNG started from
    pub rng_seed: u64,
    /// Current phase
    pub phase: GamePhase,
    /// Player progress
    pub player: PlayerState,
    /// Active or last round
    pub round: Option<RoundState>,
    /// Wall progress of the active round
    pub wall_progress: f64,
    /// Countdown number on screen
    pub countdown: Option<u32>,
    /// Points earned by the last passed round
    pub last_round_score: u32,
    /// Match score the last round was decided on
    pub last_match_score: u32,
    /// Observed tracker status
    pub tracking: TrackingStatus,
}

impl GameSnapshot {
    /// Hash of the gameplay-relevant state. Equal inputs give equal hashes.
    pub fn compute_hash(&self) -> StateHash {
        compute_snapshot_hash(self.player.round, self.rng_seed, |hasher| {
            hasher.update_u8(self.phase as u8);
            self.player.hash_into(hasher);

            match &self.round {
                Some(round) => {
                    hasher.update_bool(true);
                    hasher.update_u32(round.number);
                    round.target.hash_into(hasher);
                    hasher.update_u8(round.checkpoint_level);
                    hasher.update_u32(round.wall_speed_ms);
                    hasher.update_f64(round.tolerance);
                    hasher.update_duration(round.elapsed);
                    hasher.update_bool(round.resolved);
                    hasher.update_u32(round.live_score());
                }
                None => hasher.update_bool(false),
            }

            hasher.update_opt_u32(self.countdown);
            hasher.update_u32(self.last_round_score);
            hasher.update_u32(self.last_match_score);
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
