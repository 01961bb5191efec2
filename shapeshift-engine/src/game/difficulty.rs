//! Difficulty Progression
//!
//! Checkpoint table mapping the cumulative round count to round parameters,
//! plus round scoring.
//!
//! A player stays on a checkpoint until their round count reaches its
//! `rounds_required`, then moves to the next. The last checkpoint has no
//! threshold and applies forever.

use serde::Serialize;

use crate::game::pose::Difficulty;

/// A progression tier.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Checkpoint {
    /// 1-based tier number
    pub level: u8,
    /// Display name
    pub name: &'static str,
    /// Round count at which the player leaves this tier (`None` = never)
    pub rounds_required: Option<u32>,
    /// Time for the wall to arrive, in milliseconds
    pub wall_speed_ms: u32,
    /// Pose matching tolerance
    pub tolerance: f64,
    /// Difficulties eligible for target selection
    pub difficulties: &'static [Difficulty],
}

/// The checkpoint table, ordered by strictly increasing threshold.
pub const CHECKPOINTS: [Checkpoint; 6] = [
    Checkpoint {
        level: 1,
        name: "Warm Up",
        rounds_required: Some(5),
        wall_speed_ms: 4000,
        tolerance: 0.2,
        difficulties: &[Difficulty::Easy],
    },
    Checkpoint {
        level: 2,
        name: "Getting Started",
        rounds_required: Some(10),
        wall_speed_ms: 3500,
        tolerance: 0.18,
        difficulties: &[Difficulty::Easy, Difficulty::Medium],
    },
    Checkpoint {
        level: 3,
        name: "Challenge Mode",
        rounds_required: Some(15),
        wall_speed_ms: 3000,
        tolerance: 0.15,
        difficulties: &[Difficulty::Medium],
    },
    Checkpoint {
        level: 4,
        name: "Expert Zone",
        rounds_required: Some(20),
        wall_speed_ms: 2500,
        tolerance: 0.12,
        difficulties: &[Difficulty::Medium, Difficulty::Hard],
    },
    Checkpoint {
        level: 5,
        name: "Master Level",
        rounds_required: Some(25),
        wall_speed_ms: 2200,
        tolerance: 0.1,
        difficulties: &[Difficulty::Hard],
    },
    Checkpoint {
        level: 6,
        name: "Shapeshifter",
        rounds_required: None,
        wall_speed_ms: 2000,
        tolerance: 0.08,
        difficulties: &[Difficulty::Hard, Difficulty::Expert],
    },
];

/// Reference wall speed for scoring; a 5 s wall scores 1x.
const SCORE_REFERENCE_MS: f64 = 5000.0;

/// Extra score multiplier per checkpoint level above the first.
const LEVEL_SCORE_STEP: f64 = 0.2;

/// Checkpoint in effect after `round` rounds. Total over all inputs.
pub fn checkpoint_for_round(round: u32) -> &'static Checkpoint {
    CHECKPOINTS
        .iter()
        .find(|cp| cp.rounds_required.map_or(true, |threshold| threshold > round))
        .unwrap_or(&CHECKPOINTS[CHECKPOINTS.len() - 1])
}

/// Checkpoint level for a round.
#[inline]
pub fn checkpoint_level(round: u32) -> u8 {
    checkpoint_for_round(round).level
}

/// Whether moving from `previous_round` to `current_round` entered a higher tier.
pub fn is_new_checkpoint(previous_round: u32, current_round: u32) -> bool {
    checkpoint_level(current_round) > checkpoint_level(previous_round)
}

/// Wall-arrival time for a round, in milliseconds.
#[inline]
pub fn wall_speed_ms(round: u32) -> u32 {
    checkpoint_for_round(round).wall_speed_ms
}

/// Pose matching tolerance for a round.
#[inline]
pub fn tolerance(round: u32) -> f64 {
    checkpoint_for_round(round).tolerance
}

/// Eligible target difficulties for a round.
#[inline]
pub fn available_difficulties(round: u32) -> &'static [Difficulty] {
    checkpoint_for_round(round).difficulties
}

/// Points for a passed round.
///
/// `round(match_score * (5000 / wall_speed_ms) * (1 + (level - 1) * 0.2))`
pub fn round_score(match_score: u32, wall_speed_ms: u32, checkpoint_level: u8) -> u32 {
    let speed_multiplier = SCORE_REFERENCE_MS / f64::from(wall_speed_ms.max(1));
    let level_multiplier = 1.0 + f64::from(checkpoint_level.saturating_sub(1)) * LEVEL_SCORE_STEP;
    (f64::from(match_score) * speed_multiplier * level_multiplier).round() as u32
}

// =============================================================================
// TESTS
// =============================================================================
