//! Game Events
//!
//! Emitted by every transition, in order, for the UI, logs, and replay checks.

use serde::{Serialize, Deserialize};

use crate::game::pose::Difficulty;
use crate::game::state::GamePhase;

/// Game event data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEventData {
    /// Phase changed
    PhaseChanged {
        from: GamePhase,
        to: GamePhase,
    },

    /// A countdown number is shown
    CountdownStep {
        remaining: u32,
    },

    /// A round began; its parameters are now fixed
    RoundStarted {
        round: u32,
        target_id: String,
        difficulty: Difficulty,
        wall_speed_ms: u32,
        checkpoint_level: u8,
    },

    /// The wall arrived and the player matched
    RoundPassed {
        round: u32,
        match_score: u32,
        round_score: u32,
        total_score: u32,
    },

    /// The wall arrived and the player did not match
    RoundFailed {
        round: u32,
        match_score: u32,
        lives_left: u8,
    },

    /// A checkpoint was reached and a life awarded
    BonusLife {
        lives: u8,
    },

    /// The round entered a new checkpoint tier
    CheckpointReached {
        level: u8,
        name: String,
    },

    /// The high score was beaten
    NewHighScore {
        score: u32,
    },

    /// Out of lives
    GameOver {
        final_score: u32,
        rounds_completed: u32,
    },
}

/// A game event with its session time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Controller tick during which the event occurred
    pub tick: u64,

    /// Session time in milliseconds
    pub time_ms: u64,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(tick: u64, time_ms: u64, data: GameEventData) -> Self {
        Self { tick, time_ms, data }
    }

    /// Create phase changed event.
    pub fn phase_changed(tick: u64, time_ms: u64, from: GamePhase, to: GamePhase) -> Self {
        Self::new(tick, time_ms, GameEventData::PhaseChanged { from, to })
    }

    /// Create countdown step event.
    pub fn countdown_step(tick: u64, time_ms: u64, remaining: u32) -> Self {
        Self::new(tick, time_ms, GameEventData::CountdownStep { remaining })
    }

    /// Create round passed event.
    pub fn round_passed(
        tick: u64,
        time_ms: u64,
        round: u32,
        match_score: u32,
        round_score: u32,
        total_score: u32,
    ) -> Self {
        Self::new(
            tick,
            time_ms,
            GameEventData::RoundPassed {
                round,
                match_score,
                round_score,
                total_score,
            },
        )
    }

    /// Create round failed event.
    pub fn round_failed(tick: u64, time_ms: u64, round: u32, match_score: u32, lives_left: u8) -> Self {
        Self::new(
            tick,
            time_ms,
            GameEventData::RoundFailed {
                round,
                match_score,
                lives_left,
            },
        )
    }

    /// Create game over event.
    pub fn game_over(tick: u64, time_ms: u64, final_score: u32, rounds_completed: u32) -> Self {
        Self::new(
            tick,
            time_ms,
            GameEventData::GameOver {
                final_score,
                rounds_completed,
            },
        )
    }

    /// Whether this is a phase change into `phase`.
    pub fn is_phase_change_to(&self, phase: GamePhase) -> bool {
        matches!(self.data, GameEventData::PhaseChanged { to, .. } if to == phase)
    }
}
