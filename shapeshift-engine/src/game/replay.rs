//! Session Replay
//!
//! A session is fully determined by its config, session id, starting high
//! score, and the ordered inputs it received. Recording those and feeding
//! them to a fresh controller reproduces the session exactly.

use std::time::Duration;
use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::config::GameConfig;
use crate::core::hash::StateHash;
use crate::game::events::GameEvent;
use crate::game::state::GameSnapshot;
use crate::game::tick::{Command, GameController, GameError};
use crate::store::MemoryStore;
use crate::tracking::PoseFrame;

/// Replay errors.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Recording could not be encoded or decoded.
    #[error("recording codec error: {0}")]
    Codec(#[from] bincode::Error),

    /// The recorded config no longer builds a controller.
    #[error("cannot rebuild session: {0}")]
    Game(#[from] GameError),
}

/// One recorded input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RecordedInput {
    /// A tick with the frame it saw
    Tick {
        /// Time advanced
        delta: Duration,
        /// Frame evaluated, if any
        frame: Option<PoseFrame>,
    },
    /// A command
    Command(Command),
}

/// Everything needed to reproduce a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionRecording {
    /// Session identifier (seeds the RNG when the config has no seed)
    pub session_id: Uuid,
    /// Config the session ran with
    pub config: GameConfig,
    /// High score loaded at session start
    pub initial_high_score: u32,
    /// Inputs in the order they were applied
    pub inputs: Vec<RecordedInput>,
}

impl SessionRecording {
    /// Empty recording for a session.
    pub fn new(session_id: Uuid, config: GameConfig, initial_high_score: u32) -> Self {
        Self {
            session_id,
            config,
            initial_high_score,
            inputs: Vec::new(),
        }
    }

    /// Empty recording matching a live controller.
    pub fn for_controller(controller: &GameController) -> Self {
        Self::new(
            controller.session_id(),
            controller.config().clone(),
            controller.player().high_score,
        )
    }

    /// Append a tick.
    pub fn push_tick(&mut self, delta: Duration, frame: Option<PoseFrame>) {
        self.inputs.push(RecordedInput::Tick { delta, frame });
    }

    /// Append a command.
    pub fn push_command(&mut self, command: Command) {
        self.inputs.push(RecordedInput::Command(command));
    }

    /// Number of recorded ticks.
    pub fn tick_count(&self) -> usize {
        self.inputs
            .iter()
            .filter(|i| matches!(i, RecordedInput::Tick { .. }))
            .count()
    }

    /// Encode with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ReplayError> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode from bincode.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ReplayError> {
        Ok(bincode::deserialize(bytes)?)
    }
}

/// Result of replaying a recording.
#[derive(Clone, Debug)]
pub struct ReplayOutcome {
    /// State after the last input
    pub snapshot: GameSnapshot,
    /// Every event, in order
    pub events: Vec<GameEvent>,
    /// Hash of the final snapshot
    pub hash: StateHash,
}

/// Re-run a recording on a fresh controller.
///
/// Commands that were rejected live are rejected again and leave no trace.
pub fn replay_session(recording: &SessionRecording) -> Result<ReplayOutcome, ReplayError> {
    let store = MemoryStore::with_high_score(recording.initial_high_score);
    let mut controller =
        GameController::with_session(recording.config.clone(), store, recording.session_id)?;
    let mut events = Vec::new();

    for input in &recording.inputs {
        match input {
            RecordedInput::Tick { delta, frame } => {
                let result = controller.tick(*delta, frame.as_ref());
                events.extend(result.events);
            }
            RecordedInput::Command(command) => match controller.apply(*command) {
                Ok(produced) => events.extend(produced),
                Err(e) => debug!(?command, error = %e, "recorded command rejected on replay"),
            },
        }
    }

    let snapshot = controller.snapshot();
    let hash = snapshot.compute_hash();
    debug!(session = %recording.session_id, events = events.len(), hash = %hex::encode(hash), "replay finished");

    Ok(ReplayOutcome {
        snapshot,
        events,
        hash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::point::Landmark;
    use crate::game::landmarks::LANDMARK_COUNT;
    use crate::game::state::GamePhase;
    use crate::tracking::TrackingStatus;

    fn sample_recording(seed: Option<u64>) -> SessionRecording {
        let config = GameConfig { seed, ..GameConfig::default() };
        let mut recording = SessionRecording::new(Uuid::from_bytes([9; 16]), config, 50);
        recording.push_command(Command::TrackerStatus(TrackingStatus::Ready));
        recording.push_command(Command::StartGame);
        for i in 0..300u64 {
            let y = 0.3 + (i % 10) as f64 * 0.01;
            let frame = PoseFrame::new(vec![Landmark::new(0.5, y); LANDMARK_COUNT], i * 33);
            recording.push_tick(Duration::from_millis(33), Some(frame));
            if i == 100 {
                recording.push_command(Command::Pause);
                recording.push_command(Command::Resume);
            }
        }
        recording
    }

    #[test]
    fn test_replay_is_deterministic() {
        let recording = sample_recording(Some(1234));
        let first = replay_session(&recording).unwrap();
        let second = replay_session(&recording).unwrap();

        assert_eq!(first.hash, second.hash);
        assert_eq!(first.events, second.events);
        assert_eq!(first.snapshot.player.high_score, second.snapshot.player.high_score);
        assert!(first.snapshot.player.round >= 1);
    }

    #[test]
    fn test_seed_derived_from_session_id() {
        let recording = sample_recording(None);
        let a = replay_session(&recording).unwrap();
        let b = replay_session(&recording).unwrap();
        assert_eq!(a.hash, b.hash);
        assert_eq!(a.snapshot.rng_seed, b.snapshot.rng_seed);
    }

    #[test]
    fn test_recording_survives_bincode() {
        let recording = sample_recording(Some(5));
        let bytes = recording.to_bytes().unwrap();
        let decoded = SessionRecording::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.tick_count(), 300);

        let original = replay_session(&recording).unwrap();
        let restored = replay_session(&decoded).unwrap();
        assert_eq!(original.hash, restored.hash);
    }

    #[test]
    fn test_rejected_commands_are_skipped() {
        let mut recording = SessionRecording::new(Uuid::nil(), GameConfig::default(), 0);
        recording.push_command(Command::Pause);
        recording.push_command(Command::StartGame);
        let outcome = replay_session(&recording).unwrap();
        assert_eq!(outcome.snapshot.phase, GamePhase::Countdown);
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        assert!(matches!(
            SessionRecording::from_bytes(&[1, 2, 3]),
            Err(ReplayError::Codec(_))
        ));
    }
}
