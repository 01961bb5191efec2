//! Game Controller
//!
//! The round/game state machine:
//!
//! ```text
//! menu -> countdown -> playing -> success -> countdown (next round)
//!                         |    \-> fail    -> countdown (next round)
//!                         |     \-> gameover (out of lives, until reset)
//!                         \<-> paused
//! ```
//!
//! Time only moves through [`GameController::tick`]. Countdown steps and
//! feedback delays are generation-keyed timers; every transition cancels
//! whatever was pending, so a timer from a superseded phase never fires.

use std::time::Duration;
use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{ConfigError, GameConfig, GameMode};
use crate::core::rng::{derive_session_seed, DeterministicRng};
use crate::game::difficulty::{checkpoint_for_round, is_new_checkpoint, round_score};
use crate::game::events::{GameEvent, GameEventData};
use crate::game::geometry::{evaluate_fit, randomize_horizontal_placement, FitOptions, FitResult};
use crate::game::matching::compare_poses;
use crate::game::pose::{Difficulty, PoseCatalog};
use crate::game::shape::{default_shapes, ShapeTemplate};
use crate::game::state::{GamePhase, GameSnapshot, PlayerState, RoundOutcome, RoundState, Target};
use crate::game::timer::{Scheduler, TimerAction};
use crate::store::ScoreStore;
use crate::tracking::{PoseFrame, TrackingStatus};

/// Controller errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// Command not valid in the current phase.
    #[error("cannot {command} while in {phase}")]
    InvalidTransition {
        /// Phase the command was issued in
        phase: GamePhase,
        /// Rejected command
        command: &'static str,
    },

    /// The pose tracker cannot provide frames.
    #[error("pose tracker unavailable: {0}")]
    TrackerUnavailable(TrackingStatus),

    /// Rejected configuration.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// External input to the state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Leave the menu and start counting down to round 1
    StartGame,
    /// Suspend the running round
    Pause,
    /// Continue a suspended round
    Resume,
    /// Leave a feedback screen early
    Continue,
    /// Start the round without waiting for the countdown
    SkipCountdown,
    /// Back to the menu, keeping the high score
    Reset,
    /// Tracker status changed
    TrackerStatus(TrackingStatus),
}

impl Command {
    fn name(self) -> &'static str {
        match self {
            Command::StartGame => "start game",
            Command::Pause => "pause",
            Command::Resume => "resume",
            Command::Continue => "continue",
            Command::SkipCountdown => "skip countdown",
            Command::Reset => "reset",
            Command::TrackerStatus(_) => "observe tracker status",
        }
    }
}

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated this tick
    pub events: Vec<GameEvent>,
    /// A round was decided this tick
    pub round_resolved: bool,
    /// The game is over
    pub game_over: bool,
}

/// Owns one game session: phase, player, timers, and the active round.
pub struct GameController {
    session_id: Uuid,
    config: GameConfig,
    rng_seed: u64,
    rng: DeterministicRng,
    poses: PoseCatalog,
    shapes: Vec<ShapeTemplate>,
    store: Box<dyn ScoreStore>,
    timers: Scheduler,
    phase: GamePhase,
    player: PlayerState,
    round: Option<RoundState>,
    countdown: Option<u32>,
    last_round_score: u32,
    last_match_score: u32,
    tracking: TrackingStatus,
    tick_count: u64,
    pending_events: Vec<GameEvent>,
}

impl GameController {
    /// Create a controller with a fresh session id.
    pub fn new(config: GameConfig, store: impl ScoreStore + 'static) -> Result<Self, GameError> {
        Self::with_session(config, store, Uuid::new_v4())
    }

    /// Create a controller for a known session id (replays).
    pub fn with_session(
        config: GameConfig,
        store: impl ScoreStore + 'static,
        session_id: Uuid,
    ) -> Result<Self, GameError> {
        config.validate()?;

        let rng_seed = config
            .seed
            .unwrap_or_else(|| derive_session_seed(session_id.as_bytes()));
        let high_score = store.high_score();

        info!(
            session = %session_id,
            mode = %config.mode,
            rng_seed,
            high_score,
            "game controller created"
        );

        Ok(Self {
            session_id,
            player: PlayerState::new(config.initial_lives, high_score),
            config,
            rng_seed,
            rng: DeterministicRng::new(rng_seed),
            poses: PoseCatalog::builtin(),
            shapes: default_shapes(),
            store: Box::new(store),
            timers: Scheduler::new(),
            phase: GamePhase::Menu,
            round: None,
            countdown: None,
            last_round_score: 0,
            last_match_score: 0,
            tracking: TrackingStatus::Idle,
            tick_count: 0,
            pending_events: Vec::new(),
        })
    }

    /// Replace the reference poses used in pose mode.
    pub fn with_pose_catalog(mut self, poses: PoseCatalog) -> Self {
        self.poses = poses;
        self
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Session identifier.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Seed the session RNG started from.
    pub fn rng_seed(&self) -> u64 {
        self.rng_seed
    }

    /// Active configuration.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Current phase.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Player progress.
    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    /// Active or last round.
    pub fn round(&self) -> Option<&RoundState> {
        self.round.as_ref()
    }

    /// Last observed tracker status.
    pub fn tracking_status(&self) -> TrackingStatus {
        self.tracking
    }

    /// Session time.
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// Owned copy of everything a renderer needs.
    pub fn snapshot(&self) -> GameSnapshot {
        let wall_progress = match (&self.round, self.phase) {
            (Some(round), phase) if phase.has_active_round() || phase.is_feedback() => {
                round.wall_progress()
            }
            _ => 0.0,
        };

        GameSnapshot {
            session_id: self.session_id,
            rng_seed: self.rng_seed,
            phase: self.phase,
            player: self.player.clone(),
            round: self.round.clone(),
            wall_progress,
            countdown: self.countdown,
            last_round_score: self.last_round_score,
            last_match_score: self.last_match_score,
            tracking: self.tracking,
        }
    }

    // =========================================================================
    // COMMANDS
    // =========================================================================

    /// Apply an external command.
    pub fn apply(&mut self, command: Command) -> Result<Vec<GameEvent>, GameError> {
        match command {
            Command::StartGame => self.start_game(),
            Command::Pause => self.pause(),
            Command::Resume => self.resume(),
            Command::Continue => self.continue_round(),
            Command::SkipCountdown => self.skip_countdown(),
            Command::Reset => Ok(self.reset_game()),
            Command::TrackerStatus(status) => {
                self.observe_status(status);
                Ok(Vec::new())
            }
        }
    }

    /// Start a new game from the menu.
    ///
    /// Refused while the tracker reports a permission or startup failure.
    pub fn start_game(&mut self) -> Result<Vec<GameEvent>, GameError> {
        self.require(GamePhase::Menu, Command::StartGame)?;
        if !self.tracking.allows_start() {
            warn!(session = %self.session_id, status = %self.tracking, "start refused, tracker unavailable");
            return Err(GameError::TrackerUnavailable(self.tracking));
        }

        self.player = PlayerState::new(self.config.initial_lives, self.player.high_score);
        self.player.round = 1;
        self.round = None;
        self.last_round_score = 0;
        self.last_match_score = 0;

        info!(session = %self.session_id, lives = self.player.lives, "game started");
        self.begin_countdown();
        Ok(self.take_events())
    }

    /// Suspend the running round. Round time stops until [`resume`](Self::resume).
    pub fn pause(&mut self) -> Result<Vec<GameEvent>, GameError> {
        self.require(GamePhase::Playing, Command::Pause)?;
        self.timers.cancel_all();
        self.set_phase(GamePhase::Paused);
        Ok(self.take_events())
    }

    /// Continue a suspended round.
    pub fn resume(&mut self) -> Result<Vec<GameEvent>, GameError> {
        self.require(GamePhase::Paused, Command::Resume)?;
        self.set_phase(GamePhase::Playing);
        Ok(self.take_events())
    }

    /// Leave the success/fail screen without waiting for the delay.
    pub fn continue_round(&mut self) -> Result<Vec<GameEvent>, GameError> {
        if !self.phase.is_feedback() {
            return Err(self.invalid(Command::Continue));
        }
        self.advance_round();
        Ok(self.take_events())
    }

    /// Start the round immediately.
    pub fn skip_countdown(&mut self) -> Result<Vec<GameEvent>, GameError> {
        self.require(GamePhase::Countdown, Command::SkipCountdown)?;
        self.start_round();
        Ok(self.take_events())
    }

    /// Return to the menu. Everything except the high score is cleared.
    pub fn reset_game(&mut self) -> Vec<GameEvent> {
        self.timers.cancel_all();
        self.player = PlayerState::new(self.config.initial_lives, self.player.high_score);
        self.round = None;
        self.countdown = None;
        self.last_round_score = 0;
        self.last_match_score = 0;
        self.set_phase(GamePhase::Menu);
        self.take_events()
    }

    /// Record the tracker's status.
    pub fn observe_status(&mut self, status: TrackingStatus) {
        if status != self.tracking {
            debug!(session = %self.session_id, from = %self.tracking, to = %status, "tracker status observed");
            self.tracking = status;
        }
    }

    // =========================================================================
    // TICK
    // =========================================================================

    /// Advance the session by `delta`, evaluating `frame` if a round is live.
    ///
    /// `frame` is the most recent tracker result; `None` means nothing new,
    /// and the previous evaluation stands.
    pub fn tick(&mut self, delta: Duration, frame: Option<&PoseFrame>) -> TickResult {
        self.tick_count += 1;
        let until = self.timers.now() + delta;

        while let Some(action) = self.timers.pop_due(until) {
            match action {
                TimerAction::CountdownStep => self.on_countdown_step(),
                TimerAction::AdvanceRound => self.advance_round(),
            }
        }

        let playing_time = until.saturating_sub(self.timers.now());
        self.timers.advance_to(until);

        let round_resolved = if self.phase == GamePhase::Playing {
            self.update_round(playing_time, frame)
        } else {
            false
        };

        TickResult {
            events: self.take_events(),
            round_resolved,
            game_over: self.phase == GamePhase::GameOver,
        }
    }

    /// Accumulate round time, evaluate, and resolve on wall arrival.
    fn update_round(&mut self, dt: Duration, frame: Option<&PoseFrame>) -> bool {
        let fit = self.config.fit;
        let Some(round) = self.round.as_mut() else {
            return false;
        };
        if round.resolved {
            return false;
        }

        round.elapsed += dt;

        if let Some(frame) = frame {
            let outcome = evaluate_frame(&round.target, frame, round.tolerance, fit);
            #[cfg(feature = "debug-tracing")]
            tracing::trace!(
                round = round.number,
                progress = round.wall_progress(),
                score = outcome.score(),
                passed = outcome.passed(),
                "frame evaluated"
            );
            round.last_outcome = Some(outcome);
        }

        if !round.wall_arrived() {
            return false;
        }

        round.resolved = true;
        let decision = round.last_outcome.as_ref().map(|o| (o.passed(), o.score()));
        match decision {
            Some((true, score)) => self.complete_round(score),
            Some((false, score)) => self.fail_round(score),
            None => self.fail_round(0),
        }
        true
    }

    // =========================================================================
    // TRANSITIONS
    // =========================================================================

    fn begin_countdown(&mut self) {
        self.timers.cancel_all();
        self.set_phase(GamePhase::Countdown);

        let steps = self.config.countdown_steps;
        self.countdown = Some(steps);
        self.emit(GameEventData::CountdownStep { remaining: steps });
        self.schedule_countdown_step();
    }

    fn on_countdown_step(&mut self) {
        let remaining = self.countdown.unwrap_or(1).saturating_sub(1);
        if remaining == 0 {
            self.start_round();
            return;
        }
        self.countdown = Some(remaining);
        self.emit(GameEventData::CountdownStep { remaining });
        self.schedule_countdown_step();
    }

    fn schedule_countdown_step(&mut self) {
        let step = Duration::from_millis(self.config.countdown_step_ms);
        self.timers.schedule(step, TimerAction::CountdownStep);
    }

    /// Freeze the round's parameters and pick its target.
    fn start_round(&mut self) {
        self.timers.cancel_all();
        self.countdown = None;

        let number = self.player.round;
        let checkpoint = checkpoint_for_round(number);

        if is_new_checkpoint(number.saturating_sub(1), number) {
            info!(session = %self.session_id, level = checkpoint.level, name = checkpoint.name, "checkpoint reached");
            self.emit(GameEventData::CheckpointReached {
                level: checkpoint.level,
                name: checkpoint.name.to_string(),
            });
        }
        self.player.checkpoint = checkpoint.level;

        let target = self.select_target(checkpoint.difficulties);
        let tolerance = match self.config.mode {
            GameMode::Pose => checkpoint.tolerance,
            GameMode::Shape => self.config.fit.tolerance,
        };

        self.set_phase(GamePhase::Playing);
        info!(
            session = %self.session_id,
            round = number,
            target = target.id(),
            wall_speed_ms = checkpoint.wall_speed_ms,
            "round started"
        );
        self.emit(GameEventData::RoundStarted {
            round: number,
            target_id: target.id().to_string(),
            difficulty: target.difficulty(),
            wall_speed_ms: checkpoint.wall_speed_ms,
            checkpoint_level: checkpoint.level,
        });

        self.round = Some(RoundState {
            number,
            target,
            checkpoint_level: checkpoint.level,
            wall_speed_ms: checkpoint.wall_speed_ms,
            tolerance,
            elapsed: Duration::ZERO,
            last_outcome: None,
            resolved: false,
        });
    }

    fn select_target(&mut self, difficulties: &[Difficulty]) -> Target {
        if self.config.mode == GameMode::Shape {
            let eligible: Vec<&ShapeTemplate> = self
                .shapes
                .iter()
                .filter(|s| difficulties.contains(&s.difficulty))
                .collect();
            let picked = self.rng.choose(&eligible).copied().or(self.shapes.first());

            if let Some(template) = picked {
                let mut placed = template.clone();
                if self.config.randomize_placement {
                    placed.shape = randomize_horizontal_placement(
                        &template.shape,
                        self.config.placement_padding,
                        &mut self.rng,
                    );
                }
                return Target::Shape(placed);
            }
        }

        Target::Pose(self.poses.random_pose(difficulties, &mut self.rng).clone())
    }

    fn complete_round(&mut self, match_score: u32) {
        let round = self.player.round;
        let (wall_speed_ms, level) = self
            .round
            .as_ref()
            .map(|r| (r.wall_speed_ms, r.checkpoint_level))
            .unwrap_or((checkpoint_for_round(round).wall_speed_ms, self.player.checkpoint));

        let points = round_score(match_score, wall_speed_ms, level);
        self.last_round_score = points;
        self.last_match_score = match_score;
        let record = self.player.add_score(points);

        info!(session = %self.session_id, round, match_score, points, total = self.player.score, "round passed");
        self.emit(GameEventData::RoundPassed {
            round,
            match_score,
            round_score: points,
            total_score: self.player.score,
        });

        if is_new_checkpoint(round.saturating_sub(1), round) && self.player.lives < self.config.max_lives {
            self.player.lives += 1;
            self.emit(GameEventData::BonusLife { lives: self.player.lives });
        }

        if record {
            self.emit(GameEventData::NewHighScore { score: self.player.high_score });
            self.persist_high_score();
        }

        self.set_phase(GamePhase::Success);
        self.schedule_feedback();
    }

    fn fail_round(&mut self, match_score: u32) {
        let round = self.player.round;
        self.last_round_score = 0;
        self.last_match_score = match_score;
        self.player.lives = self.player.lives.saturating_sub(1);

        info!(session = %self.session_id, round, match_score, lives = self.player.lives, "round failed");
        self.emit(GameEventData::RoundFailed {
            round,
            match_score,
            lives_left: self.player.lives,
        });

        if self.player.lives > 0 {
            self.set_phase(GamePhase::Fail);
            self.schedule_feedback();
            return;
        }

        self.timers.cancel_all();
        if self.player.update_high_score() {
            self.emit(GameEventData::NewHighScore { score: self.player.high_score });
        }
        self.persist_high_score();

        info!(session = %self.session_id, score = self.player.score, rounds = round, "game over");
        self.emit(GameEventData::GameOver {
            final_score: self.player.score,
            rounds_completed: round.saturating_sub(1),
        });
        self.set_phase(GamePhase::GameOver);
    }

    fn schedule_feedback(&mut self) {
        self.timers.cancel_all();
        let delay = Duration::from_millis(self.config.feedback_delay_ms);
        self.timers.schedule(delay, TimerAction::AdvanceRound);
    }

    fn advance_round(&mut self) {
        self.player.round = self.player.round.saturating_add(1);
        self.begin_countdown();
    }

    fn persist_high_score(&mut self) {
        if let Err(e) = self.store.record_high_score(self.player.high_score) {
            warn!(session = %self.session_id, error = %e, "failed to persist high score");
        }
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    fn require(&self, phase: GamePhase, command: Command) -> Result<(), GameError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(self.invalid(command))
        }
    }

    fn invalid(&self, command: Command) -> GameError {
        debug!(session = %self.session_id, phase = %self.phase, command = command.name(), "command rejected");
        GameError::InvalidTransition {
            phase: self.phase,
            command: command.name(),
        }
    }

    fn set_phase(&mut self, to: GamePhase) {
        let from = self.phase;
        if from == to {
            return;
        }
        info!(session = %self.session_id, %from, %to, "phase changed");
        self.phase = to;
        self.emit(GameEventData::PhaseChanged { from, to });
    }

    fn emit(&mut self, data: GameEventData) {
        let time_ms = self.timers.now().as_millis() as u64;
        self.pending_events.push(GameEvent::new(self.tick_count, time_ms, data));
    }

    fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }
}

/// Score one frame against a target.
///
/// A frame without a full skeleton never fits a shape.
pub fn evaluate_frame(target: &Target, frame: &PoseFrame, tolerance: f64, fit: FitOptions) -> RoundOutcome {
    match target {
        Target::Pose(pose) => RoundOutcome::Match(compare_poses(&frame.landmarks, pose, tolerance)),
        Target::Shape(_) if !frame.has_pose() => RoundOutcome::Fit(FitResult::default()),
        Target::Shape(template) => {
            let options = FitOptions {
                min_score: fit.min_score,
                tolerance,
            };
            RoundOutcome::Fit(evaluate_fit(&template.shape, &frame.keypoints(), &options))
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::point::{Landmark, Point};
    use crate::game::geometry::{is_inside, FLOOR_Y};
    use crate::game::landmarks::LANDMARK_COUNT;
    use crate::store::MemoryStore;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn controller(config: GameConfig) -> GameController {
        let config = GameConfig { seed: Some(7), ..config };
        GameController::with_session(config, MemoryStore::default(), Uuid::nil()).unwrap()
    }

    /// A frame reproducing the active pose target exactly.
    fn matching_frame(game: &GameController) -> PoseFrame {
        match &game.round().unwrap().target {
            Target::Pose(pose) => PoseFrame::new(pose.landmarks.clone(), 0),
            Target::Shape(_) => panic!("expected a pose target"),
        }
    }

    fn count(events: &[GameEvent], pred: impl Fn(&GameEventData) -> bool) -> usize {
        events.iter().filter(|e| pred(&e.data)).count()
    }

    #[test]
    fn test_countdown_runs_into_playing() {
        let mut game = controller(GameConfig::default());
        let events = game.start_game().unwrap();
        assert_eq!(game.phase(), GamePhase::Countdown);
        assert_eq!(game.player().round, 1);
        assert!(events.iter().any(|e| e.is_phase_change_to(GamePhase::Countdown)));
        assert_eq!(game.snapshot().countdown, Some(3));

        game.tick(ms(800), None);
        assert_eq!(game.snapshot().countdown, Some(2));
        game.tick(ms(800), None);
        assert_eq!(game.snapshot().countdown, Some(1));

        let result = game.tick(ms(800), None);
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.snapshot().countdown, None);
        assert_eq!(
            count(&result.events, |d| matches!(d, GameEventData::RoundStarted { round: 1, .. })),
            1
        );

        let round = game.round().unwrap();
        assert_eq!(round.wall_speed_ms, 4000);
        assert_eq!(round.tolerance, 0.2);
        assert_eq!(round.target.difficulty(), Difficulty::Easy);
    }

    #[test]
    fn test_countdown_overshoot_counts_toward_round() {
        let mut game = controller(GameConfig::default());
        game.start_game().unwrap();
        game.tick(ms(3400), None);
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.round().unwrap().elapsed, ms(1000));
    }

    #[test]
    fn test_passing_round_scores() {
        let mut game = controller(GameConfig::default());
        game.start_game().unwrap();
        game.skip_countdown().unwrap();

        let frame = matching_frame(&game);
        let mid = game.tick(ms(2000), Some(&frame));
        assert!(!mid.round_resolved);
        assert_eq!(game.round().unwrap().live_score(), 100);
        assert!((game.snapshot().wall_progress - 0.5).abs() < 1e-12);

        let end = game.tick(ms(2000), Some(&frame));
        assert!(end.round_resolved);
        assert_eq!(game.phase(), GamePhase::Success);
        assert_eq!(game.player().score, 125);
        assert_eq!(game.player().high_score, 125);
        assert_eq!(game.snapshot().last_round_score, 125);
        assert_eq!(count(&end.events, |d| matches!(d, GameEventData::NewHighScore { score: 125 })), 1);
    }

    #[test]
    fn test_no_frame_fails_round() {
        let mut game = controller(GameConfig::default());
        game.start_game().unwrap();
        game.skip_countdown().unwrap();

        let result = game.tick(ms(4000), None);
        assert!(result.round_resolved);
        assert_eq!(game.phase(), GamePhase::Fail);
        assert_eq!(game.player().lives, 2);
        assert_eq!(game.snapshot().last_match_score, 0);
    }

    #[test]
    fn test_empty_frame_overrides_earlier_match() {
        let mut game = controller(GameConfig::default());
        game.start_game().unwrap();
        game.skip_countdown().unwrap();

        let frame = matching_frame(&game);
        game.tick(ms(1000), Some(&frame));
        game.tick(ms(3000), Some(&PoseFrame::empty(0)));
        assert_eq!(game.phase(), GamePhase::Fail);
    }

    #[test]
    fn test_last_life_lost_is_game_over() {
        let mut game = controller(GameConfig { initial_lives: 1, ..GameConfig::default() });
        game.start_game().unwrap();
        game.skip_countdown().unwrap();

        let result = game.tick(ms(4000), None);
        assert!(result.game_over);
        assert_eq!(game.phase(), GamePhase::GameOver);
        assert_eq!(game.player().lives, 0);
        assert_eq!(
            count(&result.events, |d| matches!(d, GameEventData::GameOver { rounds_completed: 0, .. })),
            1
        );

        // Terminal: time does nothing and start is refused until reset.
        assert!(game.tick(ms(60_000), None).events.is_empty());
        assert!(matches!(
            game.start_game(),
            Err(GameError::InvalidTransition { phase: GamePhase::GameOver, .. })
        ));
        game.reset_game();
        assert!(game.start_game().is_ok());
    }

    #[test]
    fn test_checkpoint_crossing_awards_life() {
        let mut game = controller(GameConfig::default());
        game.start_game().unwrap();
        game.player.round = 5;
        let events = game.skip_countdown().unwrap();
        assert_eq!(
            count(&events, |d| matches!(d, GameEventData::CheckpointReached { level: 2, .. })),
            1
        );

        let round = game.round().unwrap();
        assert_eq!(round.checkpoint_level, 2);
        assert_eq!(round.wall_speed_ms, 3500);
        assert!(round.target.difficulty() <= Difficulty::Medium);

        let frame = matching_frame(&game);
        let result = game.tick(ms(3500), Some(&frame));
        assert_eq!(game.phase(), GamePhase::Success);
        assert_eq!(game.player().lives, 4);
        assert_eq!(game.player().score, 171);
        assert_eq!(count(&result.events, |d| matches!(d, GameEventData::BonusLife { lives: 4 })), 1);
    }

    #[test]
    fn test_bonus_life_capped_at_max() {
        let mut game = controller(GameConfig { initial_lives: 5, ..GameConfig::default() });
        game.start_game().unwrap();
        game.player.round = 5;
        game.skip_countdown().unwrap();

        let frame = matching_frame(&game);
        game.tick(ms(3500), Some(&frame));
        assert_eq!(game.phase(), GamePhase::Success);
        assert_eq!(game.player().lives, 5);
    }

    #[test]
    fn test_feedback_advances_after_delay() {
        let mut game = controller(GameConfig::default());
        game.start_game().unwrap();
        game.skip_countdown().unwrap();
        game.tick(ms(4000), None);
        assert_eq!(game.phase(), GamePhase::Fail);

        game.tick(ms(1999), None);
        assert_eq!(game.phase(), GamePhase::Fail);
        game.tick(ms(1), None);
        assert_eq!(game.phase(), GamePhase::Countdown);
        assert_eq!(game.player().round, 2);
    }

    #[test]
    fn test_continue_cancels_feedback_timer() {
        let mut game = controller(GameConfig::default());
        game.start_game().unwrap();
        game.skip_countdown().unwrap();
        game.tick(ms(4000), None);

        game.continue_round().unwrap();
        assert_eq!(game.player().round, 2);
        game.skip_countdown().unwrap();

        // The old feedback timer would have fired here.
        game.tick(ms(2500), None);
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.player().round, 2);
    }

    #[test]
    fn test_pause_excludes_time() {
        let mut game = controller(GameConfig::default());
        game.start_game().unwrap();
        game.skip_countdown().unwrap();

        game.tick(ms(1000), None);
        game.pause().unwrap();
        assert_eq!(game.phase(), GamePhase::Paused);

        game.tick(ms(10_000), None);
        assert_eq!(game.phase(), GamePhase::Paused);
        assert_eq!(game.round().unwrap().elapsed, ms(1000));

        game.resume().unwrap();
        game.tick(ms(1000), None);
        assert_eq!(game.round().unwrap().elapsed, ms(2000));
        assert!((game.snapshot().wall_progress - 0.5).abs() < 1e-12);
        assert_eq!(game.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_pause_resume_only_from_their_phases() {
        let mut game = controller(GameConfig::default());
        assert!(matches!(
            game.pause(),
            Err(GameError::InvalidTransition { phase: GamePhase::Menu, command: "pause" })
        ));
        assert!(game.resume().is_err());
        game.start_game().unwrap();
        assert!(game.pause().is_err());
        assert!(game.continue_round().is_err());
        assert_eq!(game.phase(), GamePhase::Countdown);
    }

    #[test]
    fn test_reset_invalidates_pending_timers() {
        let mut game = controller(GameConfig::default());
        game.player.high_score = 300;
        game.start_game().unwrap();
        game.tick(ms(900), None);

        let events = game.reset_game();
        assert!(events.iter().any(|e| e.is_phase_change_to(GamePhase::Menu)));
        assert_eq!(game.player().round, 0);
        assert!(game.round().is_none());
        assert_eq!(game.player().high_score, 300);

        let result = game.tick(ms(10_000), None);
        assert!(result.events.is_empty());
        assert_eq!(game.phase(), GamePhase::Menu);
    }

    #[test]
    fn test_round_resolves_once() {
        let mut game = controller(GameConfig::default());
        game.start_game().unwrap();
        game.skip_countdown().unwrap();

        let frame = matching_frame(&game);
        let mut resolutions = 0;
        let mut passed = 0;
        for _ in 0..100 {
            let result = game.tick(ms(50), Some(&frame));
            resolutions += result.round_resolved as usize;
            passed += count(&result.events, |d| matches!(d, GameEventData::RoundPassed { .. }));
            if game.phase() != GamePhase::Playing {
                break;
            }
        }
        assert_eq!(resolutions, 1);
        assert_eq!(passed, 1);

        // A resolved round cannot resolve again even if re-entered.
        assert!(!game.update_round(ms(50), Some(&frame)));
    }

    #[test]
    fn test_tracker_failure_blocks_start() {
        let mut game = controller(GameConfig::default());
        game.observe_status(TrackingStatus::PermissionDenied);
        assert!(matches!(
            game.start_game(),
            Err(GameError::TrackerUnavailable(TrackingStatus::PermissionDenied))
        ));
        assert_eq!(game.phase(), GamePhase::Menu);

        game.apply(Command::TrackerStatus(TrackingStatus::Ready)).unwrap();
        assert!(game.apply(Command::StartGame).is_ok());
    }

    #[test]
    fn test_shape_mode_floor_fit() {
        let mut game = controller(GameConfig { mode: GameMode::Shape, ..GameConfig::default() });
        game.start_game().unwrap();
        game.skip_countdown().unwrap();

        let round = game.round().unwrap();
        assert!(round.target.shape().is_some());
        assert_eq!(round.tolerance, 0.04);

        // Everything at floor level counts as inside any outline.
        let frame = PoseFrame::new(vec![Landmark::new(0.5, 0.97); LANDMARK_COUNT], 0);
        game.tick(ms(4000), Some(&frame));
        assert_eq!(game.phase(), GamePhase::Success);
        assert_eq!(game.snapshot().last_match_score, 100);
    }

    fn shape_game() -> GameController {
        let mut game = controller(GameConfig { mode: GameMode::Shape, ..GameConfig::default() });
        game.start_game().unwrap();
        game.skip_countdown().unwrap();
        game
    }

    /// Full skeleton built from grid points above the floor that are
    /// inside (or outside) the active outline.
    fn frame_against_target(game: &GameController, inside: bool) -> PoseFrame {
        let round = game.round().unwrap();
        let shape = round.target.shape().unwrap();
        let points: Vec<Point> = (1..20)
            .flat_map(|i| (1..18).map(move |j| Point::new(i as f64 * 0.05, j as f64 * 0.05)))
            .filter(|p| is_inside(shape, *p, round.tolerance) == inside)
            .collect();
        assert!(!points.is_empty());

        let landmarks = points
            .iter()
            .cycle()
            .take(LANDMARK_COUNT)
            .map(|p| Landmark::new(p.x, p.y))
            .collect();
        PoseFrame::new(landmarks, 0)
    }

    #[test]
    fn test_shape_mode_body_inside_outline_passes() {
        let mut game = shape_game();
        let frame = frame_against_target(&game, true);
        assert!(frame.landmarks.iter().all(|lm| lm.y < FLOOR_Y));

        game.tick(ms(4000), Some(&frame));
        assert_eq!(game.phase(), GamePhase::Success);
        assert_eq!(game.snapshot().last_match_score, 100);
    }

    #[test]
    fn test_shape_mode_body_outside_outline_fails() {
        let mut game = shape_game();
        let frame = frame_against_target(&game, false);

        game.tick(ms(4000), Some(&frame));
        assert_eq!(game.phase(), GamePhase::Fail);
        assert_eq!(game.player().lives, 2);
        assert_eq!(game.snapshot().last_match_score, 0);
    }

    #[test]
    fn test_shape_mode_short_skeleton_never_fits() {
        let mut game = shape_game();
        // Every point sits on the floor line, which would otherwise count as inside.
        let frame = PoseFrame::new(vec![Landmark::new(0.5, 0.97); 5], 0);
        assert!(!frame.has_pose());

        game.tick(ms(4000), Some(&frame));
        assert_eq!(game.phase(), GamePhase::Fail);
        assert_eq!(game.snapshot().last_match_score, 0);
    }

    #[test]
    fn test_shape_placement_respects_padding() {
        for seed in 0..25 {
            let config = GameConfig { mode: GameMode::Shape, seed: Some(seed), ..GameConfig::default() };
            let padding = config.placement_padding;
            let mut game = GameController::with_session(config, MemoryStore::default(), Uuid::nil()).unwrap();
            game.start_game().unwrap();
            game.skip_countdown().unwrap();

            let (min_x, max_x) = game.round().unwrap().target.shape().unwrap().horizontal_bounds();
            assert!(min_x >= padding - 1e-9, "seed {seed}: min_x {min_x}");
            assert!(max_x <= 1.0 - padding + 1e-9, "seed {seed}: max_x {max_x}");
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GameConfig { initial_lives: 0, ..GameConfig::default() };
        assert!(matches!(
            GameController::new(config, MemoryStore::default()),
            Err(GameError::Config(_))
        ));
    }

    #[test]
    fn test_same_inputs_same_hash() {
        let run = || {
            let mut game = controller(GameConfig::default());
            game.start_game().unwrap();
            for i in 0..200u64 {
                let frame = PoseFrame::new(vec![Landmark::new(0.5, 0.4); LANDMARK_COUNT], i * 33);
                game.tick(ms(33), Some(&frame));
            }
            game.snapshot().compute_hash()
        };
        assert_eq!(run(), run());
    }
}
