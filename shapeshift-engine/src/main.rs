//! Shapeshift Engine
//!
//! Runs a simulated session: a scripted player stands in for the camera, the
//! game loop ticks at a fixed rate, and a renderer task follows snapshots.
//! The session is then replayed from its recording and the hashes compared.
//!
//! Usage: `shapeshift-engine [config.json]`. Set `SHAPESHIFT_SETTINGS` to a
//! path to persist the high score.

use std::path::Path;
use std::time::Duration;
use anyhow::{bail, Context};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use shapeshift::{
    Command, DeterministicRng, GameConfig, GameController, GamePhase, GameSnapshot,
    JsonSettingsStore, Landmark, MemoryStore, PoseFeed, ScoreStore, TrackingStatus, TICK_RATE,
    TRACKER_RATE, VERSION,
    game::{
        events::GameEventData,
        landmarks::LANDMARK_COUNT,
        replay::{replay_session, SessionRecording},
        state::Target,
    },
};

/// Longest demo session (two minutes of game time).
const MAX_TICKS: u64 = TICK_RATE as u64 * 120;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Shapeshift Engine v{}", VERSION);
    info!("Tick Rate: {} Hz, Tracker Rate: {} Hz", TICK_RATE, TRACKER_RATE);

    let config = match std::env::args().nth(1) {
        Some(path) => GameConfig::from_json_file(Path::new(&path))
            .with_context(|| format!("loading config from {path}"))?,
        None => GameConfig {
            seed: Some(12345),
            ..GameConfig::default()
        },
    };

    match std::env::var("SHAPESHIFT_SETTINGS") {
        Ok(path) => {
            let store = JsonSettingsStore::open(&path).with_context(|| format!("opening {path}"))?;
            demo_session(config, store).await
        }
        Err(_) => demo_session(config, MemoryStore::default()).await,
    }
}

/// Play one session with a scripted player, then verify it by replay.
async fn demo_session<S: ScoreStore + 'static>(config: GameConfig, store: S) -> anyhow::Result<()> {
    info!("=== Starting Demo Session ===");

    let mut game = GameController::new(config, store)?;
    let mut recording = SessionRecording::for_controller(&game);
    info!("Session ID: {}", game.session_id());
    info!("RNG Seed: {}", game.rng_seed());
    info!("Mode: {}", game.config().mode);

    let (mut feed, mut subscriber) = PoseFeed::channel();
    let (snapshot_tx, snapshot_rx) = watch::channel(game.snapshot());
    let renderer = tokio::spawn(render_loop(snapshot_rx));

    feed.set_status(TrackingStatus::Initializing);
    feed.set_status(TrackingStatus::Ready);

    for command in [Command::TrackerStatus(subscriber.status()), Command::StartGame] {
        game.apply(command)?;
        recording.push_command(command);
    }

    let mut player = ScriptedPlayer::new(0.75);
    let delta = Duration::from_secs_f64(1.0 / TICK_RATE as f64);
    let frames_every = u64::from((TICK_RATE / TRACKER_RATE).max(1));
    let mut total_events = 0;

    for t in 0..MAX_TICKS {
        if t % frames_every == 0 {
            let timestamp_ms = t * 1000 / TICK_RATE as u64;
            let landmarks = player.landmarks(&game.snapshot());
            feed.publish(landmarks, timestamp_ms);
        }

        let frame = subscriber.take_new();
        let result = game.tick(delta, frame.as_ref());
        recording.push_tick(delta, frame);
        total_events += result.events.len();

        for event in &result.events {
            match &event.data {
                GameEventData::RoundStarted { round, target_id, wall_speed_ms, .. } => {
                    info!("Round {} started: {} ({} ms wall)", round, target_id, wall_speed_ms);
                }
                GameEventData::RoundPassed { round, match_score, round_score, total_score } => {
                    info!("Round {} passed: match {}%, +{} (total {})", round, match_score, round_score, total_score);
                }
                GameEventData::RoundFailed { round, match_score, lives_left } => {
                    info!("Round {} failed: match {}%, {} lives left", round, match_score, lives_left);
                }
                GameEventData::CheckpointReached { level, name } => {
                    info!("Checkpoint {}: {}", level, name);
                }
                GameEventData::BonusLife { lives } => info!("Bonus life! Lives: {}", lives),
                GameEventData::GameOver { final_score, rounds_completed } => {
                    info!("Game over: {} points in {} rounds", final_score, rounds_completed);
                }
                _ => {}
            }
        }

        snapshot_tx.send_replace(game.snapshot());

        if result.game_over {
            info!("Session ended at tick {}", t);
            break;
        }
        tokio::task::yield_now().await;
    }

    if game.phase() != GamePhase::GameOver {
        warn!("Session still running after {} ticks, resetting", MAX_TICKS);
        game.reset_game();
        recording.push_command(Command::Reset);
        snapshot_tx.send_replace(game.snapshot());
    }

    drop(snapshot_tx);
    let rendered = renderer.await.context("renderer task failed")?;

    let snapshot = game.snapshot();
    let hash = snapshot.compute_hash();

    info!("=== Session Results ===");
    info!("Score: {}  High Score: {}", snapshot.player.score, snapshot.player.high_score);
    info!("Rounds: {}", snapshot.player.round);
    info!("Total events: {}", total_events);
    info!("Snapshots rendered: {}", rendered);
    info!("Final State Hash: {}", hex::encode(hash));

    info!("=== Verifying Determinism ===");
    let bytes = recording.to_bytes()?;
    info!("Recording: {} ticks, {} bytes", recording.tick_count(), bytes.len());

    let restored = SessionRecording::from_bytes(&bytes)?;
    let replay = replay_session(&restored)?;
    info!("Replay State Hash: {}", hex::encode(replay.hash));

    if replay.hash != hash {
        bail!("DETERMINISM FAILURE: Hashes differ!");
    }
    info!("DETERMINISM VERIFIED: Hashes match!");
    Ok(())
}

/// Follows published snapshots the way a UI would. Returns how many it saw.
async fn render_loop(mut rx: watch::Receiver<GameSnapshot>) -> u64 {
    let mut seen = 0;
    let mut last_phase = GamePhase::Menu;

    while rx.changed().await.is_ok() {
        let snapshot = rx.borrow_and_update().clone();
        seen += 1;

        if snapshot.phase != last_phase {
            debug!(
                phase = %snapshot.phase,
                lives = snapshot.player.lives,
                score = snapshot.player.score,
                "render phase"
            );
            last_phase = snapshot.phase;
        }
    }
    seen
}

/// Stand-in for a person in front of the camera.
///
/// Each round it decides once whether it will get the target right, then
/// holds either a close copy of the target or something clearly wrong.
struct ScriptedPlayer {
    rng: DeterministicRng,
    accuracy: f64,
    decided: Option<(u32, bool)>,
}

impl ScriptedPlayer {
    fn new(accuracy: f64) -> Self {
        Self {
            rng: DeterministicRng::new(99),
            accuracy,
            decided: None,
        }
    }

    fn landmarks(&mut self, snapshot: &GameSnapshot) -> Vec<Landmark> {
        let round = match (&snapshot.round, snapshot.phase) {
            (Some(round), GamePhase::Playing) => round,
            _ => return standing_pose(),
        };

        let succeed = match self.decided {
            Some((number, succeed)) if number == round.number => succeed,
            _ => {
                let succeed = self.rng.next_bool(self.accuracy);
                self.decided = Some((round.number, succeed));
                succeed
            }
        };

        match (&round.target, succeed) {
            (Target::Pose(pose), true) => pose
                .landmarks
                .iter()
                .map(|lm| Landmark {
                    x: lm.x + self.rng.next_f64_range(-0.01, 0.01),
                    y: lm.y + self.rng.next_f64_range(-0.01, 0.01),
                    ..*lm
                })
                .collect(),
            (Target::Shape(_), true) => {
                // Crouched at the floor line fits every outline.
                (0..LANDMARK_COUNT)
                    .map(|i| Landmark::new(0.3 + 0.4 * i as f64 / LANDMARK_COUNT as f64, 0.96))
                    .collect()
            }
            _ => standing_pose()
                .into_iter()
                .map(|lm| Landmark { x: lm.x * 1.6 - 0.3, ..lm })
                .collect(),
        }
    }
}

/// Arms-down standing skeleton.
fn standing_pose() -> Vec<Landmark> {
    (0..LANDMARK_COUNT)
        .map(|i| {
            let side = if i % 2 == 0 { 0.42 } else { 0.58 };
            let height = 0.1 + 0.8 * i as f64 / LANDMARK_COUNT as f64;
            Landmark::new(side, height)
        })
        .collect()
}
