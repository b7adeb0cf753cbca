//! Headless run loop.
//!
//! Leaves the menu, then alternates autopilot input and simulation ticks
//! until the tick budget runs out or the autopilot gives up, tallying the
//! gameplay events along the way.

use neon_gameplay::{GameEvent, GameState, GameStatus, PlayerForm, Snapshot};
use tracing::{debug, info, warn};

use crate::autopilot::Autopilot;
use crate::config::EngineConfig;
use crate::timing::FramePacer;

/// Outcome of a headless run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Seed the levels were generated from
    pub seed: u64,
    /// Ticks simulated
    pub ticks: u64,
    /// Level on the last tick
    pub level: u32,
    /// Levels finished through a portal
    pub levels_completed: u32,
    /// Game overs
    pub game_overs: u32,
    /// Bosses defeated
    pub bosses_defeated: u32,
    /// Hazards destroyed
    pub kills: u32,
    /// Shots fired
    pub shots: u32,
    /// Final score
    pub score: u64,
    /// Final player hit points
    pub hp: i32,
    /// Final player form
    pub form: PlayerForm,
    /// Final status
    pub status: GameStatus,
    /// Final snapshot
    pub snapshot: Snapshot,
}

#[derive(Debug, Default)]
struct Tally {
    levels_completed: u32,
    game_overs: u32,
    bosses_defeated: u32,
    kills: u32,
    shots: u32,
}

impl Tally {
    fn record(&mut self, event: &GameEvent) {
        match event {
            GameEvent::StatusChanged { from, to } => {
                info!(?from, ?to, "Status");
                match to {
                    GameStatus::LevelComplete => self.levels_completed += 1,
                    GameStatus::GameOver => self.game_overs += 1,
                    GameStatus::Menu | GameStatus::Playing => {},
                }
            },
            GameEvent::BossDefeated { .. } => self.bosses_defeated += 1,
            GameEvent::HazardDestroyed { .. } => self.kills += 1,
            GameEvent::ShotFired { .. } => self.shots += 1,
            GameEvent::BossPhaseChanged { phase } => debug!(?phase, "Boss phase"),
            GameEvent::LevelGenerated { .. }
            | GameEvent::PlayerDamaged { .. }
            | GameEvent::FormGained { .. }
            | GameEvent::FormLost { .. } => {},
        }
    }
}

/// Runs the game headless with the given seed.
pub fn run(config: &EngineConfig, seed: u64) -> RunSummary {
    let mut game = GameState::new(config.gameplay.clone(), seed);
    let input = game.input_sender();
    let mut autopilot = Autopilot::new(config.autopilot.clone());
    let mut pacer = config.target_fps.map(FramePacer::new);
    let mut tally = Tally::default();

    game.confirm();
    if config.start_level != 1 {
        game.reset_level(config.start_level);
    }
    if let Some(pacer) = pacer.as_mut() {
        pacer.reset();
    }

    let mut ticks = 0;
    while ticks < config.max_ticks {
        for event in autopilot.decide(&game.snapshot()) {
            if !input.send(event) {
                warn!("Input channel closed");
            }
        }
        if autopilot.gave_up() {
            info!(restarts = autopilot.restarts(), "Autopilot stopped");
            break;
        }

        game.update();
        ticks += 1;
        for event in game.drain_events() {
            tally.record(&event);
        }

        if let Some(pacer) = pacer.as_mut() {
            pacer.finish_frame();
        }
    }

    if let Some(pacer) = &pacer {
        info!(
            fps = pacer.current_fps(),
            frame_ms = pacer.average_frame_time_ms(),
            target = pacer.target_fps(),
            "Pacing"
        );
    }

    let snapshot = game.snapshot();
    RunSummary {
        seed,
        ticks,
        level: snapshot.level,
        levels_completed: tally.levels_completed,
        game_overs: tally.game_overs,
        bosses_defeated: tally.bosses_defeated,
        kills: tally.kills,
        shots: tally.shots,
        score: snapshot.score,
        hp: snapshot.player_hp,
        form: snapshot.player_form,
        status: snapshot.status,
        snapshot,
    }
}
