//! Scripted player for headless runs.
//!
//! Reads the latest snapshot and answers with key events, the same way a
//! keyboard collaborator would: hold right, jump over gaps and hazards,
//! fire on a fixed cadence, and confirm through menus and end screens.

use neon_gameplay::{EntityType, GameStatus, KeyCode, KeyEvent, Snapshot};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Autopilot tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutopilotConfig {
    /// Drive the game; when off the player only leaves the menu
    pub enabled: bool,
    /// Ticks between shots (0 = never fire)
    pub fire_interval: u64,
    /// How far past the player's leading edge to look for gaps and hazards
    pub look_ahead: f32,
    /// Ticks to linger on an end screen before confirming
    pub confirm_delay: u64,
    /// Restarts allowed after a game over before giving up
    pub max_restarts: u32,
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fire_interval: 15,
            look_ahead: 30.0,
            confirm_delay: 30,
            max_restarts: 3,
        }
    }
}

/// Autopilot state between ticks.
#[derive(Debug)]
pub struct Autopilot {
    config: AutopilotConfig,
    holding_right: bool,
    holding_jump: bool,
    /// Standing flickers on and off tick by tick, so count the last one too
    grounded_last_tick: bool,
    waited: u64,
    restarts: u32,
    gave_up: bool,
}

fn press(key: KeyCode) -> KeyEvent {
    KeyEvent { key, pressed: true }
}

fn release(key: KeyCode) -> KeyEvent {
    KeyEvent {
        key,
        pressed: false,
    }
}

impl Autopilot {
    /// Creates an autopilot.
    #[must_use]
    pub fn new(config: AutopilotConfig) -> Self {
        Self {
            config,
            holding_right: false,
            holding_jump: false,
            grounded_last_tick: false,
            waited: 0,
            restarts: 0,
            gave_up: false,
        }
    }

    /// Whether the autopilot has stopped confirming after too many game overs.
    #[must_use]
    pub fn gave_up(&self) -> bool {
        self.gave_up
    }

    /// Restarts performed so far.
    #[must_use]
    pub fn restarts(&self) -> u32 {
        self.restarts
    }

    /// Key events to send before the next tick.
    pub fn decide(&mut self, snapshot: &Snapshot) -> Vec<KeyEvent> {
        if !self.config.enabled || self.gave_up {
            return Vec::new();
        }
        match snapshot.status {
            GameStatus::Playing => self.play(snapshot),
            GameStatus::Menu => {
                self.release_all();
                vec![press(KeyCode::Enter), release(KeyCode::Enter)]
            },
            GameStatus::LevelComplete | GameStatus::GameOver => {
                self.release_all();
                self.waited += 1;
                if self.waited < self.config.confirm_delay {
                    return Vec::new();
                }
                self.waited = 0;
                if snapshot.status == GameStatus::GameOver {
                    if self.restarts >= self.config.max_restarts {
                        debug!(restarts = self.restarts, "Autopilot giving up");
                        self.gave_up = true;
                        return Vec::new();
                    }
                    self.restarts += 1;
                }
                vec![press(KeyCode::Enter), release(KeyCode::Enter)]
            },
        }
    }

    /// The game clears held keys whenever it leaves Playing.
    fn release_all(&mut self) {
        self.holding_right = false;
        self.holding_jump = false;
        self.grounded_last_tick = false;
    }

    fn play(&mut self, snapshot: &Snapshot) -> Vec<KeyEvent> {
        let mut events = Vec::new();
        if !self.holding_right {
            events.push(press(KeyCode::ArrowRight));
            self.holding_right = true;
        }

        let jump = self.should_jump(snapshot);
        if jump != self.holding_jump {
            events.push(KeyEvent {
                key: KeyCode::ArrowUp,
                pressed: jump,
            });
            self.holding_jump = jump;
        }

        let interval = self.config.fire_interval;
        if interval > 0 && snapshot.tick % interval == 0 {
            events.push(press(KeyCode::Z));
            events.push(release(KeyCode::Z));
        }
        events
    }

    fn should_jump(&mut self, snapshot: &Snapshot) -> bool {
        let Some(player) = snapshot.entities.first() else {
            return false;
        };
        let on_ground = player.player_state().is_some_and(|s| s.on_ground);
        let grounded = on_ground || self.grounded_last_tick;
        self.grounded_last_tick = on_ground;
        if !grounded {
            return false;
        }

        let front = player.rect.right();
        let probe = front + self.config.look_ahead;
        let feet = player.rect.bottom();

        let floor_ahead = snapshot.entities.iter().any(|e| {
            e.entity_type() == EntityType::Platform
                && e.rect.x <= probe
                && probe < e.rect.right()
                && (e.rect.y - feet).abs() <= 1.0
        });
        let hazard_ahead = snapshot.entities.iter().any(|e| {
            e.entity_type().is_hazard()
                && !e.is_marked_for_deletion()
                && e.rect.x >= front
                && e.rect.x <= probe
                && e.rect.y < feet
                && e.rect.bottom() > player.rect.y
        });
        !floor_ahead || hazard_ahead
    }
}
