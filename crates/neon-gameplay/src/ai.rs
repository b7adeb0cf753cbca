//! Enemy and boss behavior.
//!
//! Enemies only act while the player is within aggro range. The boss runs a
//! fixed two-phase cycle on its own tick counter: hover and fire aimed shots,
//! then slam down and send out shockwaves.

use neon_common::{Color, EntityId, Rect, Vec2};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{BossConfig, EnemyConfig, GameplayConfig};
use crate::entity::{Entity, Facing};
use crate::spawn;
use crate::world::SpawnQueue;

/// Whether an enemy at `enemy_x` is close enough to the player to act.
#[must_use]
pub fn in_aggro_range(enemy_x: f32, player_x: f32, config: &EnemyConfig) -> bool {
    (player_x - enemy_x).abs() < config.aggro_range
}

/// Drone: drifts toward the player and bobs on a sine of the tick counter.
pub fn update_drone(drone: &mut Entity, player_x: f32, tick: u64, config: &EnemyConfig) {
    if !in_aggro_range(drone.rect.x, player_x, config) {
        return;
    }
    let dx = player_x - drone.rect.x;
    drone.rect.x += if dx > 0.0 {
        config.drone_drift
    } else {
        -config.drone_drift
    };
    drone.rect.y += (tick as f32 * config.drone_bob_frequency).sin() * config.drone_bob_amplitude;
}

/// Walker: steps toward the player under gravity.
pub fn update_walker(walker: &mut Entity, player_x: f32, gravity: f32, config: &EnemyConfig) {
    if !in_aggro_range(walker.rect.x, player_x, config) {
        return;
    }
    let dx = player_x - walker.rect.x;
    walker.velocity.x = if dx > 0.0 {
        config.walker_speed
    } else {
        -config.walker_speed
    };
    walker.rect.translate(walker.velocity);
    walker.velocity.y += gravity;
    walker.facing = Facing::toward(dx);
}

/// Boss behavior mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossPhase {
    /// Hovering and firing aimed shots
    Hover,
    /// Descending and sending shockwaves
    Slam,
}

impl BossPhase {
    /// Phase for a position in the cycle.
    #[must_use]
    pub fn at(timer: u32, config: &BossConfig) -> Self {
        if timer.checked_rem(config.cycle_frames).unwrap_or(timer) < config.hover_frames {
            Self::Hover
        } else {
            Self::Slam
        }
    }
}

/// Boss encounter sub-state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BossEncounter {
    /// The boss entity
    pub boss: EntityId,
    /// Ticks the boss has been updated
    pub timer: u32,
    /// Current phase
    pub phase: BossPhase,
    /// Boss bounds as of its latest update or hit
    pub last_rect: Rect,
}

impl BossEncounter {
    /// Starts an encounter with a freshly spawned boss.
    #[must_use]
    pub fn new(boss: &Entity) -> Self {
        Self {
            boss: boss.id(),
            timer: 0,
            phase: BossPhase::Hover,
            last_rect: boss.rect,
        }
    }

    /// Advances the boss by one tick. Returns the new phase when it changed.
    pub fn update(
        &mut self,
        boss: &mut Entity,
        player_center: Vec2,
        config: &GameplayConfig,
        queue: &mut SpawnQueue,
    ) -> Option<BossPhase> {
        let b = &config.boss;
        self.timer += 1;
        let phase = BossPhase::at(self.timer, b);
        let changed = (phase != self.phase).then_some(phase);
        if let Some(phase) = changed {
            debug!(timer = self.timer, ?phase, "Boss phase change");
        }
        self.phase = phase;

        match phase {
            BossPhase::Hover => {
                boss.rect.y = b.hover_y + (self.timer as f32 * b.hover_frequency).sin() * b.hover_amplitude;
                if self.timer.checked_rem(b.fire_interval) == Some(0) {
                    let shot = spawn::boss_shot(config, queue.next_id(), boss, player_center);
                    queue.push(shot);
                }
            },
            BossPhase::Slam => {
                if boss.rect.y < b.slam_y {
                    boss.rect.y = (boss.rect.y + b.slam_speed).min(b.slam_y);
                }
                if boss.rect.y >= b.slam_y && self.timer.checked_rem(b.shockwave_interval) == Some(0) {
                    let bottom = boss.rect.bottom();
                    for x in [boss.rect.x, boss.rect.right()] {
                        queue.particles(
                            config,
                            Vec2::new(x, bottom),
                            Color::Glitch,
                            b.shockwave_particles,
                        );
                    }
                }
            },
        }

        self.last_rect = boss.rect;
        changed
    }
}
