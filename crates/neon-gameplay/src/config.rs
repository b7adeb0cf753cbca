//! Gameplay tuning.
//!
//! Every constant the simulation uses lives here, grouped by subsystem. The
//! defaults reproduce the arcade tuning; hosts may load overrides from
//! a config file and must call [`GameplayConfig::validate`] before use.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by configuration validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A value must be strictly positive
    #[error("{field} must be greater than zero (got {value})")]
    NotPositive {
        /// Dotted field path
        field: &'static str,
        /// Offending value
        value: f64,
    },
    /// A probability must be within 0..=1
    #[error("{field} must be a probability in 0..=1 (got {value})")]
    NotProbability {
        /// Dotted field path
        field: &'static str,
        /// Offending value
        value: f32,
    },
    /// A min/max pair is inverted
    #[error("{field} range is empty: min {min} > max {max}")]
    EmptyRange {
        /// Dotted field path
        field: &'static str,
        /// Lower bound
        min: f32,
        /// Upper bound
        max: f32,
    },
}

/// Player movement and world physics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration per tick
    pub gravity: f32,
    /// Multiplier applied to gravity in Flight form
    pub flight_gravity_scale: f32,
    /// Upward velocity added per tick while Flight thrust is held
    pub flight_thrust: f32,
    /// Horizontal velocity gained per tick of held direction
    pub acceleration: f32,
    /// Horizontal velocity multiplier applied every tick
    pub friction: f32,
    /// Horizontal speed cap
    pub max_speed: f32,
    /// Vertical velocity set by a grounded jump (negative is up)
    pub jump_velocity: f32,
    /// Anything whose top edge passes below this y has fallen out of the world
    pub fall_depth: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 0.5,
            flight_gravity_scale: 0.2,
            flight_thrust: 1.0,
            acceleration: 1.0,
            friction: 0.8,
            max_speed: 5.0,
            jump_velocity: -12.0,
            fall_depth: 800.0,
        }
    }
}

/// Player avatar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Hitbox width
    pub width: f32,
    /// Hitbox height
    pub height: f32,
    /// Spawn position (top-left)
    pub spawn: (f32, f32),
    /// Starting and maximum hit points
    pub max_hp: i32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            width: 30.0,
            height: 48.0,
            spawn: (50.0, 400.0),
            max_hp: 100,
        }
    }
}

/// Damage, projectiles and particles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Hit points lost per hazard contact
    pub contact_damage: i32,
    /// Velocity applied to the player on contact (x is away from facing)
    pub knockback: (f32, f32),
    /// Damage dealt by a player shot
    pub bullet_damage: i32,
    /// Damage dealt by a player shot in Tank form
    pub tank_bullet_damage: i32,
    /// Horizontal speed of player shots
    pub bullet_speed: f32,
    /// Shot size (width, height)
    pub bullet_size: (f32, f32),
    /// Shot width in Tank form
    pub tank_bullet_width: f32,
    /// Shot spawn offset below the player's top edge
    pub bullet_muzzle_y: f32,
    /// Score awarded for destroying a hazard with a shot
    pub kill_score: u64,
    /// Ticks a projectile survives before expiring
    pub projectile_lifetime: u32,
    /// Particle life lost per tick (life starts at 1.0)
    pub particle_decay: f32,
    /// Particle edge length
    pub particle_size: f32,
    /// Maximum absolute particle speed per axis
    pub particle_spread: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            contact_damage: 1,
            knockback: (-10.0, -5.0),
            bullet_damage: 5,
            tank_bullet_damage: 10,
            bullet_speed: 12.0,
            bullet_size: (10.0, 6.0),
            tank_bullet_width: 20.0,
            bullet_muzzle_y: 15.0,
            kill_score: 100,
            projectile_lifetime: 100,
            particle_decay: 0.05,
            particle_size: 4.0,
            particle_spread: 5.0,
        }
    }
}

/// Regular enemies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Horizontal distance within which enemies act
    pub aggro_range: f32,
    /// Hit points
    pub hp: i32,
    /// Drone hitbox
    pub drone_size: (f32, f32),
    /// Walker hitbox
    pub walker_size: (f32, f32),
    /// Drone horizontal drift per tick
    pub drone_drift: f32,
    /// Drone vertical bob amplitude per tick
    pub drone_bob_amplitude: f32,
    /// Drone bob phase advance per tick (radians)
    pub drone_bob_frequency: f32,
    /// Walker horizontal speed
    pub walker_speed: f32,
    /// Spawn offset from the platform's top-left corner
    pub spawn_offset: (f32, f32),
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            aggro_range: 400.0,
            hp: 30,
            drone_size: (30.0, 20.0),
            walker_size: (30.0, 40.0),
            drone_drift: 1.0,
            drone_bob_amplitude: 1.0,
            drone_bob_frequency: 0.083,
            walker_speed: 1.0,
            spawn_offset: (20.0, -40.0),
        }
    }
}

/// Boss encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossConfig {
    /// Hit points
    pub hp: i32,
    /// Hitbox edge length
    pub size: f32,
    /// Horizontal offset of the boss from the level end
    pub arena_offset: f32,
    /// Length of one full behavior cycle in ticks
    pub cycle_frames: u32,
    /// Ticks of each cycle spent hovering (the rest is the slam)
    pub hover_frames: u32,
    /// Baseline y while hovering
    pub hover_y: f32,
    /// Hover oscillation amplitude
    pub hover_amplitude: f32,
    /// Hover phase advance per tick (radians)
    pub hover_frequency: f32,
    /// Ticks between aimed shots while hovering
    pub fire_interval: u32,
    /// Aimed shot speed
    pub projectile_speed: f32,
    /// Aimed shot edge length
    pub projectile_size: f32,
    /// y the slam descends to
    pub slam_y: f32,
    /// Descent per tick during the slam
    pub slam_speed: f32,
    /// Ticks between shockwave bursts once landed
    pub shockwave_interval: u32,
    /// Particles per shockwave burst edge
    pub shockwave_particles: usize,
}

impl Default for BossConfig {
    fn default() -> Self {
        Self {
            hp: 500,
            size: 120.0,
            arena_offset: 400.0,
            cycle_frames: 200,
            hover_frames: 100,
            hover_y: 200.0,
            hover_amplitude: 50.0,
            hover_frequency: 0.05,
            fire_interval: 60,
            projectile_speed: 8.0,
            projectile_size: 15.0,
            slam_y: 450.0,
            slam_speed: 10.0,
            shockwave_interval: 10,
            shockwave_particles: 20,
        }
    }
}

/// Procedural level layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Ground tile edge length
    pub tile_size: f32,
    /// y of the ground line (top of ground tiles)
    pub ground_y: f32,
    /// Level length for level 0
    pub base_length: f32,
    /// Extra length per level number
    pub length_per_level: f32,
    /// Chance that a ground tile is left out
    pub gap_chance: f32,
    /// Distance from either end of the level where gaps are never placed
    pub gap_margin: f32,
    /// x of the first feature stop
    pub features_start: f32,
    /// Features stop this far before the level end
    pub features_end_margin: f32,
    /// Minimum advance between feature stops
    pub step_min: f32,
    /// Maximum advance between feature stops
    pub step_max: f32,
    /// Chance a stop emits a floating platform
    pub platform_chance: f32,
    /// Chance a stop emits a spike (checked after the platform roll)
    pub spike_chance: f32,
    /// Chance a platform carries an enemy
    pub enemy_chance: f32,
    /// Chance a stop also emits a powerup
    pub powerup_chance: f32,
    /// Floating platform size
    pub platform_size: (f32, f32),
    /// Minimum height of a floating platform above the ground line
    pub platform_min_rise: f32,
    /// Random extra height above the minimum
    pub platform_rise_range: f32,
    /// Spike size
    pub spike_size: (f32, f32),
    /// Powerup edge length
    pub powerup_size: f32,
    /// Powerup height above the ground line
    pub powerup_rise: f32,
    /// Every Nth level is a boss level
    pub boss_interval: u32,
    /// Width of the boss arena floor
    pub arena_width: f32,
    /// Portal size
    pub portal_size: (f32, f32),
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            tile_size: 40.0,
            ground_y: 500.0,
            base_length: 2000.0,
            length_per_level: 500.0,
            gap_chance: 0.1,
            gap_margin: 300.0,
            features_start: 300.0,
            features_end_margin: 500.0,
            step_min: 100.0,
            step_max: 200.0,
            platform_chance: 0.3,
            spike_chance: 0.1,
            enemy_chance: 0.5,
            powerup_chance: 0.05,
            platform_size: (100.0, 20.0),
            platform_min_rise: 80.0,
            platform_rise_range: 150.0,
            spike_size: (40.0, 20.0),
            powerup_size: 20.0,
            powerup_rise: 150.0,
            boss_interval: 3,
            arena_width: 800.0,
            portal_size: (60.0, 80.0),
        }
    }
}

impl LevelConfig {
    /// Length of the playable strip for a level number.
    #[must_use]
    pub fn length_for(&self, level_number: u32) -> f32 {
        self.base_length + self.length_per_level * level_number as f32
    }

    /// Whether a level number ends in a boss arena. A zero interval means
    /// no boss levels.
    #[must_use]
    pub fn is_boss_level(&self, level_number: u32) -> bool {
        level_number.checked_rem(self.boss_interval) == Some(0)
    }
}

/// Camera follow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Visible width; the player sits one third in from the left
    pub viewport_width: f32,
    /// Target distance of the camera top above the player
    pub vertical_offset: f32,
    /// Fraction of the vertical error closed each tick
    pub smoothing: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            viewport_width: 800.0,
            vertical_offset: 300.0,
            smoothing: 0.1,
        }
    }
}

/// Complete gameplay configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplayConfig {
    /// Movement and gravity
    pub physics: PhysicsConfig,
    /// Player avatar
    pub player: PlayerConfig,
    /// Damage, shots and particles
    pub combat: CombatConfig,
    /// Regular enemies
    pub enemies: EnemyConfig,
    /// Boss encounter
    pub boss: BossConfig,
    /// Level layout
    pub level: LevelConfig,
    /// Camera follow
    pub camera: CameraConfig,
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn probability(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::NotProbability { field, value })
    }
}

impl GameplayConfig {
    /// Checks the values the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.player;
        positive("player.width", f64::from(p.width))?;
        positive("player.height", f64::from(p.height))?;
        positive("player.max_hp", f64::from(p.max_hp))?;

        let c = &self.combat;
        positive("combat.projectile_lifetime", f64::from(c.projectile_lifetime))?;
        positive("combat.particle_decay", f64::from(c.particle_decay))?;

        let e = &self.enemies;
        positive("enemies.hp", f64::from(e.hp))?;

        let b = &self.boss;
        positive("boss.hp", f64::from(b.hp))?;
        positive("boss.size", f64::from(b.size))?;
        positive("boss.cycle_frames", f64::from(b.cycle_frames))?;
        positive("boss.fire_interval", f64::from(b.fire_interval))?;
        positive("boss.shockwave_interval", f64::from(b.shockwave_interval))?;
        if b.hover_frames > b.cycle_frames {
            return Err(ConfigError::EmptyRange {
                field: "boss.hover_frames",
                min: b.hover_frames as f32,
                max: b.cycle_frames as f32,
            });
        }

        let l = &self.level;
        positive("level.tile_size", f64::from(l.tile_size))?;
        positive("level.boss_interval", f64::from(l.boss_interval))?;
        positive("level.step_min", f64::from(l.step_min))?;
        if l.step_min > l.step_max {
            return Err(ConfigError::EmptyRange {
                field: "level.step",
                min: l.step_min,
                max: l.step_max,
            });
        }
        probability("level.gap_chance", l.gap_chance)?;
        probability("level.platform_chance", l.platform_chance)?;
        probability("level.spike_chance", l.spike_chance)?;
        probability("level.enemy_chance", l.enemy_chance)?;
        probability("level.powerup_chance", l.powerup_chance)?;
        if l.platform_chance + l.spike_chance > 1.0 {
            return Err(ConfigError::NotProbability {
                field: "level.platform_chance + level.spike_chance",
                value: l.platform_chance + l.spike_chance,
            });
        }

        positive("camera.viewport_width", f64::from(self.camera.viewport_width))?;
        Ok(())
    }
}
