//! Procedural level generation.
//!
//! A level is a ground strip with occasional gaps, floating platforms (some
//! carrying enemies), spikes and powerups scattered along it, and either an
//! exit portal or a boss arena past its end.

use neon_common::{Color, EntityId, EntityIdAllocator};
use tracing::debug;

use crate::config::GameplayConfig;
use crate::entity::{Entity, EntityType};
use crate::spawn::{self, EnemyVariant};

/// Freshly generated level contents.
#[derive(Debug, Clone)]
pub struct Level {
    /// Level number this was generated for
    pub number: u32,
    /// Length of the playable strip
    pub length: f32,
    /// The player, at the spawn point
    pub player: Entity,
    /// Everything else
    pub entities: Vec<Entity>,
    /// The boss, on boss levels
    pub boss: Option<EntityId>,
}

impl Level {
    /// Counts non-player entities of a type.
    #[must_use]
    pub fn count(&self, entity_type: EntityType) -> usize {
        self.entities
            .iter()
            .filter(|e| e.entity_type() == entity_type)
            .count()
    }
}

/// Builds levels from the gameplay configuration.
#[derive(Debug, Clone, Copy)]
pub struct LevelGenerator<'a> {
    config: &'a GameplayConfig,
}

impl<'a> LevelGenerator<'a> {
    /// Creates a generator.
    #[must_use]
    pub const fn new(config: &'a GameplayConfig) -> Self {
        Self { config }
    }

    /// Generates a level. Layout shape is fixed; content is drawn from `rng`.
    pub fn generate(
        &self,
        number: u32,
        ids: &mut EntityIdAllocator,
        rng: &mut fastrand::Rng,
    ) -> Level {
        let l = &self.config.level;
        let length = l.length_for(number);
        let boss_level = l.is_boss_level(number);

        let player = spawn::player(self.config, ids.allocate());
        let mut entities = Vec::new();

        let gaps = self.lay_ground(length, ids, rng, &mut entities);
        self.scatter_features(length, boss_level, ids, rng, &mut entities);

        let boss = if boss_level {
            Some(self.build_arena(length, ids, &mut entities))
        } else {
            entities.push(spawn::portal(self.config, ids.allocate(), length));
            None
        };

        debug!(
            level = number,
            length,
            gaps,
            entities = entities.len(),
            boss = boss_level,
            "Generated level"
        );

        Level {
            number,
            length,
            player,
            entities,
            boss,
        }
    }

    /// Lays ground tiles from 0 to `length`, leaving random gaps away from
    /// both ends. Returns the number of gaps.
    fn lay_ground(
        &self,
        length: f32,
        ids: &mut EntityIdAllocator,
        rng: &mut fastrand::Rng,
        out: &mut Vec<Entity>,
    ) -> usize {
        let l = &self.config.level;
        let mut gaps = 0;
        let mut x = 0.0;
        while x < length {
            let gap = rng.f32() < l.gap_chance && x > l.gap_margin && x < length - l.gap_margin;
            if gap {
                gaps += 1;
            } else {
                out.push(spawn::ground_tile(self.config, ids.allocate(), x, Color::Purple));
            }
            x += l.tile_size;
        }
        gaps
    }

    fn scatter_features(
        &self,
        length: f32,
        boss_level: bool,
        ids: &mut EntityIdAllocator,
        rng: &mut fastrand::Rng,
        out: &mut Vec<Entity>,
    ) {
        let l = &self.config.level;
        let mut x = l.features_start;
        while x < length - l.features_end_margin {
            let roll = rng.f32();
            if roll < l.platform_chance {
                let y = l.ground_y - l.platform_min_rise - rng.f32() * l.platform_rise_range;
                out.push(spawn::floating_platform(self.config, ids.allocate(), x, y));

                if rng.f32() < l.enemy_chance && !boss_level {
                    let variant = if rng.bool() {
                        EnemyVariant::Drone
                    } else {
                        EnemyVariant::GlitchWalker
                    };
                    out.push(spawn::enemy(self.config, ids.allocate(), variant, x, y));
                }
            } else if roll < l.platform_chance + l.spike_chance {
                out.push(spawn::spike(self.config, ids.allocate(), x));
            }

            if rng.f32() < l.powerup_chance {
                out.push(spawn::powerup(self.config, ids.allocate(), x));
            }

            x += l.step_min + rng.f32() * (l.step_max - l.step_min);
        }
    }

    /// Floors the arena past the level end and places the boss.
    fn build_arena(
        &self,
        length: f32,
        ids: &mut EntityIdAllocator,
        out: &mut Vec<Entity>,
    ) -> EntityId {
        let l = &self.config.level;
        let mut offset = 0.0;
        while offset < l.arena_width {
            out.push(spawn::ground_tile(
                self.config,
                ids.allocate(),
                length + offset,
                Color::Glitch,
            ));
            offset += l.tile_size;
        }
        let boss = spawn::boss(self.config, ids.allocate(), length);
        let id = boss.id();
        out.push(boss);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn generate(config: &GameplayConfig, number: u32, seed: u64) -> Level {
        let mut ids = EntityIdAllocator::new();
        let mut rng = fastrand::Rng::with_seed(seed);
        LevelGenerator::new(config).generate(number, &mut ids, &mut rng)
    }

    #[test]
    fn test_regular_level_has_portal_and_no_boss() {
        let config = GameplayConfig::default();
        let level = generate(&config, 1, 42);
        assert_eq!(level.count(EntityType::Portal), 1);
        assert_eq!(level.count(EntityType::Boss), 0);
        assert!(level.boss.is_none());
        assert_eq!(level.length, 2500.0);
    }

    #[test]
    fn test_boss_level_has_boss_and_no_portal() {
        let config = GameplayConfig::default();
        let level = generate(&config, 3, 42);
        assert_eq!(level.count(EntityType::Portal), 0);
        assert_eq!(level.count(EntityType::Boss), 1);
        let boss_id = level.boss.expect("boss level should have a boss");
        let boss = level
            .entities
            .iter()
            .find(|e| e.id() == boss_id)
            .expect("boss should be in the entity list");
        assert_eq!(boss.hp(), 500);
        assert_eq!(boss.rect.x, 3500.0 + 400.0);
    }

    #[test]
    fn test_boss_level_has_no_enemies() {
        let config = GameplayConfig::default();
        for seed in 0..20 {
            let level = generate(&config, 6, seed);
            assert_eq!(level.count(EntityType::EnemyDrone), 0);
            assert_eq!(level.count(EntityType::EnemyGlitchWalker), 0);
        }
    }

    #[test]
    fn test_arena_floor_is_solid() {
        let config = GameplayConfig::default();
        let level = generate(&config, 3, 9);
        let arena_tiles = level
            .entities
            .iter()
            .filter(|e| e.entity_type() == EntityType::Platform && e.rect.x >= level.length)
            .count();
        assert_eq!(arena_tiles, 20);
    }

    #[test]
    fn test_gaps_never_near_ends() {
        let config = GameplayConfig::default();
        let mut forced = config.clone();
        forced.level.gap_chance = 1.0;
        let level = generate(&forced, 1, 1);
        let ground: Vec<f32> = level
            .entities
            .iter()
            .filter(|e| e.entity_type() == EntityType::Platform && e.rect.y == 500.0)
            .map(|e| e.rect.x)
            .collect();
        assert!(ground.iter().all(|&x| x <= 300.0 || x >= 2200.0));
        assert!(ground.contains(&0.0));
        assert!(ground.contains(&2480.0));
    }

    #[test]
    fn test_same_seed_same_layout() {
        let config = GameplayConfig::default();
        let a = generate(&config, 2, 1234);
        let b = generate(&config, 2, 1234);
        assert_eq!(a.entities, b.entities);
    }

    #[test]
    fn test_player_at_spawn() {
        let config = GameplayConfig::default();
        let level = generate(&config, 1, 5);
        assert_eq!(level.player.rect.x, 50.0);
        assert_eq!(level.player.rect.y, 400.0);
        assert_eq!(level.count(EntityType::Player), 0);
    }

    proptest! {
        #[test]
        fn prop_terminal_feature_matches_level(number in 1u32..12, seed in any::<u64>()) {
            let config = GameplayConfig::default();
            let level = generate(&config, number, seed);
            prop_assert!(level.count(EntityType::Boss) <= 1);
            if number % 3 == 0 {
                prop_assert_eq!(level.count(EntityType::Boss), 1);
                prop_assert_eq!(level.count(EntityType::Portal), 0);
            } else {
                prop_assert_eq!(level.count(EntityType::Boss), 0);
                prop_assert_eq!(level.count(EntityType::Portal), 1);
            }
        }

        #[test]
        fn prop_features_inside_bounds(number in 1u32..8, seed in any::<u64>()) {
            let config = GameplayConfig::default();
            let level = generate(&config, number, seed);
            for e in &level.entities {
                match e.entity_type() {
                    EntityType::Spike | EntityType::Powerup => {
                        prop_assert!(e.rect.x >= 300.0);
                        prop_assert!(e.rect.x < level.length - 500.0);
                    }
                    _ => {}
                }
            }
        }
    }
}
