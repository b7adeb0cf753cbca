//! World state owned by the game: entities, player, boss encounter, camera.
//!
//! Entities spawned or destroyed while a tick is in progress are buffered in
//! the [`SpawnQueue`] and by deletion flags, then applied together by
//! [`World::flush`] at the end of the tick.

use neon_common::{Color, EntityId, EntityIdAllocator, Vec2};
use serde::{Deserialize, Serialize};

use crate::ai::{self, BossEncounter, BossPhase};
use crate::config::GameplayConfig;
use crate::entity::{Entity, EntityArena, EntityKind, EntityType, PlayerForm};
use crate::input::InputState;
use crate::level::LevelGenerator;
use crate::physics;
use crate::spawn;

/// Entities waiting to join the world, plus the ID and random sources used
/// to create them.
#[derive(Debug, Clone)]
pub struct SpawnQueue {
    ids: EntityIdAllocator,
    rng: fastrand::Rng,
    pending: Vec<Entity>,
}

impl SpawnQueue {
    /// Creates a queue with a seeded random source.
    #[must_use]
    pub fn new(ids: EntityIdAllocator, seed: u64) -> Self {
        Self {
            ids,
            rng: fastrand::Rng::with_seed(seed),
            pending: Vec::new(),
        }
    }

    /// Allocates an entity ID.
    pub fn next_id(&mut self) -> EntityId {
        self.ids.allocate()
    }

    /// Buffers an entity for the end of the tick.
    pub fn push(&mut self, entity: Entity) {
        self.pending.push(entity);
    }

    /// Buffers a particle burst.
    pub fn particles(&mut self, config: &GameplayConfig, at: Vec2, color: Color, count: usize) {
        let burst = spawn::particle_burst(config, &mut self.ids, &mut self.rng, at, color, count);
        self.pending.extend(burst);
    }

    /// Shared random source.
    pub fn rng(&mut self) -> &mut fastrand::Rng {
        &mut self.rng
    }

    /// Entities buffered so far.
    #[must_use]
    pub fn pending(&self) -> &[Entity] {
        &self.pending
    }

    /// Takes the buffered entities.
    pub fn take(&mut self) -> Vec<Entity> {
        std::mem::take(&mut self.pending)
    }

    /// Drops buffered entities.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

/// Camera top-left corner in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Camera {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
}

impl Camera {
    /// Camera x for a player x.
    #[must_use]
    pub fn target_x(player_x: f32, config: &GameplayConfig) -> f32 {
        player_x - config.camera.viewport_width / 3.0
    }

    /// Camera y the follow converges to for a player y.
    #[must_use]
    pub fn target_y(player_y: f32, config: &GameplayConfig) -> f32 {
        player_y - config.camera.vertical_offset
    }

    /// Tracks the player horizontally and eases toward it vertically.
    pub fn follow(&mut self, player: &Entity, config: &GameplayConfig) {
        self.x = Self::target_x(player.rect.x, config);
        self.y += (Self::target_y(player.rect.y, config) - self.y) * config.camera.smoothing;
    }

    /// Jumps straight to the player.
    pub fn snap(&mut self, player: &Entity, config: &GameplayConfig) {
        self.x = Self::target_x(player.rect.x, config);
        self.y = Self::target_y(player.rect.y, config);
    }
}

/// All simulated state for the current level.
#[derive(Debug, Clone)]
pub struct World {
    pub(crate) level: u32,
    pub(crate) length: f32,
    pub(crate) player: Entity,
    pub(crate) entities: EntityArena,
    pub(crate) boss: Option<BossEncounter>,
    pub(crate) camera: Camera,
    pub(crate) queue: SpawnQueue,
}

impl World {
    /// Generates level `number` with a seeded random source.
    #[must_use]
    pub fn new(config: &GameplayConfig, number: u32, seed: u64) -> Self {
        let mut queue = SpawnQueue::new(EntityIdAllocator::new(), seed);
        let level = LevelGenerator::new(config).generate(number, &mut queue.ids, &mut queue.rng);
        let mut world = Self {
            level: number,
            length: level.length,
            player: level.player,
            entities: EntityArena::new(),
            boss: None,
            camera: Camera::default(),
            queue,
        };
        world.install(config, level.entities, level.boss);
        world
    }

    /// Replaces every entity with a freshly generated level. IDs and the
    /// random source carry on from the previous level.
    pub fn regenerate(&mut self, config: &GameplayConfig, number: u32) {
        let level =
            LevelGenerator::new(config).generate(number, &mut self.queue.ids, &mut self.queue.rng);
        self.level = number;
        self.length = level.length;
        self.player = level.player;
        self.queue.clear();
        self.install(config, level.entities, level.boss);
    }

    fn install(&mut self, config: &GameplayConfig, entities: Vec<Entity>, boss: Option<EntityId>) {
        self.entities.clear();
        self.entities.extend(entities);
        self.boss = boss
            .and_then(|id| self.entities.get(id).ok())
            .map(BossEncounter::new);
        self.camera.snap(&self.player, config);
    }

    /// Level number.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Length of the playable strip.
    #[must_use]
    pub const fn length(&self) -> f32 {
        self.length
    }

    /// The player. Always present.
    #[must_use]
    pub const fn player(&self) -> &Entity {
        &self.player
    }

    /// Mutable player.
    pub fn player_mut(&mut self) -> &mut Entity {
        &mut self.player
    }

    /// Non-player entities.
    #[must_use]
    pub const fn entities(&self) -> &EntityArena {
        &self.entities
    }

    /// Mutable non-player entities.
    pub fn entities_mut(&mut self) -> &mut EntityArena {
        &mut self.entities
    }

    /// Player followed by every other entity, in stable order.
    pub fn iter_all(&self) -> impl Iterator<Item = &Entity> {
        std::iter::once(&self.player).chain(self.entities.iter())
    }

    /// Boss encounter, if a boss is alive.
    #[must_use]
    pub const fn boss(&self) -> Option<&BossEncounter> {
        self.boss.as_ref()
    }

    /// Camera.
    #[must_use]
    pub const fn camera(&self) -> Camera {
        self.camera
    }

    /// Spawn queue for buffering new entities.
    pub fn queue_mut(&mut self) -> &mut SpawnQueue {
        &mut self.queue
    }

    /// Spawns a player shot at the end of the tick.
    pub fn queue_player_shot(&mut self, config: &GameplayConfig) -> EntityId {
        let shot = spawn::player_shot(config, self.queue.next_id(), &self.player);
        let id = shot.id();
        self.queue.push(shot);
        id
    }

    /// Sets the player's form.
    pub fn set_player_form(&mut self, form: PlayerForm) {
        if let Some(state) = self.player.player_state_mut() {
            state.form = form;
        }
    }

    /// Runs input, physics and AI for one tick. Returns a boss phase change.
    pub fn update_entities(
        &mut self,
        config: &GameplayConfig,
        input: &InputState,
        tick: u64,
    ) -> Option<BossPhase> {
        physics::apply_input(&mut self.player, input, &config.physics);
        physics::integrate_player(&mut self.player, &config.physics);

        let player_x = self.player.rect.x;
        let player_center = self.player.rect.center();
        let fall_depth = config.physics.fall_depth;
        let mut phase_change = None;

        for entity in self.entities.iter_mut() {
            match entity.kind {
                EntityKind::EnemyDrone => {
                    ai::update_drone(entity, player_x, tick, &config.enemies);
                },
                EntityKind::EnemyGlitchWalker => {
                    ai::update_walker(entity, player_x, config.physics.gravity, &config.enemies);
                },
                EntityKind::Boss => {
                    if let Some(encounter) = self.boss.as_mut().filter(|b| b.boss == entity.id()) {
                        phase_change = encounter.update(entity, player_center, config, &mut self.queue);
                    }
                },
                EntityKind::Projectile(_) => {
                    physics::update_projectile(entity, config.combat.projectile_lifetime);
                },
                EntityKind::Particle(_) => physics::update_particle(entity),
                EntityKind::Player(_)
                | EntityKind::Powerup
                | EntityKind::Platform
                | EntityKind::Spike
                | EntityKind::Portal => {},
            }

            if entity.entity_type() != EntityType::Platform && entity.rect.y > fall_depth {
                entity.mark_for_deletion();
            }
        }

        phase_change
    }

    /// Ends the boss encounter if the boss is dead, leaving a portal where it
    /// stood. Returns the portal's ID.
    pub fn settle_boss(&mut self, config: &GameplayConfig) -> Option<EntityId> {
        let encounter = self.boss?;
        let rect = match self.entities.get_mut(encounter.boss) {
            Ok(boss) if boss.is_dead() => {
                boss.mark_for_deletion();
                boss.rect
            },
            Ok(_) => return None,
            Err(_) => encounter.last_rect,
        };
        self.boss = None;
        let portal = spawn::portal(config, self.queue.next_id(), rect.x);
        let id = portal.id();
        self.queue.push(portal);
        Some(id)
    }

    /// Applies buffered spawns and removes entities marked for deletion.
    /// Returns the removed entities.
    pub fn flush(&mut self) -> Vec<Entity> {
        let spawned = self.queue.take();
        self.entities.extend(spawned);
        self.entities.remove_marked()
    }

    /// Moves the camera after the player.
    pub fn follow_camera(&mut self, config: &GameplayConfig) {
        self.camera.follow(&self.player, config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyCode;

    #[test]
    fn test_new_world_has_one_player_and_snapped_camera() {
        let config = GameplayConfig::default();
        let world = World::new(&config, 1, 3);
        let players = world
            .iter_all()
            .filter(|e| e.entity_type() == EntityType::Player)
            .count();
        assert_eq!(players, 1);
        assert_eq!(world.camera().x, 50.0 - 800.0 / 3.0);
        assert_eq!(world.camera().y, 100.0);
    }

    #[test]
    fn test_boss_level_starts_encounter() {
        let config = GameplayConfig::default();
        let world = World::new(&config, 3, 3);
        let encounter = world.boss().expect("boss level");
        assert_eq!(encounter.phase, BossPhase::Hover);
        assert!(world.entities().contains(encounter.boss));
    }

    #[test]
    fn test_regenerate_keeps_ids_unique() {
        let config = GameplayConfig::default();
        let mut world = World::new(&config, 1, 3);
        let max_before = world.iter_all().map(|e| e.id()).max().expect("entities");
        world.regenerate(&config, 2);
        let min_after = world.iter_all().map(|e| e.id()).min().expect("entities");
        assert!(min_after > max_before);
        assert_eq!(world.level(), 2);
    }

    #[test]
    fn test_spawns_wait_for_flush() {
        let config = GameplayConfig::default();
        let mut world = World::new(&config, 1, 3);
        let before = world.entities().len();
        let shot = world.queue_player_shot(&config);
        assert!(!world.entities().contains(shot));
        world.flush();
        assert!(world.entities().contains(shot));
        assert_eq!(world.entities().len(), before + 1);
    }

    #[test]
    fn test_update_moves_player_with_input() {
        let config = GameplayConfig::default();
        let mut world = World::new(&config, 1, 3);
        let mut input = InputState::new();
        input.set(KeyCode::ArrowRight, true);
        world.update_entities(&config, &input, 1);
        assert!(world.player().rect.x > 50.0);
    }

    #[test]
    fn test_fallen_entities_are_culled() {
        let config = GameplayConfig::default();
        let mut world = World::new(&config, 1, 3);
        let powerup = spawn::powerup(&config, world.queue_mut().next_id(), 600.0);
        let id = powerup.id();
        world.entities_mut().spawn(powerup);
        if let Ok(p) = world.entities_mut().get_mut(id) {
            p.rect.y = 900.0;
        }
        world.update_entities(&config, &InputState::new(), 1);
        world.flush();
        assert!(!world.entities().contains(id));
    }

    #[test]
    fn test_settle_boss_leaves_portal() {
        let config = GameplayConfig::default();
        let mut world = World::new(&config, 3, 3);
        let boss_id = world.boss().map(|b| b.boss).expect("boss level");
        let boss_x = world.entities().get(boss_id).map(|b| b.rect.x).expect("boss");

        assert!(world.settle_boss(&config).is_none());
        if let Ok(boss) = world.entities_mut().get_mut(boss_id) {
            boss.damage(500);
        }
        let portal = world.settle_boss(&config).expect("portal spawned");
        world.flush();

        assert!(world.boss().is_none());
        assert!(!world.entities().contains(boss_id));
        let portal = world.entities().get(portal).expect("portal in world");
        assert_eq!(portal.rect.x, boss_x);
        assert_eq!(world.entities().iter_by_type(EntityType::Portal).count(), 1);
    }
}
