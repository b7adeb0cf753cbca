//! Central game state management.
//!
//! [`GameState`] owns the world and drives the per-tick pipeline: queued
//! input, updaters, collisions, boss defeat, pruning, camera, then win/loss.
//! Only the Playing status runs the simulation; every other status freezes
//! the world until a confirm action moves it on.

use neon_common::EntityId;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::ai::BossPhase;
use crate::collision_response::CollisionReport;
use crate::config::{ConfigError, GameplayConfig};
use crate::entity::{Entity, PlayerForm};
use crate::events::{EventBus, GameEvent};
use crate::input::{InputQueue, InputSender, InputState, KeyCode};
use crate::world::{Camera, World};

/// Coarse game status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameStatus {
    /// Title screen, waiting for confirm
    #[default]
    Menu,
    /// Simulation running
    Playing,
    /// Portal reached, waiting for confirm
    LevelComplete,
    /// Player died or fell, waiting for confirm
    GameOver,
}

/// Read-only view of everything a renderer or HUD needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Coarse status
    pub status: GameStatus,
    /// Level number
    pub level: u32,
    /// Score
    pub score: u64,
    /// Ticks simulated since the engine was created
    pub tick: u64,
    /// Camera top-left corner
    pub camera: Camera,
    /// Player hit points
    pub player_hp: i32,
    /// Player form
    pub player_form: PlayerForm,
    /// Boss phase while a boss is alive
    pub boss_phase: Option<BossPhase>,
    /// Every entity, player first
    pub entities: Vec<Entity>,
}

/// Central game state containing all gameplay data.
///
/// This is the single owner of world state. Hosts call [`GameState::update`]
/// once per frame and read a [`Snapshot`] between updates.
#[derive(Debug)]
pub struct GameState {
    /// Gameplay tuning
    config: GameplayConfig,
    /// Entities, player, boss encounter and camera
    world: World,
    /// Coarse status
    status: GameStatus,
    /// Score, carried across levels until a restart
    score: u64,
    /// Ticks simulated
    tick: u64,
    /// Held keys
    input: InputState,
    /// Key events posted from other threads
    input_queue: InputQueue,
    /// Outgoing gameplay events
    events: EventBus,
}

impl GameState {
    /// Creates a game at the menu with level 1 generated from `seed`.
    #[must_use]
    pub fn new(config: GameplayConfig, seed: u64) -> Self {
        let world = World::new(&config, 1, seed);
        let state = Self {
            config,
            world,
            status: GameStatus::Menu,
            score: 0,
            tick: 0,
            input: InputState::new(),
            input_queue: InputQueue::new(),
            events: EventBus::default(),
        };
        state.announce_level();
        state
    }

    /// Validates `config`, then creates a game as [`GameState::new`] does.
    ///
    /// # Errors
    /// Returns the first tuning value that fails validation.
    pub fn try_new(config: GameplayConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config, seed))
    }

    /// Advances the simulation by one tick. Does nothing unless Playing.
    pub fn update(&mut self) {
        for event in self.input_queue.drain() {
            self.set_key_code(event.key, event.pressed);
        }
        if self.status != GameStatus::Playing {
            return;
        }

        self.tick += 1;
        if let Some(phase) = self.world.update_entities(&self.config, &self.input, self.tick) {
            self.events.publish(GameEvent::BossPhaseChanged { phase });
        }

        let report = self.world.resolve_collisions(&self.config);
        self.score += report.score();
        self.publish_collisions(&report);

        if let Some(portal) = self.world.settle_boss(&self.config) {
            info!(level = self.world.level(), score = self.score, "Boss defeated");
            self.events.publish(GameEvent::BossDefeated { portal });
        }

        let removed = self.world.flush();
        self.world.follow_camera(&self.config);
        trace!(
            tick = self.tick,
            removed = removed.len(),
            entities = self.world.entities().len(),
            "Tick"
        );

        let player = self.world.player();
        if player.rect.y > self.config.physics.fall_depth || player.is_dead() {
            self.set_status(GameStatus::GameOver);
        } else if report.portal_reached {
            self.set_status(GameStatus::LevelComplete);
        }
    }

    fn publish_collisions(&self, report: &CollisionReport) {
        for contact in &report.contacts {
            self.events.publish(GameEvent::PlayerDamaged {
                source: contact.source,
                damage: contact.damage,
                hp_left: self.world.player().hp(),
            });
        }
        if let Some(form) = report.form_lost {
            self.events.publish(GameEvent::FormLost { form });
        }
        for kill in &report.kills {
            self.events.publish(GameEvent::HazardDestroyed {
                entity_id: kill.entity_id,
                kind: kill.kind,
                score: kill.score,
            });
        }
        if let Some(form) = report.form_gained {
            debug!(?form, "Powerup collected");
            self.events.publish(GameEvent::FormGained { form });
        }
    }

    /// Records a key transition by browser key name. Unknown names are
    /// ignored.
    pub fn set_key(&mut self, name: &str, pressed: bool) {
        if let Some(key) = KeyCode::from_key_name(name) {
            self.set_key_code(key, pressed);
        }
    }

    /// Records a key transition.
    ///
    /// Releases are always recorded. Outside Playing, presses are ignored
    /// except Enter, which confirms. While Playing, a fresh press of Z fires.
    pub fn set_key_code(&mut self, key: KeyCode, pressed: bool) {
        if !pressed {
            self.input.set(key, false);
            return;
        }
        if self.status != GameStatus::Playing {
            if key == KeyCode::Enter {
                self.confirm();
            }
            return;
        }
        if self.input.set(key, true) && key == KeyCode::Z {
            self.shoot();
        }
    }

    /// Fires a player shot. Only works while Playing.
    pub fn shoot(&mut self) -> Option<EntityId> {
        if self.status != GameStatus::Playing {
            return None;
        }
        let projectile = self.world.queue_player_shot(&self.config);
        self.world.flush();
        self.events.publish(GameEvent::ShotFired { projectile });
        Some(projectile)
    }

    /// Confirm/continue action.
    ///
    /// From Menu or GameOver this starts a fresh run at level 1. From
    /// LevelComplete it moves to the next level keeping hp and score.
    pub fn confirm(&mut self) {
        match self.status {
            GameStatus::Menu | GameStatus::GameOver => {
                self.score = 0;
                self.reset_level(1);
                self.set_status(GameStatus::Playing);
            },
            GameStatus::LevelComplete => {
                let hp = self.world.player().hp();
                self.reset_level(self.world.level() + 1);
                self.world.player_mut().set_hp(hp);
                self.set_status(GameStatus::Playing);
            },
            GameStatus::Playing => {},
        }
    }

    /// Regenerates the world for `level`, replacing every entity and the
    /// boss encounter. Status and score are left alone.
    pub fn reset_level(&mut self, level: u32) {
        self.world.regenerate(&self.config, level);
        self.input.clear();
        self.announce_level();
    }

    /// Abandons the run and returns to the menu.
    pub fn return_to_menu(&mut self) {
        self.score = 0;
        self.reset_level(1);
        self.set_status(GameStatus::Menu);
    }

    /// Ends the run immediately.
    pub fn end_run(&mut self) {
        self.set_status(GameStatus::GameOver);
    }

    fn announce_level(&self) {
        let boss = self.world.boss().is_some();
        info!(
            level = self.world.level(),
            length = self.world.length(),
            entities = self.world.entities().len(),
            boss,
            "Level ready"
        );
        self.events.publish(GameEvent::LevelGenerated {
            level: self.world.level(),
            boss,
        });
    }

    fn set_status(&mut self, to: GameStatus) {
        let from = self.status;
        if from == to {
            return;
        }
        self.status = to;
        info!(?from, ?to, level = self.world.level(), score = self.score, "Status changed");
        self.events.publish(GameEvent::StatusChanged { from, to });
    }

    /// Builds a snapshot of the current state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let player = self.world.player();
        Snapshot {
            status: self.status,
            level: self.world.level(),
            score: self.score,
            tick: self.tick,
            camera: self.world.camera(),
            player_hp: player.hp(),
            player_form: player.form(),
            boss_phase: self.world.boss().map(|b| b.phase),
            entities: self.world.iter_all().cloned().collect(),
        }
    }

    /// Coarse status.
    #[must_use]
    pub const fn status(&self) -> GameStatus {
        self.status
    }

    /// Score.
    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Level number.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.world.level()
    }

    /// Ticks simulated.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Camera.
    #[must_use]
    pub const fn camera(&self) -> Camera {
        self.world.camera()
    }

    /// The player.
    #[must_use]
    pub const fn player(&self) -> &Entity {
        self.world.player()
    }

    /// World state.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world state, for hosts and scripted scenarios.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Gameplay tuning.
    #[must_use]
    pub const fn config(&self) -> &GameplayConfig {
        &self.config
    }

    /// Held keys.
    #[must_use]
    pub const fn input(&self) -> &InputState {
        &self.input
    }

    /// Handle for posting key events from another thread. Events are applied
    /// at the start of the next update.
    #[must_use]
    pub fn input_sender(&self) -> InputSender {
        self.input_queue.sender()
    }

    /// Takes the gameplay events published since the last drain.
    pub fn drain_events(&self) -> Vec<GameEvent> {
        self.events.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityType;
    use crate::spawn;
    use neon_common::Rect;

    fn playing(seed: u64) -> GameState {
        let mut game = GameState::new(GameplayConfig::default(), seed);
        game.confirm();
        assert_eq!(game.status(), GameStatus::Playing);
        game
    }

    fn clear_hazards(game: &mut GameState) {
        let entities = game.world_mut().entities_mut();
        for id in entities.ids_where(|e| e.entity_type().is_hazard()) {
            let _ = entities.despawn(id);
        }
    }

    fn count(snapshot: &Snapshot, entity_type: EntityType) -> usize {
        snapshot
            .entities
            .iter()
            .filter(|e| e.entity_type() == entity_type)
            .count()
    }

    #[test]
    fn test_starts_at_menu_and_frozen() {
        let mut game = GameState::new(GameplayConfig::default(), 1);
        let before = game.snapshot();
        game.update();
        assert_eq!(game.snapshot(), before);
        assert_eq!(before.status, GameStatus::Menu);
        assert_eq!(before.tick, 0);
    }

    #[test]
    fn test_one_player_first_in_snapshot() {
        for level in 1..=6 {
            let mut game = playing(level.into());
            game.reset_level(level);
            let snapshot = game.snapshot();
            assert_eq!(count(&snapshot, EntityType::Player), 1);
            assert!(count(&snapshot, EntityType::Boss) <= 1);
            assert_eq!(snapshot.entities[0].entity_type(), EntityType::Player);
        }
    }

    #[test]
    fn test_snapshot_is_idempotent() {
        let mut game = playing(4);
        game.update();
        assert_eq!(game.snapshot(), game.snapshot());
    }

    #[test]
    fn test_player_lands_on_ground() {
        let mut game = playing(2);
        let mut landed = false;
        for _ in 0..30 {
            game.update();
            if game.player().player_state().is_some_and(|s| s.on_ground) {
                landed = true;
                break;
            }
        }
        assert!(landed);
        assert_eq!(game.player().rect.bottom(), 500.0);
        assert_eq!(game.player().velocity.y, 0.0);
    }

    #[test]
    fn test_keys_ignored_outside_playing() {
        let mut game = GameState::new(GameplayConfig::default(), 1);
        game.set_key("ArrowRight", true);
        game.set_key("z", true);
        assert!(!game.input().right());
        assert_eq!(game.snapshot().entities.len(), game.world().entities().len() + 1);
        assert!(game.shoot().is_none());

        game.set_key("Enter", true);
        assert_eq!(game.status(), GameStatus::Playing);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let mut game = playing(1);
        game.set_key("Escape", true);
        game.set_key("", false);
        assert_eq!(game.status(), GameStatus::Playing);
    }

    #[test]
    fn test_shot_fires_once_per_press() {
        let mut game = playing(1);
        let shots = |g: &GameState| {
            g.world()
                .entities()
                .iter_by_type(EntityType::Projectile)
                .count()
        };
        game.set_key("z", true);
        game.set_key("z", true);
        assert_eq!(shots(&game), 1);
        game.set_key("z", false);
        game.set_key("Z", true);
        assert_eq!(shots(&game), 2);

        let fired = game
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::ShotFired { .. }))
            .count();
        assert_eq!(fired, 2);
    }

    #[test]
    fn test_shot_follows_facing() {
        let mut game = playing(1);
        let right = game.shoot().expect("playing");
        game.world_mut().player_mut().facing = crate::entity::Facing::Left;
        let left = game.shoot().expect("playing");
        let entities = game.world().entities();
        assert_eq!(entities.get(right).map(|e| e.velocity.x), Ok(12.0));
        assert_eq!(entities.get(left).map(|e| e.velocity.x), Ok(-12.0));
    }

    #[test]
    fn test_shot_expires_after_lifetime() {
        let mut game = playing(5);
        clear_hazards(&mut game);
        let shot = game.shoot().expect("playing");
        for _ in 0..100 {
            game.update();
            assert!(game.world().entities().contains(shot));
        }
        game.update();
        assert!(!game.world().entities().contains(shot));
    }

    #[test]
    fn test_portal_completes_level_and_carries_progress() {
        let mut game = playing(8);
        clear_hazards(&mut game);
        let config = game.config().clone();

        let target_id = game.world_mut().queue_mut().next_id();
        let target = spawn::spike(&config, target_id, 1500.0).with_hp(1);
        let target_rect = target.rect;
        game.world_mut().entities_mut().spawn(target);
        let shot_id = game.world_mut().queue_mut().next_id();
        let mut shot = spawn::player_shot(&config, shot_id, game.player());
        shot.rect.x = target_rect.x + 2.0;
        shot.rect.y = target_rect.y + 2.0;
        game.world_mut().entities_mut().spawn(shot);

        let portal = game
            .world()
            .entities()
            .iter_by_type(EntityType::Portal)
            .map(|p| p.rect)
            .next()
            .expect("regular level has a portal");
        let player = game.world_mut().player_mut();
        player.rect = Rect::new(portal.x + 10.0, portal.y + 10.0, player.rect.w, player.rect.h);
        player.velocity = neon_common::Vec2::ZERO;
        player.damage(10);

        game.update();
        assert_eq!(game.status(), GameStatus::LevelComplete);
        assert_eq!(game.score(), 100);

        let frozen = game.snapshot();
        game.update();
        assert_eq!(game.snapshot(), frozen);

        game.confirm();
        assert_eq!(game.status(), GameStatus::Playing);
        assert_eq!(game.level(), 2);
        assert_eq!(game.score(), 100);
        assert_eq!(game.player().hp(), 90);
        assert_eq!(game.player().form(), PlayerForm::Normal);
    }

    #[test]
    fn test_repeated_contact_ends_the_run() {
        let mut game = playing(3);
        clear_hazards(&mut game);
        let config = game.config().clone();
        let id = game.world_mut().queue_mut().next_id();
        let mut spike = spawn::spike(&config, id, 0.0);
        spike.rect = Rect::new(-1000.0, -1000.0, 4000.0, 2000.0);
        game.world_mut().entities_mut().spawn(spike);
        game.world_mut().player_mut().set_hp(3);

        for _ in 0..3 {
            assert_eq!(game.status(), GameStatus::Playing);
            game.update();
        }
        assert_eq!(game.player().hp(), 0);
        assert_eq!(game.status(), GameStatus::GameOver);

        game.confirm();
        assert_eq!(game.status(), GameStatus::Playing);
        assert_eq!(game.level(), 1);
        assert_eq!(game.score(), 0);
        assert_eq!(game.player().hp(), 100);
    }

    #[test]
    fn test_falling_out_ends_the_run() {
        let mut game = playing(3);
        game.world_mut().player_mut().rect.y = 900.0;
        game.update();
        assert_eq!(game.status(), GameStatus::GameOver);
    }

    #[test]
    fn test_boss_defeat_leaves_one_portal() {
        let mut game = playing(6);
        game.reset_level(3);
        let boss_id = game.world().boss().map(|b| b.boss).expect("boss level");
        let boss_x = game
            .world()
            .entities()
            .get(boss_id)
            .map(|b| b.rect.x)
            .expect("boss spawned");
        assert_eq!(count(&game.snapshot(), EntityType::Portal), 0);

        if let Ok(boss) = game.world_mut().entities_mut().get_mut(boss_id) {
            boss.damage(500);
        }
        game.update();

        let snapshot = game.snapshot();
        assert_eq!(count(&snapshot, EntityType::Boss), 0);
        assert_eq!(count(&snapshot, EntityType::Portal), 1);
        assert!(snapshot.boss_phase.is_none());
        let portal = snapshot
            .entities
            .iter()
            .find(|e| e.entity_type() == EntityType::Portal)
            .expect("portal spawned");
        assert_eq!(portal.rect.x, boss_x);
        assert!(game
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::BossDefeated { .. })));
    }

    #[test]
    fn test_queued_input_applies_before_tick() {
        let mut game = GameState::new(GameplayConfig::default(), 2);
        let sender = game.input_sender();
        assert!(sender.send_key("Enter", true));
        assert!(sender.send_key("Enter", false));
        assert!(sender.send_key("ArrowRight", true));

        game.update();
        assert_eq!(game.status(), GameStatus::Playing);
        assert!(game.input().right());
        assert!(game.player().rect.x > 50.0);
    }

    #[test]
    fn test_same_seed_same_run() {
        let run = |seed| {
            let mut game = playing(seed);
            game.set_key("ArrowRight", true);
            for tick in 0..240 {
                if tick % 20 == 0 {
                    game.set_key("z", true);
                    game.set_key("z", false);
                }
                game.update();
            }
            game.snapshot()
        };
        assert_eq!(run(99), run(99));
    }

    #[test]
    fn test_return_to_menu_resets_run() {
        let mut game = playing(3);
        game.update();
        game.return_to_menu();
        assert_eq!(game.status(), GameStatus::Menu);
        assert_eq!(game.level(), 1);
        assert_eq!(game.score(), 0);
        game.end_run();
        assert_eq!(game.status(), GameStatus::GameOver);
    }

    #[test]
    fn test_try_new_rejects_invalid_tuning() {
        let mut config = GameplayConfig::default();
        config.level.boss_interval = 0;
        assert!(matches!(
            GameState::try_new(config.clone(), 1),
            Err(ConfigError::NotPositive {
                field: "level.boss_interval",
                ..
            })
        ));

        // Unvalidated tuning still builds; a zero interval just means no boss
        let mut game = GameState::new(config, 1);
        game.confirm();
        game.reset_level(3);
        let snapshot = game.snapshot();
        assert!(snapshot.boss_phase.is_none());
        assert_eq!(count(&snapshot, EntityType::Portal), 1);

        assert!(GameState::try_new(GameplayConfig::default(), 1).is_ok());
    }

    #[test]
    fn test_status_events_published() {
        let mut game = GameState::new(GameplayConfig::default(), 2);
        let events = game.drain_events();
        assert_eq!(events, vec![GameEvent::LevelGenerated { level: 1, boss: false }]);

        game.confirm();
        let events = game.drain_events();
        assert!(events.contains(&GameEvent::StatusChanged {
            from: GameStatus::Menu,
            to: GameStatus::Playing,
        }));
    }
}
