//! Collision response between the player, hazards, shots and pickups.
//!
//! Runs once per tick after every updater. All rules share the strict AABB
//! overlap test and run in a fixed order:
//!
//! 1. Player lands on platforms (top surface only).
//! 2. Player touches hazards.
//! 3. Player shots hit hazards.
//! 4. Player touches powerups and portals.
//!
//! Entities destroyed by one rule are marked, not removed, so later rules
//! skip them and removal happens at the end of the tick.

use neon_common::{Color, EntityId, Vec2};
use tracing::trace;

use crate::config::GameplayConfig;
use crate::entity::{Entity, EntityArena, EntityKind, EntityType, PlayerForm, ProjectileOwner};
use crate::world::World;

/// A player shot landing on a hazard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotHit {
    /// The shot
    pub projectile: EntityId,
    /// The hazard hit
    pub target: EntityId,
    /// Hit points removed
    pub damage: i32,
}

/// A hazard destroyed this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kill {
    /// The hazard
    pub entity_id: EntityId,
    /// Its kind
    pub kind: EntityType,
    /// Score awarded (zero for invincible contact)
    pub score: u64,
}

/// Player contact with a hazard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// The hazard
    pub source: EntityId,
    /// Hit points lost
    pub damage: i32,
}

/// Everything the collision pass changed, for the caller to turn into state
/// transitions and events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
    /// Player landed on a platform
    pub landed: bool,
    /// Hazards that hurt the player
    pub contacts: Vec<Contact>,
    /// Form lost to the first hit, if any
    pub form_lost: Option<PlayerForm>,
    /// Shots that hit
    pub hits: Vec<ShotHit>,
    /// Hazards destroyed
    pub kills: Vec<Kill>,
    /// Form granted by a powerup
    pub form_gained: Option<PlayerForm>,
    /// Player touched the portal
    pub portal_reached: bool,
}

impl CollisionReport {
    /// Total score awarded this tick.
    #[must_use]
    pub fn score(&self) -> u64 {
        self.kills.iter().map(|k| k.score).sum()
    }
}

fn live_ids(entities: &EntityArena, mut predicate: impl FnMut(&Entity) -> bool) -> Vec<EntityId> {
    entities.ids_where(|e| !e.is_marked_for_deletion() && predicate(e))
}

impl World {
    /// Runs every collision rule for one tick.
    pub fn resolve_collisions(&mut self, config: &GameplayConfig) -> CollisionReport {
        let mut report = CollisionReport::default();
        self.land_on_platforms(&mut report);
        self.touch_hazards(config, &mut report);
        self.hit_hazards_with_shots(config, &mut report);
        self.touch_items(config, &mut report);
        if report != CollisionReport::default() {
            trace!(?report, "Collisions resolved");
        }
        report
    }

    fn land_on_platforms(&mut self, report: &mut CollisionReport) {
        let player = &mut self.player;
        for platform in self.entities.iter_by_type(EntityType::Platform) {
            let Some(prev_bottom) = player.player_state().map(|s| s.prev_bottom) else {
                return;
            };
            if player.rect.overlaps(&platform.rect)
                && player.velocity.y > 0.0
                && prev_bottom <= platform.rect.y
            {
                player.rect.y = platform.rect.y - player.rect.h;
                player.velocity.y = 0.0;
                if let Some(state) = player.player_state_mut() {
                    state.on_ground = true;
                }
                report.landed = true;
            }
        }
    }

    fn touch_hazards(&mut self, config: &GameplayConfig, report: &mut CollisionReport) {
        let combat = &config.combat;
        for id in live_ids(&self.entities, |e| e.entity_type().is_hazard()) {
            let Ok(hazard) = self.entities.get_mut(id) else {
                continue;
            };
            if !self.player.rect.overlaps(&hazard.rect) {
                continue;
            }

            let form = self.player.form();
            if form == PlayerForm::Invincible {
                hazard.destroy();
                let at = hazard.rect.position();
                report.kills.push(Kill {
                    entity_id: id,
                    kind: hazard.entity_type(),
                    score: 0,
                });
                self.queue.particles(config, at, Color::Glitch, 5);
                continue;
            }

            self.player.damage(combat.contact_damage);
            let (knock_x, knock_y) = combat.knockback;
            self.player.velocity = Vec2::new(knock_x * self.player.facing.sign(), knock_y);
            report.contacts.push(Contact {
                source: id,
                damage: combat.contact_damage,
            });
            if form != PlayerForm::Normal {
                self.set_player_form(PlayerForm::Normal);
                report.form_lost.get_or_insert(form);
            }
        }
    }

    fn hit_hazards_with_shots(&mut self, config: &GameplayConfig, report: &mut CollisionReport) {
        let combat = &config.combat;
        let damage = if self.player.form() == PlayerForm::Tank {
            combat.tank_bullet_damage
        } else {
            combat.bullet_damage
        };

        let shots = live_ids(&self.entities, |e| {
            matches!(
                e.kind,
                EntityKind::Projectile(p) if p.owner == ProjectileOwner::Player
            )
        });
        if shots.is_empty() {
            return;
        }

        for shot_id in shots {
            let Ok(shot_rect) = self.entities.get(shot_id).map(|s| s.rect) else {
                continue;
            };
            let targets = live_ids(&self.entities, |e| {
                e.entity_type().is_hazard() && e.rect.overlaps(&shot_rect)
            });
            if targets.is_empty() {
                continue;
            }
            if let Ok(shot) = self.entities.get_mut(shot_id) {
                shot.mark_for_deletion();
            }

            // A shot spends itself on every hazard it overlaps this tick
            for target in targets {
                let Ok(hazard) = self.entities.get_mut(target) else {
                    continue;
                };
                hazard.damage(damage);
                let center = hazard.rect.center();
                let kind = hazard.entity_type();
                let killed = hazard.is_dead();
                if killed {
                    hazard.mark_for_deletion();
                }

                report.hits.push(ShotHit {
                    projectile: shot_id,
                    target,
                    damage,
                });
                if killed {
                    report.kills.push(Kill {
                        entity_id: target,
                        kind,
                        score: combat.kill_score,
                    });
                }
                self.queue.particles(config, center, Color::White, 5);
            }
        }
    }

    fn touch_items(&mut self, config: &GameplayConfig, report: &mut CollisionReport) {
        let items = live_ids(&self.entities, |e| {
            matches!(e.entity_type(), EntityType::Powerup | EntityType::Portal)
        });
        for id in items {
            let Ok(item) = self.entities.get_mut(id) else {
                continue;
            };
            if !self.player.rect.overlaps(&item.rect) {
                continue;
            }

            if item.entity_type() == EntityType::Portal {
                report.portal_reached = true;
                continue;
            }

            item.destroy();
            let forms = PlayerForm::POWERUPS;
            let form = forms[self.queue.rng().usize(..forms.len())];
            self.set_player_form(form);
            report.form_gained = Some(form);
            let at = self.player.rect.position();
            self.queue.particles(config, at, Color::Cyan, 20);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spawn;
    use neon_common::Rect;

    /// World with the player parked at the spawn point and no entities.
    fn empty_world() -> (GameplayConfig, World) {
        let config = GameplayConfig::default();
        let mut world = World::new(&config, 1, 7);
        world.entities_mut().clear();
        (config, world)
    }

    fn place(world: &mut World, entity: Entity) -> EntityId {
        world.entities_mut().spawn(entity)
    }

    fn spike_under_player(config: &GameplayConfig, world: &mut World) -> EntityId {
        let id = world.queue_mut().next_id();
        let mut spike = spawn::spike(config, id, 0.0);
        spike.rect = Rect::new(60.0, 420.0, 40.0, 20.0);
        place(world, spike)
    }

    fn set_form(world: &mut World, form: PlayerForm) {
        world.set_player_form(form);
    }

    #[test]
    fn test_empty_world_is_quiet() {
        let (config, mut world) = empty_world();
        let report = world.resolve_collisions(&config);
        assert_eq!(report, CollisionReport::default());
    }

    #[test]
    fn test_lands_when_falling_from_above() {
        let (config, mut world) = empty_world();
        let id = world.queue_mut().next_id();
        place(&mut world, spawn::ground_tile(&config, id, 40.0, Color::Purple));

        let player = world.player_mut();
        player.rect.y = 455.0;
        player.velocity.y = 6.0;
        if let Some(state) = player.player_state_mut() {
            state.prev_bottom = 498.0;
        }

        let report = world.resolve_collisions(&config);
        assert!(report.landed);
        let player = world.player();
        assert_eq!(player.rect.bottom(), 500.0);
        assert_eq!(player.velocity.y, 0.0);
        assert_eq!(player.player_state().map(|s| s.on_ground), Some(true));
    }

    #[test]
    fn test_no_landing_from_below_or_when_rising() {
        let (config, mut world) = empty_world();
        let id = world.queue_mut().next_id();
        place(&mut world, spawn::floating_platform(&config, id, 40.0, 400.0));

        let player = world.player_mut();
        player.rect.y = 390.0;
        player.velocity.y = 4.0;
        if let Some(state) = player.player_state_mut() {
            state.prev_bottom = 434.0;
        }
        assert!(!world.resolve_collisions(&config).landed);

        let player = world.player_mut();
        player.velocity.y = -4.0;
        if let Some(state) = player.player_state_mut() {
            state.prev_bottom = 399.0;
        }
        assert!(!world.resolve_collisions(&config).landed);
        assert_eq!(world.player().player_state().map(|s| s.on_ground), Some(false));
    }

    #[test]
    fn test_hazard_contact_costs_one_hp_and_form() {
        let (config, mut world) = empty_world();
        let spike = spike_under_player(&config, &mut world);
        set_form(&mut world, PlayerForm::Tank);

        let report = world.resolve_collisions(&config);
        assert_eq!(world.player().hp(), 99);
        assert_eq!(world.player().form(), PlayerForm::Normal);
        assert_eq!(report.form_lost, Some(PlayerForm::Tank));
        assert_eq!(report.contacts, vec![Contact { source: spike, damage: 1 }]);
        assert_eq!(world.player().velocity, Vec2::new(-10.0, -5.0));
        assert!(world.entities().contains(spike));
    }

    #[test]
    fn test_knockback_pushes_away_from_facing() {
        let (config, mut world) = empty_world();
        spike_under_player(&config, &mut world);
        world.player_mut().facing = crate::entity::Facing::Left;
        world.resolve_collisions(&config);
        assert_eq!(world.player().velocity.x, 10.0);
    }

    #[test]
    fn test_invincible_destroys_hazard_unharmed() {
        let (config, mut world) = empty_world();
        let spike = spike_under_player(&config, &mut world);
        set_form(&mut world, PlayerForm::Invincible);

        let report = world.resolve_collisions(&config);
        assert_eq!(world.player().hp(), 100);
        assert_eq!(world.player().form(), PlayerForm::Invincible);
        assert!(report.contacts.is_empty());
        assert_eq!(report.score(), 0);
        let hazard = world.entities().get(spike).expect("still present until flush");
        assert!(hazard.is_marked_for_deletion());
        assert_eq!(hazard.hp(), 0);
        assert_eq!(world.queue_mut().pending().len(), 5);
    }

    fn drone_hit_by_shot(form: PlayerForm) -> (World, EntityId, EntityId, CollisionReport) {
        let (config, mut world) = empty_world();
        set_form(&mut world, form);
        let drone_id = world.queue_mut().next_id();
        let drone = spawn::enemy(&config, drone_id, spawn::EnemyVariant::Drone, 600.0, 300.0);
        let rect = drone.rect;
        place(&mut world, drone);

        let shot_id = world.queue_mut().next_id();
        let mut shot = spawn::player_shot(&config, shot_id, world.player());
        shot.rect.x = rect.x + 5.0;
        shot.rect.y = rect.y + 5.0;
        place(&mut world, shot);

        let report = world.resolve_collisions(&config);
        (world, drone_id, shot_id, report)
    }

    #[test]
    fn test_shot_damage_by_form() {
        for (form, damage) in [
            (PlayerForm::Normal, 5),
            (PlayerForm::Flight, 5),
            (PlayerForm::Invincible, 5),
            (PlayerForm::Tank, 10),
        ] {
            let (world, drone, shot, report) = drone_hit_by_shot(form);
            assert_eq!(world.entities().get(drone).map(Entity::hp), Ok(30 - damage));
            assert!(world
                .entities()
                .get(shot)
                .map(Entity::is_marked_for_deletion)
                .unwrap_or(false));
            assert_eq!(report.hits.len(), 1);
            assert_eq!(report.hits[0].damage, damage);
        }
    }

    #[test]
    fn test_lethal_shot_scores() {
        let (config, mut world) = empty_world();
        let id = world.queue_mut().next_id();
        let mut spike = spawn::spike(&config, id, 600.0).with_hp(3);
        spike.rect = Rect::new(600.0, 300.0, 40.0, 20.0);
        place(&mut world, spike);

        let shot_id = world.queue_mut().next_id();
        let mut shot = spawn::player_shot(&config, shot_id, world.player());
        shot.rect.x = 605.0;
        shot.rect.y = 305.0;
        place(&mut world, shot);

        let report = world.resolve_collisions(&config);
        assert_eq!(report.score(), 100);
        assert_eq!(report.kills.len(), 1);
        assert_eq!(report.kills[0].entity_id, id);
    }

    #[test]
    fn test_shot_hits_every_overlapping_hazard() {
        let (config, mut world) = empty_world();
        let mut stacked = Vec::new();
        for _ in 0..2 {
            let id = world.queue_mut().next_id();
            let mut spike = spawn::spike(&config, id, 600.0).with_hp(30);
            spike.rect = Rect::new(600.0, 300.0, 40.0, 20.0);
            stacked.push(place(&mut world, spike));
        }

        let shot_id = world.queue_mut().next_id();
        let mut shot = spawn::player_shot(&config, shot_id, world.player());
        shot.rect.x = 605.0;
        shot.rect.y = 305.0;
        place(&mut world, shot);

        let report = world.resolve_collisions(&config);
        for id in &stacked {
            assert_eq!(world.entities().get(*id).map(Entity::hp), Ok(25));
        }
        assert_eq!(report.hits.len(), 2);
        assert!(report.hits.iter().all(|h| h.projectile == shot_id));
        assert_eq!(world.queue_mut().pending().len(), 10);
        assert!(world
            .entities()
            .get(shot_id)
            .map(Entity::is_marked_for_deletion)
            .unwrap_or(false));
    }

    #[test]
    fn test_boss_shots_never_hit_hazards() {
        let (config, mut world) = empty_world();
        let boss_id = world.queue_mut().next_id();
        let boss = spawn::boss(&config, boss_id, 2000.0);
        let target = boss.rect.center();
        place(&mut world, boss.clone());
        let shot_id = world.queue_mut().next_id();
        let mut shot = spawn::boss_shot(&config, shot_id, &boss, target);
        shot.rect.x = target.x;
        shot.rect.y = target.y;
        place(&mut world, shot);

        let report = world.resolve_collisions(&config);
        assert!(report.hits.is_empty());
        assert_eq!(world.entities().get(boss_id).map(Entity::hp), Ok(500));
    }

    #[test]
    fn test_powerup_grants_random_form() {
        let (config, mut world) = empty_world();
        let id = world.queue_mut().next_id();
        let mut powerup = spawn::powerup(&config, id, 0.0);
        powerup.rect = Rect::new(60.0, 410.0, 20.0, 20.0);
        place(&mut world, powerup);

        let report = world.resolve_collisions(&config);
        let form = report.form_gained.expect("powerup collected");
        assert!(PlayerForm::POWERUPS.contains(&form));
        assert_eq!(world.player().form(), form);
        assert!(world
            .entities()
            .get(id)
            .map(Entity::is_marked_for_deletion)
            .unwrap_or(false));
        assert_eq!(world.queue_mut().pending().len(), 20);
    }

    #[test]
    fn test_portal_reached() {
        let (config, mut world) = empty_world();
        let id = world.queue_mut().next_id();
        let mut portal = spawn::portal(&config, id, 0.0);
        portal.rect.x = 40.0;
        portal.rect.y = 380.0;
        place(&mut world, portal);

        assert!(world.resolve_collisions(&config).portal_reached);
    }
}
