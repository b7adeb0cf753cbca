//! Entity construction.
//!
//! Every entity the game creates, at level generation or at runtime, is built
//! here so sizes, colors and hit points come from one place.

use neon_common::{Color, EntityId, EntityIdAllocator, Rect, Vec2};

use crate::config::GameplayConfig;
use crate::entity::{
    Entity, EntityKind, Facing, ParticleState, PlayerForm, PlayerState, ProjectileOwner,
    ProjectileState,
};

/// Regular enemy variants a platform can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyVariant {
    /// Hovering drone
    Drone,
    /// Walker
    GlitchWalker,
}

/// Builds the player at the configured spawn point.
#[must_use]
pub fn player(config: &GameplayConfig, id: EntityId) -> Entity {
    let p = &config.player;
    let rect = Rect::new(p.spawn.0, p.spawn.1, p.width, p.height);
    Entity::new(
        id,
        EntityKind::Player(PlayerState {
            form: PlayerForm::Normal,
            on_ground: false,
            prev_bottom: rect.bottom(),
        }),
        rect,
        Color::Cyan,
    )
    .with_hp(p.max_hp)
}

/// Ground tile with its top at the ground line.
#[must_use]
pub fn ground_tile(config: &GameplayConfig, id: EntityId, x: f32, color: Color) -> Entity {
    let l = &config.level;
    Entity::new(
        id,
        EntityKind::Platform,
        Rect::new(x, l.ground_y, l.tile_size, l.tile_size),
        color,
    )
}

/// Floating platform with its top-left corner at `(x, y)`.
#[must_use]
pub fn floating_platform(config: &GameplayConfig, id: EntityId, x: f32, y: f32) -> Entity {
    let (w, h) = config.level.platform_size;
    Entity::new(id, EntityKind::Platform, Rect::new(x, y, w, h), Color::Cyan)
}

/// Spike resting on the ground line.
#[must_use]
pub fn spike(config: &GameplayConfig, id: EntityId, x: f32) -> Entity {
    let l = &config.level;
    let (w, h) = l.spike_size;
    Entity::new(
        id,
        EntityKind::Spike,
        Rect::new(x, l.ground_y - h, w, h),
        Color::Glitch,
    )
}

/// Powerup floating above the ground line.
#[must_use]
pub fn powerup(config: &GameplayConfig, id: EntityId, x: f32) -> Entity {
    let l = &config.level;
    Entity::new(
        id,
        EntityKind::Powerup,
        Rect::new(x, l.ground_y - l.powerup_rise, l.powerup_size, l.powerup_size),
        Color::Yellow,
    )
}

/// Exit portal standing on the ground line.
#[must_use]
pub fn portal(config: &GameplayConfig, id: EntityId, x: f32) -> Entity {
    let l = &config.level;
    let (w, h) = l.portal_size;
    Entity::new(
        id,
        EntityKind::Portal,
        Rect::new(x, l.ground_y - h, w, h),
        Color::Magenta,
    )
}

/// Enemy placed on top of a platform whose top-left corner is `(x, y)`.
#[must_use]
pub fn enemy(
    config: &GameplayConfig,
    id: EntityId,
    variant: EnemyVariant,
    x: f32,
    y: f32,
) -> Entity {
    let e = &config.enemies;
    let (kind, (w, h)) = match variant {
        EnemyVariant::Drone => (EntityKind::EnemyDrone, e.drone_size),
        EnemyVariant::GlitchWalker => (EntityKind::EnemyGlitchWalker, e.walker_size),
    };
    Entity::new(
        id,
        kind,
        Rect::new(x + e.spawn_offset.0, y + e.spawn_offset.1, w, h),
        Color::Glitch,
    )
    .with_hp(e.hp)
    .with_facing(Facing::Left)
}

/// Boss hovering over the arena that starts at `arena_x`.
#[must_use]
pub fn boss(config: &GameplayConfig, id: EntityId, arena_x: f32) -> Entity {
    let b = &config.boss;
    Entity::new(
        id,
        EntityKind::Boss,
        Rect::new(arena_x + b.arena_offset, b.hover_y, b.size, b.size),
        Color::Glitch,
    )
    .with_hp(b.hp)
    .with_facing(Facing::Left)
}

/// Player shot leaving the shooter's leading edge.
#[must_use]
pub fn player_shot(config: &GameplayConfig, id: EntityId, shooter: &Entity) -> Entity {
    let c = &config.combat;
    let tank = shooter.form() == PlayerForm::Tank;
    let (base_w, h) = c.bullet_size;
    let w = if tank { c.tank_bullet_width } else { base_w };
    let x = match shooter.facing {
        Facing::Right => shooter.rect.right(),
        Facing::Left => shooter.rect.x - base_w,
    };
    Entity::new(
        id,
        EntityKind::Projectile(ProjectileState {
            owner: ProjectileOwner::Player,
            age: 0,
        }),
        Rect::new(x, shooter.rect.y + c.bullet_muzzle_y, w, h),
        if tank { Color::Red } else { Color::Cyan },
    )
    .with_velocity(Vec2::new(c.bullet_speed * shooter.facing.sign(), 0.0))
    .with_facing(shooter.facing)
}

/// Boss shot aimed from the boss center toward `target`.
#[must_use]
pub fn boss_shot(config: &GameplayConfig, id: EntityId, boss: &Entity, target: Vec2) -> Entity {
    let b = &config.boss;
    let origin = boss.rect.center();
    let delta = target - origin;
    let angle = delta.y.atan2(delta.x);
    let velocity = Vec2::new(angle.cos(), angle.sin()) * b.projectile_speed;
    Entity::new(
        id,
        EntityKind::Projectile(ProjectileState {
            owner: ProjectileOwner::Boss,
            age: 0,
        }),
        Rect::new(origin.x, origin.y, b.projectile_size, b.projectile_size),
        Color::Glitch,
    )
    .with_velocity(velocity)
    .with_facing(Facing::toward(delta.x))
}

/// Burst of particles at one point with random velocities.
pub fn particle_burst(
    config: &GameplayConfig,
    ids: &mut EntityIdAllocator,
    rng: &mut fastrand::Rng,
    at: Vec2,
    color: Color,
    count: usize,
) -> Vec<Entity> {
    let c = &config.combat;
    let spread = c.particle_spread;
    (0..count)
        .map(|_| {
            let velocity = Vec2::new(
                (rng.f32() - 0.5) * 2.0 * spread,
                (rng.f32() - 0.5) * 2.0 * spread,
            );
            Entity::new(
                ids.allocate(),
                EntityKind::Particle(ParticleState {
                    life: 1.0,
                    decay: c.particle_decay,
                }),
                Rect::new(at.x, at.y, c.particle_size, c.particle_size),
                color,
            )
            .with_hp(0)
            .with_velocity(velocity)
        })
        .collect()
}
