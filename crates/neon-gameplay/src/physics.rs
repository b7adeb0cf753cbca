//! Per-tick motion for the player, projectiles and particles.
//!
//! Velocities are in pixels per tick and +y points down. Platform contact is
//! not handled here; landing is resolved by the collision pass, which is the
//! only thing that sets the player's on-ground flag.

use crate::config::PhysicsConfig;
use crate::entity::{Entity, EntityKind, Facing, PlayerForm};
use crate::input::InputState;

/// Applies held input to the player's velocity.
///
/// Held directions accelerate, friction damps, and speed is capped. Jump
/// input thrusts upward in Flight form, otherwise it triggers a single jump
/// when grounded.
pub fn apply_input(player: &mut Entity, input: &InputState, physics: &PhysicsConfig) {
    if input.left() {
        player.velocity.x -= physics.acceleration;
        player.facing = Facing::Left;
    }
    if input.right() {
        player.velocity.x += physics.acceleration;
        player.facing = Facing::Right;
    }

    player.velocity.x *= physics.friction;
    player.velocity.x = player.velocity.x.clamp(-physics.max_speed, physics.max_speed);

    if !input.jump() {
        return;
    }
    let EntityKind::Player(state) = &mut player.kind else {
        return;
    };
    if state.form == PlayerForm::Flight {
        player.velocity.y -= physics.flight_thrust;
    } else if state.on_ground {
        player.velocity.y = physics.jump_velocity;
        state.on_ground = false;
    }
}

/// Moves the player by its velocity, then applies gravity and clears the
/// on-ground flag.
pub fn integrate_player(player: &mut Entity, physics: &PhysicsConfig) {
    let prev_bottom = player.rect.bottom();
    player.rect.translate(player.velocity);

    let EntityKind::Player(state) = &mut player.kind else {
        return;
    };
    let gravity = if state.form == PlayerForm::Flight {
        physics.gravity * physics.flight_gravity_scale
    } else {
        physics.gravity
    };
    player.velocity.y += gravity;
    state.prev_bottom = prev_bottom;
    state.on_ground = false;
}

/// Moves a projectile and ages it. Marks it for deletion once it has lived
/// longer than `lifetime` ticks.
pub fn update_projectile(projectile: &mut Entity, lifetime: u32) {
    projectile.rect.translate(projectile.velocity);
    let EntityKind::Projectile(state) = &mut projectile.kind else {
        return;
    };
    state.age += 1;
    if state.age > lifetime {
        projectile.mark_for_deletion();
    }
}

/// Decays and moves a particle. Marks it for deletion once life reaches zero.
pub fn update_particle(particle: &mut Entity) {
    let EntityKind::Particle(state) = &mut particle.kind else {
        return;
    };
    state.life -= state.decay;
    let expired = state.life <= 0.0;
    particle.rect.translate(particle.velocity);
    if expired {
        particle.mark_for_deletion();
    }
}
