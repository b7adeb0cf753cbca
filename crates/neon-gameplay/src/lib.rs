//! # Neon Midnight Gameplay
//!
//! Simulation core for Neon Midnight.
//!
//! This crate owns everything that happens inside a tick:
//! - Entity model and arena storage
//! - Procedural level generation
//! - Player physics, enemy AI and the boss encounter
//! - Collision response (landing, damage, shots, pickups)
//! - Game status machine, snapshots and the event bus
//!
//! Rendering and the input device layer live outside; they feed key events
//! in and read [`Snapshot`]s out.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod ai;
pub mod collision_response;
pub mod config;
pub mod entity;
pub mod events;
pub mod game_state;
pub mod input;
pub mod level;
pub mod physics;
pub mod spawn;
pub mod world;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::ai::{BossEncounter, BossPhase};
    pub use crate::collision_response::CollisionReport;
    pub use crate::config::*;
    pub use crate::entity::*;
    pub use crate::events::*;
    pub use crate::game_state::*;
    pub use crate::input::*;
    pub use crate::level::*;
    pub use crate::world::*;
}

pub use prelude::*;
