//! # Neon Midnight Common
//!
//! Common types, utilities, and shared abstractions for Neon Midnight.
//!
//! This crate provides foundational types used across all Neon Midnight crates:
//! - Geometry (axis-aligned rectangles, 2D vectors)
//! - ID types (EntityId and its allocator)
//! - Palette colors shared with renderers
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod color;
pub mod error;
pub mod geometry;
pub mod ids;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::color::*;
    pub use crate::error::*;
    pub use crate::geometry::*;
    pub use crate::ids::*;
}

pub use prelude::*;
