//! Error types for Neon Midnight.

use thiserror::Error;

use crate::ids::EntityId;

/// Top-level error type for Neon Midnight operations.
#[derive(Debug, Error)]
pub enum NeonError {
    /// Entity lookup errors
    #[error("Entity error: {0}")]
    Entity(#[from] EntityError),

    /// Configuration rejected by validation
    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig {
        /// Dotted path of the offending field
        field: String,
        /// Why the value was rejected
        reason: String,
    },

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Entity lookup failures shared by every entity store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EntityError {
    /// No live entity carries this ID
    #[error("Entity not found: {0:?}")]
    NotFound(EntityId),

    /// The entity was already removed
    #[error("Entity already despawned: {0:?}")]
    AlreadyDespawned(EntityId),
}

/// Result type alias for Neon Midnight operations.
pub type NeonResult<T> = Result<T, NeonError>;
