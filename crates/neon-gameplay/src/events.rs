//! Event bus for notifying collaborators of gameplay moments.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};
use tracing::trace;

use neon_common::EntityId;

use crate::ai::BossPhase;
use crate::entity::{EntityType, PlayerForm};
use crate::game_state::GameStatus;

/// Event types that can be sent through the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A level was generated
    LevelGenerated {
        /// Level number
        level: u32,
        /// Whether it ends in a boss arena
        boss: bool,
    },
    /// Coarse game state changed
    StatusChanged {
        /// Previous state
        from: GameStatus,
        /// New state
        to: GameStatus,
    },
    /// Player fired a shot
    ShotFired {
        /// Projectile entity
        projectile: EntityId,
    },
    /// Player touched a hazard
    PlayerDamaged {
        /// Hazard touched
        source: EntityId,
        /// Hit points lost
        damage: i32,
        /// Hit points left
        hp_left: i32,
    },
    /// Player picked up a powerup
    FormGained {
        /// New form
        form: PlayerForm,
    },
    /// Player lost a power-up form to a hit
    FormLost {
        /// Form that was lost
        form: PlayerForm,
    },
    /// A hazard was destroyed
    HazardDestroyed {
        /// Hazard entity
        entity_id: EntityId,
        /// Hazard kind
        kind: EntityType,
        /// Score awarded
        score: u64,
    },
    /// Boss switched phase
    BossPhaseChanged {
        /// New phase
        phase: BossPhase,
    },
    /// Boss was defeated and left a portal
    BossDefeated {
        /// Portal entity
        portal: EntityId,
    },
}

/// Bounded queue of [`GameEvent`]s, filled during a tick and drained by the
/// host between ticks. Publishing never blocks; when the host falls behind,
/// new events are dropped.
#[derive(Debug)]
pub struct EventBus {
    sender: Sender<GameEvent>,
    receiver: Receiver<GameEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a bus holding at most `capacity` undrained events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self { sender, receiver }
    }

    /// Queues an event for the next drain.
    pub fn publish(&self, event: GameEvent) {
        if let Err(TrySendError::Full(event)) = self.sender.try_send(event) {
            trace!(?event, "Event bus full, dropping");
        }
    }

    /// Takes every queued event, oldest first.
    pub fn drain(&self) -> Vec<GameEvent> {
        self.receiver.try_iter().collect()
    }
}
