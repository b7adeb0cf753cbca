//! Keyboard input state.
//!
//! Input collaborators report key transitions by browser key name. Names the
//! game does not use are ignored. Only the latest pressed/released state of
//! each key matters, so the state is a plain map.

use ahash::AHashMap;
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

/// Keys the game reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    /// Move left
    ArrowLeft,
    /// Move right
    ArrowRight,
    /// Jump / thrust
    ArrowUp,
    /// Unused by the simulation, tracked for collaborators
    ArrowDown,
    /// Jump / thrust
    Space,
    /// Fire
    Z,
    /// Confirm / continue
    Enter,
}

impl KeyCode {
    /// Parses a browser `KeyboardEvent.key` value.
    #[must_use]
    pub fn from_key_name(name: &str) -> Option<Self> {
        match name {
            "ArrowLeft" => Some(Self::ArrowLeft),
            "ArrowRight" => Some(Self::ArrowRight),
            "ArrowUp" => Some(Self::ArrowUp),
            "ArrowDown" => Some(Self::ArrowDown),
            " " | "Space" => Some(Self::Space),
            "z" | "Z" => Some(Self::Z),
            "Enter" => Some(Self::Enter),
            _ => None,
        }
    }

    /// Browser key name.
    #[must_use]
    pub const fn key_name(self) -> &'static str {
        match self {
            Self::ArrowLeft => "ArrowLeft",
            Self::ArrowRight => "ArrowRight",
            Self::ArrowUp => "ArrowUp",
            Self::ArrowDown => "ArrowDown",
            Self::Space => " ",
            Self::Z => "z",
            Self::Enter => "Enter",
        }
    }
}

/// Pressed/released state of every key seen so far.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    keys: AHashMap<KeyCode, bool>,
}

impl InputState {
    /// Creates an input state with nothing held.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a key transition. Returns true on a released-to-pressed edge.
    pub fn set(&mut self, key: KeyCode, pressed: bool) -> bool {
        let was_pressed = self.keys.insert(key, pressed).unwrap_or(false);
        pressed && !was_pressed
    }

    /// Whether a key is currently held.
    #[must_use]
    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.keys.get(&key).copied().unwrap_or(false)
    }

    /// Left held.
    #[must_use]
    pub fn left(&self) -> bool {
        self.is_pressed(KeyCode::ArrowLeft)
    }

    /// Right held.
    #[must_use]
    pub fn right(&self) -> bool {
        self.is_pressed(KeyCode::ArrowRight)
    }

    /// Up arrow or space held.
    #[must_use]
    pub fn jump(&self) -> bool {
        self.is_pressed(KeyCode::ArrowUp) || self.is_pressed(KeyCode::Space)
    }

    /// Releases every key.
    pub fn clear(&mut self) {
        self.keys.clear();
    }
}

/// A key transition posted from outside the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Key that changed
    pub key: KeyCode,
    /// New state
    pub pressed: bool,
}

/// Cloneable handle for posting key transitions from another thread.
#[derive(Debug, Clone)]
pub struct InputSender {
    sender: Sender<KeyEvent>,
}

impl InputSender {
    /// Posts a transition by browser key name. Unknown names are dropped and
    /// reported as `false`.
    pub fn send_key(&self, name: &str, pressed: bool) -> bool {
        match KeyCode::from_key_name(name) {
            Some(key) => self.send(KeyEvent { key, pressed }),
            None => false,
        }
    }

    /// Posts a transition. Returns false if the engine is gone.
    pub fn send(&self, event: KeyEvent) -> bool {
        self.sender.send(event).is_ok()
    }
}

/// Queue of key transitions awaiting the next tick.
#[derive(Debug)]
pub struct InputQueue {
    sender: Sender<KeyEvent>,
    receiver: Receiver<KeyEvent>,
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl InputQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// Returns a new sender handle.
    #[must_use]
    pub fn sender(&self) -> InputSender {
        InputSender {
            sender: self.sender.clone(),
        }
    }

    /// Takes every queued transition in arrival order.
    pub fn drain(&self) -> Vec<KeyEvent> {
        self.receiver.try_iter().collect()
    }

    /// Number of queued transitions.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }
}
