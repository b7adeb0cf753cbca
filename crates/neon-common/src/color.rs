//! Display palette shared between the simulation and renderers.

use serde::{Deserialize, Serialize};

/// Named display colors. The simulation only tags entities with these;
/// drawing is left to renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    /// Player, floating platforms, pickup bursts
    Cyan,
    /// Portals
    Magenta,
    /// Ground tiles
    Purple,
    /// Background fill
    DeepBlue,
    /// Hit sparks
    White,
    /// Powerups
    Yellow,
    /// Accent
    Lime,
    /// Enemies, spikes, boss and its attacks
    Glitch,
    /// Tank-form shots
    Red,
}

impl Color {
    /// CSS-style hex string for this color.
    #[must_use]
    pub const fn hex(self) -> &'static str {
        match self {
            Self::Cyan => "#00f0ff",
            Self::Magenta => "#ff00ff",
            Self::Purple => "#bd00ff",
            Self::DeepBlue => "#0a0a2a",
            Self::White => "#ffffff",
            Self::Yellow => "#f9ff00",
            Self::Lime => "#00ff41",
            Self::Glitch => "#ff3333",
            Self::Red => "#ff0000",
        }
    }

    /// RGBA components in 0..=1.
    #[must_use]
    pub const fn rgba(self) -> [f32; 4] {
        match self {
            Self::Cyan => [0.0, 0.941, 1.0, 1.0],
            Self::Magenta => [1.0, 0.0, 1.0, 1.0],
            Self::Purple => [0.741, 0.0, 1.0, 1.0],
            Self::DeepBlue => [0.039, 0.039, 0.165, 1.0],
            Self::White => [1.0, 1.0, 1.0, 1.0],
            Self::Yellow => [0.976, 1.0, 0.0, 1.0],
            Self::Lime => [0.0, 1.0, 0.255, 1.0],
            Self::Glitch => [1.0, 0.2, 0.2, 1.0],
            Self::Red => [1.0, 0.0, 0.0, 1.0],
        }
    }
}
