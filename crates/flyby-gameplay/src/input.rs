//! Input handling for the vehicle.
//!
//! Keys are tracked as pressed/released and folded into [`InputFlags`] once
//! per tick.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

/// Keys the vehicle responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Forward
    ArrowUp,
    /// Backward
    ArrowDown,
    /// Yaw left
    ArrowLeft,
    /// Yaw right
    ArrowRight,
    /// Climb
    W,
    /// Descend
    S,
}

impl Key {
    /// Parses a DOM-style key name (`"ArrowUp"`, `"w"`, ...).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ArrowUp" => Some(Self::ArrowUp),
            "ArrowDown" => Some(Self::ArrowDown),
            "ArrowLeft" => Some(Self::ArrowLeft),
            "ArrowRight" => Some(Self::ArrowRight),
            "w" | "W" => Some(Self::W),
            "s" | "S" => Some(Self::S),
            _ => None,
        }
    }
}

/// Directional intents for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputFlags {
    /// Move along the heading
    pub forward: bool,
    /// Move against the heading
    pub back: bool,
    /// Climb
    pub up: bool,
    /// Descend
    pub down: bool,
    /// Turn counter-clockwise (seen from above)
    pub yaw_left: bool,
    /// Turn clockwise
    pub yaw_right: bool,
}

impl InputFlags {
    /// No input.
    pub const NONE: Self = Self {
        forward: false,
        back: false,
        up: false,
        down: false,
        yaw_left: false,
        yaw_right: false,
    };

    /// Builds flags from a set of held key names. Unknown names are ignored.
    #[must_use]
    pub fn from_keys<'a, I>(names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut state = KeyState::new();
        for name in names {
            if let Some(key) = Key::from_name(name) {
                state.press(key);
            }
        }
        state.flags()
    }

    /// Forward minus back: `-1`, `0` or `1`.
    #[must_use]
    pub fn thrust(self) -> f32 {
        axis(self.forward, self.back)
    }

    /// Up minus down.
    #[must_use]
    pub fn lift(self) -> f32 {
        axis(self.up, self.down)
    }

    /// Left minus right.
    #[must_use]
    pub fn turn(self) -> f32 {
        axis(self.yaw_left, self.yaw_right)
    }

    /// Whether any translation key is held.
    #[must_use]
    pub const fn is_driving(self) -> bool {
        self.forward || self.back || self.up || self.down
    }
}

fn axis(positive: bool, negative: bool) -> f32 {
    f32::from(u8::from(positive)) - f32::from(u8::from(negative))
}

/// Currently held keys.
#[derive(Debug, Clone, Default)]
pub struct KeyState {
    /// Held keys
    held: AHashSet<Key>,
}

impl KeyState {
    /// Creates an empty key state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a key press.
    pub fn press(&mut self, key: Key) {
        self.held.insert(key);
    }

    /// Records a key release.
    pub fn release(&mut self, key: Key) {
        self.held.remove(&key);
    }

    /// Releases everything (focus lost).
    pub fn clear(&mut self) {
        self.held.clear();
    }

    /// Whether `key` is held.
    #[must_use]
    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// Folds held keys into intents.
    #[must_use]
    pub fn flags(&self) -> InputFlags {
        InputFlags {
            forward: self.is_held(Key::ArrowUp),
            back: self.is_held(Key::ArrowDown),
            up: self.is_held(Key::W),
            down: self.is_held(Key::S),
            yaw_left: self.is_held(Key::ArrowLeft),
            yaw_right: self.is_held(Key::ArrowRight),
        }
    }
}
