//! Debounced key state consumed by behaviors and progression.

use std::collections::HashMap;

/// Keys the core tracks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Fire,
    Pause,
    Confirm,
}

impl Key {
    pub const ALL: [Key; 5] = [Key::Left, Key::Right, Key::Fire, Key::Pause, Key::Confirm];
}

/// Events delivered by the windowing collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Pressed(Key),
    Released(Key),
    Closed,
}

/// One pressed flag per tracked key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputState {
    keys: HashMap<Key, bool>,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            keys: Key::ALL.iter().map(|&key| (key, false)).collect(),
        }
    }
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_pressed(&mut self, key: Key, pressed: bool) {
        self.keys.insert(key, pressed);
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.keys.get(&key).copied().unwrap_or(false)
    }

    /// Applies a press/release event. `Closed` is the scheduler's business.
    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::Pressed(key) => self.set_pressed(key, true),
            InputEvent::Released(key) => self.set_pressed(key, false),
            InputEvent::Closed => {}
        }
    }

    /// -1, 0 or 1 from the left/right pair.
    pub fn horizontal(&self) -> i32 {
        i32::from(self.is_pressed(Key::Right)) - i32::from(self.is_pressed(Key::Left))
    }

    pub fn release_all(&mut self) {
        for pressed in self.keys.values_mut() {
            *pressed = false;
        }
    }
}
