//! Per-tick player input.
//!
//! The outer application samples devices and hands the simulation a plain
//! [`PlayerInput`] snapshot each tick. [`InputState`] is a small helper for
//! building those snapshots from held/released button events.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Input sampled for one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Cursor position in viewport coordinates; the player walks toward it
    pub cursor: Vec2,
    /// Fire held
    pub fire: bool,
    /// Dash (strife) held
    pub dash: bool,
    /// Block held
    pub block: bool,
}

impl PlayerInput {
    /// Input with only a cursor position.
    #[must_use]
    pub const fn at(cursor: Vec2) -> Self {
        Self {
            cursor,
            fire: false,
            dash: false,
            block: false,
        }
    }

    /// Set fire.
    #[must_use]
    pub const fn with_fire(mut self, fire: bool) -> Self {
        self.fire = fire;
        self
    }

    /// Set dash.
    #[must_use]
    pub const fn with_dash(mut self, dash: bool) -> Self {
        self.dash = dash;
        self
    }

    /// Set block.
    #[must_use]
    pub const fn with_block(mut self, block: bool) -> Self {
        self.block = block;
        self
    }
}

/// State of a button (pressed, just pressed, released).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonState {
    /// Whether the button is currently held down
    pub pressed: bool,
    /// Whether the button went down this tick
    pub just_pressed: bool,
    /// Whether the button went up this tick
    pub just_released: bool,
}

impl ButtonState {
    /// Update the button state based on whether it's currently pressed.
    pub fn update(&mut self, is_pressed: bool) {
        self.just_pressed = is_pressed && !self.pressed;
        self.just_released = !is_pressed && self.pressed;
        self.pressed = is_pressed;
    }

    /// Clear the tick-specific edges.
    pub fn clear_tick(&mut self) {
        self.just_pressed = false;
        self.just_released = false;
    }
}

/// Player-facing buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    /// Fire the equipped weapons
    Fire,
    /// Strife dash
    Dash,
    /// Raise a block
    Block,
}

/// Accumulates device events between ticks.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    cursor: Vec2,
    fire: ButtonState,
    dash: ButtonState,
    block: ButtonState,
}

impl InputState {
    /// Creates an idle input state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the cursor.
    pub fn set_cursor(&mut self, cursor: Vec2) {
        self.cursor = cursor;
    }

    /// Records a button level.
    pub fn set_button(&mut self, button: Button, pressed: bool) {
        self.button_mut(button).update(pressed);
    }

    /// Current state of a button.
    #[must_use]
    pub fn button(&self, button: Button) -> ButtonState {
        match button {
            Button::Fire => self.fire,
            Button::Dash => self.dash,
            Button::Block => self.block,
        }
    }

    fn button_mut(&mut self, button: Button) -> &mut ButtonState {
        match button {
            Button::Fire => &mut self.fire,
            Button::Dash => &mut self.dash,
            Button::Block => &mut self.block,
        }
    }

    /// Snapshot for the coming tick.
    #[must_use]
    pub fn snapshot(&self) -> PlayerInput {
        PlayerInput {
            cursor: self.cursor,
            fire: self.fire.pressed,
            dash: self.dash.pressed,
            block: self.block.pressed,
        }
    }

    /// Clears edges once a tick has consumed the snapshot.
    pub fn end_tick(&mut self) {
        self.fire.clear_tick();
        self.dash.clear_tick();
        self.block.clear_tick();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_state() {
        let mut state = ButtonState::default();
        state.update(true);
        assert!(state.pressed && state.just_pressed);

        state.update(true);
        assert!(state.pressed && !state.just_pressed);

        state.update(false);
        assert!(!state.pressed && state.just_released);
    }

    #[test]
    fn test_snapshot_reflects_held_buttons() {
        let mut input = InputState::new();
        input.set_cursor(Vec2::new(40.0, 30.0));
        input.set_button(Button::Fire, true);
        input.set_button(Button::Block, true);
        input.set_button(Button::Block, false);

        let snap = input.snapshot();
        assert_eq!(snap, PlayerInput::at(Vec2::new(40.0, 30.0)).with_fire(true));
    }

    #[test]
    fn test_end_tick_clears_edges_only() {
        let mut input = InputState::new();
        input.set_button(Button::Dash, true);
        assert!(input.button(Button::Dash).just_pressed);

        input.end_tick();
        assert!(!input.button(Button::Dash).just_pressed);
        assert!(input.snapshot().dash);
    }
}
