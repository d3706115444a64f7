//! Input action events.
//!
//! The host translates whatever hardware it has (keyboard, mouse, a single
//! arcade button) into [`InputEvent`]s and triggers them on the world. The
//! lifecycle observer reacts to [`InputAction::Primary`]; the fullscreen
//! observer reacts to [`InputAction::ToggleFullscreen`].

use bevy_ecs::prelude::*;

/// Enumeration of logical input actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    /// The one game button (default: Space or left click).
    Primary,
    /// Switch between windowed and fullscreen (default: F10).
    ToggleFullscreen,
}

/// Event emitted when an input action is pressed or released.
#[derive(Event, Debug, Clone, Copy)]
pub struct InputEvent {
    pub action: InputAction,
    /// Whether the action was pressed (true) or released (false).
    pub pressed: bool,
}

impl InputEvent {
    pub fn press(action: InputAction) -> Self {
        Self {
            action,
            pressed: true,
        }
    }

    pub fn release(action: InputAction) -> Self {
        Self {
            action,
            pressed: false,
        }
    }
}
