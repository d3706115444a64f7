//! Hooks the lifecycle fires into the game.
//!
//! A game plugs into the shared session flow by observing these events:
//! [`ResetGameEvent`] to rebuild its playfield, [`GameActionEvent`] for the
//! button press during play, and optionally [`RepositionCursorEvent`].
//! [`ExitGameEvent`] tells the host the player chose to leave.

use bevy_ecs::prelude::*;

/// The playfield must be rebuilt (new session or resume after a lost life).
#[derive(Event, Debug, Clone, Copy)]
pub struct ResetGameEvent {}

/// The primary button was pressed while gameplay is running.
#[derive(Event, Debug, Clone, Copy)]
pub struct GameActionEvent {}

/// The player selected Exit on the end screen.
#[derive(Event, Debug, Clone, Copy)]
pub struct ExitGameEvent {}

/// Periodic nudge to move the pointer back to a neutral position.
#[derive(Event, Debug, Clone, Copy)]
pub struct RepositionCursorEvent {}
