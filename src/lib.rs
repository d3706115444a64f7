//! Unipress library.
//!
//! Shared plumbing for one-button arcade games: the session lifecycle (start,
//! pause after a lost life, game over, end screen) with its sound-gated
//! transitions, persisted high scores, and a frame-based animation and asset
//! cache. Everything is exposed as `bevy_ecs` resources, components, systems
//! and events so a game only adds its own playfield on top.

pub mod components;
pub mod events;
pub mod game;
pub mod resources;
pub mod systems;
