//! Event types and observers.
//!
//! Events decouple the lifecycle from the game plugged into it and from the
//! host's audio, logging and window layers.
//!
//! Submodules:
//! - [`audio`] – commands for the host audio backend
//! - [`input`] – logical button presses fed in by the host
//! - [`lifecycle`] – hooks the lifecycle fires into the game
//! - [`switchfullscreen`] – toggle the fullscreen marker
//! - [`telemetry`] – structured session events
pub mod audio;
pub mod input;
pub mod lifecycle;
pub mod switchfullscreen;
pub mod telemetry;
