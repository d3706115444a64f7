//! ECS components for entities.
//!
//! Submodules overview:
//! - [`animation`] – animation playback instances, the sprite component that
//!   owns them, and the marker for game-specific sprites

pub mod animation;
