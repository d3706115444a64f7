//! Full screen marker resource.
//!
//! The mere presence of this resource indicates that the game should be shown
//! full screen. It is inserted at startup when
//! [`GameConfig::fullscreen`](crate::resources::gameconfig::GameConfig) is set
//! and toggled by
//! [`switch_fullscreen_observer`](crate::events::switchfullscreen::switch_fullscreen_observer).
use bevy_ecs::prelude::Resource;

/// Marker resource: when present, the game runs in full screen mode.
#[derive(Resource, Clone, Copy)]
pub struct FullScreen {}
