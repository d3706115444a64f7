//! Animation system.
//!
//! [`animation`] forwards the frame delta to every [`AnimatedSprite`]. It is
//! scheduled behind [`gameplay_running`](crate::systems::lifecycle::gameplay_running)
//! so sprites freeze while the session is paused.
//!
//! # Animation Flow
//!
//! 1. Definitions are loaded and shared by the
//!    [`AssetCache`](crate::resources::assetcache::AssetCache)
//! 2. Each [`AnimatedSprite`] owns an independent playback instance
//! 3. This system advances the instance and follows `next_animation` chains
//! 4. Draw code reads the current texture and hitbox from the sprite

use bevy_ecs::prelude::*;

use crate::components::animation::AnimatedSprite;
use crate::resources::assetcache::AssetCache;
use crate::resources::worldtime::WorldTime;

/// Advance animation playback.
///
/// Contract
/// - Reads [`WorldTime`] for the scaled delta.
/// - Uses [`AssetCache`] to load chained animations.
/// - Mutates [`AnimatedSprite`] playback state.
pub fn animation(
    mut query: Query<&mut AnimatedSprite>,
    mut cache: ResMut<AssetCache>,
    time: Res<WorldTime>,
) {
    for mut sprite in query.iter_mut() {
        sprite.update(time.delta, &mut cache);
    }
}
