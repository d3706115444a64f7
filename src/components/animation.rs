//! Animation playback state.
//!
//! - [`AnimationInstance`] is a cursor over a shared
//!   [`AnimationDefinition`]: frame index, time spent in that frame, and
//!   whether a non-looping playback has ended.
//! - [`AnimatedSprite`] is the component that owns an instance, loads
//!   animations by name through the [`AssetCache`], and follows
//!   `next_animation` chains.
//! - [`GameSpecific`] marks sprites that are reset when a session restarts.

use std::sync::Arc;

use bevy_ecs::prelude::Component;
use log::debug;

use crate::resources::animationstore::{AnimationDefinition, AnimationFrame, Hitbox};
use crate::resources::assetcache::{AssetCache, AssetScope, Texture};

/// Size of the square hitbox used when a sprite has no animation loaded.
pub const FALLBACK_HITBOX_SIZE: i32 = 64;

/// Independent playback cursor over a shared definition.
#[derive(Debug, Clone)]
pub struct AnimationInstance {
    definition: Arc<AnimationDefinition>,
    frame_index: usize,
    elapsed: f32,
    finished: bool,
}

impl AnimationInstance {
    pub fn new(definition: Arc<AnimationDefinition>) -> Self {
        Self {
            definition,
            frame_index: 0,
            elapsed: 0.0,
            finished: false,
        }
    }

    /// Advance playback by `dt` seconds. Returns true if the frame changed.
    ///
    /// Time left over after a frame boundary is carried into the next frame,
    /// so a looping animation stays in phase no matter how the deltas are
    /// sliced. A non-looping animation stops on its last frame and reports
    /// `finished` from then on.
    ///
    /// Whole loops are folded away before stepping, so one call visits each
    /// frame at most once regardless of `dt` or how short the frames are.
    pub fn update(&mut self, dt: f32) -> bool {
        if self.finished || dt <= 0.0 {
            return false;
        }
        self.elapsed += dt;

        let frames = self.definition.frames();
        let mut changed = false;
        if self.definition.looped {
            let total = self.definition.total_duration();
            if self.elapsed >= total {
                // A full cycle from any frame lands back on the same frame.
                self.elapsed %= total;
                changed = true;
            }
        }

        let mut steps = frames.len();
        while self.elapsed >= frames[self.frame_index].duration {
            if steps == 0 {
                // Durations below the resolution of `elapsed` stop shrinking it.
                self.elapsed = 0.0;
                break;
            }
            steps -= 1;
            self.elapsed -= frames[self.frame_index].duration;
            if self.frame_index + 1 < frames.len() {
                self.frame_index += 1;
            } else if self.definition.looped {
                self.frame_index = 0;
            } else {
                self.elapsed = 0.0;
                self.finished = true;
                break;
            }
            changed = true;
        }
        changed
    }

    pub fn definition(&self) -> &Arc<AnimationDefinition> {
        &self.definition
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    /// Seconds spent in the current frame.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn current_frame(&self) -> &AnimationFrame {
        &self.definition.frames()[self.frame_index]
    }

    pub fn current_texture(&self) -> &Texture {
        &self.current_frame().texture
    }

    pub fn current_hitbox(&self) -> Hitbox {
        self.current_frame().hitbox
    }

    pub fn next_animation(&self) -> Option<&str> {
        self.definition.next_animation.as_deref()
    }

    pub fn reset(&mut self) {
        self.frame_index = 0;
        self.elapsed = 0.0;
        self.finished = false;
    }
}

/// Component owning the active animation of a sprite.
#[derive(Debug, Clone, Component)]
pub struct AnimatedSprite {
    pub scope: AssetScope,
    current_key: Option<String>,
    instance: Option<AnimationInstance>,
}

impl AnimatedSprite {
    pub fn new(scope: AssetScope) -> Self {
        Self {
            scope,
            current_key: None,
            instance: None,
        }
    }

    /// Create the sprite and immediately try to load `name`.
    pub fn with_animation(scope: AssetScope, name: &str, cache: &mut AssetCache) -> Self {
        let mut sprite = Self::new(scope);
        sprite.set_animation(name, false, cache);
        sprite
    }

    /// Switch to the animation called `name`.
    ///
    /// Requesting the animation that is already playing does nothing unless
    /// `force` is set, in which case playback restarts from frame 0. Returns
    /// whether an animation is now playing under that name.
    pub fn set_animation(&mut self, name: &str, force: bool, cache: &mut AssetCache) -> bool {
        if !force && self.current_key.as_deref() == Some(name) && self.instance.is_some() {
            return true;
        }
        match cache.load_animation(name, &self.scope) {
            Some(instance) => {
                debug!("sprite animation set to '{}'", name);
                self.current_key = Some(name.to_string());
                self.instance = Some(instance);
                true
            }
            None => false,
        }
    }

    /// Advance the current animation and follow `next_animation` once it
    /// has finished.
    ///
    /// The switch happens on the update after the one that finished the
    /// playback, so the final frame is shown for at least one tick.
    pub fn update(&mut self, dt: f32, cache: &mut AssetCache) -> bool {
        let Some(instance) = self.instance.as_mut() else {
            return false;
        };
        if instance.is_finished() {
            if let Some(next) = instance.next_animation().map(str::to_string) {
                return self.set_animation(&next, true, cache);
            }
            return false;
        }
        instance.update(dt)
    }

    pub fn reset(&mut self) {
        if let Some(instance) = self.instance.as_mut() {
            instance.reset();
        }
    }

    pub fn current_key(&self) -> Option<&str> {
        self.current_key.as_deref()
    }

    pub fn instance(&self) -> Option<&AnimationInstance> {
        self.instance.as_ref()
    }

    pub fn current_texture(&self) -> Option<&Texture> {
        self.instance.as_ref().map(AnimationInstance::current_texture)
    }

    /// World-space hitbox for a sprite centered at `(x, y)`.
    ///
    /// Without a loaded animation a fixed square around the center is used,
    /// matching the placeholder rectangle drawn in that case.
    pub fn hitbox_at(&self, x: i32, y: i32) -> Hitbox {
        match &self.instance {
            Some(instance) => {
                let texture = instance.current_texture();
                let local = instance.current_hitbox();
                let left = x - texture.width as i32 / 2;
                let top = y - texture.height as i32 / 2;
                Hitbox::new(left + local.x, top + local.y, local.width, local.height)
            }
            None => {
                let half = FALLBACK_HITBOX_SIZE / 2;
                Hitbox::new(x - half, y - half, FALLBACK_HITBOX_SIZE, FALLBACK_HITBOX_SIZE)
            }
        }
    }
}

/// Marks entities whose animations restart with the session.
#[derive(Debug, Clone, Copy, Default, Component)]
pub struct GameSpecific;
