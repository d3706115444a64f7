//! Animation definitions shared by every playback cursor.
//!
//! An [`AnimationDefinition`] is the immutable frame table loaded once by
//! [`AssetCache`](crate::resources::assetcache::AssetCache) and handed out
//! behind an `Arc`. Playback state lives elsewhere, in
//! [`AnimationInstance`](crate::components::animation::AnimationInstance), so
//! any number of sprites can animate from the same definition without
//! touching each other.
//!
//! # Metadata Format
//!
//! ```json
//! {
//!   "name": "running",
//!   "frames": [
//!     { "file": "running_01.png", "duration": 0.1 },
//!     { "file": "running_02.png", "duration": 0.1, "hitbox": { "x": 4, "y": 0, "width": 24, "height": 60 } }
//!   ],
//!   "loop": true,
//!   "next_animation": null
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::resources::assetcache::{AssetError, Texture};

/// Collision rectangle for a single frame, in texture pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hitbox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Hitbox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Hitbox covering the whole texture.
    pub fn full(texture: &Texture) -> Self {
        Self::new(0, 0, texture.width as i32, texture.height as i32)
    }

    /// Axis-aligned overlap test.
    pub fn overlaps(&self, other: &Hitbox) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}

/// One frame of an animation: what to draw, for how long, and where it hurts.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationFrame {
    pub texture: Texture,
    /// Seconds this frame stays on screen. Always positive.
    pub duration: f32,
    pub hitbox: Hitbox,
}

impl AnimationFrame {
    /// Build a frame, defaulting the hitbox to the full texture bounds.
    pub fn new(texture: Texture, duration: f32, hitbox: Option<Hitbox>) -> Self {
        let hitbox = hitbox.unwrap_or_else(|| Hitbox::full(&texture));
        Self {
            texture,
            duration,
            hitbox,
        }
    }
}

/// Immutable, shareable frame table.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationDefinition {
    pub name: String,
    frames: Vec<AnimationFrame>,
    pub looped: bool,
    /// Animation the owner should switch to once a non-looping playback ends.
    pub next_animation: Option<String>,
}

impl AnimationDefinition {
    /// Validate and build a definition.
    ///
    /// Fails when there are no frames or any frame has a non-positive
    /// duration; an empty animation can never be played.
    pub fn new(
        name: impl Into<String>,
        frames: Vec<AnimationFrame>,
        looped: bool,
        next_animation: Option<String>,
    ) -> Result<Self, AssetError> {
        let name = name.into();
        if frames.is_empty() {
            return Err(AssetError::NoFrames(name));
        }
        if let Some(frame) = frames.iter().find(|f| !(f.duration > 0.0)) {
            return Err(AssetError::InvalidDuration(frame.duration));
        }
        Ok(Self {
            name,
            frames,
            looped,
            next_animation,
        })
    }

    pub fn frames(&self) -> &[AnimationFrame] {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frame(&self, index: usize) -> Option<&AnimationFrame> {
        self.frames.get(index)
    }

    /// Sum of all frame durations, i.e. the length of one loop.
    pub fn total_duration(&self) -> f32 {
        self.frames.iter().map(|f| f.duration).sum()
    }
}

/// On-disk animation metadata (`<name>_anim.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationMetadata {
    pub name: String,
    pub frames: Vec<FrameMetadata>,
    #[serde(rename = "loop", default = "default_looped")]
    pub looped: bool,
    #[serde(default)]
    pub next_animation: Option<String>,
}

/// A single frame entry in [`AnimationMetadata`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameMetadata {
    /// Image file, relative to the metadata file.
    pub file: String,
    pub duration: f32,
    #[serde(default)]
    pub hitbox: Option<Hitbox>,
}

fn default_looped() -> bool {
    true
}

impl AnimationMetadata {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
