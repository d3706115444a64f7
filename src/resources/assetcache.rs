//! Memoizing asset cache for textures, sounds, and animation definitions.
//!
//! Every lookup is keyed by `(scope, path)`: the same relative path may exist
//! both globally and for several games without clashing. Loads go through an
//! [`AssetSource`] so the cache never touches the filesystem directly; the
//! default [`FsSource`] reads from a content root laid out as
//!
//! ```text
//! <root>/images/global/<path>
//! <root>/images/games/<game>/<path>
//! <root>/sounds/global/<path>
//! <root>/sounds/games/<game>/<path>
//! ```
//!
//! Animation metadata lives next to its frames as
//! `images/<scope>/<name>_anim.json`.
//!
//! Failures never escape: a missing or malformed asset is logged once,
//! remembered, and reported as `None` on this and every later call until the
//! cache is cleared. Callers draw a placeholder shape or stay silent.

use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bevy_ecs::prelude::Resource;
use image::ImageReader;
use log::{debug, error, info, warn};
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use crate::components::animation::AnimationInstance;
use crate::resources::animationstore::{AnimationDefinition, AnimationFrame, AnimationMetadata};

const ANIMATION_SUFFIX: &str = "_anim.json";

/// Errors raised while loading a single asset.
///
/// These stay inside the cache; the public API converts them into logged
/// `None` results.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unrecognized image data in {path}: {source}")]
    UnsupportedImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("malformed animation metadata {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("animation '{0}' has no valid frames")]
    NoFrames(String),
    #[error("frame duration must be positive, got {0}")]
    InvalidDuration(f32),
}

/// Whether an asset is shared by all games or belongs to one of them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum AssetScope {
    #[default]
    Global,
    Game(String),
}

impl AssetScope {
    pub fn game(name: impl Into<String>) -> Self {
        AssetScope::Game(name.into())
    }

    /// Directory of this scope below `images/` or `sounds/`.
    fn dir(&self) -> PathBuf {
        match self {
            AssetScope::Global => PathBuf::from("global"),
            AssetScope::Game(name) => Path::new("games").join(name),
        }
    }
}

impl fmt::Display for AssetScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetScope::Global => f.write_str("global"),
            AssetScope::Game(name) => f.write_str(name),
        }
    }
}

/// Composite cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetKey {
    pub scope: AssetScope,
    pub path: String,
}

impl AssetKey {
    pub fn new(scope: &AssetScope, path: impl Into<String>) -> Self {
        Self {
            scope: scope.clone(),
            path: path.into(),
        }
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scope, self.path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum AssetKind {
    Texture,
    Sound,
    Animation,
}

/// Loaded image data. Cloning is cheap.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    /// `scope:path` key the texture was cached under.
    pub key: Arc<str>,
    pub width: u32,
    pub height: u32,
    pub bytes: Arc<[u8]>,
}

/// Loaded audio clip. Decoding and playback belong to the host backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Sound {
    pub key: Arc<str>,
    pub bytes: Arc<[u8]>,
}

/// Byte provider behind the cache.
pub trait AssetSource: Send + Sync {
    /// Read the file at `path`, relative to the content root.
    fn read(&self, path: &Path) -> Result<Vec<u8>, AssetError>;
}

/// Reads assets from a directory on disk.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for FsSource {
    fn read(&self, path: &Path) -> Result<Vec<u8>, AssetError> {
        let full_path = self.root.join(path);
        std::fs::read(&full_path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                AssetError::NotFound(full_path)
            } else {
                AssetError::Io {
                    path: full_path,
                    source,
                }
            }
        })
    }
}

/// In-memory asset source, handy for tests and embedded content.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: FxHashMap<PathBuf, Arc<[u8]>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl AsRef<Path>, bytes: impl Into<Vec<u8>>) {
        self.files
            .insert(path.as_ref().to_path_buf(), Arc::from(bytes.into()));
    }

    pub fn with_file(mut self, path: impl AsRef<Path>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(path, bytes);
        self
    }
}

impl AssetSource for MemorySource {
    fn read(&self, path: &Path) -> Result<Vec<u8>, AssetError> {
        self.files
            .get(path)
            .map(|bytes| bytes.to_vec())
            .ok_or_else(|| AssetError::NotFound(path.to_path_buf()))
    }
}

/// Number of cached entries per asset kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheInfo {
    pub textures: usize,
    pub sounds: usize,
    pub animations: usize,
}

/// Outcome of [`AssetCache::preload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PreloadReport {
    pub loaded: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Central, explicitly owned asset cache.
#[derive(Resource)]
pub struct AssetCache {
    source: Box<dyn AssetSource>,
    textures: FxHashMap<AssetKey, Texture>,
    sounds: FxHashMap<AssetKey, Sound>,
    animations: FxHashMap<AssetKey, Arc<AnimationDefinition>>,
    failed: FxHashSet<(AssetKind, AssetKey)>,
}

impl AssetCache {
    pub fn new(source: impl AssetSource + 'static) -> Self {
        info!("Asset cache initialized");
        Self {
            source: Box::new(source),
            textures: FxHashMap::default(),
            sounds: FxHashMap::default(),
            animations: FxHashMap::default(),
            failed: FxHashSet::default(),
        }
    }

    /// Cache backed by a content directory on disk.
    pub fn from_content_root(root: impl Into<PathBuf>) -> Self {
        let source = FsSource::new(root);
        info!("Content root: {:?}", source.root());
        Self::new(source)
    }

    /// Load (or fetch from cache) a texture.
    pub fn get_texture(&mut self, path: &str, scope: &AssetScope) -> Option<Texture> {
        let key = AssetKey::new(scope, path);
        if let Some(texture) = self.textures.get(&key) {
            return Some(texture.clone());
        }
        if self.has_failed(AssetKind::Texture, &key) {
            return None;
        }
        let full_path = Path::new("images").join(scope.dir()).join(path);
        let loaded = self
            .source
            .read(&full_path)
            .and_then(|bytes| decode_texture(&key, &full_path, bytes));
        match loaded {
            Ok(texture) => {
                debug!(
                    "texture loaded key='{}' size={}x{}",
                    key, texture.width, texture.height
                );
                self.textures.insert(key, texture.clone());
                Some(texture)
            }
            Err(e) => {
                self.remember_failure(AssetKind::Texture, key, &e);
                None
            }
        }
    }

    /// Load (or fetch from cache) a sound clip.
    pub fn get_sound(&mut self, path: &str, scope: &AssetScope) -> Option<Sound> {
        let key = AssetKey::new(scope, path);
        if let Some(sound) = self.sounds.get(&key) {
            return Some(sound.clone());
        }
        if self.has_failed(AssetKind::Sound, &key) {
            return None;
        }
        let full_path = Path::new("sounds").join(scope.dir()).join(path);
        match self.source.read(&full_path) {
            Ok(bytes) => {
                let sound = Sound {
                    key: Arc::from(key.to_string()),
                    bytes: Arc::from(bytes),
                };
                debug!("sound loaded key='{}'", key);
                self.sounds.insert(key, sound.clone());
                Some(sound)
            }
            Err(e) => {
                self.remember_failure(AssetKind::Sound, key, &e);
                None
            }
        }
    }

    /// Fetch the shared definition for `name`, loading it on first use.
    pub fn animation_definition(
        &mut self,
        name: &str,
        scope: &AssetScope,
    ) -> Option<Arc<AnimationDefinition>> {
        let key = AssetKey::new(scope, name);
        if let Some(definition) = self.animations.get(&key) {
            return Some(Arc::clone(definition));
        }
        if self.has_failed(AssetKind::Animation, &key) {
            return None;
        }
        match self.build_animation(name, scope) {
            Ok(definition) => {
                info!(
                    "animation loaded key='{}' frames={}",
                    key,
                    definition.frame_count()
                );
                let definition = Arc::new(definition);
                self.animations.insert(key, Arc::clone(&definition));
                Some(definition)
            }
            Err(e) => {
                self.remember_failure(AssetKind::Animation, key, &e);
                None
            }
        }
    }

    /// Fresh playback cursor over the cached definition for `name`.
    ///
    /// Every call returns an independent instance; the frame table itself is
    /// shared and never copied.
    pub fn load_animation(&mut self, name: &str, scope: &AssetScope) -> Option<AnimationInstance> {
        self.animation_definition(name, scope)
            .map(AnimationInstance::new)
    }

    fn build_animation(
        &mut self,
        name: &str,
        scope: &AssetScope,
    ) -> Result<AnimationDefinition, AssetError> {
        let metadata_path = Path::new("images")
            .join(scope.dir())
            .join(format!("{name}{ANIMATION_SUFFIX}"));
        let bytes = self.source.read(&metadata_path)?;
        let metadata =
            AnimationMetadata::from_slice(&bytes).map_err(|source| AssetError::Metadata {
                path: metadata_path.clone(),
                source,
            })?;

        // Frame files are relative to the metadata file, which may sit in a
        // subdirectory of the scope (e.g. "player/running").
        let base = Path::new(name).parent().unwrap_or(Path::new(""));
        let mut frames = Vec::with_capacity(metadata.frames.len());
        for frame in &metadata.frames {
            if !(frame.duration > 0.0) {
                warn!(
                    "skipping frame '{}' of animation '{}': duration {} is not positive",
                    frame.file, name, frame.duration
                );
                continue;
            }
            let texture_path = base.join(&frame.file);
            let texture_path = texture_path.to_string_lossy();
            let Some(texture) = self.get_texture(&texture_path, scope) else {
                warn!(
                    "skipping frame '{}' of animation '{}': texture unavailable",
                    frame.file, name
                );
                continue;
            };
            frames.push(AnimationFrame::new(texture, frame.duration, frame.hitbox));
        }

        AnimationDefinition::new(
            metadata.name,
            frames,
            metadata.looped,
            metadata.next_animation,
        )
    }

    /// Load a batch of assets up front, dispatching on the file suffix.
    pub fn preload(&mut self, scope: &AssetScope, paths: &[&str]) -> PreloadReport {
        let mut report = PreloadReport::default();
        for path in paths {
            let loaded = if let Some(name) = path
                .strip_suffix(ANIMATION_SUFFIX)
                .or_else(|| path.strip_suffix("_anim"))
            {
                self.animation_definition(name, scope).is_some()
            } else if has_suffix(path, &[".png", ".jpg", ".jpeg", ".gif", ".bmp"]) {
                self.get_texture(path, scope).is_some()
            } else if has_suffix(path, &[".ogg", ".wav", ".mp3"]) {
                self.get_sound(path, scope).is_some()
            } else {
                warn!("preload: unknown asset type '{}'", path);
                report.skipped += 1;
                continue;
            };
            if loaded {
                report.loaded += 1;
            } else {
                report.failed += 1;
            }
        }
        info!(
            "preloaded assets scope='{}' loaded={} failed={} skipped={}",
            scope, report.loaded, report.failed, report.skipped
        );
        report
    }

    /// Evict one scope, or everything when `scope` is `None`.
    ///
    /// Remembered failures for the evicted scope are forgotten as well, so a
    /// later session may try those files again.
    pub fn clear_cache(&mut self, scope: Option<&AssetScope>) {
        match scope {
            Some(scope) => {
                self.textures.retain(|key, _| &key.scope != scope);
                self.sounds.retain(|key, _| &key.scope != scope);
                self.animations.retain(|key, _| &key.scope != scope);
                self.failed.retain(|(_, key)| &key.scope != scope);
                info!("assets cleared for scope '{}'", scope);
            }
            None => {
                self.textures.clear();
                self.sounds.clear();
                self.animations.clear();
                self.failed.clear();
                info!("all assets cleared");
            }
        }
    }

    pub fn cache_info(&self) -> CacheInfo {
        CacheInfo {
            textures: self.textures.len(),
            sounds: self.sounds.len(),
            animations: self.animations.len(),
        }
    }

    fn has_failed(&self, kind: AssetKind, key: &AssetKey) -> bool {
        self.failed.contains(&(kind, key.clone()))
    }

    fn remember_failure(&mut self, kind: AssetKind, key: AssetKey, err: &AssetError) {
        error!("{:?} unavailable key='{}': {}", kind, key, err);
        self.failed.insert((kind, key));
    }
}

fn has_suffix(path: &str, suffixes: &[&str]) -> bool {
    let lower = path.to_ascii_lowercase();
    suffixes.iter().any(|s| lower.ends_with(s))
}

/// Probe the image header for its dimensions; pixels stay encoded until the
/// host uploads them.
fn decode_texture(key: &AssetKey, path: &Path, bytes: Vec<u8>) -> Result<Texture, AssetError> {
    let (width, height) = ImageReader::new(Cursor::new(&bytes))
        .with_guessed_format()
        .map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .into_dimensions()
        .map_err(|source| AssetError::UnsupportedImage {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Texture {
        key: Arc::from(key.to_string()),
        width,
        height,
        bytes: Arc::from(bytes),
    })
}

/// Blank image of the given size, encoded as `format`.
#[cfg(test)]
pub(crate) fn encoded_image(width: u32, height: u32, format: image::ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    image::DynamicImage::new_rgb8(width, height)
        .write_to(&mut Cursor::new(&mut bytes), format)
        .expect("encode test image");
    bytes
}

#[cfg(test)]
pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encoded_image(width, height, image::ImageFormat::Png)
}
