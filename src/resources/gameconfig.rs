//! Game configuration resource.
//!
//! Typed session settings loaded from layered INI files. Values start from
//! safe defaults; each file in the layer list overrides only the keys it
//! sets, so a per-game file can adjust difficulty while inheriting the
//! global audio levels.
//!
//! # Configuration File Format
//!
//! ```ini
//! [game]
//! id = jumper
//! difficulty = 5
//! lives = 3
//!
//! [ui]
//! fullscreen = true
//! blink_duration = 1.0
//! menu_cycle_interval = 2.0
//! cursor_reposition_interval = 5.0
//!
//! [audio]
//! master = 1.0
//! sfx = 0.7
//! ui = 0.6
//! music = 0.5
//! sound_gate_duration = 3.0
//!
//! [paths]
//! content = ./assets
//! high_scores = ./high_scores.json
//! ```

use std::path::{Path, PathBuf};

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::{debug, info};
use thiserror::Error;

use crate::resources::assetcache::AssetScope;
use crate::resources::audio::AudioSettings;

const DEFAULT_GAME_ID: &str = "jumper";
const DEFAULT_DIFFICULTY: i32 = 5;
const DEFAULT_LIVES: u32 = 3;
const DEFAULT_FULLSCREEN: bool = true;
const DEFAULT_BLINK_DURATION: f32 = 1.0;
const DEFAULT_MENU_CYCLE_INTERVAL: f32 = 2.0;
const DEFAULT_CURSOR_REPOSITION_INTERVAL: f32 = 5.0;
const DEFAULT_SOUND_GATE_DURATION: f32 = 3.0;
const DEFAULT_MASTER_VOLUME: f32 = 1.0;
const DEFAULT_CONTENT_ROOT: &str = "./assets";
const DEFAULT_HIGH_SCORES_PATH: &str = "./high_scores.json";
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

pub const MIN_DIFFICULTY: i32 = 1;
pub const MAX_DIFFICULTY: i32 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("difficulty {0} is outside 1..=10")]
    DifficultyOutOfRange(i32),
    #[error("a session needs at least one life")]
    NoLives,
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f32 },
    #[error("{name} must be within 0..=1, got {value}")]
    VolumeOutOfRange { name: &'static str, value: f32 },
    #[error("failed to load config file {path}: {message}")]
    Load { path: PathBuf, message: String },
    #[error("failed to save config file {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Identifier used for per-game assets and the high score table.
    pub game_id: String,
    /// 1 (easiest) to 10.
    pub difficulty: i32,
    pub lives: u32,
    pub fullscreen: bool,
    /// Length of the blink shown after losing a life, in seconds.
    pub blink_duration: f32,
    pub menu_cycle_interval: f32,
    pub cursor_reposition_interval: f32,
    /// Nominal length of confirmation sounds the lifecycle waits for.
    pub sound_gate_duration: f32,
    pub master_volume: f32,
    /// Category overrides; `None` keeps the built-in level.
    pub sfx_volume: Option<f32>,
    pub ui_volume: Option<f32>,
    pub music_volume: Option<f32>,
    pub content_root: PathBuf,
    pub high_scores_path: PathBuf,
    /// File written by [`GameConfig::save_to_file`].
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    pub fn new() -> Self {
        Self {
            game_id: DEFAULT_GAME_ID.to_string(),
            difficulty: DEFAULT_DIFFICULTY,
            lives: DEFAULT_LIVES,
            fullscreen: DEFAULT_FULLSCREEN,
            blink_duration: DEFAULT_BLINK_DURATION,
            menu_cycle_interval: DEFAULT_MENU_CYCLE_INTERVAL,
            cursor_reposition_interval: DEFAULT_CURSOR_REPOSITION_INTERVAL,
            sound_gate_duration: DEFAULT_SOUND_GATE_DURATION,
            master_volume: DEFAULT_MASTER_VOLUME,
            sfx_volume: None,
            ui_volume: None,
            music_volume: None,
            content_root: PathBuf::from(DEFAULT_CONTENT_ROOT),
            high_scores_path: PathBuf::from(DEFAULT_HIGH_SCORES_PATH),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    pub fn for_game(game_id: impl Into<String>) -> Self {
        Self {
            game_id: game_id.into(),
            ..Self::new()
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load `config_path`, overriding only the keys present in the file.
    pub fn load_from_file(&mut self) -> Result<(), ConfigError> {
        let path = self.config_path.clone();
        self.apply_file(&path)
    }

    /// Apply each file in order. Files that do not exist are skipped; later
    /// files win. The last existing file becomes `config_path`.
    pub fn load_layered<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<(), ConfigError> {
        for path in paths {
            let path = path.as_ref();
            if !path.exists() {
                debug!("Config layer {:?} not found, skipping", path);
                continue;
            }
            self.apply_file(path)?;
            self.config_path = path.to_path_buf();
        }
        Ok(())
    }

    fn apply_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let load_err = |message: String| ConfigError::Load {
            path: path.to_path_buf(),
            message,
        };
        let mut config = Ini::new();
        config.load(path).map_err(load_err)?;

        // [game] section
        if let Some(id) = config.get("game", "id") {
            self.game_id = id;
        }
        if let Some(difficulty) = config.getint("game", "difficulty").map_err(load_err)? {
            self.difficulty = difficulty as i32;
        }
        if let Some(lives) = config.getuint("game", "lives").map_err(load_err)? {
            self.lives = lives as u32;
        }

        // [ui] section
        if let Some(fullscreen) = config.getbool("ui", "fullscreen").map_err(load_err)? {
            self.fullscreen = fullscreen;
        }
        read_f32(&config, "ui", "blink_duration", &mut self.blink_duration).map_err(load_err)?;
        read_f32(&config, "ui", "menu_cycle_interval", &mut self.menu_cycle_interval)
            .map_err(load_err)?;
        read_f32(
            &config,
            "ui",
            "cursor_reposition_interval",
            &mut self.cursor_reposition_interval,
        )
        .map_err(load_err)?;

        // [audio] section
        read_f32(&config, "audio", "master", &mut self.master_volume).map_err(load_err)?;
        read_f32(
            &config,
            "audio",
            "sound_gate_duration",
            &mut self.sound_gate_duration,
        )
        .map_err(load_err)?;
        for (key, slot) in [
            ("sfx", &mut self.sfx_volume),
            ("ui", &mut self.ui_volume),
            ("music", &mut self.music_volume),
        ] {
            if let Some(value) = config.getfloat("audio", key).map_err(load_err)? {
                *slot = Some(value as f32);
            }
        }

        // [paths] section
        if let Some(content) = config.get("paths", "content") {
            self.content_root = PathBuf::from(content);
        }
        if let Some(high_scores) = config.get("paths", "high_scores") {
            self.high_scores_path = PathBuf::from(high_scores);
        }

        info!(
            "Loaded config {:?}: game={} difficulty={} lives={} fullscreen={}",
            path, self.game_id, self.difficulty, self.lives, self.fullscreen
        );
        Ok(())
    }

    /// Save configuration to `config_path`.
    pub fn save_to_file(&self) -> Result<(), ConfigError> {
        let mut config = Ini::new();

        // [game] section
        config.set("game", "id", Some(self.game_id.clone()));
        config.set("game", "difficulty", Some(self.difficulty.to_string()));
        config.set("game", "lives", Some(self.lives.to_string()));

        // [ui] section
        config.set("ui", "fullscreen", Some(self.fullscreen.to_string()));
        config.set("ui", "blink_duration", Some(self.blink_duration.to_string()));
        config.set(
            "ui",
            "menu_cycle_interval",
            Some(self.menu_cycle_interval.to_string()),
        );
        config.set(
            "ui",
            "cursor_reposition_interval",
            Some(self.cursor_reposition_interval.to_string()),
        );

        // [audio] section
        config.set("audio", "master", Some(self.master_volume.to_string()));
        config.set(
            "audio",
            "sound_gate_duration",
            Some(self.sound_gate_duration.to_string()),
        );
        for (key, value) in [
            ("sfx", self.sfx_volume),
            ("ui", self.ui_volume),
            ("music", self.music_volume),
        ] {
            if let Some(value) = value {
                config.set("audio", key, Some(value.to_string()));
            }
        }

        // [paths] section
        config.set(
            "paths",
            "content",
            Some(self.content_root.to_string_lossy().into_owned()),
        );
        config.set(
            "paths",
            "high_scores",
            Some(self.high_scores_path.to_string_lossy().into_owned()),
        );

        config
            .write(&self.config_path)
            .map_err(|source| ConfigError::Save {
                path: self.config_path.clone(),
                source,
            })?;

        info!("Saved config to {:?}", self.config_path);
        Ok(())
    }

    /// Check the values a session cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&self.difficulty) {
            return Err(ConfigError::DifficultyOutOfRange(self.difficulty));
        }
        if self.lives == 0 {
            return Err(ConfigError::NoLives);
        }
        for (name, value) in [
            ("blink_duration", self.blink_duration),
            ("menu_cycle_interval", self.menu_cycle_interval),
            ("cursor_reposition_interval", self.cursor_reposition_interval),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        // A zero gate is allowed: transitions then complete on the next tick.
        if !(self.sound_gate_duration >= 0.0) {
            return Err(ConfigError::NonPositive {
                name: "sound_gate_duration",
                value: self.sound_gate_duration,
            });
        }
        let volumes = [
            ("master", Some(self.master_volume)),
            ("sfx", self.sfx_volume),
            ("ui", self.ui_volume),
            ("music", self.music_volume),
        ];
        for (name, value) in volumes {
            if let Some(value) = value
                && !(0.0..=1.0).contains(&value)
            {
                return Err(ConfigError::VolumeOutOfRange { name, value });
            }
        }
        Ok(())
    }

    /// Volume levels for this game, built-in levels where not overridden.
    pub fn audio_settings(&self) -> AudioSettings {
        let defaults = AudioSettings::default();
        AudioSettings {
            master: self.master_volume,
            sfx: self.sfx_volume.unwrap_or(defaults.sfx),
            ui: self.ui_volume.unwrap_or(defaults.ui),
            ambient: self.music_volume.unwrap_or(defaults.ambient),
            game_scope: AssetScope::game(self.game_id.clone()),
            ..defaults
        }
    }

    pub fn game_scope(&self) -> AssetScope {
        AssetScope::game(self.game_id.clone())
    }
}

fn read_f32(config: &Ini, section: &str, key: &str, slot: &mut f32) -> Result<(), String> {
    if let Some(value) = config.getfloat(section, key)? {
        *slot = value as f32;
    }
    Ok(())
}
