//! Sound catalog, volume mixing, and the bridge to the host audio backend.
//!
//! Games never name sound files directly. They ask for a catalog entry
//! (`"jump"`, `"ui_confirm"`, ...) through a [`SoundPlayer`]; the player
//! resolves it to a cached [`Sound`](crate::resources::assetcache::Sound),
//! computes the final volume, and emits an
//! [`AudioCmd::PlayFx`](crate::events::audio::AudioCmd) message. Playback
//! itself belongs to the host: [`setup_audio`] hands it the receiving end of
//! a channel that [`forward_audio_cmds`](crate::systems::audio::forward_audio_cmds)
//! feeds every frame.
//!
//! `play` returns whether the sound could be resolved. The lifecycle uses that
//! to decide between arming a sound gate and completing a transition at once.

use bevy_ecs::prelude::*;
use bevy_ecs::system::SystemParam;
use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{debug, warn};

use crate::events::audio::AudioCmd;
use crate::resources::assetcache::{AssetCache, AssetScope};

pub const GAME_START: &str = "game_start";
pub const JUMP: &str = "jump";
pub const SUCCESS: &str = "success";
pub const FAILURE: &str = "failure";
pub const HIGH_SCORE: &str = "high_score";
pub const GAME_OVER: &str = "game_over";
pub const UI_CYCLE: &str = "ui_cycle";
pub const UI_CONFIRM: &str = "ui_confirm";

/// Mixing bucket of a sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCategory {
    Sfx,
    Achievement,
    GameStart,
    Ui,
    Ambient,
}

/// Catalog entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundEvent {
    pub category: SoundCategory,
    /// Path below the scope's sound directory.
    pub file_path: &'static str,
    /// Per-event adjustment in `[0, 2]`.
    pub volume_multiplier: f32,
    /// Shared by all games rather than looked up per game.
    pub global: bool,
}

impl SoundEvent {
    const fn new(
        category: SoundCategory,
        file_path: &'static str,
        volume_multiplier: f32,
        global: bool,
    ) -> Self {
        Self {
            category,
            file_path,
            volume_multiplier,
            global,
        }
    }
}

/// Sounds every game can rely on.
pub static STANDARD_SOUND_EVENTS: [(&str, SoundEvent); 8] = [
    (
        GAME_START,
        SoundEvent::new(SoundCategory::GameStart, "system/game_start.ogg", 1.0, true),
    ),
    (
        JUMP,
        SoundEvent::new(SoundCategory::Sfx, "player/jump_01.ogg", 0.8, false),
    ),
    (
        SUCCESS,
        SoundEvent::new(SoundCategory::Sfx, "success/obstacle_cleared.ogg", 0.9, false),
    ),
    (
        FAILURE,
        SoundEvent::new(SoundCategory::Sfx, "player/collision_01.ogg", 1.0, false),
    ),
    (
        HIGH_SCORE,
        SoundEvent::new(
            SoundCategory::Achievement,
            "achievements/new_high_score.ogg",
            1.2,
            true,
        ),
    ),
    (
        GAME_OVER,
        SoundEvent::new(SoundCategory::Sfx, "system/game_over.ogg", 1.0, true),
    ),
    (
        UI_CYCLE,
        SoundEvent::new(SoundCategory::Ui, "ui/menu_cycle.ogg", 0.7, true),
    ),
    (
        UI_CONFIRM,
        SoundEvent::new(SoundCategory::Ui, "ui/confirm.ogg", 0.8, true),
    ),
];

pub fn sound_event(name: &str) -> Option<&'static SoundEvent> {
    STANDARD_SOUND_EVENTS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, event)| event)
}

static GLOBAL_SCOPE: AssetScope = AssetScope::Global;

/// Volume levels and the scope used for per-game sounds.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct AudioSettings {
    pub master: f32,
    pub sfx: f32,
    pub achievement: f32,
    pub game_start: f32,
    pub ui: f32,
    pub ambient: f32,
    pub game_scope: AssetScope,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master: 1.0,
            sfx: 0.7,
            achievement: 0.8,
            game_start: 0.8,
            ui: 0.6,
            ambient: 0.5,
            game_scope: AssetScope::Global,
        }
    }
}

impl AudioSettings {
    pub fn category_volume(&self, category: SoundCategory) -> f32 {
        match category {
            SoundCategory::Sfx => self.sfx,
            SoundCategory::Achievement => self.achievement,
            SoundCategory::GameStart => self.game_start,
            SoundCategory::Ui => self.ui,
            SoundCategory::Ambient => self.ambient,
        }
    }

    /// master × category × event multiplier, clamped to `[0, 1]`.
    ///
    /// An override replaces the mix entirely; it is clamped the same way.
    pub fn calculate_volume(&self, event: &SoundEvent, volume_override: Option<f32>) -> f32 {
        if let Some(volume) = volume_override {
            return volume.clamp(0.0, 1.0);
        }
        let multiplier = event.volume_multiplier.clamp(0.0, 2.0);
        (self.master * self.category_volume(event.category) * multiplier).clamp(0.0, 1.0)
    }

    pub fn scope_for(&self, event: &SoundEvent) -> &AssetScope {
        if event.global {
            &GLOBAL_SCOPE
        } else {
            &self.game_scope
        }
    }
}

/// Something that can play catalog sounds.
pub trait SoundPlayer {
    /// Play the catalog entry `name`, at `volume_override` instead of the
    /// mixed volume when given. Returns false when the entry is unknown or
    /// its file is unavailable.
    fn play_with_volume(&mut self, name: &str, volume_override: Option<f32>) -> bool;

    fn play(&mut self, name: &str) -> bool {
        self.play_with_volume(name, None)
    }
}

/// Player that has no sounds at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAudio;

impl SoundPlayer for SilentAudio {
    fn play_with_volume(&mut self, _name: &str, _volume_override: Option<f32>) -> bool {
        false
    }
}

/// Player that records requests, for headless runs and tests.
///
/// Names listed in `missing` behave as unavailable; `available` decides all
/// other names.
#[derive(Debug, Clone, Default)]
pub struct RecordingAudio {
    pub available: bool,
    pub missing: Vec<&'static str>,
    pub played: Vec<String>,
}

impl RecordingAudio {
    pub fn available() -> Self {
        Self {
            available: true,
            ..Self::default()
        }
    }

    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn count(&self, name: &str) -> usize {
        self.played.iter().filter(|n| *n == name).count()
    }
}

impl SoundPlayer for RecordingAudio {
    fn play_with_volume(&mut self, name: &str, _volume_override: Option<f32>) -> bool {
        if !self.available || self.missing.iter().any(|m| *m == name) {
            return false;
        }
        self.played.push(name.to_string());
        true
    }
}

/// Resolve a catalog entry into a ready-to-send command.
pub fn resolve_sound(
    name: &str,
    volume_override: Option<f32>,
    cache: &mut AssetCache,
    settings: &AudioSettings,
) -> Option<AudioCmd> {
    let Some(event) = sound_event(name) else {
        warn!("unknown sound event '{}'", name);
        return None;
    };
    let sound = cache.get_sound(event.file_path, settings.scope_for(event))?;
    let volume = settings.calculate_volume(event, volume_override);
    debug!("play sound '{}' volume={:.2}", name, volume);
    Some(AudioCmd::PlayFx {
        name: name.to_string(),
        sound,
        volume,
    })
}

/// System parameter bundling everything needed to play sounds from a system.
#[derive(SystemParam)]
pub struct SessionAudio<'w> {
    cache: ResMut<'w, AssetCache>,
    settings: Res<'w, AudioSettings>,
    cmds: MessageWriter<'w, AudioCmd>,
}

impl SessionAudio<'_> {
    pub fn cache(&mut self) -> &mut AssetCache {
        &mut self.cache
    }
}

impl SoundPlayer for SessionAudio<'_> {
    fn play_with_volume(&mut self, name: &str, volume_override: Option<f32>) -> bool {
        match resolve_sound(name, volume_override, &mut self.cache, &self.settings) {
            Some(cmd) => {
                self.cmds.write(cmd);
                true
            }
            None => false,
        }
    }
}

/// Bridge between the ECS world and the host audio backend.
#[derive(Resource)]
pub struct AudioBridge {
    /// Sender for [`AudioCmd`] messages (ECS -> host).
    pub tx_cmd: Sender<AudioCmd>,
}

/// Register the audio bridge and message queue.
///
/// Returns the receiver the host drains to actually play sounds.
pub fn setup_audio(world: &mut World) -> Receiver<AudioCmd> {
    let (tx_cmd, rx_cmd) = unbounded::<AudioCmd>();
    world.insert_resource(AudioBridge { tx_cmd });
    world.init_resource::<Messages<AudioCmd>>();
    rx_cmd
}

/// Stop all sounds and close the channel.
pub fn shutdown_audio(world: &mut World) {
    if let Some(bridge) = world.remove_resource::<AudioBridge>() {
        let _ = bridge.tx_cmd.send(AudioCmd::StopAll);
    }
}
