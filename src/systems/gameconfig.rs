//! Game configuration change detection system.
//!
//! Monitors [`GameConfig`] and keeps the derived resources in step: the
//! [`AudioSettings`] used to mix sounds and the [`FullScreen`] marker.

use bevy_ecs::prelude::*;
use log::info;

use crate::resources::audio::AudioSettings;
use crate::resources::fullscreen::FullScreen;
use crate::resources::gameconfig::GameConfig;

/// Apply [`GameConfig`] when it is added or modified.
pub fn apply_gameconfig_changes(
    config: Res<GameConfig>,
    mut settings: ResMut<AudioSettings>,
    fullscreen: Option<Res<FullScreen>>,
    mut commands: Commands,
) {
    if !config.is_changed() {
        return;
    }
    let new_settings = config.audio_settings();
    if *settings != new_settings {
        info!(
            "Audio settings updated: master={} sfx={} ui={}",
            new_settings.master, new_settings.sfx, new_settings.ui
        );
        *settings = new_settings;
    }
    match (config.fullscreen, fullscreen.is_some()) {
        (true, false) => commands.insert_resource(FullScreen {}),
        (false, true) => commands.remove_resource::<FullScreen>(),
        _ => {}
    }
}
