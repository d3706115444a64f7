//! Fullscreen toggle event and observer.
//!
//! [`InputAction::ToggleFullscreen`](crate::events::input::InputAction) is
//! turned into a [`SwitchFullScreenEvent`], handled by
//! [`switch_fullscreen_observer`]. The observer flips the [`FullScreen`]
//! marker resource and keeps [`GameConfig::fullscreen`] in step so the choice
//! is saved with the rest of the settings. Resizing the actual window is up
//! to the host, which watches the marker.

use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::info;

use crate::resources::fullscreen::FullScreen;
use crate::resources::gameconfig::GameConfig;

/// Event triggered to toggle fullscreen mode.
#[derive(Event, Debug, Clone, Copy)]
pub struct SwitchFullScreenEvent {}

/// Observer that toggles fullscreen mode when [`SwitchFullScreenEvent`] fires.
///
/// - If [`FullScreen`] exists: removes it.
/// - If [`FullScreen`] is absent: inserts it.
pub fn switch_fullscreen_observer(
    _trigger: On<SwitchFullScreenEvent>,
    mut commands: Commands,
    fullscreen: Option<Res<FullScreen>>,
    config: Option<ResMut<GameConfig>>,
) {
    let enable = fullscreen.is_none();
    if enable {
        info!("Entering full screen mode");
        commands.insert_resource(FullScreen {});
    } else {
        info!("Leaving full screen mode");
        commands.remove_resource::<FullScreen>();
    }
    if let Some(mut config) = config {
        config.fullscreen = enable;
    }
}
