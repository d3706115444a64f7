use bevy_ecs::message::Message;

use crate::resources::assetcache::Sound;

/// Commands sent *to* the host audio backend.
#[derive(Message, Debug, Clone, PartialEq)]
pub enum AudioCmd {
    /// Play a one-shot effect resolved from the sound catalog.
    PlayFx {
        /// Catalog name, e.g. `"ui_confirm"`.
        name: String,
        sound: Sound,
        /// Final volume in `[0, 1]`.
        volume: f32,
    },
    StopAll,
}
