//! Systems bridging ECS audio messages with the host backend.
//!
//! - [`forward_audio_cmds`] sends every [`AudioCmd`] written this frame down
//!   the [`AudioBridge`] channel.
//! - [`update_bevy_audio_cmds`] advances the ECS message queue.
//!
//! The host owns the receiving end returned by
//! [`setup_audio`](crate::resources::audio::setup_audio) and does the actual
//! decoding and playback wherever it likes.

use bevy_ecs::prelude::*;

use crate::events::audio::AudioCmd;
use crate::resources::audio::AudioBridge;

/// Forward ECS AudioCmd messages to the host via the AudioBridge sender.
pub fn forward_audio_cmds(bridge: Res<AudioBridge>, mut reader: MessageReader<AudioCmd>) {
    for cmd in reader.read() {
        // The host may already be gone during shutdown.
        let _ = bridge.tx_cmd.send(cmd.clone());
    }
}

/// Advance the ECS message queue for AudioCmd so same-frame readers can observe writes.
pub fn update_bevy_audio_cmds(mut msgs: ResMut<Messages<AudioCmd>>) {
    msgs.update();
}
