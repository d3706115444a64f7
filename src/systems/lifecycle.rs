//! Systems and observers driving [`GameLifecycle`].
//!
//! - [`lifecycle_action_observer`] routes button presses into the lifecycle
//!   and, when gameplay is running, on to the game as [`GameActionEvent`].
//! - [`update_lifecycle`] ticks the sound gate, blink, end menu and cursor
//!   timers. It must run before any gameplay system.
//! - [`gameplay_running`] is the run condition for gameplay systems.
//! - [`apply_lifecycle_effects`] turns queued [`LifecycleEffect`]s into
//!   observer triggers and animation resets, and publishes telemetry. It runs
//!   right after [`update_lifecycle`] so a transition completed by the sound
//!   gate is applied before gameplay advances on the same tick.
//! - [`log_game_events`] / [`update_game_event_messages`] consume and age the
//!   [`GameEvent`] queue.

use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::{debug, info};

use crate::components::animation::{AnimatedSprite, GameSpecific};
use crate::events::audio::AudioCmd;
use crate::events::input::{InputAction, InputEvent};
use crate::events::lifecycle::{
    ExitGameEvent, GameActionEvent, RepositionCursorEvent, ResetGameEvent,
};
use crate::events::switchfullscreen::SwitchFullScreenEvent;
use crate::events::telemetry::GameEvent;
use crate::resources::audio::SessionAudio;
use crate::resources::lifecycle::{ActionOutcome, GameLifecycle, LifecycleEffect};
use crate::resources::worldtime::WorldTime;

/// Run condition: true while the session is actually being played.
pub fn gameplay_running(lifecycle: Option<Res<GameLifecycle>>) -> bool {
    lifecycle.is_some_and(|lifecycle| !lifecycle.is_paused())
}

/// Advance the lifecycle timers by the frame delta.
pub fn update_lifecycle(
    time: Res<WorldTime>,
    mut lifecycle: ResMut<GameLifecycle>,
    mut audio: SessionAudio,
) {
    lifecycle.update(time.delta, &mut audio);
}

/// Observer translating [`InputEvent`]s.
///
/// Only presses count. The primary button goes through
/// [`GameLifecycle::on_action`]; the fullscreen key triggers
/// [`SwitchFullScreenEvent`].
pub fn lifecycle_action_observer(
    trigger: On<InputEvent>,
    mut lifecycle: ResMut<GameLifecycle>,
    mut audio: SessionAudio,
    mut commands: Commands,
) {
    let event = trigger.event();
    if !event.pressed {
        return;
    }
    match event.action {
        InputAction::Primary => {
            if lifecycle.on_action(&mut audio) == ActionOutcome::Gameplay {
                commands.trigger(GameActionEvent {});
            }
        }
        InputAction::ToggleFullscreen => {
            commands.trigger(SwitchFullScreenEvent {});
        }
    }
}

/// Apply queued lifecycle effects and publish telemetry.
///
/// Contract
/// - `ResetAnimations` restarts every [`AnimatedSprite`] tagged [`GameSpecific`].
/// - `ResetGame`, `ExitGame` and `RepositionCursor` trigger their events.
/// - `ExitGame` also stops all audio.
/// - Telemetry is written as [`GameEvent`] messages.
pub fn apply_lifecycle_effects(
    mut lifecycle: ResMut<GameLifecycle>,
    mut sprites: Query<&mut AnimatedSprite, With<GameSpecific>>,
    mut telemetry: MessageWriter<GameEvent>,
    mut audio_cmds: MessageWriter<AudioCmd>,
    mut commands: Commands,
) {
    for effect in lifecycle.drain_effects() {
        debug!("Applying lifecycle effect {:?}", effect);
        match effect {
            LifecycleEffect::ResetAnimations => {
                for mut sprite in sprites.iter_mut() {
                    sprite.reset();
                }
            }
            LifecycleEffect::ResetGame => commands.trigger(ResetGameEvent {}),
            LifecycleEffect::ExitGame => {
                audio_cmds.write(AudioCmd::StopAll);
                commands.trigger(ExitGameEvent {});
            }
            LifecycleEffect::RepositionCursor => commands.trigger(RepositionCursorEvent {}),
        }
    }
    telemetry.write_batch(lifecycle.drain_events());
}

/// Write telemetry to the log.
pub fn log_game_events(mut reader: MessageReader<GameEvent>) {
    for event in reader.read() {
        info!("[telemetry] {}", event);
    }
}

/// Advance the ECS message queue for [`GameEvent`].
pub fn update_game_event_messages(mut msgs: ResMut<Messages<GameEvent>>) {
    msgs.update();
}
