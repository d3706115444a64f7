//! Lifecycle integration tests: input observers, the tick schedule, effects,
//! telemetry and the audio bridge working together on one world.

use std::io::Cursor;

use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use crossbeam_channel::Receiver;

use unipress::components::animation::{AnimatedSprite, GameSpecific};
use unipress::events::audio::AudioCmd;
use unipress::events::input::{InputAction, InputEvent};
use unipress::events::lifecycle::{ExitGameEvent, GameActionEvent, ResetGameEvent};
use unipress::events::switchfullscreen::switch_fullscreen_observer;
use unipress::events::telemetry::GameEvent;
use unipress::resources::assetcache::{AssetCache, MemorySource};
use unipress::resources::audio::{SilentAudio, UI_CONFIRM, setup_audio};
use unipress::resources::endgamemenu::EndGameAction;
use unipress::resources::fullscreen::FullScreen;
use unipress::resources::gameconfig::GameConfig;
use unipress::resources::highscores::HighScoreStore;
use unipress::resources::lifecycle::{GameLifecycle, SessionPhase};
use unipress::resources::worldtime::WorldTime;
use unipress::systems::animation::animation;
use unipress::systems::audio::{forward_audio_cmds, update_bevy_audio_cmds};
use unipress::systems::lifecycle::{
    apply_lifecycle_effects, gameplay_running, lifecycle_action_observer,
    update_game_event_messages, update_lifecycle,
};
use unipress::systems::time::update_world_time;

const RUNNING: &str = "player/running";

#[derive(Resource, Default)]
struct Seen {
    telemetry: Vec<&'static str>,
    resets: u32,
    actions: u32,
    exits: u32,
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    image::DynamicImage::new_rgb8(width, height)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

fn content(with_sounds: bool) -> MemorySource {
    let mut source = MemorySource::new()
        .with_file("images/games/demo/player/run_01.png", png_bytes(32, 64))
        .with_file("images/games/demo/player/run_02.png", png_bytes(32, 64))
        .with_file(
            "images/games/demo/player/running_anim.json",
            br#"{
                "name": "running",
                "frames": [
                    { "file": "run_01.png", "duration": 0.1 },
                    { "file": "run_02.png", "duration": 0.1 }
                ]
            }"#
            .to_vec(),
        );
    if with_sounds {
        source.insert("sounds/global/ui/confirm.ogg", vec![1, 2, 3]);
    }
    source
}

fn record_telemetry(mut reader: MessageReader<GameEvent>, mut seen: ResMut<Seen>) {
    for event in reader.read() {
        seen.telemetry.push(event.name);
    }
}

struct Harness {
    world: World,
    schedule: Schedule,
    audio_rx: Receiver<AudioCmd>,
    sprite: Entity,
}

impl Harness {
    fn new(config: GameConfig, with_sounds: bool) -> Self {
        let mut world = World::new();
        world.insert_resource(WorldTime::default());
        world.insert_resource(AssetCache::new(content(with_sounds)));
        world.insert_resource(HighScoreStore::in_memory());
        world.insert_resource(config.audio_settings());
        world.insert_resource(GameLifecycle::new(&config).unwrap());
        let scope = config.game_scope();
        world.insert_resource(config);
        world.init_resource::<Messages<GameEvent>>();
        world.init_resource::<Seen>();
        let audio_rx = setup_audio(&mut world);

        let sprite = {
            let mut cache = world.resource_mut::<AssetCache>();
            AnimatedSprite::with_animation(scope, RUNNING, &mut cache)
        };
        let sprite = world.spawn((sprite, GameSpecific)).id();

        world.add_observer(lifecycle_action_observer);
        world.add_observer(switch_fullscreen_observer);
        world.add_observer(|_t: On<ResetGameEvent>, mut seen: ResMut<Seen>| seen.resets += 1);
        world.add_observer(|_t: On<GameActionEvent>, mut seen: ResMut<Seen>| seen.actions += 1);
        world.add_observer(|_t: On<ExitGameEvent>, mut seen: ResMut<Seen>| seen.exits += 1);
        world.flush();

        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                update_lifecycle,
                apply_lifecycle_effects,
                animation.run_if(gameplay_running),
                record_telemetry,
                forward_audio_cmds,
                update_bevy_audio_cmds,
                update_game_event_messages,
            )
                .chain(),
        );

        Harness {
            world,
            schedule,
            audio_rx,
            sprite,
        }
    }

    fn press(&mut self, action: InputAction) {
        self.world.trigger(InputEvent::press(action));
        self.world.trigger(InputEvent::release(action));
        self.world.flush();
    }

    fn tick(&mut self, dt: f32) {
        update_world_time(&mut self.world, dt);
        self.schedule.run(&mut self.world);
    }

    fn tick_n(&mut self, n: usize, dt: f32) {
        for _ in 0..n {
            self.tick(dt);
        }
    }

    fn lose_life(&mut self) {
        self.world
            .resource_scope(|world, mut lifecycle: Mut<GameLifecycle>| {
                let mut scores = world.resource_mut::<HighScoreStore>();
                lifecycle.lose_life(&mut SilentAudio, &mut scores);
            });
    }

    fn lifecycle(&self) -> &GameLifecycle {
        self.world.resource::<GameLifecycle>()
    }

    fn seen(&self) -> &Seen {
        self.world.resource::<Seen>()
    }

    fn frame_index(&self) -> usize {
        self.playback().0
    }

    /// Frame index and seconds spent in it.
    fn playback(&self) -> (usize, f32) {
        self.world
            .get::<AnimatedSprite>(self.sprite)
            .and_then(AnimatedSprite::instance)
            .map(|instance| (instance.frame_index(), instance.elapsed()))
            .unwrap()
    }

    fn drain_audio(&self) -> Vec<AudioCmd> {
        self.audio_rx.try_iter().collect()
    }
}

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

fn demo_config() -> GameConfig {
    GameConfig::for_game("demo")
}

#[test]
fn start_is_gated_behind_confirmation_sound() {
    let mut config = demo_config();
    config.sound_gate_duration = 0.5;
    let mut h = Harness::new(config, true);

    h.press(InputAction::Primary);
    assert!(h.lifecycle().waiting_for_sound());
    assert!(h.lifecycle().is_paused());

    h.tick(0.2);
    let played: Vec<_> = h
        .drain_audio()
        .into_iter()
        .filter_map(|cmd| match cmd {
            AudioCmd::PlayFx { name, .. } => Some(name),
            AudioCmd::StopAll => None,
        })
        .collect();
    assert_eq!(played, vec![UI_CONFIRM.to_string()]);

    // Pressing again while the gate is armed changes nothing.
    h.press(InputAction::Primary);
    h.tick(0.2);
    assert!(h.drain_audio().is_empty());
    assert!(!h.lifecycle().is_started());
    assert_eq!(h.seen().resets, 0);
    assert_eq!(h.seen().actions, 0);

    h.tick_n(2, 0.2);
    assert!(h.lifecycle().is_started());
    assert!(!h.lifecycle().is_paused());
    assert_eq!(h.seen().resets, 1);
    assert!(h.seen().telemetry.contains(&"game_started"));

    h.press(InputAction::Primary);
    assert_eq!(h.seen().actions, 1);
}

#[test]
fn start_completes_at_once_without_sound() {
    let mut h = Harness::new(demo_config(), false);

    h.press(InputAction::Primary);
    assert!(h.lifecycle().is_started());
    assert!(!h.lifecycle().waiting_for_sound());

    h.tick(0.05);
    assert_eq!(h.seen().resets, 1);
    assert_eq!(h.seen().telemetry, vec!["game_started"]);
    assert!(h.drain_audio().is_empty());
}

#[test]
fn animations_freeze_while_paused_and_reset_on_resume() {
    let mut h = Harness::new(demo_config(), false);
    h.press(InputAction::Primary);
    // The reset lands before the sprite advances on the start tick.
    h.tick(0.05);
    let (frame, elapsed) = h.playback();
    assert_eq!(frame, 0);
    assert!(approx_eq(elapsed, 0.05));

    h.tick_n(2, 0.05);
    assert_eq!(h.frame_index(), 1);

    h.lose_life();
    assert_eq!(h.lifecycle().phase(), SessionPhase::LifeLostPause);
    h.tick_n(5, 0.05);
    assert_eq!(h.frame_index(), 1);
    assert!(h.seen().telemetry.contains(&"life_lost"));

    // Presses during the blink are swallowed.
    h.press(InputAction::Primary);
    assert!(h.lifecycle().is_life_lost_pause());
    assert_eq!(h.seen().actions, 0);

    h.tick_n(20, 0.05);
    assert!(h.lifecycle().blink_finished());
    h.press(InputAction::Primary);
    assert_eq!(h.lifecycle().phase(), SessionPhase::Playing);

    h.tick(0.05);
    let (frame, elapsed) = h.playback();
    assert_eq!(frame, 0);
    assert!(approx_eq(elapsed, 0.05));
    assert_eq!(h.seen().resets, 2);
    assert!(h.seen().telemetry.contains(&"game_resumed"));
    assert_eq!(h.lifecycle().lives(), 2);
}

#[test]
fn sound_gate_opening_tick_keeps_its_animation_time() {
    let mut config = demo_config();
    config.sound_gate_duration = 0.3;
    let mut h = Harness::new(config, true);

    h.press(InputAction::Primary);
    h.tick(0.15);
    assert!(h.lifecycle().waiting_for_sound());
    assert_eq!(h.playback(), (0, 0.0));

    // The gate opens inside this tick; the restarted sprite still gets the
    // full delta.
    h.tick(0.15);
    assert!(h.lifecycle().is_started());
    let (frame, elapsed) = h.playback();
    assert_eq!(frame, 1);
    assert!(approx_eq(elapsed, 0.05));
}

#[test]
fn exit_from_end_screen_stops_audio_once() {
    let mut config = demo_config();
    config.lives = 1;
    let mut h = Harness::new(config, false);
    h.press(InputAction::Primary);
    h.tick(0.05);

    h.lose_life();
    assert!(h.lifecycle().show_end_screen());
    h.tick(0.05);
    assert!(h.seen().telemetry.contains(&"game_over"));

    let selected = |h: &Harness| h.lifecycle().end_menu().map(|m| m.selected_action());
    assert_eq!(selected(&h), Some(EndGameAction::PlayAgain));
    h.tick_n(4, 0.5);
    assert_eq!(selected(&h), Some(EndGameAction::Exit));

    h.press(InputAction::Primary);
    h.tick(0.05);
    assert_eq!(h.seen().exits, 1);
    assert!(h.lifecycle().exit_requested());
    assert_eq!(h.drain_audio(), vec![AudioCmd::StopAll]);

    h.press(InputAction::Primary);
    h.tick(0.05);
    assert_eq!(h.seen().exits, 1);
    assert!(h.drain_audio().is_empty());
}

#[test]
fn play_again_restarts_the_session() {
    let mut config = demo_config();
    config.lives = 1;
    let mut h = Harness::new(config, false);
    h.press(InputAction::Primary);
    h.tick(0.05);
    h.world.resource_mut::<GameLifecycle>().add_score(30);
    h.lose_life();
    assert_eq!(h.world.resource::<HighScoreStore>().get("demo"), 30);

    h.press(InputAction::Primary);
    h.tick(0.05);
    let lifecycle = h.lifecycle();
    assert_eq!(lifecycle.phase(), SessionPhase::Playing);
    assert_eq!(lifecycle.score(), 0);
    assert_eq!(lifecycle.lives(), 1);
    assert!(lifecycle.end_menu().is_none());
    assert_eq!(h.seen().resets, 2);
}

#[test]
fn fullscreen_key_toggles_marker_and_config() {
    let mut h = Harness::new(demo_config(), false);
    assert!(!h.world.contains_resource::<FullScreen>());

    h.press(InputAction::ToggleFullscreen);
    h.tick(0.0);
    assert!(h.world.contains_resource::<FullScreen>());
    assert!(h.world.resource::<GameConfig>().fullscreen);
    // The lifecycle never saw the key.
    assert!(h.lifecycle().waiting_for_start_click());

    h.press(InputAction::ToggleFullscreen);
    h.tick(0.0);
    assert!(!h.world.contains_resource::<FullScreen>());
    assert!(!h.world.resource::<GameConfig>().fullscreen);
}
