//! Unipress headless demo.
//!
//! Runs the jumper game against the shared session lifecycle without a
//! window: a scripted autopilot presses the button, the world is ticked at a
//! fixed 60 Hz, and audio commands are drained and logged instead of played.
//!
//! # Main Loop
//!
//! 1. Load layered configuration and validate it into a [`GameLifecycle`]
//! 2. Insert resources (asset cache, high scores, audio bridge) and observers
//! 3. Each frame: autopilot input, advance [`WorldTime`], run the schedule
//! 4. Stop on Exit from the end screen or after `--frames` ticks
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=debug cargo run -- --difficulty 7 --frames 6000
//! ```

use std::path::PathBuf;

use bevy_ecs::prelude::*;
use clap::Parser;
use log::{debug, error, info};

use unipress::events::input::{InputAction, InputEvent};
use unipress::events::switchfullscreen::switch_fullscreen_observer;
use unipress::events::telemetry::GameEvent;
use unipress::game::{self, Jumper, QuitRequested};
use unipress::resources::assetcache::AssetCache;
use unipress::resources::audio::{setup_audio, shutdown_audio};
use unipress::resources::fullscreen::FullScreen;
use unipress::resources::gameconfig::GameConfig;
use unipress::resources::highscores::HighScoreStore;
use unipress::resources::lifecycle::GameLifecycle;
use unipress::resources::worldtime::WorldTime;
use unipress::systems::animation::animation;
use unipress::systems::audio::{forward_audio_cmds, update_bevy_audio_cmds};
use unipress::systems::gameconfig::apply_gameconfig_changes;
use unipress::systems::lifecycle::{
    apply_lifecycle_effects, gameplay_running, lifecycle_action_observer, log_game_events,
    update_game_event_messages, update_lifecycle,
};
use unipress::systems::time::update_world_time;

const FIXED_DT: f32 = 1.0 / 60.0;
/// Frames between autopilot presses on the start and pause screens.
const PAUSE_PRESS_INTERVAL: u64 = 45;
/// Frames between presses on the end screen; not a multiple of the menu
/// cycle, so the autopilot sometimes plays again and sometimes exits.
const END_SCREEN_PRESS_INTERVAL: u64 = 150;

/// Unipress one-button arcade session, headless demo
#[derive(Parser)]
#[command(version, about = "Runs the jumper demo headless with a scripted player.")]
struct Cli {
    /// Extra INI file applied after ./config.ini.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the difficulty (1-10).
    #[arg(long)]
    difficulty: Option<i32>,

    /// Override the number of lives.
    #[arg(long)]
    lives: Option<u32>,

    /// Stop after this many frames.
    #[arg(long, default_value_t = 3600)]
    frames: u64,

    /// Seed for obstacle placement and the autopilot.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Content root holding images/ and sounds/.
    #[arg(long, value_name = "DIR")]
    content: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // --------------- Configuration ---------------
    let mut config = GameConfig::new();
    let mut layers = vec![config.config_path.clone()];
    layers.extend(cli.config.clone());
    if let Err(e) = config.load_layered(&layers) {
        error!("{}", e);
        std::process::exit(1);
    }
    if let Some(difficulty) = cli.difficulty {
        config.difficulty = difficulty;
    }
    if let Some(lives) = cli.lives {
        config.lives = lives;
    }
    if let Some(content) = cli.content {
        config.content_root = content;
    }

    let lifecycle = match GameLifecycle::new(&config) {
        Ok(lifecycle) => lifecycle,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    // --------------- ECS world + resources ---------------
    let mut world = World::new();
    world.insert_resource(WorldTime::default());
    world.insert_resource(AssetCache::from_content_root(&config.content_root));
    world.insert_resource(HighScoreStore::open(&config.high_scores_path));
    world.insert_resource(config.audio_settings());
    if config.fullscreen {
        world.insert_resource(FullScreen {});
    }
    let scope = config.game_scope();
    world.insert_resource(config);
    world.insert_resource(lifecycle);
    world.insert_resource(Jumper::new(cli.seed));
    world.init_resource::<Messages<GameEvent>>();

    let audio_rx = setup_audio(&mut world);

    game::spawn_player(&mut world, scope);

    world.add_observer(lifecycle_action_observer);
    world.add_observer(switch_fullscreen_observer);
    world.add_observer(game::on_reset_game);
    world.add_observer(game::on_game_action);
    world.add_observer(game::on_exit_game);
    world.add_observer(game::on_reposition_cursor);
    world.flush();

    let mut update = Schedule::default();
    update.add_systems(
        (
            apply_gameconfig_changes,
            // Sound gate and blink timers, and the resets they queue, before
            // any gameplay.
            update_lifecycle,
            apply_lifecycle_effects,
            (game::jumper_update, animation).run_if(gameplay_running),
            log_game_events,
            forward_audio_cmds,
            update_bevy_audio_cmds,
            update_game_event_messages,
        )
            .chain(),
    );

    // --------------- Main loop ---------------
    let mut autopilot = fastrand::Rng::with_seed(cli.seed.wrapping_add(1));
    let mut frame: u64 = 0;
    while frame < cli.frames && !world.contains_resource::<QuitRequested>() {
        if autopilot_presses(&world, &mut autopilot, frame) {
            world.trigger(InputEvent::press(InputAction::Primary));
            world.trigger(InputEvent::release(InputAction::Primary));
        }

        update_world_time(&mut world, FIXED_DT);
        update.run(&mut world);
        world.clear_trackers();

        for cmd in audio_rx.try_iter() {
            debug!("[audio] {:?}", cmd);
        }
        frame += 1;
    }

    let lifecycle = world.resource::<GameLifecycle>();
    info!(
        "Stopped after {} frames: score={} lives={} best={}",
        frame,
        lifecycle.score(),
        lifecycle.lives(),
        world.resource::<HighScoreStore>().get(lifecycle.game_id())
    );
    shutdown_audio(&mut world);
}

/// Decide whether the scripted player presses the button this frame.
///
/// Pause screens get a press every [`PAUSE_PRESS_INTERVAL`] frames and the
/// end screen every [`END_SCREEN_PRESS_INTERVAL`]. During play the
/// autopilot jumps with a small chance per frame while an obstacle is in
/// range, so it misses now and then.
fn autopilot_presses(world: &World, rng: &mut fastrand::Rng, frame: u64) -> bool {
    let lifecycle = world.resource::<GameLifecycle>();
    if lifecycle.show_end_screen() {
        return frame % END_SCREEN_PRESS_INTERVAL == 0;
    }
    if lifecycle.is_paused() {
        return frame % PAUSE_PRESS_INTERVAL == 0;
    }
    let jumper = world.resource::<Jumper>();
    let distance = jumper.obstacle_distance();
    jumper.on_ground() && distance > 80.0 && distance < 240.0 && rng.f32() < 0.1
}
