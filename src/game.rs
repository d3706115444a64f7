//! Headless one-button "jumper" built on the shared lifecycle.
//!
//! The player stands still while obstacles slide in from the right; the
//! button makes the player jump. Clearing an obstacle scores points, touching
//! one costs a life. Everything session-related (start screen, pauses, game
//! over, high score) comes from [`GameLifecycle`]; this module only holds the
//! game's own physics and its reactions to the lifecycle hooks.

use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::{debug, info};

use crate::components::animation::{AnimatedSprite, GameSpecific};
use crate::events::lifecycle::{
    ExitGameEvent, GameActionEvent, RepositionCursorEvent, ResetGameEvent,
};
use crate::resources::animationstore::Hitbox;
use crate::resources::assetcache::{AssetCache, AssetScope};
use crate::resources::audio::{JUMP, SUCCESS, SessionAudio, SoundPlayer};
use crate::resources::highscores::HighScoreStore;
use crate::resources::lifecycle::GameLifecycle;
use crate::resources::worldtime::WorldTime;

pub const RUN_ANIMATION: &str = "player/running";
pub const JUMP_ANIMATION: &str = "player/jumping";

pub const PLAYER_X: f32 = 100.0;
const PLAYER_HALF_HEIGHT: f32 = 32.0;
const GRAVITY: f32 = 1800.0;
const JUMP_VELOCITY: f32 = 700.0;
const OBSTACLE_WIDTH: i32 = 32;
const OBSTACLE_HEIGHT: i32 = 48;
/// Distance an obstacle covers in one reaction time.
const OBSTACLE_TRAVEL: f32 = 500.0;
const SPAWN_MIN_X: f32 = 600.0;
const SPAWN_MAX_X: f32 = 900.0;
pub const POINTS_PER_OBSTACLE: u32 = 10;

/// Marker for the player entity.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Player;

/// Inserted when the player chose Exit on the end screen.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct QuitRequested;

/// State of the jumper playfield.
#[derive(Resource, Debug, Clone)]
pub struct Jumper {
    rng: fastrand::Rng,
    /// Height of the player's feet above the ground.
    pub player_y: f32,
    pub velocity: f32,
    pub obstacle_x: f32,
    pub obstacle_speed: f32,
    pub cleared: u32,
}

impl Jumper {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
            player_y: 0.0,
            velocity: 0.0,
            obstacle_x: SPAWN_MAX_X,
            obstacle_speed: OBSTACLE_TRAVEL,
            cleared: 0,
        }
    }

    pub fn on_ground(&self) -> bool {
        self.player_y <= 0.0
    }

    /// Horizontal distance from the player to the incoming obstacle.
    pub fn obstacle_distance(&self) -> f32 {
        self.obstacle_x - PLAYER_X
    }

    pub fn obstacle_hitbox(&self) -> Hitbox {
        Hitbox::new(
            self.obstacle_x as i32 - OBSTACLE_WIDTH / 2,
            0,
            OBSTACLE_WIDTH,
            OBSTACLE_HEIGHT,
        )
    }

    fn respawn_obstacle(&mut self) {
        self.obstacle_x = SPAWN_MIN_X + self.rng.f32() * (SPAWN_MAX_X - SPAWN_MIN_X);
    }

    fn reset(&mut self, reaction_time: f32) {
        self.player_y = 0.0;
        self.velocity = 0.0;
        self.obstacle_speed = OBSTACLE_TRAVEL / reaction_time.max(0.1);
        self.respawn_obstacle();
    }
}

/// Spawn the player sprite.
pub fn spawn_player(world: &mut World, scope: AssetScope) -> Entity {
    let sprite = {
        let mut cache = world.resource_mut::<AssetCache>();
        AnimatedSprite::with_animation(scope, RUN_ANIMATION, &mut cache)
    };
    world.spawn((Player, sprite, GameSpecific)).id()
}

/// Rebuild the playfield for a new session or after a lost life.
pub fn on_reset_game(
    _trigger: On<ResetGameEvent>,
    mut jumper: ResMut<Jumper>,
    lifecycle: Res<GameLifecycle>,
    mut audio: SessionAudio,
    mut players: Query<&mut AnimatedSprite, With<Player>>,
) {
    jumper.reset(lifecycle.reaction_time());
    for mut sprite in players.iter_mut() {
        sprite.set_animation(RUN_ANIMATION, true, audio.cache());
    }
    debug!(
        "Playfield reset: obstacle at {:.0} speed {:.0}",
        jumper.obstacle_x, jumper.obstacle_speed
    );
}

/// Jump, if standing on the ground.
pub fn on_game_action(
    _trigger: On<GameActionEvent>,
    mut jumper: ResMut<Jumper>,
    mut audio: SessionAudio,
    mut players: Query<&mut AnimatedSprite, With<Player>>,
) {
    if !jumper.on_ground() {
        return;
    }
    jumper.velocity = JUMP_VELOCITY;
    audio.play(JUMP);
    for mut sprite in players.iter_mut() {
        sprite.set_animation(JUMP_ANIMATION, true, audio.cache());
    }
}

pub fn on_exit_game(_trigger: On<ExitGameEvent>, mut commands: Commands) {
    info!("Player chose to exit");
    commands.insert_resource(QuitRequested);
}

pub fn on_reposition_cursor(_trigger: On<RepositionCursorEvent>) {
    debug!("Cursor recentred");
}

/// Gameplay tick: physics, scoring and collisions.
///
/// Scheduled behind
/// [`gameplay_running`](crate::systems::lifecycle::gameplay_running).
pub fn jumper_update(
    time: Res<WorldTime>,
    mut jumper: ResMut<Jumper>,
    mut lifecycle: ResMut<GameLifecycle>,
    mut scores: ResMut<HighScoreStore>,
    mut audio: SessionAudio,
    mut players: Query<&mut AnimatedSprite, With<Player>>,
) {
    let dt = time.delta;

    if !jumper.on_ground() || jumper.velocity > 0.0 {
        jumper.velocity -= GRAVITY * dt;
        jumper.player_y += jumper.velocity * dt;
        if jumper.player_y <= 0.0 {
            jumper.player_y = 0.0;
            jumper.velocity = 0.0;
            for mut sprite in players.iter_mut() {
                sprite.set_animation(RUN_ANIMATION, false, audio.cache());
            }
        }
    }

    jumper.obstacle_x -= jumper.obstacle_speed * dt;

    let center_y = (jumper.player_y + PLAYER_HALF_HEIGHT) as i32;
    let hit = players
        .iter()
        .any(|sprite| {
            sprite
                .hitbox_at(PLAYER_X as i32, center_y)
                .overlaps(&jumper.obstacle_hitbox())
        });

    if hit {
        info!("Obstacle hit at score {}", lifecycle.score());
        jumper.respawn_obstacle();
        lifecycle.lose_life(&mut audio, &mut scores);
        return;
    }

    if jumper.obstacle_x < PLAYER_X - 64.0 {
        jumper.cleared += 1;
        lifecycle.add_score(POINTS_PER_OBSTACLE);
        audio.play(SUCCESS);
        jumper.respawn_obstacle();
    }
}
