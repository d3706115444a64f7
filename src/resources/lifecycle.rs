//! Session lifecycle shared by every one-button game.
//!
//! [`GameLifecycle`] owns lives, score and difficulty, and arbitrates the
//! phases a session goes through:
//!
//! ```text
//! WaitingForStart ──click──▶ Playing ──lose_life──▶ LifeLostPause ──click──▶ Playing
//!                                │
//!                                └──last life──▶ GameOver (end screen) ──Play again──▶ Playing
//! ```
//!
//! Transitions triggered by the button are acknowledged with a confirmation
//! sound. When that sound is available the transition is deferred behind a
//! [`SoundGate`] and completed by [`GameLifecycle::update_sound_timer`] once
//! the nominal sound length has elapsed; otherwise it completes at once.
//! While a gate is armed the session counts as paused and further start or
//! continue requests are rejected.
//!
//! The lifecycle never touches the world directly. Side effects on the game
//! are queued as [`LifecycleEffect`]s and telemetry as [`GameEvent`]s; the
//! systems in [`crate::systems::lifecycle`] drain both every tick.

use bevy_ecs::prelude::Resource;
use log::{debug, info};

use crate::events::telemetry::GameEvent;
use crate::resources::audio::{FAILURE, GAME_OVER, HIGH_SCORE, SoundPlayer, UI_CONFIRM, UI_CYCLE};
use crate::resources::endgamemenu::{EndGameAction, EndGameMenu};
use crate::resources::gameconfig::{ConfigError, GameConfig};
use crate::resources::highscores::HighScoreStore;
use crate::resources::soundgate::{GateContinuation, SoundGate};

/// Coarse phase of a session, derived from the lifecycle flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    WaitingForStart,
    Playing,
    LifeLostPause,
    GameOver,
}

/// Side effects the ECS layer applies on behalf of the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEffect {
    /// Rebuild the playfield (fires `ResetGameEvent`).
    ResetGame,
    /// Restart every game-specific animation from frame 0.
    ResetAnimations,
    /// Leave the game (fires `ExitGameEvent`).
    ExitGame,
    /// Fires `RepositionCursorEvent`.
    RepositionCursor,
}

/// Result of routing a button press through [`GameLifecycle::on_action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Consumed by the lifecycle.
    Handled,
    /// Gameplay is running; the game's own action applies.
    Gameplay,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Timings {
    blink_duration: f32,
    menu_cycle_interval: f32,
    cursor_reposition_interval: f32,
    sound_gate_duration: f32,
}

#[derive(Resource, Debug, Clone)]
pub struct GameLifecycle {
    game_id: String,
    difficulty: u8,
    lives: u32,
    max_lives: u32,
    score: u32,

    started: bool,
    game_over: bool,
    life_lost_pause: bool,
    waiting_for_start_click: bool,
    show_end_screen: bool,
    show_player: bool,
    exit_requested: bool,

    blink_timer: f32,
    cursor_timer: f32,
    sound_gate: Option<SoundGate>,
    end_menu: Option<EndGameMenu>,
    timings: Timings,

    effects: Vec<LifecycleEffect>,
    events: Vec<GameEvent>,
}

impl GameLifecycle {
    /// Build a fresh session waiting for the first click.
    pub fn new(config: &GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            "Session created game={} difficulty={} lives={}",
            config.game_id, config.difficulty, config.lives
        );
        Ok(Self {
            game_id: config.game_id.clone(),
            difficulty: config.difficulty as u8,
            lives: config.lives,
            max_lives: config.lives,
            score: 0,
            started: false,
            game_over: false,
            life_lost_pause: false,
            waiting_for_start_click: true,
            show_end_screen: false,
            show_player: true,
            exit_requested: false,
            blink_timer: 0.0,
            cursor_timer: 0.0,
            sound_gate: None,
            end_menu: None,
            timings: Timings {
                blink_duration: config.blink_duration,
                menu_cycle_interval: config.menu_cycle_interval,
                cursor_reposition_interval: config.cursor_reposition_interval,
                sound_gate_duration: config.sound_gate_duration,
            },
            effects: Vec::new(),
            events: Vec::new(),
        })
    }

    pub fn phase(&self) -> SessionPhase {
        if self.game_over {
            SessionPhase::GameOver
        } else if self.life_lost_pause {
            SessionPhase::LifeLostPause
        } else if !self.started {
            SessionPhase::WaitingForStart
        } else {
            SessionPhase::Playing
        }
    }

    /// Begin (or restart) a session.
    ///
    /// Only valid from the start screen or after game over, and never while a
    /// sound gate is armed. Returns whether the request was accepted.
    pub fn start_game(&mut self, audio: &mut dyn SoundPlayer) -> bool {
        if self.sound_gate.is_some() {
            debug!("start_game ignored: waiting for sound");
            return false;
        }
        if !matches!(
            self.phase(),
            SessionPhase::WaitingForStart | SessionPhase::GameOver
        ) {
            debug!("start_game ignored in phase {:?}", self.phase());
            return false;
        }

        self.waiting_for_start_click = false;
        if self.end_menu.take().is_some() {
            self.show_end_screen = false;
        }

        if audio.play(UI_CONFIRM) {
            self.arm_gate(GateContinuation::CompleteGameStart);
        } else {
            self.complete_game_start();
        }
        true
    }

    fn complete_game_start(&mut self) {
        self.started = true;
        self.lives = self.max_lives;
        self.score = 0;
        self.game_over = false;
        self.show_end_screen = false;
        self.end_menu = None;
        self.life_lost_pause = false;
        self.waiting_for_start_click = false;
        self.exit_requested = false;
        self.blink_timer = 0.0;
        self.show_player = true;
        self.cursor_timer = 0.0;

        self.effects.push(LifecycleEffect::ResetAnimations);
        self.effects.push(LifecycleEffect::ResetGame);
        self.events.push(
            GameEvent::new("game_started")
                .with("game", &self.game_id)
                .with("difficulty", self.difficulty)
                .with("lives", self.lives),
        );
        info!("Game started: {}", self.game_id);
    }

    /// Take one life. The last one ends the session and settles the high
    /// score; later calls do nothing.
    pub fn lose_life(&mut self, audio: &mut dyn SoundPlayer, scores: &mut HighScoreStore) {
        if self.lives == 0 {
            return;
        }
        self.lives -= 1;

        if self.lives > 0 {
            self.life_lost_pause = true;
            self.waiting_for_start_click = false;
            self.blink_timer = 0.0;
            self.show_player = true;
            audio.play(FAILURE);
            self.events.push(
                GameEvent::new("life_lost")
                    .with("game", &self.game_id)
                    .with("lives_remaining", self.lives)
                    .with("score", self.score),
            );
            info!("Life lost, {} remaining", self.lives);
            return;
        }

        let previous_best = scores.get(&self.game_id);
        let new_record = scores.update(&self.game_id, self.score);
        if new_record {
            self.events.push(
                GameEvent::new("high_score_beaten")
                    .with("game", &self.game_id)
                    .with("score", self.score)
                    .with("previous", previous_best),
            );
            audio.play(HIGH_SCORE);
        }
        audio.play(GAME_OVER);

        self.game_over = true;
        self.show_end_screen = true;
        self.life_lost_pause = false;
        self.waiting_for_start_click = false;
        self.show_player = true;
        // A pending start or resume makes no sense past this point.
        self.sound_gate = None;
        let best = scores.get(&self.game_id);
        self.end_menu = Some(EndGameMenu::new(
            self.timings.menu_cycle_interval,
            self.score,
            best,
            new_record,
        ));
        self.events.push(
            GameEvent::new("game_over")
                .with("game", &self.game_id)
                .with("score", self.score)
                .with("best", best)
                .with("new_record", new_record),
        );
        info!("Game over: score={} best={}", self.score, best);
    }

    /// Advance the blink shown after a lost life.
    pub fn update_life_lost_effects(&mut self, dt: f32) {
        if !self.life_lost_pause || self.blink_finished() {
            return;
        }
        self.blink_timer += dt;
        self.show_player = if self.blink_finished() {
            true
        } else {
            (self.blink_timer * 10.0).floor() as i64 % 2 == 0
        };
    }

    /// Try to leave the life-lost pause.
    ///
    /// Returns false outside the pause. Inside it the press is always
    /// consumed, but the resume only starts once the blink has finished and
    /// no sound gate is armed.
    pub fn handle_life_lost_continue(&mut self, audio: &mut dyn SoundPlayer) -> bool {
        if !self.life_lost_pause {
            return false;
        }
        if !self.blink_finished() || self.sound_gate.is_some() {
            return true;
        }

        self.life_lost_pause = false;
        self.blink_timer = 0.0;
        self.show_player = true;
        self.effects.push(LifecycleEffect::ResetGame);
        self.effects.push(LifecycleEffect::ResetAnimations);

        if audio.play(UI_CONFIRM) {
            self.arm_gate(GateContinuation::ResumeAfterLifeLost);
        } else {
            self.resume_after_life_lost();
        }
        true
    }

    fn resume_after_life_lost(&mut self) {
        if self.game_over {
            return;
        }
        self.effects.push(LifecycleEffect::ResetAnimations);
        self.events.push(
            GameEvent::new("game_resumed")
                .with("game", &self.game_id)
                .with("lives", self.lives),
        );
        info!("Game resumed with {} lives", self.lives);
    }

    /// Count the armed sound gate down and run its continuation when due.
    pub fn update_sound_timer(&mut self, dt: f32) {
        let Some(gate) = self.sound_gate.as_mut() else {
            return;
        };
        let Some(continuation) = gate.tick(dt) else {
            return;
        };
        self.sound_gate = None;
        debug!("Sound gate opened: {:?}", continuation);
        match continuation {
            GateContinuation::CompleteGameStart => self.complete_game_start(),
            GateContinuation::ResumeAfterLifeLost => self.resume_after_life_lost(),
        }
    }

    fn arm_gate(&mut self, continuation: GateContinuation) {
        debug!(
            "Waiting {:.1}s for sound before {:?}",
            self.timings.sound_gate_duration, continuation
        );
        self.sound_gate = Some(SoundGate::arm(
            self.timings.sound_gate_duration,
            continuation,
        ));
    }

    pub fn is_paused(&self) -> bool {
        self.life_lost_pause
            || self.game_over
            || !self.started
            || self.waiting_for_start_click
            || self.waiting_for_sound()
    }

    /// Route a press of the primary button.
    pub fn on_action(&mut self, audio: &mut dyn SoundPlayer) -> ActionOutcome {
        if self.show_end_screen {
            let selected = self.end_menu.as_ref().map(EndGameMenu::selected_action);
            match selected {
                Some(EndGameAction::PlayAgain) => {
                    self.start_game(audio);
                }
                Some(EndGameAction::Exit) if !self.exit_requested => {
                    self.exit_requested = true;
                    self.effects.push(LifecycleEffect::ExitGame);
                    self.events
                        .push(GameEvent::new("exit_selected").with("game", &self.game_id));
                    info!("Exit selected");
                }
                _ => {}
            }
            return ActionOutcome::Handled;
        }

        if self.is_paused() {
            if !self.handle_life_lost_continue(audio)
                && (self.waiting_for_start_click || !self.started)
                && !self.waiting_for_sound()
            {
                self.start_game(audio);
            }
            return ActionOutcome::Handled;
        }

        ActionOutcome::Gameplay
    }

    /// Per-tick driver. Returns whether gameplay may run this tick.
    ///
    /// The sound gate resolves first so a game never resumes halfway through
    /// a transition; then the blink, the end menu and the cursor timer.
    pub fn update(&mut self, dt: f32, audio: &mut dyn SoundPlayer) -> bool {
        self.update_sound_timer(dt);

        if !self.waiting_for_start_click && !self.waiting_for_sound() {
            self.update_life_lost_effects(dt);
        }

        if self.show_end_screen
            && let Some(menu) = self.end_menu.as_mut()
            && menu.update(dt)
        {
            debug!("button_auto_cycle selected={}", menu.selected_action());
            audio.play(UI_CYCLE);
        }

        let running = !self.is_paused();
        if running {
            self.cursor_timer += dt;
            if self.cursor_timer >= self.timings.cursor_reposition_interval {
                self.cursor_timer = 0.0;
                self.effects.push(LifecycleEffect::RepositionCursor);
            }
        }
        running
    }

    pub fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    pub fn drain_effects(&mut self) -> Vec<LifecycleEffect> {
        std::mem::take(&mut self.effects)
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn difficulty(&self) -> u8 {
        self.difficulty
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn max_lives(&self) -> u32 {
        self.max_lives
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn is_life_lost_pause(&self) -> bool {
        self.life_lost_pause
    }

    pub fn waiting_for_start_click(&self) -> bool {
        self.waiting_for_start_click
    }

    pub fn waiting_for_sound(&self) -> bool {
        self.sound_gate.is_some()
    }

    pub fn show_end_screen(&self) -> bool {
        self.show_end_screen
    }

    /// Blink visibility of the player sprite.
    pub fn should_draw_player(&self) -> bool {
        self.show_player
    }

    pub fn blink_finished(&self) -> bool {
        self.blink_timer >= self.timings.blink_duration
    }

    pub fn end_menu(&self) -> Option<&EndGameMenu> {
        self.end_menu.as_ref()
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Seconds the player has to react, shrinking with difficulty.
    pub fn reaction_time(&self) -> f32 {
        2.2 - 0.2 * self.difficulty as f32
    }

    /// Whether the session flags are mutually consistent.
    pub fn invariants_hold(&self) -> bool {
        self.lives <= self.max_lives
            && (!self.game_over || self.lives == 0)
            && (!self.show_end_screen || self.game_over)
            && !(self.life_lost_pause && self.waiting_for_start_click)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::audio::RecordingAudio;

    fn session() -> GameLifecycle {
        GameLifecycle::new(&GameConfig::for_game("jumper")).unwrap()
    }

    fn playing(audio: &mut RecordingAudio) -> GameLifecycle {
        let mut lc = session();
        assert!(lc.start_game(audio));
        for _ in 0..3 {
            lc.update(1.0, audio);
        }
        assert_eq!(lc.phase(), SessionPhase::Playing);
        lc.drain_effects();
        lc.drain_events();
        lc
    }

    fn event_count(events: &[GameEvent], name: &str) -> usize {
        events.iter().filter(|e| e.name == name).count()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = GameConfig::new();
        config.difficulty = 0;
        assert!(GameLifecycle::new(&config).is_err());
        config.difficulty = 11;
        assert!(GameLifecycle::new(&config).is_err());
        config.difficulty = 10;
        config.lives = 0;
        assert!(matches!(
            GameLifecycle::new(&config),
            Err(ConfigError::NoLives)
        ));
    }

    #[test]
    fn test_initial_state_waits_for_click() {
        let lc = session();
        assert_eq!(lc.phase(), SessionPhase::WaitingForStart);
        assert!(lc.waiting_for_start_click());
        assert!(lc.is_paused());
        assert_eq!(lc.lives(), 3);
        assert_eq!(lc.max_lives(), 3);
        assert_eq!(lc.score(), 0);
        assert!(lc.should_draw_player());
    }

    #[test]
    fn test_start_waits_for_confirm_sound() {
        let mut audio = RecordingAudio::available();
        let mut lc = session();
        assert!(lc.start_game(&mut audio));
        assert!(lc.waiting_for_sound());
        assert!(!lc.waiting_for_start_click());
        assert!(!lc.is_started());
        assert!(lc.is_paused());

        assert!(!lc.update(2.0, &mut audio));
        assert!(!lc.is_started());
        assert!(lc.update(1.0, &mut audio));
        assert!(lc.is_started());
        assert!(!lc.waiting_for_sound());
        assert_eq!(
            lc.drain_effects(),
            vec![LifecycleEffect::ResetAnimations, LifecycleEffect::ResetGame]
        );
        assert_eq!(event_count(&lc.drain_events(), "game_started"), 1);
        assert_eq!(audio.count(UI_CONFIRM), 1);
    }

    #[test]
    fn test_start_completes_immediately_without_sound() {
        let mut audio = RecordingAudio::unavailable();
        let mut lc = session();
        assert!(lc.start_game(&mut audio));
        assert!(lc.is_started());
        assert!(!lc.is_paused());
    }

    #[test]
    fn test_start_rejected_while_gate_armed() {
        let mut audio = RecordingAudio::available();
        let mut lc = session();
        assert!(lc.start_game(&mut audio));
        assert!(!lc.start_game(&mut audio));
        assert_eq!(lc.on_action(&mut audio), ActionOutcome::Handled);
        assert_eq!(audio.count(UI_CONFIRM), 1);
    }

    #[test]
    fn test_start_rejected_while_playing() {
        let mut audio = RecordingAudio::available();
        let mut lc = playing(&mut audio);
        assert!(!lc.start_game(&mut audio));
        assert!(lc.drain_effects().is_empty());
    }

    #[test]
    fn test_action_during_play_goes_to_game() {
        let mut audio = RecordingAudio::available();
        let mut lc = playing(&mut audio);
        assert_eq!(lc.on_action(&mut audio), ActionOutcome::Gameplay);
    }

    #[test]
    fn test_lose_life_enters_pause_and_blinks() {
        let mut audio = RecordingAudio::available();
        let mut scores = HighScoreStore::in_memory();
        let mut lc = playing(&mut audio);

        lc.lose_life(&mut audio, &mut scores);
        assert_eq!(lc.phase(), SessionPhase::LifeLostPause);
        assert_eq!(lc.lives(), 2);
        assert!(lc.is_paused());
        assert_eq!(audio.count(FAILURE), 1);
        assert_eq!(event_count(&lc.drain_events(), "life_lost"), 1);

        assert!(!lc.update(0.05, &mut audio));
        assert!(lc.should_draw_player());
        lc.update(0.1, &mut audio);
        assert!(!lc.should_draw_player());
        lc.update(0.1, &mut audio);
        assert!(lc.should_draw_player());

        for _ in 0..10 {
            lc.update(0.1, &mut audio);
        }
        assert!(lc.blink_finished());
        assert!(lc.should_draw_player());
        lc.update(0.05, &mut audio);
        assert!(lc.should_draw_player());
    }

    #[test]
    fn test_continue_is_swallowed_until_blink_ends() {
        let mut audio = RecordingAudio::available();
        let mut scores = HighScoreStore::in_memory();
        let mut lc = playing(&mut audio);
        lc.lose_life(&mut audio, &mut scores);
        let confirms = audio.count(UI_CONFIRM);

        lc.update(0.5, &mut audio);
        assert!(lc.handle_life_lost_continue(&mut audio));
        assert!(lc.is_life_lost_pause());
        assert_eq!(audio.count(UI_CONFIRM), confirms);
    }

    #[test]
    fn test_continue_is_idempotent() {
        let mut audio = RecordingAudio::available();
        let mut scores = HighScoreStore::in_memory();
        let mut lc = playing(&mut audio);
        lc.lose_life(&mut audio, &mut scores);
        lc.update(1.0, &mut audio);
        let confirms = audio.count(UI_CONFIRM);

        assert!(lc.handle_life_lost_continue(&mut audio));
        assert!(!lc.is_life_lost_pause());
        assert!(lc.waiting_for_sound());
        assert_eq!(
            lc.drain_effects(),
            vec![LifecycleEffect::ResetGame, LifecycleEffect::ResetAnimations]
        );

        assert!(!lc.handle_life_lost_continue(&mut audio));
        assert_eq!(lc.on_action(&mut audio), ActionOutcome::Handled);
        assert_eq!(audio.count(UI_CONFIRM), confirms + 1);
        assert!(lc.drain_effects().is_empty());
    }

    #[test]
    fn test_resume_after_gate() {
        let mut audio = RecordingAudio::available();
        let mut scores = HighScoreStore::in_memory();
        let mut lc = playing(&mut audio);
        lc.lose_life(&mut audio, &mut scores);
        lc.update(1.0, &mut audio);
        lc.on_action(&mut audio);
        lc.drain_effects();
        lc.drain_events();

        assert!(!lc.update(2.5, &mut audio));
        assert!(lc.update(0.5, &mut audio));
        assert_eq!(lc.phase(), SessionPhase::Playing);
        assert_eq!(lc.drain_effects(), vec![LifecycleEffect::ResetAnimations]);
        assert_eq!(event_count(&lc.drain_events(), "game_resumed"), 1);
        assert_eq!(lc.lives(), 2);
    }

    #[test]
    fn test_resume_immediately_without_sound() {
        let mut audio = RecordingAudio::unavailable();
        let mut scores = HighScoreStore::in_memory();
        let mut lc = session();
        lc.start_game(&mut audio);
        lc.lose_life(&mut audio, &mut scores);
        lc.update(1.0, &mut audio);
        assert!(lc.handle_life_lost_continue(&mut audio));
        assert!(!lc.is_paused());
    }

    #[test]
    fn test_game_over_scenario_beats_stored_best() {
        let mut audio = RecordingAudio::available();
        let mut scores = HighScoreStore::in_memory();
        scores.update("jumper", 80);

        let mut config = GameConfig::for_game("jumper");
        config.difficulty = 5;
        config.lives = 3;
        let mut lc = GameLifecycle::new(&config).unwrap();
        lc.add_score(120);
        for _ in 0..3 {
            lc.lose_life(&mut audio, &mut scores);
        }

        assert_eq!(lc.lives(), 0);
        assert!(lc.is_game_over());
        assert!(lc.show_end_screen());
        assert_eq!(scores.get("jumper"), 120);

        let menu = lc.end_menu().unwrap();
        assert_eq!(menu.final_score, 120);
        assert_eq!(menu.best_score, 120);
        assert!(menu.new_record);
        assert_eq!(menu.selected_action(), EndGameAction::PlayAgain);

        let events = lc.drain_events();
        assert_eq!(event_count(&events, "high_score_beaten"), 1);
        assert_eq!(event_count(&events, "game_over"), 1);
        assert_eq!(audio.count(HIGH_SCORE), 1);
        assert_eq!(audio.count(GAME_OVER), 1);
    }

    #[test]
    fn test_game_over_without_record_keeps_best() {
        let mut audio = RecordingAudio::available();
        let mut scores = HighScoreStore::in_memory();
        scores.update("jumper", 80);
        let mut lc = session();
        lc.add_score(50);
        for _ in 0..3 {
            lc.lose_life(&mut audio, &mut scores);
        }
        assert_eq!(scores.get("jumper"), 80);
        let menu = lc.end_menu().unwrap();
        assert!(!menu.new_record);
        assert_eq!(menu.best_score, 80);
        assert_eq!(audio.count(HIGH_SCORE), 0);
    }

    #[test]
    fn test_lose_life_after_game_over_is_noop() {
        let mut audio = RecordingAudio::available();
        let mut scores = HighScoreStore::in_memory();
        let mut lc = session();
        lc.add_score(10);
        for _ in 0..3 {
            lc.lose_life(&mut audio, &mut scores);
        }
        lc.drain_events();
        lc.add_score(1000);
        lc.lose_life(&mut audio, &mut scores);

        assert_eq!(lc.lives(), 0);
        assert_eq!(scores.get("jumper"), 10);
        assert!(lc.drain_events().is_empty());
        assert_eq!(audio.count(GAME_OVER), 1);
    }

    #[test]
    fn test_end_menu_cycles_and_exit_fires_once() {
        let mut audio = RecordingAudio::available();
        let mut scores = HighScoreStore::in_memory();
        let mut lc = session();
        for _ in 0..3 {
            lc.lose_life(&mut audio, &mut scores);
        }
        lc.drain_effects();

        assert!(!lc.update(2.0, &mut audio));
        assert_eq!(
            lc.end_menu().unwrap().selected_action(),
            EndGameAction::Exit
        );
        assert_eq!(audio.count(UI_CYCLE), 1);

        assert_eq!(lc.on_action(&mut audio), ActionOutcome::Handled);
        assert_eq!(lc.on_action(&mut audio), ActionOutcome::Handled);
        assert_eq!(lc.drain_effects(), vec![LifecycleEffect::ExitGame]);
        assert!(lc.exit_requested());
        assert!(lc.show_end_screen());
    }

    #[test]
    fn test_play_again_restarts_session() {
        let mut audio = RecordingAudio::available();
        let mut scores = HighScoreStore::in_memory();
        let mut lc = playing(&mut audio);
        lc.add_score(30);
        for _ in 0..3 {
            lc.lose_life(&mut audio, &mut scores);
        }

        assert_eq!(lc.on_action(&mut audio), ActionOutcome::Handled);
        assert!(!lc.show_end_screen());
        assert!(lc.end_menu().is_none());
        assert!(lc.is_game_over());
        assert!(lc.waiting_for_sound());
        assert!(lc.invariants_hold());

        for _ in 0..3 {
            lc.update(1.0, &mut audio);
        }
        assert_eq!(lc.phase(), SessionPhase::Playing);
        assert_eq!(lc.lives(), 3);
        assert_eq!(lc.score(), 0);
        assert!(!lc.is_game_over());
    }

    #[test]
    fn test_cursor_reposition_only_while_playing() {
        let mut audio = RecordingAudio::available();
        let mut lc = session();
        lc.update(10.0, &mut audio);
        assert!(lc.drain_effects().is_empty());

        // The tick that completed the start already counted one second.
        let mut lc = playing(&mut audio);
        lc.update(3.0, &mut audio);
        assert!(lc.drain_effects().is_empty());
        lc.update(1.0, &mut audio);
        assert_eq!(lc.drain_effects(), vec![LifecycleEffect::RepositionCursor]);
    }

    #[test]
    fn test_reaction_time_and_score() {
        let mut lc = session();
        assert!((lc.reaction_time() - 1.2).abs() < 1e-6);
        lc.add_score(u32::MAX);
        lc.add_score(5);
        assert_eq!(lc.score(), u32::MAX);
    }

    #[test]
    fn test_invariants_hold_under_random_play() {
        let mut rng = fastrand::Rng::with_seed(7);
        for available in [true, false] {
            let mut audio = RecordingAudio {
                available,
                ..RecordingAudio::default()
            };
            let mut scores = HighScoreStore::in_memory();
            let mut lc = session();
            for _ in 0..2000 {
                match rng.u8(0..4) {
                    0 => lc.lose_life(&mut audio, &mut scores),
                    1 => {
                        lc.on_action(&mut audio);
                    }
                    2 => lc.add_score(rng.u32(0..20)),
                    _ => {
                        lc.update(rng.f32() * 0.5, &mut audio);
                    }
                }
                assert!(lc.invariants_hold(), "inconsistent state: {:?}", lc);
                assert!(lc.lives() <= lc.max_lives());
            }
        }
    }
}
