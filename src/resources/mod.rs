//! ECS resources made available to systems.
//!
//! Overview
//! - `animationstore` – immutable animation definitions and their metadata format
//! - `assetcache` – memoized textures, sounds and animations per scope
//! - `audio` – sound catalog, volume mixing and the host audio bridge
//! - `endgamemenu` – auto-cycling Play again / Exit selection
//! - `fullscreen` – presence marks fullscreen mode
//! - `gameconfig` – layered INI configuration
//! - `highscores` – persisted best score per game
//! - `lifecycle` – the session state machine
//! - `soundgate` – countdown deferring a transition until a sound has played
//! - `worldtime` – simulation time and delta
pub mod animationstore;
pub mod assetcache;
pub mod audio;
pub mod endgamemenu;
pub mod fullscreen;
pub mod gameconfig;
pub mod highscores;
pub mod lifecycle;
pub mod soundgate;
pub mod worldtime;
