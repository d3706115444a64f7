//! ECS systems.
//!
//! Submodules overview
//! - [`animation`] – advance sprite animations while gameplay runs
//! - [`audio`] – forward audio commands to the host
//! - [`gameconfig`] – keep derived resources in step with the configuration
//! - [`lifecycle`] – tick the session, route input, apply effects, log telemetry
//! - [`time`] – update simulation time and delta

pub mod animation;
pub mod audio;
pub mod gameconfig;
pub mod lifecycle;
pub mod time;
