//! Deferred lifecycle transitions waiting for a sound to finish.
//!
//! A [`SoundGate`] is armed when a transition should only take effect after
//! a confirmation sound has played. It is a plain countdown: the sound is
//! assumed finished once its nominal duration has elapsed. The owner keeps
//! the gate in an `Option` and drops it when [`SoundGate::tick`] fires.

/// What to do once the gate opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateContinuation {
    /// Finish a start (or restart) requested from the start or end screen.
    CompleteGameStart,
    /// Resume play after the player confirmed a lost life.
    ResumeAfterLifeLost,
}

/// Armed countdown with its continuation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundGate {
    remaining: f32,
    continuation: GateContinuation,
}

impl SoundGate {
    pub fn arm(duration: f32, continuation: GateContinuation) -> Self {
        Self {
            remaining: duration.max(0.0),
            continuation,
        }
    }

    /// Count down by `dt`. Returns the continuation once the time is up.
    pub fn tick(&mut self, dt: f32) -> Option<GateContinuation> {
        self.remaining -= dt.max(0.0);
        (self.remaining <= 0.0).then_some(self.continuation)
    }

    pub fn remaining(&self) -> f32 {
        self.remaining.max(0.0)
    }

    pub fn continuation(&self) -> GateContinuation {
        self.continuation
    }
}
