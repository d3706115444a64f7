//! Structured session telemetry.
//!
//! The lifecycle records notable moments (start, life lost, game over, new
//! high score, ...) as [`GameEvent`] messages: a static name plus a short list
//! of key/value fields. Where they end up is the host's business; the
//! bundled [`log_game_events`](crate::systems::lifecycle::log_game_events)
//! system writes them to the log.

use std::fmt;

use bevy_ecs::message::Message;
use smallvec::SmallVec;

#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct GameEvent {
    pub name: &'static str,
    pub fields: SmallVec<[(&'static str, String); 4]>,
}

impl GameEvent {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: SmallVec::new(),
        }
    }

    pub fn with(mut self, key: &'static str, value: impl ToString) -> Self {
        self.fields.push((key, value.to_string()));
        self
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)?;
        for (key, value) in &self.fields {
            write!(f, " {key}={value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_and_display() {
        let event = GameEvent::new("game_over")
            .with("game", "jumper")
            .with("score", 120);
        assert_eq!(event.field("score"), Some("120"));
        assert_eq!(event.field("lives"), None);
        assert_eq!(event.to_string(), "game_over game=jumper score=120");
    }
}
