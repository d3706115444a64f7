//! Auto-cycling end-of-game menu.
//!
//! One-button games cannot navigate a menu, so the highlighted entry flips
//! between [`EndGameAction::PlayAgain`] and [`EndGameAction::Exit`] on a
//! fixed interval and the button confirms whatever is highlighted. The menu
//! only reports the selection; the lifecycle executes it.

use std::fmt;

/// Entries of the end screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndGameAction {
    #[default]
    PlayAgain,
    Exit,
}

impl EndGameAction {
    pub fn next(self) -> Self {
        match self {
            EndGameAction::PlayAgain => EndGameAction::Exit,
            EndGameAction::Exit => EndGameAction::PlayAgain,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EndGameAction::PlayAgain => "play_again",
            EndGameAction::Exit => "exit",
        }
    }
}

impl fmt::Display for EndGameAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EndGameMenu {
    selected: EndGameAction,
    elapsed: f32,
    cycle_interval: f32,
    /// Score of the session that just ended.
    pub final_score: u32,
    /// Best score to display, already including `final_score`.
    pub best_score: u32,
    pub new_record: bool,
}

impl EndGameMenu {
    pub fn new(cycle_interval: f32, final_score: u32, best_score: u32, new_record: bool) -> Self {
        Self {
            selected: EndGameAction::default(),
            elapsed: 0.0,
            cycle_interval,
            final_score,
            best_score,
            new_record,
        }
    }

    /// Advance the cycle timer. Returns true when the selection flipped.
    pub fn update(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        if self.elapsed >= self.cycle_interval {
            self.elapsed = 0.0;
            self.selected = self.selected.next();
            return true;
        }
        false
    }

    pub fn selected_action(&self) -> EndGameAction {
        self.selected
    }

    /// Seconds until the next automatic flip.
    pub fn time_to_cycle(&self) -> f32 {
        (self.cycle_interval - self.elapsed).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selection_is_play_again() {
        let menu = EndGameMenu::new(2.0, 120, 120, true);
        assert_eq!(menu.selected_action(), EndGameAction::PlayAgain);
        assert_eq!(menu.time_to_cycle(), 2.0);
    }

    #[test]
    fn test_cycle_is_deterministic() {
        let mut menu = EndGameMenu::new(2.0, 0, 0, false);
        assert!(!menu.update(1.5));
        assert_eq!(menu.selected_action(), EndGameAction::PlayAgain);
        assert!(menu.update(0.5));
        assert_eq!(menu.selected_action(), EndGameAction::Exit);
        assert!(!menu.update(1.0));
        assert!(menu.update(1.0));
        assert_eq!(menu.selected_action(), EndGameAction::PlayAgain);
    }

    #[test]
    fn test_even_number_of_flips_returns_to_start() {
        let mut menu = EndGameMenu::new(0.5, 0, 0, false);
        let flips = (0..40).filter(|_| menu.update(0.125)).count();
        assert_eq!(flips, 10);
        assert_eq!(menu.selected_action(), EndGameAction::PlayAgain);
    }

    #[test]
    fn test_action_names() {
        assert_eq!(EndGameAction::PlayAgain.to_string(), "play_again");
        assert_eq!(EndGameAction::Exit.next(), EndGameAction::PlayAgain);
    }
}
