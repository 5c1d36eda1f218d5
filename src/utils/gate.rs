use std::time::Duration;

use crate::models::game::Game;

/// Pass-the-device gate: confirm the shared PIN before any private screen,
/// and expose the minimum dwell time so the front-end can hold the "hide and
/// pass" action until dismissal speed leaks nothing. The core only carries
/// the values; counting elapsed time is the front-end's job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnGate {
    pin: String,
    min_screen: Duration,
}

impl TurnGate {
    pub fn new(game: &Game) -> Self {
        Self {
            pin: game.pin.clone(),
            min_screen: Duration::from_millis(game.settings.min_screen_ms),
        }
    }

    /// A mismatch is recoverable: nothing is mutated, the caller asks again.
    pub fn verify(&self, entered: &str) -> bool {
        entered.trim() == self.pin
    }

    pub fn min_screen(&self) -> Duration {
        self.min_screen
    }

    pub fn may_continue(&self, shown_for: Duration) -> bool {
        shown_for >= self.min_screen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::player::Player;
    use crate::models::role::Role;
    use crate::models::rule::Settings;

    fn gate() -> TurnGate {
        let players = vec![
            Player::new(0, "Anna".into(), Role::Mafia),
            Player::new(1, "Boris".into(), Role::Citizen),
        ];
        let game = Game::new(players, "0042".into(), Settings::default());
        TurnGate::new(&game)
    }

    #[test]
    fn verify_matches_the_shared_pin() {
        let gate = gate();
        assert!(gate.verify("0042"));
        assert!(gate.verify(" 0042 "));
        assert!(!gate.verify("0024"));
        assert!(!gate.verify(""));
    }

    #[test]
    fn dwell_threshold_comes_from_settings() {
        let gate = gate();
        assert_eq!(gate.min_screen(), Duration::from_millis(3000));
        assert!(!gate.may_continue(Duration::from_millis(2999)));
        assert!(gate.may_continue(Duration::from_millis(3000)));
    }
}
