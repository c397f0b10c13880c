//! Turn clock for matches.
//!
//! A deterministic, I/O free deadline tracker. Callers pass the current time in milliseconds;
//! the clock never reads a wall clock itself.
//!
//! ## Timeout policy
//!
//! When the seat holding the turn lets its deadline pass the session applies the engine's
//! forced action on its behalf and the clock records a strike. Any action the seat submits
//! itself clears its strikes. A seat reaching `max_consecutive_timeouts` strikes forfeits.
//!
//! ```rust,ignore
//! let mut clock = TurnClock::new(TurnConfig::for_game(GameType::Connect4));
//! clock.start_turn(Some(Role::Player1), now_ms);
//! if let Some(role) = clock.check_timeout(later_ms) {
//!     match clock.record_timeout(role) {
//!         TimeoutVerdict::AutoAct => { /* apply forced action */ }
//!         TimeoutVerdict::Forfeit => { /* opponent wins */ }
//!     }
//! }
//! ```

use crate::minigame::registry::GameRegistry;
use pengu_types::minigame::{GameType, Role, DEFAULT_MAX_CONSECUTIVE_TIMEOUTS, DEFAULT_TURN_MS};
use serde::{Deserialize, Serialize};

/// Turn timing with durations in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnConfig {
    /// Time a seat has to act.
    pub turn_ms: u64,
    /// Timeouts in a row before the seat forfeits.
    pub max_consecutive_timeouts: u8,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            turn_ms: DEFAULT_TURN_MS,
            max_consecutive_timeouts: DEFAULT_MAX_CONSECUTIVE_TIMEOUTS,
        }
    }
}

impl TurnConfig {
    pub fn new(turn_ms: u64, max_consecutive_timeouts: u8) -> Self {
        Self {
            turn_ms,
            max_consecutive_timeouts,
        }
    }

    /// Default timing for a game, using its registry turn budget.
    pub fn for_game(game_type: GameType) -> Self {
        Self {
            turn_ms: GameRegistry::get_info(game_type).turn_ms,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if self.turn_ms == 0 {
            return Err("turn_ms must be greater than zero");
        }
        if self.max_consecutive_timeouts == 0 {
            return Err("max_consecutive_timeouts must be greater than zero");
        }
        Ok(())
    }
}

/// What happens to a seat whose deadline passed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeoutVerdict {
    /// Apply the engine's forced action for the seat.
    AutoAct,
    /// The seat has run out of strikes.
    Forfeit,
}

#[derive(Clone, Debug)]
pub struct TurnClock {
    config: TurnConfig,
    holder: Option<Role>,
    deadline_ms: Option<u64>,
    strikes: [u8; 2],
}

impl TurnClock {
    pub fn new(config: TurnConfig) -> Self {
        Self {
            config,
            holder: None,
            deadline_ms: None,
            strikes: [0; 2],
        }
    }

    pub fn config(&self) -> &TurnConfig {
        &self.config
    }

    pub fn holder(&self) -> Option<Role> {
        self.holder
    }

    pub fn deadline_ms(&self) -> Option<u64> {
        self.deadline_ms
    }

    pub fn strikes(&self, role: Role) -> u8 {
        self.strikes[role.index()]
    }

    /// Hands the turn to `holder` with a fresh deadline; `None` stops the clock.
    pub fn start_turn(&mut self, holder: Option<Role>, now_ms: u64) {
        self.holder = holder;
        self.deadline_ms = holder.map(|_| now_ms.saturating_add(self.config.turn_ms));
    }

    /// A seat acted on its own: clear its strikes and restart for whoever is next.
    pub fn record_action(&mut self, role: Role, next: Option<Role>, now_ms: u64) {
        self.strikes[role.index()] = 0;
        self.start_turn(next, now_ms);
    }

    /// Returns the seat whose deadline has passed, if any.
    pub fn check_timeout(&self, now_ms: u64) -> Option<Role> {
        match (self.holder, self.deadline_ms) {
            (Some(role), Some(deadline)) if now_ms >= deadline => Some(role),
            _ => None,
        }
    }

    /// Records a strike against `role` and decides what to do about it.
    pub fn record_timeout(&mut self, role: Role) -> TimeoutVerdict {
        let strikes = &mut self.strikes[role.index()];
        *strikes = strikes.saturating_add(1);
        if *strikes >= self.config.max_consecutive_timeouts {
            TimeoutVerdict::Forfeit
        } else {
            TimeoutVerdict::AutoAct
        }
    }

    /// Milliseconds left for the current holder, `None` when stopped.
    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        self.deadline_ms
            .map(|deadline| deadline.saturating_sub(now_ms))
    }

    pub fn stop(&mut self) {
        self.start_turn(None, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock() -> TurnClock {
        TurnClock::new(TurnConfig::new(10_000, 2))
    }

    #[test]
    fn test_config_validate() {
        assert!(TurnConfig::default().validate().is_ok());
        assert!(TurnConfig::new(0, 2).validate().is_err());
        assert!(TurnConfig::new(1_000, 0).validate().is_err());
        assert_eq!(TurnConfig::for_game(GameType::TicTacToe).turn_ms, 15_000);
    }

    #[test]
    fn test_deadline_and_remaining() {
        let mut clock = clock();
        assert_eq!(clock.check_timeout(u64::MAX), None);
        assert_eq!(clock.remaining_ms(0), None);

        clock.start_turn(Some(Role::Player1), 1_000);
        assert_eq!(clock.deadline_ms(), Some(11_000));
        assert_eq!(clock.remaining_ms(4_000), Some(7_000));
        assert_eq!(clock.check_timeout(10_999), None);
        assert_eq!(clock.check_timeout(11_000), Some(Role::Player1));
        assert_eq!(clock.remaining_ms(20_000), Some(0));
    }

    #[test]
    fn test_action_restarts_deadline_for_next_seat() {
        let mut clock = clock();
        clock.start_turn(Some(Role::Player1), 0);
        clock.record_action(Role::Player1, Some(Role::Player2), 5_000);
        assert_eq!(clock.holder(), Some(Role::Player2));
        assert_eq!(clock.deadline_ms(), Some(15_000));

        clock.record_action(Role::Player2, None, 6_000);
        assert_eq!(clock.check_timeout(u64::MAX), None);
    }

    #[test]
    fn test_consecutive_timeouts_forfeit() {
        let mut clock = clock();
        assert_eq!(clock.record_timeout(Role::Player1), TimeoutVerdict::AutoAct);
        assert_eq!(clock.strikes(Role::Player1), 1);
        assert_eq!(clock.record_timeout(Role::Player1), TimeoutVerdict::Forfeit);

        let mut clock = self::clock();
        clock.record_timeout(Role::Player2);
        clock.record_action(Role::Player2, Some(Role::Player1), 0);
        assert_eq!(clock.strikes(Role::Player2), 0);
        assert_eq!(clock.record_timeout(Role::Player2), TimeoutVerdict::AutoAct);
    }

    #[test]
    fn test_deadline_saturates() {
        let mut clock = clock();
        clock.start_turn(Some(Role::Player2), u64::MAX - 5);
        assert_eq!(clock.deadline_ms(), Some(u64::MAX));
        clock.stop();
        assert_eq!(clock.holder(), None);
    }
}
