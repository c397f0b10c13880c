//! Minigame rules engines.
//!
//! This module contains the authoritative rules for every arcade game:
//! - Tic-Tac-Toe
//! - Connect-4
//! - UNO
//! - Blackjack (two seats against a house dealer)
//! - Monopoly
//! - Battleship (with a hunt/target AI opponent)
//!
//! Engines are pure state machines. All randomness flows through [`GameRng`] so a match can be
//! replayed from its seed.

pub mod battleship;
pub mod battleship_ai;
pub mod blackjack;
pub mod connect_four;
#[cfg(test)]
mod integration_tests;
pub mod monopoly;
pub mod registry;
pub mod tic_tac_toe;
pub mod uno;

use commonware_cryptography::sha256::Sha256;
use commonware_cryptography::Hasher;
use pengu_types::minigame::{
    Action, Effect, GameType, Outcome, Role, ERROR_ILLEGAL_MOVE, ERROR_INVALID_PHASE,
    ERROR_MATCH_ABORTED, ERROR_MATCH_ALREADY_COMPLETE, ERROR_NOT_YOUR_TURN,
};
use serde::Serialize;
use std::fmt::Debug;

pub use registry::GameConfig;

/// Match seed; disclosed after completion so the match can be replayed.
pub type Seed = [u8; 32];

/// Deterministic random number generator for a single move.
///
/// Uses SHA256 hash chains seeded from the match seed, match id and move number.
#[derive(Clone)]
pub struct GameRng {
    state: [u8; 32],
    index: usize,
}

impl GameRng {
    /// Create a new RNG from a seed, match ID, and move number.
    pub fn new(seed: &Seed, match_id: u64, move_number: u32) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(seed);
        hasher.update(&match_id.to_be_bytes());
        hasher.update(&move_number.to_be_bytes());
        Self {
            state: hasher.finalize().0,
            index: 0,
        }
    }

    fn next_byte(&mut self) -> u8 {
        if self.index >= 32 {
            let mut hasher = Sha256::new();
            hasher.update(&self.state);
            self.state = hasher.finalize().0;
            self.index = 0;
        }
        let result = self.state[self.index];
        self.index += 1;
        result
    }

    pub fn next_u8(&mut self) -> u8 {
        self.next_byte()
    }

    pub fn next_u16(&mut self) -> u16 {
        let a = self.next_byte() as u16;
        let b = self.next_byte() as u16;
        (a << 8) | b
    }

    /// Get a random value in range [0, max).
    pub fn next_bounded(&mut self, max: u8) -> u8 {
        if max == 0 {
            return 0;
        }
        // Rejection sampling keeps the distribution unbiased.
        let limit = u8::MAX - (u8::MAX % max);
        loop {
            let value = self.next_u8();
            if value < limit {
                return value % max;
            }
        }
    }

    /// Get a random index in range [0, len). Handles collections larger than a byte.
    pub fn next_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        if len <= u8::MAX as usize {
            return self.next_bounded(len as u8) as usize;
        }
        let max = len.min(u16::MAX as usize) as u16;
        let limit = u16::MAX - (u16::MAX % max);
        loop {
            let value = self.next_u16();
            if value < limit {
                return (value % max) as usize;
            }
        }
    }

    /// Pick a random element of a slice.
    pub fn pick<T: Copy>(&mut self, items: &[T]) -> Option<T> {
        if items.is_empty() {
            return None;
        }
        Some(items[self.next_index(items.len())])
    }

    /// Draw a card from the deck without replacement.
    pub fn draw_card(&mut self, deck: &mut Vec<u8>) -> Option<u8> {
        if deck.is_empty() {
            return None;
        }
        let idx = self.next_index(deck.len());
        Some(deck.swap_remove(idx))
    }

    /// Create a shuffled shoe of `decks` standard 52-card decks.
    pub fn create_shoe(&mut self, decks: u8) -> Vec<u8> {
        let mut shoe: Vec<u8> = (0..decks.max(1))
            .flat_map(|_| 0..pengu_types::minigame::CARDS_PER_DECK)
            .collect();
        self.shuffle(&mut shoe);
        shoe
    }

    /// Shuffle a slice in place using Fisher-Yates.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_index(i + 1);
            slice.swap(i, j);
        }
    }

    /// Roll a single die (1-6).
    pub fn roll_die(&mut self) -> u8 {
        self.next_bounded(6) + 1
    }
}

/// Error during game execution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("match already complete")]
    MatchAlreadyComplete,
    #[error("not your turn")]
    NotYourTurn,
    #[error("action not allowed during {phase}")]
    InvalidPhase { phase: String },
    #[error("illegal move: {0}")]
    IllegalMove(&'static str),
    #[error("{action} action sent to a {game} match")]
    WrongGame { action: GameType, game: GameType },
    /// The engine reached a state its own rules forbid. The match must be aborted.
    #[error("engine invariant violated: {0}")]
    Invariant(String),
}

impl GameError {
    pub(crate) fn invalid_phase(phase: impl Debug) -> Self {
        GameError::InvalidPhase {
            phase: format!("{phase:?}"),
        }
    }

    /// Rejection code relayed to the submitting client.
    pub fn code(&self) -> &'static str {
        match self {
            GameError::MatchAlreadyComplete => ERROR_MATCH_ALREADY_COMPLETE,
            GameError::NotYourTurn => ERROR_NOT_YOUR_TURN,
            GameError::InvalidPhase { .. } => ERROR_INVALID_PHASE,
            GameError::IllegalMove(_) | GameError::WrongGame { .. } => ERROR_ILLEGAL_MOVE,
            GameError::Invariant(_) => ERROR_MATCH_ABORTED,
        }
    }

    /// Fatal errors abort the match; everything else is an ordinary rejection.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GameError::Invariant(_))
    }
}

/// Contract shared by every rules engine.
pub trait RulesEngine {
    type Config;
    type State: Clone;
    type Action: Copy + Into<Action>;
    type Phase: Copy + Debug + PartialEq;
    type View: Serialize;

    /// Build the initial state for a new match.
    fn init(config: &Self::Config, rng: &mut GameRng) -> Result<Self::State, GameError>;

    /// Role expected to act next, `None` once the match is over.
    fn current_turn(state: &Self::State) -> Option<Role>;

    fn phase(state: &Self::State) -> Self::Phase;

    /// Apply an action for `role`. Callers guarantee it is `role`'s turn; on error the state
    /// may be partially modified and must be discarded.
    fn apply(
        state: &mut Self::State,
        role: Role,
        action: Self::Action,
        rng: &mut GameRng,
    ) -> Result<Vec<Effect>, GameError>;

    fn check_terminal(state: &Self::State) -> Option<Outcome>;

    fn legal_actions(state: &Self::State, role: Role) -> Vec<Self::Action>;

    /// Deterministic action taken on `role`'s behalf when their turn clock expires.
    fn forced_action(state: &Self::State, role: Role) -> Option<Self::Action>;

    /// What `viewer` is allowed to see.
    fn view(state: &Self::State, viewer: Role) -> Self::View;
}

/// Runs an engine against a copy of the state and commits only on success.
fn run<E: RulesEngine>(
    state: &mut E::State,
    role: Role,
    action: E::Action,
    rng: &mut GameRng,
) -> Result<Vec<Effect>, GameError> {
    if E::check_terminal(state).is_some() {
        return Err(GameError::MatchAlreadyComplete);
    }
    if E::current_turn(state) != Some(role) {
        return Err(GameError::NotYourTurn);
    }
    let mut next = state.clone();
    let effects = E::apply(&mut next, role, action, rng)?;
    *state = next;
    Ok(effects)
}

/// Engine state for any game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameState {
    TicTacToe(tic_tac_toe::TicTacToeState),
    Connect4(connect_four::Connect4State),
    Uno(uno::UnoState),
    Monopoly(monopoly::MonopolyState),
    Blackjack(blackjack::BlackjackState),
    Battleship(battleship::BattleshipState),
}

/// Per-seat projection of a [`GameState`].
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "game", content = "view", rename_all = "snake_case")]
pub enum GameView {
    TicTacToe(tic_tac_toe::TicTacToeView),
    Connect4(connect_four::Connect4View),
    Uno(uno::UnoView),
    Monopoly(monopoly::MonopolyView),
    Blackjack(blackjack::BlackjackView),
    Battleship(battleship::BattleshipView),
}

macro_rules! dispatch {
    ($state:expr, $s:ident, $engine:ident => $body:expr) => {
        match $state {
            GameState::TicTacToe($s) => {
                type $engine = tic_tac_toe::TicTacToe;
                $body
            }
            GameState::Connect4($s) => {
                type $engine = connect_four::ConnectFour;
                $body
            }
            GameState::Uno($s) => {
                type $engine = uno::Uno;
                $body
            }
            GameState::Monopoly($s) => {
                type $engine = monopoly::Monopoly;
                $body
            }
            GameState::Blackjack($s) => {
                type $engine = blackjack::Blackjack;
                $body
            }
            GameState::Battleship($s) => {
                type $engine = battleship::Battleship;
                $body
            }
        }
    };
}

impl GameState {
    pub fn game_type(&self) -> GameType {
        match self {
            GameState::TicTacToe(_) => GameType::TicTacToe,
            GameState::Connect4(_) => GameType::Connect4,
            GameState::Uno(_) => GameType::Uno,
            GameState::Monopoly(_) => GameType::Monopoly,
            GameState::Blackjack(_) => GameType::Blackjack,
            GameState::Battleship(_) => GameType::Battleship,
        }
    }

    pub fn current_turn(&self) -> Option<Role> {
        dispatch!(self, s, E => E::current_turn(s))
    }

    /// Name of the current phase, for snapshots and logs.
    pub fn phase_name(&self) -> String {
        dispatch!(self, s, E => format!("{:?}", E::phase(s)))
    }

    pub fn check_terminal(&self) -> Option<Outcome> {
        dispatch!(self, s, E => E::check_terminal(s))
    }

    pub fn legal_actions(&self, role: Role) -> Vec<Action> {
        if self.check_terminal().is_some() || self.current_turn() != Some(role) {
            return Vec::new();
        }
        dispatch!(self, s, E => E::legal_actions(s, role)
            .into_iter()
            .map(Into::into)
            .collect())
    }

    pub fn forced_action(&self, role: Role) -> Option<Action> {
        if self.check_terminal().is_some() || self.current_turn() != Some(role) {
            return None;
        }
        dispatch!(self, s, E => E::forced_action(s, role).map(Into::into))
    }

    pub fn view(&self, viewer: Role) -> GameView {
        match self {
            GameState::TicTacToe(s) => {
                GameView::TicTacToe(tic_tac_toe::TicTacToe::view(s, viewer))
            }
            GameState::Connect4(s) => {
                GameView::Connect4(connect_four::ConnectFour::view(s, viewer))
            }
            GameState::Uno(s) => GameView::Uno(uno::Uno::view(s, viewer)),
            GameState::Monopoly(s) => GameView::Monopoly(monopoly::Monopoly::view(s, viewer)),
            GameState::Blackjack(s) => GameView::Blackjack(blackjack::Blackjack::view(s, viewer)),
            GameState::Battleship(s) => {
                GameView::Battleship(battleship::Battleship::view(s, viewer))
            }
        }
    }
}

/// Dispatch game initialization to the appropriate engine.
pub fn init_game(config: &GameConfig, rng: &mut GameRng) -> Result<GameState, GameError> {
    Ok(match config {
        GameConfig::TicTacToe(c) => GameState::TicTacToe(tic_tac_toe::TicTacToe::init(c, rng)?),
        GameConfig::Connect4(c) => GameState::Connect4(connect_four::ConnectFour::init(c, rng)?),
        GameConfig::Uno(c) => GameState::Uno(uno::Uno::init(c, rng)?),
        GameConfig::Monopoly(c) => GameState::Monopoly(monopoly::Monopoly::init(c, rng)?),
        GameConfig::Blackjack(c) => GameState::Blackjack(blackjack::Blackjack::init(c, rng)?),
        GameConfig::Battleship(c) => {
            GameState::Battleship(battleship::Battleship::init(c, rng)?)
        }
    })
}

/// Dispatch an action to the appropriate engine.
///
/// Rejections are checked in order: match complete, wrong turn, wrong phase, illegal move. A
/// rejected action leaves `state` untouched.
pub fn apply_action(
    state: &mut GameState,
    role: Role,
    action: Action,
    rng: &mut GameRng,
) -> Result<Vec<Effect>, GameError> {
    match (state, action) {
        (GameState::TicTacToe(s), Action::TicTacToe(a)) => {
            run::<tic_tac_toe::TicTacToe>(s, role, a, rng)
        }
        (GameState::Connect4(s), Action::Connect4(a)) => {
            run::<connect_four::ConnectFour>(s, role, a, rng)
        }
        (GameState::Uno(s), Action::Uno(a)) => run::<uno::Uno>(s, role, a, rng),
        (GameState::Monopoly(s), Action::Monopoly(a)) => run::<monopoly::Monopoly>(s, role, a, rng),
        (GameState::Blackjack(s), Action::Blackjack(a)) => {
            run::<blackjack::Blackjack>(s, role, a, rng)
        }
        (GameState::Battleship(s), Action::Battleship(a)) => {
            run::<battleship::Battleship>(s, role, a, rng)
        }
        (state, action) => {
            if state.check_terminal().is_some() {
                return Err(GameError::MatchAlreadyComplete);
            }
            if state.current_turn() != Some(role) {
                return Err(GameError::NotYourTurn);
            }
            Err(GameError::WrongGame {
                action: action.game_type(),
                game: state.game_type(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::test_seed;

    #[test]
    fn test_game_rng_deterministic() {
        let seed = test_seed(1);

        let mut rng1 = GameRng::new(&seed, 1, 0);
        let mut rng2 = GameRng::new(&seed, 1, 0);

        for _ in 0..100 {
            assert_eq!(rng1.next_u8(), rng2.next_u8());
        }
    }

    #[test]
    fn test_game_rng_different_moves() {
        let seed = test_seed(1);

        let mut rng1 = GameRng::new(&seed, 1, 0);
        let mut rng2 = GameRng::new(&seed, 1, 1);

        let seq1: Vec<u8> = (0..10).map(|_| rng1.next_u8()).collect();
        let seq2: Vec<u8> = (0..10).map(|_| rng2.next_u8()).collect();
        assert_ne!(seq1, seq2);
    }

    #[test]
    fn test_game_rng_bounded() {
        let mut rng = GameRng::new(&test_seed(2), 1, 0);
        for _ in 0..1000 {
            assert!(rng.next_bounded(52) < 52);
            assert!(rng.next_index(300) < 300);
        }
        assert_eq!(rng.next_index(0), 0);
    }

    #[test]
    fn test_game_rng_shoe() {
        let mut rng = GameRng::new(&test_seed(3), 1, 0);
        let shoe = rng.create_shoe(2);
        assert_eq!(shoe.len(), 104);
        for card in 0..52u8 {
            assert_eq!(shoe.iter().filter(|c| **c == card).count(), 2);
        }

        let mut deck = rng.create_shoe(1);
        let card = rng.draw_card(&mut deck).unwrap();
        assert_eq!(deck.len(), 51);
        assert!(!deck.contains(&card));
    }

    #[test]
    fn test_game_rng_dice() {
        let mut rng = GameRng::new(&test_seed(4), 1, 0);
        for _ in 0..1000 {
            let roll = rng.roll_die();
            assert!((1..=6).contains(&roll));
        }
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(GameError::NotYourTurn.code(), "NOT_YOUR_TURN");
        assert_eq!(GameError::invalid_phase("Setup").code(), "INVALID_PHASE");
        assert_eq!(GameError::IllegalMove("occupied").code(), "ILLEGAL_MOVE");
        assert_eq!(
            GameError::MatchAlreadyComplete.code(),
            "MATCH_ALREADY_COMPLETE"
        );
        assert!(GameError::Invariant("deck empty".into()).is_fatal());
        assert!(!GameError::NotYourTurn.is_fatal());
    }

    #[test]
    fn test_wrong_game_action_is_illegal() {
        let mut rng = GameRng::new(&test_seed(5), 1, 0);
        let mut state = init_game(&GameConfig::default_for(GameType::TicTacToe), &mut rng).unwrap();
        let err = apply_action(
            &mut state,
            Role::Player1,
            pengu_types::minigame::Connect4Action::Drop { column: 0 }.into(),
            &mut rng,
        )
        .unwrap_err();
        assert_eq!(err.code(), "ILLEGAL_MOVE");

        let err = apply_action(
            &mut state,
            Role::Player2,
            pengu_types::minigame::Connect4Action::Drop { column: 0 }.into(),
            &mut rng,
        )
        .unwrap_err();
        assert_eq!(err, GameError::NotYourTurn);
    }
}
