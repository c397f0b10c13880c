//! Pengu arcade execution layer.
//!
//! This crate contains the rules engines for every arcade game together with the pieces that
//! referee a match around them: the turn clock, seed commitments, settlement and the
//! [`MatchSession`] that ties them together.
//!
//! ## Determinism requirements
//! - Do not read a wall clock inside execution; callers pass `now_ms`.
//! - Only draw randomness from [`GameRng`], derived from the match seed and move number.
//! - A match must replay identically from its seed and the ordered list of submitted actions.
//!
//! ## Minimal session (example)
//! ```rust,ignore
//! use pengu_execution::{GameConfig, MatchSession, SeedChain, TurnConfig};
//!
//! let chain = SeedChain::from_phrase("local");
//! let mut session = MatchSession::new(
//!     record,
//!     GameConfig::default_for(record.game_type),
//!     TurnConfig::for_game(record.game_type),
//!     chain.derive_seed(record.match_id),
//! )?;
//! session.start(now_ms)?;
//! let effects = session.submit(Role::Player1, action, now_ms)?;
//! ```

pub mod fairness;
pub mod minigame;
pub mod session;
pub mod settlement;
pub mod turn;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

pub use fairness::{
    compute_commit, verify_commit_reveal, verify_commit_reveal_slices, CommitRevealError,
    SeedChain, SeedCommitment, COMMIT_LEN,
};
pub use minigame::battleship_ai::TargetingAi;
pub use minigame::registry::{
    BattleshipConfig, BlackjackConfig, Connect4Config, GameInfo, GameRegistry, MonopolyConfig,
    TicTacToeConfig, UnoConfig,
};
pub use minigame::{
    apply_action, init_game, GameConfig, GameError, GameRng, GameState, GameView, RulesEngine,
    Seed,
};
pub use session::{MatchSession, MatchSnapshot, SessionError};
pub use settlement::{
    settle, settle_once, PaymentStatus, Payout, SettlementError, SettlementRecord, TokenPayout,
};
pub use turn::{TimeoutVerdict, TurnClock, TurnConfig};
