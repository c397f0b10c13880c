//! Shared data types for the pengu arcade.
//!
//! Everything a client needs to talk to an authoritative match host lives here: the match
//! record, wire-encoded actions, declarative effects and the static game data (decks, board,
//! fleet) that every rules engine reads from.

pub mod minigame;

pub use minigame::{
    Action, Effect, GameType, Match, MatchStatus, Outcome, Participant, Role, SeatKind,
    Submission, Wager, WagerToken,
};
