//! Minigame domain types.
//!
//! Defines match/participant/wager records, per-game actions and effects, and the static game
//! data used by the execution layer and clients.

mod action;
mod board;
mod cards;
mod codec;
mod constants;
mod effect;
mod fleet;
mod game;
mod uno;

pub use action::*;
pub use board::*;
pub use cards::*;
pub use constants::*;
pub use effect::*;
pub use fleet::*;
pub use game::*;
pub use uno::*;
