//! Fixtures shared by unit tests, integration tests and the simulator.

use crate::fairness::SeedChain;
use crate::minigame::{GameRng, Seed};
use pengu_types::minigame::{GameType, Match, Participant, Role, Wager, WagerToken};

/// Mint used for token-wager fixtures.
pub const TEST_MINT: &str = "PENGUmint1111111111111111111111111111111111";

/// Deterministic seed for fixture `n`.
pub fn test_seed(n: u64) -> Seed {
    SeedChain::from_phrase("pengu-arcade-tests").derive_seed(n)
}

pub fn test_rng() -> GameRng {
    GameRng::new(&test_seed(0), 1, 0)
}

fn humans() -> [Participant; 2] {
    [
        Participant::human("alice", "Alice", Role::Player1),
        Participant::human("bob", "Bob", Role::Player2),
    ]
}

/// Two human seats staking `amount` coins each.
pub fn sample_match(match_id: u64, game_type: GameType, amount: u64) -> Match {
    Match::new(match_id, game_type, humans(), Wager::coins(amount), 0)
}

/// Connect-4 between two humans with a PENGU token stake on top of the coins.
pub fn token_match(match_id: u64, amount: u64, token_amount: u64) -> Match {
    let wager = Wager {
        amount,
        token: Some(WagerToken {
            mint_address: TEST_MINT.to_string(),
            token_amount,
            symbol: "PENGU".to_string(),
        }),
    };
    Match::new(match_id, GameType::Connect4, humans(), wager, 0)
}

/// Battleship with a computer in the second seat.
pub fn computer_match(match_id: u64) -> Match {
    Match::new(
        match_id,
        GameType::Battleship,
        [
            Participant::human("alice", "Alice", Role::Player1),
            Participant::computer(Role::Player2),
        ],
        Wager::coins(0),
        0,
    )
}
