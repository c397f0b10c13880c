//! Bot seats for local play.
//!
//! Bots drive a match through the [`Arcade`] exactly like a client would, so a bot run
//! exercises the same rejection, timeout and settlement paths as real traffic.

use crate::{Arcade, ArcadeError};
use pengu_execution::{GameRng, GameState, Seed, SettlementRecord, TargetingAi};
use pengu_types::minigame::{Action, GameType, MatchStatus, Outcome, Participant, Role, Wager};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;
use tracing::debug;

/// Simulated time between bot moves.
const MOVE_INTERVAL_MS: u64 = 500;

pub trait Bot: Send {
    /// Picks an action for `role`, or `None` if the bot has nothing to play.
    fn choose(&mut self, state: &GameState, role: Role) -> Option<Action>;
}

/// Plays a uniformly random legal action.
pub struct RandomBot {
    rng: StdRng,
}

impl RandomBot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Bot for RandomBot {
    fn choose(&mut self, state: &GameState, role: Role) -> Option<Action> {
        let actions = state.legal_actions(role);
        if actions.is_empty() {
            return None;
        }
        Some(actions[self.rng.gen_range(0..actions.len())])
    }
}

/// Battleship seat driven by the hunt/target AI.
pub struct BattleshipBot {
    ai: TargetingAi,
    seed: Seed,
    shots: u32,
    last_fired: Option<u8>,
}

impl BattleshipBot {
    pub fn new(seed: Seed) -> Self {
        Self {
            ai: TargetingAi::new(),
            seed,
            shots: 0,
            last_fired: None,
        }
    }
}

impl Bot for BattleshipBot {
    fn choose(&mut self, state: &GameState, role: Role) -> Option<Action> {
        let GameState::Battleship(state) = state else {
            return None;
        };
        // Learn from the previous shot before aiming the next one.
        if let Some(cell) = self.last_fired.take() {
            let target = state.target_board(role);
            let ship = target.ships.iter().find(|ship| ship.cells.contains(&cell));
            let sunk = ship.filter(|ship| ship.is_sunk()).map(|ship| ship.cells.as_slice());
            self.ai.record_shot(cell, ship.is_some(), sunk);
        }
        self.shots += 1;
        let mut rng = GameRng::new(&self.seed, 0, self.shots);
        let action = self.ai.next_action(state, role, &mut rng)?;
        if let pengu_types::minigame::BattleshipAction::Fire { cell } = action {
            self.last_fired = Some(cell);
        }
        Some(action.into())
    }
}

/// Picks the bot for a game: the targeting AI for Battleship, random play elsewhere.
pub fn bot_for(game_type: GameType, seed: u64) -> Box<dyn Bot> {
    match game_type {
        GameType::Battleship => {
            let mut bot_seed = [0u8; 32];
            bot_seed[..8].copy_from_slice(&seed.to_be_bytes());
            Box::new(BattleshipBot::new(bot_seed))
        }
        _ => Box::new(RandomBot::new(seed)),
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BotMatchReport {
    pub match_id: u64,
    pub game_type: GameType,
    /// `None` when the move cap was reached first.
    pub outcome: Option<Outcome>,
    pub moves: u32,
    pub settlement: Option<SettlementRecord>,
}

/// Plays one match between two bots through `arcade`.
pub fn play_bot_match(
    arcade: &mut Arcade,
    game_type: GameType,
    wager: Wager,
    seed: u64,
    max_moves: u32,
) -> Result<BotMatchReport, ArcadeError> {
    let players = [
        Participant::human(format!("bot-{seed}-1"), "Bot One", Role::Player1),
        Participant::human(format!("bot-{seed}-2"), "Bot Two", Role::Player2),
    ];
    let ids = players.clone().map(|p| p.id);
    let mut bots = [
        bot_for(game_type, seed),
        bot_for(game_type, seed.wrapping_add(1)),
    ];

    let mut now_ms = 0;
    let (match_id, _) = arcade.challenge(game_type, players, wager, now_ms)?;
    let mut moves = 0;
    while moves < max_moves {
        let Some(session) = arcade.session(match_id) else {
            break;
        };
        if session.status() == MatchStatus::Complete {
            break;
        }
        let (Some(state), Some(role)) = (session.state(), session.current_turn()) else {
            break;
        };
        let Some(action) = bots[role.index()].choose(state, role) else {
            break;
        };
        now_ms += MOVE_INTERVAL_MS;
        arcade.submit(match_id, &ids[role.index()], action, now_ms)?;
        moves += 1;
    }

    let session = arcade
        .session(match_id)
        .ok_or(ArcadeError::UnknownMatch(match_id))?;
    let report = BotMatchReport {
        match_id,
        game_type,
        outcome: session.outcome(),
        moves,
        settlement: session.settlement().cloned(),
    };
    debug!(match_id, %game_type, moves, outcome = ?report.outcome, "bot match finished");

    for id in &ids {
        // Archival needs both acknowledgements; an unfinished match stays live.
        if report.outcome.is_some() {
            arcade.acknowledge(match_id, id)?;
        }
    }
    Ok(report)
}
