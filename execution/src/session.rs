//! Match sessions.
//!
//! A [`MatchSession`] owns everything needed to referee one match: the [`Match`] record, the
//! engine state, the turn clock, the seed commitment and the settlement. It is the only place
//! where actions are applied, so every accepted move goes through the same path:
//!
//! 1. reject with the [`GameError`] taxonomy (complete, turn, phase, legality)
//! 2. apply on the engine with a per-move [`GameRng`]
//! 3. restart the turn clock for whoever acts next
//! 4. complete and settle if the engine reports a terminal outcome
//! 5. play any computer seat's turns synchronously
//!
//! Fatal engine faults abort the match and refund both stakes.

use crate::fairness::SeedCommitment;
use crate::minigame::battleship_ai::TargetingAi;
use crate::minigame::{
    apply_action, init_game, GameConfig, GameError, GameRng, GameState, GameView, Seed,
};
use crate::settlement::{settle_once, PaymentStatus, SettlementError, SettlementRecord};
use crate::turn::{TimeoutVerdict, TurnClock, TurnConfig};
use commonware_codec::ReadExt;
use commonware_utils::hex;
use pengu_types::minigame::{
    Action, Effect, GameType, Match, MatchInvariantError, MatchStatus, Outcome, Participant, Role,
    Submission, Wager,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("invalid match: {0}")]
    InvalidMatch(#[from] MatchInvariantError),
    #[error("{config} config cannot run a {game} match")]
    ConfigMismatch { config: GameType, game: GameType },
    #[error("invalid game config: {0}")]
    InvalidGameConfig(&'static str),
    #[error("invalid turn config: {0}")]
    InvalidTurnConfig(&'static str),
    #[error("match already started")]
    AlreadyStarted,
    #[error("match has not been settled")]
    NotSettled,
    #[error(transparent)]
    Payment(#[from] SettlementError),
}

/// Per-seat view of a session, sent to clients after every change.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSnapshot {
    pub match_id: u64,
    pub game_type: GameType,
    pub status: MatchStatus,
    pub role: Role,
    pub players: [Participant; 2],
    pub wager: Wager,
    pub current_turn: Option<Role>,
    pub phase: Option<String>,
    pub turn_time_remaining_ms: Option<u64>,
    pub consecutive_timeouts: u8,
    pub move_number: u32,
    pub outcome: Option<Outcome>,
    pub seed_commit: String,
    /// Disclosed once the match is complete.
    pub seed_reveal: Option<String>,
    pub settlement: Option<SettlementRecord>,
    pub view: Option<GameView>,
}

pub struct MatchSession {
    record: Match,
    config: GameConfig,
    state: Option<GameState>,
    clock: TurnClock,
    commitment: SeedCommitment,
    move_number: u32,
    outcome: Option<Outcome>,
    settlement: Option<SettlementRecord>,
    acknowledged: [bool; 2],
    ai: [Option<TargetingAi>; 2],
}

impl MatchSession {
    pub fn new(
        record: Match,
        config: GameConfig,
        turn: TurnConfig,
        seed: Seed,
    ) -> Result<Self, SessionError> {
        record.validate()?;
        if config.game_type() != record.game_type {
            return Err(SessionError::ConfigMismatch {
                config: config.game_type(),
                game: record.game_type,
            });
        }
        config.validate().map_err(SessionError::InvalidGameConfig)?;
        turn.validate().map_err(SessionError::InvalidTurnConfig)?;

        let computer = |role: Role| record.participant(role).is_computer();
        let ai = Role::BOTH.map(|role| computer(role).then(TargetingAi::new));
        // Computer seats never need to acknowledge.
        let acknowledged = Role::BOTH.map(computer);

        Ok(Self {
            record,
            config,
            state: None,
            clock: TurnClock::new(turn),
            commitment: SeedCommitment::from_seed(seed),
            move_number: 0,
            outcome: None,
            settlement: None,
            acknowledged,
            ai,
        })
    }

    pub fn match_id(&self) -> u64 {
        self.record.match_id
    }

    pub fn record(&self) -> &Match {
        &self.record
    }

    pub fn status(&self) -> MatchStatus {
        self.record.status
    }

    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn settlement(&self) -> Option<&SettlementRecord> {
        self.settlement.as_ref()
    }

    pub fn commitment(&self) -> &SeedCommitment {
        &self.commitment
    }

    pub fn clock(&self) -> &TurnClock {
        &self.clock
    }

    pub fn current_turn(&self) -> Option<Role> {
        self.state.as_ref().and_then(GameState::current_turn)
    }

    /// Initialises the engine and moves the match from `Pending` to `Playing`.
    pub fn start(&mut self, now_ms: u64) -> Result<Vec<Effect>, SessionError> {
        if self.record.status != MatchStatus::Pending {
            return Err(SessionError::AlreadyStarted);
        }
        let mut effects = Vec::new();
        let mut rng = GameRng::new(&self.commitment.seed, self.record.match_id, 0);
        match init_game(&self.config, &mut rng) {
            Ok(state) => {
                self.record.status = MatchStatus::Playing;
                self.clock.start_turn(state.current_turn(), now_ms);
                self.state = Some(state);
                info!(
                    match_id = self.record.match_id,
                    game_type = %self.record.game_type,
                    seed_commit = %hex(&self.commitment.commit),
                    "match started"
                );
                self.after_move(now_ms, &mut effects);
            }
            Err(err) => {
                warn!(match_id = self.record.match_id, ?err, "engine failed to initialise");
                self.complete(Outcome::Aborted, now_ms, &mut effects);
            }
        }
        Ok(effects)
    }

    /// Applies an action submitted by a human seat.
    pub fn submit(
        &mut self,
        role: Role,
        action: Action,
        now_ms: u64,
    ) -> Result<Vec<Effect>, GameError> {
        if self.record.status == MatchStatus::Complete {
            return Err(GameError::MatchAlreadyComplete);
        }
        if self.state.is_none() {
            return Err(GameError::invalid_phase(self.record.status));
        }
        if self.record.participant(role).is_computer() {
            return Err(GameError::NotYourTurn);
        }

        let mut effects = Vec::new();
        let mut rng = self.next_rng();
        self.commit_move(role, action, &mut rng, now_ms, &mut effects)?;
        self.clock.record_action(role, self.current_turn(), now_ms);
        self.after_move(now_ms, &mut effects);
        Ok(effects)
    }

    /// Decodes a wire-encoded [`Submission`] for `role` and submits its action.
    pub fn submit_encoded(
        &mut self,
        role: Role,
        mut bytes: &[u8],
        now_ms: u64,
    ) -> Result<Vec<Effect>, GameError> {
        let submission = Submission::read(&mut bytes).map_err(|err| {
            debug!(match_id = self.record.match_id, %role, ?err, "malformed submission");
            GameError::IllegalMove("malformed submission")
        })?;
        if !bytes.is_empty() {
            return Err(GameError::IllegalMove("trailing bytes after submission"));
        }
        if submission.match_id != self.record.match_id {
            return Err(GameError::IllegalMove("submission is for another match"));
        }
        if submission.role != role {
            return Err(GameError::IllegalMove("submission is for another seat"));
        }
        self.submit(role, submission.action, now_ms)
    }

    /// Enforces the turn deadline. Returns the effects of any forced action or forfeit.
    pub fn tick(&mut self, now_ms: u64) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.record.status != MatchStatus::Playing {
            return effects;
        }
        let Some(role) = self.clock.check_timeout(now_ms) else {
            return effects;
        };

        effects.push(Effect::TimedOut { role });
        match self.clock.record_timeout(role) {
            TimeoutVerdict::Forfeit => {
                warn!(match_id = self.record.match_id, %role, "seat forfeited on timeouts");
                effects.push(Effect::Forfeited { role });
                self.complete(Outcome::Winner(role.opponent()), now_ms, &mut effects);
            }
            TimeoutVerdict::AutoAct => {
                let forced = self.state.as_ref().and_then(|s| s.forced_action(role));
                warn!(
                    match_id = self.record.match_id,
                    %role,
                    strikes = self.clock.strikes(role),
                    ?forced,
                    "turn timed out"
                );
                let Some(action) = forced else {
                    error!(match_id = self.record.match_id, %role, "no forced action available");
                    self.complete(Outcome::Aborted, now_ms, &mut effects);
                    return effects;
                };
                let mut rng = self.next_rng();
                let mut applied = Vec::new();
                let result = self.commit_move(role, action, &mut rng, now_ms, &mut applied);
                if result.is_ok() {
                    self.observe_computer(role, &applied);
                }
                effects.append(&mut applied);
                if result.is_ok() {
                    self.after_move(now_ms, &mut effects);
                }
                if self.record.status == MatchStatus::Playing {
                    // Strikes survive a forced move; only the deadline restarts.
                    self.clock.start_turn(self.current_turn(), now_ms);
                }
            }
        }
        effects
    }

    pub fn snapshot(&self, role: Role, now_ms: u64) -> MatchSnapshot {
        let complete = self.record.status == MatchStatus::Complete;
        MatchSnapshot {
            match_id: self.record.match_id,
            game_type: self.record.game_type,
            status: self.record.status,
            role,
            players: self.record.players.clone(),
            wager: self.record.wager.clone(),
            current_turn: self.current_turn(),
            phase: self.state.as_ref().map(GameState::phase_name),
            turn_time_remaining_ms: self.clock.remaining_ms(now_ms),
            consecutive_timeouts: self.clock.strikes(role),
            move_number: self.move_number,
            outcome: self.outcome,
            seed_commit: hex(&self.commitment.commit),
            seed_reveal: complete.then(|| hex(&self.commitment.seed)),
            settlement: self.settlement.clone(),
            view: self.state.as_ref().map(|s| s.view(role)),
        }
    }

    /// Records that a seat has seen the final result.
    pub fn acknowledge(&mut self, role: Role) -> Result<(), GameError> {
        if self.record.status != MatchStatus::Complete {
            return Err(GameError::invalid_phase(self.record.status));
        }
        self.acknowledged[role.index()] = true;
        debug!(match_id = self.record.match_id, %role, "result acknowledged");
        Ok(())
    }

    /// Complete and acknowledged by every human seat.
    pub fn is_archivable(&self) -> bool {
        self.record.status == MatchStatus::Complete && self.acknowledged.iter().all(|a| *a)
    }

    /// Applies the wallet's answer for a token payout.
    pub fn update_payment(&mut self, status: PaymentStatus) -> Result<(), SessionError> {
        let settlement = self.settlement.as_mut().ok_or(SessionError::NotSettled)?;
        settlement.update_payment(status)?;
        info!(
            match_id = self.record.match_id,
            status = ?settlement.payment_status,
            "payment status updated"
        );
        Ok(())
    }

    fn next_rng(&self) -> GameRng {
        GameRng::new(
            &self.commitment.seed,
            self.record.match_id,
            self.move_number + 1,
        )
    }

    /// Runs an action through the engine. Fatal faults abort the match before returning.
    fn commit_move(
        &mut self,
        role: Role,
        action: Action,
        rng: &mut GameRng,
        now_ms: u64,
        effects: &mut Vec<Effect>,
    ) -> Result<(), GameError> {
        let Some(state) = self.state.as_mut() else {
            return Err(GameError::invalid_phase(self.record.status));
        };
        match apply_action(state, role, action, rng) {
            Ok(mut applied) => {
                self.move_number += 1;
                debug!(
                    match_id = self.record.match_id,
                    %role,
                    ?action,
                    move_number = self.move_number,
                    "action applied"
                );
                effects.append(&mut applied);
                Ok(())
            }
            Err(err) if err.is_fatal() => {
                error!(
                    match_id = self.record.match_id,
                    %role,
                    ?err,
                    "engine fault, aborting match"
                );
                self.complete(Outcome::Aborted, now_ms, effects);
                Err(err)
            }
            Err(err) => {
                warn!(
                    match_id = self.record.match_id,
                    %role,
                    ?action,
                    code = err.code(),
                    "action rejected"
                );
                Err(err)
            }
        }
    }

    /// Completes a terminal match, then lets computer seats play until a human is up.
    fn after_move(&mut self, now_ms: u64, effects: &mut Vec<Effect>) {
        loop {
            let Some(state) = self.state.as_ref() else {
                return;
            };
            if let Some(outcome) = state.check_terminal() {
                self.complete(outcome, now_ms, effects);
                return;
            }
            let Some(role) = state.current_turn() else {
                return;
            };
            if self.ai[role.index()].is_none() {
                return;
            }
            if let Err(err) = self.computer_move(role, now_ms, effects) {
                warn!(match_id = self.record.match_id, %role, ?err, "computer seat stalled");
                return;
            }
        }
    }

    fn computer_move(
        &mut self,
        role: Role,
        now_ms: u64,
        effects: &mut Vec<Effect>,
    ) -> Result<(), GameError> {
        let mut rng = self.next_rng();
        let action = match (&self.state, &self.ai[role.index()]) {
            (Some(GameState::Battleship(state)), Some(ai)) => ai.next_action(state, role, &mut rng),
            _ => None,
        }
        .ok_or_else(|| GameError::Invariant(format!("no computer move for {role}")))?;

        let mut applied = Vec::new();
        self.commit_move(role, action.into(), &mut rng, now_ms, &mut applied)?;
        self.observe_computer(role, &applied);
        effects.append(&mut applied);
        self.clock.record_action(role, self.current_turn(), now_ms);
        Ok(())
    }

    /// Shows a computer seat the results of its own shots.
    fn observe_computer(&mut self, role: Role, applied: &[Effect]) {
        if let (Some(GameState::Battleship(state)), Some(ai)) =
            (&self.state, self.ai[role.index()].as_mut())
        {
            ai.observe(role, applied, state);
        }
    }

    /// Marks the match complete and settles it. Settlement failures fall back to a refund.
    fn complete(&mut self, outcome: Outcome, now_ms: u64, effects: &mut Vec<Effect>) {
        if self.record.status == MatchStatus::Complete {
            return;
        }
        self.record.status = MatchStatus::Complete;
        self.clock.stop();

        let mut outcome = outcome;
        if let Err(err) = settle_once(&mut self.settlement, &self.record, outcome, now_ms) {
            error!(match_id = self.record.match_id, ?err, "settlement failed, refunding");
            outcome = Outcome::Aborted;
            if let Err(err) = settle_once(&mut self.settlement, &self.record, outcome, now_ms) {
                error!(match_id = self.record.match_id, ?err, "refund failed");
            }
        }
        self.outcome = Some(outcome);
        effects.push(Effect::MatchEnded { outcome });
        info!(
            match_id = self.record.match_id,
            game_type = %self.record.game_type,
            ?outcome,
            moves = self.move_number,
            seed_reveal = %hex(&self.commitment.seed),
            "match complete"
        );
    }
}
