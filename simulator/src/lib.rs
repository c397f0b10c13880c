//! Local arcade host.
//!
//! [`Arcade`] keeps every live [`MatchSession`] keyed by match id and turns client messages
//! into session calls. [`spawn_arcade`] runs it as a single tokio task: [`Inbound`] messages
//! arrive on an mpsc channel, [`Outbound`] events leave on a broadcast channel and a tick
//! interval drives turn timeouts. Messages are handled one at a time, so a match never sees
//! two actions race.
//!
//! Every event addressed to a seat carries its `playerId`; subscribers drop the rest.

pub mod bots;
pub mod config;

pub use config::{ArcadeConfig, ConfigError};

use commonware_utils::from_hex;
use pengu_execution::{
    GameConfig, GameError, GameRegistry, MatchSession, MatchSnapshot, PaymentStatus, SeedChain,
    SessionError, SettlementRecord,
};
use pengu_types::minigame::{Action, Effect, GameType, Match, MatchStatus, Participant, Role, Wager};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ArcadeError {
    #[error("unknown match {0}")]
    UnknownMatch(u64),
    #[error("{player_id} is not seated in match {match_id}")]
    NotSeated { match_id: u64, player_id: String },
    #[error("{0} is not available")]
    GameInactive(GameType),
    #[error("arcade is full ({max} active matches)")]
    Full { max: usize },
    #[error("submission carries no action")]
    MissingAction,
    #[error("encoded submission is not valid hex")]
    InvalidHex,
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("arcade has shut down")]
    Closed,
}

impl ArcadeError {
    /// Code relayed to clients in [`Outbound::Rejected`].
    pub fn code(&self) -> &'static str {
        match self {
            ArcadeError::UnknownMatch(_) => "UNKNOWN_MATCH",
            ArcadeError::NotSeated { .. } => "NOT_SEATED",
            ArcadeError::GameInactive(_) => "GAME_INACTIVE",
            ArcadeError::Full { .. } => "ARCADE_FULL",
            ArcadeError::MissingAction | ArcadeError::InvalidHex => "INVALID_SUBMISSION",
            ArcadeError::Session(SessionError::NotSettled) => "NOT_SETTLED",
            ArcadeError::Session(SessionError::Payment(_)) => "INVALID_PAYMENT",
            ArcadeError::Session(_) => "INVALID_CHALLENGE",
            ArcadeError::Game(err) => err.code(),
            ArcadeError::Closed => "ARCADE_CLOSED",
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type")]
pub enum Inbound {
    #[serde(rename = "challenge")]
    Challenge {
        #[serde(rename = "requestId")]
        request_id: String,
        #[serde(rename = "gameType")]
        game_type: GameType,
        players: [Participant; 2],
        #[serde(default)]
        wager: Wager,
    },
    #[serde(rename = "submit")]
    Submit {
        #[serde(rename = "requestId")]
        request_id: String,
        #[serde(rename = "matchId")]
        match_id: u64,
        #[serde(rename = "playerId")]
        player_id: String,
        #[serde(default)]
        action: Option<Action>,
        /// Hex of a codec-encoded `Submission`; used when `action` is absent.
        #[serde(default)]
        encoded: Option<String>,
    },
    #[serde(rename = "acknowledge")]
    Acknowledge {
        #[serde(rename = "matchId")]
        match_id: u64,
        #[serde(rename = "playerId")]
        player_id: String,
    },
    /// Wallet callback for a settlement's token payouts.
    #[serde(rename = "payment")]
    PaymentUpdate {
        #[serde(rename = "matchId")]
        match_id: u64,
        status: PaymentStatus,
    },
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub enum Outbound {
    #[serde(rename = "accepted")]
    Accepted {
        #[serde(rename = "requestId")]
        request_id: String,
        #[serde(rename = "matchId")]
        match_id: u64,
    },
    #[serde(rename = "state")]
    State {
        #[serde(rename = "playerId")]
        player_id: String,
        effects: Vec<Effect>,
        snapshot: MatchSnapshot,
    },
    #[serde(rename = "rejected")]
    Rejected {
        #[serde(rename = "requestId", skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
        #[serde(rename = "playerId", skip_serializing_if = "Option::is_none")]
        player_id: Option<String>,
        code: String,
        message: String,
    },
    #[serde(rename = "settled")]
    Settled {
        #[serde(rename = "matchId")]
        match_id: u64,
        settlement: SettlementRecord,
    },
    #[serde(rename = "archived")]
    Archived {
        #[serde(rename = "matchId")]
        match_id: u64,
    },
}

fn rejected(request_id: Option<String>, player_id: Option<String>, err: &ArcadeError) -> Outbound {
    Outbound::Rejected {
        request_id,
        player_id,
        code: err.code().to_string(),
        message: err.to_string(),
    }
}

/// Per-seat state for every human seat, plus the settlement if this change completed the match.
fn publish(
    session: &MatchSession,
    effects: Vec<Effect>,
    was_complete: bool,
    now_ms: u64,
) -> Vec<Outbound> {
    let mut events: Vec<Outbound> = Role::BOTH
        .into_iter()
        .filter(|role| !session.record().participant(*role).is_computer())
        .map(|role| Outbound::State {
            player_id: session.record().participant(role).id.clone(),
            effects: effects.clone(),
            snapshot: session.snapshot(role, now_ms),
        })
        .collect();
    if !was_complete && session.status() == MatchStatus::Complete {
        if let Some(settlement) = session.settlement() {
            events.push(Outbound::Settled {
                match_id: session.match_id(),
                settlement: settlement.clone(),
            });
        }
    }
    events
}

pub struct Arcade {
    config: ArcadeConfig,
    registry: GameRegistry,
    seeds: SeedChain,
    sessions: BTreeMap<u64, MatchSession>,
    next_match_id: u64,
}

impl Arcade {
    /// Builds an arcade from a validated config.
    pub fn try_new(config: ArcadeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            registry: config.registry(),
            seeds: SeedChain::from_phrase(&config.seed_phrase),
            config,
            sessions: BTreeMap::new(),
            next_match_id: 1,
        })
    }

    pub fn config(&self) -> &ArcadeConfig {
        &self.config
    }

    pub fn session(&self, match_id: u64) -> Option<&MatchSession> {
        self.sessions.get(&match_id)
    }

    pub fn active_matches(&self) -> usize {
        self.sessions.len()
    }

    pub fn handle(&mut self, inbound: Inbound, now_ms: u64) -> Vec<Outbound> {
        match inbound {
            Inbound::Challenge {
                request_id,
                game_type,
                players,
                wager,
            } => {
                let challenger = players[0].id.clone();
                match self.challenge(game_type, players, wager, now_ms) {
                    Ok((match_id, events)) => {
                        let mut out = vec![Outbound::Accepted {
                            request_id,
                            match_id,
                        }];
                        out.extend(events);
                        out
                    }
                    Err(err) => {
                        warn!(%game_type, %challenger, ?err, "challenge rejected");
                        vec![rejected(Some(request_id), Some(challenger), &err)]
                    }
                }
            }
            Inbound::Submit {
                request_id,
                match_id,
                player_id,
                action,
                encoded,
            } => {
                let result = match (action, encoded) {
                    (Some(action), _) => self.submit(match_id, &player_id, action, now_ms),
                    (None, Some(encoded)) => match from_hex(&encoded) {
                        Some(bytes) => self.submit_encoded(match_id, &player_id, &bytes, now_ms),
                        None => Err(ArcadeError::InvalidHex),
                    },
                    (None, None) => Err(ArcadeError::MissingAction),
                };
                result.unwrap_or_else(|err| {
                    vec![rejected(Some(request_id), Some(player_id), &err)]
                })
            }
            Inbound::Acknowledge {
                match_id,
                player_id,
            } => self
                .acknowledge(match_id, &player_id)
                .unwrap_or_else(|err| vec![rejected(None, Some(player_id), &err)]),
            Inbound::PaymentUpdate { match_id, status } => self
                .update_payment(match_id, status)
                .unwrap_or_else(|err| {
                    warn!(match_id, ?err, "payment update rejected");
                    vec![rejected(None, None, &err)]
                }),
        }
    }

    /// Creates and starts a match. Returns its id and the opening state for each seat.
    pub fn challenge(
        &mut self,
        game_type: GameType,
        players: [Participant; 2],
        wager: Wager,
        now_ms: u64,
    ) -> Result<(u64, Vec<Outbound>), ArcadeError> {
        if !self.registry.is_active(game_type) {
            return Err(ArcadeError::GameInactive(game_type));
        }
        if self.sessions.len() >= self.config.max_active_matches {
            return Err(ArcadeError::Full {
                max: self.config.max_active_matches,
            });
        }

        let match_id = self.next_match_id;
        let record = Match::new(match_id, game_type, players, wager, now_ms);
        let config = self
            .registry
            .get_config(game_type)
            .cloned()
            .unwrap_or_else(|| GameConfig::default_for(game_type));
        let mut session = MatchSession::new(
            record,
            config,
            self.config.turn_for(game_type),
            self.seeds.derive_seed(match_id),
        )?;
        self.next_match_id += 1;

        let effects = session.start(now_ms)?;
        info!(match_id, %game_type, "challenge accepted");
        let events = publish(&session, effects, false, now_ms);
        self.sessions.insert(match_id, session);
        Ok((match_id, events))
    }

    pub fn submit(
        &mut self,
        match_id: u64,
        player_id: &str,
        action: Action,
        now_ms: u64,
    ) -> Result<Vec<Outbound>, ArcadeError> {
        let (session, role) = self.seat(match_id, player_id)?;
        let was_complete = session.status() == MatchStatus::Complete;
        let effects = session.submit(role, action, now_ms)?;
        Ok(publish(session, effects, was_complete, now_ms))
    }

    /// Submits a codec-encoded [`Submission`](pengu_types::minigame::Submission) from `player_id`.
    pub fn submit_encoded(
        &mut self,
        match_id: u64,
        player_id: &str,
        bytes: &[u8],
        now_ms: u64,
    ) -> Result<Vec<Outbound>, ArcadeError> {
        let (session, role) = self.seat(match_id, player_id)?;
        let was_complete = session.status() == MatchStatus::Complete;
        let effects = session.submit_encoded(role, bytes, now_ms)?;
        Ok(publish(session, effects, was_complete, now_ms))
    }

    pub fn acknowledge(
        &mut self,
        match_id: u64,
        player_id: &str,
    ) -> Result<Vec<Outbound>, ArcadeError> {
        let (session, role) = self.seat(match_id, player_id)?;
        session.acknowledge(role)?;
        Ok(self.archive_if_done(match_id).into_iter().collect())
    }

    pub fn update_payment(
        &mut self,
        match_id: u64,
        status: PaymentStatus,
    ) -> Result<Vec<Outbound>, ArcadeError> {
        let session = self
            .sessions
            .get_mut(&match_id)
            .ok_or(ArcadeError::UnknownMatch(match_id))?;
        session.update_payment(status)?;
        let mut events = Vec::new();
        if let Some(settlement) = session.settlement() {
            events.push(Outbound::Settled {
                match_id,
                settlement: settlement.clone(),
            });
        }
        events.extend(self.archive_if_done(match_id));
        Ok(events)
    }

    /// Sweeps every live match for expired turns.
    pub fn tick(&mut self, now_ms: u64) -> Vec<Outbound> {
        let mut events = Vec::new();
        for session in self.sessions.values_mut() {
            let was_complete = session.status() == MatchStatus::Complete;
            let effects = session.tick(now_ms);
            if !effects.is_empty() {
                events.extend(publish(session, effects, was_complete, now_ms));
            }
        }
        events
    }

    fn seat(
        &mut self,
        match_id: u64,
        player_id: &str,
    ) -> Result<(&mut MatchSession, Role), ArcadeError> {
        let session = self
            .sessions
            .get_mut(&match_id)
            .ok_or(ArcadeError::UnknownMatch(match_id))?;
        let role = session
            .record()
            .role_of(player_id)
            .ok_or_else(|| ArcadeError::NotSeated {
                match_id,
                player_id: player_id.to_string(),
            })?;
        Ok((session, role))
    }

    /// Drops a match once every seat has seen the result and no transfer is in flight.
    fn archive_if_done(&mut self, match_id: u64) -> Option<Outbound> {
        let session = self.sessions.get(&match_id)?;
        let payment_pending = session
            .settlement()
            .is_some_and(|s| s.payment_status == PaymentStatus::Pending);
        if !session.is_archivable() || payment_pending {
            return None;
        }
        self.sessions.remove(&match_id);
        info!(match_id, "match archived");
        Some(Outbound::Archived { match_id })
    }
}

/// Handle to a running arcade task.
pub struct ArcadeHandle {
    inbound: mpsc::Sender<Inbound>,
    outbound: broadcast::Sender<Outbound>,
    task: JoinHandle<()>,
}

impl ArcadeHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<Outbound> {
        self.outbound.subscribe()
    }

    pub async fn send(&self, message: Inbound) -> Result<(), ArcadeError> {
        self.inbound
            .send(message)
            .await
            .map_err(|_| ArcadeError::Closed)
    }

    /// Closes the inbound channel and waits for the task to drain it.
    pub async fn shutdown(self) {
        drop(self.inbound);
        if let Err(err) = self.task.await {
            warn!(?err, "arcade task failed");
        }
    }
}

/// Runs `arcade` on its own task. Channel sizes and the tick interval come from its
/// already-validated config.
pub fn spawn_arcade(arcade: Arcade) -> ArcadeHandle {
    let (inbound, mut receiver) = mpsc::channel(arcade.config.inbound_buffer);
    let (outbound, _) = broadcast::channel(arcade.config.outbound_buffer);
    let tick = Duration::from_millis(arcade.config.tick_ms);

    let events = outbound.clone();
    let task = tokio::spawn(async move {
        let mut arcade = arcade;
        let started = Instant::now();
        let mut interval = time::interval(tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            let out = tokio::select! {
                message = receiver.recv() => match message {
                    Some(message) => {
                        debug!(?message, "inbound message");
                        arcade.handle(message, started.elapsed().as_millis() as u64)
                    }
                    None => break,
                },
                _ = interval.tick() => arcade.tick(started.elapsed().as_millis() as u64),
            };
            for event in out {
                // No subscribers is not an error.
                let _ = events.send(event);
            }
        }
        info!(active = arcade.active_matches(), "arcade stopped");
    });

    ArcadeHandle {
        inbound,
        outbound,
        task,
    }
}
