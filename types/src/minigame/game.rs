use bytes::{Buf, BufMut};
use commonware_codec::{Error, FixedSize, Read, ReadExt, Write};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error as ThisError;

use super::{MAX_MINT_ADDRESS_LENGTH, MAX_NAME_LENGTH, MAX_PARTICIPANT_ID_LENGTH, MAX_SYMBOL_LENGTH};

/// Minigame types offered in the arcade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum GameType {
    TicTacToe = 0,
    Connect4 = 1,
    Uno = 2,
    Monopoly = 3,
    Blackjack = 4,
    Battleship = 5,
}

impl GameType {
    pub const ALL: [GameType; 6] = [
        GameType::TicTacToe,
        GameType::Connect4,
        GameType::Uno,
        GameType::Monopoly,
        GameType::Blackjack,
        GameType::Battleship,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameType::TicTacToe => "tic_tac_toe",
            GameType::Connect4 => "connect4",
            GameType::Uno => "uno",
            GameType::Monopoly => "monopoly",
            GameType::Blackjack => "blackjack",
            GameType::Battleship => "battleship",
        }
    }

    /// Only Battleship ships a computer opponent.
    pub fn allows_computer_opponent(&self) -> bool {
        matches!(self, GameType::Battleship)
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, ThisError, PartialEq, Eq)]
#[error("unknown game type: {0}")]
pub struct UnknownGameType(pub String);

impl FromStr for GameType {
    type Err = UnknownGameType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "tic_tac_toe" | "tictactoe" => Ok(GameType::TicTacToe),
            "connect4" | "connect_4" | "connect_four" => Ok(GameType::Connect4),
            "uno" => Ok(GameType::Uno),
            "monopoly" => Ok(GameType::Monopoly),
            "blackjack" => Ok(GameType::Blackjack),
            "battleship" => Ok(GameType::Battleship),
            _ => Err(UnknownGameType(s.to_string())),
        }
    }
}

impl Write for GameType {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for GameType {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = u8::read(reader)?;
        match value {
            0 => Ok(Self::TicTacToe),
            1 => Ok(Self::Connect4),
            2 => Ok(Self::Uno),
            3 => Ok(Self::Monopoly),
            4 => Ok(Self::Blackjack),
            5 => Ok(Self::Battleship),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl FixedSize for GameType {
    const SIZE: usize = 1;
}

/// Seat in a match. Player1 always moves first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Role {
    Player1 = 0,
    Player2 = 1,
}

impl Role {
    pub const BOTH: [Role; 2] = [Role::Player1, Role::Player2];

    pub fn opponent(self) -> Role {
        match self {
            Role::Player1 => Role::Player2,
            Role::Player2 => Role::Player1,
        }
    }

    /// Array index for per-seat fields.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Player1 => f.write_str("player1"),
            Role::Player2 => f.write_str("player2"),
        }
    }
}

impl Write for Role {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for Role {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u8::read(reader)? {
            0 => Ok(Role::Player1),
            1 => Ok(Role::Player2),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl FixedSize for Role {
    const SIZE: usize = 1;
}

/// Who drives a seat.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum SeatKind {
    #[default]
    Human = 0,
    Computer = 1,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub kind: SeatKind,
}

impl Participant {
    pub fn human(id: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
            kind: SeatKind::Human,
        }
    }

    pub fn computer(role: Role) -> Self {
        Self {
            id: format!("cpu-{role}"),
            name: "Captain Cod".to_string(),
            role,
            kind: SeatKind::Computer,
        }
    }

    pub fn is_computer(&self) -> bool {
        self.kind == SeatKind::Computer
    }
}

/// SPL token wagered alongside (or instead of) in-game coins.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WagerToken {
    pub mint_address: String,
    /// Amount in the token's base units, staked by each seat.
    pub token_amount: u64,
    pub symbol: String,
}

/// Stake put up by each seat.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wager {
    /// In-game coins staked by each seat.
    pub amount: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<WagerToken>,
}

impl Wager {
    pub fn coins(amount: u64) -> Self {
        Self {
            amount,
            token: None,
        }
    }

    pub fn is_free(&self) -> bool {
        self.amount == 0 && self.token.as_ref().map_or(true, |t| t.token_amount == 0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum MatchStatus {
    #[default]
    Pending = 0,
    Playing = 1,
    Complete = 2,
}

/// Terminal result of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "role")]
pub enum Outcome {
    Winner(Role),
    Draw,
    /// The engine faulted; both stakes are refunded.
    Aborted,
}

impl Outcome {
    pub fn winner(&self) -> Option<Role> {
        match self {
            Outcome::Winner(role) => Some(*role),
            Outcome::Draw | Outcome::Aborted => None,
        }
    }
}

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum MatchInvariantError {
    #[error("participant name too long (len={len}, max={max})")]
    NameTooLong { len: usize, max: usize },
    #[error("participant id must be 1..={max} bytes (len={len})")]
    InvalidParticipantId { len: usize, max: usize },
    #[error("seat {index} holds {role}")]
    SeatOutOfOrder { index: usize, role: Role },
    #[error("both seats belong to {0}")]
    DuplicateParticipant(String),
    #[error("{0} does not support a computer opponent")]
    ComputerNotAllowed(GameType),
    #[error("at least one seat must be human")]
    NoHumanSeat,
    #[error("wager token needs a mint address and symbol")]
    IncompleteToken,
    #[error("wager token {field} too long (len={len}, max={max})")]
    TokenFieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
}

/// A two-seat contest between participants, including wager terms.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub match_id: u64,
    pub players: [Participant; 2],
    pub game_type: GameType,
    pub wager: Wager,
    pub status: MatchStatus,
    pub created_at_ms: u64,
}

impl Match {
    pub fn new(
        match_id: u64,
        game_type: GameType,
        players: [Participant; 2],
        wager: Wager,
        created_at_ms: u64,
    ) -> Self {
        Self {
            match_id,
            players,
            game_type,
            wager,
            status: MatchStatus::Pending,
            created_at_ms,
        }
    }

    pub fn participant(&self, role: Role) -> &Participant {
        &self.players[role.index()]
    }

    /// Finds the seat held by a participant id.
    pub fn role_of(&self, participant_id: &str) -> Option<Role> {
        self.players
            .iter()
            .find(|p| p.id == participant_id)
            .map(|p| p.role)
    }

    pub fn is_complete(&self) -> bool {
        self.status == MatchStatus::Complete
    }

    pub fn validate(&self) -> Result<(), MatchInvariantError> {
        for (index, participant) in self.players.iter().enumerate() {
            if participant.role.index() != index {
                return Err(MatchInvariantError::SeatOutOfOrder {
                    index,
                    role: participant.role,
                });
            }
            if participant.name.len() > MAX_NAME_LENGTH {
                return Err(MatchInvariantError::NameTooLong {
                    len: participant.name.len(),
                    max: MAX_NAME_LENGTH,
                });
            }
            if participant.id.is_empty() || participant.id.len() > MAX_PARTICIPANT_ID_LENGTH {
                return Err(MatchInvariantError::InvalidParticipantId {
                    len: participant.id.len(),
                    max: MAX_PARTICIPANT_ID_LENGTH,
                });
            }
            if participant.is_computer() && !self.game_type.allows_computer_opponent() {
                return Err(MatchInvariantError::ComputerNotAllowed(self.game_type));
            }
        }
        if self.players[0].id == self.players[1].id {
            return Err(MatchInvariantError::DuplicateParticipant(
                self.players[0].id.clone(),
            ));
        }
        if self.players.iter().all(Participant::is_computer) {
            return Err(MatchInvariantError::NoHumanSeat);
        }
        if let Some(token) = &self.wager.token {
            if token.mint_address.is_empty() || token.symbol.is_empty() {
                return Err(MatchInvariantError::IncompleteToken);
            }
            for (field, value, max) in [
                ("mint address", &token.mint_address, MAX_MINT_ADDRESS_LENGTH),
                ("symbol", &token.symbol, MAX_SYMBOL_LENGTH),
            ] {
                if value.len() > max {
                    return Err(MatchInvariantError::TokenFieldTooLong {
                        field,
                        len: value.len(),
                        max,
                    });
                }
            }
        }
        Ok(())
    }
}
