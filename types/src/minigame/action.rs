//! Player actions and their wire encoding.
//!
//! Binary layout of a submission:
//! [matchId:u64 BE] [role:u8] [gameType:u8] [actionTag:u8] [fields...]

use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use serde::{Deserialize, Serialize};

use super::codec::read_index;
use super::{
    GameType, Role, UnoCard, UnoColor, BATTLESHIP_CELLS, CONNECT4_COLUMNS, TIC_TAC_TOE_CELLS,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TicTacToeAction {
    /// Binary: [0] [index:u8]
    Place { index: u8 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Connect4Action {
    /// Binary: [0] [column:u8]
    Drop { column: u8 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UnoAction {
    /// Binary: [0] [cardId:u8]
    Play { card: UnoCard },
    /// Binary: [1] [color:u8]
    ChooseColor { color: UnoColor },
    /// Binary: [2]
    Draw,
    /// Binary: [3]
    Pass,
    /// Binary: [4]
    CallUno,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlackjackAction {
    Hit = 0,
    Stand = 1,
    Double = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MonopolyAction {
    Roll = 0,
    Buy = 1,
    Decline = 2,
    PayBail = 3,
    EndTurn = 4,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BattleshipAction {
    /// Binary: [0]
    Randomize,
    /// Binary: [1]
    Ready,
    /// Binary: [2] [cell:u8]
    Fire { cell: u8 },
}

/// An action for any game, keyed by game type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "game", content = "action", rename_all = "snake_case")]
pub enum Action {
    TicTacToe(TicTacToeAction),
    Connect4(Connect4Action),
    Uno(UnoAction),
    Monopoly(MonopolyAction),
    Blackjack(BlackjackAction),
    Battleship(BattleshipAction),
}

impl Action {
    pub fn game_type(&self) -> GameType {
        match self {
            Action::TicTacToe(_) => GameType::TicTacToe,
            Action::Connect4(_) => GameType::Connect4,
            Action::Uno(_) => GameType::Uno,
            Action::Monopoly(_) => GameType::Monopoly,
            Action::Blackjack(_) => GameType::Blackjack,
            Action::Battleship(_) => GameType::Battleship,
        }
    }
}

impl From<TicTacToeAction> for Action {
    fn from(action: TicTacToeAction) -> Self {
        Action::TicTacToe(action)
    }
}

impl From<Connect4Action> for Action {
    fn from(action: Connect4Action) -> Self {
        Action::Connect4(action)
    }
}

impl From<UnoAction> for Action {
    fn from(action: UnoAction) -> Self {
        Action::Uno(action)
    }
}

impl From<MonopolyAction> for Action {
    fn from(action: MonopolyAction) -> Self {
        Action::Monopoly(action)
    }
}

impl From<BlackjackAction> for Action {
    fn from(action: BlackjackAction) -> Self {
        Action::Blackjack(action)
    }
}

impl From<BattleshipAction> for Action {
    fn from(action: BattleshipAction) -> Self {
        Action::Battleship(action)
    }
}

impl Write for Action {
    fn write(&self, writer: &mut impl BufMut) {
        self.game_type().write(writer);
        match self {
            Action::TicTacToe(TicTacToeAction::Place { index }) => {
                0u8.write(writer);
                index.write(writer);
            }
            Action::Connect4(Connect4Action::Drop { column }) => {
                0u8.write(writer);
                column.write(writer);
            }
            Action::Uno(action) => match action {
                UnoAction::Play { card } => {
                    0u8.write(writer);
                    card.write(writer);
                }
                UnoAction::ChooseColor { color } => {
                    1u8.write(writer);
                    color.write(writer);
                }
                UnoAction::Draw => 2u8.write(writer),
                UnoAction::Pass => 3u8.write(writer),
                UnoAction::CallUno => 4u8.write(writer),
            },
            Action::Monopoly(action) => (*action as u8).write(writer),
            Action::Blackjack(action) => (*action as u8).write(writer),
            Action::Battleship(action) => match action {
                BattleshipAction::Randomize => 0u8.write(writer),
                BattleshipAction::Ready => 1u8.write(writer),
                BattleshipAction::Fire { cell } => {
                    2u8.write(writer);
                    cell.write(writer);
                }
            },
        }
    }
}

impl Read for Action {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let game_type = GameType::read(reader)?;
        let tag = u8::read(reader)?;
        let action = match (game_type, tag) {
            (GameType::TicTacToe, 0) => Action::TicTacToe(TicTacToeAction::Place {
                index: read_index(reader, TIC_TAC_TOE_CELLS as u8, "TicTacToeAction")?,
            }),
            (GameType::Connect4, 0) => Action::Connect4(Connect4Action::Drop {
                column: read_index(reader, CONNECT4_COLUMNS as u8, "Connect4Action")?,
            }),
            (GameType::Uno, 0) => Action::Uno(UnoAction::Play {
                card: UnoCard::read(reader)?,
            }),
            (GameType::Uno, 1) => Action::Uno(UnoAction::ChooseColor {
                color: UnoColor::read(reader)?,
            }),
            (GameType::Uno, 2) => Action::Uno(UnoAction::Draw),
            (GameType::Uno, 3) => Action::Uno(UnoAction::Pass),
            (GameType::Uno, 4) => Action::Uno(UnoAction::CallUno),
            (GameType::Monopoly, 0) => Action::Monopoly(MonopolyAction::Roll),
            (GameType::Monopoly, 1) => Action::Monopoly(MonopolyAction::Buy),
            (GameType::Monopoly, 2) => Action::Monopoly(MonopolyAction::Decline),
            (GameType::Monopoly, 3) => Action::Monopoly(MonopolyAction::PayBail),
            (GameType::Monopoly, 4) => Action::Monopoly(MonopolyAction::EndTurn),
            (GameType::Blackjack, 0) => Action::Blackjack(BlackjackAction::Hit),
            (GameType::Blackjack, 1) => Action::Blackjack(BlackjackAction::Stand),
            (GameType::Blackjack, 2) => Action::Blackjack(BlackjackAction::Double),
            (GameType::Battleship, 0) => Action::Battleship(BattleshipAction::Randomize),
            (GameType::Battleship, 1) => Action::Battleship(BattleshipAction::Ready),
            (GameType::Battleship, 2) => Action::Battleship(BattleshipAction::Fire {
                cell: read_index(reader, BATTLESHIP_CELLS as u8, "BattleshipAction")?,
            }),
            (_, i) => return Err(Error::InvalidEnum(i)),
        };
        Ok(action)
    }
}

impl EncodeSize for Action {
    fn encode_size(&self) -> usize {
        GameType::SIZE
            + u8::SIZE
            + match self {
                Action::TicTacToe(_) | Action::Connect4(_) => u8::SIZE,
                Action::Uno(UnoAction::Play { .. }) => UnoCard::SIZE,
                Action::Uno(UnoAction::ChooseColor { .. }) => UnoColor::SIZE,
                Action::Uno(_) => 0,
                Action::Monopoly(_) | Action::Blackjack(_) => 0,
                Action::Battleship(BattleshipAction::Fire { .. }) => u8::SIZE,
                Action::Battleship(_) => 0,
            }
    }
}

/// What a client sends to the host: an action for one seat of one match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub match_id: u64,
    pub role: Role,
    pub action: Action,
}

impl Write for Submission {
    fn write(&self, writer: &mut impl BufMut) {
        self.match_id.write(writer);
        self.role.write(writer);
        self.action.write(writer);
    }
}

impl Read for Submission {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            match_id: u64::read(reader)?,
            role: Role::read(reader)?,
            action: Action::read(reader)?,
        })
    }
}

impl EncodeSize for Submission {
    fn encode_size(&self) -> usize {
        self.match_id.encode_size() + self.role.encode_size() + self.action.encode_size()
    }
}
