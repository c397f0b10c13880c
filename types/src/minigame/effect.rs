//! Declarative effects emitted alongside accepted actions.
//!
//! Effects exist for presentation only (animations, sounds, log lines). Engine state never
//! depends on them.

use serde::{Deserialize, Serialize};

use super::{Outcome, Role, UnoCard, UnoColor};

/// A blackjack seat's result against the dealer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandResult {
    Blackjack,
    Win,
    Lose,
    Push,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardDeckKind {
    Chance,
    CommunityChest,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    // Tic-Tac-Toe / Connect-4
    MarkPlaced {
        role: Role,
        index: u8,
    },
    DiscDropped {
        role: Role,
        column: u8,
        row: u8,
    },

    // UNO
    UnoHandsDealt {
        cards_each: u8,
        top: UnoCard,
    },
    UnoCardPlayed {
        role: Role,
        card: UnoCard,
    },
    UnoCardsDrawn {
        role: Role,
        count: u8,
    },
    DiscardReshuffled {
        cards: u8,
    },
    ColorChosen {
        role: Role,
        color: UnoColor,
    },
    TurnSkipped {
        role: Role,
    },
    UnoCalled {
        role: Role,
    },
    TurnPassed {
        role: Role,
    },

    // Blackjack
    /// `role == None` is the dealer; a hidden hole card is reported with `card == None`.
    CardDealt {
        role: Option<Role>,
        card: Option<u8>,
    },
    Stood {
        role: Role,
        total: u8,
    },
    Busted {
        role: Role,
        total: u8,
    },
    DealerRevealed {
        cards: Vec<u8>,
        total: u8,
    },
    HandResolved {
        role: Role,
        result: HandResult,
        total: u8,
    },

    // Monopoly
    DiceRolled {
        role: Role,
        dice: [u8; 2],
    },
    TokenMoved {
        role: Role,
        from: u8,
        to: u8,
    },
    GoSalary {
        role: Role,
        amount: i64,
    },
    PropertyBought {
        role: Role,
        space: u8,
        price: i64,
    },
    PurchaseDeclined {
        role: Role,
        space: u8,
    },
    RentPaid {
        payer: Role,
        space: u8,
        amount: i64,
    },
    TaxPaid {
        role: Role,
        amount: i64,
    },
    CardDrawn {
        role: Role,
        deck: CardDeckKind,
        text: String,
    },
    MoneyChanged {
        role: Role,
        delta: i64,
    },
    SentToJail {
        role: Role,
    },
    LeftJail {
        role: Role,
        paid_bail: bool,
    },
    Bankrupt {
        role: Role,
    },
    TurnEnded {
        role: Role,
    },

    // Battleship
    FleetPlaced {
        role: Role,
    },
    SeatReady {
        role: Role,
    },
    ShotResolved {
        role: Role,
        cell: u8,
        hit: bool,
        sunk: Option<String>,
    },

    // Session
    TimedOut {
        role: Role,
    },
    Forfeited {
        role: Role,
    },
    MatchEnded {
        outcome: Outcome,
    },
}
