//! Shared playing-card helpers.
//!
//! Cards are encoded as `0..=51`, where:
//! - suit = card / 13 (0..=3)
//! - rank = card % 13 (0..=12), with 0 as the Ace

/// Total cards in a standard deck.
pub const CARDS_PER_DECK: u8 = 52;

/// Ranks per suit.
pub const RANKS_PER_SUIT: u8 = 13;

const RANK_LABELS: [&str; 13] = [
    "A", "2", "3", "4", "5", "6", "7", "8", "9", "10", "J", "Q", "K",
];
const SUIT_LABELS: [char; 4] = ['S', 'H', 'D', 'C'];

/// Returns true if `card` is within `0..CARDS_PER_DECK`.
pub fn is_valid_card(card: u8) -> bool {
    card < CARDS_PER_DECK
}

/// Returns the 0-based rank (0..=12), where 0 is Ace.
pub fn card_rank(card: u8) -> u8 {
    card % RANKS_PER_SUIT
}

/// Returns the suit (0..=3).
pub fn card_suit(card: u8) -> u8 {
    (card % CARDS_PER_DECK) / RANKS_PER_SUIT
}

/// Blackjack pip value: Ace counts 1 here, face cards count 10.
pub fn card_points(card: u8) -> u8 {
    match card_rank(card) {
        0 => 1,
        r @ 1..=9 => r + 1,
        _ => 10,
    }
}

pub fn is_ace(card: u8) -> bool {
    card_rank(card) == 0
}

/// Short label such as `AS` or `10H`.
pub fn card_label(card: u8) -> String {
    let rank = RANK_LABELS[card_rank(card) as usize];
    let suit = SUIT_LABELS[card_suit(card) as usize];
    format!("{rank}{suit}")
}

/// Card id for a rank and suit, both 0-based.
pub fn card_from_parts(rank: u8, suit: u8) -> Option<u8> {
    if rank >= RANKS_PER_SUIT || suit >= 4 {
        return None;
    }
    Some(suit * RANKS_PER_SUIT + rank)
}
