//! Monopoly board and card decks.
//!
//! The board follows the classic US layout. Houses and hotels are not modelled, so each
//! property carries only its base rent.

use serde::Serialize;

use super::MONOPOLY_SPACES;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorGroup {
    Brown,
    LightBlue,
    Pink,
    Orange,
    Red,
    Yellow,
    Green,
    DarkBlue,
}

impl ColorGroup {
    /// Board indices of every property in the group.
    pub fn members(self) -> impl Iterator<Item = u8> {
        BOARD
            .iter()
            .enumerate()
            .filter(move |(_, space)| space.kind == SpaceKind::Property(self))
            .map(|(index, _)| index as u8)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum SpaceKind {
    Go,
    Property(ColorGroup),
    Railroad,
    Utility,
    CommunityChest,
    Chance,
    Tax(i64),
    Jail,
    FreeParking,
    GoToJail,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Space {
    pub name: &'static str,
    pub kind: SpaceKind,
    /// Purchase price; zero for spaces that cannot be owned.
    pub price: i64,
    /// Base rent for properties; railroads and utilities derive rent at runtime.
    pub rent: i64,
}

impl Space {
    pub fn is_ownable(&self) -> bool {
        matches!(
            self.kind,
            SpaceKind::Property(_) | SpaceKind::Railroad | SpaceKind::Utility
        )
    }
}

const fn space(name: &'static str, kind: SpaceKind) -> Space {
    Space {
        name,
        kind,
        price: 0,
        rent: 0,
    }
}

const fn property(name: &'static str, group: ColorGroup, price: i64, rent: i64) -> Space {
    Space {
        name,
        kind: SpaceKind::Property(group),
        price,
        rent,
    }
}

const fn railroad(name: &'static str) -> Space {
    Space {
        name,
        kind: SpaceKind::Railroad,
        price: 200,
        rent: 25,
    }
}

const fn utility(name: &'static str) -> Space {
    Space {
        name,
        kind: SpaceKind::Utility,
        price: 150,
        rent: 0,
    }
}

pub static BOARD: [Space; MONOPOLY_SPACES] = [
    space("GO", SpaceKind::Go),
    property("Mediterranean Avenue", ColorGroup::Brown, 60, 2),
    space("Community Chest", SpaceKind::CommunityChest),
    property("Baltic Avenue", ColorGroup::Brown, 60, 4),
    space("Income Tax", SpaceKind::Tax(200)),
    railroad("Reading Railroad"),
    property("Oriental Avenue", ColorGroup::LightBlue, 100, 6),
    space("Chance", SpaceKind::Chance),
    property("Vermont Avenue", ColorGroup::LightBlue, 100, 6),
    property("Connecticut Avenue", ColorGroup::LightBlue, 120, 8),
    space("Jail", SpaceKind::Jail),
    property("St. Charles Place", ColorGroup::Pink, 140, 10),
    utility("Electric Company"),
    property("States Avenue", ColorGroup::Pink, 140, 10),
    property("Virginia Avenue", ColorGroup::Pink, 160, 12),
    railroad("Pennsylvania Railroad"),
    property("St. James Place", ColorGroup::Orange, 180, 14),
    space("Community Chest", SpaceKind::CommunityChest),
    property("Tennessee Avenue", ColorGroup::Orange, 180, 14),
    property("New York Avenue", ColorGroup::Orange, 200, 16),
    space("Free Parking", SpaceKind::FreeParking),
    property("Kentucky Avenue", ColorGroup::Red, 220, 18),
    space("Chance", SpaceKind::Chance),
    property("Indiana Avenue", ColorGroup::Red, 220, 18),
    property("Illinois Avenue", ColorGroup::Red, 240, 20),
    railroad("B&O Railroad"),
    property("Atlantic Avenue", ColorGroup::Yellow, 260, 22),
    property("Ventnor Avenue", ColorGroup::Yellow, 260, 22),
    utility("Water Works"),
    property("Marvin Gardens", ColorGroup::Yellow, 280, 24),
    space("Go To Jail", SpaceKind::GoToJail),
    property("Pacific Avenue", ColorGroup::Green, 300, 26),
    property("North Carolina Avenue", ColorGroup::Green, 300, 26),
    space("Community Chest", SpaceKind::CommunityChest),
    property("Pennsylvania Avenue", ColorGroup::Green, 320, 28),
    railroad("Short Line"),
    space("Chance", SpaceKind::Chance),
    property("Park Place", ColorGroup::DarkBlue, 350, 35),
    space("Luxury Tax", SpaceKind::Tax(100)),
    property("Boardwalk", ColorGroup::DarkBlue, 400, 50),
];

/// Returns the space at a board index, wrapping past the end.
pub fn board_space(index: u8) -> &'static Space {
    &BOARD[index as usize % MONOPOLY_SPACES]
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum CardEffect {
    /// Bank pays the drawer.
    Collect(i64),
    /// Drawer pays the bank.
    Pay(i64),
    /// Opponent pays the drawer.
    CollectFromOpponent(i64),
    /// Move forward to a space, collecting GO salary when passing it.
    AdvanceTo(u8),
    /// Move backwards without passing GO.
    MoveBack(u8),
    GoToJail,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DeckCard {
    pub text: &'static str,
    pub effect: CardEffect,
}

const fn card(text: &'static str, effect: CardEffect) -> DeckCard {
    DeckCard { text, effect }
}

pub const CHANCE_CARDS: [DeckCard; 10] = [
    card("Advance to GO. Collect $200.", CardEffect::AdvanceTo(0)),
    card("Advance to Illinois Avenue.", CardEffect::AdvanceTo(24)),
    card("Advance to St. Charles Place.", CardEffect::AdvanceTo(11)),
    card("Take a trip to Reading Railroad.", CardEffect::AdvanceTo(5)),
    card("Advance to Boardwalk.", CardEffect::AdvanceTo(39)),
    card("Bank pays you a dividend of $50.", CardEffect::Collect(50)),
    card("Go back 3 spaces.", CardEffect::MoveBack(3)),
    card("Go directly to Jail.", CardEffect::GoToJail),
    card("Speeding fine. Pay $15.", CardEffect::Pay(15)),
    card("Your building loan matures. Collect $150.", CardEffect::Collect(150)),
];

pub const COMMUNITY_CHEST_CARDS: [DeckCard; 10] = [
    card("Advance to GO. Collect $200.", CardEffect::AdvanceTo(0)),
    card("Bank error in your favor. Collect $200.", CardEffect::Collect(200)),
    card("Doctor's fee. Pay $50.", CardEffect::Pay(50)),
    card("From sale of stock you get $50.", CardEffect::Collect(50)),
    card("Go directly to Jail.", CardEffect::GoToJail),
    card("Holiday fund matures. Collect $100.", CardEffect::Collect(100)),
    card(
        "It is your birthday. Collect $10 from your opponent.",
        CardEffect::CollectFromOpponent(10),
    ),
    card("Hospital fees. Pay $100.", CardEffect::Pay(100)),
    card("School fees. Pay $50.", CardEffect::Pay(50)),
    card("You inherit $100.", CardEffect::Collect(100)),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_layout() {
        assert_eq!(BOARD[0].kind, SpaceKind::Go);
        assert_eq!(BOARD[10].kind, SpaceKind::Jail);
        assert_eq!(BOARD[30].kind, SpaceKind::GoToJail);
        assert_eq!(BOARD[39].name, "Boardwalk");
        assert_eq!(board_space(43).name, "Baltic Avenue");

        let railroads: Vec<_> = BOARD
            .iter()
            .filter(|s| s.kind == SpaceKind::Railroad)
            .collect();
        assert_eq!(railroads.len(), 4);
        assert_eq!(
            BOARD.iter().filter(|s| s.kind == SpaceKind::Utility).count(),
            2
        );
    }

    #[test]
    fn groups_have_expected_sizes() {
        assert_eq!(ColorGroup::Brown.members().count(), 2);
        assert_eq!(ColorGroup::DarkBlue.members().collect::<Vec<_>>(), vec![37, 39]);
        assert_eq!(ColorGroup::Orange.members().count(), 3);
    }

    #[test]
    fn card_targets_are_on_board() {
        for deck_card in CHANCE_CARDS.iter().chain(COMMUNITY_CHEST_CARDS.iter()) {
            if let CardEffect::AdvanceTo(target) = deck_card.effect {
                assert!((target as usize) < MONOPOLY_SPACES);
            }
        }
    }
}
