//! UNO deck definitions.
//!
//! Every physical card has a stable id in `0..108`, so duplicates stay distinguishable on the
//! wire. Ids `25 * c .. 25 * c + 25` belong to colour `c` (one 0, two each of 1-9, two Skip,
//! two Reverse, two +2); ids `100..104` are Wild and `104..108` are Wild +4.

use bytes::{Buf, BufMut};
use commonware_codec::{Error, FixedSize, Read, ReadExt, Write};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::codec::read_index;

/// Cards in a standard UNO deck.
pub const UNO_DECK_SIZE: usize = 108;

const CARDS_PER_COLOR: u8 = 25;
const FIRST_WILD: u8 = 100;
const FIRST_WILD_DRAW_FOUR: u8 = 104;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum UnoColor {
    Red = 0,
    Yellow = 1,
    Green = 2,
    Blue = 3,
}

impl UnoColor {
    pub const ALL: [UnoColor; 4] = [
        UnoColor::Red,
        UnoColor::Yellow,
        UnoColor::Green,
        UnoColor::Blue,
    ];

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }
}

impl fmt::Display for UnoColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnoColor::Red => "red",
            UnoColor::Yellow => "yellow",
            UnoColor::Green => "green",
            UnoColor::Blue => "blue",
        };
        f.write_str(name)
    }
}

impl Write for UnoColor {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for UnoColor {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = u8::read(reader)?;
        Self::from_index(value).ok_or(Error::InvalidEnum(value))
    }
}

impl FixedSize for UnoColor {
    const SIZE: usize = 1;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "number")]
pub enum UnoValue {
    Number(u8),
    Skip,
    Reverse,
    DrawTwo,
    Wild,
    WildDrawFour,
}

impl UnoValue {
    pub fn is_wild(&self) -> bool {
        matches!(self, UnoValue::Wild | UnoValue::WildDrawFour)
    }

    /// Cards the opponent must draw when this value is played.
    pub fn penalty(&self) -> u8 {
        match self {
            UnoValue::DrawTwo => 2,
            UnoValue::WildDrawFour => 4,
            _ => 0,
        }
    }

    /// Whether the opponent loses their next turn.
    pub fn skips_opponent(&self) -> bool {
        matches!(
            self,
            UnoValue::Skip | UnoValue::Reverse | UnoValue::DrawTwo | UnoValue::WildDrawFour
        )
    }
}

impl fmt::Display for UnoValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnoValue::Number(n) => write!(f, "{n}"),
            UnoValue::Skip => f.write_str("skip"),
            UnoValue::Reverse => f.write_str("reverse"),
            UnoValue::DrawTwo => f.write_str("+2"),
            UnoValue::Wild => f.write_str("wild"),
            UnoValue::WildDrawFour => f.write_str("wild +4"),
        }
    }
}

/// A physical UNO card. Wild cards carry no colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnoCard {
    pub id: u8,
    pub color: Option<UnoColor>,
    pub value: UnoValue,
}

impl UnoCard {
    pub fn from_id(id: u8) -> Option<Self> {
        if id >= UNO_DECK_SIZE as u8 {
            return None;
        }
        if id >= FIRST_WILD_DRAW_FOUR {
            return Some(Self {
                id,
                color: None,
                value: UnoValue::WildDrawFour,
            });
        }
        if id >= FIRST_WILD {
            return Some(Self {
                id,
                color: None,
                value: UnoValue::Wild,
            });
        }
        let color = UnoColor::from_index(id / CARDS_PER_COLOR)?;
        let value = match id % CARDS_PER_COLOR {
            0 => UnoValue::Number(0),
            i @ 1..=18 => UnoValue::Number(1 + (i - 1) / 2),
            19 | 20 => UnoValue::Skip,
            21 | 22 => UnoValue::Reverse,
            _ => UnoValue::DrawTwo,
        };
        Some(Self {
            id,
            color: Some(color),
            value,
        })
    }

    pub fn is_wild(&self) -> bool {
        self.value.is_wild()
    }

    pub fn is_number(&self) -> bool {
        matches!(self.value, UnoValue::Number(_))
    }

    /// Whether this card may be played onto the active colour/value. After a wild the
    /// active value is `None`, so only colour or another wild matches.
    pub fn matches(&self, active_color: UnoColor, active_value: Option<UnoValue>) -> bool {
        if self.is_wild() {
            return true;
        }
        self.color == Some(active_color) || Some(self.value) == active_value
    }
}

impl fmt::Display for UnoCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.color {
            Some(color) => write!(f, "{color} {}", self.value),
            None => write!(f, "{}", self.value),
        }
    }
}

impl Write for UnoCard {
    fn write(&self, writer: &mut impl BufMut) {
        self.id.write(writer);
    }
}

impl Read for UnoCard {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let id = read_index(reader, UNO_DECK_SIZE as u8, "UnoCard")?;
        Self::from_id(id).ok_or(Error::Invalid("UnoCard", "unknown id"))
    }
}

impl FixedSize for UnoCard {
    const SIZE: usize = 1;
}

/// The full 108-card deck in id order (unshuffled).
pub fn standard_uno_deck() -> Vec<UnoCard> {
    (0..UNO_DECK_SIZE as u8).filter_map(UnoCard::from_id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use commonware_codec::{DecodeExt, Encode};

    #[test]
    fn deck_composition() {
        let deck = standard_uno_deck();
        assert_eq!(deck.len(), UNO_DECK_SIZE);

        for color in UnoColor::ALL {
            let of_color: Vec<_> = deck.iter().filter(|c| c.color == Some(color)).collect();
            assert_eq!(of_color.len(), 25);
            let zeros = of_color
                .iter()
                .filter(|c| c.value == UnoValue::Number(0))
                .count();
            assert_eq!(zeros, 1);
            for n in 1..=9 {
                let count = of_color
                    .iter()
                    .filter(|c| c.value == UnoValue::Number(n))
                    .count();
                assert_eq!(count, 2, "{color} {n}");
            }
            for value in [UnoValue::Skip, UnoValue::Reverse, UnoValue::DrawTwo] {
                assert_eq!(of_color.iter().filter(|c| c.value == value).count(), 2);
            }
        }
        assert_eq!(deck.iter().filter(|c| c.value == UnoValue::Wild).count(), 4);
        assert_eq!(
            deck.iter()
                .filter(|c| c.value == UnoValue::WildDrawFour)
                .count(),
            4
        );
    }

    #[test]
    fn matching_rules() {
        let red_seven = UnoCard::from_id(13).unwrap();
        assert_eq!(red_seven.value, UnoValue::Number(7));
        assert!(red_seven.matches(UnoColor::Red, Some(UnoValue::Number(2))));
        assert!(red_seven.matches(UnoColor::Blue, Some(UnoValue::Number(7))));
        assert!(!red_seven.matches(UnoColor::Blue, Some(UnoValue::Number(3))));
        assert!(!red_seven.matches(UnoColor::Blue, None));

        let wild = UnoCard::from_id(100).unwrap();
        assert!(wild.matches(UnoColor::Green, Some(UnoValue::Skip)));
    }

    #[test]
    fn card_codec_rejects_unknown_ids() {
        let card = UnoCard::from_id(107).unwrap();
        let encoded = card.encode();
        assert_eq!(UnoCard::decode(encoded).unwrap(), card);

        let bad: &[u8] = &[108];
        assert!(UnoCard::decode(bad).is_err());
        let bad_color: &[u8] = &[4];
        assert!(matches!(
            UnoColor::decode(bad_color),
            Err(Error::InvalidEnum(4))
        ));
    }
}
