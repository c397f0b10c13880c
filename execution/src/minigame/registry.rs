//! Game registry for managing available games and their configurations.
//!
//! The registry provides:
//! - Centralized listing of supported games
//! - Per-game rule configuration with defaults
//! - Active/inactive game filtering
//! - Metadata for lobby display (names, descriptions, turn budgets)

use pengu_types::minigame::{
    GameType, DEFAULT_TURN_MS, MONOPOLY_GO_SALARY, MONOPOLY_JAIL_BAIL, MONOPOLY_STARTING_MONEY,
    UNO_STARTING_HAND,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-game configuration values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum GameConfig {
    TicTacToe(TicTacToeConfig),
    Connect4(Connect4Config),
    Uno(UnoConfig),
    Monopoly(MonopolyConfig),
    Blackjack(BlackjackConfig),
    Battleship(BattleshipConfig),
}

impl GameConfig {
    /// Create a default configuration for a game type.
    pub fn default_for(game_type: GameType) -> Self {
        match game_type {
            GameType::TicTacToe => Self::TicTacToe(TicTacToeConfig::default()),
            GameType::Connect4 => Self::Connect4(Connect4Config::default()),
            GameType::Uno => Self::Uno(UnoConfig::default()),
            GameType::Monopoly => Self::Monopoly(MonopolyConfig::default()),
            GameType::Blackjack => Self::Blackjack(BlackjackConfig::default()),
            GameType::Battleship => Self::Battleship(BattleshipConfig::default()),
        }
    }

    /// Get the game type for this configuration.
    pub fn game_type(&self) -> GameType {
        match self {
            Self::TicTacToe(_) => GameType::TicTacToe,
            Self::Connect4(_) => GameType::Connect4,
            Self::Uno(_) => GameType::Uno,
            Self::Monopoly(_) => GameType::Monopoly,
            Self::Blackjack(_) => GameType::Blackjack,
            Self::Battleship(_) => GameType::Battleship,
        }
    }

    /// Reject configurations an engine cannot start from.
    pub fn validate(&self) -> Result<(), &'static str> {
        match self {
            Self::TicTacToe(_) | Self::Connect4(_) => Ok(()),
            Self::Uno(c) if c.starting_hand == 0 || c.starting_hand > MAX_UNO_STARTING_HAND => {
                Err("starting_hand must be between 1 and 20")
            }
            Self::Monopoly(c) if c.starting_money <= 0 => Err("starting_money must be positive"),
            Self::Monopoly(c) if c.go_salary < 0 || c.jail_bail < 0 => {
                Err("go_salary and jail_bail must not be negative")
            }
            Self::Blackjack(c) if c.decks == 0 || c.decks > MAX_BLACKJACK_DECKS => {
                Err("decks must be between 1 and 8")
            }
            Self::Battleship(c) if c.placement_attempts == 0 => {
                Err("placement_attempts must be greater than zero")
            }
            _ => Ok(()),
        }
    }
}

/// Two hands of 20 still leave a draw pile in a 108 card deck.
const MAX_UNO_STARTING_HAND: u8 = 20;
const MAX_BLACKJACK_DECKS: u8 = 8;

// ============================================================================
// Per-game configuration structs
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicTacToeConfig {}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connect4Config {}

/// UNO configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnoConfig {
    /// Cards dealt to each hand.
    pub starting_hand: u8,
}

impl Default for UnoConfig {
    fn default() -> Self {
        Self {
            starting_hand: UNO_STARTING_HAND as u8,
        }
    }
}

/// Monopoly configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonopolyConfig {
    pub starting_money: i64,
    pub go_salary: i64,
    pub jail_bail: i64,
}

impl Default for MonopolyConfig {
    fn default() -> Self {
        Self {
            starting_money: MONOPOLY_STARTING_MONEY,
            go_salary: MONOPOLY_GO_SALARY,
            jail_bail: MONOPOLY_JAIL_BAIL,
        }
    }
}

/// Blackjack configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlackjackConfig {
    /// Number of decks in the shoe.
    pub decks: u8,
    /// Whether the dealer hits soft 17 (H17) or stands (S17).
    pub dealer_hits_soft_17: bool,
}

impl Default for BlackjackConfig {
    fn default() -> Self {
        Self {
            decks: 1,
            dealer_hits_soft_17: false,
        }
    }
}

/// Battleship configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleshipConfig {
    /// Random placement attempts per ship before falling back to an ordered scan.
    pub placement_attempts: u16,
}

impl Default for BattleshipConfig {
    fn default() -> Self {
        Self {
            placement_attempts: 100,
        }
    }
}

/// Metadata about a game for lobby display.
#[derive(Clone, Debug)]
pub struct GameInfo {
    pub game_type: GameType,
    pub name: &'static str,
    pub description: &'static str,
    /// Time each seat has to act before the timeout policy kicks in.
    pub turn_ms: u64,
    /// Whether a seat may be played by the built-in AI.
    pub computer_opponent: bool,
    pub active: bool,
}

impl GameInfo {
    const fn new(
        game_type: GameType,
        name: &'static str,
        description: &'static str,
        turn_ms: u64,
    ) -> Self {
        Self {
            game_type,
            name,
            description,
            turn_ms,
            computer_opponent: matches!(game_type, GameType::Battleship),
            active: true,
        }
    }
}

/// Registry of available games.
#[derive(Clone, Debug)]
pub struct GameRegistry {
    configs: HashMap<GameType, GameConfig>,
    active: HashMap<GameType, bool>,
}

impl Default for GameRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GameRegistry {
    /// Create a new registry with all games using default configurations.
    pub fn new() -> Self {
        let mut configs = HashMap::new();
        let mut active = HashMap::new();

        for game_type in GameType::ALL {
            configs.insert(game_type, GameConfig::default_for(game_type));
            active.insert(game_type, true);
        }

        Self { configs, active }
    }

    /// Get static metadata for a game type.
    pub fn get_info(game_type: GameType) -> GameInfo {
        match game_type {
            GameType::TicTacToe => GameInfo::new(
                GameType::TicTacToe,
                "Tic-Tac-Toe",
                "Three in a row on a 3x3 grid.",
                15_000,
            ),
            GameType::Connect4 => GameInfo::new(
                GameType::Connect4,
                "Connect 4",
                "Drop discs and line up four.",
                20_000,
            ),
            GameType::Uno => GameInfo::new(
                GameType::Uno,
                "UNO",
                "Match colour or value and empty your hand first.",
                DEFAULT_TURN_MS,
            ),
            GameType::Monopoly => GameInfo::new(
                GameType::Monopoly,
                "Monopoly",
                "Buy property, collect rent, bankrupt your opponent.",
                45_000,
            ),
            GameType::Blackjack => GameInfo::new(
                GameType::Blackjack,
                "Blackjack",
                "Both seats play the dealer; the better hand takes the pot.",
                DEFAULT_TURN_MS,
            ),
            GameType::Battleship => GameInfo::new(
                GameType::Battleship,
                "Battleship",
                "Hunt down the enemy fleet on a 10x10 grid.",
                DEFAULT_TURN_MS,
            ),
        }
    }

    pub fn is_active(&self, game_type: GameType) -> bool {
        self.active.get(&game_type).copied().unwrap_or(false)
    }

    pub fn set_active(&mut self, game_type: GameType, active: bool) {
        self.active.insert(game_type, active);
    }

    pub fn active_games(&self) -> Vec<GameType> {
        GameType::ALL
            .into_iter()
            .filter(|gt| self.is_active(*gt))
            .collect()
    }

    pub fn get_config(&self, game_type: GameType) -> Option<&GameConfig> {
        self.configs.get(&game_type)
    }

    /// Replace the configuration for the config's game.
    pub fn set_config(&mut self, config: GameConfig) {
        let game_type = config.game_type();
        self.configs.insert(game_type, config);
    }

    /// Get all game info with current active status.
    pub fn all_games_info(&self) -> Vec<GameInfo> {
        GameType::ALL
            .into_iter()
            .map(|gt| {
                let mut info = Self::get_info(gt);
                info.active = self.is_active(gt);
                info
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_default() {
        let registry = GameRegistry::default();

        for game_type in GameType::ALL {
            assert!(registry.is_active(game_type), "{game_type:?} should be active");
            assert_eq!(
                registry.get_config(game_type).map(GameConfig::game_type),
                Some(game_type)
            );
        }
    }

    #[test]
    fn test_set_active() {
        let mut registry = GameRegistry::new();

        registry.set_active(GameType::Monopoly, false);
        assert!(!registry.is_active(GameType::Monopoly));
        assert_eq!(registry.active_games().len(), 5);
        assert!(!registry
            .all_games_info()
            .iter()
            .any(|info| info.game_type == GameType::Monopoly && info.active));
    }

    #[test]
    fn test_only_battleship_has_ai() {
        for game_type in GameType::ALL {
            assert_eq!(
                GameRegistry::get_info(game_type).computer_opponent,
                game_type.allows_computer_opponent()
            );
        }
    }

    #[test]
    fn test_config_validate() {
        for game_type in GameType::ALL {
            assert!(GameConfig::default_for(game_type).validate().is_ok());
        }
        let bad = [
            GameConfig::Uno(UnoConfig { starting_hand: 0 }),
            GameConfig::Blackjack(BlackjackConfig {
                decks: 9,
                dealer_hits_soft_17: true,
            }),
            GameConfig::Monopoly(MonopolyConfig {
                starting_money: 0,
                ..MonopolyConfig::default()
            }),
            GameConfig::Battleship(BattleshipConfig {
                placement_attempts: 0,
            }),
        ];
        for config in bad {
            assert!(config.validate().is_err(), "{config:?}");
        }
    }

    #[test]
    fn test_config_from_json_uses_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{"game":"blackjack","decks":6}"#).unwrap();
        assert_eq!(
            config,
            GameConfig::Blackjack(BlackjackConfig {
                decks: 6,
                dealer_hits_soft_17: false,
            })
        );
    }
}
