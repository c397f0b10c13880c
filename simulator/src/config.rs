//! Arcade host configuration.
//!
//! Loaded from YAML; every field has a default so an empty file is a valid config.
//!
//! ```yaml
//! seed_phrase: "local arcade"
//! tick_ms: 250
//! max_consecutive_timeouts: 2
//! turn_ms_overrides:
//!   monopoly: 60000
//! disabled_games: [uno]
//! games:
//!   - game: blackjack
//!     decks: 6
//! ```

use pengu_execution::{GameConfig, GameRegistry, TurnConfig};
use pengu_types::minigame::{GameType, DEFAULT_MAX_CONSECUTIVE_TIMEOUTS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

const DEFAULT_SEED_PHRASE: &str = "pengu-arcade";
const DEFAULT_TICK_MS: u64 = 250;
const DEFAULT_INBOUND_BUFFER: usize = 256;
const DEFAULT_OUTBOUND_BUFFER: usize = 1024;
const DEFAULT_MAX_ACTIVE_MATCHES: usize = 10_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config file")]
    Parse(#[from] serde_yaml::Error),
    #[error("seed_phrase must not be empty")]
    EmptySeedPhrase,
    #[error("{field} must be > 0 (got {value})")]
    InvalidNonZero { field: &'static str, value: u64 },
    #[error("invalid turn config: {0}")]
    InvalidTurn(&'static str),
    #[error("invalid {game} config: {reason}")]
    InvalidGame { game: GameType, reason: &'static str },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcadeConfig {
    /// Phrase the per-match seed chain is derived from.
    pub seed_phrase: String,
    /// Interval between timeout sweeps.
    pub tick_ms: u64,
    pub inbound_buffer: usize,
    pub outbound_buffer: usize,
    pub max_active_matches: usize,
    /// Turn length for every game without an override. Unset uses each game's own budget.
    pub turn_ms: Option<u64>,
    pub max_consecutive_timeouts: u8,
    pub turn_ms_overrides: BTreeMap<GameType, u64>,
    pub disabled_games: Vec<GameType>,
    /// Engine rule overrides, at most one per game.
    pub games: Vec<GameConfig>,
}

impl Default for ArcadeConfig {
    fn default() -> Self {
        Self {
            seed_phrase: DEFAULT_SEED_PHRASE.to_string(),
            tick_ms: DEFAULT_TICK_MS,
            inbound_buffer: DEFAULT_INBOUND_BUFFER,
            outbound_buffer: DEFAULT_OUTBOUND_BUFFER,
            max_active_matches: DEFAULT_MAX_ACTIVE_MATCHES,
            turn_ms: None,
            max_consecutive_timeouts: DEFAULT_MAX_CONSECUTIVE_TIMEOUTS,
            turn_ms_overrides: BTreeMap::new(),
            disabled_games: Vec::new(),
            games: Vec::new(),
        }
    }
}

impl ArcadeConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = if contents.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(contents)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.seed_phrase.trim().is_empty() {
            return Err(ConfigError::EmptySeedPhrase);
        }
        for (field, value) in [
            ("tick_ms", self.tick_ms),
            ("inbound_buffer", self.inbound_buffer as u64),
            ("outbound_buffer", self.outbound_buffer as u64),
            ("max_active_matches", self.max_active_matches as u64),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidNonZero { field, value });
            }
        }
        for game_type in GameType::ALL {
            self.turn_for(game_type)
                .validate()
                .map_err(ConfigError::InvalidTurn)?;
        }
        for game in &self.games {
            game.validate().map_err(|reason| ConfigError::InvalidGame {
                game: game.game_type(),
                reason,
            })?;
        }
        Ok(())
    }

    /// Turn timing for a game: its override, then `turn_ms`, then the game's registry budget.
    pub fn turn_for(&self, game_type: GameType) -> TurnConfig {
        let turn_ms = self
            .turn_ms_overrides
            .get(&game_type)
            .copied()
            .or(self.turn_ms)
            .unwrap_or_else(|| TurnConfig::for_game(game_type).turn_ms);
        TurnConfig::new(turn_ms, self.max_consecutive_timeouts)
    }

    /// Builds the game registry with overrides and disabled games applied.
    pub fn registry(&self) -> GameRegistry {
        let mut registry = GameRegistry::new();
        for game in &self.games {
            registry.set_config(game.clone());
        }
        for game_type in &self.disabled_games {
            registry.set_active(*game_type, false);
        }
        registry
    }
}
