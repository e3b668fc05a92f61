//! Rule constants and the per-game configuration.
//!
//! The constants below are fixed by the rule set. `GameConfig` carries the few
//! knobs a driver may choose per game and can be read from a JSON document:
//!
//! ```json
//! { "player_count": 3, "winning_score": 7, "seed": 42 }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::lattice::Point;

/// Lowest coordinate on either axis
pub const MIN_COORDINATE: i32 = 0;
/// Highest x coordinate of the standard board
pub const MAX_X_COORDINATE: i32 = 14;
/// Highest y coordinate of the standard board
pub const MAX_Y_COORDINATE: i32 = 22;

/// Units of every resource the bank starts with
pub const INITIAL_RESOURCE_CARDS_BANK: u32 = 19;
/// A hand larger than this loses half when the thief is rolled
pub const MAX_CARDS_IN_HAND_NO_DROP: u32 = 7;
/// Units given in a bank trade
pub const FOUR_TO_ONE_TRADE_OFFER: u32 = 4;
/// Units received in a bank trade
pub const FOUR_TO_ONE_TRADE_WANT: u32 = 1;
/// Dice total that activates the thief
pub const THIEF_DICE_NUMBER: u8 = 7;

pub const MIN_NUMBER_OF_PLAYERS: u8 = 2;
pub const MAX_NUMBER_OF_PLAYERS: u8 = 4;
pub const DEFAULT_WINNING_SCORE: u32 = 7;

/// The desert, where the thief starts
pub const INITIAL_THIEF_POSITION: Point = Point::new(7, 11);

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse JSON content.
    #[error("failed to parse config JSON: {source}")]
    Json { source: serde_json::Error },

    #[error("player count must be between 2 and 4, got {0}")]
    InvalidPlayerCount(u8),

    #[error("winning score must be positive")]
    InvalidWinningScore(u32),
}

impl From<serde_json::Error> for ConfigError {
    fn from(source: serde_json::Error) -> Self {
        Self::Json { source }
    }
}

/// Settings chosen per game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of players, 2 to 4
    #[serde(default = "default_player_count")]
    pub player_count: u8,

    /// Score the current player must reach to win
    #[serde(default = "default_winning_score")]
    pub winning_score: u32,

    /// Seed for the engine's random source; entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_count: default_player_count(),
            winning_score: default_winning_score(),
            seed: None,
        }
    }
}

impl GameConfig {
    /// Config for `player_count` players with default rules
    pub fn new(player_count: u8) -> Self {
        Self {
            player_count,
            ..Self::default()
        }
    }

    /// Builder-style seed setter
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder-style winning score setter
    pub fn with_winning_score(mut self, winning_score: u32) -> Self {
        self.winning_score = winning_score;
        self
    }

    /// Load and validate configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Json`] if the content is not valid JSON, or a validation
    /// error from [`GameConfig::validate`].
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a JSON string.
    pub fn parse(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the player count and winning score
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_NUMBER_OF_PLAYERS..=MAX_NUMBER_OF_PLAYERS).contains(&self.player_count) {
            return Err(ConfigError::InvalidPlayerCount(self.player_count));
        }
        if self.winning_score == 0 {
            return Err(ConfigError::InvalidWinningScore(self.winning_score));
        }
        Ok(())
    }
}

const fn default_player_count() -> u8 {
    MIN_NUMBER_OF_PLAYERS
}

const fn default_winning_score() -> u32 {
    DEFAULT_WINNING_SCORE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.player_count, 2);
        assert_eq!(config.winning_score, 7);
        assert_eq!(config.seed, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_document() {
        let config = GameConfig::parse(r#"{ "player_count": 3, "seed": 42 }"#).unwrap();
        assert_eq!(config, GameConfig::new(3).with_seed(42));
    }

    #[test]
    fn test_parse_empty_object_uses_defaults() {
        assert_eq!(GameConfig::parse("{}").unwrap(), GameConfig::default());
    }

    #[test]
    fn test_parse_rejects_bad_player_count() {
        for count in [0, 1, 5] {
            let json = format!(r#"{{ "player_count": {count} }}"#);
            assert!(matches!(
                GameConfig::parse(&json),
                Err(ConfigError::InvalidPlayerCount(n)) if n == count
            ));
        }
    }

    #[test]
    fn test_parse_rejects_zero_winning_score() {
        assert!(matches!(
            GameConfig::parse(r#"{ "winning_score": 0 }"#),
            Err(ConfigError::InvalidWinningScore(0))
        ));
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        assert!(matches!(GameConfig::parse("{ player_count"), Err(ConfigError::Json { .. })));
    }

    #[test]
    fn test_from_missing_file() {
        let result = GameConfig::from_file(Path::new("/nonexistent/siedler.json"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
