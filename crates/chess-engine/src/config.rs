//! Game configuration loaded from TOML.
//!
//! ```toml
//! start_fen = "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1"
//! move_format = "uci"
//! human_side = "white"
//! ```

use chess_core::{Color, Fen, FenError, MoveFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when loading a game configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// The configured start position is not a valid FEN.
    #[error("Invalid start position: {0}")]
    InvalidFen(#[from] FenError),
}

/// Settings a [`Game`](crate::Game) is created with.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GameConfig {
    /// Position the game starts from and resets to.
    pub start_fen: String,
    /// Move text format used by `load_game` and `write_game`.
    pub move_format: MoveFormat,
    /// Side played by the local user, if any.
    pub human_side: Option<Color>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            start_fen: Fen::STARTPOS.to_string(),
            move_format: MoveFormat::San,
            human_side: None,
        }
    }
}

impl GameConfig {
    /// Parses a configuration from TOML text. Missing keys take their
    /// defaults; the start FEN is validated.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(content)?;
        Fen::parse(&config.start_fen)?;
        Ok(config)
    }

    /// Reads and parses a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Serializes the configuration back to TOML.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = GameConfig::from_toml_str("").unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.start_fen, Fen::STARTPOS);
        assert_eq!(config.move_format, MoveFormat::San);
        assert_eq!(config.human_side, None);
    }

    #[test]
    fn parse_full_config() {
        let content = r#"
start_fen = "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1"
move_format = "uci"
human_side = "black"
"#;
        let config = GameConfig::from_toml_str(content).unwrap();
        assert_eq!(config.start_fen, "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1");
        assert_eq!(config.move_format, MoveFormat::Uci);
        assert_eq!(config.human_side, Some(Color::Black));
    }

    #[test]
    fn invalid_fen_is_rejected() {
        let result = GameConfig::from_toml_str(r#"start_fen = "not a fen""#);
        assert!(matches!(result, Err(ConfigError::InvalidFen(_))));
    }

    #[test]
    fn invalid_toml_is_rejected() {
        let result = GameConfig::from_toml_str("move_format = [");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
        let result = GameConfig::from_toml_str(r#"move_format = "pgn""#);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn toml_roundtrip() {
        let config = GameConfig {
            start_fen: "8/8/8/4k3/8/8/4K3/8 w - - 0 1".to_string(),
            move_format: MoveFormat::An,
            human_side: Some(Color::White),
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(GameConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn missing_file_is_read_error() {
        let result = GameConfig::load("/nonexistent/game.toml");
        assert!(matches!(result, Err(ConfigError::ReadError(_))));
    }
}
