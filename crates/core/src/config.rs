//! Bot configuration loaded from a TOML file

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Lichess API token with the bot scopes.
    pub lichess_token: String,
    /// Telegram bot token.
    pub telegram_token: String,
    /// Telegram chat id of the owner. Commands from anyone else are ignored.
    pub telegram_owner_id: i64,
    /// Path to the UCI engine binary.
    #[serde(default = "default_engine_path")]
    pub engine_path: String,
    /// Opening book CSV (`Fen,Move` rows), optional.
    #[serde(default)]
    pub book_path: Option<PathBuf>,
    /// SQLite database holding overrides and the game log.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

fn default_engine_path() -> String {
    "stockfish".to_string()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("zoe.db")
}

impl BotConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(&path)?;
        toml::from_str(&text).map_err(|e| Error::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config() {
        let config: BotConfig = toml::from_str(
            r#"
            lichess_token = "lip_abc"
            telegram_token = "123:xyz"
            telegram_owner_id = 42
            "#,
        )
        .unwrap();

        assert_eq!(config.lichess_token, "lip_abc");
        assert_eq!(config.telegram_owner_id, 42);
        assert_eq!(config.engine_path, "stockfish");
        assert_eq!(config.db_path, PathBuf::from("zoe.db"));
        assert!(config.book_path.is_none());
    }

    #[test]
    fn parses_full_config() {
        let config: BotConfig = toml::from_str(
            r#"
            lichess_token = "lip_abc"
            telegram_token = "123:xyz"
            telegram_owner_id = 42
            engine_path = "/usr/games/stockfish"
            book_path = "book/kings_gambit.csv"
            db_path = "/var/lib/zoe/zoe.db"
            "#,
        )
        .unwrap();

        assert_eq!(config.engine_path, "/usr/games/stockfish");
        assert_eq!(config.book_path, Some(PathBuf::from("book/kings_gambit.csv")));
    }

    #[test]
    fn missing_token_is_an_error() {
        let result: std::result::Result<BotConfig, _> =
            toml::from_str("telegram_token = \"123:xyz\"\ntelegram_owner_id = 42");
        assert!(result.is_err());
    }
}
