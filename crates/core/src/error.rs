//! Error types for zoe-core

use thiserror::Error;

use crate::engine::EngineError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Lichess API error: {0}")]
    Lichess(String),

    #[error("Telegram API error: {0}")]
    Telegram(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Chess error: {0}")]
    Chess(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Background task failed: {0}")]
    Task(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True when the failure looks like a Lichess rate limit, which warrants
    /// a longer pause before the next poll.
    pub fn is_rate_limit(&self) -> bool {
        match self {
            Error::Lichess(msg) => msg.contains("429"),
            Error::Http(e) => e.status().map_or(false, |s| s.as_u16() == 429),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
