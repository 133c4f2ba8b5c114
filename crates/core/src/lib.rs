//! Zoe Bot Core Library
//!
//! Orchestration for a Lichess bot account. The chess itself is delegated:
//! shakmaty tracks board state and legality, an external UCI engine searches
//! for moves. What this crate owns is the policy deciding how hard that engine
//! is allowed to try against a given opponent, plus the plumbing connecting
//! Lichess, the engine, the settings store and the Telegram remote control.

pub mod board;
pub mod book;
pub mod config;
pub mod engine;
pub mod error;
pub mod lichess;
pub mod storage;
pub mod telegram;

pub use book::OpeningBook;
pub use config::BotConfig;
pub use engine::{EngineOptions, Evaluation, UciEngine};
pub use error::{Error, Result};
pub use lichess::LichessClient;
pub use storage::Database;
pub use telegram::TelegramClient;
