//! SQLite persistence: the shared settings store and the game log

pub mod db;
pub mod models;

pub use db::Database;
pub use models::{GameRecord, StoredSetting};
