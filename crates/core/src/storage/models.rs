//! Database models

use serde::{Deserialize, Serialize};

/// A game the bot has played or is playing, as last seen from the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: i64,
    pub game_id: String,
    pub opponent: String,
    pub opponent_rating: Option<u32>,
    pub speed: String,
    pub rated: bool,
    pub last_fen: String,
    pub moves_played: u32,
    pub started_at: u64,
    pub updated_at: u64,
}

/// One remotely-set override row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSetting {
    pub name: String,
    pub value: f64,
    pub updated_at: u64,
}
