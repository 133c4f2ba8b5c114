//! Database operations
//!
//! The settings table is the mutable state shared between the Telegram task
//! and the game loop: one row per parameter name. A non-positive value is
//! treated as unset, so clearing and "set to 0" behave the same.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::models::{GameRecord, StoredSetting};
use crate::engine::tuning::Overrides;
use crate::error::Result;
use crate::lichess::OngoingGame;

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                name TEXT PRIMARY KEY,
                value REAL NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS games (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                game_id TEXT UNIQUE NOT NULL,
                opponent TEXT NOT NULL,
                opponent_rating INTEGER,
                speed TEXT NOT NULL,
                rated INTEGER NOT NULL,
                last_fen TEXT NOT NULL,
                moves_played INTEGER NOT NULL DEFAULT 0,
                started_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_games_game_id ON games(game_id);
            CREATE INDEX IF NOT EXISTS idx_games_updated_at ON games(updated_at);
            "#,
        )?;
        Ok(())
    }

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    /// Stores an override value under `name`.
    pub fn set_setting(&self, name: &str, value: f64) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO settings (name, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(name) DO UPDATE SET value = ?2, updated_at = ?3
            "#,
            params![name, value, Self::now()],
        )?;
        debug!("setting {name} = {value}");
        Ok(())
    }

    pub fn clear_setting(&self, name: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM settings WHERE name = ?1", params![name])?;
        debug!("setting {name} cleared");
        Ok(())
    }

    /// Returns the override if one is set. Non-positive stored values count
    /// as unset.
    pub fn get_setting(&self, name: &str) -> Result<Option<f64>> {
        let value: Option<f64> = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value.filter(|v| *v > 0.0))
    }

    pub fn all_settings(&self) -> Result<Vec<StoredSetting>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, value, updated_at FROM settings ORDER BY name")?;

        let settings = stmt
            .query_map([], |row| {
                Ok(StoredSetting {
                    name: row.get(0)?,
                    value: row.get(1)?,
                    updated_at: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(settings)
    }

    /// Snapshot of the engine overrides for the tuning policy.
    pub fn overrides(&self) -> Result<Overrides> {
        Ok(Overrides {
            skill: self.get_setting("level")?,
            think_secs: self.get_setting("think")?,
            hash_mb: self.get_setting("hash")?,
            depth: self.get_setting("depth")?,
            threads: self.get_setting("thread")?,
        })
    }

    /// Poll-interval override for the event loop, if set.
    pub fn poll_override(&self) -> Result<Option<f64>> {
        self.get_setting("wait_api")
    }

    /// Inserts or refreshes the log row for a game.
    pub fn upsert_game(&self, game: &OngoingGame, moves_played: u32) -> Result<()> {
        let now = Self::now();
        self.conn.execute(
            r#"
            INSERT INTO games
            (game_id, opponent, opponent_rating, speed, rated, last_fen, moves_played, started_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
            ON CONFLICT(game_id) DO UPDATE SET
                last_fen = ?6, moves_played = ?7, updated_at = ?8
            "#,
            params![
                game.game_id,
                game.opponent.username,
                game.opponent.rating,
                game.speed,
                game.rated,
                game.fen,
                moves_played,
                now,
            ],
        )?;
        Ok(())
    }

    pub fn recent_games(&self, limit: u32) -> Result<Vec<GameRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, game_id, opponent, opponent_rating, speed, rated,
                   last_fen, moves_played, started_at, updated_at
            FROM games ORDER BY updated_at DESC, id DESC LIMIT ?1
            "#,
        )?;

        let games = stmt
            .query_map(params![limit], |row| {
                Ok(GameRecord {
                    id: row.get(0)?,
                    game_id: row.get(1)?,
                    opponent: row.get(2)?,
                    opponent_rating: row.get(3)?,
                    speed: row.get(4)?,
                    rated: row.get(5)?,
                    last_fen: row.get(6)?,
                    moves_played: row.get(7)?,
                    started_at: row.get(8)?,
                    updated_at: row.get(9)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(games)
    }

    pub fn count_games(&self) -> Result<u32> {
        let count: u32 = self
            .conn
            .query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lichess::Opponent;

    fn sample_game(game_id: &str, fen: &str) -> OngoingGame {
        OngoingGame {
            game_id: game_id.to_string(),
            full_id: None,
            color: "white".to_string(),
            fen: fen.to_string(),
            last_move: String::new(),
            is_my_turn: true,
            opponent: Opponent {
                id: Some("bob".to_string()),
                username: "Bob".to_string(),
                rating: Some(1700),
            },
            speed: "rapid".to_string(),
            rated: true,
            seconds_left: Some(600),
        }
    }

    #[test]
    fn settings_round_trip() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get_setting("level").unwrap(), None);

        db.set_setting("level", 12.0).unwrap();
        assert_eq!(db.get_setting("level").unwrap(), Some(12.0));

        db.set_setting("level", 8.0).unwrap();
        assert_eq!(db.get_setting("level").unwrap(), Some(8.0));

        db.clear_setting("level").unwrap();
        assert_eq!(db.get_setting("level").unwrap(), None);
    }

    #[test]
    fn non_positive_values_read_as_unset() {
        let db = Database::open_in_memory().unwrap();
        db.set_setting("think", 0.0).unwrap();
        assert_eq!(db.get_setting("think").unwrap(), None);
        db.set_setting("think", -4.0).unwrap();
        assert_eq!(db.get_setting("think").unwrap(), None);
    }

    #[test]
    fn overrides_snapshot() {
        let db = Database::open_in_memory().unwrap();
        db.set_setting("level", 10.0).unwrap();
        db.set_setting("hash", 256.0).unwrap();

        let overrides = db.overrides().unwrap();
        assert_eq!(overrides.skill, Some(10.0));
        assert_eq!(overrides.hash_mb, Some(256.0));
        assert_eq!(overrides.think_secs, None);
        assert_eq!(overrides.depth, None);
        assert_eq!(overrides.threads, None);
    }

    #[test]
    fn upsert_updates_instead_of_duplicating() {
        let db = Database::open_in_memory().unwrap();
        let game = sample_game("abc123de", "start-fen");
        db.upsert_game(&game, 1).unwrap();

        let later = sample_game("abc123de", "later-fen");
        db.upsert_game(&later, 9).unwrap();

        assert_eq!(db.count_games().unwrap(), 1);
        let games = db.recent_games(10).unwrap();
        assert_eq!(games[0].last_fen, "later-fen");
        assert_eq!(games[0].moves_played, 9);
        assert_eq!(games[0].opponent, "Bob");
    }

    #[test]
    fn recent_games_are_limited() {
        let db = Database::open_in_memory().unwrap();
        for i in 0..5 {
            db.upsert_game(&sample_game(&format!("game{i}"), "fen"), 0)
                .unwrap();
        }
        assert_eq!(db.count_games().unwrap(), 5);
        assert_eq!(db.recent_games(3).unwrap().len(), 3);
    }
}
