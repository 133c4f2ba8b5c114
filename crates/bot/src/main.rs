use std::collections::HashSet;
use std::env;
use std::process;
use std::sync::{Arc, Mutex};

use zoe_core::{BotConfig, Database, LichessClient, OpeningBook, TelegramClient};

mod challenges;
mod events;
mod game;
mod telegram;

/// Everything the loop tasks share.
pub struct BotContext {
    pub config: BotConfig,
    pub lichess: LichessClient,
    pub telegram: TelegramClient,
    pub db: Mutex<Database>,
    pub book: OpeningBook,
    /// Games with a turn handler currently running.
    pub active_games: Mutex<HashSet<String>>,
    /// Games that already got their greeting chat message.
    pub greeted_games: Mutex<HashSet<String>>,
}

impl BotContext {
    /// Best-effort owner notification; failures only get logged.
    pub async fn notify(&self, text: &str) {
        if let Err(e) = self
            .telegram
            .send_message(self.config.telegram_owner_id, text)
            .await
        {
            tracing::warn!("telegram notify failed: {e}");
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config_path = env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());
    let config = match BotConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {config_path}: {e}");
            process::exit(1);
        }
    };

    let db = Database::open(&config.db_path).expect("Failed to open database");

    let book = match &config.book_path {
        Some(path) => match OpeningBook::load(path) {
            Ok(book) => {
                tracing::info!("opening book loaded: {} lines", book.len());
                book
            }
            Err(e) => {
                tracing::warn!("could not load opening book {}: {e}", path.display());
                OpeningBook::default()
            }
        },
        None => OpeningBook::default(),
    };

    let lichess =
        LichessClient::new(config.lichess_token.clone()).expect("Failed to create Lichess client");
    let telegram = TelegramClient::new(config.telegram_token.clone())
        .expect("Failed to create Telegram client");

    let ctx = Arc::new(BotContext {
        config,
        lichess,
        telegram,
        db: Mutex::new(db),
        book,
        active_games: Mutex::new(HashSet::new()),
        greeted_games: Mutex::new(HashSet::new()),
    });

    tokio::spawn(telegram::run(ctx.clone()));

    tracing::info!("event loop starting");
    events::run(ctx).await;
}
