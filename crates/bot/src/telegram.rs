//! Telegram remote-control task
//!
//! Long-polls for owner messages and applies setting commands to the shared
//! store. Everything the game loop reads (`level`, `think`, `hash`, `depth`,
//! `thread`, `wait_api` and the `challenge_*` settings) can be changed here
//! mid-game.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;
use zoe_core::telegram::{parse, Command, Setting};

use crate::BotContext;

const HELP: &str = "Commands:\n\
    set_level N - fix the skill level (1-20)\n\
    set_think N - fix the thinking time in seconds\n\
    set_hash N - fix the hash memory in Mb\n\
    set_depth N - fix the search depth\n\
    set_thread N - fix the thread count\n\
    set_wait N - seconds between API sweeps\n\
    set_challenge_time N - auto-challenge clock in seconds (min 180)\n\
    set_challenge_increment N - auto-challenge increment in seconds\n\
    set_challenge_elo N - minimum rating of challenged bots\n\
    set_challenge_loops N - sweeps between auto-challenges (min 100)\n\
    set_<param> 0 or off - back to the defaults\n\
    status - show overrides and the game count";

pub async fn run(ctx: Arc<BotContext>) {
    let mut offset = 0i64;

    loop {
        let updates = match ctx.telegram.get_updates(offset).await {
            Ok(updates) => updates,
            Err(e) => {
                warn!("telegram poll failed: {e}");
                tokio::time::sleep(Duration::from_secs(10)).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);

            let Some(message) = update.message else { continue };
            if message.chat.id != ctx.config.telegram_owner_id {
                // owner only
                continue;
            }
            let Some(text) = message.text.as_deref() else { continue };

            match parse(text) {
                Some(command) => handle_command(&ctx, command).await,
                None => ctx.notify("Unknown command, try /help").await,
            }
        }
    }
}

async fn handle_command(ctx: &Arc<BotContext>, command: Command) {
    match command {
        Command::Start => {
            ctx.notify("Welcome! I'm Zoe, the Lichess chess bot. Type /help for the commands.")
                .await;
        }
        Command::Help => ctx.notify(HELP).await,
        Command::Status => {
            let status = status_text(ctx);
            ctx.notify(&status).await;
        }
        Command::Set(setting, value) => {
            let stored = {
                let db = ctx.db.lock().unwrap();
                db.set_setting(setting.key(), value)
                    .and_then(|()| db.get_setting(setting.key()))
            };
            match stored {
                Ok(Some(v)) => ctx.notify(&format!("{} set: {v}", setting.key())).await,
                Ok(None) => ctx.notify(&format!("{} cleared", setting.key())).await,
                Err(e) => {
                    warn!("storing {} failed: {e}", setting.key());
                    ctx.notify("Could not store the setting").await;
                }
            }
        }
        Command::Clear(setting) => {
            let cleared = ctx.db.lock().unwrap().clear_setting(setting.key());
            match cleared {
                Ok(()) => ctx.notify(&format!("{} cleared", setting.key())).await,
                Err(e) => {
                    warn!("clearing {} failed: {e}", setting.key());
                    ctx.notify("Could not clear the setting").await;
                }
            }
        }
    }
}

fn status_text(ctx: &BotContext) -> String {
    let db = ctx.db.lock().unwrap();
    let mut out = String::from("Current overrides:\n");

    for setting in Setting::ALL {
        match db.get_setting(setting.key()) {
            Ok(Some(v)) => out.push_str(&format!("{}: {v}\n", setting.key())),
            _ => out.push_str(&format!("{}: unset\n", setting.key())),
        }
    }
    if let Ok(count) = db.count_games() {
        out.push_str(&format!("Games on record: {count}"));
    }
    out
}
