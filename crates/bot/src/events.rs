//! Main polling loop: accept challenges, dispatch turn handlers

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{info, warn};
use zoe_core::engine::tuning;
use zoe_core::lichess::Challenge;
use zoe_core::Result;

use crate::challenges::AutoChallenger;
use crate::{game, BotContext};

/// Speeds the bot is willing to play. Bullet and blitz leave no room for
/// the longer thinking times the tuning policy hands out.
const ACCEPTED_SPEEDS: [&str; 3] = ["rapid", "classical", "correspondence"];

/// Pause after a rate-limited poll, per the Lichess API guidance.
const RATE_LIMIT_PAUSE: Duration = Duration::from_secs(90);

/// Pause after any other poll failure.
const ERROR_PAUSE: Duration = Duration::from_secs(10);

pub async fn run(ctx: Arc<BotContext>) {
    let mut challenger = AutoChallenger::new();

    loop {
        challenger.tick(&ctx).await;

        if let Err(e) = poll_once(&ctx).await {
            let pause = if e.is_rate_limit() {
                RATE_LIMIT_PAUSE
            } else {
                ERROR_PAUSE
            };
            warn!("poll failed: {e}; retrying in {}s", pause.as_secs());
            tokio::time::sleep(pause).await;
            continue;
        }

        tokio::time::sleep(poll_interval(&ctx)).await;
    }
}

/// Interval between sweeps; remotely adjustable through `set_wait`.
fn poll_interval(ctx: &BotContext) -> Duration {
    let override_secs = ctx.db.lock().unwrap().poll_override().unwrap_or(None);
    tuning::poll_interval(override_secs)
}

async fn poll_once(ctx: &Arc<BotContext>) -> Result<()> {
    handle_challenges(ctx).await?;

    let games = ctx.lichess.ongoing_games().await?;
    for game_state in games {
        if !game_state.is_my_turn {
            continue;
        }

        // one handler per game at a time
        {
            let mut active = ctx.active_games.lock().unwrap();
            if !active.insert(game_state.game_id.clone()) {
                continue;
            }
        }

        info!("my turn in {}", game_state.game_id);
        let ctx = ctx.clone();
        tokio::spawn(async move {
            // Released on drop, so a panicking handler does not leave the
            // game stuck in the active set.
            let _active = ActiveGuard {
                games: &ctx.active_games,
                id: &game_state.game_id,
            };
            if let Err(e) = game::handle_turn(&ctx, &game_state).await {
                warn!("game {}: {e}", game_state.game_id);
            }
        });
    }

    Ok(())
}

struct ActiveGuard<'a> {
    games: &'a Mutex<HashSet<String>>,
    id: &'a str,
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        let mut games = self
            .games
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        games.remove(self.id);
    }
}

/// Why a challenge gets declined, if it does.
fn decline_reason(challenge: &Challenge) -> Option<&'static str> {
    if challenge.variant.key != "standard" {
        return Some("variant");
    }
    if !ACCEPTED_SPEEDS.contains(&challenge.speed.as_str()) {
        return Some("timeControl");
    }
    None
}

/// Handles each pending challenge on its own; one failed accept or decline
/// is logged and does not abort the sweep.
async fn handle_challenges(ctx: &Arc<BotContext>) -> Result<()> {
    for challenge in ctx.lichess.incoming_challenges().await? {
        let outcome = match decline_reason(&challenge) {
            Some(reason) => ctx.lichess.decline_challenge(&challenge.id, reason).await,
            None => accept(ctx, &challenge).await,
        };
        if let Err(e) = outcome {
            warn!("challenge {}: {e}", challenge.id);
        }
    }

    Ok(())
}

async fn accept(ctx: &Arc<BotContext>, challenge: &Challenge) -> Result<()> {
    info!(
        "accepting {} challenge {} from {}",
        challenge.speed,
        challenge.id,
        challenge.challenger_name()
    );
    ctx.lichess.accept_challenge(&challenge.id).await?;
    ctx.notify(&format!(
        "Accepted {} challenge from {}",
        challenge.speed,
        challenge.challenger_name()
    ))
    .await;
    Ok(())
}
