//! Outgoing bot challenges
//!
//! Every few hundred sweeps the bot challenges a random online bot whose
//! classical rating clears the configured floor. Cadence and opponent
//! strength are remotely tunable through the `challenge_*` settings.

use std::sync::Arc;

use rand::seq::IndexedRandom;
use tracing::{info, warn};
use zoe_core::lichess::OnlineBot;
use zoe_core::telegram::Setting;
use zoe_core::{Database, Result};

use crate::BotContext;

/// Stop trying after this many failed challenges in a row; a success
/// resets the count.
const MAX_CONSECUTIVE_FAILURES: u32 = 3;

/// Effective auto-challenge settings after floors are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ChallengePrefs {
    /// Clock limit in seconds, at least 180 (else 900).
    pub clock_limit: u32,
    /// Clock increment in seconds.
    pub clock_increment: u32,
    /// Minimum classical rating of the opponent bot.
    pub min_rating: u32,
    /// Sweeps of the event loop between challenges, at least 100 (else 2000).
    pub sweeps_between: u32,
}

impl ChallengePrefs {
    fn from_settings(
        time: Option<f64>,
        increment: Option<f64>,
        min_rating: Option<f64>,
        loops: Option<f64>,
    ) -> Self {
        ChallengePrefs {
            clock_limit: match time {
                Some(v) if v >= 180.0 => v as u32,
                _ => 900,
            },
            clock_increment: increment.map_or(14, |v| v as u32),
            min_rating: min_rating.map_or(3000, |v| v as u32),
            sweeps_between: match loops {
                Some(v) if v >= 100.0 => v as u32,
                _ => 2000,
            },
        }
    }

    fn load(db: &Database) -> Result<Self> {
        Ok(Self::from_settings(
            db.get_setting(Setting::ChallengeTime.key())?,
            db.get_setting(Setting::ChallengeIncrement.key())?,
            db.get_setting(Setting::ChallengeElo.key())?,
            db.get_setting(Setting::ChallengeLoops.key())?,
        ))
    }
}

/// Counts event-loop sweeps and fires a challenge when due.
pub struct AutoChallenger {
    sweeps: u32,
    failures: u32,
}

impl AutoChallenger {
    pub fn new() -> Self {
        AutoChallenger {
            sweeps: 0,
            failures: 0,
        }
    }

    fn due(&mut self, sweeps_between: u32) -> bool {
        if self.failures >= MAX_CONSECUTIVE_FAILURES {
            return false;
        }
        self.sweeps += 1;
        if self.sweeps > sweeps_between {
            self.sweeps = 0;
            return true;
        }
        false
    }

    /// Called once per event-loop sweep.
    pub async fn tick(&mut self, ctx: &Arc<BotContext>) {
        let prefs = {
            let db = ctx.db.lock().unwrap();
            match ChallengePrefs::load(&db) {
                Ok(prefs) => prefs,
                Err(e) => {
                    warn!("challenge settings unreadable: {e}");
                    return;
                }
            }
        };
        if !self.due(prefs.sweeps_between) {
            return;
        }

        match send_challenge(ctx, &prefs).await {
            Ok(Some(username)) => {
                self.failures = 0;
                info!("challenged {username}");
                ctx.notify(&format!("Challenging: {username}")).await;
            }
            Ok(None) => info!("no online bots rated {} or higher", prefs.min_rating),
            Err(e) => {
                self.failures += 1;
                warn!(
                    "auto challenge failed ({e}), failure {} of {}",
                    self.failures, MAX_CONSECUTIVE_FAILURES
                );
            }
        }
    }
}

async fn send_challenge(
    ctx: &Arc<BotContext>,
    prefs: &ChallengePrefs,
) -> Result<Option<String>> {
    let bots = ctx.lichess.online_bots().await?;
    let candidates: Vec<&OnlineBot> = bots
        .iter()
        .filter(|b| b.classical_rating() >= prefs.min_rating)
        .collect();

    let Some(bot) = candidates.choose(&mut rand::rng()) else {
        return Ok(None);
    };
    ctx.lichess
        .create_challenge(&bot.username, true, prefs.clock_limit, prefs.clock_increment)
        .await?;
    Ok(Some(bot.username.clone()))
}
