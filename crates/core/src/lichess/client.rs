//! Lichess Bot API client
//!
//! Covers the slice of the Bot API the event loop needs: the ongoing-games
//! poll, challenge handling, move submission and game chat.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response};
use tracing::debug;

use super::types::{Challenge, ChallengeList, NowPlaying, OngoingGame, OnlineBot};
use crate::error::{Error, Result};

const LICHESS_API_BASE: &str = "https://lichess.org/api";

/// Lichess truncates chat messages at 140 characters.
const CHAT_MAX_CHARS: usize = 140;

pub struct LichessClient {
    client: Client,
    token: String,
}

impl LichessClient {
    pub fn new(token: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client, token })
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", self.token)) {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }

    async fn expect_ok(what: &str, response: Response) -> Result<Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(Error::Lichess(format!("{what}: {status} - {body}")))
    }

    /// Games the account is currently playing.
    pub async fn ongoing_games(&self) -> Result<Vec<OngoingGame>> {
        let url = format!("{LICHESS_API_BASE}/account/playing");
        let response = self
            .client
            .get(&url)
            .headers(self.headers())
            .send()
            .await?;
        let response = Self::expect_ok("ongoing games", response).await?;

        let playing: NowPlaying = response.json().await?;
        Ok(playing.now_playing)
    }

    /// Challenges waiting for this account.
    pub async fn incoming_challenges(&self) -> Result<Vec<Challenge>> {
        let url = format!("{LICHESS_API_BASE}/challenge");
        let response = self
            .client
            .get(&url)
            .headers(self.headers())
            .send()
            .await?;
        let response = Self::expect_ok("challenges", response).await?;

        let list: ChallengeList = response.json().await?;
        Ok(list.incoming)
    }

    pub async fn accept_challenge(&self, challenge_id: &str) -> Result<()> {
        let url = format!("{LICHESS_API_BASE}/challenge/{challenge_id}/accept");
        let response = self
            .client
            .post(&url)
            .headers(self.headers())
            .send()
            .await?;
        Self::expect_ok("accept challenge", response).await?;
        Ok(())
    }

    pub async fn decline_challenge(&self, challenge_id: &str, reason: &str) -> Result<()> {
        let url = format!("{LICHESS_API_BASE}/challenge/{challenge_id}/decline");
        let response = self
            .client
            .post(&url)
            .headers(self.headers())
            .form(&[("reason", reason)])
            .send()
            .await?;
        Self::expect_ok("decline challenge", response).await?;
        Ok(())
    }

    /// Challenges another player. Clock values are in seconds.
    pub async fn create_challenge(
        &self,
        username: &str,
        rated: bool,
        clock_limit: u32,
        clock_increment: u32,
    ) -> Result<()> {
        debug!("challenging {username} at {clock_limit}+{clock_increment}");
        let url = format!("{LICHESS_API_BASE}/challenge/{username}");
        let response = self
            .client
            .post(&url)
            .headers(self.headers())
            .form(&[
                ("rated", rated.to_string()),
                ("clock.limit", clock_limit.to_string()),
                ("clock.increment", clock_increment.to_string()),
                ("variant", "standard".to_string()),
            ])
            .send()
            .await?;
        Self::expect_ok("create challenge", response).await?;
        Ok(())
    }

    /// Bots currently online, from the ndjson `/api/bot/online` stream.
    /// Malformed lines are skipped.
    pub async fn online_bots(&self) -> Result<Vec<OnlineBot>> {
        let url = format!("{LICHESS_API_BASE}/bot/online");
        let response = self
            .client
            .get(&url)
            .headers(self.headers())
            .query(&[("nb", "50")])
            .send()
            .await?;
        let response = Self::expect_ok("online bots", response).await?;

        let text = response.text().await?;
        Ok(text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect())
    }

    /// Submits a move in UCI notation. Lichess rejects illegal moves with a
    /// 400, which surfaces as [`Error::Lichess`].
    pub async fn make_move(&self, game_id: &str, uci: &str) -> Result<()> {
        debug!("game {game_id}: posting move {uci}");
        let url = format!("{LICHESS_API_BASE}/bot/game/{game_id}/move/{uci}");
        let response = self
            .client
            .post(&url)
            .headers(self.headers())
            .send()
            .await?;
        Self::expect_ok("make move", response).await?;
        Ok(())
    }

    /// Posts to the player chat, truncated to the Lichess limit.
    pub async fn post_chat(&self, game_id: &str, text: &str) -> Result<()> {
        let text: String = text.chars().take(CHAT_MAX_CHARS).collect();
        let url = format!("{LICHESS_API_BASE}/bot/game/{game_id}/chat");
        let response = self
            .client
            .post(&url)
            .headers(self.headers())
            .form(&[("room", "player"), ("text", text.as_str())])
            .send()
            .await?;
        Self::expect_ok("post chat", response).await?;
        Ok(())
    }
}
