//! Lichess Bot API payload types

use serde::Deserialize;

/// Response of `GET /api/account/playing`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NowPlaying {
    pub now_playing: Vec<OngoingGame>,
}

/// One entry of the ongoing-games list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OngoingGame {
    pub game_id: String,
    #[serde(default)]
    pub full_id: Option<String>,
    pub color: String,
    pub fen: String,
    #[serde(default)]
    pub last_move: String,
    pub is_my_turn: bool,
    pub opponent: Opponent,
    pub speed: String,
    #[serde(default)]
    pub rated: bool,
    #[serde(default)]
    pub seconds_left: Option<u64>,
}

impl OngoingGame {
    /// Fullmove counter from the FEN, used as a rough progress marker.
    pub fn fullmove_number(&self) -> u32 {
        self.fen
            .split_whitespace()
            .nth(5)
            .and_then(|n| n.parse().ok())
            .unwrap_or(1)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Opponent {
    #[serde(default)]
    pub id: Option<String>,
    pub username: String,
    #[serde(default)]
    pub rating: Option<u32>,
}

/// Response of `GET /api/challenge`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChallengeList {
    #[serde(rename = "in")]
    pub incoming: Vec<Challenge>,
    #[serde(rename = "out", default)]
    pub outgoing: Vec<Challenge>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub rated: bool,
    pub speed: String,
    #[serde(default)]
    pub challenger: Option<ChallengeUser>,
    pub variant: Variant,
}

impl Challenge {
    pub fn challenger_name(&self) -> &str {
        self.challenger
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or("Anonymous")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChallengeUser {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub rating: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Variant {
    pub key: String,
    #[serde(default)]
    pub name: String,
}

/// One line of the ndjson `GET /api/bot/online` response.
#[derive(Debug, Clone, Deserialize)]
pub struct OnlineBot {
    pub username: String,
    #[serde(default)]
    pub perfs: BotPerfs,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BotPerfs {
    #[serde(default)]
    pub classical: Option<PerfRating>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PerfRating {
    pub rating: u32,
    #[serde(default)]
    pub prov: bool,
}

impl OnlineBot {
    /// Classical rating, the cadence auto-challenges are sent at. Bots
    /// without one rank lowest.
    pub fn classical_rating(&self) -> u32 {
        self.perfs.classical.as_ref().map_or(0, |p| p.rating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_now_playing() {
        let json = r#"{
            "nowPlaying": [{
                "gameId": "abc123de",
                "fullId": "abc123defghi",
                "color": "black",
                "fen": "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1",
                "lastMove": "e2e4",
                "isMyTurn": true,
                "opponent": {"id": "maia1", "username": "maia1", "rating": 1541},
                "speed": "rapid",
                "rated": true,
                "secondsLeft": 598
            }]
        }"#;

        let playing: NowPlaying = serde_json::from_str(json).unwrap();
        let game = &playing.now_playing[0];
        assert_eq!(game.game_id, "abc123de");
        assert!(game.is_my_turn);
        assert_eq!(game.opponent.rating, Some(1541));
        assert_eq!(game.fullmove_number(), 1);
    }

    #[test]
    fn anonymous_opponent_has_no_rating() {
        let json = r#"{
            "gameId": "abc123de",
            "color": "white",
            "fen": "8/8/8/8/8/8/8/8 w - - 0 41",
            "isMyTurn": false,
            "opponent": {"username": "Anonymous"},
            "speed": "correspondence"
        }"#;

        let game: OngoingGame = serde_json::from_str(json).unwrap();
        assert_eq!(game.opponent.rating, None);
        assert_eq!(game.fullmove_number(), 41);
        assert!(!game.rated);
    }

    #[test]
    fn deserializes_challenge_list() {
        let json = r#"{
            "in": [{
                "id": "xyz789ab",
                "status": "created",
                "rated": false,
                "speed": "rapid",
                "challenger": {"id": "bob", "name": "Bob", "rating": 1873},
                "variant": {"key": "standard", "name": "Standard"}
            }],
            "out": []
        }"#;

        let list: ChallengeList = serde_json::from_str(json).unwrap();
        assert_eq!(list.incoming.len(), 1);
        let challenge = &list.incoming[0];
        assert_eq!(challenge.challenger_name(), "Bob");
        assert_eq!(challenge.variant.key, "standard");
    }

    #[test]
    fn deserializes_online_bot_line() {
        let json = r#"{"id":"somebot","username":"SomeBot","title":"BOT",
            "perfs":{"blitz":{"rating":2100,"prov":false},"classical":{"rating":2450}}}"#;
        let bot: OnlineBot = serde_json::from_str(json).unwrap();
        assert_eq!(bot.username, "SomeBot");
        assert_eq!(bot.classical_rating(), 2450);
    }

    #[test]
    fn bot_without_classical_rating_ranks_lowest() {
        let bot: OnlineBot =
            serde_json::from_str(r#"{"username":"BlitzOnly","perfs":{"blitz":{"rating":1900}}}"#)
                .unwrap();
        assert_eq!(bot.classical_rating(), 0);
    }
}
