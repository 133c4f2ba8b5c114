//! Owner command parsing
//!
//! Commands arrive as plain messages ("set_level 12") or slash commands
//! ("/set_level 12"); both spellings are accepted.

/// One of the remotely tunable parameters. `key` doubles as the settings
/// store row name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    Level,
    Think,
    Hash,
    Depth,
    Thread,
    Wait,
    ChallengeTime,
    ChallengeIncrement,
    ChallengeElo,
    ChallengeLoops,
}

impl Setting {
    pub const ALL: [Setting; 10] = [
        Setting::Level,
        Setting::Think,
        Setting::Hash,
        Setting::Depth,
        Setting::Thread,
        Setting::Wait,
        Setting::ChallengeTime,
        Setting::ChallengeIncrement,
        Setting::ChallengeElo,
        Setting::ChallengeLoops,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Setting::Level => "level",
            Setting::Think => "think",
            Setting::Hash => "hash",
            Setting::Depth => "depth",
            Setting::Thread => "thread",
            Setting::Wait => "wait_api",
            Setting::ChallengeTime => "challenge_time",
            Setting::ChallengeIncrement => "challenge_increment",
            Setting::ChallengeElo => "challenge_opp_elo",
            Setting::ChallengeLoops => "challenge_loops",
        }
    }

    fn from_word(word: &str) -> Option<Self> {
        match word {
            "level" => Some(Setting::Level),
            "think" => Some(Setting::Think),
            "hash" => Some(Setting::Hash),
            "depth" => Some(Setting::Depth),
            "thread" | "threads" => Some(Setting::Thread),
            "wait" | "wait_api" => Some(Setting::Wait),
            "challenge_time" => Some(Setting::ChallengeTime),
            "challenge_increment" => Some(Setting::ChallengeIncrement),
            "challenge_elo" | "challenge_opp_elo" => Some(Setting::ChallengeElo),
            "challenge_loops" => Some(Setting::ChallengeLoops),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Help,
    Status,
    Set(Setting, f64),
    Clear(Setting),
}

/// Parses an owner message. Returns `None` for anything unrecognized.
pub fn parse(text: &str) -> Option<Command> {
    let text = text.trim();
    let text = text.strip_prefix('/').unwrap_or(text);
    let mut words = text.split_whitespace();
    let head = words.next()?.to_ascii_lowercase();

    match head.as_str() {
        "start" => Some(Command::Start),
        "help" | "menu" => Some(Command::Help),
        "status" => Some(Command::Status),
        _ => {
            let setting = Setting::from_word(head.strip_prefix("set_")?)?;
            let value = words.next()?;
            if value.eq_ignore_ascii_case("off") {
                return Some(Command::Clear(setting));
            }
            let value: f64 = value.parse().ok()?;
            if value <= 0.0 {
                // non-positive means back to the automatic policy
                return Some(Command::Clear(setting));
            }
            Some(Command::Set(setting, value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_set_commands() {
        assert_eq!(parse("set_level 12"), Some(Command::Set(Setting::Level, 12.0)));
        assert_eq!(parse("/set_think 2.5"), Some(Command::Set(Setting::Think, 2.5)));
        assert_eq!(parse("SET_HASH 256"), Some(Command::Set(Setting::Hash, 256.0)));
        assert_eq!(parse("set_threads 8"), Some(Command::Set(Setting::Thread, 8.0)));
        assert_eq!(parse("set_wait 30"), Some(Command::Set(Setting::Wait, 30.0)));
    }

    #[test]
    fn parses_challenge_settings() {
        assert_eq!(
            parse("set_challenge_time 600"),
            Some(Command::Set(Setting::ChallengeTime, 600.0))
        );
        assert_eq!(
            parse("set_challenge_elo 2300"),
            Some(Command::Set(Setting::ChallengeElo, 2300.0))
        );
        assert_eq!(
            parse("/set_challenge_loops 500"),
            Some(Command::Set(Setting::ChallengeLoops, 500.0))
        );
        assert_eq!(
            parse("set_challenge_increment off"),
            Some(Command::Clear(Setting::ChallengeIncrement))
        );
    }

    #[test]
    fn non_positive_or_off_clears() {
        assert_eq!(parse("set_level 0"), Some(Command::Clear(Setting::Level)));
        assert_eq!(parse("set_depth -3"), Some(Command::Clear(Setting::Depth)));
        assert_eq!(parse("set_think off"), Some(Command::Clear(Setting::Think)));
    }

    #[test]
    fn parses_plain_commands() {
        assert_eq!(parse("/start"), Some(Command::Start));
        assert_eq!(parse("menu"), Some(Command::Help));
        assert_eq!(parse("  /status  "), Some(Command::Status));
    }

    #[test]
    fn rejects_unknown_and_incomplete() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("set_level"), None);
        assert_eq!(parse("set_level twelve"), None);
        assert_eq!(parse("set_power 9000"), None);
        assert_eq!(parse("hello there"), None);
    }
}
