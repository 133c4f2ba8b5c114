//! Opponent-adaptive engine tuning
//!
//! The bot does not play at full strength. Before every engine move it picks
//! a base parameter tuple from the opponent's rating bracket, bends it by how
//! the game is going (side-to-move centipawns), then lets remotely-set
//! overrides have the last word. Comfortable positions make the bot faster
//! and weaker; losing positions make it dig in.

use std::fmt;
use std::time::Duration;

/// Caps for remotely-set overrides.
pub const MAX_SKILL: i32 = 20;
pub const MAX_THINK_SECS: f64 = 3600.0;
pub const MAX_HASH_MB: f64 = 2100.0;
pub const MAX_DEPTH: f64 = 30.0;
pub const MAX_THREADS: f64 = 20.0;

/// Poll interval bounds for the main event loop.
pub const DEFAULT_POLL_SECS: f64 = 15.0;
pub const MAX_POLL_SECS: f64 = 180.0;

/// Clock threshold below which the bot stops evaluating and just moves.
pub const HURRY_SECS: u64 = 120;

/// Working parameter tuple while brackets and overrides are applied.
/// Kept in floats until [`Tuning::finish`] rounds it for the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Tuning {
    pub think_secs: f64,
    pub skill: i32,
    pub hash_mb: f64,
    pub depth: f64,
    pub threads: f64,
}

/// Final engine configuration, rounded to what UCI options accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub movetime_ms: u64,
    pub skill_level: u8,
    pub hash_mb: u32,
    pub depth: u8,
    pub threads: u32,
}

/// Remotely-set parameter overrides. `None` means unset; the settings store
/// already treats non-positive stored values as unset.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Overrides {
    pub skill: Option<f64>,
    pub think_secs: Option<f64>,
    pub hash_mb: Option<f64>,
    pub depth: Option<f64>,
    pub threads: Option<f64>,
}

/// Base tuning for one of the seven opponent-rating brackets.
pub fn base_for_rating(rating: u32) -> Tuning {
    let (think_secs, skill, hash_mb, depth, threads) = if rating <= 700 {
        (0.2, 2, 16.0, 4.0, 4.0)
    } else if rating <= 1000 {
        (0.5, 4, 16.0, 8.0, 8.0)
    } else if rating <= 1500 {
        (1.0, 9, 32.0, 10.0, 11.0)
    } else if rating <= 2000 {
        (1.5, 14, 128.0, 12.0, 11.0)
    } else if rating <= 2300 {
        (2.3, 16, 512.0, 15.0, 13.0)
    } else if rating <= 2500 {
        (5.0, 18, 1028.0, 20.0, 15.0)
    } else {
        (10.0, 20, 2056.0, 25.0, 18.0)
    };

    Tuning {
        think_secs,
        skill,
        hash_mb,
        depth,
        threads,
    }
}

impl Tuning {
    /// Applies the evaluation bracket. Eleven brackets; the gaps at
    /// `600 < cp <= 800` and `cp == -400` intentionally leave the base
    /// settings untouched. Skill is clamped to `[1, 20]` afterwards.
    pub fn adjust_for_eval(&mut self, cp: i32) {
        if cp > 800 {
            self.skill = 20;
        } else if cp > 400 && cp <= 600 {
            self.think_secs *= 0.5;
            self.skill -= 4;
            self.hash_mb *= 0.7;
            self.depth *= 0.6;
            self.threads *= 0.7;
        } else if cp > 100 && cp <= 400 {
            self.think_secs *= 0.7;
            self.skill -= 3;
            self.hash_mb *= 0.8;
            self.depth *= 0.8;
            self.threads *= 0.8;
        } else if cp > 50 && cp <= 100 {
            self.think_secs *= 0.8;
            self.skill -= 2;
            self.hash_mb *= 0.9;
            self.depth *= 0.9;
            self.threads *= 0.9;
        } else if cp > 0 && cp <= 50 {
            self.think_secs *= 0.9;
            self.skill -= 1;
        } else if cp == 0 {
            // dead level, keep the base settings
        } else if cp > -50 && cp < 0 {
            self.think_secs *= 1.1;
            self.skill += 1;
        } else if cp > -100 && cp <= -50 {
            self.think_secs *= 1.4;
            self.skill += 2;
            self.hash_mb = self.hash_mb * 1.05 + 50.0;
        } else if cp > -200 && cp <= -100 {
            self.think_secs *= 2.0;
            self.skill += 3;
            self.hash_mb = self.hash_mb * 1.1 + 100.0;
            self.threads *= 1.1;
        } else if cp > -400 && cp <= -200 {
            self.think_secs *= 4.0;
            self.skill += 5;
            self.hash_mb = self.hash_mb * 1.3 + 200.0;
            self.threads *= 1.2;
        } else if cp < -400 {
            self.think_secs *= 7.0;
            self.skill = 20;
            self.hash_mb = self.hash_mb * 1.5 + 300.0;
            self.threads *= 1.4;
        }

        self.skill = self.skill.clamp(1, MAX_SKILL);
    }

    /// Applies remotely-set overrides, each clipped to its cap.
    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(v) = overrides.skill {
            self.skill = (v as i32).clamp(1, MAX_SKILL);
        }
        if let Some(v) = overrides.think_secs {
            self.think_secs = v.min(MAX_THINK_SECS);
        }
        if let Some(v) = overrides.hash_mb {
            self.hash_mb = v.min(MAX_HASH_MB);
        }
        if let Some(v) = overrides.depth {
            self.depth = v.min(MAX_DEPTH);
        }
        if let Some(v) = overrides.threads {
            self.threads = v.min(MAX_THREADS);
        }
    }

    /// Rounds to the values actually handed to the engine.
    pub fn finish(&self) -> EngineOptions {
        EngineOptions {
            movetime_ms: (self.think_secs * 1000.0).round() as u64,
            skill_level: self.skill.clamp(1, MAX_SKILL) as u8,
            hash_mb: self.hash_mb.round().max(1.0) as u32,
            depth: self.depth.round().max(1.0) as u8,
            threads: self.threads.round().max(1.0) as u32,
        }
    }
}

/// The full policy: rating bracket, evaluation adjustment, then overrides.
pub fn engine_options(opponent_rating: u32, cp: i32, overrides: &Overrides) -> EngineOptions {
    let mut tuning = base_for_rating(opponent_rating);
    tuning.adjust_for_eval(cp);
    tuning.apply_overrides(overrides);
    tuning.finish()
}

/// True when the clock is low enough to skip the evaluation pass.
pub fn is_hurry(seconds_left: Option<u64>) -> bool {
    seconds_left.is_some_and(|s| s <= HURRY_SECS)
}

/// Fixed fast and strong configuration for low-clock games. Rating and
/// evaluation brackets do not apply; there is no time to evaluate.
pub fn hurry_options() -> EngineOptions {
    EngineOptions {
        movetime_ms: 1000,
        skill_level: 20,
        hash_mb: 2000,
        depth: 15,
        threads: 12,
    }
}

/// Interval between API sweeps. Unset falls back to 15 s, capped at 180 s.
pub fn poll_interval(override_secs: Option<f64>) -> Duration {
    let secs = match override_secs {
        Some(v) if v > 0.0 => v.min(MAX_POLL_SECS),
        _ => DEFAULT_POLL_SECS,
    };
    Duration::from_secs_f64(secs)
}

impl fmt::Display for EngineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Playing at level: {}\nThinking time: {:.1}s\nHash Memory: {}Mb\nMoves Depth: {}\nThreads Num: {}",
            self.skill_level,
            self.movetime_ms as f64 / 1000.0,
            self.hash_mb,
            self.depth,
            self.threads
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(rating: u32, cp: i32) -> EngineOptions {
        engine_options(rating, cp, &Overrides::default())
    }

    #[test]
    fn rating_bracket_boundaries() {
        assert_eq!(base_for_rating(0).skill, 2);
        assert_eq!(base_for_rating(700).skill, 2);
        assert_eq!(base_for_rating(701).skill, 4);
        assert_eq!(base_for_rating(1000).skill, 4);
        assert_eq!(base_for_rating(1001).skill, 9);
        assert_eq!(base_for_rating(1500).skill, 9);
        assert_eq!(base_for_rating(1501).skill, 14);
        assert_eq!(base_for_rating(2000).skill, 14);
        assert_eq!(base_for_rating(2001).skill, 16);
        assert_eq!(base_for_rating(2300).skill, 16);
        assert_eq!(base_for_rating(2301).skill, 18);
        assert_eq!(base_for_rating(2500).skill, 18);
        assert_eq!(base_for_rating(2501).skill, 20);
    }

    #[test]
    fn strongest_bracket_values() {
        let tuning = base_for_rating(2800);
        assert_eq!(tuning.think_secs, 10.0);
        assert_eq!(tuning.hash_mb, 2056.0);
        assert_eq!(tuning.depth, 25.0);
        assert_eq!(tuning.threads, 18.0);
    }

    #[test]
    fn crushing_advantage_forces_full_skill() {
        let opts = options(1800, 900);
        assert_eq!(opts.skill_level, 20);
        // everything else stays at the base tuple
        assert_eq!(opts.movetime_ms, 1500);
        assert_eq!(opts.hash_mb, 128);
    }

    #[test]
    fn winning_position_plays_faster_and_weaker() {
        // base for <=2000: (1.5s, 14, 128, 12, 11); cp 500 bracket halves time
        let opts = options(1800, 500);
        assert_eq!(opts.movetime_ms, 750);
        assert_eq!(opts.skill_level, 10);
        assert_eq!(opts.hash_mb, 90); // 128 * 0.7 = 89.6
        assert_eq!(opts.depth, 7); // 12 * 0.6 = 7.2
        assert_eq!(opts.threads, 8); // 11 * 0.7 = 7.7
    }

    #[test]
    fn gap_between_600_and_800_leaves_base_untouched() {
        let opts = options(1800, 700);
        assert_eq!(opts, options(1800, 0));
    }

    #[test]
    fn exactly_minus_400_leaves_base_untouched() {
        assert_eq!(options(1800, -400), options(1800, 0));
    }

    #[test]
    fn slight_edge_brackets() {
        // cp in (0, 50]: time * 0.9, skill - 1
        let opts = options(1200, 30);
        assert_eq!(opts.movetime_ms, 900);
        assert_eq!(opts.skill_level, 8);
        // cp in (-50, 0): time * 1.1, skill + 1
        let opts = options(1200, -30);
        assert_eq!(opts.movetime_ms, 1100);
        assert_eq!(opts.skill_level, 10);
    }

    #[test]
    fn losing_brackets_scale_time_and_hash() {
        // base for <=2000: (1.5s, 14, 128, 12, 11)
        let opts = options(1800, -75);
        assert_eq!(opts.movetime_ms, 2100); // 1.5 * 1.4
        assert_eq!(opts.skill_level, 16);
        assert_eq!(opts.hash_mb, 184); // 128 * 1.05 + 50 = 184.4

        let opts = options(1800, -150);
        assert_eq!(opts.movetime_ms, 3000);
        assert_eq!(opts.skill_level, 17);
        assert_eq!(opts.hash_mb, 241); // 128 * 1.1 + 100 = 240.8
        assert_eq!(opts.threads, 12); // 11 * 1.1

        let opts = options(1800, -300);
        assert_eq!(opts.movetime_ms, 6000);
        assert_eq!(opts.skill_level, 19);
        assert_eq!(opts.hash_mb, 366); // 128 * 1.3 + 200 = 366.4
        assert_eq!(opts.threads, 13); // 11 * 1.2 = 13.2
    }

    #[test]
    fn desperate_position_goes_all_in() {
        let opts = options(1800, -450);
        assert_eq!(opts.movetime_ms, 10500); // 1.5 * 7
        assert_eq!(opts.skill_level, 20);
        assert_eq!(opts.hash_mb, 492); // 128 * 1.5 + 300
        assert_eq!(opts.threads, 15); // 11 * 1.4 = 15.4
    }

    #[test]
    fn skill_is_clamped_low() {
        // base skill 2 for <=700, cp 500 bracket subtracts 4
        let opts = options(600, 500);
        assert_eq!(opts.skill_level, 1);
    }

    #[test]
    fn skill_is_clamped_high() {
        // base skill 18 for <=2500, cp -300 bracket adds 5
        let opts = options(2400, -300);
        assert_eq!(opts.skill_level, 20);
    }

    #[test]
    fn overrides_replace_computed_values() {
        let overrides = Overrides {
            skill: Some(5.0),
            think_secs: Some(12.0),
            hash_mb: Some(64.0),
            depth: Some(8.0),
            threads: Some(2.0),
        };
        let opts = engine_options(2800, -450, &overrides);
        assert_eq!(opts.skill_level, 5);
        assert_eq!(opts.movetime_ms, 12000);
        assert_eq!(opts.hash_mb, 64);
        assert_eq!(opts.depth, 8);
        assert_eq!(opts.threads, 2);
    }

    #[test]
    fn overrides_are_clipped_to_caps() {
        let overrides = Overrides {
            skill: Some(99.0),
            think_secs: Some(10_000.0),
            hash_mb: Some(4096.0),
            depth: Some(50.0),
            threads: Some(64.0),
        };
        let opts = engine_options(1200, 0, &overrides);
        assert_eq!(opts.skill_level, 20);
        assert_eq!(opts.movetime_ms, 3_600_000);
        assert_eq!(opts.hash_mb, 2100);
        assert_eq!(opts.depth, 30);
        assert_eq!(opts.threads, 20);
    }

    #[test]
    fn unset_overrides_change_nothing() {
        assert_eq!(
            engine_options(1800, -150, &Overrides::default()),
            options(1800, -150)
        );
    }

    #[test]
    fn poll_interval_bounds() {
        assert_eq!(poll_interval(None), Duration::from_secs(15));
        assert_eq!(poll_interval(Some(-5.0)), Duration::from_secs(15));
        assert_eq!(poll_interval(Some(60.0)), Duration::from_secs(60));
        assert_eq!(poll_interval(Some(600.0)), Duration::from_secs(180));
    }

    #[test]
    fn hurry_kicks_in_at_two_minutes() {
        assert!(is_hurry(Some(0)));
        assert!(is_hurry(Some(120)));
        assert!(!is_hurry(Some(121)));
        assert!(!is_hurry(None));
    }

    #[test]
    fn hurry_settings_are_fixed_and_strong() {
        let opts = hurry_options();
        assert_eq!(opts.movetime_ms, 1000);
        assert_eq!(opts.skill_level, 20);
        assert_eq!(opts.hash_mb, 2000);
        assert_eq!(opts.depth, 15);
        assert_eq!(opts.threads, 12);
    }

    #[test]
    fn finish_never_rounds_to_zero() {
        let tuning = Tuning {
            think_secs: 0.2,
            skill: 2,
            hash_mb: 0.3,
            depth: 0.4,
            threads: 0.2,
        };
        let opts = tuning.finish();
        assert_eq!(opts.hash_mb, 1);
        assert_eq!(opts.depth, 1);
        assert_eq!(opts.threads, 1);
    }
}
