//! External UCI engine: the subprocess driver and the opponent-adaptive
//! tuning policy that decides how it is configured.

pub mod tuning;
pub mod uci;

pub use tuning::{engine_options, EngineOptions, Overrides, Tuning};
pub use uci::{EngineError, SearchResult, UciEngine};

use std::fmt;

/// Engine score for a position, from the side to move's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// Centipawn score (positive = side to move is better).
    Centipawns(i32),
    /// Forced mate in the given number of moves (negative = getting mated).
    Mate(i32),
}

impl Evaluation {
    /// Collapses the score to plain centipawns for the tuning policy:
    /// a mate in `m` counts as `m * 1000` centipawns, keeping the sign.
    pub fn as_centipawns(&self) -> i32 {
        match self {
            Evaluation::Centipawns(cp) => *cp,
            Evaluation::Mate(m) => m * 1000,
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluation::Centipawns(cp) => {
                let score = *cp as f32 / 100.0;
                if score >= 0.0 {
                    write!(f, "+{score:.2}")
                } else {
                    write!(f, "{score:.2}")
                }
            }
            Evaluation::Mate(m) => write!(f, "M{m}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mate_scores_map_to_large_centipawns() {
        assert_eq!(Evaluation::Mate(3).as_centipawns(), 3000);
        assert_eq!(Evaluation::Mate(-2).as_centipawns(), -2000);
        assert_eq!(Evaluation::Centipawns(-37).as_centipawns(), -37);
    }

    #[test]
    fn display_formats() {
        assert_eq!(Evaluation::Centipawns(154).to_string(), "+1.54");
        assert_eq!(Evaluation::Centipawns(-80).to_string(), "-0.80");
        assert_eq!(Evaluation::Mate(-4).to_string(), "M-4");
    }
}
