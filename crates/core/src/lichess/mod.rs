//! Lichess Bot API client and payload types

pub mod client;
pub mod types;

pub use client::LichessClient;
pub use types::{Challenge, ChallengeUser, OngoingGame, OnlineBot, Opponent, Variant};
