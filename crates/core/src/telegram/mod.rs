//! Telegram Bot API client and owner command parsing

pub mod client;
pub mod commands;

pub use client::{Chat, Message, TelegramClient, Update};
pub use commands::{parse, Command, Setting};
