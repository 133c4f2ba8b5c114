//! Per-turn move selection and submission
//!
//! Move order mirrors the bot's personality: a hand-made opening repertoire
//! first, then the engine tuned by the adaptive policy, then a random legal
//! move if everything else has gone sideways.

use std::sync::Arc;

use rand::seq::IndexedRandom;
use shakmaty::Chess;
use tracing::{info, warn};
use zoe_core::board;
use zoe_core::engine::{tuning, UciEngine};
use zoe_core::lichess::OngoingGame;
use zoe_core::{Error, Result};

use crate::BotContext;

/// Rating assumed when the opponent has none (fresh or anonymous account).
const DEFAULT_OPPONENT_RATING: u32 = 1500;

/// Canned greetings: the chat voice without the chatbot.
const GREETINGS: [&str; 4] = [
    "Woof! I'm Zoe. Good luck and have fun!",
    "Zoe here. I only think as hard as I have to. Woof!",
    "A new game! Show me a nice opening. Woof woof!",
    "Hi, I'm Zoe the chess dog. Bark if I blunder!",
];

pub async fn handle_turn(ctx: &Arc<BotContext>, game: &OngoingGame) -> Result<()> {
    greet_if_new(ctx, game).await;

    let position = board::position_from_fen(&game.fen)?;
    let (uci, chat_line) = select_move(ctx, game, &position).await?;

    submit(ctx, game, &position, &uci, &chat_line).await?;
    record(ctx, game);
    Ok(())
}

/// Picks a move and the chat line announcing where it came from.
async fn select_move(
    ctx: &Arc<BotContext>,
    game: &OngoingGame,
    position: &Chess,
) -> Result<(String, String)> {
    if tuning::is_hurry(game.seconds_left) {
        // Under two minutes on the clock: skip the book, the evaluation
        // pass and the owner report, just move.
        return match hurry_move(ctx, game).await {
            Ok(uci) => {
                info!("game {}: hurry move {uci}", game.game_id);
                Ok((uci, String::new()))
            }
            Err(e) => {
                warn!("game {}: hurry engine failed ({e})", game.game_id);
                random_fallback(ctx, game, position).await
            }
        };
    }

    if let Some(book_move) = ctx.book.lookup(&game.fen) {
        if board::parse_move(position, book_move).is_some() {
            info!("game {}: book move {book_move}", game.game_id);
            ctx.notify(&format!(
                "Playing against: {} -- {}\nMove from the opening repertoire: {book_move}",
                game.opponent.username,
                opponent_rating(game)
            ))
            .await;
            return Ok((
                book_move.to_string(),
                "My move is from a human opening repertoire".to_string(),
            ));
        }
        warn!(
            "game {}: book move {book_move} is not legal here, ignoring",
            game.game_id
        );
    }

    match engine_move(ctx, game).await {
        Ok((uci, report)) => {
            info!("game {}: engine move {uci}", game.game_id);
            ctx.notify(&report).await;
            Ok((uci, "My move is from Stockfish".to_string()))
        }
        Err(e) => {
            warn!(
                "game {}: engine failed ({e}), falling back to a random legal move",
                game.game_id
            );
            random_fallback(ctx, game, position).await
        }
    }
}

async fn random_fallback(
    ctx: &Arc<BotContext>,
    game: &OngoingGame,
    position: &Chess,
) -> Result<(String, String)> {
    let uci = board::random_legal_move(position)
        .ok_or_else(|| Error::Chess("no legal moves in position".into()))?;
    ctx.notify(&format!(
        "Playing against: {}\nEngine failed, I moved random",
        game.opponent.username
    ))
    .await;
    Ok((uci, String::new()))
}

/// Low-clock move: fixed strong settings, no evaluation query.
async fn hurry_move(ctx: &Arc<BotContext>, game: &OngoingGame) -> Result<String> {
    let engine_path = ctx.config.engine_path.clone();
    let fen = game.fen.clone();

    tokio::task::spawn_blocking(move || -> Result<String> {
        let mut engine = UciEngine::new(&engine_path)?;
        engine.set_position(Some(&fen), &[])?;
        let options = tuning::hurry_options();
        engine.configure(&options)?;
        Ok(engine.search(&options)?.best_move)
    })
    .await
    .map_err(|e| Error::Task(e.to_string()))?
}

/// Runs the engine pipeline on a blocking thread: evaluate, tune, search.
async fn engine_move(ctx: &Arc<BotContext>, game: &OngoingGame) -> Result<(String, String)> {
    let overrides = ctx.db.lock().unwrap().overrides()?;
    let engine_path = ctx.config.engine_path.clone();
    let fen = game.fen.clone();
    let rating = opponent_rating(game);

    let (uci, cp, options) = tokio::task::spawn_blocking(
        move || -> Result<(String, i32, tuning::EngineOptions)> {
            let mut engine = UciEngine::new(&engine_path)?;
            engine.set_position(Some(&fen), &[])?;
            let cp = engine.evaluate()?.as_centipawns();

            let options = tuning::engine_options(rating, cp, &overrides);
            engine.configure(&options)?;
            let result = engine.search(&options)?;
            Ok((result.best_move, cp, options))
        },
    )
    .await
    .map_err(|e| Error::Task(e.to_string()))??;

    let report = format!(
        "Playing against: {} -- {}\nCP evaluation: {}\n{}",
        game.opponent.username,
        rating,
        cp / 100,
        options
    );
    Ok((uci, report))
}

/// Sends the move, falling back to one random legal move if Lichess
/// rejects it, then posts the chat line.
async fn submit(
    ctx: &Arc<BotContext>,
    game: &OngoingGame,
    position: &Chess,
    uci: &str,
    chat_line: &str,
) -> Result<()> {
    if let Err(e) = ctx.lichess.make_move(&game.game_id, uci).await {
        warn!("game {}: move {uci} rejected ({e})", game.game_id);
        let fallback = board::random_legal_move(position).ok_or(e)?;
        ctx.lichess.make_move(&game.game_id, &fallback).await?;
        ctx.notify(&format!(
            "Playing against: {}\nI moved random",
            game.opponent.username
        ))
        .await;
        return Ok(());
    }

    if !chat_line.is_empty() {
        if let Err(e) = ctx.lichess.post_chat(&game.game_id, chat_line).await {
            warn!("game {}: chat failed: {e}", game.game_id);
        }
    }
    Ok(())
}

async fn greet_if_new(ctx: &Arc<BotContext>, game: &OngoingGame) {
    let first_sight = ctx
        .greeted_games
        .lock()
        .unwrap()
        .insert(game.game_id.clone());
    if !first_sight {
        return;
    }

    let greeting = GREETINGS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(GREETINGS[0]);
    if let Err(e) = ctx.lichess.post_chat(&game.game_id, greeting).await {
        warn!("game {}: greeting failed: {e}", game.game_id);
    }
    ctx.notify(&format!(
        "New game vs {} ({})",
        game.opponent.username,
        opponent_rating(game)
    ))
    .await;
}

fn opponent_rating(game: &OngoingGame) -> u32 {
    game.opponent.rating.unwrap_or(DEFAULT_OPPONENT_RATING)
}

fn record(ctx: &Arc<BotContext>, game: &OngoingGame) {
    let moves_played = game.fullmove_number();
    if let Err(e) = ctx.db.lock().unwrap().upsert_game(game, moves_played) {
        warn!("game {}: could not record: {e}", game.game_id);
    }
}
