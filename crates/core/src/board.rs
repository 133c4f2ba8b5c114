//! Board-state helpers on top of shakmaty

use rand::seq::IndexedRandom;
use shakmaty::{fen::Fen, uci::UciMove, CastlingMode, Chess, Move, Position};

use crate::error::{Error, Result};

/// Parses a FEN into a playable position.
pub fn position_from_fen(fen: &str) -> Result<Chess> {
    let parsed: Fen = fen.parse().map_err(|e| Error::Chess(format!("bad FEN: {e}")))?;
    parsed
        .into_position(CastlingMode::Standard)
        .map_err(|e| Error::Chess(format!("illegal position: {e}")))
}

/// Replays a space-separated UCI move list from the starting position.
pub fn position_after_moves(moves: &str) -> Result<Chess> {
    let mut position = Chess::default();
    for token in moves.split_whitespace() {
        let mv = parse_move(&position, token)
            .ok_or_else(|| Error::Chess(format!("illegal move {token}")))?;
        position = position
            .play(mv)
            .map_err(|e| Error::Chess(e.to_string()))?;
    }
    Ok(position)
}

/// Parses a UCI move and checks that it is legal in the position.
pub fn parse_move(position: &Chess, uci: &str) -> Option<Move> {
    let uci: UciMove = uci.parse().ok()?;
    uci.to_move(position).ok()
}

/// Picks a random legal move, if the position has any.
pub fn random_legal_move(position: &Chess) -> Option<String> {
    let moves = position.legal_moves();
    let mv = moves.choose(&mut rand::rng())?;
    Some(mv.to_uci(CastlingMode::Standard).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    // Fool's mate, white to move and checkmated.
    const MATED: &str = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3";

    #[test]
    fn parses_starting_fen() {
        let position = position_from_fen(STARTPOS).unwrap();
        assert_eq!(position.legal_moves().len(), 20);
    }

    #[test]
    fn rejects_garbage_fen() {
        assert!(position_from_fen("not a fen").is_err());
    }

    #[test]
    fn replays_move_list() {
        let position = position_after_moves("e2e4 e7e5 g1f3").unwrap();
        assert_eq!(position.fullmoves().get(), 2);
    }

    #[test]
    fn replay_stops_on_illegal_move() {
        assert!(position_after_moves("e2e4 e2e4").is_err());
    }

    #[test]
    fn parse_move_checks_legality() {
        let position = Chess::default();
        assert!(parse_move(&position, "e2e4").is_some());
        assert!(parse_move(&position, "e2e5").is_none());
        assert!(parse_move(&position, "zzzz").is_none());
    }

    #[test]
    fn random_move_is_legal() {
        let position = Chess::default();
        let uci = random_legal_move(&position).unwrap();
        assert!(parse_move(&position, &uci).is_some());
    }

    #[test]
    fn no_random_move_when_mated() {
        let position = position_from_fen(MATED).unwrap();
        assert!(position.is_checkmate());
        assert!(random_legal_move(&position).is_none());
    }
}
