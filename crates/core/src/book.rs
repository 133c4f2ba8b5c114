//! Hand-made opening book
//!
//! The book is a small CSV of `Fen,Move` rows written by a human. The moves
//! are deliberately not engine-best lines; they give the bot an opening style
//! of its own before the engine takes over.

use std::fs;
use std::path::Path;

use crate::error::Result;

#[derive(Debug, Clone)]
struct BookEntry {
    fen: String,
    mv: String,
}

#[derive(Debug, Default)]
pub struct OpeningBook {
    entries: Vec<BookEntry>,
}

impl OpeningBook {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::parse(&fs::read_to_string(path)?))
    }

    /// Parses `Fen,Move` rows. A header row and blank lines are skipped.
    pub fn parse(text: &str) -> Self {
        let mut entries = Vec::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some((fen, mv)) = line.rsplit_once(',') else {
                continue;
            };
            let (fen, mv) = (fen.trim(), mv.trim());
            if fen.eq_ignore_ascii_case("fen") || fen.is_empty() || mv.is_empty() {
                continue;
            }
            entries.push(BookEntry {
                fen: fen.to_string(),
                mv: mv.to_string(),
            });
        }

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a move for the position. Only the board field of the FEN is
    /// matched, so move counters and castling rights do not have to agree
    /// with the stored row.
    pub fn lookup(&self, fen: &str) -> Option<&str> {
        let board = fen.split_whitespace().next()?;
        self.entries
            .iter()
            .find(|e| e.fen.contains(board))
            .map(|e| e.mv.as_str())
    }
}
