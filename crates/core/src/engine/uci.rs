//! UCI engine subprocess driver
//!
//! Spawns the configured engine binary (Stockfish in practice) and drives it
//! over the UCI text protocol on stdin/stdout. All calls block; callers on
//! the async side wrap them in `spawn_blocking`.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use super::{EngineOptions, Evaluation};

/// Movetime used when asking the engine how the position stands.
const EVAL_MOVETIME_MS: u64 = 2000;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("failed to start engine: {0}")]
    Spawn(String),

    #[error("engine I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("engine protocol error: {0}")]
    Protocol(String),
}

/// Outcome of a search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub best_move: String,
    pub evaluation: Evaluation,
    pub depth: u8,
    pub nodes: u64,
    pub time_ms: u64,
}

impl SearchResult {
    fn empty() -> Self {
        SearchResult {
            best_move: String::new(),
            evaluation: Evaluation::Centipawns(0),
            depth: 0,
            nodes: 0,
            time_ms: 0,
        }
    }
}

pub struct UciEngine {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl UciEngine {
    /// Spawns the engine and completes the UCI handshake.
    pub fn new(path: &str) -> Result<Self, EngineError> {
        let mut process = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| EngineError::Spawn(format!("{path}: {e}")))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| EngineError::Spawn("failed to open stdin".into()))?;
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| EngineError::Spawn("failed to open stdout".into()))?;

        let mut engine = UciEngine {
            process,
            stdin,
            stdout: BufReader::new(stdout),
        };
        engine.handshake()?;
        debug!("engine up: {path}");
        Ok(engine)
    }

    fn send(&mut self, cmd: &str) -> Result<(), EngineError> {
        writeln!(self.stdin, "{cmd}")?;
        self.stdin.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<String, EngineError> {
        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(EngineError::Protocol("engine closed its stdout".into()));
        }
        Ok(line.trim().to_string())
    }

    fn read_until(&mut self, expected: &str) -> Result<(), EngineError> {
        loop {
            if self.read_line()?.starts_with(expected) {
                return Ok(());
            }
        }
    }

    fn handshake(&mut self) -> Result<(), EngineError> {
        self.send("uci")?;
        self.read_until("uciok")?;
        self.send("isready")?;
        self.read_until("readyok")?;
        Ok(())
    }

    pub fn set_option(&mut self, name: &str, value: &str) -> Result<(), EngineError> {
        self.send(&format!("setoption name {name} value {value}"))
    }

    /// Applies the tuned options before a search.
    pub fn configure(&mut self, options: &EngineOptions) -> Result<(), EngineError> {
        self.set_option("Hash", &options.hash_mb.to_string())?;
        self.set_option("Threads", &options.threads.to_string())?;
        self.set_option("Skill Level", &options.skill_level.to_string())?;
        self.send("isready")?;
        self.read_until("readyok")?;
        Ok(())
    }

    /// Loads a position from a FEN (or the start position) plus moves.
    pub fn set_position(&mut self, fen: Option<&str>, moves: &[String]) -> Result<(), EngineError> {
        let pos = match fen {
            Some(f) => format!("position fen {f}"),
            None => "position startpos".to_string(),
        };
        let cmd = if moves.is_empty() {
            pos
        } else {
            format!("{pos} moves {}", moves.join(" "))
        };
        self.send(&cmd)
    }

    /// Asks for the side-to-move evaluation at a fixed movetime.
    pub fn evaluate(&mut self) -> Result<Evaluation, EngineError> {
        let result = self.go(&format!("go movetime {EVAL_MOVETIME_MS}"))?;
        Ok(result.evaluation)
    }

    /// Searches under the tuned limits and returns the best move found.
    pub fn search(&mut self, options: &EngineOptions) -> Result<SearchResult, EngineError> {
        self.go(&format!(
            "go movetime {} depth {}",
            options.movetime_ms, options.depth
        ))
    }

    fn go(&mut self, cmd: &str) -> Result<SearchResult, EngineError> {
        self.send(cmd)?;

        let mut result = SearchResult::empty();
        loop {
            let line = self.read_line()?;
            if let Some(rest) = line.strip_prefix("bestmove") {
                match rest.split_whitespace().next() {
                    Some("(none)") | None => {
                        return Err(EngineError::Protocol("no best move".into()));
                    }
                    Some(mv) => result.best_move = mv.to_string(),
                }
                debug!(
                    "bestmove {} ({} @ depth {})",
                    result.best_move, result.evaluation, result.depth
                );
                return Ok(result);
            }
            if line.starts_with("info") {
                parse_info_line(&line, &mut result);
            }
        }
    }

    pub fn quit(&mut self) -> Result<(), EngineError> {
        self.send("quit")?;
        std::thread::sleep(Duration::from_millis(100));
        let _ = self.process.kill();
        Ok(())
    }
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        let _ = self.quit();
    }
}

/// Pulls score, depth, nodes and time out of a UCI `info` line.
fn parse_info_line(line: &str, result: &mut SearchResult) {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let mut i = 0;

    while i < parts.len() {
        match parts[i] {
            "depth" => {
                if let Some(v) = parts.get(i + 1).and_then(|p| p.parse().ok()) {
                    result.depth = v;
                }
                i += 2;
            }
            "score" => {
                if let (Some(kind), Some(value)) = (parts.get(i + 1), parts.get(i + 2)) {
                    match (*kind, value.parse::<i32>()) {
                        ("cp", Ok(cp)) => result.evaluation = Evaluation::Centipawns(cp),
                        ("mate", Ok(m)) => result.evaluation = Evaluation::Mate(m),
                        _ => {}
                    }
                }
                i += 3;
            }
            "nodes" => {
                if let Some(v) = parts.get(i + 1).and_then(|p| p.parse().ok()) {
                    result.nodes = v;
                }
                i += 2;
            }
            "time" => {
                if let Some(v) = parts.get(i + 1).and_then(|p| p.parse().ok()) {
                    result.time_ms = v;
                }
                i += 2;
            }
            _ => i += 1,
        }
    }
}
