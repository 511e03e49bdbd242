//! Error taxonomy. Matches `codescope`'s own convention of small hand-rolled
//! error types rather than pulling in `thiserror`/`anyhow` — see `spec.md`
//! §7 for the taxonomy this mirrors.

use std::fmt;

#[derive(Debug)]
pub enum EngineError {
    /// A format collaborator failed to produce a valid tree. The engine
    /// itself already retries with the Text fallback before this is
    /// surfaced — by the time a caller sees this, the fallback also failed.
    Parse(String),
    /// Caller-supplied option is out of range: non-positive temperature,
    /// zero-area budget, or an invalid grep regex.
    InvalidOption(String),
    /// Raised only by external collaborators (CLI file reads); the engine
    /// itself never touches the filesystem.
    Io(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Parse(msg) => write!(f, "parse error: {msg}"),
            EngineError::InvalidOption(msg) => write!(f, "invalid option: {msg}"),
            EngineError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}

pub type EngineResult<T> = Result<T, EngineError>;
