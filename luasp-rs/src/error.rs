//! Errors raised while interpreting a document.

use mlua::Error as LuaError;
use thiserror::Error;

/// Failure of a single [`crate::interpret`] call.
///
/// Lua errors are flattened to text so the error can leave the thread
/// that owned the interpreter.  Output written before the failure stays in
/// the destination.
#[derive(Debug, Error)]
pub enum Error {
    /// Lua rejected or failed while running a script region.
    ///
    /// `line` is the 1-based document line at which the region was
    /// dispatched.
    #[error("Interpreter error (line {line}): {message}")]
    Script {
        line: usize,
        message: String,
        /// The region did not parse.
        syntax: bool,
    },

    /// The Lua state could not be prepared.
    #[error("cannot start interpreter: {0}")]
    Setup(String),

    /// The destination refused output.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn script(line: usize, err: &LuaError) -> Self {
        Error::Script {
            line,
            message: err.to_string(),
            syntax: matches!(err, LuaError::SyntaxError { .. }),
        }
    }

    pub(crate) fn setup(err: &LuaError) -> Self {
        Error::Setup(err.to_string())
    }

    /// Document line of a script failure, if this is one.
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Script { line, .. } => Some(*line),
            _ => None,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
