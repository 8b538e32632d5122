//! Diagnostics for the scriptfcns compiler
//!
//! Every failure inside the scanner is a [`SyntaxError`]: a bare reason string
//! raised by the type resolver, the argument parser, the macro expander or a
//! directive handler. The scanner attaches the file and line before it leaves
//! the crate as a [`CompilerError::Syntax`].

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A malformed or out-of-context construct, without position information.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct SyntaxError {
    pub reason: String,
}

impl SyntaxError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Shorthand used by every scanning stage.
pub type SyntaxResult<T> = Result<T, SyntaxError>;

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILER ERROR
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum CompilerError {
    #[error("{file}:{line}: Syntax Error: {reason}")]
    Syntax {
        file: String,
        line: usize,
        reason: String,
        /// The offending input line, as read.
        source_line: String,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("{0}")]
    Usage(String),
}

impl CompilerError {
    pub fn syntax(file: &str, line: usize, source_line: &str, err: SyntaxError) -> Self {
        CompilerError::Syntax {
            file: file.to_string(),
            line,
            reason: err.reason,
            source_line: source_line.trim_end_matches(['\r', '\n']).to_string(),
        }
    }

    /// The input line that triggered a syntax error, if any.
    pub fn context(&self) -> Option<&str> {
        match self {
            CompilerError::Syntax { source_line, .. } => Some(source_line),
            _ => None,
        }
    }
}
