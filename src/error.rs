//! Error types and position tracking for scanning and parsing
//!
//! Two recoverable error kinds exist: running off the end of the buffer during a
//! mandatory advance, and a token that does not match what the parser expected.
//! Contract violations (malformed tokens, oversized numeric lexemes, offsets
//! outside the buffer) are not represented here; they panic.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Represents a position in the source buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
    /// Byte offset from start of input (0-based)
    pub offset: usize,
}

impl Position {
    /// Creates a new position at the start of input
    pub fn new() -> Self {
        Self {
            line: 1,
            column: 1,
            offset: 0,
        }
    }

    /// Creates a position with the given values
    pub fn at(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Error raised while scanning or while checking tokens
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A mandatory advance ran past the end of the buffer
    #[error("unexpected end of input [line {line}, column {column}]")]
    UnexpectedEof { line: usize, column: usize },

    /// Contextual error with a known source location
    #[error("{message} [line {line}, column {column}]")]
    At {
        message: String,
        line: usize,
        column: usize,
    },

    /// Error raised before any position is known
    #[error("{0}")]
    Message(String),
}

impl ParseError {
    /// Creates a contextual error at the given line and column
    pub fn at(message: impl Into<String>, line: usize, column: usize) -> Self {
        ParseError::At {
            message: message.into(),
            line,
            column,
        }
    }

    /// Creates a contextual error at the given position
    pub fn at_position(message: impl Into<String>, position: Position) -> Self {
        Self::at(message, position.line, position.column)
    }

    /// Creates a message-only error
    pub fn message(message: impl Into<String>) -> Self {
        ParseError::Message(message.into())
    }

    /// Returns the line the error refers to, if known
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::UnexpectedEof { line, .. } | ParseError::At { line, .. } => Some(*line),
            ParseError::Message(_) => None,
        }
    }

    /// Returns the column the error refers to, if known
    pub fn column(&self) -> Option<usize> {
        match self {
            ParseError::UnexpectedEof { column, .. } | ParseError::At { column, .. } => {
                Some(*column)
            }
            ParseError::Message(_) => None,
        }
    }

    /// Returns true for the end-of-input kind
    pub fn is_unexpected_eof(&self) -> bool {
        matches!(self, ParseError::UnexpectedEof { .. })
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_new() {
        let pos = Position::new();
        assert_eq!(pos.line, 1);
        assert_eq!(pos.column, 1);
        assert_eq!(pos.offset, 0);
        assert_eq!(pos, Position::default());
    }

    #[test]
    fn test_position_display() {
        assert_eq!(Position::at(3, 7, 42).to_string(), "3:7");
    }

    #[test]
    fn test_unexpected_eof_format() {
        let err = ParseError::UnexpectedEof { line: 2, column: 5 };
        assert_eq!(err.to_string(), "unexpected end of input [line 2, column 5]");
        assert!(err.is_unexpected_eof());
        assert_eq!(err.line(), Some(2));
        assert_eq!(err.column(), Some(5));
    }

    #[test]
    fn test_contextual_error_format() {
        let err = ParseError::at("Expected Integer, but got String", 4, 11);
        assert_eq!(
            err.to_string(),
            "Expected Integer, but got String [line 4, column 11]"
        );
        assert!(!err.is_unexpected_eof());
    }

    #[test]
    fn test_contextual_error_from_position() {
        let err = ParseError::at_position("bad", Position::at(9, 2, 100));
        assert_eq!(err.line(), Some(9));
        assert_eq!(err.column(), Some(2));
    }

    #[test]
    fn test_message_only_error() {
        let err = ParseError::message("no input given");
        assert_eq!(err.to_string(), "no input given");
        assert_eq!(err.line(), None);
        assert_eq!(err.column(), None);
    }
}
