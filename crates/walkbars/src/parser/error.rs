//! Parse error types for Handlebars templates.

use thiserror::Error;

/// An error that occurred during parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A syntax error with location information.
    #[error("syntax error at {line}:{column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        /// Byte offset of the error within the template.
        offset: usize,
        message: String,
    },
}

impl ParseError {
    /// Byte offset of the error within the template.
    pub fn offset(&self) -> usize {
        match self {
            ParseError::Syntax { offset, .. } => *offset,
        }
    }

    /// The message without the position prefix.
    pub fn message(&self) -> &str {
        match self {
            ParseError::Syntax { message, .. } => message,
        }
    }
}

/// A message attached to a cut parse failure.
#[derive(Debug, Error)]
#[error("{0}")]
pub(crate) struct SyntaxMessage(pub(crate) String);
