//! Error types for the Newick reader.
//!
//! [ParsingError] couples a [ParsingErrorType] with the position and the
//! surrounding bytes at which parsing failed.

use crate::parser::byte_parser::ByteParser;
use thiserror::Error;

/// Default length of context provided by error from parser
const DEFAULT_CONTEXT_LENGTH: usize = 50;

// =#========================================================================#=
// PARSING ERROR TYPE
// =#========================================================================#=
/// Error types that can occur while reading trees.
#[derive(Error, PartialEq, Debug, Clone)]
pub enum ParsingErrorType {
    #[error("IO error - {0}")]
    IoError(String),
    #[error("Unexpected end of file")]
    UnexpectedEOF,
    #[error("Unclosed comment")]
    UnclosedComment,
    #[error("Invalid newick string: {0}")]
    InvalidNewickString(String),
    #[error("Invalid tree structure - {0}")]
    InvalidTreeStructure(String),
}

// =#========================================================================#=
// PARSING ERROR
// =#========================================================================#=
/// Parsing error with contextual information (position and surrounding bytes).
#[derive(Error, Debug, Clone)]
#[error("{kind} at position {position}{}", render_context(.context))]
pub struct ParsingError {
    kind: ParsingErrorType,
    position: usize,
    context: String,
}

fn render_context(context: &str) -> String {
    if context.is_empty() {
        String::new()
    } else {
        format!("\n  Context (next {} bytes): {}", context.len(), context)
    }
}

impl ParsingError {
    /// Create a ParsingError from an error type and parser state
    pub fn from_parser(kind: ParsingErrorType, parser: &ByteParser) -> Self {
        Self {
            kind,
            position: parser.position(),
            context: parser.context(DEFAULT_CONTEXT_LENGTH),
        }
    }

    /// Convenience constructor for UnexpectedEOF
    pub fn unexpected_eof(parser: &ByteParser) -> Self {
        Self::from_parser(ParsingErrorType::UnexpectedEOF, parser)
    }

    /// Convenience constructor for UnclosedComment
    pub fn unclosed_comment(parser: &ByteParser) -> Self {
        Self::from_parser(ParsingErrorType::UnclosedComment, parser)
    }

    /// Convenience constructor for InvalidNewickString
    pub fn invalid_newick_string(parser: &ByteParser, msg: String) -> Self {
        Self::from_parser(ParsingErrorType::InvalidNewickString(msg), parser)
    }

    /// Create a ParsingError without parser context (for structural errors)
    pub fn without_context(kind: ParsingErrorType) -> Self {
        Self { kind, position: 0, context: String::new() }
    }

    /// Get the error kind
    pub fn kind(&self) -> &ParsingErrorType {
        &self.kind
    }

    /// Get the position where the error occurred
    pub fn position(&self) -> usize {
        self.position
    }
}

impl From<std::io::Error> for ParsingError {
    fn from(err: std::io::Error) -> Self {
        Self::without_context(ParsingErrorType::IoError(err.to_string()))
    }
}
