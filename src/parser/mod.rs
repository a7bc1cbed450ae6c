//! Low-level parsing infrastructure for reading trees.
//!
//! Provides the byte-level [ByteParser](byte_parser::ByteParser) used by the
//! Newick reader, and [ParsingError] for reporting failures with context.

pub mod byte_parser;
pub mod parsing_error;

pub use parsing_error::{ParsingError, ParsingErrorType};
