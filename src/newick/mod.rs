//! Newick reader for binary time trees.
//!
//! # Quick API
//! * [`parse_str`] - reads a single Newick string into a [`TimeTree`]
//! * [`parse_file`] - reads a file of semicolon-terminated Newick strings
//!
//! # Full API
//! Configure a [`NewickReader`] and provide a [`ByteParser`].
//!
//! # Format
//! * `tree ::= '(' vertex ',' vertex ')' [branch_length] ';'`
//! * `vertex ::= leaf | '(' vertex ',' vertex ')' branch_length`
//! * `leaf ::= label branch_length`
//! * `branch_length ::= ':' number`
//!
//! Whitespace and `[...]` comments may appear between elements. Labels may be
//! single-quoted, with `''` escaping a quote.

mod reader;

pub use self::reader::NewickReader;

use crate::model::TimeTree;
use crate::parser::ParsingError;
use crate::parser::byte_parser::ByteParser;
use std::path::Path;

/// Reads a single Newick string into a [`TimeTree`].
///
/// # Example
/// ```
/// use flexclock::model::RootedTree;
/// use flexclock::newick::parse_str;
///
/// let tree = parse_str("((A:1,B:1):1,(C:0.5,D:0.5):1.5);").unwrap();
/// assert_eq!(tree.num_leaves(), 4);
/// assert_eq!(tree.height(tree.root()), 2.0);
/// ```
pub fn parse_str<S: AsRef<str>>(newick: S) -> Result<TimeTree, ParsingError> {
    let mut byte_parser = ByteParser::for_str(newick.as_ref());
    NewickReader::new().read_tree(&mut byte_parser)
}

/// Reads all trees of a file containing semicolon-terminated Newick strings.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Vec<TimeTree>, ParsingError> {
    let contents = std::fs::read(path)?;
    NewickReader::new().read_all(ByteParser::new(contents))
}
