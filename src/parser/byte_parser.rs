//! Low-level byte-by-byte parser for ASCII text.
//!
//! [ByteParser] supports peeking, consuming, comment skipping and quote-aware
//! label parsing. It is the foundation of the Newick reader.

use crate::parser::parsing_error::ParsingError;

// =#========================================================================#=
// BYTE PARSER
// =#========================================================================#=
/// A byte-by-byte parser over in-memory ASCII text.
///
/// # Example
/// ```
/// use flexclock::parser::byte_parser::ByteParser;
///
/// let mut parser = ByteParser::for_str("  [comment] (A,B);");
/// parser.skip_comment_and_whitespace().unwrap();
/// assert!(parser.consume_if(b'('));
/// assert_eq!(parser.parse_label(b"(,:;)").unwrap(), "A");
/// ```
pub struct ByteParser {
    input: Vec<u8>,
    pos: usize,
}

impl ByteParser {
    /// Creates a new `ByteParser` owning the given bytes.
    pub fn new(input: Vec<u8>) -> Self {
        Self { input, pos: 0 }
    }

    /// Creates a new `ByteParser` from a string by copying it.
    pub fn for_str(input: &str) -> Self {
        Self::new(input.as_bytes().to_vec())
    }

    /// Peeks at the current byte without consuming it; `None` at EOF.
    #[inline(always)]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Gets the current byte and advances the position; `None` at EOF.
    #[inline(always)]
    pub fn next(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    /// Skips all consecutive whitespace (space, tab, newline, carriage return).
    pub fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.pos += 1;
        }
    }

    /// Skips a square-bracket comment `[...]` if present.
    ///
    /// # Returns
    /// * `Ok(true)` - A comment was found and consumed
    /// * `Ok(false)` - No comment at current position
    /// * `Err(ParsingError)` - Comment was opened but never closed
    pub fn skip_comment(&mut self) -> Result<bool, ParsingError> {
        if !self.consume_if(b'[') {
            return Ok(false);
        }

        while let Some(b) = self.next() {
            if b == b']' {
                return Ok(true);
            }
        }
        Err(ParsingError::unclosed_comment(self))
    }

    /// Skips all consecutive whitespace and comments.
    pub fn skip_comment_and_whitespace(&mut self) -> Result<(), ParsingError> {
        self.skip_whitespace();
        while self.skip_comment()? {
            self.skip_whitespace();
        }
        Ok(())
    }

    /// Checks if the current byte matches `ch`.
    pub fn peek_is(&self, ch: u8) -> bool {
        self.peek() == Some(ch)
    }

    /// Consumes the current byte if it matches `ch`.
    pub fn consume_if(&mut self, ch: u8) -> bool {
        if self.peek_is(ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Returns whether the end of data has been reached.
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Returns the current byte offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns up to `k` bytes from the current position as string, for error context.
    ///
    /// Invalid UTF-8 sequences are replaced with the Unicode replacement character.
    pub fn context(&self, k: usize) -> String {
        let end = (self.pos + k).min(self.input.len());
        String::from_utf8_lossy(&self.input[self.pos.min(end)..end]).into_owned()
    }

    /// Parses a label, quoted (single quotes) or unquoted up to one of `delimiters`.
    pub fn parse_label(&mut self, delimiters: &[u8]) -> Result<String, ParsingError> {
        self.skip_comment_and_whitespace()?;

        if self.peek_is(b'\'') {
            self.parse_quoted_label()
        } else {
            Ok(self.parse_unquoted_label(delimiters))
        }
    }

    /// Parses a label enclosed in single quotes; doubled quotes escape a quote
    /// (e.g., `'Wilson''s'` becomes `Wilson's`).
    fn parse_quoted_label(&mut self) -> Result<String, ParsingError> {
        self.next(); // consume opening '

        let mut label = String::new();
        loop {
            match self.next() {
                Some(b'\'') if self.peek_is(b'\'') => {
                    label.push('\'');
                    self.next();
                }
                Some(b'\'') => return Ok(label),
                Some(b) => label.push(b as char),
                None => return Err(ParsingError::unexpected_eof(self)),
            }
        }
    }

    fn parse_unquoted_label(&mut self, delimiters: &[u8]) -> String {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if delimiters.contains(&b) {
                break;
            }
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.input[start..self.pos]).into_owned()
    }

    /// Parses a floating point number, e.g. `0.25` or `1.5e-10`.
    pub fn parse_number(&mut self) -> Result<f64, ParsingError> {
        let start = self.pos;
        while let Some(b'0'..=b'9' | b'.' | b'-' | b'+' | b'e' | b'E') = self.peek() {
            self.pos += 1;
        }
        let text = String::from_utf8_lossy(&self.input[start..self.pos]).into_owned();
        text.parse()
            .map_err(|_| ParsingError::invalid_newick_string(self, format!("Invalid number: '{text}'")))
    }
}
