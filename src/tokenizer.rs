//! Low-level character cursor the parser scans expressions with.
//!
//! This is the "segmenter" primitive: rather than materializing an intermediate list
//! of raw segments up front, the recursive-descent parser in `parser.rs` drives this
//! cursor directly, dispatching on the next character the way a segment classifier
//! would. Every position is tracked as a byte offset into the original string, which is
//! what `SyntaxError` reports back to the caller.

use crate::error::JsonPathError;

pub(crate) struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    pub(crate) fn offset(&self) -> usize {
        self.pos
    }

    pub(crate) fn rest(&self) -> &str {
        &self.input[self.pos..]
    }

    pub(crate) fn slice(&self, from: usize, to: usize) -> &str {
        &self.input[from..to]
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub(crate) fn peek2(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    pub(crate) fn starts_with(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    pub(crate) fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    pub(crate) fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    pub(crate) fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    pub(crate) fn expect(&mut self, expected: char) -> Result<(), JsonPathError> {
        if self.peek() == Some(expected) {
            self.advance();
            Ok(())
        } else {
            let found = self
                .peek()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "end of input".to_string());
            Err(JsonPathError::syntax(
                format!("expected '{expected}', found {found}"),
                self.pos,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_byte_offsets_across_multibyte_chars() {
        let mut cursor = Cursor::new("é.b");
        assert_eq!(cursor.advance(), Some('é'));
        assert_eq!(cursor.offset(), 'é'.len_utf8());
        assert_eq!(cursor.peek(), Some('.'));
    }

    #[test]
    fn expect_reports_offset_on_mismatch() {
        let mut cursor = Cursor::new("[abc");
        cursor.advance();
        let err = cursor.expect(']').unwrap_err();
        match err {
            JsonPathError::Syntax { offset, .. } => assert_eq!(offset, 1),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }
}
