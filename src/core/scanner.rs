//! Byte scanner over XML input
//!
//! Delimiter searches go through memchr, which picks SSE2/AVX2/NEON
//! at runtime where available.

use memchr::{memchr, memchr3, memchr_iter};

/// Cursor over the raw document bytes
pub struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    #[inline]
    pub fn new(input: &'a [u8]) -> Self {
        Scanner { input, pos: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.input.len());
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    #[inline]
    pub fn remaining(&self) -> &'a [u8] {
        &self.input[self.pos..]
    }

    #[inline]
    pub fn slice(&self, start: usize, end: usize) -> &'a [u8] {
        &self.input[start..end]
    }

    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    #[inline]
    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    #[inline]
    pub fn starts_with(&self, needle: &[u8]) -> bool {
        self.input[self.pos..].starts_with(needle)
    }

    /// Skip XML whitespace (space, tab, newline, carriage return)
    #[inline]
    pub fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.pos += 1;
        }
    }

    /// Absolute position of the next `byte`, if any
    #[inline]
    pub fn find_byte(&self, byte: u8) -> Option<usize> {
        memchr(byte, &self.input[self.pos..]).map(|i| self.pos + i)
    }

    /// Absolute position of the next `<`, if any
    #[inline]
    pub fn find_tag_start(&self) -> Option<usize> {
        self.find_byte(b'<')
    }

    /// Absolute position of the next occurrence of `needle`
    pub fn find_sequence(&self, needle: &[u8]) -> Option<usize> {
        let first = *needle.first()?;
        let mut from = self.pos;
        while let Some(i) = memchr(first, &self.input[from..]) {
            let at = from + i;
            if self.input[at..].starts_with(needle) {
                return Some(at);
            }
            from = at + 1;
        }
        None
    }

    /// Find the `>` that closes the current tag, skipping quoted attribute values
    pub fn find_tag_end_quoted(&self) -> Option<usize> {
        let mut pos = self.pos;
        loop {
            let i = memchr3(b'>', b'"', b'\'', &self.input[pos..])?;
            let at = pos + i;
            match self.input[at] {
                b'>' => return Some(at),
                quote => {
                    let close = memchr(quote, &self.input[at + 1..])?;
                    pos = at + 1 + close + 1;
                }
            }
        }
    }

    /// Read an XML name at the current position
    pub fn read_name(&mut self) -> Option<&'a [u8]> {
        let start = self.pos;
        if !is_name_start_char(self.peek()?) {
            return None;
        }
        self.pos += 1;
        while self.peek().is_some_and(is_name_char) {
            self.pos += 1;
        }
        Some(&self.input[start..self.pos])
    }

    /// 1-based line number of a byte offset
    pub fn line_of(&self, offset: usize) -> usize {
        let end = offset.min(self.input.len());
        memchr_iter(b'\n', &self.input[..end]).count() + 1
    }
}

/// ASCII letters, underscore, colon, and any non-ASCII (UTF-8) byte
#[inline]
pub fn is_name_start_char(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':') || b >= 0x80
}

#[inline]
pub fn is_name_char(b: u8) -> bool {
    is_name_start_char(b) || matches!(b, b'0'..=b'9' | b'-' | b'.')
}

#[inline]
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}
