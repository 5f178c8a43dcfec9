//! Zero-Copy Slice Reader
//!
//! Parses XML from a byte slice with zero-copy semantics and enforces
//! document-level well-formedness on top of the tokenizer: matching end
//! tags, exactly one root element, and no character data outside it.

use super::events::{EndElement, StartElement, XmlEvent};
use crate::core::attributes::parse_attributes;
use crate::core::tokenizer::{ParseError, Token, TokenKind, Tokenizer};
use std::borrow::Cow;

/// Well-formedness checking XML reader over a byte slice
pub struct SliceReader<'a> {
    tokenizer: Tokenizer<'a>,
    /// Names of the currently open elements, outermost first
    open: Vec<&'a [u8]>,
    seen_root: bool,
    done: bool,
}

impl<'a> SliceReader<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        SliceReader {
            tokenizer: Tokenizer::new(input),
            open: Vec::with_capacity(8),
            seen_root: false,
            done: false,
        }
    }

    /// Current element nesting depth
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Get the next XML event; `EndDocument` once the input is exhausted
    pub fn next_event(&mut self) -> Result<XmlEvent<'a>, ParseError> {
        let result = self.read_event();
        if matches!(result, Ok(XmlEvent::EndDocument) | Err(_)) {
            self.done = true;
        }
        result
    }

    fn read_event(&mut self) -> Result<XmlEvent<'a>, ParseError> {
        loop {
            let token = self.tokenizer.next_token()?;
            let start = token.span.0;

            match token.kind {
                TokenKind::Eof => {
                    if let Some(name) = self.open.last() {
                        let msg = format!("Unclosed element <{}>", String::from_utf8_lossy(name));
                        return Err(self.tokenizer.error_at(msg, start));
                    }
                    if !self.seen_root {
                        return Err(self.tokenizer.error_at("No root element", start));
                    }
                    return Ok(XmlEvent::EndDocument);
                }

                TokenKind::StartTag | TokenKind::EmptyTag => {
                    if self.open.is_empty() && self.seen_root {
                        return Err(self.tokenizer.error_at("Multiple root elements", start));
                    }
                    self.seen_root = true;

                    let raw_name = token.name.unwrap_or_default();
                    let element = self.start_element(raw_name, &token)?;
                    if token.kind == TokenKind::StartTag {
                        self.open.push(raw_name);
                        return Ok(XmlEvent::StartElement(element));
                    }
                    return Ok(XmlEvent::EmptyElement(element));
                }

                TokenKind::EndTag => {
                    let raw_name = token.name.unwrap_or_default();
                    match self.open.pop() {
                        Some(expected) if expected == raw_name => {
                            let name = self.utf8(raw_name, start)?;
                            return Ok(XmlEvent::EndElement(EndElement::new(name)));
                        }
                        Some(expected) => {
                            let msg = format!(
                                "Mismatched end tag: expected </{}>, found </{}>",
                                String::from_utf8_lossy(expected),
                                String::from_utf8_lossy(raw_name)
                            );
                            return Err(self.tokenizer.error_at(msg, start));
                        }
                        None => return Err(self.tokenizer.error_at("Unexpected end tag", start)),
                    }
                }

                TokenKind::Text => {
                    let content = token.content.unwrap_or_default();
                    if self.open.is_empty() {
                        if content.iter().all(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r')) {
                            continue;
                        }
                        return Err(self.tokenizer.error_at("Text outside root element", start));
                    }
                    return Ok(XmlEvent::Text(self.utf8_cow(content, start)?));
                }

                TokenKind::CData => {
                    if self.open.is_empty() {
                        return Err(self.tokenizer.error_at("CDATA outside root element", start));
                    }
                    let content = token.content.unwrap_or_default();
                    return Ok(XmlEvent::CData(self.utf8_cow(content, start)?));
                }

                TokenKind::Comment => {
                    let content = token.content.unwrap_or_default();
                    return Ok(XmlEvent::Comment(self.utf8_cow(content, start)?));
                }

                TokenKind::ProcessingInstruction => {
                    let target = self.utf8(token.name.unwrap_or_default(), start)?;
                    let data = self.utf8(token.raw.unwrap_or_default(), start)?;
                    return Ok(XmlEvent::ProcessingInstruction {
                        target: Cow::Borrowed(target),
                        data: Cow::Borrowed(data.trim_start()),
                    });
                }

                TokenKind::XmlDeclaration => {
                    let attrs = match parse_attributes(token.raw.unwrap_or_default().trim_ascii_end()) {
                        Ok(attrs) => attrs,
                        Err(msg) => return Err(self.tokenizer.error_at(msg, start)),
                    };
                    let find = |key: &str| {
                        attrs.iter().find(|a| a.name == key).map(|a| a.value.clone())
                    };
                    return Ok(XmlEvent::XmlDeclaration {
                        version: find("version"),
                        encoding: find("encoding"),
                    });
                }

                TokenKind::DocType => {
                    if self.seen_root {
                        return Err(self.tokenizer.error_at("DOCTYPE after root element", start));
                    }
                    let content = self.utf8(token.raw.unwrap_or_default(), start)?;
                    return Ok(XmlEvent::DocType(Cow::Borrowed(content)));
                }
            }
        }
    }

    fn start_element(&mut self, raw_name: &'a [u8], token: &Token<'a>) -> Result<StartElement<'a>, ParseError> {
        let start = token.span.0;
        let name = self.utf8(raw_name, start)?;
        let attributes = match parse_attributes(token.raw.unwrap_or_default()) {
            Ok(attrs) => attrs,
            Err(msg) => return Err(self.tokenizer.error_at(msg, start)),
        };
        Ok(StartElement::new(name, attributes))
    }

    fn utf8(&mut self, bytes: &'a [u8], position: usize) -> Result<&'a str, ParseError> {
        std::str::from_utf8(bytes).map_err(|_| self.tokenizer.error_at("Invalid UTF-8", position))
    }

    fn utf8_cow(&mut self, bytes: Cow<'a, [u8]>, position: usize) -> Result<Cow<'a, str>, ParseError> {
        match bytes {
            Cow::Borrowed(b) => self.utf8(b, position).map(Cow::Borrowed),
            Cow::Owned(b) => String::from_utf8(b)
                .map(Cow::Owned)
                .map_err(|_| self.tokenizer.error_at("Invalid UTF-8", position)),
        }
    }
}

/// Yields events up to (not including) `EndDocument`; stops after the first error
impl<'a> Iterator for SliceReader<'a> {
    type Item = Result<XmlEvent<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_event() {
            Ok(XmlEvent::EndDocument) => None,
            other => Some(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(input: &[u8]) -> Result<Vec<XmlEvent<'_>>, ParseError> {
        SliceReader::new(input).collect()
    }

    #[test]
    fn test_simple_element() {
        let events = collect(b"<root>hello</root>").unwrap();
        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], XmlEvent::StartElement(e) if e.name == "root"));
        assert!(matches!(&events[1], XmlEvent::Text(t) if t == "hello"));
        assert!(matches!(&events[2], XmlEvent::EndElement(e) if e.name == "root"));
    }

    #[test]
    fn test_empty_element_attributes() {
        let events = collect(b"<concept name=\"c1\" score=\"0.8\"/>").unwrap();
        assert_eq!(events.len(), 1);
        match &events[0] {
            XmlEvent::EmptyElement(e) => {
                assert_eq!(e.attribute_at(0), Some("c1"));
                assert_eq!(e.attribute_at(1), Some("0.8"));
            }
            other => panic!("Expected EmptyElement, got {:?}", other),
        }
    }

    #[test]
    fn test_prolog_whitespace_skipped() {
        let events = collect(b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\n<root/>\n").unwrap();
        assert_eq!(events.len(), 2);
        match &events[0] {
            XmlEvent::XmlDeclaration { version, encoding } => {
                assert_eq!(version.as_deref(), Some("1.0"));
                assert_eq!(encoding.as_deref(), Some("UTF-8"));
            }
            other => panic!("Expected XmlDeclaration, got {:?}", other),
        }
    }

    #[test]
    fn test_comment_and_cdata() {
        let events = collect(b"<root><!-- note --><![CDATA[a<b]]></root>").unwrap();
        assert!(matches!(&events[1], XmlEvent::Comment(c) if c == " note "));
        assert!(matches!(&events[2], XmlEvent::CData(c) if c == "a<b"));
    }

    #[test]
    fn test_depth_tracking() {
        let mut reader = SliceReader::new(b"<a><b></b></a>");
        reader.next_event().unwrap();
        reader.next_event().unwrap();
        assert_eq!(reader.depth(), 2);
        reader.next_event().unwrap();
        assert_eq!(reader.depth(), 1);
    }

    #[test]
    fn test_mismatched_end_tag() {
        let err = collect(b"<root><user></lesson></root>").unwrap_err();
        assert!(err.message.contains("Mismatched end tag"), "{}", err);
    }

    #[test]
    fn test_structural_errors() {
        let bad: [&[u8]; 7] = [
            b"",
            b"   ",
            b"<root>",
            b"</root>",
            b"<a/><b/>",
            b"text<root/>",
            b"<root/><!DOCTYPE root>",
        ];
        for input in bad {
            assert!(
                collect(input).is_err(),
                "expected error for {:?}",
                String::from_utf8_lossy(input)
            );
        }
    }

    #[test]
    fn test_iterator_stops_after_error() {
        let mut reader = SliceReader::new(b"<a></b><c/>");
        assert!(reader.next().unwrap().is_ok());
        assert!(reader.next().unwrap().is_err());
        assert!(reader.next().is_none());
    }
}
