//! XML Tokenizer - State machine for XML token extraction
//!
//! Implements a pull-parser style tokenizer that extracts XML tokens:
//! - Element start/end/empty tags
//! - Text content (entities decoded)
//! - CDATA sections
//! - Comments
//! - Processing instructions and the XML declaration
//! - DOCTYPE declarations (skipped over, internal subset included)
//!
//! Lexical well-formedness is checked here; structural checks (tag
//! balance, single root) live in `reader::slice`.

use super::entities::{decode_text, validate_xml_chars};
use super::scanner::{is_whitespace, Scanner};
use std::borrow::Cow;
use std::fmt;

/// Current parsing state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// Initial state before parsing starts
    Init,
    /// Between markup constructs
    InsideText,
    /// Inside a markup construct (<...>)
    InsideMarkup,
    /// End of input reached, or an error was reported
    Done,
}

/// Type of XML token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Element start tag: <element>
    StartTag,
    /// Element end tag: </element>
    EndTag,
    /// Empty element: <element/>
    EmptyTag,
    /// Text content
    Text,
    /// CDATA section: <![CDATA[...]]>
    CData,
    /// Comment: <!--...-->
    Comment,
    /// Processing instruction: <?target ...?>
    ProcessingInstruction,
    /// XML declaration: <?xml ...?>
    XmlDeclaration,
    /// DOCTYPE declaration
    DocType,
    /// End of file
    Eof,
}

/// A lexed XML token
#[derive(Debug, Clone)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Raw span in input (start, end)
    pub span: (usize, usize),
    /// For tags and PIs: the name / target
    pub name: Option<&'a [u8]>,
    /// For start/empty tags: raw attribute section; for PIs: the data
    pub raw: Option<&'a [u8]>,
    /// For text/cdata/comments: the content (owned if entities were decoded)
    pub content: Option<Cow<'a, [u8]>>,
}

impl<'a> Token<'a> {
    fn new(kind: TokenKind, span: (usize, usize)) -> Self {
        Token {
            kind,
            span,
            name: None,
            raw: None,
            content: None,
        }
    }

    fn with_name(mut self, name: &'a [u8]) -> Self {
        self.name = Some(name);
        self
    }

    fn with_raw(mut self, raw: &'a [u8]) -> Self {
        self.raw = Some(raw);
        self
    }

    fn with_content(mut self, content: Cow<'a, [u8]>) -> Self {
        self.content = Some(content);
        self
    }
}

/// Well-formedness failure with its location in the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    /// Byte offset into the input
    pub position: usize,
    /// 1-based line of `position`
    pub line: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: usize, line: usize) -> Self {
        ParseError {
            message: message.into(),
            position,
            line,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (line {}, byte {})", self.message, self.line, self.position)
    }
}

impl std::error::Error for ParseError {}

/// XML tokenizer implementing a pull-parser pattern
pub struct Tokenizer<'a> {
    scanner: Scanner<'a>,
    state: ParseState,
    /// Offset of the first byte after an optional byte order mark
    document_start: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Tokenizer {
            scanner: Scanner::new(input),
            state: ParseState::Init,
            document_start: 0,
        }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    pub fn position(&self) -> usize {
        self.scanner.position()
    }

    /// Build an error at `position`; the tokenizer stops afterwards
    pub fn error_at(&mut self, message: impl Into<String>, position: usize) -> ParseError {
        self.state = ParseState::Done;
        ParseError::new(message, position, self.scanner.line_of(position))
    }

    fn error(&mut self, message: impl Into<String>) -> ParseError {
        let position = self.scanner.position();
        self.error_at(message, position)
    }

    /// Get the next token. `Eof` is returned once, then repeatedly.
    pub fn next_token(&mut self) -> Result<Token<'a>, ParseError> {
        if self.state == ParseState::Init {
            // Skip a UTF-8 byte order mark
            if self.scanner.starts_with(b"\xEF\xBB\xBF") {
                self.scanner.advance(3);
            }
            self.document_start = self.scanner.position();
            self.state = ParseState::InsideText;
        }

        if self.state == ParseState::Done || self.scanner.is_eof() {
            self.state = ParseState::Done;
            let end = self.scanner.position();
            return Ok(Token::new(TokenKind::Eof, (end, end)));
        }

        match self.scanner.peek() {
            Some(b'<') => self.parse_markup(),
            _ => self.parse_text(),
        }
    }

    /// Parse markup starting with '<'
    fn parse_markup(&mut self) -> Result<Token<'a>, ParseError> {
        let start = self.scanner.position();
        self.scanner.advance(1); // Skip '<'
        self.state = ParseState::InsideMarkup;

        let token = match self.scanner.peek() {
            Some(b'/') => self.parse_end_tag(start),
            Some(b'!') => self.parse_bang_markup(start),
            Some(b'?') => self.parse_pi(start),
            Some(_) => self.parse_start_tag(start),
            None => Err(self.error("Unexpected end of input after '<'")),
        }?;

        self.state = ParseState::InsideText;
        Ok(token)
    }

    /// Parse a start tag or empty element tag
    fn parse_start_tag(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        let name = match self.scanner.read_name() {
            Some(name) => name,
            None => return Err(self.error("Invalid element name: must start with letter, underscore, or colon")),
        };
        let attrs_start = self.scanner.position();

        let end = match self.scanner.find_tag_end_quoted() {
            Some(end) => end,
            None => return Err(self.error_at("Unterminated start tag", start)),
        };

        let is_empty = end > attrs_start && self.scanner.slice(end - 1, end) == b"/";
        let attrs_end = if is_empty { end - 1 } else { end };
        let raw = self.scanner.slice(attrs_start, attrs_end);

        if let Some(&b) = raw.first() {
            if !is_whitespace(b) {
                return Err(self.error_at("Invalid character in element name", attrs_start));
            }
        }
        if let Err(msg) = validate_xml_chars(raw) {
            return Err(self.error_at(msg, attrs_start));
        }

        self.scanner.set_position(end + 1);

        let kind = if is_empty { TokenKind::EmptyTag } else { TokenKind::StartTag };
        Ok(Token::new(kind, (start, end + 1)).with_name(name).with_raw(raw))
    }

    /// Parse an end tag
    fn parse_end_tag(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(1); // Skip '/'

        let name = match self.scanner.read_name() {
            Some(name) => name,
            None => return Err(self.error("Invalid element name in end tag")),
        };

        // Only whitespace may follow the name
        self.scanner.skip_whitespace();
        match self.scanner.peek() {
            Some(b'>') => {}
            Some(_) => return Err(self.error("End tag cannot have attributes or other content")),
            None => return Err(self.error_at("Unterminated end tag", start)),
        }
        self.scanner.advance(1);

        Ok(Token::new(TokenKind::EndTag, (start, self.scanner.position())).with_name(name))
    }

    /// Parse markup starting with '!' (comment, CDATA, DOCTYPE)
    fn parse_bang_markup(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(1); // Skip '!'

        if self.scanner.starts_with(b"--") {
            self.parse_comment(start)
        } else if self.scanner.starts_with(b"[CDATA[") {
            self.parse_cdata(start)
        } else if self.scanner.starts_with(b"DOCTYPE") {
            self.parse_doctype(start)
        } else {
            Err(self.error_at("Invalid declaration - expected comment, CDATA, or DOCTYPE", start))
        }
    }

    /// Parse a comment <!--...-->
    fn parse_comment(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(2); // Skip '--'
        let content_start = self.scanner.position();

        let end = match self.scanner.find_sequence(b"--") {
            Some(end) => end,
            None => return Err(self.error_at("Unterminated comment", start)),
        };
        if self.scanner.peek_at(end + 2 - content_start) != Some(b'>') {
            return Err(self.error_at("'--' not allowed inside comment", end));
        }

        let content = self.scanner.slice(content_start, end);
        if let Err(msg) = validate_xml_chars(content) {
            return Err(self.error_at(msg, content_start));
        }

        self.scanner.set_position(end + 3); // Skip '-->'
        Ok(Token::new(TokenKind::Comment, (start, end + 3)).with_content(Cow::Borrowed(content)))
    }

    /// Parse a CDATA section <![CDATA[...]]>
    fn parse_cdata(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(7); // Skip '[CDATA['
        let content_start = self.scanner.position();

        let end = match self.scanner.find_sequence(b"]]>") {
            Some(end) => end,
            None => return Err(self.error_at("Unterminated CDATA section", start)),
        };

        let content = self.scanner.slice(content_start, end);
        if let Err(msg) = validate_xml_chars(content) {
            return Err(self.error_at(msg, content_start));
        }

        self.scanner.set_position(end + 3); // Skip ']]>'
        Ok(Token::new(TokenKind::CData, (start, end + 3)).with_content(Cow::Borrowed(content)))
    }

    /// Skip a DOCTYPE declaration, including any internal subset
    fn parse_doctype(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(7); // Skip 'DOCTYPE'

        let mut depth = 0usize;
        let mut quote: Option<u8> = None;
        while let Some(b) = self.scanner.peek() {
            self.scanner.advance(1);
            match (quote, b) {
                (Some(q), _) if b == q => quote = None,
                (Some(_), _) => {}
                (None, b'"' | b'\'') => quote = Some(b),
                (None, b'[') => depth += 1,
                (None, b']') => depth = depth.saturating_sub(1),
                (None, b'>') if depth == 0 => {
                    let end = self.scanner.position();
                    return Ok(Token::new(TokenKind::DocType, (start, end))
                        .with_raw(self.scanner.slice(start, end)));
                }
                _ => {}
            }
        }

        Err(self.error_at("Unterminated DOCTYPE declaration", start))
    }

    /// Parse a processing instruction <?...?>
    fn parse_pi(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(1); // Skip '?'

        let name = match self.scanner.read_name() {
            Some(n) => n,
            None => return Err(self.error("Invalid processing instruction target")),
        };

        let is_xml_decl = name.eq_ignore_ascii_case(b"xml");
        if is_xml_decl && (name != b"xml" || start != self.document_start) {
            return Err(self.error_at("XML declaration allowed only at the start of the document", start));
        }

        match (self.scanner.peek(), self.scanner.peek_at(1)) {
            (Some(b), _) if is_whitespace(b) => {}
            (Some(b'?'), Some(b'>')) => {}
            (None, _) => return Err(self.error_at("Unterminated processing instruction", start)),
            _ => return Err(self.error("Invalid character after PI target name")),
        }

        let data_start = self.scanner.position();
        let end = match self.scanner.find_sequence(b"?>") {
            Some(end) => end,
            None => return Err(self.error_at("Unterminated processing instruction", start)),
        };
        let data = self.scanner.slice(data_start, end);
        self.scanner.set_position(end + 2); // Skip '?>'

        let kind = if is_xml_decl { TokenKind::XmlDeclaration } else { TokenKind::ProcessingInstruction };
        Ok(Token::new(kind, (start, end + 2)).with_name(name).with_raw(data))
    }

    /// Parse text content up to the next '<'
    fn parse_text(&mut self) -> Result<Token<'a>, ParseError> {
        let start = self.scanner.position();
        self.state = ParseState::InsideText;

        let end = self.scanner.find_tag_start().unwrap_or(start + self.scanner.remaining().len());
        let content = self.scanner.slice(start, end);

        if let Err(msg) = validate_xml_chars(content) {
            return Err(self.error_at(msg, start));
        }
        if let Some(offset) = Scanner::new(content).find_sequence(b"]]>") {
            return Err(self.error_at("']]>' not allowed in text content", start + offset));
        }

        let decoded = match decode_text(content) {
            Ok(decoded) => decoded,
            Err(msg) => return Err(self.error_at(msg, start)),
        };

        self.scanner.set_position(end);
        Ok(Token::new(TokenKind::Text, (start, end)).with_content(decoded))
    }
}

/// Iterator adapter: yields tokens until `Eof`, stopping after the first error
impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<Token<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == ParseState::Done {
            return None;
        }
        match self.next_token() {
            Ok(token) if token.kind == TokenKind::Eof => None,
            other => Some(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &[u8]) -> Vec<TokenKind> {
        Tokenizer::new(input).map(|t| t.unwrap().kind).collect()
    }

    #[test]
    fn test_simple_element() {
        let mut tok = Tokenizer::new(b"<root>content</root>");

        let t1 = tok.next_token().unwrap();
        assert_eq!(t1.kind, TokenKind::StartTag);
        assert_eq!(t1.name, Some(b"root" as &[u8]));

        let t2 = tok.next_token().unwrap();
        assert_eq!(t2.kind, TokenKind::Text);
        assert_eq!(t2.content.as_deref(), Some(b"content" as &[u8]));

        let t3 = tok.next_token().unwrap();
        assert_eq!(t3.kind, TokenKind::EndTag);
        assert_eq!(t3.name, Some(b"root" as &[u8]));

        assert_eq!(tok.next_token().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn test_empty_element_with_attributes() {
        let mut tok = Tokenizer::new(b"<concept name=\"c1\" score=\"\"/>");
        let t = tok.next_token().unwrap();
        assert_eq!(t.kind, TokenKind::EmptyTag);
        assert_eq!(t.name, Some(b"concept" as &[u8]));
        assert_eq!(t.raw, Some(b" name=\"c1\" score=\"\"" as &[u8]));
    }

    #[test]
    fn test_prolog_tokens() {
        let input = b"<?xml version=\"1.0\"?>\n<!DOCTYPE root [<!ELEMENT root ANY>]>\n<!-- c --><root/>";
        assert_eq!(
            kinds(input),
            vec![
                TokenKind::XmlDeclaration,
                TokenKind::Text,
                TokenKind::DocType,
                TokenKind::Text,
                TokenKind::Comment,
                TokenKind::EmptyTag,
            ]
        );
    }

    #[test]
    fn test_declaration_after_byte_order_mark() {
        let input = b"\xEF\xBB\xBF<?xml version=\"1.0\"?><root/>";
        assert_eq!(kinds(input), vec![TokenKind::XmlDeclaration, TokenKind::EmptyTag]);

        let late = b"\xEF\xBB\xBF <?xml version=\"1.0\"?><root/>";
        assert!(Tokenizer::new(late).any(|t| t.is_err()));
    }

    #[test]
    fn test_cdata() {
        let mut tok = Tokenizer::new(b"<![CDATA[<user>]]>");
        let t = tok.next_token().unwrap();
        assert_eq!(t.kind, TokenKind::CData);
        assert_eq!(t.content.as_deref(), Some(b"<user>" as &[u8]));
    }

    #[test]
    fn test_text_entities_decoded() {
        let mut tok = Tokenizer::new(b"a &amp; b");
        let t = tok.next_token().unwrap();
        assert_eq!(t.content.as_deref(), Some(b"a & b" as &[u8]));
    }

    #[test]
    fn test_errors_report_line() {
        let mut tok = Tokenizer::new(b"<root>\n<user id=\"u1\"\n");
        tok.next_token().unwrap();
        tok.next_token().unwrap();
        let err = tok.next_token().unwrap_err();
        assert_eq!(err.message, "Unterminated start tag");
        assert_eq!(err.line, 2);
        assert_eq!(tok.state(), ParseState::Done);
    }

    #[test]
    fn test_lexical_errors() {
        let bad: [&[u8]; 7] = [
            b"<1abc/>",
            b"</root x>",
            b"<!-- a -- b -->",
            b"<root/> <?xml version=\"1.0\"?>",
            b"<!ENTITY x>",
            b"a ]]> b",
            b"&bogus;",
        ];
        for input in bad {
            assert!(
                Tokenizer::new(input).any(|t| t.is_err()),
                "expected error for {:?}",
                String::from_utf8_lossy(input)
            );
        }
    }

    #[test]
    fn test_name_followed_by_garbage() {
        let mut tok = Tokenizer::new(b"<user\"x\">");
        assert!(tok.next_token().is_err());
    }
}
