//! XML Attribute Parsing
//!
//! Parses the attribute section of a start tag into an ordered list.
//! Document order is preserved: profile elements are read positionally.

use super::entities::decode_text;
use super::scanner::{is_name_char, is_name_start_char, is_whitespace};
use memchr::memchr;
use std::borrow::Cow;

/// A parsed XML attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    /// Attribute name (may include namespace prefix)
    pub name: Cow<'a, str>,
    /// Attribute value (entities decoded, whitespace normalized)
    pub value: Cow<'a, str>,
}

impl<'a> Attribute<'a> {
    pub fn new(name: impl Into<Cow<'a, str>>, value: impl Into<Cow<'a, str>>) -> Self {
        Attribute {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Parse attributes from raw tag content (after the element name)
///
/// Input is the content between the element name and `>` or `/>`.
pub fn parse_attributes(input: &[u8]) -> Result<Vec<Attribute<'_>>, &'static str> {
    let mut attrs: Vec<Attribute<'_>> = Vec::new();
    let mut pos = 0;

    loop {
        let ws_start = pos;
        while pos < input.len() && is_whitespace(input[pos]) {
            pos += 1;
        }
        if pos >= input.len() {
            break;
        }
        if pos == ws_start {
            return Err("Whitespace required between attributes");
        }

        // Name
        let name_start = pos;
        if !is_name_start_char(input[pos]) {
            return Err("Attribute name must start with letter, underscore, or colon");
        }
        while pos < input.len() && is_name_char(input[pos]) {
            pos += 1;
        }
        let name = as_str(&input[name_start..pos])?;

        // '=' with optional surrounding whitespace
        while pos < input.len() && is_whitespace(input[pos]) {
            pos += 1;
        }
        if input.get(pos) != Some(&b'=') {
            return Err("Attribute value required");
        }
        pos += 1;
        while pos < input.len() && is_whitespace(input[pos]) {
            pos += 1;
        }

        // Quoted value
        let quote = match input.get(pos) {
            Some(&q @ (b'"' | b'\'')) => q,
            _ => return Err("Attribute value must be quoted"),
        };
        pos += 1;
        let close = memchr(quote, &input[pos..]).ok_or("Attribute value has mismatched quotes")?;
        let raw = &input[pos..pos + close];
        pos += close + 1;

        if memchr(b'<', raw).is_some() {
            return Err("Attribute value cannot contain '<'");
        }

        if attrs.iter().any(|a| a.name == name) {
            return Err("Duplicate attribute");
        }

        // Literal whitespace is normalized before references are decoded,
        // so `&#10;` and `&#9;` survive as written.
        let value = match normalize_whitespace(raw) {
            Cow::Borrowed(raw) => decode_text(raw)?,
            Cow::Owned(normalized) => Cow::Owned(decode_text(&normalized)?.into_owned()),
        };
        attrs.push(Attribute::new(name, into_str(value)?));
    }

    Ok(attrs)
}

/// Literal tab, newline and carriage return in attribute values become spaces
fn normalize_whitespace(raw: &[u8]) -> Cow<'_, [u8]> {
    if !raw.iter().any(|&b| matches!(b, b'\t' | b'\n' | b'\r')) {
        return Cow::Borrowed(raw);
    }
    Cow::Owned(
        raw.iter()
            .map(|&b| if matches!(b, b'\t' | b'\n' | b'\r') { b' ' } else { b })
            .collect(),
    )
}

fn into_str(value: Cow<'_, [u8]>) -> Result<Cow<'_, str>, &'static str> {
    match value {
        Cow::Borrowed(bytes) => as_str(bytes).map(Cow::Borrowed),
        Cow::Owned(bytes) => String::from_utf8(bytes)
            .map(Cow::Owned)
            .map_err(|_| "Invalid UTF-8 in attribute value"),
    }
}

fn as_str(bytes: &[u8]) -> Result<&str, &'static str> {
    std::str::from_utf8(bytes).map_err(|_| "Invalid UTF-8 in attribute")
}
