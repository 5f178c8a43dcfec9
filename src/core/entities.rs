//! XML Entity Decoding
//!
//! Handles the five predefined entities (`&lt; &gt; &amp; &quot; &apos;`)
//! and numeric character references (`&#123; &#x7B;`).
//!
//! Uses Cow for zero-copy when no entities are present. Undeclared named
//! entities are errors: profile documents carry no DTD that could define them.

use memchr::memchr;
use std::borrow::Cow;

/// Decode entity references in text or attribute content
///
/// Returns Borrowed if no entities are present, Owned otherwise.
pub fn decode_text(input: &[u8]) -> Result<Cow<'_, [u8]>, &'static str> {
    // Fast path: nothing to decode
    if memchr(b'&', input).is_none() {
        return Ok(Cow::Borrowed(input));
    }
    decode_entities(input).map(Cow::Owned)
}

fn decode_entities(input: &[u8]) -> Result<Vec<u8>, &'static str> {
    let mut result = Vec::with_capacity(input.len());
    let mut pos = 0;

    while let Some(amp_offset) = memchr(b'&', &input[pos..]) {
        result.extend_from_slice(&input[pos..pos + amp_offset]);
        pos += amp_offset;

        let semi_offset = memchr(b';', &input[pos..]).ok_or("Entity reference missing ';'")?;
        let entity = &input[pos + 1..pos + semi_offset];
        let decoded = decode_entity(entity)?;

        let mut buf = [0u8; 4];
        result.extend_from_slice(decoded.encode_utf8(&mut buf).as_bytes());
        pos += semi_offset + 1;
    }
    result.extend_from_slice(&input[pos..]);

    Ok(result)
}

/// Decode a single entity body (without `&` and `;`)
fn decode_entity(entity: &[u8]) -> Result<char, &'static str> {
    match entity {
        b"" => Err("Empty entity reference"),
        b"lt" => Ok('<'),
        b"gt" => Ok('>'),
        b"amp" => Ok('&'),
        b"quot" => Ok('"'),
        b"apos" => Ok('\''),
        [b'#', digits @ ..] => decode_char_ref(digits).ok_or("Invalid character reference"),
        _ => Err("Undeclared entity reference"),
    }
}

/// Decode `#x41` / `#65` style references (the `#` already stripped)
fn decode_char_ref(digits: &[u8]) -> Option<char> {
    let codepoint = match digits {
        [b'x', hex @ ..] if !hex.is_empty() && hex.iter().all(u8::is_ascii_hexdigit) => {
            u32::from_str_radix(std::str::from_utf8(hex).ok()?, 16).ok()?
        }
        dec if !dec.is_empty() && dec.iter().all(u8::is_ascii_digit) => {
            std::str::from_utf8(dec).ok()?.parse::<u32>().ok()?
        }
        _ => return None,
    };

    if !is_valid_xml_char(codepoint) {
        return None;
    }
    char::from_u32(codepoint)
}

/// XML 1.0 `Char` production:
/// `#x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]`
#[inline]
pub fn is_valid_xml_char(codepoint: u32) -> bool {
    matches!(codepoint,
        0x9 | 0xA | 0xD |
        0x20..=0xD7FF |
        0xE000..=0xFFFD |
        0x10000..=0x10FFFF
    )
}

/// Reject ASCII control characters that XML 1.0 forbids
pub fn validate_xml_chars(content: &[u8]) -> Result<(), &'static str> {
    if content
        .iter()
        .any(|&b| b < 0x20 && !matches!(b, 0x9 | 0xA | 0xD))
    {
        return Err("Invalid XML character: control character not allowed");
    }
    Ok(())
}
