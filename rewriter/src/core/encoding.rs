//! Text decoding with a single fallback encoding.
//!
//! Files are decoded as UTF-8 (a leading byte-order mark is remembered and
//! restored on encode). Anything that is not valid UTF-8 is decoded as
//! ISO-8859-1, which maps every byte to a code point, and is written back in
//! the same encoding so untouched bytes survive a rewrite unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    Utf8,
    Utf8Bom,
    Latin1,
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Utf8Bom => "utf-8 (bom)",
            TextEncoding::Latin1 => "iso-8859-1",
        };
        f.write_str(label)
    }
}

/// Transformed text cannot be written back in the file's encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("character {ch:?} at byte {offset} is not representable in {encoding}")]
pub struct EncodeError {
    pub ch: char,
    pub offset: usize,
    pub encoding: TextEncoding,
}

pub fn decode(bytes: &[u8]) -> (String, TextEncoding) {
    if let Some(rest) = bytes.strip_prefix(UTF8_BOM)
        && let Ok(text) = std::str::from_utf8(rest)
    {
        return (text.to_string(), TextEncoding::Utf8Bom);
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => (text.to_string(), TextEncoding::Utf8),
        Err(_) => (
            bytes.iter().map(|&b| char::from(b)).collect(),
            TextEncoding::Latin1,
        ),
    }
}

pub fn encode(text: &str, encoding: TextEncoding) -> Result<Vec<u8>, EncodeError> {
    match encoding {
        TextEncoding::Utf8 => Ok(text.as_bytes().to_vec()),
        TextEncoding::Utf8Bom => {
            let mut out = Vec::with_capacity(UTF8_BOM.len() + text.len());
            out.extend_from_slice(UTF8_BOM);
            out.extend_from_slice(text.as_bytes());
            Ok(out)
        }
        TextEncoding::Latin1 => text
            .char_indices()
            .map(|(offset, ch)| {
                u8::try_from(u32::from(ch)).map_err(|_| EncodeError {
                    ch,
                    offset,
                    encoding,
                })
            })
            .collect(),
    }
}
