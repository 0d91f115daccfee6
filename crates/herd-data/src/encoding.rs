//! Text decoding and delimiter detection

use crate::{DatasetError, Result};
use encoding_rs::{UTF_8, WINDOWS_1252};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Character encoding of an uploaded CSV file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    /// Strict UTF-8
    Utf8,
    /// ISO-8859-1, decoded as its Windows-1252 superset
    Latin1,
    /// UTF-8 when valid, Latin-1 otherwise
    #[default]
    Auto,
}

impl std::str::FromStr for TextEncoding {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Self::Utf8),
            "latin1" | "latin-1" | "iso-8859-1" | "windows-1252" | "cp1252" => Ok(Self::Latin1),
            "auto" => Ok(Self::Auto),
            other => Err(DatasetError::Encoding(format!("unknown encoding '{other}'"))),
        }
    }
}

/// Decode raw file bytes to text
///
/// A leading UTF-8 byte order mark is dropped for `Utf8` and `Auto`.
pub fn decode(bytes: &[u8], encoding: TextEncoding) -> Result<Cow<'_, str>> {
    match encoding {
        TextEncoding::Utf8 => decode_utf8(bytes).ok_or_else(|| {
            let valid_up_to = std::str::from_utf8(strip_bom(bytes))
                .err()
                .map(|e| e.valid_up_to())
                .unwrap_or(0);
            DatasetError::Encoding(format!("invalid UTF-8 at byte {valid_up_to}"))
        }),
        TextEncoding::Latin1 => Ok(WINDOWS_1252.decode_without_bom_handling(bytes).0),
        TextEncoding::Auto => match decode_utf8(bytes) {
            Some(text) => Ok(text),
            None => {
                tracing::debug!("input is not valid UTF-8, decoding as Latin-1");
                Ok(WINDOWS_1252.decode_without_bom_handling(bytes).0)
            }
        },
    }
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

fn decode_utf8(bytes: &[u8]) -> Option<Cow<'_, str>> {
    UTF_8.decode_without_bom_handling_and_without_replacement(strip_bom(bytes))
}

/// Pick the delimiter that occurs most often in the header line
///
/// Candidates are `,` `;` and tab; ties go to the comma.
pub fn detect_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or("");
    let mut best = (b',', header.matches(',').count());
    for candidate in [b';', b'\t'] {
        let count = header.matches(candidate as char).count();
        if count > best.1 {
            best = (candidate, count);
        }
    }
    best.0
}
