use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::error::{Result, SubtransError};

/// How subtitle bytes are turned into text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextEncoding {
    /// Strict UTF-8, a leading byte-order mark is tolerated
    #[serde(rename = "utf-8")]
    Utf8,
    /// Sniff byte-order marks, then try UTF-8, then fall back to Latin-1
    #[serde(rename = "auto")]
    Auto,
}

impl TextEncoding {
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "auto" => Ok(Self::Auto),
            _ => Err(SubtransError::Config(format!(
                "Invalid encoding '{}'. Valid encodings: utf-8, auto",
                name
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Auto => "auto",
        }
    }

    /// Decode raw file contents, `None` when the bytes do not fit the encoding
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Utf8 => decode_utf8(bytes),
            Self::Auto => detect(bytes),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16BE_BOM: &[u8] = &[0xFE, 0xFF];

fn decode_utf8(bytes: &[u8]) -> Option<String> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    String::from_utf8(bytes.to_vec()).ok()
}

fn detect(bytes: &[u8]) -> Option<String> {
    if let Some(rest) = bytes.strip_prefix(UTF16LE_BOM) {
        debug!("Detected UTF-16LE byte-order mark");
        return decode_utf16(rest, u16::from_le_bytes);
    }
    if let Some(rest) = bytes.strip_prefix(UTF16BE_BOM) {
        debug!("Detected UTF-16BE byte-order mark");
        return decode_utf16(rest, u16::from_be_bytes);
    }
    if let Some(text) = decode_utf8(bytes) {
        debug!("Decoded input as UTF-8");
        return Some(text);
    }

    debug!("Input is not UTF-8, decoding as Latin-1");
    Some(bytes.iter().map(|&byte| char::from(byte)).collect())
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units = bytes.chunks_exact(2).map(|pair| to_unit([pair[0], pair[1]]));
    char::decode_utf16(units).collect::<std::result::Result<String, _>>().ok()
}
