//! Content-Transfer-Encoding decoding.
//!
//! Supports Base64 and Quoted-Printable; every other encoding is the
//! identity. Decoding never fails: damaged input yields the best partial
//! result, or the raw bytes when nothing better is available.

use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use std::fmt;

/// Accepts unpadded input and non-zero trailing bits.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Transfer encoding types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferEncoding {
    /// 7-bit ASCII.
    #[default]
    SevenBit,
    /// 8-bit binary.
    EightBit,
    /// Base64 encoding.
    Base64,
    /// Quoted-Printable encoding.
    QuotedPrintable,
    /// Binary (no encoding).
    Binary,
}

impl TransferEncoding {
    /// Parses transfer encoding from string.
    ///
    /// Unknown names are treated as 7bit, which leaves the body untouched.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "8bit" => Self::EightBit,
            "base64" => Self::Base64,
            "quoted-printable" => Self::QuotedPrintable,
            "binary" => Self::Binary,
            _ => Self::SevenBit, // Default (includes "7bit")
        }
    }

    /// Decodes `raw` according to this encoding.
    #[must_use]
    pub fn decode(self, raw: &[u8]) -> Vec<u8> {
        match self {
            Self::Base64 => {
                let (decoded, clean) = decode_base64(raw);
                if !clean {
                    tracing::warn!(
                        len = raw.len(),
                        "Damaged base64 content, keeping partial decode"
                    );
                }
                decoded
            }
            Self::QuotedPrintable => {
                let (decoded, clean) = decode_quoted_printable(raw);
                if !clean {
                    tracing::warn!(
                        len = raw.len(),
                        "Invalid quoted-printable escapes kept literally"
                    );
                }
                decoded
            }
            Self::SevenBit | Self::EightBit | Self::Binary => raw.to_vec(),
        }
    }
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SevenBit => write!(f, "7bit"),
            Self::EightBit => write!(f, "8bit"),
            Self::Base64 => write!(f, "base64"),
            Self::QuotedPrintable => write!(f, "quoted-printable"),
            Self::Binary => write!(f, "binary"),
        }
    }
}

/// Decodes a body according to the named `Content-Transfer-Encoding`.
///
/// `quoted-printable` and `base64` are decoded; `7bit`, `8bit`, `binary`,
/// an empty name and unknown names return the bytes unchanged.
#[must_use]
pub fn decode_transfer(encoding: &str, raw: &[u8]) -> Vec<u8> {
    TransferEncoding::parse(encoding).decode(raw)
}

/// Decodes Base64 data, tolerating line breaks, stray characters, missing
/// padding and concatenated encodings.
///
/// Returns the decoded bytes and whether the input was well formed.
fn decode_base64(data: &[u8]) -> (Vec<u8>, bool) {
    let compact: Vec<u8> = data
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    if let Ok(decoded) = STANDARD.decode(&compact) {
        return (decoded, true);
    }

    // Each run of padding ends one encoded stream.
    let mut decoded = Vec::with_capacity(compact.len() / 4 * 3);
    for chunk in compact.split(|&b| b == b'=') {
        let mut chunk: Vec<u8> = chunk
            .iter()
            .copied()
            .filter(|&b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/')
            .collect();
        // A lone trailing sextet cannot produce a byte.
        if chunk.len() % 4 == 1 {
            chunk.pop();
        }
        match LENIENT.decode(&chunk) {
            Ok(bytes) => decoded.extend_from_slice(&bytes),
            Err(_) => return (data.to_vec(), false),
        }
    }
    (decoded, false)
}

/// Decodes Quoted-Printable data (RFC 2045).
///
/// Soft line breaks are removed, trailing whitespace on encoded lines is
/// dropped and hard line breaks are kept as they appear. An `=` that does
/// not start a valid escape is kept literally.
///
/// Returns the decoded bytes and whether every escape was valid.
fn decode_quoted_printable(data: &[u8]) -> (Vec<u8>, bool) {
    let mut result = Vec::with_capacity(data.len());
    let mut clean = true;

    for line in data.split_inclusive(|&b| b == b'\n') {
        let (content, ending) = split_line_ending(line);
        let content = trim_end_whitespace(content);

        let (content, soft_break) = match content.strip_suffix(b"=") {
            Some(stripped) => (stripped, true),
            None => (content, false),
        };

        let mut i = 0;
        while i < content.len() {
            if content[i] == b'=' {
                if let Some(byte) = content.get(i + 1..i + 3).and_then(hex_byte) {
                    result.push(byte);
                    i += 3;
                    continue;
                }
                clean = false;
            }
            result.push(content[i]);
            i += 1;
        }

        if !soft_break {
            result.extend_from_slice(ending);
        }
    }

    (result, clean)
}

fn split_line_ending(line: &[u8]) -> (&[u8], &[u8]) {
    if let Some(content) = line.strip_suffix(b"\r\n") {
        (content, &line[content.len()..])
    } else if let Some(content) = line.strip_suffix(b"\n") {
        (content, &line[content.len()..])
    } else {
        (line, &[])
    }
}

fn trim_end_whitespace(mut bytes: &[u8]) -> &[u8] {
    while let [rest @ .., b' ' | b'\t'] = bytes {
        bytes = rest;
    }
    bytes
}

fn hex_byte(pair: &[u8]) -> Option<u8> {
    let hi = char::from(pair[0]).to_digit(16)?;
    let lo = char::from(pair[1]).to_digit(16)?;
    u8::try_from((hi << 4) | lo).ok()
}
