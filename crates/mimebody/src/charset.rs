//! Charset normalization to UTF-8.
//!
//! Charset declarations in real mail are frequently wrong, misspelled or
//! missing, so decoding here never fails: unknown labels fall back to a
//! byte-preserving ISO-8859-1 reading.

use encoding_rs::{Encoding, WINDOWS_1252};
use std::borrow::Cow;

/// Labels seen in the wild that the WHATWG label set does not know, mapped
/// to a label it does.
const LABEL_ALIASES: &[(&str, &str)] = &[
    ("utf_8", "utf-8"),
    ("cp-1250", "windows-1250"),
    ("cp-1251", "windows-1251"),
    ("cp-1252", "windows-1252"),
    ("win-1250", "windows-1250"),
    ("win-1251", "windows-1251"),
    ("win-1252", "windows-1252"),
    ("iso8859_1", "iso-8859-1"),
    ("iso8859_15", "iso-8859-15"),
    ("iso-8859-8-e", "iso-8859-8"),
    ("cp932", "shift_jis"),
    ("cp936", "gbk"),
    ("cp949", "euc-kr"),
    ("ms949", "euc-kr"),
    ("cp950", "big5"),
];

/// Labels read as UTF-8 with a Windows-1252 fallback for invalid bytes.
const UTF8_FIRST: &[&str] = &["", "utf-8", "utf8", "us-ascii", "ascii"];

/// Converts `raw` bytes in the named charset into a UTF-8 string.
///
/// An empty label, `us-ascii` and `utf-8` are read as UTF-8 when the bytes
/// are valid UTF-8 and as Windows-1252 otherwise. Labels that cannot be
/// resolved are read as ISO-8859-1, which maps every byte to a character.
/// A leading byte-order mark is removed.
#[must_use]
pub fn decode_charset(charset: &str, raw: &[u8]) -> String {
    let label = normalize_label(charset);

    if UTF8_FIRST.contains(&label.as_str()) {
        return decode_utf8_or_legacy(raw).into_owned();
    }

    match lookup(&label) {
        Some(encoding) => encoding.decode_with_bom_removal(raw).0.into_owned(),
        None => {
            tracing::warn!(charset, "Unknown charset, reading bytes as ISO-8859-1");
            decode_latin1(raw)
        }
    }
}

/// Resolves a charset label to an encoding, if it names one.
#[must_use]
pub fn lookup(charset: &str) -> Option<&'static Encoding> {
    let label = normalize_label(charset);
    let label = LABEL_ALIASES
        .iter()
        .find(|(alias, _)| *alias == label)
        .map_or(label.as_str(), |&(_, canonical)| canonical);
    Encoding::for_label_no_replacement(label.as_bytes())
}

/// Reads bytes as UTF-8, falling back to Windows-1252 when they are not.
pub(crate) fn decode_utf8_or_legacy(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => {
            tracing::trace!("Invalid UTF-8, reading bytes as Windows-1252");
            WINDOWS_1252.decode_without_bom_handling(bytes).0
        }
    }
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().copied().map(char::from).collect()
}

fn normalize_label(charset: &str) -> String {
    charset
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_ascii_lowercase()
}
