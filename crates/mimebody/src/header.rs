//! Header field maps.

use crate::charset::decode_utf8_or_legacy;
use std::fmt;

/// Ordered collection of header fields.
///
/// Field names keep their original spelling and values are stored raw, before
/// any RFC 2047 decoding. Lookups ignore ASCII case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Headers {
    fields: Vec<(String, String)>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a header field.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// Sets a header value, replacing any existing values.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.remove(&name);
        self.fields.push((name, value.into()));
    }

    /// Gets the first value for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Gets all values for a header, in order of appearance.
    #[must_use]
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Returns true if at least one field with this name is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Removes all values for a header.
    pub fn remove(&mut self, name: &str) {
        self.fields.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
    }

    /// Number of fields, counting repeated names separately.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if there are no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns an iterator over all fields in order of appearance.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Reads a header block from the start of `input`.
    ///
    /// The block ends at the first empty line (CRLF or bare LF). Folded
    /// continuation lines are joined with a single space. Field bytes that
    /// are not UTF-8 are read as Windows-1252. A line that is neither a field
    /// nor a continuation ends the block early and is left in the body.
    ///
    /// Returns the headers and the remaining bytes after the block.
    #[must_use]
    pub fn parse_block(input: &[u8]) -> (Self, &[u8]) {
        let mut headers = Self::new();
        let mut current: Option<(String, String)> = None;
        let mut pos = 0;

        while pos < input.len() {
            let line_end =
                memchr::memchr(b'\n', &input[pos..]).map_or(input.len(), |i| pos + i + 1);
            let line = strip_line_ending(&input[pos..line_end]);

            if line.is_empty() {
                headers.flush(current.take());
                return (headers, &input[line_end..]);
            }

            if line[0] == b' ' || line[0] == b'\t' {
                if let Some((_, value)) = current.as_mut() {
                    let folded = decode_utf8_or_legacy(line);
                    if !value.is_empty() {
                        value.push(' ');
                    }
                    value.push_str(folded.trim());
                    pos = line_end;
                    continue;
                }
            }

            let Some((name, value)) = split_field(line) else {
                // Body text with no separating blank line.
                headers.flush(current.take());
                return (headers, &input[pos..]);
            };

            headers.flush(current.take());
            current = Some((name, value));
            pos = line_end;
        }

        headers.flush(current);
        (headers, &input[input.len()..])
    }

    fn flush(&mut self, field: Option<(String, String)>) {
        if let Some((name, value)) = field {
            self.fields.push((name, value));
        }
    }
}

fn split_field(line: &[u8]) -> Option<(String, String)> {
    let colon = memchr::memchr(b':', line)?;
    let name = decode_utf8_or_legacy(&line[..colon]);
    let name = name.trim_end();
    if name.is_empty() || name.starts_with(|c: char| c.is_whitespace()) {
        return None;
    }
    let value = decode_utf8_or_legacy(&line[colon + 1..]);
    Some((name.to_string(), value.trim().to_string()))
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.fields {
            write!(f, "{name}: {value}\r\n")?;
        }
        Ok(())
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_new() {
        let headers = Headers::new();
        assert!(headers.is_empty());
    }

    #[test]
    fn test_headers_add_get() {
        let mut headers = Headers::new();
        headers.add("Content-Type", "text/plain");
        assert_eq!(headers.get("Content-Type"), Some("text/plain"));
        assert_eq!(headers.get("content-type"), Some("text/plain"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("text/plain"));
    }

    #[test]
    fn test_headers_keep_original_name() {
        let mut headers = Headers::new();
        headers.add("Message-ID", "<a@b>");
        assert_eq!(headers.iter().next(), Some(("Message-ID", "<a@b>")));
    }

    #[test]
    fn test_headers_set() {
        let mut headers = Headers::new();
        headers.add("To", "alice@example.com");
        headers.add("to", "bob@example.com");
        assert_eq!(headers.get_all("To").len(), 2);
        assert_eq!(headers.get("To"), Some("alice@example.com"));

        headers.set("To", "charlie@example.com");
        assert_eq!(headers.get_all("To"), vec!["charlie@example.com"]);
    }

    #[test]
    fn test_headers_remove() {
        let mut headers = Headers::new();
        headers.add("Subject", "Test");
        assert!(headers.contains("Subject"));

        headers.remove("subject");
        assert!(!headers.contains("Subject"));
    }

    #[test]
    fn test_parse_block() {
        let text = concat!(
            "From: sender@example.com\r\n",
            "To: recipient@example.com\r\n",
            "Subject: Test Message\r\n",
            "Content-Type: text/plain;\r\n",
            " charset=utf-8\r\n",
            "\r\n",
            "Body line\r\n"
        );

        let (headers, body) = Headers::parse_block(text.as_bytes());
        assert_eq!(headers.len(), 4);
        assert_eq!(headers.get("From"), Some("sender@example.com"));
        assert_eq!(headers.get("Subject"), Some("Test Message"));
        assert_eq!(
            headers.get("Content-Type"),
            Some("text/plain; charset=utf-8")
        );
        assert_eq!(body, b"Body line\r\n");
    }

    #[test]
    fn test_parse_block_bare_lf() {
        let (headers, body) = Headers::parse_block(b"A: 1\nB:2\n\nrest");
        assert_eq!(headers.get("a"), Some("1"));
        assert_eq!(headers.get("b"), Some("2"));
        assert_eq!(body, b"rest");
    }

    #[test]
    fn test_parse_block_without_headers() {
        let (headers, body) = Headers::parse_block(b"\r\nonly body");
        assert!(headers.is_empty());
        assert_eq!(body, b"only body");
    }

    #[test]
    fn test_parse_block_stops_at_body_text() {
        let (headers, body) = Headers::parse_block(b"Content-Type: text/plain\nHello there\n");
        assert_eq!(headers.get("content-type"), Some("text/plain"));
        assert_eq!(body, b"Hello there\n");
    }

    #[test]
    fn test_parse_block_latin1_value() {
        let (headers, _) = Headers::parse_block(b"Subject: caf\xe9\n\n");
        assert_eq!(headers.get("Subject"), Some("café"));
    }

    #[test]
    fn test_parse_block_no_terminator() {
        let (headers, body) = Headers::parse_block(b"X-One: 1\r\nX-Two: 2");
        assert_eq!(headers.get("x-two"), Some("2"));
        assert!(body.is_empty());
    }

    #[test]
    fn test_parse_block_colon_in_value() {
        let (headers, body) = Headers::parse_block(b"X-Time: 12:30:00\nX-Url: http://a\n\nrest");
        assert_eq!(headers.get("X-Time"), Some("12:30:00"));
        assert_eq!(headers.get("X-Url"), Some("http://a"));
        assert_eq!(body, b"rest");
    }

    #[test]
    fn test_headers_display() {
        let headers: Headers = [("From", "sender@example.com"), ("To", "rcpt@example.com")]
            .into_iter()
            .collect();

        assert_eq!(
            headers.to_string(),
            "From: sender@example.com\r\nTo: rcpt@example.com\r\n"
        );
    }
}
