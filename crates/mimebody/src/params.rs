//! Parameter lists of structured MIME headers (`; name=value`).

use crate::charset::decode_charset;

/// Parameters of a `Content-Type` or `Content-Disposition` header.
///
/// Names are stored lowercase. RFC 2231 continuations are reassembled and
/// extended values are decoded to UTF-8, so each name appears once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Parameters {
    entries: Vec<(String, String)>,
}

/// One `name=value` pair as written, before RFC 2231 reassembly.
#[derive(Debug)]
struct RawParameter {
    name: String,
    section: Option<u32>,
    extended: bool,
    value: String,
}

impl Parameters {
    /// Creates an empty parameter list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a parameter value by case-insensitive name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Sets a parameter, replacing an existing value with the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into().to_ascii_lowercase();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(name, value)` pairs in order of first appearance.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Parses the parameter section of a header value, i.e. everything
    /// after the first `;`.
    ///
    /// Malformed parameters are skipped. When a name repeats, the first
    /// plain value wins, and an RFC 2231 extended value replaces a plain one.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let mut params = Self::new();
        let mut extended: Vec<(String, Vec<RawParameter>)> = Vec::new();

        for raw in tokenize(input) {
            if raw.section.is_none() && !raw.extended {
                if params.get(&raw.name).is_none() {
                    params.entries.push((raw.name, raw.value));
                }
                continue;
            }
            match extended.iter_mut().find(|(name, _)| *name == raw.name) {
                Some((_, pieces)) => pieces.push(raw),
                None => extended.push((raw.name.clone(), vec![raw])),
            }
        }

        for (name, mut pieces) in extended {
            pieces.sort_by_key(|p| p.section.unwrap_or(0));
            params.insert(name, assemble(&pieces));
        }

        params
    }
}

/// Splits `name=value` pairs, honoring quoted strings.
fn tokenize(input: &str) -> Vec<RawParameter> {
    let mut result = Vec::new();
    let mut chars = input.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace() || *c == ';').is_some() {}
        if chars.peek().is_none() {
            break;
        }

        let mut name = String::new();
        while let Some(c) = chars.next_if(|c| *c != '=' && *c != ';') {
            name.push(c);
        }
        if chars.next_if_eq(&'=').is_none() {
            // A bare word without a value.
            continue;
        }

        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        let mut value = String::new();
        if chars.next_if_eq(&'"').is_some() {
            while let Some(c) = chars.next() {
                match c {
                    '"' => break,
                    '\\' => value.extend(chars.next()),
                    c => value.push(c),
                }
            }
            // Anything between the closing quote and the next `;` is noise.
            while chars.next_if(|c| *c != ';').is_some() {}
        } else {
            while let Some(c) = chars.next_if(|c| *c != ';') {
                value.push(c);
            }
            value.truncate(value.trim_end().len());
        }

        if let Some(param) = RawParameter::new(name.trim(), value) {
            result.push(param);
        }
    }

    result
}

impl RawParameter {
    /// Splits the RFC 2231 markers off a name: `title*1*` is section 1 of an
    /// extended `title`.
    fn new(name: &str, value: String) -> Option<Self> {
        if name.is_empty() || name.contains(char::is_whitespace) {
            return None;
        }
        let name = name.to_ascii_lowercase();
        let (name, extended) = match name.strip_suffix('*') {
            Some(base) => (base.to_string(), true),
            None => (name, false),
        };
        let (name, section) = match name.split_once('*') {
            Some((base, section)) => match section.parse::<u32>() {
                Ok(n) => (base.to_string(), Some(n)),
                Err(_) => (name.clone(), None),
            },
            None => (name, None),
        };
        Some(Self {
            name,
            section,
            extended,
            value,
        })
    }
}

/// Joins RFC 2231 pieces, percent-decoding extended ones and converting the
/// result from the charset named by the first piece.
fn assemble(pieces: &[RawParameter]) -> String {
    let mut charset = "";
    let mut bytes = Vec::new();

    for (i, piece) in pieces.iter().enumerate() {
        if !piece.extended {
            bytes.extend_from_slice(piece.value.as_bytes());
            continue;
        }
        let mut value = piece.value.as_str();
        if i == 0 {
            // charset'language'value
            let mut fields = value.splitn(3, '\'');
            if let (Some(cs), Some(_lang), Some(rest)) =
                (fields.next(), fields.next(), fields.next())
            {
                charset = cs;
                value = rest;
            }
        }
        percent_decode(value, &mut bytes);
    }

    decode_charset(charset, &bytes)
}

fn percent_decode(value: &str, out: &mut Vec<u8>) {
    let bytes = value.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = value
                .get(i + 1..i + 3)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok());
            if let Some(byte) = hex {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
}
