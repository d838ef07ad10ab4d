//! MIME content type handling.

use crate::error::{Error, Result};
use crate::params::Parameters;
use std::fmt;

/// Characters that may not appear in a type or subtype token (RFC 2045).
const TSPECIALS: &str = "()<>@,;:\\\"/[]?=";

/// MIME content type with parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ContentType {
    /// Main type (e.g., "text", "image", "multipart").
    pub main_type: String,
    /// Subtype (e.g., "plain", "html", "jpeg").
    pub sub_type: String,
    /// Parameters (e.g., charset=utf-8, boundary=xxx).
    pub parameters: Parameters,
}

impl ContentType {
    /// Creates a new content type.
    #[must_use]
    pub fn new(main_type: impl Into<String>, sub_type: impl Into<String>) -> Self {
        Self {
            main_type: main_type.into(),
            sub_type: sub_type.into(),
            parameters: Parameters::new(),
        }
    }

    /// The RFC 2045 default: `text/plain; charset=us-ascii`.
    #[must_use]
    pub fn text_plain() -> Self {
        Self::new("text", "plain").with_parameter("charset", "us-ascii")
    }

    /// `application/octet-stream`, used for parts whose own type is unusable.
    #[must_use]
    pub fn octet_stream() -> Self {
        Self::new("application", "octet-stream")
    }

    /// Adds a parameter.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key, value);
        self
    }

    /// Returns `type/subtype` without parameters.
    #[must_use]
    pub fn media_type(&self) -> String {
        format!("{}/{}", self.main_type, self.sub_type)
    }

    /// Returns the charset parameter if present.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.parameters.get("charset")
    }

    /// Returns the boundary parameter if present and non-empty.
    #[must_use]
    pub fn boundary(&self) -> Option<&str> {
        self.parameters.get("boundary").filter(|b| !b.is_empty())
    }

    /// Checks if this is a multipart content type.
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        self.main_type.eq_ignore_ascii_case("multipart")
    }

    /// Checks if this is a text content type.
    #[must_use]
    pub fn is_text(&self) -> bool {
        self.main_type.eq_ignore_ascii_case("text")
    }

    /// Parses a content type string.
    ///
    /// Format: `type/subtype; param1=value1; param2=value2`
    ///
    /// Type and subtype are lowercased. Parameters are parsed leniently; see
    /// [`Parameters::parse`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidContentType`] if the value does not start with
    /// a `type/subtype` pair of valid tokens.
    pub fn parse(s: &str) -> Result<Self> {
        let (type_str, params) = s.split_once(';').unwrap_or((s, ""));

        let invalid = || Error::InvalidContentType(s.trim().to_string());
        let (main_type, sub_type) = type_str.split_once('/').ok_or_else(invalid)?;
        let main_type = main_type.trim();
        let sub_type = sub_type.trim();
        if !is_token(main_type) || !is_token(sub_type) {
            return Err(invalid());
        }

        Ok(Self {
            main_type: main_type.to_lowercase(),
            sub_type: sub_type.to_lowercase(),
            parameters: Parameters::parse(params),
        })
    }
}

impl Default for ContentType {
    fn default() -> Self {
        Self::text_plain()
    }
}

fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_graphic() && !TSPECIALS.contains(c))
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let main = &self.main_type;
        let sub = &self.sub_type;
        write!(f, "{main}/{sub}")?;

        for (key, value) in self.parameters.iter() {
            // Quote value if it contains special characters
            let needs_quotes = value.is_empty()
                || value.contains(|c: char| c.is_whitespace() || TSPECIALS.contains(c));
            if needs_quotes {
                let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
                write!(f, "; {key}=\"{escaped}\"")?;
            } else {
                write!(f, "; {key}={value}")?;
            }
        }

        Ok(())
    }
}
