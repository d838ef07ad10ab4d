//! `Content-Disposition` handling (RFC 2183).

use crate::params::Parameters;
use std::fmt;

/// How a part is meant to be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "lowercase"))]
pub enum Disposition {
    /// Displayed in place, as part of the message.
    Inline,
    /// Offered separately from the message body.
    Attachment,
}

impl Disposition {
    /// Parses a disposition type. Types other than `inline` and
    /// `attachment` are not recognized.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("inline") {
            Some(Self::Inline)
        } else if s.eq_ignore_ascii_case("attachment") {
            Some(Self::Attachment)
        } else {
            None
        }
    }

    /// Returns the lowercase header spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::Attachment => "attachment",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed `Content-Disposition` header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentDisposition {
    /// The disposition type, if recognized.
    pub disposition: Option<Disposition>,
    /// Parameters such as `filename`.
    pub parameters: Parameters,
}

impl ContentDisposition {
    /// Parses a header value. Never fails: an unrecognized type leaves
    /// [`Self::disposition`] empty but parameters are still read.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let (kind, params) = s.split_once(';').unwrap_or((s, ""));
        let disposition = Disposition::parse(kind);
        if disposition.is_none() && !kind.trim().is_empty() {
            tracing::trace!(kind = kind.trim(), "Unrecognized disposition type");
        }
        Self {
            disposition,
            parameters: Parameters::parse(params),
        }
    }

    /// Returns the `filename` parameter if present.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.parameters.get("filename")
    }
}
