//! Multipart splitting (RFC 2046 §5.1).
//!
//! A [`Splitter`] turns the body of a multipart entity into child [`Part`]s,
//! recursing into nested multiparts. Damaged children are kept as opaque
//! leaves; only the configured resource limits abort a split.

use crate::charset::decode_charset;
use crate::content_type::ContentType;
use crate::encoding::decode_transfer;
use crate::error::{Error, Result};
use crate::header::Headers;
use crate::options::ParseOptions;
use crate::part::{Part, PartPath};

/// Delimiter line kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    /// `--boundary`: a part follows.
    Open,
    /// `--boundary--`: the multipart ends.
    Close,
}

/// Recursive multipart splitter.
///
/// One splitter is used for a whole message so the part limit covers every
/// level of the tree.
#[derive(Debug)]
pub struct Splitter<'o> {
    options: &'o ParseOptions,
    parts: usize,
}

impl<'o> Splitter<'o> {
    /// Creates a splitter enforcing `options`' limits.
    #[must_use]
    pub const fn new(options: &'o ParseOptions) -> Self {
        Self { options, parts: 0 }
    }

    /// Number of parts produced so far.
    #[must_use]
    pub const fn parts(&self) -> usize {
        self.parts
    }

    /// Splits `body` on `boundary` into the children of the part at `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DepthLimitExceeded`] or [`Error::PartLimitExceeded`]
    /// when the message is larger than the options allow.
    pub fn split(&mut self, boundary: &str, body: &[u8], parent: &PartPath) -> Result<Vec<Part>> {
        if parent.depth() >= self.options.max_depth {
            return Err(Error::DepthLimitExceeded(self.options.max_depth));
        }

        let segments = split_segments(boundary, body);
        tracing::debug!(%parent, boundary, children = segments.len(), "Splitting multipart");

        let mut children = Vec::with_capacity(segments.len());
        for (i, segment) in segments.into_iter().enumerate() {
            self.parts += 1;
            if self.parts > self.options.max_parts {
                return Err(Error::PartLimitExceeded(self.options.max_parts));
            }
            children.push(self.parse_part(segment, parent.child(i + 1))?);
        }

        Ok(children)
    }

    fn parse_part(&mut self, raw: &[u8], path: PartPath) -> Result<Part> {
        let (header, body) = Headers::parse_block(raw);

        let content_type = match header.get("Content-Type").map(ContentType::parse) {
            None => ContentType::default(),
            Some(Ok(content_type)) => content_type,
            Some(Err(err)) => {
                tracing::warn!(
                    %path,
                    error = %err,
                    "Keeping part with unusable Content-Type as opaque"
                );
                return Ok(Part::opaque(path, header, body.to_vec()));
            }
        };

        if content_type.is_multipart() {
            let Some(boundary) = content_type.boundary() else {
                tracing::warn!(%path, "Keeping multipart without boundary as opaque");
                return Ok(Part::opaque(path, header, body.to_vec()));
            };
            let children = self.split(boundary, body, &path)?;
            return Ok(Part::container(path, header, &content_type, children));
        }

        let content = decode_leaf(&header, &content_type, body);
        tracing::trace!(
            %path,
            media_type = %content_type.media_type(),
            len = content.len(),
            "Decoded leaf"
        );
        Ok(Part::leaf(path, header, &content_type, content))
    }
}

/// Decodes a leaf's content: transfer decoding, then charset conversion to
/// UTF-8 for `text/*`.
pub(crate) fn decode_leaf(header: &Headers, content_type: &ContentType, raw: &[u8]) -> Vec<u8> {
    let encoding = header.get("Content-Transfer-Encoding").unwrap_or_default();
    let decoded = decode_transfer(encoding, raw);
    if content_type.is_text() {
        decode_charset(content_type.charset().unwrap_or_default(), &decoded).into_bytes()
    } else {
        decoded
    }
}

/// Cuts a multipart body into the raw segments between delimiter lines.
///
/// Preamble and epilogue are dropped. A body without a close delimiter runs
/// to end of input; a trailing segment of only whitespace is then ignored.
fn split_segments<'b>(boundary: &str, body: &'b [u8]) -> Vec<&'b [u8]> {
    let dash_boundary = format!("--{boundary}");
    if memchr::memmem::find(body, dash_boundary.as_bytes()).is_none() {
        return Vec::new();
    }

    let mut segments = Vec::new();
    let mut open: Option<usize> = None;
    let mut pos = 0;

    while pos < body.len() {
        let line_end = memchr::memchr(b'\n', &body[pos..]).map_or(body.len(), |i| pos + i + 1);

        if let Some(delimiter) = delimiter_kind(&body[pos..line_end], dash_boundary.as_bytes()) {
            if let Some(start) = open {
                // The line break before a delimiter belongs to the delimiter.
                segments.push(strip_line_break(&body[start..pos]));
            }
            if delimiter == Delimiter::Close {
                return segments;
            }
            open = Some(line_end);
        }

        pos = line_end;
    }

    if let Some(start) = open {
        let rest = &body[start..];
        tracing::debug!(boundary, "Multipart has no close delimiter");
        if !rest.iter().all(u8::is_ascii_whitespace) {
            segments.push(rest);
        }
    }

    segments
}

fn delimiter_kind(line: &[u8], dash_boundary: &[u8]) -> Option<Delimiter> {
    let rest = line.strip_prefix(dash_boundary)?;
    let (close, rest) = match rest.strip_prefix(b"--") {
        Some(rest) => (true, rest),
        None => (false, rest),
    };
    // Only transport padding may follow.
    if !rest.iter().all(|&b| matches!(b, b' ' | b'\t' | b'\r' | b'\n')) {
        return None;
    }
    Some(if close { Delimiter::Close } else { Delimiter::Open })
}

fn strip_line_break(segment: &[u8]) -> &[u8] {
    let Some(segment) = segment.strip_suffix(b"\n") else {
        return segment;
    };
    segment.strip_suffix(b"\r").unwrap_or(segment)
}
