//! Message body assembly.
//!
//! [`MessageBody::parse`] reads a message body, builds the part tree for
//! multipart messages and picks out the text rendering, the HTML rendering,
//! attachments and inline parts.

use crate::charset::decode_charset;
use crate::content_type::ContentType;
use crate::disposition::Disposition;
use crate::encoded_word::decode_header;
use crate::encoding::decode_transfer;
use crate::error::{Error, Result};
use crate::header::Headers;
use crate::matcher::{breadth_match_all, breadth_match_first, depth_match_all};
use crate::multipart::Splitter;
use crate::options::ParseOptions;
use crate::part::{Part, PartPath};
use sha2::{Digest, Sha256};
use std::io::Read;

/// Media types parsed as a part tree. Any other type, including other
/// `multipart/*` subtypes, is read as a single body.
pub const MULTIPART_TYPES: [&str; 4] = [
    "multipart/alternative",
    "multipart/mixed",
    "multipart/related",
    "multipart/signed",
];

/// Joins text sections collected from a non-alternative multipart.
pub const TEXT_SEPARATOR: &str = "\n--\n";

/// Returns true if `media_type` (without parameters) is parsed as a part tree.
#[must_use]
pub fn is_multipart_media_type(media_type: &str) -> bool {
    let media_type = media_type.trim();
    MULTIPART_TYPES
        .iter()
        .any(|t| t.eq_ignore_ascii_case(media_type))
}

/// Returns true if the message's `Content-Type` is parsed as a part tree.
/// A missing or unparseable `Content-Type` is not.
#[must_use]
pub fn is_multipart_message(headers: &Headers) -> bool {
    headers
        .get("Content-Type")
        .and_then(|value| ContentType::parse(value).ok())
        .is_some_and(|ct| is_multipart_media_type(&ct.media_type()))
}

/// A parsed message body.
#[derive(Debug, Clone)]
pub struct MessageBody {
    text: String,
    html: String,
    root: Option<Part>,
    attachments: Vec<PartPath>,
    inlines: Vec<PartPath>,
    header: Headers,
    message_id_domain: String,
}

impl MessageBody {
    /// Parses a body with default [`ParseOptions`].
    ///
    /// `header` holds the message's header fields and `reader` yields the
    /// bytes following the header block.
    ///
    /// # Errors
    ///
    /// See [`MessageBody::parse_with`].
    pub fn parse<R: Read>(header: Headers, reader: R) -> Result<Self> {
        Self::parse_with(header, reader, &ParseOptions::default())
    }

    /// Parses a body with explicit options.
    ///
    /// Damage inside individual parts never fails the parse; such parts are
    /// decoded as far as possible or kept raw.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidContentType`] if the message's `Content-Type` is not
    ///   a `type/subtype` media type.
    /// - [`Error::MissingBoundary`] if a multipart message has no boundary.
    /// - [`Error::DepthLimitExceeded`] or [`Error::PartLimitExceeded`] if the
    ///   part tree is larger than `options` allow.
    /// - [`Error::Io`] if reading the body fails.
    pub fn parse_with<R: Read>(
        header: Headers,
        mut reader: R,
        options: &ParseOptions,
    ) -> Result<Self> {
        let mut raw = Vec::new();
        reader.read_to_end(&mut raw)?;

        let content_type = header
            .get("Content-Type")
            .map_or_else(|| Ok(ContentType::default()), ContentType::parse)?;
        let media_type = content_type.media_type();
        let multipart = is_multipart_media_type(&media_type);
        tracing::debug!(%media_type, multipart, len = raw.len(), "Parsing message body");

        let mut body = Self {
            text: String::new(),
            html: String::new(),
            root: None,
            attachments: Vec::new(),
            inlines: Vec::new(),
            header,
            message_id_domain: options.message_id_domain.clone(),
        };

        if !multipart {
            let encoding = body.header.get("Content-Transfer-Encoding").unwrap_or_default();
            let decoded = decode_transfer(encoding, &raw);
            let content = decode_charset(content_type.charset().unwrap_or_default(), &decoded);
            if media_type == "text/html" {
                body.html = content;
            } else {
                body.text = content;
            }
            return Ok(body);
        }

        let boundary = content_type.boundary().ok_or(Error::MissingBoundary)?;
        let root_path = PartPath::root();
        let children = Splitter::new(options).split(boundary, &raw, &root_path)?;
        let root = Part::container(root_path, body.header.clone(), &content_type, children);

        body.text = select_text(&root, &media_type);
        body.html = breadth_match_first(&root, |p| is_body_part(p, "text/html"))
            .map(|p| p.content_text().into_owned())
            .unwrap_or_default();
        body.attachments = body.classify(&root, Disposition::Attachment);
        body.inlines = body.classify(&root, Disposition::Inline);
        tracing::debug!(
            text = body.text.len(),
            html = body.html.len(),
            attachments = body.attachments.len(),
            inlines = body.inlines.len(),
            "Assembled multipart body"
        );

        body.root = Some(root);
        Ok(body)
    }

    /// Paths of parts with `disposition`, in level order, skipping any whose
    /// content repeats the selected text or HTML.
    ///
    /// The root carries the message's own header, so a message-level
    /// `Content-Disposition` never makes the whole message an attachment.
    fn classify(&self, root: &Part, disposition: Disposition) -> Vec<PartPath> {
        breadth_match_all(root, |p| {
            if p.path().is_root() || p.disposition() != Some(disposition) {
                return false;
            }
            let duplicate =
                p.content() == self.text.as_bytes() || p.content() == self.html.as_bytes();
            if duplicate {
                tracing::trace!(
                    path = %p.path(),
                    %disposition,
                    "Skipping part that repeats the body"
                );
            }
            !duplicate
        })
        .into_iter()
        .map(|p| p.path().clone())
        .collect()
    }

    /// The plain text rendering. Empty if the message has none.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The HTML rendering. Empty if the message has none.
    #[must_use]
    pub fn html(&self) -> &str {
        &self.html
    }

    /// The part tree. `None` for single-part messages.
    #[must_use]
    pub const fn root(&self) -> Option<&Part> {
        self.root.as_ref()
    }

    /// Parts marked `Content-Disposition: attachment`.
    #[must_use]
    pub fn attachments(&self) -> Vec<&Part> {
        self.resolve(&self.attachments)
    }

    /// Parts marked `Content-Disposition: inline`.
    #[must_use]
    pub fn inlines(&self) -> Vec<&Part> {
        self.resolve(&self.inlines)
    }

    fn resolve(&self, paths: &[PartPath]) -> Vec<&Part> {
        self.root.as_ref().map_or_else(Vec::new, |root| {
            paths.iter().filter_map(|path| root.get(path)).collect()
        })
    }

    /// The message's header fields, undecoded.
    #[must_use]
    pub const fn header(&self) -> &Headers {
        &self.header
    }

    /// A header value with RFC 2047 encoded words decoded. Empty if absent.
    #[must_use]
    pub fn get_header(&self, name: &str) -> String {
        self.header.get(name).map(decode_header).unwrap_or_default()
    }

    /// The `Message-Id` header, or a stable surrogate derived from the
    /// `From`, `To`, `Cc` and `Date` headers when it is missing.
    #[must_use]
    pub fn message_id(&self) -> String {
        let message_id = self.get_header("Message-Id");
        if !message_id.is_empty() {
            return message_id;
        }

        let mut hasher = Sha256::new();
        for name in ["From", "To", "Cc", "Date"] {
            hasher.update(self.get_header(name).as_bytes());
        }
        format!(
            "<{:x}-auto-generated@{}>",
            hasher.finalize(),
            self.message_id_domain
        )
    }

    /// Returns true if the body was parsed as a part tree.
    #[must_use]
    pub const fn is_multipart(&self) -> bool {
        self.root.is_some()
    }
}

fn is_body_part(part: &Part, media_type: &str) -> bool {
    part.content_type() == media_type && part.disposition() != Some(Disposition::Attachment)
}

fn select_text(root: &Part, media_type: &str) -> String {
    if media_type == "multipart/alternative" {
        return breadth_match_first(root, |p| is_body_part(p, "text/plain"))
            .map(|p| p.content_text().into_owned())
            .unwrap_or_default();
    }

    depth_match_all(root, |p| is_body_part(p, "text/plain"))
        .iter()
        .map(|p| p.content_text())
        .collect::<Vec<_>>()
        .join(TEXT_SEPARATOR)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<MessageBody> {
        let (header, body) = Headers::parse_block(raw.as_bytes());
        MessageBody::parse(header, body)
    }

    #[test]
    fn test_is_multipart_media_type() {
        assert!(is_multipart_media_type("multipart/mixed"));
        assert!(is_multipart_media_type("Multipart/Signed"));
        assert!(!is_multipart_media_type("multipart/report"));
        assert!(!is_multipart_media_type("text/plain"));
    }

    #[test]
    fn test_is_multipart_message() {
        let header: Headers = [("Content-Type", "multipart/related; boundary=x")]
            .into_iter()
            .collect();
        assert!(is_multipart_message(&header));
        assert!(!is_multipart_message(&Headers::new()));

        let header: Headers = [("Content-Type", "nonsense")].into_iter().collect();
        assert!(!is_multipart_message(&header));
    }

    #[test]
    fn test_monopart_without_content_type() {
        let body = parse("Subject: hi\r\n\r\nplain body").unwrap();
        assert_eq!(body.text(), "plain body");
        assert!(body.html().is_empty());
        assert!(body.root().is_none());
        assert!(!body.is_multipart());
    }

    #[test]
    fn test_unlisted_multipart_is_monopart() {
        let raw = "Content-Type: multipart/report; boundary=b\r\n\r\n--b\r\n\r\nx\r\n--b--\r\n";
        let body = parse(raw).unwrap();
        assert!(!body.is_multipart());
        assert!(body.text().starts_with("--b"));
    }

    #[test]
    fn test_alternative_text_and_html() {
        let raw = "Content-Type: multipart/alternative; boundary=b\r\n\
                   \r\n\
                   --b\r\n\
                   Content-Type: text/plain\r\n\
                   \r\n\
                   A\r\n\
                   --b\r\n\
                   Content-Type: text/plain\r\n\
                   \r\n\
                   B\r\n\
                   --b\r\n\
                   Content-Type: text/html\r\n\
                   \r\n\
                   <b>A</b>\r\n\
                   --b--\r\n";
        let body = parse(raw).unwrap();
        assert_eq!(body.text(), "A");
        assert_eq!(body.html(), "<b>A</b>");
        assert!(body.attachments().is_empty());
    }

    #[test]
    fn test_attachment_text_not_used_as_body() {
        let raw = "Content-Type: multipart/mixed; boundary=b\r\n\
                   \r\n\
                   --b\r\n\
                   Content-Type: text/plain\r\n\
                   Content-Disposition: attachment; filename=notes.txt\r\n\
                   \r\n\
                   notes\r\n\
                   --b--\r\n";
        let body = parse(raw).unwrap();
        assert!(body.text().is_empty());
        let attachments = body.attachments();
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].file_name(), Some("notes.txt"));
    }

    #[test]
    fn test_classification_skips_body_duplicates() {
        let raw = "Content-Type: multipart/mixed; boundary=b\r\n\
                   \r\n\
                   --b\r\n\
                   Content-Type: text/plain\r\n\
                   Content-Disposition: inline\r\n\
                   \r\n\
                   same\r\n\
                   --b--\r\n";
        let body = parse(raw).unwrap();
        assert_eq!(body.text(), "same");
        assert!(body.inlines().is_empty());
    }

    #[test]
    fn test_message_level_disposition_not_classified() {
        let raw = "Content-Type: multipart/alternative; boundary=b\r\n\
                   Content-Disposition: inline\r\n\
                   \r\n\
                   --b\r\n\
                   Content-Type: text/plain\r\n\
                   \r\n\
                   Hello\r\n\
                   --b\r\n\
                   Content-Type: text/html\r\n\
                   \r\n\
                   <p>Hello</p>\r\n\
                   --b--\r\n";
        let body = parse(raw).unwrap();
        assert_eq!(body.text(), "Hello");
        assert_eq!(body.html(), "<p>Hello</p>");
        assert!(body.inlines().is_empty());
        assert!(body.attachments().is_empty());
    }

    #[test]
    fn test_message_level_attachment_disposition_not_classified() {
        let raw = "Content-Type: multipart/mixed; boundary=b\r\n\
                   Content-Disposition: attachment; filename=message.eml\r\n\
                   \r\n\
                   --b\r\n\
                   Content-Type: text/plain\r\n\
                   \r\n\
                   Hello\r\n\
                   --b\r\n\
                   Content-Type: application/pdf\r\n\
                   Content-Disposition: attachment; filename=report.pdf\r\n\
                   \r\n\
                   %PDF\r\n\
                   --b--\r\n";
        let body = parse(raw).unwrap();
        let root = body.root().unwrap();
        assert_eq!(root.disposition(), Some(Disposition::Attachment));
        let attachments = body.attachments();
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].file_name(), Some("report.pdf"));
    }

    #[test]
    fn test_missing_boundary() {
        let err = parse("Content-Type: multipart/mixed\r\n\r\nbody").unwrap_err();
        assert!(matches!(err, Error::MissingBoundary));
    }

    #[test]
    fn test_invalid_content_type() {
        let err = parse("Content-Type: not a type\r\n\r\nbody").unwrap_err();
        assert!(matches!(err, Error::InvalidContentType(_)));
    }

    #[test]
    fn test_message_id_present() {
        let body = parse("Message-Id: <abc@example.com>\r\n\r\n").unwrap();
        assert_eq!(body.message_id(), "<abc@example.com>");
    }

    #[test]
    fn test_message_id_synthesized() {
        let raw = "From: a@example.com\r\n\
                   To: b@example.com\r\n\
                   Date: Mon, 1 Jan 2024 00:00:00 +0000\r\n\r\n";
        let (header, rest) = Headers::parse_block(raw.as_bytes());
        let options = ParseOptions::builder().message_id_domain("example.org").build();
        let body = MessageBody::parse_with(header, rest, &options).unwrap();

        let id = body.message_id();
        assert!(id.starts_with('<'));
        assert!(id.ends_with("-auto-generated@example.org>"));
        let hex = &id[1..65];
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(id, body.message_id());

        let other = parse("From: c@example.com\r\n\r\n").unwrap();
        assert_ne!(other.message_id(), id);
    }

    #[test]
    fn test_get_header_decodes() {
        let body = parse("Subject: =?UTF-8?Q?MIME_UTF8_Test_=C2=A2_More_Text?=\r\n\r\n").unwrap();
        assert_eq!(body.get_header("subject"), "MIME UTF8 Test ¢ More Text");
        assert_eq!(body.get_header("X-Missing"), "");
        assert_eq!(
            body.header().get("Subject"),
            Some("=?UTF-8?Q?MIME_UTF8_Test_=C2=A2_More_Text?=")
        );
    }
}
