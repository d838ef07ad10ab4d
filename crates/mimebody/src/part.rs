//! Nodes of the parsed MIME tree.

use crate::content_type::ContentType;
use crate::disposition::{ContentDisposition, Disposition};
use crate::encoded_word::decode_header;
use crate::header::Headers;
use crate::params::Parameters;
use std::borrow::Cow;
use std::fmt;

/// Location of a part in the tree: 1-based child indexes from the root.
///
/// Displayed like an IMAP section number (`1.2.1`); the root is `root`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PartPath(Vec<usize>);

impl PartPath {
    /// The path of the root part.
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// The path of the `index`-th (1-based) child of this part.
    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        let mut indexes = self.0.clone();
        indexes.push(index);
        Self(indexes)
    }

    /// Child indexes from the root.
    #[must_use]
    pub fn indexes(&self) -> &[usize] {
        &self.0
    }

    /// Number of levels below the root.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Returns true for the root path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PartPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("root");
        }
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{index}")?;
        }
        Ok(())
    }
}

impl From<Vec<usize>> for PartPath {
    fn from(indexes: Vec<usize>) -> Self {
        Self(indexes)
    }
}

/// One node of a parsed MIME tree.
///
/// Leaves hold their transfer-decoded content; textual leaves are
/// additionally converted to UTF-8. Containers (multiparts) hold children
/// and no content. A part owns its children.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Part {
    content_type: String,
    params: Parameters,
    disposition: Option<Disposition>,
    file_name: Option<String>,
    header: Headers,
    content: Vec<u8>,
    children: Vec<Part>,
    path: PartPath,
    malformed: bool,
}

impl Part {
    /// Creates a leaf part.
    #[must_use]
    pub fn leaf(
        path: PartPath,
        header: Headers,
        content_type: &ContentType,
        content: Vec<u8>,
    ) -> Self {
        let mut part = Self::with_header(path, header, content_type);
        part.content = content;
        part
    }

    /// Creates a container part.
    #[must_use]
    pub fn container(
        path: PartPath,
        header: Headers,
        content_type: &ContentType,
        children: Vec<Self>,
    ) -> Self {
        let mut part = Self::with_header(path, header, content_type);
        part.children = children;
        part
    }

    /// Creates a leaf whose own headers could not be used, keeping its raw
    /// content undecoded.
    #[must_use]
    pub fn opaque(path: PartPath, header: Headers, raw: Vec<u8>) -> Self {
        let mut part = Self::with_header(path, header, &ContentType::octet_stream());
        part.content = raw;
        part.malformed = true;
        part
    }

    fn with_header(path: PartPath, header: Headers, content_type: &ContentType) -> Self {
        let disposition = header
            .get("Content-Disposition")
            .map(ContentDisposition::parse)
            .unwrap_or_default();
        let file_name = disposition
            .filename()
            .or_else(|| content_type.parameters.get("name"))
            .map(decode_header);

        Self {
            content_type: content_type.media_type(),
            params: content_type.parameters.clone(),
            disposition: disposition.disposition,
            file_name,
            header,
            content: Vec::new(),
            children: Vec::new(),
            path,
            malformed: false,
        }
    }

    /// Media type without parameters, e.g. `text/plain`.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Parameters of the part's `Content-Type`.
    #[must_use]
    pub const fn params(&self) -> &Parameters {
        &self.params
    }

    /// The declared charset, if any.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.params.get("charset")
    }

    /// Disposition from the part's own `Content-Disposition` header.
    #[must_use]
    pub const fn disposition(&self) -> Option<Disposition> {
        self.disposition
    }

    /// File name from `Content-Disposition: filename=`, falling back to
    /// `Content-Type: name=`.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// The part's `Content-Id` header, raw.
    #[must_use]
    pub fn content_id(&self) -> Option<&str> {
        self.header.get("Content-Id")
    }

    /// The part's own header fields.
    #[must_use]
    pub const fn header(&self) -> &Headers {
        &self.header
    }

    /// Decoded content. Empty for containers.
    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Content as text, replacing invalid UTF-8.
    #[must_use]
    pub fn content_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }

    /// Child parts in order of appearance.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Location of this part in its tree.
    #[must_use]
    pub const fn path(&self) -> &PartPath {
        &self.path
    }

    /// Returns true for multipart containers.
    #[must_use]
    pub fn is_container(&self) -> bool {
        self.content_type.starts_with("multipart/")
    }

    /// Returns true if the part's headers could not be used and its content
    /// was kept raw.
    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        self.malformed
    }

    /// Looks up a descendant by path relative to this part.
    #[must_use]
    pub fn get(&self, path: &PartPath) -> Option<&Self> {
        path.indexes().iter().try_fold(self, |part, &index| {
            index.checked_sub(1).and_then(|i| part.children.get(i))
        })
    }
}
