//! Error types for MIME body parsing.
//!
//! Only structural problems with the message as a whole are reported here.
//! Damaged content inside individual parts is recovered where it is found and
//! never reaches the caller as an error.

/// Result type alias for MIME body parsing.
pub type Result<T> = std::result::Result<T, Error>;

/// MIME body parsing errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The `Content-Type` header is not a `type/subtype` media type.
    #[error("Invalid content type: {0}")]
    InvalidContentType(String),

    /// A multipart media type without a `boundary` parameter.
    #[error("Missing boundary in multipart message")]
    MissingBoundary,

    /// Multiparts are nested deeper than the configured limit.
    #[error("Multipart nesting exceeds {0} levels")]
    DepthLimitExceeded(usize),

    /// The message holds more parts than the configured limit.
    #[error("Message exceeds {0} parts")]
    PartLimitExceeded(usize),

    /// Reading the body stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true for errors caused by the shape of the message itself,
    /// as opposed to failures reading it.
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_classification() {
        assert!(Error::MissingBoundary.is_structural());
        assert!(Error::InvalidContentType("text".into()).is_structural());
        assert!(Error::DepthLimitExceeded(4).is_structural());

        let io = Error::from(std::io::Error::other("boom"));
        assert!(!io.is_structural());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Error::InvalidContentType("garbage".into()).to_string(),
            "Invalid content type: garbage"
        );
        assert_eq!(
            Error::PartLimitExceeded(10).to_string(),
            "Message exceeds 10 parts"
        );
    }
}
