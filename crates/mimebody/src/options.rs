//! Parse configuration.

/// Default ceiling on multipart nesting.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Default ceiling on the number of parts in one message.
pub const DEFAULT_MAX_PARTS: usize = 1024;

/// Default domain for synthesized `Message-Id` values.
pub const DEFAULT_MESSAGE_ID_DOMAIN: &str = "mimebody.invalid";

/// Options controlling a parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Deepest nesting of parts below the root.
    pub max_depth: usize,
    /// Largest number of parts below the root.
    pub max_parts: usize,
    /// Domain used when a `Message-Id` has to be synthesized.
    pub message_id_domain: String,
}

impl ParseOptions {
    /// Creates options with the default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an options builder.
    #[must_use]
    pub fn builder() -> ParseOptionsBuilder {
        ParseOptionsBuilder::new()
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_parts: DEFAULT_MAX_PARTS,
            message_id_domain: DEFAULT_MESSAGE_ID_DOMAIN.to_string(),
        }
    }
}

/// Builder for parse options.
#[derive(Debug, Clone)]
pub struct ParseOptionsBuilder {
    max_depth: usize,
    max_parts: usize,
    message_id_domain: String,
}

impl ParseOptionsBuilder {
    /// Creates a new builder with the default limits.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_parts: DEFAULT_MAX_PARTS,
            message_id_domain: DEFAULT_MESSAGE_ID_DOMAIN.to_string(),
        }
    }

    /// Sets the nesting limit.
    #[must_use]
    pub const fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Sets the part count limit.
    #[must_use]
    pub const fn max_parts(mut self, parts: usize) -> Self {
        self.max_parts = parts;
        self
    }

    /// Sets the domain for synthesized `Message-Id` values.
    #[must_use]
    pub fn message_id_domain(mut self, domain: impl Into<String>) -> Self {
        self.message_id_domain = domain.into();
        self
    }

    /// Builds the options.
    #[must_use]
    pub fn build(self) -> ParseOptions {
        ParseOptions {
            max_depth: self.max_depth,
            max_parts: self.max_parts,
            message_id_domain: self.message_id_domain,
        }
    }
}

impl Default for ParseOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
