//! # mimebody
//!
//! MIME body parsing for email.
//!
//! ## Features
//!
//! - **Part tree**: multipart bodies split into nested [`Part`]s
//! - **Body selection**: plain text and HTML renderings picked from the tree
//! - **Classification**: attachments and inline parts by `Content-Disposition`
//! - **Decoding**: base64, quoted-printable, legacy charsets to UTF-8
//! - **Headers**: RFC 2047 encoded words, RFC 2231 parameters
//!
//! Damaged mail is recovered wherever possible. Only a message whose own
//! `Content-Type` is unusable, or whose part tree exceeds the configured
//! limits, fails to parse.
//!
//! ## Quick Start
//!
//! ```
//! use mimebody::{Headers, MessageBody};
//!
//! let raw = b"Subject: =?UTF-8?Q?Caf=C3=A9?=\r\n\
//!             Content-Type: multipart/alternative; boundary=b\r\n\
//!             \r\n\
//!             --b\r\n\
//!             Content-Type: text/plain\r\n\
//!             \r\n\
//!             Hello\r\n\
//!             --b\r\n\
//!             Content-Type: text/html\r\n\
//!             \r\n\
//!             <p>Hello</p>\r\n\
//!             --b--\r\n";
//!
//! let (headers, body) = Headers::parse_block(raw);
//! let message = MessageBody::parse(headers, body)?;
//!
//! assert_eq!(message.get_header("Subject"), "Café");
//! assert_eq!(message.text(), "Hello");
//! assert_eq!(message.html(), "<p>Hello</p>");
//! # Ok::<(), mimebody::Error>(())
//! ```
//!
//! ### Limits
//!
//! ```
//! use mimebody::{Headers, MessageBody, ParseOptions};
//!
//! let options = ParseOptions::builder().max_depth(4).max_parts(64).build();
//! let message = MessageBody::parse_with(Headers::new(), &b"plain"[..], &options)?;
//! assert_eq!(message.text(), "plain");
//! # Ok::<(), mimebody::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod body;
mod content_type;
mod disposition;
mod error;
mod header;
mod options;
mod params;
mod part;

pub mod charset;
pub mod encoded_word;
pub mod encoding;
pub mod matcher;
pub mod multipart;

pub use body::{
    MULTIPART_TYPES, MessageBody, TEXT_SEPARATOR, is_multipart_media_type, is_multipart_message,
};
pub use charset::decode_charset;
pub use content_type::ContentType;
pub use disposition::{ContentDisposition, Disposition};
pub use encoded_word::decode_header;
pub use encoding::{TransferEncoding, decode_transfer};
pub use error::{Error, Result};
pub use header::Headers;
pub use options::{
    DEFAULT_MAX_DEPTH, DEFAULT_MAX_PARTS, DEFAULT_MESSAGE_ID_DOMAIN, ParseOptions,
    ParseOptionsBuilder,
};
pub use params::Parameters;
pub use part::{Part, PartPath};
