//! RFC 2047 encoded-word decoding for header values.

use crate::charset::decode_charset;
use crate::encoding::TransferEncoding;

/// Decodes every RFC 2047 encoded word in a header value.
///
/// Encoded words have the form `=?charset?encoding?text?=`, where the
/// encoding is `B` (Base64) or `Q` (a Quoted-Printable variant). Whitespace
/// between two adjacent encoded words is removed; all other text, including
/// whitespace next to plain words, is kept as it is. Tokens that look like
/// encoded words but cannot be decoded are left untouched.
#[must_use]
pub fn decode_header(raw: &str) -> String {
    if !raw.contains("=?") {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    let mut after_word = false;

    while let Some(start) = rest.find("=?") {
        let (before, candidate) = rest.split_at(start);
        if let Some((decoded, len)) = parse_encoded_word(candidate) {
            if !(after_word && before.chars().all(char::is_whitespace)) {
                out.push_str(before);
            }
            out.push_str(&decoded);
            after_word = true;
            rest = &candidate[len..];
        } else {
            out.push_str(before);
            out.push_str("=?");
            after_word = false;
            rest = &candidate[2..];
        }
    }

    out.push_str(rest);
    out
}

/// Parses one encoded word at the start of `input`.
///
/// Returns the decoded text and the number of bytes consumed.
fn parse_encoded_word(input: &str) -> Option<(String, usize)> {
    let body = input.strip_prefix("=?")?;

    let charset_end = body.find('?')?;
    let charset = &body[..charset_end];
    let after_charset = &body[charset_end + 1..];

    let encoding_end = after_charset.find('?')?;
    let encoding = &after_charset[..encoding_end];
    let after_encoding = &after_charset[encoding_end + 1..];

    let text_end = after_encoding.find("?=")?;
    let text = &after_encoding[..text_end];

    let has_space = [charset, encoding, text]
        .iter()
        .any(|s| s.contains(char::is_whitespace));
    if charset.is_empty() || has_space {
        return None;
    }

    let bytes = match encoding {
        "B" | "b" => TransferEncoding::Base64.decode(text.as_bytes()),
        "Q" | "q" => decode_q(text.as_bytes()),
        _ => return None,
    };

    // RFC 2231 allows a language suffix: `=?utf-8*en?Q?...?=`
    let charset = charset.split_once('*').map_or(charset, |(c, _)| c);

    let consumed = 2 + charset_end + 1 + encoding_end + 1 + text_end + 2;
    Some((decode_charset(charset, &bytes), consumed))
}

/// Decodes the `Q` encoding: `_` is a space and `=XX` a hex byte.
fn decode_q(text: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(text.len());
    let mut i = 0;
    while i < text.len() {
        match text[i] {
            b'_' => result.push(b' '),
            b'=' => {
                let hex = text
                    .get(i + 1..i + 3)
                    .and_then(|pair| std::str::from_utf8(pair).ok())
                    .and_then(|pair| u8::from_str_radix(pair, 16).ok());
                if let Some(byte) = hex {
                    result.push(byte);
                    i += 3;
                    continue;
                }
                result.push(b'=');
            }
            b => result.push(b),
        }
        i += 1;
    }
    result
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::unreadable_literal)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_plain_value_unchanged() {
        assert_eq!(decode_header("hello world"), "hello world");
        assert_eq!(decode_header(""), "");
        assert_eq!(decode_header("a =? b"), "a =? b");
    }

    #[test]
    fn test_q_utf8() {
        assert_eq!(
            decode_header("=?UTF-8?Q?MIME_UTF8_Test_=C2=A2_More_Text?="),
            "MIME UTF8 Test \u{a2} More Text"
        );
    }

    #[test]
    fn test_q_ascii() {
        assert_eq!(decode_header("=?US-ASCII?Q?Test_QP_Subject!?="), "Test QP Subject!");
    }

    #[test]
    fn test_b_encoding() {
        assert_eq!(decode_header("=?utf-8?B?SMOpbGxv?="), "Héllo");
        assert_eq!(
            decode_header("=?ISO-8859-1?B?SWYgeW91IGNhbiByZWFkIHRoaXMgeW8=?="),
            "If you can read this yo"
        );
    }

    #[test]
    fn test_rfc2047_examples() {
        assert_eq!(decode_header("=?ISO-8859-1?Q?Andr=E9?= Pirard"), "André Pirard");
        assert_eq!(decode_header("(=?ISO-8859-1?Q?a?=)"), "(a)");
        assert_eq!(decode_header("(=?ISO-8859-1?Q?a?= b)"), "(a b)");
        assert_eq!(decode_header("(=?ISO-8859-1?Q?a?= =?ISO-8859-1?Q?b?=)"), "(ab)");
        assert_eq!(decode_header("(=?ISO-8859-1?Q?a?=  =?ISO-8859-1?Q?b?=)"), "(ab)");
        assert_eq!(
            decode_header("(=?ISO-8859-1?Q?a?=\r\n    =?ISO-8859-1?Q?b?=)"),
            "(ab)"
        );
        assert_eq!(decode_header("(=?ISO-8859-1?Q?a_b?=)"), "(a b)");
    }

    #[test]
    fn test_mixed_charsets_joined() {
        assert_eq!(
            decode_header("=?iso-8859-1?Q?Alerte_2e_d=E9marque?= =?utf-8?Q?_:_Soldes?="),
            "Alerte 2e démarque : Soldes"
        );
    }

    #[test]
    fn test_trailing_underscore_space_kept() {
        assert_eq!(
            decode_header("=?utf-8?Q?Pensez_=C3=A0_proteger_votre_habitation_?="),
            "Pensez à proteger votre habitation "
        );
    }

    #[test]
    fn test_language_suffix() {
        assert_eq!(decode_header("=?US-ASCII*EN?Q?Keith_Moore?="), "Keith Moore");
    }

    #[test]
    fn test_malformed_words_kept() {
        assert_eq!(decode_header("=?utf-8?X?abc?="), "=?utf-8?X?abc?=");
        assert_eq!(decode_header("=?utf-8?Q?never closed"), "=?utf-8?Q?never closed");
        assert_eq!(decode_header("=??Q?abc?="), "=??Q?abc?=");
    }

    #[test]
    fn test_unknown_charset_falls_back() {
        assert_eq!(decode_header("=?x-bogus?Q?caf=E9?="), "café");
    }

    proptest! {
        #[test]
        fn decode_header_never_panics(s in r"=\?.*\?.*\?.*\?=") {
            decode_header(&s);
        }

        #[test]
        fn plain_text_is_identity(s in "[^=]*") {
            prop_assert_eq!(decode_header(&s), s);
        }
    }
}
