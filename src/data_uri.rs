//! Data-URI parsing and base64 payload handling
//!
//! Uploads arrive as `data:image/<subtype>;base64,<payload>` strings, or as a
//! bare base64 payload. Responses go back out as JPEG data URIs.

use crate::Result;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use std::borrow::Cow;

pub const JPEG_DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

const IMAGE_SCHEME: &str = "data:image/";
const BASE64_MARKER: &str = ";base64,";

/// Standard alphabet, padding optional, trailing bits tolerated.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUri<'a> {
    /// Image subtype from the prefix (`png`, `jpeg`, ...), if a prefix was present.
    pub subtype: Option<&'a str>,
    pub payload: &'a str,
}

impl<'a> DataUri<'a> {
    /// Split off a leading `data:image/<subtype>;base64,` prefix.
    ///
    /// The subtype must be one or more ASCII word characters. Anything that does
    /// not match the prefix exactly is treated as a bare payload.
    pub fn parse(input: &'a str) -> Self {
        let bare = Self {
            subtype: None,
            payload: input,
        };

        let Some(rest) = input.strip_prefix(IMAGE_SCHEME) else {
            return bare;
        };
        let subtype_len = rest
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
            .count();
        if subtype_len == 0 {
            return bare;
        }

        let (subtype, rest) = rest.split_at(subtype_len);
        match rest.strip_prefix(BASE64_MARKER) {
            Some(payload) => Self {
                subtype: Some(subtype),
                payload,
            },
            None => bare,
        }
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        decode_base64(self.payload)
    }
}

/// Decode a standard base64 payload, ignoring embedded ASCII whitespace.
pub fn decode_base64(payload: &str) -> Result<Vec<u8>> {
    let compact: Cow<'_, [u8]> = if payload.bytes().any(|b| b.is_ascii_whitespace()) {
        Cow::Owned(
            payload
                .bytes()
                .filter(|b| !b.is_ascii_whitespace())
                .collect(),
        )
    } else {
        Cow::Borrowed(payload.as_bytes())
    };

    Ok(LENIENT.decode(compact)?)
}

/// Strip the prefix (if any) and decode what remains.
pub fn decode(input: &str) -> Result<Vec<u8>> {
    DataUri::parse(input).decode()
}

pub fn encode_jpeg(bytes: &[u8]) -> String {
    let mut uri = String::with_capacity(JPEG_DATA_URI_PREFIX.len() + bytes.len().div_ceil(3) * 4);
    uri.push_str(JPEG_DATA_URI_PREFIX);
    STANDARD.encode_string(bytes, &mut uri);
    uri
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_png_prefix() {
        let uri = DataUri::parse("data:image/png;base64,aGVsbG8=");
        assert_eq!(uri.subtype, Some("png"));
        assert_eq!(uri.payload, "aGVsbG8=");
    }

    #[test]
    fn test_parse_subtype_any_case() {
        let uri = DataUri::parse("data:image/JPEG;base64,aGVsbG8=");
        assert_eq!(uri.subtype, Some("JPEG"));
        assert_eq!(uri.payload, "aGVsbG8=");
    }

    #[test]
    fn test_parse_without_prefix_keeps_input() {
        let uri = DataUri::parse("aGVsbG8=");
        assert_eq!(uri.subtype, None);
        assert_eq!(uri.payload, "aGVsbG8=");
    }

    #[test]
    fn test_parse_rejects_non_word_subtype() {
        let input = "data:image/svg+xml;base64,PHN2Zz4=";
        let uri = DataUri::parse(input);
        assert_eq!(uri.subtype, None);
        assert_eq!(uri.payload, input);
    }

    #[test]
    fn test_parse_rejects_empty_subtype_and_missing_marker() {
        for input in [
            "data:image/;base64,AAAA",
            "data:image/png,AAAA",
            "data:text/plain;base64,AAAA",
        ] {
            assert_eq!(DataUri::parse(input).payload, input);
        }
    }

    #[test]
    fn test_decode_with_and_without_prefix() {
        assert_eq!(decode("data:image/webp;base64,aGVsbG8=").unwrap(), b"hello");
        assert_eq!(decode("aGVsbG8=").unwrap(), b"hello");
    }

    #[test]
    fn test_decode_tolerates_missing_padding_and_whitespace() {
        assert_eq!(decode_base64("aGVsbG8").unwrap(), b"hello");
        assert_eq!(decode_base64("aGVs\r\nbG8=\n").unwrap(), b"hello");
    }

    #[test]
    fn test_decode_malformed_base64_fails() {
        let err = decode("data:image/png;base64,@@not base64@@").unwrap_err();
        assert!(matches!(err, Error::Base64(_)));
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn test_encode_jpeg_data_uri() {
        assert_eq!(encode_jpeg(b"hello"), "data:image/jpeg;base64,aGVsbG8=");
        assert_eq!(encode_jpeg(&[]), JPEG_DATA_URI_PREFIX);
    }
}
