//! QR payload decoding.
//!
//! The handshake hands QR codes over as data URLs
//! (`data:image/png;base64,<payload>`). This module splits and decodes
//! them so the façade can stream the raw image bytes back to the caller.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

/// A QR payload that did not match the `data:<mime>;base64,<payload>` shape.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("malformed QR payload: {0}")]
pub struct QrDecodeError(String);

impl QrDecodeError {
    /// Wrap a failure description.
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// A decoded QR image ready to stream to a caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QrPayload {
    /// MIME type declared by the data URL, e.g. `image/png`.
    pub mime: String,
    /// Decoded image bytes.
    pub bytes: Vec<u8>,
}

impl QrPayload {
    /// Parse a `data:<mime>;base64,<payload>` string into MIME type and
    /// raw bytes.
    pub fn parse(data_url: &str) -> Result<Self, QrDecodeError> {
        let rest = data_url
            .strip_prefix("data:")
            .ok_or_else(|| QrDecodeError::new("missing data: prefix"))?;
        let (mime, body) = rest
            .split_once(";base64,")
            .ok_or_else(|| QrDecodeError::new("missing ;base64, marker"))?;
        if mime.is_empty() || !mime.chars().all(is_mime_char) {
            return Err(QrDecodeError::new(format!("invalid mime type {mime:?}")));
        }
        let bytes = STANDARD
            .decode(body.trim())
            .map_err(|e| QrDecodeError::new(format!("base64 body: {e}")))?;
        Ok(Self {
            mime: mime.to_owned(),
            bytes,
        })
    }
}

fn is_mime_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '+' | '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_png_data_url() {
        let url = format!("data:image/png;base64,{}", STANDARD.encode(b"png-bytes"));
        let qr = QrPayload::parse(&url).unwrap();
        assert_eq!(qr.mime, "image/png");
        assert_eq!(qr.bytes, b"png-bytes");
    }

    #[test]
    fn rejects_missing_prefix() {
        let err = QrPayload::parse("image/png;base64,AAAA").unwrap_err();
        assert!(err.to_string().contains("data: prefix"));
    }

    #[test]
    fn rejects_missing_base64_marker() {
        let err = QrPayload::parse("data:image/png,AAAA").unwrap_err();
        assert!(err.to_string().contains(";base64,"));
    }

    #[test]
    fn rejects_bad_base64_body() {
        let err = QrPayload::parse("data:image/png;base64,!!not-base64!!").unwrap_err();
        assert!(err.to_string().contains("base64 body"));
    }

    #[test]
    fn rejects_blank_or_odd_mime() {
        assert!(QrPayload::parse("data:;base64,AAAA").is_err());
        assert!(QrPayload::parse("data:image png;base64,AAAA").is_err());
    }

    #[test]
    fn tolerates_whitespace_around_body() {
        let url = format!("data:image/png;base64, {} ", STANDARD.encode(b"x"));
        let qr = QrPayload::parse(&url).unwrap();
        assert_eq!(qr.bytes, b"x");
    }
}
