//! Inline binary payload helpers
//!
//! Clients may submit binary content inline as a base64 string, optionally
//! wrapped in a `data:<media-type>;base64,` header. This module detects that
//! shape, decodes it, and maps the media-type hint to a file extension.
//!
//! Any payload that passes the shape test decodes: unused trailing bits in
//! the last group are ignored rather than rejected.
//!
//! Detection is a shape test only. Short alphanumeric text such as `"test"` is
//! valid base64 too, so callers that have an explicit content-type tag should
//! prefer it over [`EncodedPayload::sniff`].

use std::sync::LazyLock;

use base64::{
    alphabet,
    engine::{GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};
use regex::Regex;

use crate::error::{CommonError, Result};

/// Media type used when a payload carries no usable hint.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Extension used when the media type is unknown or absent.
pub const FALLBACK_EXTENSION: &str = "bin";

/// Standard alphabet with canonical padding, tolerant of non-zero trailing bits.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

#[allow(clippy::expect_used)]
static BASE64_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[0-9A-Za-z+/]{4})*(?:[0-9A-Za-z+/]{2}==|[0-9A-Za-z+/]{3}=)?$")
        .expect("base64 shape pattern is a valid literal")
});

#[allow(clippy::expect_used)]
static DATA_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:([^;,]+)(?:;[^;,=]+=[^;,]*)*;base64,(.*)$")
        .expect("data URL pattern is a valid literal")
});

/// How an encoded payload was presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// `data:<media-type>[;<attribute>=<value>]*;base64,<payload>`
    DataUrl,
    /// The whole value is the payload.
    Bare,
}

/// A value split into its optional media-type hint and its encoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload<'a> {
    /// Normalised media type essence (e.g. `image/png`), if one was given and parses.
    pub media_type: Option<String>,
    /// The base64 text, without any data-URL header.
    pub data: &'a str,
    pub shape: PayloadShape,
}

impl<'a> EncodedPayload<'a> {
    /// Split an optional data-URL header off `value`.
    ///
    /// The payload itself is not validated; use [`EncodedPayload::is_base64`].
    pub fn parse(value: &'a str) -> Self {
        match DATA_URL.captures(value) {
            Some(caps) => {
                let media_type = caps.get(1).and_then(|m| normalize_media_type(m.as_str()));
                let data = caps.get(2).map_or("", |m| m.as_str());
                Self {
                    media_type,
                    data,
                    shape: PayloadShape::DataUrl,
                }
            },
            None => Self {
                media_type: None,
                data: value,
                shape: PayloadShape::Bare,
            },
        }
    }

    /// Returns the split payload when `value` has base64 shape.
    ///
    /// Empty values and empty data-URL payloads never qualify.
    pub fn sniff(value: &'a str) -> Option<Self> {
        let payload = Self::parse(value);
        payload.is_base64().then_some(payload)
    }

    /// Whether the payload is non-empty, correctly padded base64.
    pub fn is_base64(&self) -> bool {
        !self.data.is_empty() && is_base64_shaped(self.data)
    }

    /// Decode the payload into raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        if self.data.is_empty() {
            return Err(CommonError::EmptyPayload);
        }
        let bytes = LENIENT.decode(self.data)?;
        if bytes.is_empty() {
            return Err(CommonError::EmptyPayload);
        }
        Ok(bytes)
    }

    /// The media type to store the decoded bytes with.
    pub fn media_type_or_default(&self) -> &str {
        self.media_type.as_deref().unwrap_or(OCTET_STREAM)
    }

    /// File extension for the payload's media type.
    pub fn extension(&self) -> &'static str {
        extension_for(self.media_type.as_deref())
    }
}

/// Base64 alphabet only, whole 4-character groups, padding only at the end.
pub fn is_base64_shaped(raw: &str) -> bool {
    raw.len() % 4 == 0 && BASE64_SHAPE.is_match(raw)
}

/// Parse a media type and return its lowercase essence (`type/subtype`).
pub fn normalize_media_type(raw: &str) -> Option<String> {
    raw.trim()
        .parse::<mime::Mime>()
        .ok()
        .map(|m| m.essence_str().to_ascii_lowercase())
}

/// Map a media type to the extension used for stored files.
pub fn extension_for(media_type: Option<&str>) -> &'static str {
    match media_type {
        Some("image/png") => "png",
        Some("image/jpeg") | Some("image/jpg") => "jpg",
        Some("image/webp") => "webp",
        Some("image/gif") => "gif",
        Some("application/pdf") => "pdf",
        _ => FALLBACK_EXTENSION,
    }
}
