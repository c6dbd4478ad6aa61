//! Inline image representation and upload validation.
//!
//! Every photo that flows through the pipeline (uploaded, captured, previewed
//! or finalized) travels as a self-describing string:
//!
//! ```text
//! data:image/jpeg;base64,/9j/4AAQSkZJRgABAQ...
//! ```
//!
//! The mime type is embedded next to a standard base64 payload, so the
//! transform service and the collage store can pass photos around without a
//! side channel for the type. [`DataUri::decode`] reproduces the original
//! bytes exactly.
//!
//! ## Acceptance rules
//!
//! | Check | Failure |
//! |---|---|
//! | Declared type is `image/jpeg`, `image/png` or `image/webp` | [`ValidationError::UnsupportedType`] |
//! | Payload is at most [`MAX_PHOTO_BYTES`] (4 MiB) | [`ValidationError::FileTooLarge`] |
//!
//! The type check runs first, so an oversized GIF reports the type problem.
//! There is no resize or recompression fallback: anything over the cap is
//! rejected outright to keep service payloads bounded.

use crate::artifact::{PhotoArtifact, SourceKind};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Hard cap on acquired photo payloads, in bytes.
pub const MAX_PHOTO_BYTES: usize = 4 * 1024 * 1024;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("image is {size} bytes, the limit is {limit} bytes")]
    FileTooLarge { size: usize, limit: usize },
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),
    #[error("malformed inline image: {0}")]
    Malformed(String),
}

/// Image encodings accepted anywhere in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageEncoding {
    Jpeg,
    Png,
    Webp,
}

impl ImageEncoding {
    pub const ALL: [ImageEncoding; 3] = [ImageEncoding::Jpeg, ImageEncoding::Png, ImageEncoding::Webp];

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageEncoding::Jpeg => "image/jpeg",
            ImageEncoding::Png => "image/png",
            ImageEncoding::Webp => "image/webp",
        }
    }

    /// Resolve a declared mime type. Comparison ignores case and
    /// surrounding whitespace.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        let mime = mime.trim();
        Self::ALL
            .into_iter()
            .find(|enc| enc.mime_type().eq_ignore_ascii_case(mime))
    }

    /// Map a file extension to the type a file picker would declare for it.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageEncoding::Jpeg),
            "png" => Some(ImageEncoding::Png),
            "webp" => Some(ImageEncoding::Webp),
            _ => None,
        }
    }

    /// File extension used when writing a download.
    pub fn extension(self) -> &'static str {
        match self {
            ImageEncoding::Jpeg => "jpg",
            ImageEncoding::Png => "png",
            ImageEncoding::Webp => "webp",
        }
    }
}

impl fmt::Display for ImageEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// Canonical `data:<mime>;base64,<payload>` string.
///
/// The text is shared, so clones are cheap regardless of image size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    encoding: ImageEncoding,
    text: Arc<str>,
}

impl DataUri {
    /// Encode raw bytes. Performs no size check; see [`validate_and_encode`].
    pub fn encode(encoding: ImageEncoding, bytes: &[u8]) -> Self {
        let text = format!("data:{};base64,{}", encoding.mime_type(), BASE64.encode(bytes));
        Self {
            encoding,
            text: text.into(),
        }
    }

    /// Parse an inline image produced elsewhere (typically the transform
    /// service). The payload must be valid standard base64 and the mime type
    /// one of the supported encodings.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let rest = text
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| ValidationError::Malformed("missing `data:` prefix".into()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| ValidationError::Malformed("missing `,` separator".into()))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| ValidationError::Malformed("payload is not base64".into()))?;
        let encoding = ImageEncoding::from_mime_type(mime)
            .ok_or_else(|| ValidationError::UnsupportedType(mime.to_string()))?;
        BASE64
            .decode(payload)
            .map_err(|e| ValidationError::Malformed(e.to_string()))?;

        let text = format!("data:{};base64,{}", encoding.mime_type(), payload);
        Ok(Self {
            encoding,
            text: text.into(),
        })
    }

    pub fn encoding(&self) -> ImageEncoding {
        self.encoding
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The base64 portion after the comma.
    fn payload(&self) -> &str {
        self.text
            .split_once(',')
            .map(|(_, payload)| payload)
            .unwrap_or_default()
    }

    /// Decode back to the original bytes.
    pub fn decode(&self) -> Result<Vec<u8>, ValidationError> {
        BASE64
            .decode(self.payload())
            .map_err(|e| ValidationError::Malformed(e.to_string()))
    }

    /// Decoded payload size, computed from the base64 length.
    pub fn byte_len(&self) -> usize {
        let payload = self.payload().as_bytes();
        let padding = payload.iter().rev().take_while(|&&b| b == b'=').count();
        (payload.len() / 4) * 3 - padding.min(2)
    }
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Validate an uploaded payload and wrap it as an [`Uploaded`](SourceKind::Uploaded) artifact.
pub fn validate_and_encode(
    raw: &[u8],
    declared_mime: &str,
) -> Result<PhotoArtifact, ValidationError> {
    validate_and_encode_as(raw, declared_mime, SourceKind::Uploaded)
}

/// Same checks as [`validate_and_encode`], tagging the artifact with `source`.
pub fn validate_and_encode_as(
    raw: &[u8],
    declared_mime: &str,
    source: SourceKind,
) -> Result<PhotoArtifact, ValidationError> {
    let encoding = ImageEncoding::from_mime_type(declared_mime)
        .ok_or_else(|| ValidationError::UnsupportedType(declared_mime.trim().to_string()))?;
    if raw.len() > MAX_PHOTO_BYTES {
        return Err(ValidationError::FileTooLarge {
            size: raw.len(),
            limit: MAX_PHOTO_BYTES,
        });
    }
    Ok(PhotoArtifact::new(DataUri::encode(encoding, raw), source))
}
