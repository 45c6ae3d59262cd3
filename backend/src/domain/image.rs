//! Uploaded images: decoded payloads and stored references.
//!
//! Clients submit images inline as base64 `data:` URIs. The domain decodes
//! and checks them once; an [`ImageStore`](super::ports::ImageStore) adapter
//! persists the bytes and hands back an [`ImageRef`].

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// Largest accepted decoded image in bytes.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// URL prefix under which stored images are published.
pub const MEDIA_URL_PREFIX: &str = "/media/";

/// Validation errors raised while decoding an image payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageValidationError {
    #[error("image must be a base64 data URI")]
    NotDataUri,
    #[error("unsupported image type {media_type}")]
    UnsupportedType { media_type: String },
    #[error("image payload is not valid base64")]
    InvalidBase64,
    #[error("image payload is empty")]
    Empty,
    #[error("image exceeds {max} bytes")]
    TooLarge { max: usize },
}

impl ImageValidationError {
    /// Stable violation code used in error details.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotDataUri => "not_data_uri",
            Self::UnsupportedType { .. } => "unsupported_type",
            Self::InvalidBase64 => "invalid_base64",
            Self::Empty => "empty",
            Self::TooLarge { .. } => "too_large",
        }
    }
}

/// Image formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageFormat {
    fn from_media_subtype(subtype: &str) -> Option<Self> {
        match subtype.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpeg" | "jpg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// File extension used when storing the image.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }
}

/// Which collection an image belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Recipe,
    Avatar,
}

impl ImageKind {
    /// Directory name under the media root.
    pub fn directory(self) -> &'static str {
        match self {
            Self::Recipe => "recipes",
            Self::Avatar => "avatars",
        }
    }
}

/// Decoded image bytes with their detected format.
///
/// ## Invariants
/// - `bytes` is non-empty and at most [`MAX_IMAGE_BYTES`] long.
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload {
    format: ImageFormat,
    bytes: Vec<u8>,
}

impl fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePayload")
            .field("format", &self.format)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImagePayload {
    /// Decode a `data:image/<type>;base64,<data>` URI.
    ///
    /// # Examples
    /// ```
    /// use recipes::domain::ImagePayload;
    ///
    /// let payload = ImagePayload::parse_data_uri("data:image/png;base64,iVBORw0KGgo=")
    ///     .expect("valid payload");
    /// assert_eq!(payload.format().extension(), "png");
    /// ```
    pub fn parse_data_uri(raw: &str) -> Result<Self, ImageValidationError> {
        let rest = raw
            .trim()
            .strip_prefix("data:")
            .ok_or(ImageValidationError::NotDataUri)?;
        let (header, data) = rest
            .split_once(',')
            .ok_or(ImageValidationError::NotDataUri)?;
        let media_type = header
            .strip_suffix(";base64")
            .ok_or(ImageValidationError::NotDataUri)?;
        let format = media_type
            .strip_prefix("image/")
            .and_then(ImageFormat::from_media_subtype)
            .ok_or_else(|| ImageValidationError::UnsupportedType {
                media_type: media_type.to_owned(),
            })?;

        // Four base64 characters encode three bytes.
        if data.len() / 4 * 3 > MAX_IMAGE_BYTES + 3 {
            return Err(ImageValidationError::TooLarge {
                max: MAX_IMAGE_BYTES,
            });
        }
        let bytes = STANDARD
            .decode(data)
            .map_err(|_| ImageValidationError::InvalidBase64)?;
        Self::new(format, bytes)
    }

    /// Wrap already-decoded bytes.
    pub fn new(format: ImageFormat, bytes: Vec<u8>) -> Result<Self, ImageValidationError> {
        if bytes.is_empty() {
            return Err(ImageValidationError::Empty);
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ImageValidationError::TooLarge {
                max: MAX_IMAGE_BYTES,
            });
        }
        Ok(Self { format, bytes })
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Location of a stored image relative to the media root, e.g.
/// `recipes/5b1f….png`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    /// Wrap a stored relative path.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Public URL of the image.
    pub fn url(&self) -> String {
        format!("{MEDIA_URL_PREFIX}{}", self.0)
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
