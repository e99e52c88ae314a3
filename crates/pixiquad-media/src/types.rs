//! Shared types for pixiquad media handling.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Image or video dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Create dimensions, returning `None` if either side is zero.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            None
        } else {
            Some(Self { width, height })
        }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// One axis of a [`Dimensions`] value, used in validation messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Horizontal size.
    Width,
    /// Vertical size.
    Height,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Width => f.write_str("width"),
            Self::Height => f.write_str("height"),
        }
    }
}

/// Broad category of an uploaded file, decided by its MIME type prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// `image/*`
    Image,
    /// `video/*`
    Video,
    /// Anything else. Accepted on upload, rejected by the resizer.
    Other,
}

/// File extensions used to guess a MIME type when the browser reports none.
const EXTENSION_MIME: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("webp", "image/webp"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("ico", "image/x-icon"),
    ("mp4", "video/mp4"),
    ("m4v", "video/mp4"),
    ("webm", "video/webm"),
    ("ogv", "video/ogg"),
    ("mov", "video/quicktime"),
];

/// Image MIME types the resizer can probe and re-rasterize.
///
/// Mirrors the codecs enabled on the `image` dependency. Other `image/*`
/// types (SVG, AVIF, HEIC) still classify as [`MediaKind::Image`] but are
/// rejected by the resizer.
pub const DECODABLE_IMAGE_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/gif",
    "image/webp",
    "image/bmp",
    "image/tiff",
    "image/x-icon",
    "image/vnd.microsoft.icon",
];

/// Whether `mime` is one of [`DECODABLE_IMAGE_TYPES`] (parameters and
/// case ignored).
#[must_use]
pub fn is_decodable_image(mime: &str) -> bool {
    let essence = mime.split(';').next().unwrap_or_default().trim();
    DECODABLE_IMAGE_TYPES
        .iter()
        .any(|t| t.eq_ignore_ascii_case(essence))
}

impl MediaKind {
    /// Classify a MIME type by its `image/` or `video/` prefix.
    #[must_use]
    pub fn from_mime(mime: &str) -> Self {
        let mime = mime.trim();
        if mime.starts_with("image/") {
            Self::Image
        } else if mime.starts_with("video/") {
            Self::Video
        } else {
            Self::Other
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => f.write_str("image"),
            Self::Video => f.write_str("video"),
            Self::Other => f.write_str("unsupported file"),
        }
    }
}

/// Guess a MIME type from a filename extension (case-insensitive).
#[must_use]
pub fn guess_mime(name: &str) -> Option<&'static str> {
    let (_, ext) = name.rsplit_once('.')?;
    EXTENSION_MIME
        .iter()
        .find(|(e, _)| e.eq_ignore_ascii_case(ext))
        .map(|(_, mime)| *mime)
}

/// A user-selected file.
///
/// Images are read into memory because probing, resizing and background
/// removal all work on their bytes. Videos are never read: the browser
/// plays, measures and saves them through the preview URL, so their
/// contents stay out of linear memory.
///
/// Loaded bytes are reference counted so jobs can borrow them without
/// copying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMedia {
    name: String,
    mime: String,
    kind: MediaKind,
    bytes: Option<Arc<[u8]>>,
}

impl SourceMedia {
    /// Wrap an uploaded file whose bytes have been read.
    ///
    /// When `content_type` is missing or empty the MIME type is guessed
    /// from the filename, falling back to `application/octet-stream`.
    #[must_use]
    pub fn new(name: impl Into<String>, content_type: Option<&str>, bytes: Vec<u8>) -> Self {
        let mut media = Self::unloaded(name, content_type);
        media.bytes = Some(bytes.into());
        media
    }

    /// Wrap an uploaded file whose bytes stay in the browser.
    #[must_use]
    pub fn unloaded(name: impl Into<String>, content_type: Option<&str>) -> Self {
        let name = name.into();
        let mime = resolve_mime(&name, content_type).to_owned();
        let kind = MediaKind::from_mime(&mime);
        Self {
            name,
            mime,
            kind,
            bytes: None,
        }
    }

    /// Original filename.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// MIME type as reported by the browser (or guessed).
    #[must_use]
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Image, video, or other.
    #[must_use]
    pub const fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Raw file contents, if they were read.
    #[must_use]
    pub fn bytes(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }

    /// Shared handle to the raw file contents, if they were read.
    #[must_use]
    pub fn shared_bytes(&self) -> Option<Arc<[u8]>> {
        self.bytes.clone()
    }
}

/// MIME type for an upload: the reported type, else a guess from the
/// extension, else `application/octet-stream`.
#[must_use]
pub fn resolve_mime<'a>(name: &str, content_type: Option<&'a str>) -> &'a str {
    content_type
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .or_else(|| guess_mime(name))
        .unwrap_or("application/octet-stream")
}

/// Whether an upload of this type has to be read into memory.
///
/// Only images are: everything done with a video happens in the browser.
#[must_use]
pub fn needs_contents(mime: &str) -> bool {
    MediaKind::from_mime(mime) == MediaKind::Image
}

/// A user action was rejected before any work started.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The action needs an uploaded file and there is none.
    #[error("Please upload a file first.")]
    NoFile,

    /// A target dimension is missing, zero, negative, or not a whole number.
    #[error("Please enter valid dimensions: {axis} {value:?} is not a positive whole number.")]
    InvalidDimension {
        /// Which field was rejected.
        axis: Axis,
        /// The text the user entered.
        value: String,
    },

    /// A target dimension exceeds the supported maximum.
    #[error("Please enter valid dimensions: {axis} {value} exceeds the maximum of {max} pixels.")]
    DimensionTooLarge {
        /// Which field was rejected.
        axis: Axis,
        /// The parsed value.
        value: u32,
        /// Largest accepted value.
        max: u32,
    },

    /// The target is within the per-side limit but too many pixels overall.
    #[error(
        "Please enter valid dimensions: {width}x{height} exceeds the maximum of {max} pixels in total."
    )]
    AreaTooLarge {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
        /// Largest accepted `width * height`.
        max: u64,
    },

    /// The file's contents were not read, so it cannot be processed.
    #[error("The file could not be read. Please upload it again.")]
    NotLoaded,

    /// The uploaded file's type is not handled by this workflow.
    #[error("Unsupported file type: {mime}")]
    UnsupportedMedia {
        /// MIME type of the rejected upload.
        mime: String,
    },
}

/// Native dimensions could not be determined.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    /// The file contained no bytes.
    #[error("the file is empty")]
    EmptyInput,

    /// The image header could not be decoded.
    #[error("failed to read image dimensions: {0}")]
    Decode(String),

    /// The browser could not load the video metadata.
    #[error("failed to load video metadata: {0}")]
    Metadata(String),

    /// The media reported a zero width or height.
    #[error("the media reports no picture (zero width or height)")]
    ZeroSize,

    /// Metadata did not arrive within the allotted time.
    #[error("timed out after {after_ms} ms waiting for media metadata")]
    Timeout {
        /// How long the probe waited.
        after_ms: u32,
    },

    /// The image format has no decoder.
    #[error("{mime} images cannot be read; use PNG, JPEG, GIF, WebP, BMP, TIFF or ICO")]
    UnsupportedImage {
        /// MIME type of the upload.
        mime: String,
    },

    /// The file is neither an image nor a video.
    #[error("dimensions are only available for images and videos")]
    Unsupported,
}

/// The image resizer failed after validation succeeded.
#[derive(Debug, thiserror::Error)]
pub enum ResizeError {
    /// The source image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// The source image could not be decoded.
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    /// Resampling would need more memory than the resizer allows.
    #[error("resizing {source_width}x{source_height} to {target} needs about {needed} bytes, over the {limit} byte limit")]
    TooLarge {
        /// Decoded source width.
        source_width: u32,
        /// Decoded source height.
        source_height: u32,
        /// Requested output size.
        target: Dimensions,
        /// Estimated peak allocation.
        needed: u64,
        /// Allowed peak allocation.
        limit: u64,
    },

    /// The resized image could not be encoded as PNG.
    #[error("failed to encode resized image: {0}")]
    Encode(#[source] image::ImageError),
}

/// A background removal request failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemovalError {
    /// The service answered with a non-success status.
    #[error("API Error: {message}")]
    Service {
        /// HTTP status code.
        status: u16,
        /// Error text from the response body, or a generic description.
        message: String,
    },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The request did not complete in time.
    #[error("request timed out after {after_ms} ms")]
    Timeout {
        /// Per-attempt timeout that elapsed.
        after_ms: u32,
    },

    /// The request was aborted because it was superseded.
    #[error("request cancelled")]
    Cancelled,

    /// The service answered with success but sent no image.
    #[error("the service returned an empty image")]
    EmptyResponse,
}

impl RemovalError {
    /// Whether retrying the same request might succeed.
    ///
    /// Network faults, timeouts, rate limiting (429) and server errors
    /// (5xx) are transient. Client errors and cancellation are not.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout { .. } => true,
            Self::Service { status, .. } => *status == 429 || *status >= 500,
            Self::Cancelled | Self::EmptyResponse => false,
        }
    }
}
