//! Outputs of the two workflows and how they are saved.

use crate::types::Dimensions;

/// Download filename for a resized image.
pub const RESIZED_IMAGE_FILENAME: &str = "resized-image.png";

/// Download filename for a (cosmetically) resized video.
pub const RESIZED_VIDEO_FILENAME: &str = "resized-video.mp4";

/// Download filename for a background-removed image.
pub const BACKGROUND_REMOVED_FILENAME: &str = "background-removed.png";

/// In-memory output that can be saved to disk by the browser.
pub trait Downloadable {
    /// Fixed filename offered in the save dialog.
    fn file_name(&self) -> &'static str;

    /// MIME type of the Blob handed to the browser.
    fn mime_type(&self) -> &str;

    /// The exact bytes to save.
    fn bytes(&self) -> &[u8];
}

/// A re-rasterized image encoded as PNG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageArtifact {
    png: Vec<u8>,
    dimensions: Dimensions,
}

impl ImageArtifact {
    pub(crate) const fn new(png: Vec<u8>, dimensions: Dimensions) -> Self {
        Self { png, dimensions }
    }

    /// Encoded PNG bytes.
    #[must_use]
    pub fn png(&self) -> &[u8] {
        &self.png
    }

    /// Raster size of the PNG.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }
}

impl Downloadable for ImageArtifact {
    fn file_name(&self) -> &'static str {
        RESIZED_IMAGE_FILENAME
    }

    fn mime_type(&self) -> &str {
        "image/png"
    }

    fn bytes(&self) -> &[u8] {
        &self.png
    }
}

/// A video "resized" by display attributes only.
///
/// Carries no bytes: the player and the download both use the upload's
/// preview URL, so what is saved is the upload itself. Only the size the
/// player is drawn at changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoArtifact {
    mime: String,
    display: Dimensions,
}

impl VideoArtifact {
    /// Attach display dimensions to the current video upload.
    #[must_use]
    pub fn new(mime: impl Into<String>, display: Dimensions) -> Self {
        Self {
            mime: mime.into(),
            display,
        }
    }

    /// Fixed filename offered in the save dialog.
    #[must_use]
    pub const fn file_name(&self) -> &'static str {
        RESIZED_VIDEO_FILENAME
    }

    /// MIME type of the source upload.
    #[must_use]
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Size the player should be drawn at.
    #[must_use]
    pub const fn display(&self) -> Dimensions {
        self.display
    }
}

/// Output of the media resizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResizedArtifact {
    /// New pixel data at the target size.
    Image(ImageArtifact),
    /// Original video with display dimensions attached.
    Video(VideoArtifact),
}

impl ResizedArtifact {
    /// The requested target size.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        match self {
            Self::Image(image) => image.dimensions(),
            Self::Video(video) => video.display(),
        }
    }

    /// Fixed filename offered in the save dialog.
    #[must_use]
    pub const fn file_name(&self) -> &'static str {
        match self {
            Self::Image(_) => RESIZED_IMAGE_FILENAME,
            Self::Video(_) => RESIZED_VIDEO_FILENAME,
        }
    }
}

/// Image returned by the background removal service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedImage {
    bytes: Vec<u8>,
    mime: String,
}

impl ProcessedImage {
    /// Wrap a response body. A missing content type is treated as PNG.
    #[must_use]
    pub fn new(bytes: Vec<u8>, content_type: Option<&str>) -> Self {
        let mime = content_type
            .and_then(|ct| ct.split(';').next())
            .map(str::trim)
            .filter(|ct| ct.starts_with("image/"))
            .unwrap_or("image/png")
            .to_owned();
        Self { bytes, mime }
    }
}

impl Downloadable for ProcessedImage {
    fn file_name(&self) -> &'static str {
        BACKGROUND_REMOVED_FILENAME
    }

    fn mime_type(&self) -> &str {
        &self.mime
    }

    fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}
