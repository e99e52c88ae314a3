//! Media resizer workflow state.

use std::sync::Arc;

use super::generation::{Completion, Generations, Ticket};
use crate::artifact::{ImageArtifact, ResizedArtifact, VideoArtifact};
use crate::dimensions::parse_target;
use crate::types::{
    Dimensions, MediaKind, ProbeError, ResizeError, SourceMedia, ValidationError,
    is_decodable_image,
};

/// What is known about the native size of the current upload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NativeDimensions {
    /// No upload, or an upload that is neither image nor video.
    #[default]
    Unknown,
    /// Extraction is in flight.
    Pending,
    /// Extraction finished.
    Known(Dimensions),
    /// Extraction failed; the message is shown to the user.
    Failed(String),
}

impl NativeDimensions {
    /// The dimensions, if known.
    #[must_use]
    pub const fn known(&self) -> Option<Dimensions> {
        match self {
            Self::Known(dimensions) => Some(*dimensions),
            _ => None,
        }
    }
}

/// Native dimension extraction to run for a fresh upload.
#[derive(Debug, Clone)]
pub struct ProbeJob {
    ticket: Ticket,
    kind: MediaKind,
    mime: String,
    bytes: Option<Arc<[u8]>>,
}

impl ProbeJob {
    /// Ticket to hand back with the result.
    #[must_use]
    pub const fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// Image or video. Never [`MediaKind::Other`].
    #[must_use]
    pub const fn kind(&self) -> MediaKind {
        self.kind
    }

    /// MIME type of the upload.
    #[must_use]
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Raw upload bytes. Present for images; videos are measured by the
    /// browser from the preview URL.
    #[must_use]
    pub fn bytes(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }
}

/// Image re-rasterization to run off the event handler.
#[derive(Debug, Clone)]
pub struct ResizeJob {
    ticket: Ticket,
    source: Arc<[u8]>,
    target: Dimensions,
}

impl ResizeJob {
    /// Ticket to hand back with the result.
    #[must_use]
    pub const fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// Requested output size.
    #[must_use]
    pub const fn target(&self) -> Dimensions {
        self.target
    }

    /// Decode, resample and encode. CPU-bound and synchronous.
    ///
    /// # Errors
    ///
    /// Propagates [`ResizeError`] from [`crate::resize::resize_image`].
    pub fn run(&self) -> Result<ImageArtifact, ResizeError> {
        crate::resize::resize_image(&self.source, self.target)
    }
}

/// Result of a valid resize request.
#[derive(Debug, Clone)]
pub enum ResizeStep {
    /// A video artifact was published immediately; nothing to run.
    Published,
    /// Run the job, then pass its result to
    /// [`ResizerSession::complete_resize`].
    Render(ResizeJob),
}

/// State of one media resizer view.
#[derive(Debug, Default, Clone)]
pub struct ResizerSession {
    generations: Generations,
    source: Option<SourceMedia>,
    native: NativeDimensions,
    artifact: Option<ResizedArtifact>,
    resizing: bool,
}

impl ResizerSession {
    /// An empty session with no upload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current upload.
    #[must_use]
    pub const fn source(&self) -> Option<&SourceMedia> {
        self.source.as_ref()
    }

    /// Native size of the current upload.
    #[must_use]
    pub const fn native(&self) -> &NativeDimensions {
        &self.native
    }

    /// The latest resize output.
    #[must_use]
    pub const fn artifact(&self) -> Option<&ResizedArtifact> {
        self.artifact.as_ref()
    }

    /// An image resize is in flight.
    #[must_use]
    pub const fn is_resizing(&self) -> bool {
        self.resizing
    }

    /// Replace the upload and reset all derived state.
    ///
    /// Returns the dimension extraction to run, or `None` when the file is
    /// neither an image nor a video, or is an image format with no
    /// decoder (reported as [`NativeDimensions::Failed`] right away).
    pub fn select(&mut self, media: SourceMedia) -> Option<ProbeJob> {
        let ticket = self.generations.next_upload();
        self.artifact = None;
        self.resizing = false;

        let kind = media.kind();
        let job = match kind {
            MediaKind::Image if !is_decodable_image(media.mime()) => {
                let error = ProbeError::UnsupportedImage {
                    mime: media.mime().to_owned(),
                };
                self.native = NativeDimensions::Failed(error.to_string());
                None
            }
            MediaKind::Image | MediaKind::Video => {
                self.native = NativeDimensions::Pending;
                Some(ProbeJob {
                    ticket,
                    kind,
                    mime: media.mime().to_owned(),
                    bytes: media.shared_bytes().filter(|_| kind == MediaKind::Image),
                })
            }
            MediaKind::Other => {
                self.native = NativeDimensions::Unknown;
                None
            }
        };
        self.source = Some(media);
        job
    }

    /// Record the outcome of a [`ProbeJob`].
    pub fn complete_probe(
        &mut self,
        ticket: Ticket,
        result: Result<Dimensions, ProbeError>,
    ) -> Completion {
        if !self.generations.is_current_upload(ticket) {
            return Completion::Stale;
        }
        self.native = match result {
            Ok(dimensions) => NativeDimensions::Known(dimensions),
            Err(e) => NativeDimensions::Failed(e.to_string()),
        };
        Completion::Applied
    }

    /// Validate the form and start a resize.
    ///
    /// Videos are "resized" on the spot by attaching display dimensions to
    /// the untouched upload. Images return a [`ResizeJob`] that supersedes
    /// any resize still in flight.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when there is no upload, the fields are
    /// not valid dimensions, or the upload is not a decodable image or a
    /// video. The session is left untouched in that case.
    pub fn request_resize(
        &mut self,
        width: &str,
        height: &str,
    ) -> Result<ResizeStep, ValidationError> {
        let source = self.source.as_ref().ok_or(ValidationError::NoFile)?;
        let target = parse_target(width, height)?;

        match source.kind() {
            MediaKind::Image => {
                if !is_decodable_image(source.mime()) {
                    return Err(ValidationError::UnsupportedMedia {
                        mime: source.mime().to_owned(),
                    });
                }
                let bytes = source.shared_bytes().ok_or(ValidationError::NotLoaded)?;
                let job = ResizeJob {
                    ticket: self.generations.next_request(),
                    source: bytes,
                    target,
                };
                self.resizing = true;
                Ok(ResizeStep::Render(job))
            }
            MediaKind::Video => {
                let artifact = VideoArtifact::new(source.mime(), target);
                self.generations.next_request();
                self.artifact = Some(ResizedArtifact::Video(artifact));
                self.resizing = false;
                Ok(ResizeStep::Published)
            }
            MediaKind::Other => Err(ValidationError::UnsupportedMedia {
                mime: source.mime().to_owned(),
            }),
        }
    }

    /// Record the outcome of a [`ResizeJob`].
    ///
    /// On success the new image replaces any previous artifact. On failure
    /// the previous artifact stays visible.
    ///
    /// # Errors
    ///
    /// Returns the job's [`ResizeError`] if the job was current. Errors
    /// from superseded jobs are dropped and reported as
    /// [`Completion::Stale`].
    pub fn complete_resize(
        &mut self,
        ticket: Ticket,
        result: Result<ImageArtifact, ResizeError>,
    ) -> Result<Completion, ResizeError> {
        if !self.generations.is_current_request(ticket) {
            return Ok(Completion::Stale);
        }
        self.resizing = false;
        let image = result?;
        self.artifact = Some(ResizedArtifact::Image(image));
        Ok(Completion::Applied)
    }

    /// Drop the upload and everything derived from it.
    pub fn clear(&mut self) {
        self.generations.next_upload();
        self.source = None;
        self.native = NativeDimensions::Unknown;
        self.artifact = None;
        self.resizing = false;
    }
}
