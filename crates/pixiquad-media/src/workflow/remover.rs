//! Background remover workflow state.

use std::sync::Arc;

use super::generation::{Completion, Generations, Ticket};
use crate::artifact::ProcessedImage;
use crate::types::{MediaKind, RemovalError, SourceMedia, ValidationError};

/// Where the remover view is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemoverPhase {
    /// No file selected.
    #[default]
    Idle,
    /// A file is selected and no request is in flight.
    Ready,
    /// A removal request is in flight.
    Pending,
    /// The latest request succeeded.
    Done,
}

/// A removal request to send.
#[derive(Debug, Clone)]
pub struct RemovalJob {
    ticket: Ticket,
    file_name: String,
    mime: String,
    bytes: Arc<[u8]>,
}

impl RemovalJob {
    /// Ticket to hand back with the result.
    #[must_use]
    pub const fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// Original filename, sent with the multipart image part.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// MIME type of the image part.
    #[must_use]
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Image bytes to upload.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// State of one background remover view.
#[derive(Debug, Default, Clone)]
pub struct RemoverSession {
    generations: Generations,
    source: Option<SourceMedia>,
    phase: RemoverPhase,
    processed: Option<ProcessedImage>,
    last_error: Option<RemovalError>,
}

impl RemoverSession {
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

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> RemoverPhase {
        self.phase
    }

    /// A request is in flight.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.phase, RemoverPhase::Pending)
    }

    /// The latest successful result for the current upload.
    #[must_use]
    pub const fn processed(&self) -> Option<&ProcessedImage> {
        self.processed.as_ref()
    }

    /// Why the latest request failed, if it did.
    #[must_use]
    pub const fn last_error(&self) -> Option<&RemovalError> {
        self.last_error.as_ref()
    }

    /// Replace the upload. Drops any previous result and error, and
    /// invalidates any request still in flight.
    pub fn select(&mut self, media: SourceMedia) {
        self.generations.next_upload();
        self.source = Some(media);
        self.processed = None;
        self.last_error = None;
        self.phase = RemoverPhase::Ready;
    }

    /// Validate and start a removal request.
    ///
    /// A request still in flight is superseded; its completion will be
    /// reported as [`Completion::Stale`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NoFile`] without an upload and
    /// [`ValidationError::UnsupportedMedia`] when the upload is not an
    /// image, and [`ValidationError::NotLoaded`] if its bytes were never
    /// read. The session is left untouched in each case.
    pub fn request_removal(&mut self) -> Result<RemovalJob, ValidationError> {
        let source = self.source.as_ref().ok_or(ValidationError::NoFile)?;
        if source.kind() != MediaKind::Image {
            return Err(ValidationError::UnsupportedMedia {
                mime: source.mime().to_owned(),
            });
        }
        let bytes = source.shared_bytes().ok_or(ValidationError::NotLoaded)?;

        let job = RemovalJob {
            ticket: self.generations.next_request(),
            file_name: source.name().to_owned(),
            mime: source.mime().to_owned(),
            bytes,
        };
        self.last_error = None;
        self.phase = RemoverPhase::Pending;
        Ok(job)
    }

    /// Record the outcome of a [`RemovalJob`].
    ///
    /// Success replaces the previous result. Failure returns to
    /// [`RemoverPhase::Ready`], keeps whatever result was already shown,
    /// and remembers the error (except cancellation).
    ///
    /// # Errors
    ///
    /// Returns the job's [`RemovalError`] if the job was current. Errors
    /// from superseded jobs are dropped and reported as
    /// [`Completion::Stale`].
    pub fn complete_removal(
        &mut self,
        ticket: Ticket,
        result: Result<ProcessedImage, RemovalError>,
    ) -> Result<Completion, RemovalError> {
        if !self.generations.is_current_request(ticket) {
            return Ok(Completion::Stale);
        }
        match result {
            Ok(image) => {
                self.processed = Some(image);
                self.last_error = None;
                self.phase = RemoverPhase::Done;
                Ok(Completion::Applied)
            }
            Err(e) => {
                self.phase = RemoverPhase::Ready;
                if e != RemovalError::Cancelled {
                    self.last_error = Some(e.clone());
                }
                Err(e)
            }
        }
    }

    /// Drop the upload and everything derived from it.
    pub fn clear(&mut self) {
        self.generations.next_upload();
        self.source = None;
        self.processed = None;
        self.last_error = None;
        self.phase = RemoverPhase::Idle;
    }
}
