//! pixiquad-media: Media resizing and background removal logic (sans-IO).
//!
//! Everything here operates on in-memory byte slices:
//! validating target dimensions, reading image headers, resampling images
//! to an exact size, interpreting background removal responses, and the
//! two workflow state machines that tie uploads, async jobs and artifacts
//! together. Browser interaction lives in `pixiquad-io`; the credential
//! proxy lives in `pixiquad-proxy`.

pub mod artifact;
pub mod dimensions;
pub mod probe;
pub mod removal;
pub mod resize;
pub mod types;
pub mod workflow;

pub use artifact::{Downloadable, ImageArtifact, ProcessedImage, ResizedArtifact, VideoArtifact};
pub use dimensions::{MAX_TARGET_DIMENSION, MAX_TARGET_PIXELS, parse_target};
pub use removal::{RemoverConfig, RetryPolicy, interpret_response};
pub use resize::resize_image;
pub use types::{
    Axis, Dimensions, MediaKind, ProbeError, RemovalError, ResizeError, SourceMedia,
    ValidationError,
};
pub use workflow::{
    Completion, NativeDimensions, ProbeJob, RemovalJob, RemoverPhase, RemoverSession, ResizeJob,
    ResizeStep, ResizerSession, Ticket,
};
