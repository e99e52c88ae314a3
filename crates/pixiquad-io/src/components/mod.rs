//! Dioxus UI components for pixiquad.
//!
//! Provides the site header, the upload zone shared by both tools, and the
//! media resizer and background remover views.

mod background_remover;
mod header;
mod media_resizer;
pub(crate) mod upload;

pub use background_remover::ImageBackgroundRemover;
pub use header::SiteHeader;
pub use media_resizer::MediaResizer;
pub use upload::{FileUpload, SelectedFile};
