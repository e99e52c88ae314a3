//! pixiquad-io: Browser I/O and Dioxus component library.
//!
//! Handles object URLs for previews, Blob downloads, video metadata
//! probing, `fetch`-based background removal with timeout, retry and
//! cancellation, and provides the UI components for the pixiquad web
//! application.

pub mod components;
pub mod download;
pub mod notice;
pub mod object_url;
pub mod probe;
pub mod remove_bg;

pub use components::{FileUpload, ImageBackgroundRemover, MediaResizer, SelectedFile, SiteHeader};
pub use object_url::ObjectUrl;
pub use remove_bg::{CancelToken, RemovalClient};
