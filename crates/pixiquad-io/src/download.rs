//! File download via Blob URLs.
//!
//! Dioxus has no built-in file download API.  This module triggers
//! downloads by programmatically clicking a temporary `<a>` element
//! pointed at an object URL, either one made from in-memory bytes or an
//! existing one such as an upload's preview.
//!
//! All functions in this module require a browser environment
//! (`wasm32-unknown-unknown` target).

use pixiquad_media::Downloadable;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;

use crate::object_url::{ObjectUrl, ObjectUrlError};

/// Errors that can occur when triggering a file download.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for DownloadError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

impl From<ObjectUrlError> for DownloadError {
    fn from(err: ObjectUrlError) -> Self {
        match err {
            ObjectUrlError::JsError(msg) => Self::JsError(msg),
        }
    }
}

/// Save an artifact under its fixed filename.
///
/// # Errors
///
/// See [`trigger_download`].
pub fn download(artifact: &impl Downloadable) -> Result<(), DownloadError> {
    trigger_download(artifact.bytes(), artifact.file_name(), artifact.mime_type())
}

/// Trigger a file download in the browser.
///
/// Creates a `Blob` from `data`, generates an object URL, and hands it to
/// [`download_url`]. The object URL is revoked after the click.
///
/// # Errors
///
/// Returns [`DownloadError::JsError`] if any browser API call fails
/// (e.g., `Blob` creation, `URL.createObjectURL`, element creation).
pub fn trigger_download(data: &[u8], filename: &str, mime_type: &str) -> Result<(), DownloadError> {
    // Revoked when it goes out of scope, after the click.
    let url = ObjectUrl::from_bytes(data, mime_type)?;
    download_url(url.as_str(), filename)
}

/// Save whatever `url` points at (e.g. an upload's preview URL) as
/// `filename`, by programmatically clicking a temporary
/// `<a download="filename">` element.
///
/// # Errors
///
/// Returns [`DownloadError::JsError`] if element creation or insertion
/// fails.
pub fn download_url(url: &str, filename: &str) -> Result<(), DownloadError> {
    let window =
        web_sys::window().ok_or_else(|| DownloadError::JsError("no global window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| DownloadError::JsError("no document".into()))?;

    // Create a temporary <a> element, set href and download, click it.
    let anchor: web_sys::HtmlAnchorElement = document
        .create_element("a")?
        .dyn_into::<web_sys::HtmlAnchorElement>()
        .map_err(|e| DownloadError::JsError(format!("failed to cast element: {e:?}")))?;

    anchor.set_href(url);
    anchor.set_download(filename);

    let body = document
        .body()
        .ok_or_else(|| DownloadError::JsError("no document body".into()))?;
    body.append_child(&anchor)?;
    anchor.click();

    // The download is already initiated; cleanup failures are not
    // download failures.
    let _ = body.remove_child(&anchor);

    Ok(())
}
