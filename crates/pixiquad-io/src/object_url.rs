//! Blob object URLs for previews and downloads.
//!
//! Hands out an object URL for a `Blob` (or a `File`, which is one) usable
//! as an `<img src>`, `<video src>` or `<a href>`. The URL is revoked when
//! the [`ObjectUrl`] is dropped, so storing one in a signal and replacing
//! it releases the previous Blob.

use std::fmt;

use wasm_bindgen::JsValue;
use web_sys::BlobPropertyBag;

/// Errors that can occur when creating an object URL.
#[derive(Debug, thiserror::Error)]
pub enum ObjectUrlError {
    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for ObjectUrlError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

/// Build a `Blob` of the given MIME type from raw bytes.
///
/// # Errors
///
/// Returns the browser's exception if the `Blob` cannot be constructed.
pub fn blob_from_bytes(bytes: &[u8], mime_type: &str) -> Result<web_sys::Blob, JsValue> {
    let uint8_array = js_sys::Uint8Array::from(bytes);
    let parts = js_sys::Array::new();
    parts.push(&uint8_array);

    let opts = BlobPropertyBag::new();
    opts.set_type(mime_type);
    web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &opts)
}

/// An object URL that is revoked on drop.
#[derive(PartialEq, Eq)]
pub struct ObjectUrl {
    url: String,
}

impl ObjectUrl {
    /// Copy `bytes` into a new `Blob` and create an object URL for it.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectUrlError::JsError`] if Blob or URL creation fails.
    pub fn from_bytes(bytes: &[u8], mime_type: &str) -> Result<Self, ObjectUrlError> {
        let blob = blob_from_bytes(bytes, mime_type)?;
        Self::from_blob(&blob)
    }

    /// Create an object URL referencing `blob` without copying it.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectUrlError::JsError`] if URL creation fails.
    pub fn from_blob(blob: &web_sys::Blob) -> Result<Self, ObjectUrlError> {
        let url = web_sys::Url::create_object_url_with_blob(blob)?;
        Ok(Self { url })
    }

    /// The `blob:` URL.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl fmt::Debug for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectUrl").field(&self.url).finish()
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        // Best-effort: the URL may already be gone with its document.
        let _ = web_sys::Url::revoke_object_url(&self.url);
    }
}
