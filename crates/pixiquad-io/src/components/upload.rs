//! File upload component with drag-and-drop and file picker.

use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dioxus::logger::tracing;
use dioxus::prelude::*;
use pixiquad_media::SourceMedia;
use pixiquad_media::types::{needs_contents, resolve_mime};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use crate::object_url::{ObjectUrl, ObjectUrlError};

static NEXT_INPUT_ID: AtomicUsize = AtomicUsize::new(0);

/// Check a MIME type against an `accept` attribute value.
///
/// Supports exact types (`image/png`) and wildcards (`image/*`). An empty
/// filter accepts everything. Extension entries (`.png`) are ignored: the
/// MIME type is what decides how a file is handled.
pub(crate) fn accepts(filter: &str, mime: &str) -> bool {
    let mut any_entry = false;
    for entry in filter.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        if entry.starts_with('.') {
            continue;
        }
        any_entry = true;
        let matched = entry.strip_suffix("/*").map_or_else(
            || entry.eq_ignore_ascii_case(mime),
            |prefix| {
                mime.split_once('/')
                    .is_some_and(|(top, _)| top.eq_ignore_ascii_case(prefix))
            },
        );
        if matched {
            return true;
        }
    }
    !any_entry
}

/// A file the user picked or dropped, with a preview URL for it.
///
/// The preview references the browser's `File` directly, so it costs no
/// copy. Only images have their bytes read into memory.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    media: SourceMedia,
    preview: Rc<ObjectUrl>,
}

impl SelectedFile {
    /// The upload as seen by the workflows.
    #[must_use]
    pub const fn media(&self) -> &SourceMedia {
        &self.media
    }

    /// Object URL of the file itself.
    #[must_use]
    pub const fn preview(&self) -> &Rc<ObjectUrl> {
        &self.preview
    }

    /// Split into the upload and its preview URL.
    #[must_use]
    pub fn into_parts(self) -> (SourceMedia, Rc<ObjectUrl>) {
        (self.media, self.preview)
    }
}

/// Wrap a browser `File`, reading its bytes only if the workflows need
/// them.
#[allow(clippy::future_not_send)] // WASM is single-threaded; Send is not needed
async fn open_file(file: &web_sys::File) -> Result<SelectedFile, ObjectUrlError> {
    let name = file.name();
    let reported = file.type_();
    let content_type = Some(reported.as_str()).filter(|t| !t.is_empty());
    let mime = resolve_mime(&name, content_type);

    let media = if needs_contents(mime) {
        let buffer = JsFuture::from(file.array_buffer()).await?;
        let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
        tracing::info!(%name, bytes = bytes.len(), "file read");
        SourceMedia::new(name, content_type, bytes)
    } else {
        tracing::info!(%name, size = file.size(), "file referenced");
        SourceMedia::unloaded(name, content_type)
    };
    let preview = ObjectUrl::from_blob(file)?;

    Ok(SelectedFile {
        media,
        preview: Rc::new(preview),
    })
}

fn file_input(id: &str) -> Option<web_sys::HtmlInputElement> {
    web_sys::window()?
        .document()?
        .get_element_by_id(id)?
        .dyn_into()
        .ok()
}

/// Props for the [`FileUpload`] component.
#[derive(Props, Clone, PartialEq)]
pub struct FileUploadProps {
    /// Value of the picker's `accept` attribute, also applied to drops.
    accept: &'static str,
    /// Short description of the accepted files.
    hint: &'static str,
    /// Called with the selected file once it is ready.
    on_upload: EventHandler<SelectedFile>,
}

/// A drag-and-drop zone with a file picker button.
///
/// A transparent file input covers the zone, so a dropped file arrives
/// through the same `change` event as a picked one. Files whose type does
/// not match `accept` are rejected here; the picker applies the same
/// filter natively but drops bypass it.
#[component]
pub fn FileUpload(props: FileUploadProps) -> Element {
    let mut dragging = use_signal(|| false);
    let mut filename = use_signal(|| Option::<String>::None);
    let mut error = use_signal(|| Option::<String>::None);
    let input_id = use_hook(|| {
        format!(
            "file-upload-{}",
            NEXT_INPUT_ID.fetch_add(1, Ordering::Relaxed)
        )
    });
    let accept = props.accept;

    let handle_change = {
        let input_id = input_id.clone();
        move |_: FormEvent| {
            let input_id = input_id.clone();
            async move {
                dragging.set(false);
                let Some(input) = file_input(&input_id) else {
                    tracing::error!(%input_id, "file input not found");
                    return;
                };
                let file = input.files().and_then(|files| files.get(0));
                // Lets the same file be chosen again.
                input.set_value("");
                let Some(file) = file else {
                    return;
                };

                let name = file.name();
                let reported = file.type_();
                let media_type = resolve_mime(&name, Some(reported.as_str()));
                if !accepts(accept, media_type) {
                    error.set(Some(format!("Unsupported file type: {name}")));
                    return;
                }
                match open_file(&file).await {
                    Ok(selected) => {
                        filename.set(Some(name));
                        error.set(None);
                        props.on_upload.call(selected);
                    }
                    Err(e) => {
                        error.set(Some(format!("Failed to read file: {e}")));
                    }
                }
            }
        }
    };

    let zone_class = if dragging() {
        "upload-zone dragging"
    } else {
        "upload-zone"
    };

    rsx! {
        div {
            class: "{zone_class}",
            ondragenter: move |_| dragging.set(true),
            ondragleave: move |_| dragging.set(false),

            input {
                id: "{input_id}",
                r#type: "file",
                accept: props.accept,
                class: "upload-input",
                onchange: handle_change,
            }

            if let Some(ref name) = filename() {
                p { class: "upload-loaded", "Loaded: {name}" }
            }

            if let Some(ref err) = error() {
                p { class: "upload-error", "{err}" }
            }

            p { class: "upload-prompt", "Drop a file here or " }

            span { class: "btn btn-pink", "Choose File" }

            p { class: "upload-hint", "{props.hint}" }
        }
    }
}
