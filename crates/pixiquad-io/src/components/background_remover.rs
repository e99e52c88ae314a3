//! Background remover view.

use std::rc::Rc;

use dioxus::logger::tracing;
use dioxus::prelude::*;
use pixiquad_media::{Completion, Downloadable, RemovalError, RemoverSession};

use super::FileUpload;
use super::upload::SelectedFile;
use crate::object_url::ObjectUrl;
use crate::remove_bg::{CancelToken, RemovalClient};
use crate::{download, notice};

/// Props for the [`ImageBackgroundRemover`] component.
#[derive(Props, Clone, PartialEq)]
pub struct ImageBackgroundRemoverProps {
    /// Client used to send removal requests.
    client: RemovalClient,
}

/// Upload an image and replace its background with transparency using
/// the remote removal service.
#[component]
pub fn ImageBackgroundRemover(props: ImageBackgroundRemoverProps) -> Element {
    let mut session = use_signal(RemoverSession::new);
    let mut preview = use_signal(|| Option::<Rc<ObjectUrl>>::None);
    let mut processed = use_signal(|| Option::<Rc<ObjectUrl>>::None);
    let mut in_flight = use_signal(|| Option::<CancelToken>::None);
    let client = props.client;

    let on_upload = move |selected: SelectedFile| {
        if let Some(token) = in_flight.write().take() {
            tracing::debug!("cancelling removal for the previous upload");
            token.cancel();
        }
        let (media, url) = selected.into_parts();
        preview.set(Some(url));
        processed.set(None);
        session.write().select(media);
    };

    let on_remove = move |_| {
        let request = session.write().request_removal();
        let job = match request {
            Ok(job) => job,
            Err(e) => {
                notice::alert(&e.to_string());
                return;
            }
        };

        let token = CancelToken::new();
        if let Some(previous) = in_flight.write().replace(token.clone()) {
            previous.cancel();
        }

        let client = client.clone();
        spawn(async move {
            tracing::info!(file = job.file_name(), "requesting background removal");
            let result = client.remove_background(&job, &token).await;
            if in_flight.peek().as_ref() == Some(&token) {
                in_flight.set(None);
            }

            let completion = session.write().complete_removal(job.ticket(), result);
            match completion {
                Ok(Completion::Applied) => {
                    let url = session.read().processed().and_then(|image| {
                        ObjectUrl::from_bytes(image.bytes(), image.mime_type())
                            .map_err(|e| tracing::error!(%e, "failed to create result URL"))
                            .ok()
                    });
                    processed.set(url.map(Rc::new));
                }
                Ok(Completion::Stale) | Err(RemovalError::Cancelled) => {
                    tracing::debug!("discarding superseded removal");
                }
                Err(e) => {
                    tracing::error!(%e, "background removal failed");
                    notice::alert(&format!("Error removing background: {e}"));
                }
            }
        });
    };

    let on_download = move |_| {
        if let Some(image) = session.read().processed()
            && let Err(e) = download::download(image)
        {
            notice::alert(&format!("Download failed: {e}"));
        }
    };

    let pending = session.read().is_pending();
    let last_error = session.read().last_error().map(ToString::to_string);

    rsx! {
        section { class: "panel",
            h1 { class: "panel-title", "Background Remover" }

            FileUpload {
                accept: "image/*",
                hint: "Images only",
                on_upload: on_upload,
            }

            if let Some(ref url) = preview() {
                div { class: "panel-body",
                    h2 { class: "result-title", "Original Image:" }
                    div { class: "preview",
                        img { src: "{url}", alt: "Original Preview" }
                    }
                    button {
                        class: "btn btn-blue",
                        disabled: pending,
                        onclick: on_remove,
                        if pending { "Removing..." } else { "Remove Background" }
                    }
                    if let Some(ref err) = last_error {
                        p { class: "error-text", "{err}" }
                    }
                }
            }

            if let Some(ref url) = processed() {
                div { class: "result",
                    h2 { class: "result-title", "Processed Image:" }
                    img { class: "checkerboard", src: "{url}", alt: "Processed Preview" }
                    button {
                        class: "btn btn-pink",
                        onclick: on_download,
                        "Download"
                    }
                }
            }
        }
    }
}
