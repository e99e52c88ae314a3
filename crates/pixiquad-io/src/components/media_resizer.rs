//! Media resizer view.

use std::rc::Rc;

use dioxus::logger::tracing;
use dioxus::prelude::*;
use pixiquad_media::{
    Completion, MediaKind, NativeDimensions, ResizeStep, ResizedArtifact, ResizerSession,
};

use super::FileUpload;
use super::upload::SelectedFile;
use crate::object_url::ObjectUrl;
use crate::probe::probe_native;
use crate::{download, notice};

/// Picker filter: image formats the resizer can decode, and any video.
pub(crate) const ACCEPT: &str = "image/png,image/jpeg,image/gif,image/webp,image/bmp,\
                                 image/tiff,image/x-icon,image/vnd.microsoft.icon,video/*";

/// Build a display URL for a resize result.
///
/// Videos are shown from the upload's own preview URL.
fn artifact_url(
    artifact: &ResizedArtifact,
    preview: Option<Rc<ObjectUrl>>,
) -> Option<Rc<ObjectUrl>> {
    let ResizedArtifact::Image(image) = artifact else {
        return preview;
    };
    match ObjectUrl::from_bytes(image.png(), "image/png") {
        Ok(url) => Some(Rc::new(url)),
        Err(e) => {
            tracing::error!(%e, "failed to create result URL");
            None
        }
    }
}

/// Upload an image or video, read its native size, and resize it to an
/// exact width and height.
///
/// Images are re-rasterized to PNG. Videos are never read into memory;
/// only the size the player is drawn at changes.
#[component]
pub fn MediaResizer() -> Element {
    let mut session = use_signal(ResizerSession::new);
    let mut preview = use_signal(|| Option::<Rc<ObjectUrl>>::None);
    let mut output = use_signal(|| Option::<Rc<ObjectUrl>>::None);
    let mut width = use_signal(String::new);
    let mut height = use_signal(String::new);

    let on_upload = move |selected: SelectedFile| {
        let (media, url) = selected.into_parts();
        preview.set(Some(Rc::clone(&url)));
        output.set(None);

        let probe = session.write().select(media);
        if let Some(job) = probe {
            spawn(async move {
                let result = probe_native(&job, &url).await;
                if let Err(ref e) = result {
                    tracing::warn!(%e, "could not read native dimensions");
                }
                if session.write().complete_probe(job.ticket(), result) == Completion::Stale {
                    tracing::debug!("discarding dimensions of a replaced upload");
                }
            });
        }
    };

    let on_resize = move |_| {
        let step = session.write().request_resize(&width(), &height());
        match step {
            Err(e) => notice::alert(&e.to_string()),
            Ok(ResizeStep::Published) => {
                let url = session
                    .read()
                    .artifact()
                    .and_then(|artifact| artifact_url(artifact, preview()));
                output.set(url);
            }
            Ok(ResizeStep::Render(job)) => {
                spawn(async move {
                    // Yield so the "Resizing..." state paints before the
                    // synchronous resize blocks the thread.
                    gloo_timers::future::TimeoutFuture::new(0).await;

                    let result = job.run();
                    let completion = session.write().complete_resize(job.ticket(), result);
                    match completion {
                        Ok(Completion::Applied) => {
                            tracing::info!(size = %job.target(), "image resized");
                            let url = session
                                .read()
                                .artifact()
                                .and_then(|artifact| artifact_url(artifact, preview()));
                            output.set(url);
                        }
                        Ok(Completion::Stale) => {
                            tracing::debug!("discarding superseded resize");
                        }
                        Err(e) => notice::alert(&format!("Resize failed: {e}")),
                    }
                });
            }
        }
    };

    let on_download = move |_| {
        let result = match session.read().artifact() {
            None => return,
            Some(ResizedArtifact::Image(image)) => download::download(image),
            Some(ResizedArtifact::Video(video)) => match output() {
                Some(url) => download::download_url(url.as_str(), video.file_name()),
                None => return,
            },
        };
        if let Err(e) = result {
            notice::alert(&format!("Download failed: {e}"));
        }
    };

    let state = session.read();
    let kind = state.source().map(pixiquad_media::SourceMedia::kind);
    let resizing = state.is_resizing();
    let native = state.native().clone();
    let artifact = state.artifact().cloned();
    drop(state);

    rsx! {
        section { class: "panel",
            h1 { class: "panel-title", "Media Resizer" }

            FileUpload {
                accept: ACCEPT,
                hint: "PNG, JPEG, GIF, WebP, BMP, TIFF or ICO images, and videos",
                on_upload: on_upload,
            }

            if let Some(ref url) = preview() {
                div { class: "panel-body",
                    match native {
                        NativeDimensions::Known(dims) => rsx! {
                            div { class: "dimensions",
                                p { class: "dimensions-title", "Current Dimensions:" }
                                p { "Width: {dims.width}px" }
                                p { "Height: {dims.height}px" }
                            }
                        },
                        NativeDimensions::Failed(ref msg) => rsx! {
                            p { class: "error-text", "Could not read dimensions: {msg}" }
                        },
                        NativeDimensions::Pending | NativeDimensions::Unknown => rsx! {},
                    }

                    div { class: "preview",
                        if kind == Some(MediaKind::Video) {
                            video { src: "{url}", controls: true }
                        } else {
                            img { src: "{url}", alt: "Preview" }
                        }
                    }

                    div { class: "dimension-inputs",
                        input {
                            r#type: "number",
                            min: "1",
                            placeholder: "Width (px)",
                            value: "{width}",
                            oninput: move |evt| width.set(evt.value()),
                        }
                        input {
                            r#type: "number",
                            min: "1",
                            placeholder: "Height (px)",
                            value: "{height}",
                            oninput: move |evt| height.set(evt.value()),
                        }
                    }

                    button {
                        class: "btn btn-blue",
                        disabled: resizing,
                        onclick: on_resize,
                        if resizing { "Resizing..." } else { "Resize" }
                    }
                }
            }

            if let (Some(artifact), Some(url)) = (artifact, output()) {
                div { class: "result",
                    h2 { class: "result-title", "Resized Media:" }
                    match artifact {
                        ResizedArtifact::Image(_) => rsx! {
                            img { src: "{url}", alt: "Resized" }
                        },
                        ResizedArtifact::Video(video) => {
                            let display = video.display();
                            rsx! {
                                video {
                                    src: "{url}",
                                    width: "{display.width}",
                                    height: "{display.height}",
                                    controls: true,
                                }
                            }
                        }
                    }
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
