//! Native dimension extraction in the browser.
//!
//! Images are handled by `pixiquad_media::probe`. Videos are never read
//! into memory: a detached `<video preload="metadata">` element is pointed
//! at the upload's preview URL and measured once `loadedmetadata` fires.
//! A load error or a missing event after [`VIDEO_PROBE_TIMEOUT_MS`]
//! resolves the probe with an error instead of leaving it pending.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use pixiquad_media::probe::{VIDEO_PROBE_TIMEOUT_MS, image_dimensions, video_dimensions};
use pixiquad_media::{Dimensions, MediaKind, ProbeError, ProbeJob};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::object_url::ObjectUrl;

/// Run a [`ProbeJob`] to completion.
///
/// `preview` is the object URL of the same upload; videos are measured
/// through it.
///
/// # Errors
///
/// Returns [`ProbeError`] if the dimensions cannot be determined.
#[allow(clippy::future_not_send)] // WASM is single-threaded; Send is not needed
pub async fn probe_native(job: &ProbeJob, preview: &ObjectUrl) -> Result<Dimensions, ProbeError> {
    match job.kind() {
        MediaKind::Image => job
            .bytes()
            .map_or(Err(ProbeError::EmptyInput), image_dimensions),
        MediaKind::Video => probe_video(preview.as_str(), VIDEO_PROBE_TIMEOUT_MS).await,
        MediaKind::Other => Err(ProbeError::Unsupported),
    }
}

/// Read `videoWidth`/`videoHeight` of the video at `src`.
///
/// `src` must stay valid until the returned future completes or is
/// dropped.
///
/// # Errors
///
/// Returns [`ProbeError::Metadata`] if the browser cannot load the file,
/// [`ProbeError::Timeout`] if metadata does not arrive within
/// `timeout_ms`, and [`ProbeError::ZeroSize`] for audio-only files.
#[allow(clippy::future_not_send)] // WASM is single-threaded; Send is not needed
pub async fn probe_video(src: &str, timeout_ms: u32) -> Result<Dimensions, ProbeError> {
    let video = create_video_element()?;

    // First event to fire wins; the others find the slot filled.
    let outcome = Rc::new(RefCell::new(None::<Result<(), ProbeError>>));
    let (promise, resolve) = new_promise();

    let settle = {
        let outcome = Rc::clone(&outcome);
        move |value: Result<(), ProbeError>| {
            let mut slot = outcome.borrow_mut();
            if slot.is_none() {
                *slot = Some(value);
                resolve.call0(&JsValue::NULL).ok();
            }
        }
    };

    let onloaded = {
        let settle = settle.clone();
        Closure::<dyn FnMut()>::new(move || settle(Ok(())))
    };
    let onerror = {
        let settle = settle.clone();
        let video = video.clone();
        Closure::<dyn FnMut()>::new(move || {
            let message = video
                .error()
                .map(|e| {
                    let detail = e.message();
                    if detail.is_empty() {
                        format!("media error code {}", e.code())
                    } else {
                        detail
                    }
                })
                .unwrap_or_else(|| "the file could not be decoded".into());
            settle(Err(ProbeError::Metadata(message)));
        })
    };
    let timer = Timeout::new(timeout_ms, move || {
        settle(Err(ProbeError::Timeout {
            after_ms: timeout_ms,
        }));
    });

    // Detaches on every exit, including this future being dropped
    // mid-await.
    let element = attach_video(video, onloaded, onerror, src);

    let _ = wasm_bindgen_futures::JsFuture::from(promise).await;

    drop(timer);
    let (width, height) = (element.element.video_width(), element.element.video_height());
    drop(element);

    let result = outcome
        .borrow_mut()
        .take()
        .unwrap_or_else(|| Err(ProbeError::Metadata("probe finished without a result".into())));
    result?;
    video_dimensions(width, height)
}

/// An element whose listeners and source can be cleared.
trait Detach {
    fn detach(&self);
}

impl Detach for web_sys::HtmlVideoElement {
    fn detach(&self) {
        self.set_onloadedmetadata(None);
        self.set_onerror(None);
        let _ = self.remove_attribute("src");
        self.load();
    }
}

/// An element with event handlers attached.
///
/// Dropping it detaches the element before the handlers are freed, so no
/// event can reach a dropped closure and a video stops fetching.
struct Attached<E: Detach, H> {
    element: E,
    _handlers: H,
}

impl<E: Detach, H> Drop for Attached<E, H> {
    fn drop(&mut self) {
        self.element.detach();
    }
}

type VideoHandlers = (Closure<dyn FnMut()>, Closure<dyn FnMut()>);

fn attach_video(
    video: web_sys::HtmlVideoElement,
    onloaded: Closure<dyn FnMut()>,
    onerror: Closure<dyn FnMut()>,
    src: &str,
) -> Attached<web_sys::HtmlVideoElement, VideoHandlers> {
    video.set_onloadedmetadata(Some(onloaded.as_ref().unchecked_ref()));
    video.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    video.set_src(src);
    Attached {
        element: video,
        _handlers: (onloaded, onerror),
    }
}

fn create_video_element() -> Result<web_sys::HtmlVideoElement, ProbeError> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| ProbeError::Metadata("no document".into()))?;
    let video = document
        .create_element("video")
        .map_err(|e| ProbeError::Metadata(format!("{e:?}")))?
        .dyn_into::<web_sys::HtmlVideoElement>()
        .map_err(|e| ProbeError::Metadata(format!("failed to cast element: {e:?}")))?;
    video.set_preload("metadata");
    video.set_muted(true);
    Ok(video)
}

/// Create a JS Promise along with its resolve function.
fn new_promise() -> (js_sys::Promise, js_sys::Function) {
    let resolve = Rc::new(RefCell::new(None::<js_sys::Function>));
    let resolve_clone = Rc::clone(&resolve);

    let promise = js_sys::Promise::new(&mut move |res, _rej| {
        *resolve_clone.borrow_mut() = Some(res);
    });

    let resolve_fn = resolve
        .borrow_mut()
        .take()
        .expect_throw("resolve not captured");

    (promise, resolve_fn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::task::{Context, Waker};

    type Log = Rc<RefCell<Vec<&'static str>>>;

    struct Element(Log);

    impl Detach for Element {
        fn detach(&self) {
            self.0.borrow_mut().push("detached");
        }
    }

    struct Handler(Log);

    impl Drop for Handler {
        fn drop(&mut self) {
            self.0.borrow_mut().push("freed");
        }
    }

    fn attached(log: &Log) -> Attached<Element, Handler> {
        Attached {
            element: Element(Rc::clone(log)),
            _handlers: Handler(Rc::clone(log)),
        }
    }

    #[test]
    fn handlers_outlive_the_attachment() {
        let log = Log::default();

        drop(attached(&log));

        assert_eq!(*log.borrow(), ["detached", "freed"]);
    }

    #[test]
    fn abandoned_wait_detaches() {
        let log = Log::default();
        let element = attached(&log);
        let mut wait = Box::pin(async move {
            let _element = element;
            std::future::pending::<()>().await;
        });

        let mut cx = Context::from_waker(Waker::noop());
        assert!(wait.as_mut().poll(&mut cx).is_pending());
        assert!(log.borrow().is_empty());

        drop(wait);

        assert_eq!(*log.borrow(), ["detached", "freed"]);
    }
}
