//! Background removal over `fetch`.
//!
//! [`RemovalClient`] posts a [`RemovalJob`] as multipart form data to the
//! configured endpoint (by default the same-origin `pixiquad-proxy`, which
//! attaches the API key). Each attempt is bounded by a timeout, transient
//! failures are retried with backoff, and a [`CancelToken`] aborts the
//! request in flight when the job is superseded.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use dioxus::logger::tracing;
use gloo_timers::callback::Timeout;
use gloo_timers::future::TimeoutFuture;
use pixiquad_media::removal::{IMAGE_FIELD, SIZE_FIELD};
use pixiquad_media::{ProcessedImage, RemovalError, RemovalJob, RemoverConfig, interpret_response};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, FormData, RequestInit, Response};

use crate::object_url::blob_from_bytes;

/// Cancels a removal request, including any retries not yet started.
///
/// Clones share state: cancelling any clone cancels them all.
#[derive(Clone, Default)]
pub struct CancelToken(Rc<CancelState>);

#[derive(Default)]
struct CancelState {
    cancelled: Cell<bool>,
    in_flight: RefCell<Option<AbortController>>,
}

impl CancelToken {
    /// A fresh, uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort the current attempt and prevent further ones.
    pub fn cancel(&self) {
        self.0.cancelled.set(true);
        if let Some(controller) = self.0.in_flight.borrow_mut().take() {
            controller.abort();
        }
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.cancelled.get()
    }

    fn arm(&self, controller: &AbortController) {
        *self.0.in_flight.borrow_mut() = Some(controller.clone());
    }

    fn disarm(&self) {
        self.0.in_flight.borrow_mut().take();
    }
}

impl PartialEq for CancelToken {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// Sends background removal requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalClient {
    config: RemoverConfig,
}

impl RemovalClient {
    /// Create a client with the given settings.
    #[must_use]
    pub const fn new(config: RemoverConfig) -> Self {
        Self { config }
    }

    /// Settings in use.
    #[must_use]
    pub const fn config(&self) -> &RemoverConfig {
        &self.config
    }

    /// Send `job`, retrying transient failures per the configured policy.
    ///
    /// # Errors
    ///
    /// Returns [`RemovalError::Cancelled`] once `token` is cancelled, or
    /// the error of the last attempt when retries are exhausted or the
    /// failure is permanent.
    #[allow(clippy::future_not_send)] // WASM is single-threaded; Send is not needed
    pub async fn remove_background(
        &self,
        job: &RemovalJob,
        token: &CancelToken,
    ) -> Result<ProcessedImage, RemovalError> {
        let mut attempt = 1;
        loop {
            if token.is_cancelled() {
                return Err(RemovalError::Cancelled);
            }
            let error = match self.attempt(job, token).await {
                Ok(image) => return Ok(image),
                Err(e) => e,
            };
            let Some(delay_ms) = self.config.retry.backoff(attempt, &error) else {
                return Err(error);
            };
            tracing::warn!(
                attempt,
                delay_ms,
                %error,
                "background removal failed, retrying"
            );
            TimeoutFuture::new(delay_ms).await;
            attempt += 1;
        }
    }

    #[allow(clippy::future_not_send)]
    async fn attempt(
        &self,
        job: &RemovalJob,
        token: &CancelToken,
    ) -> Result<ProcessedImage, RemovalError> {
        let controller = AbortController::new().map_err(network_error)?;
        token.arm(&controller);
        // Dropping the future (e.g. the view unmounting) aborts the fetch.
        let _abort = AbortOnDrop(controller.clone());

        let timeout_ms = self.config.timeout_ms;
        let timed_out = Rc::new(Cell::new(false));
        let timer = {
            let timed_out = Rc::clone(&timed_out);
            let controller = controller.clone();
            Timeout::new(timeout_ms, move || {
                timed_out.set(true);
                controller.abort();
            })
        };

        let classify = |e: JsValue| {
            if token.is_cancelled() {
                RemovalError::Cancelled
            } else if timed_out.get() {
                RemovalError::Timeout {
                    after_ms: timeout_ms,
                }
            } else {
                network_error(e)
            }
        };

        let result = async {
            let init = self.build_request(job, &controller).map_err(network_error)?;
            let window = web_sys::window()
                .ok_or_else(|| RemovalError::Network("no global window".into()))?;

            let response: Response = JsFuture::from(
                window.fetch_with_str_and_init(&self.config.endpoint, &init),
            )
            .await
            .map_err(classify)?
            .dyn_into()
            .map_err(|_| RemovalError::Network("fetch did not return a Response".into()))?;

            let status = response.status();
            let content_type = response.headers().get("content-type").ok().flatten();
            let buffer = JsFuture::from(response.array_buffer().map_err(network_error)?)
                .await
                .map_err(classify)?;
            let body = js_sys::Uint8Array::new(&buffer).to_vec();

            tracing::debug!(status, bytes = body.len(), "background removal response");
            interpret_response(status, content_type.as_deref(), body)
        }
        .await;

        drop(timer);
        token.disarm();
        result
    }

    fn build_request(
        &self,
        job: &RemovalJob,
        controller: &AbortController,
    ) -> Result<RequestInit, JsValue> {
        let form = FormData::new()?;
        let blob = blob_from_bytes(job.bytes(), job.mime())?;
        form.append_with_blob_and_filename(IMAGE_FIELD, &blob, job.file_name())?;
        form.append_with_str(SIZE_FIELD, &self.config.size)?;

        let init = RequestInit::new();
        init.set_method("POST");
        init.set_body(&form);
        init.set_signal(Some(&controller.signal()));
        Ok(init)
    }
}

struct AbortOnDrop(AbortController);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        // No-op once the response body has been read.
        self.0.abort();
    }
}

fn network_error(value: JsValue) -> RemovalError {
    let message = value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{value:?}"));
    RemovalError::Network(message)
}
