//! Background removal protocol (sans-IO).
//!
//! Describes the multipart request the remove.bg API expects, how to turn
//! its response into a [`ProcessedImage`] or a [`RemovalError`], and when
//! a failed attempt should be retried. Sending the request is left to the
//! caller: `pixiquad-io` uses the browser `fetch` API and `pixiquad-proxy`
//! uses `reqwest`.

use serde::{Deserialize, Serialize};

use crate::artifact::ProcessedImage;
use crate::types::RemovalError;

/// Multipart field carrying the image file.
pub const IMAGE_FIELD: &str = "image_file";

/// Multipart field selecting the output resolution.
pub const SIZE_FIELD: &str = "size";

/// Default value of [`SIZE_FIELD`]: the highest resolution the account allows.
pub const DEFAULT_SIZE: &str = "auto";

/// Header carrying the remove.bg API key.
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Public remove.bg endpoint.
pub const REMOVE_BG_URL: &str = "https://api.remove.bg/v1.0/removebg";

/// `pixiquad-proxy` on its default port, reachable from the `dx serve`
/// dev server. Deployed builds set `PIXIQUAD_REMOVE_BG_URL` instead.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8787/api/removebg";

/// Longest error body quoted back to the user.
const MAX_ERROR_TEXT: usize = 500;

/// Exponential backoff for transient removal failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first. `1` disables retries.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_backoff_ms: u32,
    /// Upper bound for any single delay.
    pub max_backoff_ms: u32,
}

impl RetryPolicy {
    /// No retries at all.
    pub const NONE: Self = Self {
        max_attempts: 1,
        initial_backoff_ms: 0,
        max_backoff_ms: 0,
    };

    /// Delay to wait after failed attempt number `attempt` (1-based), or
    /// `None` if the error is permanent or attempts are exhausted.
    #[must_use]
    pub fn backoff(&self, attempt: u32, error: &RemovalError) -> Option<u32> {
        if !error.is_transient() || attempt >= self.max_attempts {
            return None;
        }
        let exponent = attempt.saturating_sub(1).min(16);
        let delay = self.initial_backoff_ms.saturating_mul(1 << exponent);
        Some(delay.min(self.max_backoff_ms))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 4_000,
        }
    }
}

/// Client-side settings for background removal requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoverConfig {
    /// URL the multipart request is posted to.
    pub endpoint: String,
    /// Value sent in the [`SIZE_FIELD`] field.
    pub size: String,
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u32,
    /// Retry behavior for transient failures.
    pub retry: RetryPolicy,
}

impl RemoverConfig {
    /// Default settings pointed at a different endpoint.
    #[must_use]
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }
}

impl Default for RemoverConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            size: DEFAULT_SIZE.to_owned(),
            timeout_ms: 30_000,
            retry: RetryPolicy::default(),
        }
    }
}

/// Turn a completed HTTP response into the workflow result.
///
/// A 2xx body is taken byte-for-byte as the processed image. Any other
/// status becomes [`RemovalError::Service`] carrying the body text, or a
/// generic description when the body is empty.
///
/// # Errors
///
/// Returns [`RemovalError::Service`] for non-2xx statuses and
/// [`RemovalError::EmptyResponse`] for a 2xx response without a body.
pub fn interpret_response(
    status: u16,
    content_type: Option<&str>,
    body: Vec<u8>,
) -> Result<ProcessedImage, RemovalError> {
    if (200..300).contains(&status) {
        if body.is_empty() {
            return Err(RemovalError::EmptyResponse);
        }
        return Ok(ProcessedImage::new(body, content_type));
    }

    let text = String::from_utf8_lossy(&body);
    let text = text.trim();
    let message = if text.is_empty() {
        format!("request failed with status {status}")
    } else {
        truncate(text, MAX_ERROR_TEXT)
    };
    Err(RemovalError::Service { status, message })
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_owned();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &text[..end])
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::artifact::Downloadable;

    #[test]
    fn success_body_is_taken_verbatim() {
        let body: Vec<u8> = (0..=255).collect();
        let image = interpret_response(200, Some("image/png"), body.clone()).unwrap();
        assert_eq!(image.bytes(), body.as_slice());
        assert_eq!(image.file_name(), "background-removed.png");
    }

    #[test]
    fn empty_success_body_is_an_error() {
        assert_eq!(
            interpret_response(200, Some("image/png"), Vec::new()),
            Err(RemovalError::EmptyResponse)
        );
    }

    #[test]
    fn error_status_surfaces_body_text() {
        let body = br#"{"errors":[{"title":"Insufficient credits","code":"insufficient_credits"}]}"#;
        let err = interpret_response(402, Some("application/json"), body.to_vec()).unwrap_err();
        match &err {
            RemovalError::Service { status, message } => {
                assert_eq!(*status, 402);
                assert!(message.contains("Insufficient credits"), "{message}");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(err.to_string().starts_with("API Error: "));
    }

    #[test]
    fn error_status_without_body_gets_generic_message() {
        let err = interpret_response(503, None, b"  \n".to_vec()).unwrap_err();
        assert_eq!(
            err,
            RemovalError::Service {
                status: 503,
                message: "request failed with status 503".into()
            }
        );
    }

    #[test]
    fn long_error_text_is_truncated_on_a_char_boundary() {
        let body = "é".repeat(MAX_ERROR_TEXT);
        let err = interpret_response(400, None, body.into_bytes()).unwrap_err();
        let RemovalError::Service { message, .. } = err else {
            panic!("expected service error");
        };
        assert!(message.ends_with('…'));
        assert!(message.len() <= MAX_ERROR_TEXT + '…'.len_utf8());
    }

    #[test]
    fn backoff_grows_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 6,
            initial_backoff_ms: 500,
            max_backoff_ms: 3_000,
        };
        let err = RemovalError::Network("reset".into());
        assert_eq!(policy.backoff(1, &err), Some(500));
        assert_eq!(policy.backoff(2, &err), Some(1_000));
        assert_eq!(policy.backoff(3, &err), Some(2_000));
        assert_eq!(policy.backoff(4, &err), Some(3_000));
        assert_eq!(policy.backoff(5, &err), Some(3_000));
        assert_eq!(policy.backoff(6, &err), None);
    }

    #[test]
    fn permanent_errors_are_not_retried() {
        let policy = RetryPolicy::default();
        let err = RemovalError::Service {
            status: 403,
            message: "Forbidden".into(),
        };
        assert_eq!(policy.backoff(1, &err), None);
        assert_eq!(policy.backoff(1, &RemovalError::Cancelled), None);
    }

    #[test]
    fn none_policy_never_retries() {
        let err = RemovalError::Timeout { after_ms: 1 };
        assert_eq!(RetryPolicy::NONE.backoff(1, &err), None);
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = RemoverConfig::with_endpoint("https://proxy.example/api/removebg");
        let json = serde_json::to_string(&config).unwrap();
        let back: RemoverConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
        assert_eq!(back.size, "auto");
    }
}
