use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pixiquad_media::removal::IMAGE_FIELD;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to build the upstream HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error("failed to bind the listen address: {0}")]
    Bind(#[source] std::io::Error),
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// A removal request failed before an upstream response was available.
///
/// Upstream error statuses are not represented here: they are passed
/// through to the client unchanged.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("missing multipart field `{IMAGE_FIELD}`")]
    MissingImage,
    #[error("malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),
    #[error("upstream request timed out")]
    UpstreamTimeout,
    #[error("upstream request failed: {0}")]
    Upstream(#[source] reqwest::Error),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingImage => StatusCode::BAD_REQUEST,
            Self::Multipart(e) => e.status(),
            Self::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::UpstreamTimeout
        } else {
            Self::Upstream(error)
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::warn!(task = "removebg", status = status.as_u16(), error = %self, "Request failed.");
        (status, self.to_string()).into_response()
    }
}
