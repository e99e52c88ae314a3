use crate::app_context::AppContext;
use crate::errors::ProxyError;
use axum::body::Bytes;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use pixiquad_media::removal::{API_KEY_HEADER, IMAGE_FIELD, SIZE_FIELD};
use reqwest::multipart::{Form, Part};

/// The image part of an incoming removal request.
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// What the upstream service answered, relayed as-is.
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

impl IntoResponse for UpstreamResponse {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.body).into_response();
        if let Some(content_type) = self.content_type {
            response.headers_mut().insert(CONTENT_TYPE, content_type);
        }
        response
    }
}

/// Send the image to the upstream service with the API key attached.
pub async fn forward(
    app_context: &AppContext,
    image: &ImageUpload,
    size: &str,
) -> Result<UpstreamResponse, ProxyError> {
    let untyped = || Part::stream(image.bytes.clone()).file_name(image.file_name.clone());
    // An unparsable content type is dropped rather than failing the request.
    let part = image
        .content_type
        .as_deref()
        .and_then(|content_type| untyped().mime_str(content_type).ok())
        .unwrap_or_else(untyped);
    let form = Form::new()
        .part(IMAGE_FIELD, part)
        .text(SIZE_FIELD, size.to_owned());

    let response = app_context
        .http_client
        .post(app_context.upstream_url.clone())
        .header(API_KEY_HEADER, app_context.api_key.as_ref())
        .multipart(form)
        .send()
        .await?;

    let status = response.status();
    let content_type = response.headers().get(CONTENT_TYPE).cloned();
    let body = response.bytes().await?;
    tracing::info!(
        task = "removebg",
        upstream_status = status.as_u16(),
        bytes = body.len(),
        "Upstream responded."
    );

    Ok(UpstreamResponse {
        status,
        content_type,
        body,
    })
}
