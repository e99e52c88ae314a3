use crate::app_context::AppContext;
use crate::errors::ProxyError;
use crate::removebg::upstream::{self, ImageUpload, UpstreamResponse};
use axum::extract::{Multipart, State};
use pixiquad_media::removal::{DEFAULT_SIZE, IMAGE_FIELD, SIZE_FIELD};

/// Fallback filename when the browser sends none.
const DEFAULT_FILE_NAME: &str = "image";

#[axum::debug_handler]
pub async fn remove_background(
    State(app_context): State<AppContext>,
    mut multipart: Multipart,
) -> Result<UpstreamResponse, ProxyError> {
    let mut image = None;
    let mut size = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some(IMAGE_FIELD) => {
                let file_name = field
                    .file_name()
                    .filter(|name| !name.is_empty())
                    .unwrap_or(DEFAULT_FILE_NAME)
                    .to_owned();
                let content_type = field.content_type().map(str::to_owned);
                let bytes = field.bytes().await?;
                image = Some(ImageUpload {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            Some(SIZE_FIELD) => size = Some(field.text().await?),
            _ => {}
        }
    }

    let image = image.ok_or(ProxyError::MissingImage)?;
    let size = size
        .as_deref()
        .map(str::trim)
        .filter(|size| !size.is_empty())
        .unwrap_or(DEFAULT_SIZE);
    tracing::info!(
        task = "removebg",
        file_name = %image.file_name,
        bytes = image.bytes.len(),
        size,
        "Forwarding background removal request."
    );

    upstream::forward(&app_context, &image, size).await
}
