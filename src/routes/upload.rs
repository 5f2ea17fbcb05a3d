use anyhow::anyhow;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use futures::StreamExt;
use tracing::info;

use super::RouteState;
use crate::http_objects::{ImageStoreAPIError, ImageUploadResponse, ObjectRef};

/// Writes multipart field `image` to the configured upload bucket under the
/// object name given in the path, replacing any previous content, and returns
/// the object's public URL.
pub async fn upload_image(
    Path(file_name): Path<String>,
    State(state): State<RouteState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ImageUploadResponse>), ImageStoreAPIError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ImageStoreAPIError::bad_request(&e.to_string()))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let storage = state
            .registry
            .get(&state.config.upload_bucket)
            .map_err(ImageStoreAPIError::internal_error)?;
        let stream = field.map(|chunk| chunk.map_err(|e| anyhow!(e)));
        let put_result = storage
            .put(&file_name, stream, &state.config.upload_content_type)
            .await
            .map_err(ImageStoreAPIError::internal_error)?;

        let object = ObjectRef {
            bucket: state.config.upload_bucket.clone(),
            object: file_name,
        };
        info!(
            bucket = %object.bucket,
            object = %object.object,
            size_bytes = put_result.size_bytes,
            "uploaded image"
        );

        return Ok((
            StatusCode::CREATED,
            Json(ImageUploadResponse {
                image_url: object.public_url(&state.config.public_url_prefix),
            }),
        ));
    }

    Err(ImageStoreAPIError::bad_request(
        "multipart field 'image' is required",
    ))
}
