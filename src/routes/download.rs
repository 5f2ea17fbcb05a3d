use axum::{
    extract::{Request, State},
    response::Response,
};

use super::RouteState;
use crate::http_objects::{ImageStoreAPIError, ObjectRef};

/// Serves the object addressed by the request URI.
///
/// Resolution re-parses the raw request path as `/gcs/{bucket}/{object}`;
/// the matched route template plays no part in it.
#[axum::debug_handler]
pub async fn download_image(
    State(state): State<RouteState>,
    request: Request,
) -> Result<Response, ImageStoreAPIError> {
    let object = ObjectRef::from_request_path(request.uri().path())?;
    state.image_server.serve(&object).await
}
