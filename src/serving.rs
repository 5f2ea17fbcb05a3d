use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, StatusCode},
    response::Response,
};
use blob_store::BlobStorageRegistry;

use crate::http_objects::{ImageStoreAPIError, ObjectRef};

/// Serves a stored object's bytes to an HTTP response.
///
/// Two interchangeable strategies exist; which one is active is decided once
/// at startup from `ServerConfig::serve_mode`.
#[async_trait]
pub trait ImageServer: Send + Sync {
    async fn serve(&self, object: &ObjectRef) -> Result<Response, ImageStoreAPIError>;
}

/// Streams the object's bytes through this server.
pub struct StreamingImageServer {
    registry: Arc<BlobStorageRegistry>,
}

impl StreamingImageServer {
    pub fn new(registry: Arc<BlobStorageRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl ImageServer for StreamingImageServer {
    async fn serve(&self, object: &ObjectRef) -> Result<Response, ImageStoreAPIError> {
        let storage = self
            .registry
            .get(&object.bucket)
            .map_err(ImageStoreAPIError::internal_error)?;
        let reader = storage
            .get(&object.object)
            .await
            .map_err(ImageStoreAPIError::internal_error)?;

        Response::builder()
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(Body::from_stream(reader))
            .map_err(|e| ImageStoreAPIError::internal_error_str(&e.to_string()))
    }
}

/// Redirects the client to the object's public URL, leaving byte serving to
/// the storage provider's own HTTP surface.
pub struct RedirectImageServer {
    public_url_prefix: String,
}

impl RedirectImageServer {
    pub fn new(public_url_prefix: &str) -> Self {
        Self {
            public_url_prefix: public_url_prefix.to_string(),
        }
    }
}

#[async_trait]
impl ImageServer for RedirectImageServer {
    async fn serve(&self, object: &ObjectRef) -> Result<Response, ImageStoreAPIError> {
        Response::builder()
            .status(StatusCode::FOUND)
            .header(header::LOCATION, object.public_url(&self.public_url_prefix))
            .body(Body::empty())
            .map_err(|e| ImageStoreAPIError::internal_error_str(&e.to_string()))
    }
}
