use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;

#[derive(Debug)]
pub struct ImageStoreAPIError {
    status_code: StatusCode,
    message: String,
}

impl ImageStoreAPIError {
    pub fn new(status_code: StatusCode, message: &str) -> Self {
        Self {
            status_code,
            message: message.to_string(),
        }
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal_error(e: anyhow::Error) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string().as_str())
    }

    pub fn internal_error_str(e: &str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, e)
    }
}

impl IntoResponse for ImageStoreAPIError {
    fn into_response(self) -> Response {
        error!("API Error: {} - {}", self.status_code, self.message);
        (self.status_code, self.message).into_response()
    }
}

/// A bucket/object pair addressing one stored blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub bucket: String,
    pub object: String,
}

impl ObjectRef {
    /// Resolves a download request path of the form `/gcs/{bucket}/{object}`.
    ///
    /// The raw request path is what gets parsed; the matched route template
    /// is not consulted. The object part may itself contain `/`. Anything
    /// malformed is rejected here, before any backend call.
    pub fn from_request_path(path: &str) -> Result<Self, ImageStoreAPIError> {
        let splits: Vec<&str> = path.splitn(4, '/').collect();
        match splits.as_slice() {
            ["", "gcs", bucket, object] if !bucket.is_empty() && !object.is_empty() => Ok(Self {
                bucket: bucket.to_string(),
                object: object.to_string(),
            }),
            _ => Err(ImageStoreAPIError::bad_request(
                "the URL is not formed as expected, expecting /gcs/<bucket>/<object>",
            )),
        }
    }

    /// Public URL the storage provider serves this object under.
    ///
    /// No ACL is set at write time, so this URL 403s unless the bucket is
    /// publicly readable. Known gap, kept as-is; see README.
    pub fn public_url(&self, prefix: &str) -> String {
        if prefix.ends_with('/') {
            format!("{}{}/{}", prefix, self.bucket, self.object)
        } else {
            format!("{}/{}/{}", prefix, self.bucket, self.object)
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImageUploadResponse {
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}
