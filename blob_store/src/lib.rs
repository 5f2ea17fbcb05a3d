//! Bucket-addressed blob storage over `object_store`.
//!
//! [`BlobStorageRegistry`] resolves bucket names to [`BlobStorage`] handles,
//! building each handle once with the configured retry budget. Handles stream
//! objects in and out through a fixed-size transfer buffer; see [`transfer`].

use std::time::Duration;

use object_store::RetryConfig;
use serde::{Deserialize, Serialize};

mod registry;
mod storage;
mod transfer;

pub use registry::BlobStorageRegistry;
pub use storage::{BlobStorage, PutResult};
pub use transfer::{transfer, TRANSFER_BUFFER_SIZE};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobStorageConfig {
    /// Where buckets are resolved. `gs://` maps each bucket name to a Google
    /// Cloud Storage bucket; `file:///some/root` maps it to a directory under
    /// the given root (local development and tests).
    #[serde(default = "default_storage_url")]
    pub url: String,

    #[serde(default)]
    pub retry: RetryOptions,
}

impl Default for BlobStorageConfig {
    fn default() -> Self {
        BlobStorageConfig {
            url: default_storage_url(),
            retry: RetryOptions::default(),
        }
    }
}

pub fn default_storage_url() -> String {
    "gs://".to_string()
}

/// Retry budget for backend operations: aggressive backoff, retrying up to
/// `max_retries` times but taking no more than `total_timeout_secs` total.
/// Applied to the cloud client; the local filesystem backend does not retry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryOptions {
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    #[serde(default = "default_total_timeout_secs")]
    pub total_timeout_secs: u64,
}

impl Default for RetryOptions {
    fn default() -> Self {
        RetryOptions {
            initial_backoff_ms: default_initial_backoff_ms(),
            max_retries: default_max_retries(),
            total_timeout_secs: default_total_timeout_secs(),
        }
    }
}

fn default_initial_backoff_ms() -> u64 {
    10
}

fn default_max_retries() -> usize {
    10
}

fn default_total_timeout_secs() -> u64 {
    15
}

impl RetryOptions {
    pub(crate) fn to_retry_config(&self) -> RetryConfig {
        let mut retry_config = RetryConfig::default();
        retry_config.backoff.init_backoff = Duration::from_millis(self.initial_backoff_ms);
        retry_config.max_retries = self.max_retries;
        retry_config.retry_timeout = Duration::from_secs(self.total_timeout_secs);
        retry_config
    }
}
