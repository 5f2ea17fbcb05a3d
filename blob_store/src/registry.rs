use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use anyhow::{anyhow, Result};
use object_store::{gcp::GoogleCloudStorageBuilder, local::LocalFileSystem, ObjectStore};

use crate::{storage::BlobStorage, BlobStorageConfig};

/// Resolves bucket names to storage handles.
///
/// Built once at startup; handles are created on first use, cached, and never
/// mutated afterwards.
pub struct BlobStorageRegistry {
    config: BlobStorageConfig,
    buckets: Mutex<HashMap<String, Arc<BlobStorage>>>,
}

impl BlobStorageRegistry {
    pub fn new(config: BlobStorageConfig) -> Result<Self> {
        if !config.url.starts_with("gs://") && !config.url.starts_with("file://") {
            return Err(anyhow!(
                "unsupported blob storage url: {}, expecting gs:// or file://",
                config.url
            ));
        }
        Ok(Self {
            config,
            buckets: Mutex::new(HashMap::new()),
        })
    }

    pub fn get(&self, bucket: &str) -> Result<Arc<BlobStorage>> {
        if bucket.is_empty() {
            return Err(anyhow!("bucket name must not be empty"));
        }
        let mut buckets = self.buckets.lock().unwrap();
        if let Some(storage) = buckets.get(bucket) {
            return Ok(storage.clone());
        }
        let (store, attributes_supported) = self.build_store(bucket)?;
        let storage = Arc::new(BlobStorage::new(store, bucket, attributes_supported));
        buckets.insert(bucket.to_string(), storage.clone());
        Ok(storage)
    }

    fn build_store(&self, bucket: &str) -> Result<(Arc<dyn ObjectStore>, bool)> {
        if let Some(root) = self.config.url.strip_prefix("file://") {
            let dir = PathBuf::from(root).join(bucket);
            std::fs::create_dir_all(&dir)?;
            // LocalFileSystem does not accept object attributes.
            return Ok((Arc::new(LocalFileSystem::new_with_prefix(&dir)?), false));
        }
        let store = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(bucket)
            .with_retry(self.config.retry.to_retry_config())
            .build()?;
        Ok((Arc::new(store), true))
    }
}
