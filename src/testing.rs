use anyhow::Result;
use axum::Router;
use blob_store::BlobStorageConfig;
use tempfile::TempDir;

use crate::{
    config::{ServeMode, ServerConfig},
    service::Service,
};

/// Router backed by a tempdir blob store, for request-level tests.
pub struct TestApp {
    pub app: Router,
    pub config: ServerConfig,
    // Keeps the storage root alive for the duration of the test.
    _temp_dir: TempDir,
}

impl TestApp {
    pub fn new(serve_mode: ServeMode) -> Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let config = ServerConfig {
            serve_mode,
            blob_storage: BlobStorageConfig {
                url: format!(
                    "file://{}",
                    temp_dir.path().join("blobs").to_str().unwrap()
                ),
                ..Default::default()
            },
            ..Default::default()
        };
        let service = Service::new(config.clone())?;

        Ok(Self {
            app: service.router(),
            config,
            _temp_dir: temp_dir,
        })
    }
}
