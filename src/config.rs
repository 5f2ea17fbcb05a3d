use std::net::SocketAddr;

use anyhow::Result;
use blob_store::BlobStorageConfig;
use figment::{
    providers::{Format, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Bucket all uploads land in.
    #[serde(default = "default_upload_bucket")]
    pub upload_bucket: String,

    /// Prefix returned image URLs are built from.
    #[serde(default = "default_public_url_prefix")]
    pub public_url_prefix: String,

    /// Content type attached to every uploaded object.
    #[serde(default = "default_upload_content_type")]
    pub upload_content_type: String,

    #[serde(default)]
    pub serve_mode: ServeMode,

    #[serde(default)]
    pub structured_logging: bool,

    #[serde(default)]
    pub blob_storage: BlobStorageConfig,
}

/// How downloaded objects are served to clients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServeMode {
    /// Proxy the object bytes through this server.
    #[default]
    Stream,
    /// Redirect the client to the object's public URL.
    Redirect,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen_addr: default_listen_addr(),
            upload_bucket: default_upload_bucket(),
            public_url_prefix: default_public_url_prefix(),
            upload_content_type: default_upload_content_type(),
            serve_mode: ServeMode::default(),
            structured_logging: false,
            blob_storage: BlobStorageConfig::default(),
        }
    }
}

fn default_listen_addr() -> String {
    "0.0.0.0:8900".to_string()
}

fn default_upload_bucket() -> String {
    "zaomai-1332.appspot.com".to_string()
}

fn default_public_url_prefix() -> String {
    "https://storage.cloud.google.com/".to_string()
}

fn default_upload_content_type() -> String {
    "image/jpeg".to_string()
}

impl ServerConfig {
    pub fn from_path(path: &str) -> Result<ServerConfig> {
        let config_str = std::fs::read_to_string(path)?;
        let config: ServerConfig = Figment::new().merge(Yaml::string(&config_str)).extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.listen_addr.parse::<SocketAddr>().is_err() {
            return Err(anyhow::anyhow!(
                "invalid listen address: {}",
                self.listen_addr
            ));
        }
        if self.upload_bucket.is_empty() {
            return Err(anyhow::anyhow!("upload_bucket must not be empty"));
        }
        if self.public_url_prefix.is_empty() {
            return Err(anyhow::anyhow!("public_url_prefix must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ServerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.serve_mode, ServeMode::Stream);
        assert_eq!(config.upload_content_type, "image/jpeg");
    }

    #[test]
    fn test_yaml_overrides() {
        let config: ServerConfig = Figment::new()
            .merge(Yaml::string(
                r#"
listen_addr: 127.0.0.1:9000
upload_bucket: my-images
serve_mode: redirect
blob_storage:
  url: file:///tmp/imagestore
"#,
            ))
            .extract()
            .unwrap();
        config.validate().unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:9000");
        assert_eq!(config.upload_bucket, "my-images");
        assert_eq!(config.serve_mode, ServeMode::Redirect);
        assert_eq!(config.blob_storage.url, "file:///tmp/imagestore");
        assert_eq!(config.blob_storage.retry.max_retries, 10);
    }

    #[test]
    fn test_invalid_listen_addr_rejected() {
        let config = ServerConfig {
            listen_addr: "not-an-addr".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
