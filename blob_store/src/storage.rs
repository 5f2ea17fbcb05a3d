use std::{io, sync::Arc};

use anyhow::{anyhow, Result};
use bytes::Bytes;
use futures::{stream::BoxStream, Stream, StreamExt, TryStreamExt};
use object_store::{buffered::BufWriter, path::Path, Attribute, Attributes, ObjectStore};
use tokio_util::io::{ReaderStream, StreamReader};
use tracing::error;

use crate::transfer::{transfer, TRANSFER_BUFFER_SIZE};

#[derive(Debug, Clone)]
pub struct PutResult {
    pub size_bytes: u64,
}

/// Read/write access to a single bucket.
pub struct BlobStorage {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    // LocalFileSystem rejects object attributes, so the content-type
    // attribute is only attached on backends that accept it.
    attributes_supported: bool,
}

impl BlobStorage {
    pub fn new(store: Arc<dyn ObjectStore>, bucket: &str, attributes_supported: bool) -> Self {
        Self {
            store,
            bucket: bucket.to_string(),
            attributes_supported,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Opens `object` and returns its bytes as a stream.
    ///
    /// The open happens before this returns, so a missing object fails here
    /// rather than mid-response. The returned stream is fed through a bounded
    /// pipe, letting reads run ahead of the consumer by up to one transfer
    /// buffer. A failure mid-stream truncates the stream; the error is logged
    /// and bytes already delivered are not rolled back.
    pub async fn get(&self, object: &str) -> Result<BoxStream<'static, io::Result<Bytes>>> {
        let path = Path::from(object);
        let result = self
            .store
            .get(&path)
            .await
            .map_err(|e| anyhow!("can't get object {}/{}: {:?}", self.bucket, object, e))?;
        let reader = StreamReader::new(result.into_stream().map_err(io::Error::other));

        let (writer, read_half) = tokio::io::duplex(TRANSFER_BUFFER_SIZE);
        let bucket = self.bucket.clone();
        let object = object.to_string();
        tokio::spawn(async move {
            if let Err(e) = transfer(reader, writer).await {
                error!("error streaming object {}/{}: {:?}", bucket, object, e);
            }
        });

        Ok(Box::pin(ReaderStream::with_capacity(
            read_half,
            TRANSFER_BUFFER_SIZE,
        )))
    }

    /// Create-or-replace write of `object` with the given content type.
    ///
    /// The writer close is what durably commits the object. An interrupted
    /// transfer may leave a truncated object behind; there is no cleanup.
    pub async fn put(
        &self,
        object: &str,
        data: impl Stream<Item = Result<Bytes>> + Send + Unpin,
        content_type: &str,
    ) -> Result<PutResult> {
        let path = Path::from(object);
        let mut writer = BufWriter::with_capacity(self.store.clone(), path, TRANSFER_BUFFER_SIZE);
        if self.attributes_supported {
            let mut attributes = Attributes::new();
            attributes.insert(Attribute::ContentType, content_type.to_string().into());
            writer = writer.with_attributes(attributes);
        }
        let reader = StreamReader::new(data.map(|chunk| chunk.map_err(io::Error::other)));

        let size_bytes = transfer(reader, writer).await?;
        Ok(PutResult { size_bytes })
    }
}

#[cfg(test)]
mod tests {
    use futures::stream;
    use object_store::local::LocalFileSystem;
    use tempfile::TempDir;

    use super::*;

    fn test_storage(temp_dir: &TempDir) -> BlobStorage {
        let store = LocalFileSystem::new_with_prefix(temp_dir.path()).unwrap();
        BlobStorage::new(Arc::new(store), "test-bucket", false)
    }

    async fn read_all(storage: &BlobStorage, object: &str) -> Vec<u8> {
        let mut stream = storage.get(object).await.unwrap();
        let mut bytes = Vec::new();
        while let Some(chunk) = stream.next().await {
            bytes.extend_from_slice(&chunk.unwrap());
        }
        bytes
    }

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let storage = test_storage(&temp_dir);

        let data = stream::iter(vec![Ok(Bytes::from("hello ")), Ok(Bytes::from("world"))]);
        let result = storage.put("greeting.jpg", data, "image/jpeg").await.unwrap();
        assert_eq!(result.size_bytes, 11);

        assert_eq!(read_all(&storage, "greeting.jpg").await, b"hello world");
    }

    #[tokio::test]
    async fn test_put_replaces_existing_object() {
        let temp_dir = TempDir::new().unwrap();
        let storage = test_storage(&temp_dir);

        let first = stream::iter(vec![Ok(Bytes::from("a much longer first payload"))]);
        storage.put("image.jpg", first, "image/jpeg").await.unwrap();

        let second = stream::iter(vec![Ok(Bytes::from("short"))]);
        storage.put("image.jpg", second, "image/jpeg").await.unwrap();

        assert_eq!(read_all(&storage, "image.jpg").await, b"short");
    }

    #[tokio::test]
    async fn test_get_missing_object_fails_before_streaming() {
        let temp_dir = TempDir::new().unwrap();
        let storage = test_storage(&temp_dir);

        assert!(storage.get("no-such-object.jpg").await.is_err());
    }

    #[tokio::test]
    async fn test_failing_upload_stream_propagates() {
        let temp_dir = TempDir::new().unwrap();
        let storage = test_storage(&temp_dir);

        let data = stream::iter(vec![
            Ok(Bytes::from("partial")),
            Err(anyhow!("client went away")),
        ]);
        assert!(storage.put("broken.jpg", data, "image/jpeg").await.is_err());
    }
}
