use async_trait::async_trait;
use serde::Serialize;
use tokio::io::AsyncRead;

use super::error::MediaError;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Handle to a stored media object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredObject {
    /// Object name, relative to the store root.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
}

/// Flat keyed storage for uploaded media files.
///
/// Object names are plain filenames derived from the upload (see
/// [`super::object_name`]); the store never interprets them as paths.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store `data` under a name derived from `filename`.
    async fn put(&self, filename: &str, data: &[u8]) -> Result<StoredObject, MediaError>;

    /// Read an object fully into memory.
    async fn read(&self, name: &str) -> Result<Vec<u8>, MediaError> {
        let mut reader = self.open(name).await?;
        let mut buf = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut reader, &mut buf).await?;
        Ok(buf)
    }

    /// Open an object as a streaming async reader.
    async fn open(&self, name: &str) -> Result<BoxReader, MediaError>;

    /// Get the size of an object in bytes.
    async fn size(&self, name: &str) -> Result<u64, MediaError>;

    /// Check whether an object exists.
    async fn exists(&self, name: &str) -> Result<bool, MediaError>;

    /// Delete an object.
    ///
    /// Returns `true` if the object was deleted, `false` if it did not exist.
    async fn delete(&self, name: &str) -> Result<bool, MediaError>;
}
