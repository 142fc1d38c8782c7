use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::BufReader;

use super::error::MediaError;
use super::name::object_name;
use super::traits::{BoxReader, MediaStore, StoredObject};

/// Filesystem-backed media store.
///
/// Objects live directly under `base_dir`; writes go through a temp file in
/// `{base_dir}/.tmp` followed by a rename, so a crashed upload never leaves
/// a partially written object behind.
pub struct FilesystemMediaStore {
    base_dir: PathBuf,
    max_size: u64,
}

impl FilesystemMediaStore {
    /// Create a new media store rooted at `base_dir`.
    pub async fn new(base_dir: PathBuf, max_size: u64) -> Result<Self, MediaError> {
        fs::create_dir_all(&base_dir).await?;
        fs::create_dir_all(base_dir.join(".tmp")).await?;
        Ok(Self { base_dir, max_size })
    }

    /// Resolve an object name to its path, rejecting anything that is not a
    /// plain filename.
    fn object_path(&self, name: &str) -> Result<PathBuf, MediaError> {
        if name.is_empty()
            || name.starts_with('.')
            || Path::new(name).components().count() != 1
        {
            return Err(MediaError::InvalidName(name.to_string()));
        }
        Ok(self.base_dir.join(name))
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_dir
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl MediaStore for FilesystemMediaStore {
    async fn put(&self, filename: &str, data: &[u8]) -> Result<StoredObject, MediaError> {
        if data.len() as u64 > self.max_size {
            return Err(MediaError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let name = object_name(filename, data);
        let stored = StoredObject {
            name: name.clone(),
            size: data.len() as u64,
        };

        let object_path = self.object_path(&name)?;
        if fs::try_exists(&object_path).await? {
            // Same name means same content digest; nothing to write.
            return Ok(stored);
        }

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&temp_path, &object_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(stored)
    }

    async fn open(&self, name: &str) -> Result<BoxReader, MediaError> {
        let path = self.object_path(name)?;
        match fs::File::open(&path).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(MediaError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn size(&self, name: &str) -> Result<u64, MediaError> {
        let path = self.object_path(name)?;
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(MediaError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, name: &str) -> Result<bool, MediaError> {
        let path = self.object_path(name)?;
        Ok(fs::try_exists(&path).await?)
    }

    async fn delete(&self, name: &str) -> Result<bool, MediaError> {
        let path = self.object_path(name)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_store() -> (FilesystemMediaStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemMediaStore::new(dir.path().join("media"), 10 * 1024 * 1024)
            .await
            .unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn put_read_round_trip() {
        let (store, _dir) = temp_store().await;
        let stored = store.put("avatar.png", b"pixels").await.unwrap();
        assert_eq!(stored.size, 6);
        assert!(stored.name.ends_with(".png"));

        let data = store.read(&stored.name).await.unwrap();
        assert_eq!(data, b"pixels");
    }

    #[tokio::test]
    async fn same_upload_maps_to_same_object() {
        let (store, _dir) = temp_store().await;
        let first = store.put("photo.jpg", b"same bytes").await.unwrap();
        let second = store.put("photo.jpg", b"same bytes").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn different_content_gets_a_new_object() {
        let (store, _dir) = temp_store().await;
        let first = store.put("photo.jpg", b"version one").await.unwrap();
        let second = store.put("photo.jpg", b"version two").await.unwrap();
        assert_ne!(first.name, second.name);
        assert!(store.exists(&first.name).await.unwrap());
        assert!(store.exists(&second.name).await.unwrap());
    }

    #[tokio::test]
    async fn size_limit_enforced() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemMediaStore::new(dir.path().join("media"), 10)
            .await
            .unwrap();

        let result = store.put("big.bin", b"this is more than 10 bytes").await;
        assert!(matches!(result, Err(MediaError::SizeLimitExceeded { .. })));

        // No stray temp files left behind.
        let tmp_entries: Vec<_> = std::fs::read_dir(dir.path().join("media/.tmp"))
            .unwrap()
            .collect();
        assert_eq!(tmp_entries.len(), 0);
    }

    #[tokio::test]
    async fn open_streams_content() {
        let (store, _dir) = temp_store().await;
        let stored = store.put("doc.txt", b"streamed content").await.unwrap();

        let mut reader = store.open(&stored.name).await.unwrap();
        let mut buf = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut reader, &mut buf)
            .await
            .unwrap();
        assert_eq!(buf, b"streamed content");
    }

    #[tokio::test]
    async fn read_missing_object_is_not_found() {
        let (store, _dir) = temp_store().await;
        let result = store.read("nothing-00000000.png").await;
        assert!(matches!(result, Err(MediaError::NotFound(_))));
    }

    #[tokio::test]
    async fn size_returns_byte_count() {
        let (store, _dir) = temp_store().await;
        let stored = store.put("n.txt", b"12345").await.unwrap();
        assert_eq!(store.size(&stored.name).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn delete_removes_object() {
        let (store, _dir) = temp_store().await;
        let stored = store.put("gone.txt", b"bye").await.unwrap();

        assert!(store.delete(&stored.name).await.unwrap());
        assert!(!store.exists(&stored.name).await.unwrap());
        assert!(!store.delete(&stored.name).await.unwrap());
    }

    #[tokio::test]
    async fn path_like_names_are_rejected() {
        let (store, _dir) = temp_store().await;
        for name in ["../escape.png", "a/b.png", "", ".tmp"] {
            let result = store.read(name).await;
            assert!(matches!(result, Err(MediaError::InvalidName(_))), "{name}");
        }
    }

    #[tokio::test]
    async fn constructor_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("deep/nested/media");
        assert!(!base.exists());

        let _store = FilesystemMediaStore::new(base.clone(), 1024).await.unwrap();

        assert!(base.exists());
        assert!(base.join(".tmp").exists());
    }
}
