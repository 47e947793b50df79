use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

/// Storage prefix for announcement photos.
pub const ANNOUNCEMENTS_PREFIX: &str = "announcements";

/// Builds the storage key for a freshly uploaded photo. Keys are generated
/// server-side; client filenames never reach the filesystem.
pub fn photo_key(extension: &str) -> String {
    format!("{}/{}.{}", ANNOUNCEMENTS_PREFIX, Uuid::new_v4(), extension)
}

#[async_trait]
pub trait PhotoStorage: Send + Sync {
    async fn store(&self, key: &str, data: Vec<u8>) -> Result<()>;
    async fn load(&self, key: &str) -> Result<Vec<u8>>;
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Disk-backed photo storage rooted at the configured media directory.
pub struct LocalPhotoStorage {
    root: PathBuf,
}

impl LocalPhotoStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Maps a storage key onto a path under the media root. Keys with
    /// parent-directory components or absolute paths are rejected.
    fn resolve(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let safe = relative.components().all(|c| matches!(c, Component::Normal(_)));
        if key.is_empty() || !safe {
            return Err(anyhow!("invalid storage key: {}", key));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl PhotoStorage for LocalPhotoStorage {
    async fn store(&self, key: &str, data: Vec<u8>) -> Result<()> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, data).await?;
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.resolve(key)?;
        Ok(tokio::fs::read(&path).await?)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_key_shape() {
        let key = photo_key("jpg");
        assert!(key.starts_with("announcements/"));
        assert!(key.ends_with(".jpg"));
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let storage = LocalPhotoStorage::new("/tmp/media");
        assert!(storage.resolve("announcements/a.jpg").is_ok());
        assert!(storage.resolve("../etc/passwd").is_err());
        assert!(storage.resolve("announcements/../../etc/passwd").is_err());
        assert!(storage.resolve("/etc/passwd").is_err());
        assert!(storage.resolve("").is_err());
    }

    #[tokio::test]
    async fn test_store_load_delete_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalPhotoStorage::new(dir.path());

        let key = photo_key("png");
        storage.store(&key, b"pixels".to_vec()).await.unwrap();
        assert_eq!(storage.load(&key).await.unwrap(), b"pixels");

        storage.delete(&key).await.unwrap();
        assert!(storage.load(&key).await.is_err());

        // deleting a missing key is not an error
        storage.delete(&key).await.unwrap();
    }
}
