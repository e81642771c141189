//! Local filesystem object store
//!
//! Buckets are directories under a root; object keys map to relative paths.
//! Writes go to a temporary sibling file which is then renamed into place.

use super::traits::{ObjectLocation, ObjectReader, ObjectStore};
use crate::domain::ids::BucketName;
use crate::domain::{Result, StorageError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncWriteExt, BufReader};
use uuid::Uuid;

/// Read buffer size for object bodies
const READ_BUFFER_BYTES: usize = 64 * 1024;

/// Marker for in-flight writes, hidden from listings
const TEMP_MARKER: &str = ".vitalstream-tmp-";

/// Object store backed by a local directory
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    /// Create a store rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a bucket directory if it does not exist
    pub async fn create_bucket(&self, bucket: &BucketName) -> Result<()> {
        let dir = self.bucket_dir(bucket);
        fs::create_dir_all(&dir).await.map_err(|e| {
            StorageError::WriteFailed(format!(
                "failed to create bucket {}: {e}",
                dir.display()
            ))
        })?;
        Ok(())
    }

    /// Root directory of the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bucket_dir(&self, bucket: &BucketName) -> PathBuf {
        self.root.join(bucket.as_str())
    }

    fn object_path(&self, location: &ObjectLocation) -> PathBuf {
        let mut path = self.bucket_dir(&location.bucket);
        for segment in location.key.split('/').filter(|s| !s.is_empty()) {
            path.push(segment);
        }
        path
    }

    async fn require_bucket(&self, bucket: &BucketName) -> Result<PathBuf> {
        let dir = self.bucket_dir(bucket);
        match fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => Ok(dir),
            _ => Err(StorageError::BucketNotFound(bucket.to_string()).into()),
        }
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn get_object(&self, location: &ObjectLocation) -> Result<ObjectReader> {
        location.require_key()?;
        self.require_bucket(&location.bucket).await?;

        let path = self.object_path(location);
        let file = fs::File::open(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::ObjectNotFound(location.to_string())
            } else {
                StorageError::ReadFailed(format!("{location}: {e}"))
            }
        })?;

        Ok(Box::new(BufReader::with_capacity(READ_BUFFER_BYTES, file)))
    }

    async fn get_object_bytes(&self, location: &ObjectLocation) -> Result<Option<Vec<u8>>> {
        location.require_key()?;
        self.require_bucket(&location.bucket).await?;

        match fs::read(self.object_path(location)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadFailed(format!("{location}: {e}")).into()),
        }
    }

    async fn put_object(&self, location: &ObjectLocation, body: Vec<u8>) -> Result<()> {
        location.require_key()?;
        self.require_bucket(&location.bucket).await?;

        let path = self.object_path(location);
        let parent = path
            .parent()
            .ok_or_else(|| StorageError::InvalidLocation(location.to_string()))?;
        fs::create_dir_all(parent)
            .await
            .map_err(|e| StorageError::WriteFailed(format!("{location}: {e}")))?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let temp_path = parent.join(format!("{TEMP_MARKER}{}-{file_name}", Uuid::new_v4()));

        let write = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(&body).await?;
            file.sync_all().await?;
            fs::rename(&temp_path, &path).await
        };

        if let Err(e) = write.await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(StorageError::WriteFailed(format!("{location}: {e}")).into());
        }

        tracing::debug!(location = %location, bytes = body.len(), "Object written");
        Ok(())
    }

    async fn list_objects(&self, prefix: &ObjectLocation) -> Result<Vec<ObjectLocation>> {
        let bucket_dir = self.require_bucket(&prefix.bucket).await?;

        let mut keys = Vec::new();
        let mut pending = vec![bucket_dir.clone()];
        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir)
                .await
                .map_err(|e| StorageError::ReadFailed(format!("{}: {e}", dir.display())))?;
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| StorageError::ReadFailed(format!("{}: {e}", dir.display())))?
            {
                let path = entry.path();
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| StorageError::ReadFailed(format!("{}: {e}", path.display())))?;
                if file_type.is_dir() {
                    pending.push(path);
                    continue;
                }
                if entry.file_name().to_string_lossy().starts_with(TEMP_MARKER) {
                    continue;
                }
                let Ok(relative) = path.strip_prefix(&bucket_dir) else {
                    continue;
                };
                let key = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                if key.starts_with(&prefix.key) {
                    keys.push(key);
                }
            }
        }

        keys.sort();
        keys.into_iter()
            .map(|key| ObjectLocation::new(prefix.bucket.clone(), key))
            .collect()
    }
}
