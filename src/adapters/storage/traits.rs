//! Object storage abstraction
//!
//! The pipeline touches object storage in three places: reading the raw
//! export, writing partitioned output, and persisting the transformer
//! checkpoint. All three go through [`ObjectStore`].

use crate::domain::ids::BucketName;
use crate::domain::{PipelineError, Result, StorageError};
use async_trait::async_trait;
use std::fmt;
use tokio::io::AsyncBufRead;

/// Buffered, streaming reader over an object body
pub type ObjectReader = Box<dyn AsyncBufRead + Unpin + Send>;

/// Bucket plus key (or key prefix)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectLocation {
    /// Bucket holding the object
    pub bucket: BucketName,

    /// Object key, `/`-separated; may be empty for a bucket-level prefix
    pub key: String,
}

impl ObjectLocation {
    /// Create a location, rejecting keys that could escape the bucket
    pub fn new(bucket: BucketName, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.starts_with('/') || key.contains('\\') {
            return Err(StorageError::InvalidLocation(format!(
                "key '{key}' must be relative and '/'-separated"
            ))
            .into());
        }
        if key.split('/').any(|segment| segment == "..") {
            return Err(
                StorageError::InvalidLocation(format!("key '{key}' contains '..'")).into(),
            );
        }
        Ok(Self { bucket, key })
    }

    /// Parse `bucket/key` or `s3://bucket/key`
    ///
    /// # Examples
    ///
    /// ```
    /// use vitalstream::adapters::storage::ObjectLocation;
    ///
    /// let location = ObjectLocation::parse("s3://processedhealthdata/health_metrics").unwrap();
    /// assert_eq!(location.bucket.as_str(), "processedhealthdata");
    /// assert_eq!(location.key, "health_metrics");
    /// ```
    pub fn parse(path: &str) -> Result<Self> {
        let path = path.strip_prefix("s3://").unwrap_or(path);
        let (bucket, key) = match path.split_once('/') {
            Some((bucket, key)) => (bucket, key),
            None => (path, ""),
        };
        let bucket = BucketName::new(bucket).map_err(|e| {
            PipelineError::Storage(StorageError::InvalidLocation(format!("{path}: {e}")))
        })?;
        Self::new(bucket, key)
    }

    /// Append a path segment, inserting a `/` separator when needed
    pub fn join(&self, segment: &str) -> Result<Self> {
        let segment = segment.trim_start_matches('/');
        let key = if self.key.is_empty() || self.key.ends_with('/') {
            format!("{}{}", self.key, segment)
        } else {
            format!("{}/{}", self.key, segment)
        };
        Self::new(self.bucket.clone(), key)
    }

    /// Fail unless the location names an object rather than a bucket
    pub fn require_key(&self) -> Result<()> {
        if self.key.is_empty() || self.key.ends_with('/') {
            return Err(StorageError::InvalidLocation(format!(
                "{self} does not name an object"
            ))
            .into());
        }
        Ok(())
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// Object store operations used by the pipeline
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Open an object for streaming reads
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ObjectNotFound` if the object does not exist.
    async fn get_object(&self, location: &ObjectLocation) -> Result<ObjectReader>;

    /// Read a small object fully, `None` if it does not exist
    async fn get_object_bytes(&self, location: &ObjectLocation) -> Result<Option<Vec<u8>>>;

    /// Write an object, replacing any existing object at the same key
    ///
    /// Readers never observe a partially written object.
    async fn put_object(&self, location: &ObjectLocation, body: Vec<u8>) -> Result<()>;

    /// List objects whose keys start with `prefix.key`, sorted by key
    async fn list_objects(&self, prefix: &ObjectLocation) -> Result<Vec<ObjectLocation>>;
}
