//! Domain identifier types with validation
//!
//! Newtype wrappers for the identifiers that cross component boundaries:
//! stream names, shard ids, partition keys and bucket names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Stream name newtype wrapper
///
/// # Examples
///
/// ```
/// use vitalstream::domain::ids::StreamName;
/// use std::str::FromStr;
///
/// let stream = StreamName::from_str("health_data").unwrap();
/// assert_eq!(stream.as_str(), "health_data");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamName(String);

impl StreamName {
    /// Creates a new StreamName
    ///
    /// Stream names are 1-128 characters of `[a-zA-Z0-9_.-]`.
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        if name.is_empty() || name.len() > 128 {
            return Err(format!(
                "Stream name must be 1-128 characters, got {}",
                name.len()
            ));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        {
            return Err(format!(
                "Stream name '{name}' may only contain letters, digits, '_', '.' and '-'"
            ));
        }
        Ok(Self(name))
    }

    /// Returns the stream name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StreamName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Shard identifier within a stream
///
/// Formatted as `shard-NNNNN` so lexical order matches numeric order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShardId(String);

impl ShardId {
    /// Creates the shard id for a zero-based shard index
    pub fn from_index(index: u32) -> Self {
        Self(format!("shard-{index:05}"))
    }

    /// Returns the zero-based shard index
    pub fn index(&self) -> Option<u32> {
        self.0.strip_prefix("shard-")?.parse().ok()
    }

    /// Returns the shard id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ShardId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = Self(s.to_string());
        if id.index().is_none() {
            return Err(format!("Invalid shard id '{s}', expected shard-NNNNN"));
        }
        Ok(id)
    }
}

/// Partition key attached to a published record
///
/// Carries no meaning beyond spreading records across shards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartitionKey(String);

impl PartitionKey {
    /// Creates a partition key from an explicit value
    pub fn new(key: impl Into<String>) -> Result<Self, String> {
        let key = key.into();
        if key.is_empty() || key.len() > 256 {
            return Err(format!(
                "Partition key must be 1-256 characters, got {}",
                key.len()
            ));
        }
        Ok(Self(key))
    }

    /// Generates a fresh random partition key
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the partition key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Object storage bucket name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BucketName(String);

impl BucketName {
    /// Creates a new BucketName
    ///
    /// Bucket names are 3-63 characters of lowercase letters, digits, '.' and '-'.
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        if name.len() < 3 || name.len() > 63 {
            return Err(format!(
                "Bucket name must be 3-63 characters, got '{name}'"
            ));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '-'))
        {
            return Err(format!(
                "Bucket name '{name}' may only contain lowercase letters, digits, '.' and '-'"
            ));
        }
        Ok(Self(name))
    }

    /// Returns the bucket name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BucketName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BucketName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
