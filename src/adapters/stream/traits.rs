//! Stream abstraction traits
//!
//! This module defines the publish and consume primitives the two pipeline
//! stages are built on. The ingestion side only ever publishes; the batch
//! transformer only ever consumes from a per-shard position it checkpoints.

use crate::domain::ids::{PartitionKey, ShardId, StreamName};
use crate::domain::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Maximum payload accepted for a single record (1 MiB)
pub const MAX_RECORD_PAYLOAD_BYTES: usize = 1024 * 1024;

/// Acknowledgement returned for a published record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutRecordOutput {
    /// Shard that received the record
    pub shard_id: ShardId,

    /// Sequence number assigned within the shard
    pub sequence_number: u64,
}

/// A record read back from a shard
#[derive(Debug, Clone, PartialEq)]
pub struct StreamRecord {
    /// Shard the record was read from
    pub shard_id: ShardId,

    /// Sequence number within the shard
    pub sequence_number: u64,

    /// Partition key supplied by the publisher
    pub partition_key: PartitionKey,

    /// Raw payload
    pub data: Vec<u8>,

    /// When the stream accepted the record
    pub approximate_arrival_timestamp: DateTime<Utc>,
}

/// Result of reading a shard from a position
#[derive(Debug, Clone)]
pub struct GetRecordsOutput {
    /// Records in shard order
    pub records: Vec<StreamRecord>,

    /// Position to resume from on the next read
    pub next_position: u64,
}

/// Publishing side of a stream
#[async_trait]
pub trait StreamPublisher: Send + Sync {
    /// Publish a single record
    ///
    /// # Arguments
    ///
    /// * `stream` - Target stream
    /// * `partition_key` - Key used to pick the shard
    /// * `data` - Record payload
    ///
    /// # Errors
    ///
    /// Returns an error if the stream does not exist, the payload is larger than
    /// [`MAX_RECORD_PAYLOAD_BYTES`], or the write fails. Failures are never retried here.
    async fn put_record(
        &self,
        stream: &StreamName,
        partition_key: &PartitionKey,
        data: Vec<u8>,
    ) -> Result<PutRecordOutput>;
}

/// Consuming side of a stream
///
/// Positions are opaque cursors: a consumer only stores the `next_position`
/// returned by [`StreamConsumer::get_records`] and hands it back later.
#[async_trait]
pub trait StreamConsumer: Send + Sync {
    /// List the shards of a stream in order
    async fn list_shards(&self, stream: &StreamName) -> Result<Vec<ShardId>>;

    /// Position just past the newest record of a shard
    async fn latest_position(&self, stream: &StreamName, shard: &ShardId) -> Result<u64>;

    /// Read up to `limit` records from a shard starting at `position`
    async fn get_records(
        &self,
        stream: &StreamName,
        shard: &ShardId,
        position: u64,
        limit: usize,
    ) -> Result<GetRecordsOutput>;
}

/// Map a partition key onto one of `shard_count` shards
///
/// Uses the leading 8 bytes of the SHA-256 digest of the key.
pub fn shard_for_key(partition_key: &PartitionKey, shard_count: u32) -> ShardId {
    let digest = Sha256::digest(partition_key.as_str().as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    let index = u64::from_be_bytes(prefix) % u64::from(shard_count.max(1));
    ShardId::from_index(index as u32)
}
