//! In-memory stream
//!
//! Same semantics as the file-backed stream, with positions being record
//! indices. Every publish call is also recorded in order, which makes the
//! ingestion handler testable as a function from trigger to publish calls.

use super::traits::{
    shard_for_key, GetRecordsOutput, PutRecordOutput, StreamConsumer, StreamPublisher,
    StreamRecord, MAX_RECORD_PAYLOAD_BYTES,
};
use crate::domain::ids::{PartitionKey, ShardId, StreamName};
use crate::domain::{Result, StreamError};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

/// A publish call observed by the memory stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedRecord {
    /// Target stream
    pub stream: StreamName,

    /// Partition key supplied by the publisher
    pub partition_key: PartitionKey,

    /// Payload
    pub data: Vec<u8>,
}

#[derive(Default)]
struct Inner {
    shards: HashMap<StreamName, Vec<Vec<StreamRecord>>>,
    published: Vec<PublishedRecord>,
}

/// Stream held entirely in memory
pub struct MemoryStream {
    shard_count: u32,
    /// Reject every publish once this many have succeeded
    fail_after: Option<usize>,
    inner: Mutex<Inner>,
}

impl MemoryStream {
    /// Create an empty memory stream
    pub fn new(shard_count: u32) -> Self {
        Self {
            shard_count: shard_count.max(1),
            fail_after: None,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Create a memory stream whose publishes fail after `successes` calls
    pub fn failing_after(shard_count: u32, successes: usize) -> Self {
        Self {
            fail_after: Some(successes),
            ..Self::new(shard_count)
        }
    }

    /// Create a stream so consumers can read it before anything is published
    pub fn create_stream(&self, stream: &StreamName) {
        let mut inner = self.lock();
        let shard_count = self.shard_count as usize;
        inner
            .shards
            .entry(stream.clone())
            .or_insert_with(|| vec![Vec::new(); shard_count]);
    }

    /// All successful publish calls, in call order
    pub fn published(&self) -> Vec<PublishedRecord> {
        self.lock().published.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock only means a test panicked mid-publish
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn shard_index(&self, shard: &ShardId) -> Result<usize> {
        match shard.index() {
            Some(index) if index < self.shard_count => Ok(index as usize),
            _ => Err(StreamError::ShardNotFound(shard.to_string()).into()),
        }
    }
}

#[async_trait]
impl StreamPublisher for MemoryStream {
    async fn put_record(
        &self,
        stream: &StreamName,
        partition_key: &PartitionKey,
        data: Vec<u8>,
    ) -> Result<PutRecordOutput> {
        if data.len() > MAX_RECORD_PAYLOAD_BYTES {
            return Err(StreamError::PayloadTooLarge {
                size: data.len(),
                limit: MAX_RECORD_PAYLOAD_BYTES,
            }
            .into());
        }

        let mut inner = self.lock();
        if let Some(limit) = self.fail_after {
            if inner.published.len() >= limit {
                return Err(StreamError::PublishFailed(format!(
                    "injected failure after {limit} records"
                ))
                .into());
            }
        }

        let shard_id = shard_for_key(partition_key, self.shard_count);
        let shard_count = self.shard_count as usize;
        let shards = inner
            .shards
            .entry(stream.clone())
            .or_insert_with(|| vec![Vec::new(); shard_count]);
        let shard = &mut shards[shard_id.index().unwrap_or(0) as usize];
        let sequence_number = shard.len() as u64;

        shard.push(StreamRecord {
            shard_id: shard_id.clone(),
            sequence_number,
            partition_key: partition_key.clone(),
            data: data.clone(),
            approximate_arrival_timestamp: Utc::now(),
        });
        inner.published.push(PublishedRecord {
            stream: stream.clone(),
            partition_key: partition_key.clone(),
            data,
        });

        Ok(PutRecordOutput {
            shard_id,
            sequence_number,
        })
    }
}

#[async_trait]
impl StreamConsumer for MemoryStream {
    async fn list_shards(&self, stream: &StreamName) -> Result<Vec<ShardId>> {
        let inner = self.lock();
        let shards = inner
            .shards
            .get(stream)
            .ok_or_else(|| StreamError::StreamNotFound(stream.to_string()))?;
        Ok((0..shards.len() as u32).map(ShardId::from_index).collect())
    }

    async fn latest_position(&self, stream: &StreamName, shard: &ShardId) -> Result<u64> {
        let index = self.shard_index(shard)?;
        let inner = self.lock();
        let shards = inner
            .shards
            .get(stream)
            .ok_or_else(|| StreamError::StreamNotFound(stream.to_string()))?;
        Ok(shards[index].len() as u64)
    }

    async fn get_records(
        &self,
        stream: &StreamName,
        shard: &ShardId,
        position: u64,
        limit: usize,
    ) -> Result<GetRecordsOutput> {
        let index = self.shard_index(shard)?;
        let inner = self.lock();
        let shards = inner
            .shards
            .get(stream)
            .ok_or_else(|| StreamError::StreamNotFound(stream.to_string()))?;

        let records: Vec<StreamRecord> = shards[index]
            .iter()
            .skip(position as usize)
            .take(limit)
            .cloned()
            .collect();
        let next_position = position + records.len() as u64;

        Ok(GetRecordsOutput {
            records,
            next_position,
        })
    }
}
