//! Checkpoint model for tracking consumer progress
//!
//! This module defines the checkpoint the batch transformer persists after
//! every successful window: one resume position per shard, plus counters and
//! the status of the last window.

use crate::domain::ids::{ShardId, StreamName};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Status of the last micro-batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// A window is being processed
    Processing,
    /// The last window completed and was committed
    Completed,
    /// The last window failed; positions were not advanced
    Failed,
    /// No window has run yet
    #[default]
    NotStarted,
}

/// Durable cursor of the batch transformer
///
/// Stored as JSON in the object store at
/// `<checkpoint_location>/<job_name>.json`.
///
/// # Examples
///
/// ```
/// use vitalstream::core::state::{BatchStatus, CheckpointBuilder};
/// use vitalstream::domain::{ShardId, StreamName};
///
/// let stream = StreamName::new("health_data").unwrap();
/// let checkpoint = CheckpointBuilder::new("health_etl", stream)
///     .position(ShardId::from_index(0), 512)
///     .next_batch_id(3)
///     .build();
///
/// assert_eq!(checkpoint.position(&ShardId::from_index(0)), Some(512));
/// assert_eq!(checkpoint.next_batch_id, 3);
/// assert_eq!(checkpoint.last_status, BatchStatus::NotStarted);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Job this checkpoint belongs to
    pub job_name: String,

    /// Stream being consumed
    pub stream_name: StreamName,

    /// Next unread position per shard
    pub positions: BTreeMap<ShardId, u64>,

    /// Id assigned to the next non-empty window
    pub next_batch_id: u64,

    /// Total non-empty windows committed
    pub batches_processed: u64,

    /// Total typed records written
    pub records_processed: u64,

    /// Output object written by the last committed window
    pub last_output_key: Option<String>,

    /// When the checkpoint was first created
    pub created_at: DateTime<Utc>,

    /// When the last window started
    pub last_batch_started_at: Option<DateTime<Utc>>,

    /// When the last window finished (successfully or not)
    pub last_batch_completed_at: Option<DateTime<Utc>>,

    /// Status of the last window
    pub last_status: BatchStatus,
}

impl Checkpoint {
    /// Resume position for a shard, if one has been recorded
    pub fn position(&self, shard: &ShardId) -> Option<u64> {
        self.positions.get(shard).copied()
    }

    /// Whether a window is currently marked as in progress
    pub fn is_processing(&self) -> bool {
        self.last_status == BatchStatus::Processing
    }

    /// Check if the last window failed
    pub fn is_failed(&self) -> bool {
        self.last_status == BatchStatus::Failed
    }

    /// Duration of the last window if it finished
    pub fn last_batch_duration(&self) -> Option<chrono::Duration> {
        match (self.last_batch_started_at, self.last_batch_completed_at) {
            (Some(started), Some(completed)) if completed >= started => Some(completed - started),
            _ => None,
        }
    }

    /// Mark a window as started
    pub fn mark_started(&mut self) {
        self.last_batch_started_at = Some(Utc::now());
        self.last_batch_completed_at = None;
        self.last_status = BatchStatus::Processing;
    }

    /// Mark the current window as failed without touching positions
    pub fn mark_failed(&mut self) {
        self.last_batch_completed_at = Some(Utc::now());
        self.last_status = BatchStatus::Failed;
    }

    /// Commit a window: advance positions and counters
    ///
    /// `records` is zero for an empty window, in which case only the
    /// positions move and no batch id is consumed.
    pub fn commit(
        &mut self,
        positions: BTreeMap<ShardId, u64>,
        records: u64,
        output_key: Option<String>,
    ) {
        self.positions.extend(positions);
        if records > 0 {
            self.next_batch_id += 1;
            self.batches_processed += 1;
            self.records_processed += records;
            self.last_output_key = output_key;
        }
        self.last_batch_completed_at = Some(Utc::now());
        self.last_status = BatchStatus::Completed;
    }
}

/// Builder for creating Checkpoint instances
pub struct CheckpointBuilder {
    job_name: String,
    stream_name: StreamName,
    positions: BTreeMap<ShardId, u64>,
    next_batch_id: u64,
    batches_processed: u64,
    records_processed: u64,
    created_at: Option<DateTime<Utc>>,
    last_status: BatchStatus,
}

impl CheckpointBuilder {
    /// Create a new CheckpointBuilder
    pub fn new(job_name: impl Into<String>, stream_name: StreamName) -> Self {
        Self {
            job_name: job_name.into(),
            stream_name,
            positions: BTreeMap::new(),
            next_batch_id: 0,
            batches_processed: 0,
            records_processed: 0,
            created_at: None,
            last_status: BatchStatus::NotStarted,
        }
    }

    /// Set the resume position of one shard
    pub fn position(mut self, shard: ShardId, position: u64) -> Self {
        self.positions.insert(shard, position);
        self
    }

    /// Set all resume positions
    pub fn positions(mut self, positions: BTreeMap<ShardId, u64>) -> Self {
        self.positions = positions;
        self
    }

    /// Set the next batch id
    pub fn next_batch_id(mut self, id: u64) -> Self {
        self.next_batch_id = id;
        self
    }

    /// Set the processed counters
    pub fn processed(mut self, batches: u64, records: u64) -> Self {
        self.batches_processed = batches;
        self.records_processed = records;
        self
    }

    /// Set the creation timestamp
    pub fn created_at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.created_at = Some(timestamp);
        self
    }

    /// Set the last status
    pub fn last_status(mut self, status: BatchStatus) -> Self {
        self.last_status = status;
        self
    }

    /// Build the Checkpoint
    pub fn build(self) -> Checkpoint {
        Checkpoint {
            job_name: self.job_name,
            stream_name: self.stream_name,
            positions: self.positions,
            next_batch_id: self.next_batch_id,
            batches_processed: self.batches_processed,
            records_processed: self.records_processed,
            last_output_key: None,
            created_at: self.created_at.unwrap_or_else(Utc::now),
            last_batch_started_at: None,
            last_batch_completed_at: None,
            last_status: self.last_status,
        }
    }
}
