//! Micro-batch processing
//!
//! A micro-batch is everything read from the stream for one window. It is
//! processed to completion (decode, map, hash, write) or not at all.

use crate::adapters::storage::{ObjectLocation, ObjectStore};
use crate::adapters::stream::StreamRecord;
use crate::core::transform::mapping::{decode_message, map_record};
use crate::core::transform::partition::PartitionPath;
use crate::domain::ids::ShardId;
use crate::domain::Result;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Directory under the output prefix that holds the partitions
pub const OUTPUT_TABLE: &str = "health_metrics";

/// Records read from the stream for one window
#[derive(Debug, Clone)]
pub struct MicroBatch {
    /// Id the output file is named after
    pub batch_id: u64,

    /// Stream records in shard order
    pub records: Vec<StreamRecord>,

    /// Per-shard positions the window started from
    pub start_positions: BTreeMap<ShardId, u64>,

    /// Per-shard positions after the last record read
    pub end_positions: BTreeMap<ShardId, u64>,
}

impl MicroBatch {
    /// Whether the window read nothing
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Short digest of the window's starting cursor
    ///
    /// Two attempts at the same window share the digest, so their output
    /// keys collide and the retry overwrites.
    pub fn window_digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.batch_id.to_be_bytes());
        for (shard, position) in &self.start_positions {
            hasher.update(shard.as_str().as_bytes());
            hasher.update(b"=");
            hasher.update(position.to_be_bytes());
            hasher.update(b";");
        }
        let digest = format!("{:x}", hasher.finalize());
        digest[..16].to_string()
    }
}

/// Result of processing a micro-batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    /// Batch id of the window
    pub batch_id: u64,

    /// Stream messages consumed
    pub messages: usize,

    /// Typed records written (or mapped, in a dry run)
    pub records_written: u64,

    /// Object the records were written to, `None` when nothing was written
    pub output: Option<ObjectLocation>,
}

impl BatchResult {
    fn empty(batch: &MicroBatch) -> Self {
        Self {
            batch_id: batch.batch_id,
            messages: batch.records.len(),
            records_written: 0,
            output: None,
        }
    }
}

/// Maps micro-batches and writes them to the partitioned output
pub struct BatchProcessor {
    store: Arc<dyn ObjectStore>,
    table: ObjectLocation,
    dry_run: bool,
}

impl BatchProcessor {
    /// Create a processor writing under `<output_prefix>health_metrics/`
    pub fn new(store: Arc<dyn ObjectStore>, output_prefix: &ObjectLocation) -> Result<Self> {
        Ok(Self {
            store,
            table: output_prefix.join(OUTPUT_TABLE)?,
            dry_run: false,
        })
    }

    /// Map and hash without writing
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Output key for a batch processed at `processed_at`
    pub fn output_location(
        &self,
        batch: &MicroBatch,
        processed_at: DateTime<Utc>,
    ) -> Result<ObjectLocation> {
        let partition = PartitionPath::from_time(processed_at);
        self.table.join(&format!(
            "{partition}/part-{:05}-{}.json",
            batch.batch_id,
            batch.window_digest()
        ))
    }

    /// Process one micro-batch
    ///
    /// An empty batch, or one whose messages hold no lines, writes nothing.
    ///
    /// # Errors
    ///
    /// Returns the first decode, mapping or write failure; nothing is
    /// written for a batch that fails mapping.
    pub async fn process(
        &self,
        batch: &MicroBatch,
        processed_at: DateTime<Utc>,
    ) -> Result<BatchResult> {
        if batch.is_empty() {
            return Ok(BatchResult::empty(batch));
        }

        let mut body = String::new();
        let mut records_written = 0u64;
        for message in &batch.records {
            for record in decode_message(&message.data)? {
                let typed = map_record(record)?;
                body.push_str(&serde_json::to_string(&typed)?);
                body.push('\n');
                records_written += 1;
            }
        }

        if records_written == 0 {
            tracing::debug!(
                batch_id = batch.batch_id,
                messages = batch.records.len(),
                "Window held only empty messages"
            );
            return Ok(BatchResult::empty(batch));
        }

        let output = self.output_location(batch, processed_at)?;
        if self.dry_run {
            tracing::info!(
                batch_id = batch.batch_id,
                records = records_written,
                output = %output,
                "Dry run: skipping write"
            );
        } else {
            self.store.put_object(&output, body.into_bytes()).await?;
        }

        Ok(BatchResult {
            batch_id: batch.batch_id,
            messages: batch.records.len(),
            records_written,
            output: Some(output),
        })
    }
}
