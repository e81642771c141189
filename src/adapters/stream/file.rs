//! File-backed stream
//!
//! Each stream is a directory holding one append-only log per shard:
//!
//! ```text
//! <root>/<stream>/shard-00000.log
//! <root>/<stream>/shard-00001.log
//! ```
//!
//! Every line of a shard log is a JSON envelope with a base64 payload. A
//! record's sequence number is the byte offset of its line, so a consumer
//! position is simply the offset of the next unread line.

use super::traits::{
    shard_for_key, GetRecordsOutput, PutRecordOutput, StreamConsumer, StreamPublisher,
    StreamRecord, MAX_RECORD_PAYLOAD_BYTES,
};
use crate::domain::ids::{PartitionKey, ShardId, StreamName};
use crate::domain::{Result, StreamError};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;

/// On-disk representation of one record
#[derive(Debug, Serialize, Deserialize)]
struct RecordEnvelope {
    sequence_number: u64,
    partition_key: String,
    data: String,
    approximate_arrival_timestamp: DateTime<Utc>,
}

/// Stream stored as per-shard log files under a root directory
pub struct FileStream {
    root: PathBuf,
    shard_count: u32,
    /// Serializes appends so sequence numbers match file offsets
    write_lock: Mutex<()>,
}

impl FileStream {
    /// Create a new file stream rooted at `root`
    ///
    /// # Arguments
    ///
    /// * `root` - Directory holding one subdirectory per stream
    /// * `shard_count` - Number of shards per stream
    pub fn new(root: impl Into<PathBuf>, shard_count: u32) -> Self {
        Self {
            root: root.into(),
            shard_count: shard_count.max(1),
            write_lock: Mutex::new(()),
        }
    }

    /// Create the stream directory and shard logs if they don't exist yet
    pub async fn ensure_stream(&self, stream: &StreamName) -> Result<()> {
        let dir = self.stream_dir(stream);
        fs::create_dir_all(&dir).await.map_err(|e| {
            StreamError::PublishFailed(format!(
                "failed to create stream directory {}: {e}",
                dir.display()
            ))
        })?;

        for index in 0..self.shard_count {
            let path = self.shard_path(stream, &ShardId::from_index(index));
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .await
                .map_err(|e| {
                    StreamError::PublishFailed(format!(
                        "failed to create shard log {}: {e}",
                        path.display()
                    ))
                })?;
        }

        tracing::debug!(
            stream = %stream,
            shard_count = self.shard_count,
            path = %dir.display(),
            "Stream ready"
        );
        Ok(())
    }

    /// Number of shards per stream
    pub fn shard_count(&self) -> u32 {
        self.shard_count
    }

    fn stream_dir(&self, stream: &StreamName) -> PathBuf {
        self.root.join(stream.as_str())
    }

    fn shard_path(&self, stream: &StreamName, shard: &ShardId) -> PathBuf {
        self.stream_dir(stream).join(format!("{}.log", shard.as_str()))
    }

    async fn require_stream(&self, stream: &StreamName) -> Result<PathBuf> {
        let dir = self.stream_dir(stream);
        if !is_dir(&dir).await {
            return Err(StreamError::StreamNotFound(stream.to_string()).into());
        }
        Ok(dir)
    }

    fn require_shard(&self, shard: &ShardId) -> Result<()> {
        match shard.index() {
            Some(index) if index < self.shard_count => Ok(()),
            _ => Err(StreamError::ShardNotFound(shard.to_string()).into()),
        }
    }
}

async fn is_dir(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

#[async_trait]
impl StreamPublisher for FileStream {
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

        self.require_stream(stream).await?;
        let shard_id = shard_for_key(partition_key, self.shard_count);
        let path = self.shard_path(stream, &shard_id);

        let _guard = self.write_lock.lock().await;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| StreamError::PublishFailed(format!("{}: {e}", path.display())))?;

        let sequence_number = file
            .metadata()
            .await
            .map_err(|e| StreamError::PublishFailed(format!("{}: {e}", path.display())))?
            .len();

        let envelope = RecordEnvelope {
            sequence_number,
            partition_key: partition_key.as_str().to_string(),
            data: STANDARD.encode(&data),
            approximate_arrival_timestamp: Utc::now(),
        };
        let mut line = serde_json::to_vec(&envelope)?;
        line.push(b'\n');

        file.write_all(&line)
            .await
            .map_err(|e| StreamError::PublishFailed(format!("{}: {e}", path.display())))?;
        file.sync_data()
            .await
            .map_err(|e| StreamError::PublishFailed(format!("{}: {e}", path.display())))?;

        tracing::trace!(
            stream = %stream,
            shard_id = %shard_id,
            sequence_number,
            bytes = data.len(),
            "Record appended"
        );

        Ok(PutRecordOutput {
            shard_id,
            sequence_number,
        })
    }
}

#[async_trait]
impl StreamConsumer for FileStream {
    async fn list_shards(&self, stream: &StreamName) -> Result<Vec<ShardId>> {
        self.require_stream(stream).await?;
        Ok((0..self.shard_count).map(ShardId::from_index).collect())
    }

    async fn latest_position(&self, stream: &StreamName, shard: &ShardId) -> Result<u64> {
        self.require_stream(stream).await?;
        self.require_shard(shard)?;
        match fs::metadata(self.shard_path(stream, shard)).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(StreamError::ReadFailed(e.to_string()).into()),
        }
    }

    async fn get_records(
        &self,
        stream: &StreamName,
        shard: &ShardId,
        position: u64,
        limit: usize,
    ) -> Result<GetRecordsOutput> {
        self.require_stream(stream).await?;
        self.require_shard(shard)?;
        let path = self.shard_path(stream, shard);

        let file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(GetRecordsOutput {
                    records: Vec::new(),
                    next_position: position,
                })
            }
            Err(e) => {
                return Err(StreamError::ReadFailed(format!("{}: {e}", path.display())).into())
            }
        };

        let mut reader = BufReader::new(file);
        reader
            .seek(SeekFrom::Start(position))
            .await
            .map_err(|e| StreamError::ReadFailed(format!("{}: {e}", path.display())))?;

        let mut records = Vec::new();
        let mut next_position = position;
        let mut line = String::new();

        while records.len() < limit {
            line.clear();
            let read = reader
                .read_line(&mut line)
                .await
                .map_err(|e| StreamError::ReadFailed(format!("{}: {e}", path.display())))?;

            // A line without its newline is still being appended
            if read == 0 || !line.ends_with('\n') {
                break;
            }

            let envelope: RecordEnvelope = serde_json::from_str(line.trim_end())
                .map_err(|e| StreamError::InvalidRecord(format!("offset {next_position}: {e}")))?;
            let data = STANDARD
                .decode(envelope.data.as_bytes())
                .map_err(|e| StreamError::InvalidRecord(format!("offset {next_position}: {e}")))?;
            let partition_key = PartitionKey::new(envelope.partition_key)
                .map_err(|e| StreamError::InvalidRecord(format!("offset {next_position}: {e}")))?;

            records.push(StreamRecord {
                shard_id: shard.clone(),
                sequence_number: envelope.sequence_number,
                partition_key,
                data,
                approximate_arrival_timestamp: envelope.approximate_arrival_timestamp,
            });
            next_position += read as u64;
        }

        Ok(GetRecordsOutput {
            records,
            next_position,
        })
    }
}
