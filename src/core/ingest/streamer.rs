//! Ingestion streamer
//!
//! Turns one XML document into a sequence of stream messages. Parsing and
//! publishing are strictly sequential: the only suspension point besides
//! reading the source is the awaited publish call.

use crate::adapters::stream::StreamPublisher;
use crate::core::ingest::accumulator::{Payload, RecordAccumulator};
use crate::core::ingest::reader::RecordReader;
use crate::core::ingest::summary::IngestSummary;
use crate::domain::ids::{PartitionKey, StreamName};
use crate::domain::Result;
use std::sync::Arc;
use tokio::io::AsyncBufRead;

/// Streams parsed records onto the event stream in byte-bounded messages
pub struct IngestionStreamer {
    publisher: Arc<dyn StreamPublisher>,
    stream: StreamName,
    batch_size_bytes: usize,
    dry_run: bool,
}

impl IngestionStreamer {
    /// Create a streamer publishing to `stream`
    pub fn new(
        publisher: Arc<dyn StreamPublisher>,
        stream: StreamName,
        batch_size_bytes: usize,
    ) -> Self {
        Self {
            publisher,
            stream,
            batch_size_bytes,
            dry_run: false,
        }
    }

    /// Parse and count without publishing
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Whether publishing is skipped
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Target stream
    pub fn stream(&self) -> &StreamName {
        &self.stream
    }

    /// Stream every `Record` of a document
    ///
    /// Each message holds one or more JSON lines in document order. Every
    /// message except possibly the last is at least `batch_size_bytes` long,
    /// unless the next line would have taken it past the stream payload
    /// ceiling; no message ever exceeds that ceiling.
    ///
    /// # Errors
    ///
    /// XML errors and publish failures propagate immediately; messages
    /// already published stay published.
    pub async fn stream_document<R>(&self, source: R) -> Result<IngestSummary>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut reader = RecordReader::new(source);
        let mut accumulator = RecordAccumulator::new(self.batch_size_bytes);
        let mut summary = IngestSummary {
            dry_run: self.dry_run,
            ..IngestSummary::new()
        };

        while let Some(record) = reader.next_record().await? {
            if let Some(payload) = accumulator.push(&record)? {
                self.publish(payload, &mut summary).await?;
            }
            if accumulator.is_full() {
                self.flush(&mut accumulator, &mut summary).await?;
            }
        }
        self.flush(&mut accumulator, &mut summary).await?;

        summary.objects_processed = 1;
        summary.records_parsed = reader.records_read();
        summary.peak_buffer_bytes = accumulator.peak_bytes();
        Ok(summary)
    }

    async fn flush(
        &self,
        accumulator: &mut RecordAccumulator,
        summary: &mut IngestSummary,
    ) -> Result<()> {
        match accumulator.take() {
            Some(payload) => self.publish(payload, summary).await,
            None => Ok(()),
        }
    }

    async fn publish(&self, payload: Payload, summary: &mut IngestSummary) -> Result<()> {
        let Payload { data, records } = payload;
        let bytes = data.len();

        if self.dry_run {
            tracing::debug!(records, bytes, "Dry run: skipping publish");
        } else {
            let output = self
                .publisher
                .put_record(&self.stream, &PartitionKey::random(), data.into_bytes())
                .await?;
            crate::log_flush!(
                summary.messages_published + 1,
                records,
                bytes,
                output.shard_id
            );
        }

        summary.messages_published += 1;
        summary.bytes_published += bytes as u64;
        Ok(())
    }
}
