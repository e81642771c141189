//! Trigger handler
//!
//! Maps an object-created notification to stream publish calls: every
//! referenced object is opened from the object store and streamed in the
//! order the notification lists them, all under one wall-clock ceiling.

use crate::adapters::storage::{ObjectLocation, ObjectStore};
use crate::core::ingest::streamer::IngestionStreamer;
use crate::core::ingest::summary::IngestSummary;
use crate::domain::{PipelineError, Result, TriggerEvent};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Handles storage notifications for the ingestion stage
pub struct IngestHandler {
    store: Arc<dyn ObjectStore>,
    streamer: IngestionStreamer,
    timeout: Duration,
}

impl IngestHandler {
    /// Create a handler with an invocation ceiling
    pub fn new(store: Arc<dyn ObjectStore>, streamer: IngestionStreamer, timeout: Duration) -> Self {
        Self {
            store,
            streamer,
            timeout,
        }
    }

    /// Process every object referenced by a trigger
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed trigger before anything is
    /// read, `PipelineError::Timeout` when the ceiling is reached, and
    /// otherwise the first read, parse or publish failure. Messages published
    /// before a failure are not rolled back.
    pub async fn handle(&self, event: &TriggerEvent) -> Result<IngestSummary> {
        let objects = event.objects()?;
        let started = Instant::now();

        let run = async {
            let mut summary = IngestSummary {
                dry_run: self.streamer.is_dry_run(),
                ..IngestSummary::new()
            };
            for object in &objects {
                let location = ObjectLocation::new(object.bucket.clone(), object.key.clone())?;
                tracing::info!(
                    object = %location,
                    stream = %self.streamer.stream(),
                    "Streaming object"
                );

                let reader = self.store.get_object(&location).await?;
                let object_summary = self.streamer.stream_document(reader).await.map_err(|e| {
                    crate::log_error_with_context!(&e, "Failed to stream object");
                    e
                })?;
                summary.merge(&object_summary);
            }
            Ok::<_, PipelineError>(summary)
        };

        let summary = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| PipelineError::Timeout(self.timeout.as_secs()))??;

        let summary = summary.with_duration(started.elapsed());
        summary.log_summary();
        Ok(summary)
    }
}
