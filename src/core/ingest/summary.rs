//! Ingestion summary and reporting

use std::time::Duration;

/// Summary of one ingestion invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Source objects fully streamed
    pub objects_processed: usize,

    /// `Record` elements parsed
    pub records_parsed: u64,

    /// Stream messages published, or sealed without publishing in a dry run
    pub messages_published: u64,

    /// Payload bytes published
    pub bytes_published: u64,

    /// Largest accumulation buffer observed
    pub peak_buffer_bytes: usize,

    /// Whether publishing was skipped
    pub dry_run: bool,

    /// Wall-clock duration of the invocation
    pub duration: Duration,
}

impl IngestSummary {
    /// Create a new empty summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Fold the counters of another summary into this one
    pub fn merge(&mut self, other: &IngestSummary) {
        self.objects_processed += other.objects_processed;
        self.records_parsed += other.records_parsed;
        self.messages_published += other.messages_published;
        self.bytes_published += other.bytes_published;
        self.peak_buffer_bytes = self.peak_buffer_bytes.max(other.peak_buffer_bytes);
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            objects = self.objects_processed,
            records = self.records_parsed,
            messages = self.messages_published,
            bytes = self.bytes_published,
            peak_buffer_bytes = self.peak_buffer_bytes,
            dry_run = self.dry_run,
            duration_ms = self.duration.as_millis(),
            "Ingestion completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge() {
        let mut total = IngestSummary::new();
        total.merge(&IngestSummary {
            objects_processed: 1,
            records_parsed: 10,
            messages_published: 2,
            bytes_published: 900,
            peak_buffer_bytes: 500,
            ..Default::default()
        });
        total.merge(&IngestSummary {
            objects_processed: 1,
            records_parsed: 5,
            messages_published: 1,
            bytes_published: 300,
            peak_buffer_bytes: 300,
            ..Default::default()
        });

        assert_eq!(total.objects_processed, 2);
        assert_eq!(total.records_parsed, 15);
        assert_eq!(total.messages_published, 3);
        assert_eq!(total.bytes_published, 1200);
        assert_eq!(total.peak_buffer_bytes, 500);
    }
}
