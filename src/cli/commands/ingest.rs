//! Ingest command implementation
//!
//! This module implements the `ingest` command, which plays the part of the
//! storage-notification handler: it streams the referenced exports from the
//! raw bucket onto the event stream.

use crate::adapters::factory::create_ingest_handler;
use crate::config::load_config;
use crate::core::ingest::IngestSummary;
use crate::domain::{BucketName, PipelineError, TriggerEvent};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the ingest command
#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Object key of the export inside the bucket
    #[arg(long, conflicts_with = "event")]
    pub key: Option<String>,

    /// Bucket holding the export (defaults to storage.raw_bucket)
    #[arg(long, requires = "key")]
    pub bucket: Option<String>,

    /// Path to a JSON storage notification to replay
    #[arg(long, value_name = "FILE")]
    pub event: Option<PathBuf>,

    /// Dry run mode - parse and count without publishing
    #[arg(long)]
    pub dry_run: bool,
}

impl IngestArgs {
    /// Execute the ingest command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting ingest command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
            println!("🔍 DRY RUN MODE - No messages will be published");
            println!();
        }

        let event = match self.trigger_event(&config.storage.raw_bucket) {
            Ok(event) => event,
            Err(e) => {
                eprintln!("Invalid trigger: {e}");
                return Ok(2);
            }
        };

        let handler = match create_ingest_handler(&config).await {
            Ok(h) => h,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create ingest handler");
                eprintln!("Failed to initialize ingestion: {e}");
                return Ok(4);
            }
        };

        println!("🚀 Streaming export...");
        println!();

        match handler.handle(&event).await {
            Ok(summary) => {
                print_summary(&summary);
                println!("✅ Ingestion completed successfully!");
                Ok(0)
            }
            Err(e @ PipelineError::Validation(_)) => {
                eprintln!("Invalid trigger: {e}");
                Ok(2)
            }
            Err(e) => {
                tracing::error!(error = %e, "Ingestion failed");
                eprintln!("Ingestion failed: {e}");
                println!("⚠️  Messages published before the failure were not rolled back.");
                Ok(1)
            }
        }
    }

    fn trigger_event(&self, default_bucket: &str) -> crate::domain::Result<TriggerEvent> {
        if let Some(path) = &self.event {
            let json = std::fs::read_to_string(path)?;
            return TriggerEvent::from_json(&json);
        }

        let key = self.key.as_deref().ok_or_else(|| {
            PipelineError::Validation("Either --key or --event is required".to_string())
        })?;
        let bucket = BucketName::new(self.bucket.as_deref().unwrap_or(default_bucket))
            .map_err(PipelineError::Validation)?;
        Ok(TriggerEvent::for_object(&bucket, key))
    }
}

fn print_summary(summary: &IngestSummary) {
    println!("📊 Ingestion Summary:");
    println!("  Objects: {}", summary.objects_processed);
    println!("  Records Parsed: {}", summary.records_parsed);
    println!("  Messages Published: {}", summary.messages_published);
    println!("  Bytes Published: {}", summary.bytes_published);
    println!("  Peak Buffer: {} bytes", summary.peak_buffer_bytes);
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(key: Option<&str>, bucket: Option<&str>) -> IngestArgs {
        IngestArgs {
            key: key.map(String::from),
            bucket: bucket.map(String::from),
            event: None,
            dry_run: false,
        }
    }

    #[test]
    fn test_trigger_from_key_uses_raw_bucket() {
        let event = args(Some("export.xml"), None)
            .trigger_event("rawhealthdata")
            .unwrap();
        let objects = event.objects().unwrap();
        assert_eq!(objects[0].bucket.as_str(), "rawhealthdata");
        assert_eq!(objects[0].key, "export.xml");
    }

    #[test]
    fn test_trigger_with_bucket_override() {
        let event = args(Some("export.xml"), Some("otherbucket"))
            .trigger_event("rawhealthdata")
            .unwrap();
        assert_eq!(event.objects().unwrap()[0].bucket.as_str(), "otherbucket");
    }

    #[test]
    fn test_trigger_requires_key_or_event() {
        let err = args(None, None).trigger_event("rawhealthdata").unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
    }

    #[test]
    fn test_trigger_from_event_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("event.json");
        std::fs::write(
            &path,
            r#"{"Records":[{"s3":{"bucket":{"name":"rawhealthdata"},"object":{"key":"a.xml"}}}]}"#,
        )
        .unwrap();

        let mut ingest = args(None, None);
        ingest.event = Some(path);
        let event = ingest.trigger_event("ignored").unwrap();
        assert_eq!(event.objects().unwrap()[0].key, "a.xml");
    }
}
