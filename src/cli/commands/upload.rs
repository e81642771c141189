//! Upload command implementation
//!
//! Copies a local export into the raw bucket. With `--trigger` the upload is
//! followed by the same ingestion the storage notification would start.

use crate::adapters::factory::{create_ingest_handler, create_object_store};
use crate::adapters::storage::{ObjectLocation, ObjectStore};
use crate::config::load_config;
use crate::domain::{PipelineError, TriggerEvent};
use clap::Args;
use std::path::{Path, PathBuf};

/// Arguments for the upload command
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Local export file to upload
    pub file: PathBuf,

    /// Object key in the raw bucket (defaults to the file name)
    #[arg(long)]
    pub key: Option<String>,

    /// Run ingestion for the uploaded object
    #[arg(long)]
    pub trigger: bool,
}

impl UploadArgs {
    /// Execute the upload command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(file = %self.file.display(), "Starting upload command");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        let key = match self.object_key() {
            Ok(k) => k,
            Err(e) => {
                eprintln!("{e}");
                return Ok(2);
            }
        };

        let store = match create_object_store(&config).await {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Failed to open object store: {e}");
                return Ok(4);
            }
        };

        let bucket = config
            .storage
            .raw_bucket_name()
            .map_err(PipelineError::Configuration)?;
        let location = ObjectLocation::new(bucket.clone(), key.clone())?;

        let body = match tokio::fs::read(&self.file).await {
            Ok(b) => b,
            Err(e) => {
                eprintln!("Failed to read {}: {e}", self.file.display());
                return Ok(5);
            }
        };
        let size = body.len();

        if let Err(e) = store.put_object(&location, body).await {
            tracing::error!(error = %e, object = %location, "Upload failed");
            eprintln!("Upload failed: {e}");
            return Ok(5);
        }

        tracing::info!(object = %location, bytes = size, "Export uploaded");
        println!("✅ Uploaded {} ({size} bytes) to {location}", self.file.display());

        if !self.trigger {
            return Ok(0);
        }

        let handler = match create_ingest_handler(&config).await {
            Ok(h) => h,
            Err(e) => {
                eprintln!("Failed to initialize ingestion: {e}");
                return Ok(4);
            }
        };

        match handler.handle(&TriggerEvent::for_object(&bucket, key)).await {
            Ok(summary) => {
                println!(
                    "✅ Ingested {} records into {} messages",
                    summary.records_parsed, summary.messages_published
                );
                Ok(0)
            }
            Err(e) => {
                eprintln!("Ingestion failed: {e}");
                Ok(1)
            }
        }
    }

    fn object_key(&self) -> crate::domain::Result<String> {
        if let Some(key) = &self.key {
            return Ok(key.clone());
        }
        Path::new(&self.file)
            .file_name()
            .and_then(|name| name.to_str())
            .map(String::from)
            .ok_or_else(|| {
                PipelineError::Validation(format!(
                    "Cannot derive an object key from {}",
                    self.file.display()
                ))
            })
    }
}
