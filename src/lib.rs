// Vitalstream - Health Export Streaming ETL
// Copyright (c) 2025 Vitalstream Contributors
// Licensed under the MIT License

//! # Vitalstream - Health Export Streaming ETL
//!
//! Vitalstream moves personal health exports from object storage into an
//! analytics-ready, partitioned dataset in two decoupled stages joined by a
//! sharded event stream.
//!
//! ## Overview
//!
//! - **Ingestion**: an uploaded XML export is read incrementally, each
//!   `<Record>` becomes a JSON line, and lines are published to the stream in
//!   size-bounded messages
//! - **Transformation**: a windowed job consumes the stream in micro-batches,
//!   types the values, pseudonymizes the device field and writes JSON lines
//!   into hour-partitioned output
//! - **State**: the job's per-shard positions are checkpointed after every
//!   window so a restart resumes where it left off
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (ingest, transform, state)
//! - [`adapters`] - Stream and object store backends
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vitalstream::adapters::factory::{create_ingest_handler, create_transformer};
//! use vitalstream::config::load_config;
//! use vitalstream::domain::{BucketName, TriggerEvent};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("vitalstream.toml")?;
//!
//!     // Stream an uploaded export onto the event stream
//!     let handler = create_ingest_handler(&config).await?;
//!     let bucket = BucketName::new("rawhealthdata")?;
//!     let summary = handler
//!         .handle(&TriggerEvent::for_object(&bucket, "export.xml"))
//!         .await?;
//!     println!("Published {} messages", summary.messages_published);
//!
//!     // Transform one window
//!     let mut transformer = create_transformer(&config).await?;
//!     let result = transformer.run_once().await?;
//!     println!("Wrote {} records", result.records_written);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Library operations return [`domain::Result`], backed by
//! [`domain::PipelineError`]:
//!
//! ```rust,no_run
//! use vitalstream::domain::PipelineError;
//!
//! fn example() -> Result<(), PipelineError> {
//!     let _config = vitalstream::config::load_config("vitalstream.toml")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! Vitalstream uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!(stream = "health_data", "Starting ingestion");
//! warn!(batch_id = 3, "Window held only empty messages");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
