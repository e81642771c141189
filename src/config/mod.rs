//! Configuration management for Vitalstream.
//!
//! # Overview
//!
//! Vitalstream uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `VITALSTREAM_<SECTION>_<KEY>` overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use vitalstream::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("vitalstream.toml")?;
//!
//! println!("Stream: {} ({} shards)", config.stream.name, config.stream.shard_count);
//! println!("Output: {}", config.transform.output_path);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level, dry run
//! - [`StorageConfig`] - local object store root and raw bucket
//! - [`StreamConfig`] - stream name, root directory, shard count
//! - [`IngestConfig`] - flush threshold and invocation timeout
//! - [`TransformConfig`] - job name, output path, window, checkpoint location
//! - [`LoggingConfig`] - local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [stream]
//! name = "health_data"
//! shard_count = 5
//!
//! [ingest]
//! batch_size_bytes = 300480
//!
//! [transform]
//! job_name = "health_etl"
//! output_path = "${VITALSTREAM_OUTPUT_BUCKET}/"
//! window_seconds = 100
//! ```

pub mod loader;
pub mod schema;

pub use loader::{load_config, load_config_from_str};
pub use schema::{
    ApplicationConfig, IngestConfig, LoggingConfig, StartingPosition, StorageConfig,
    StreamConfig, TransformConfig, VitalstreamConfig,
};
