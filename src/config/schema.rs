//! Configuration schema types
//!
//! This module defines the configuration structure mapped from the TOML file.

use crate::adapters::storage::ObjectLocation;
use crate::adapters::stream::MAX_RECORD_PAYLOAD_BYTES;
use crate::domain::ids::{BucketName, StreamName};
use serde::{Deserialize, Serialize};

/// Where a consumer without a checkpoint starts reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StartingPosition {
    /// Oldest record still in the stream
    #[default]
    TrimHorizon,
    /// Only records published after the consumer starts
    Latest,
}

/// Main configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VitalstreamConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Object storage settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Event stream settings
    #[serde(default)]
    pub stream: StreamConfig,

    /// Ingestion streamer settings
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Batch transformer settings
    pub transform: TransformConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl VitalstreamConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.storage.validate()?;
        self.stream.validate()?;
        self.ingest.validate()?;
        self.transform.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (parse and transform without publishing or writing)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Object storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory of the local object store
    #[serde(default = "default_storage_root")]
    pub root: String,

    /// Bucket that receives raw export files
    #[serde(default = "default_raw_bucket")]
    pub raw_bucket: String,
}

impl StorageConfig {
    fn validate(&self) -> Result<(), String> {
        if self.root.is_empty() {
            return Err("storage.root cannot be empty".to_string());
        }
        BucketName::new(self.raw_bucket.clone())
            .map_err(|e| format!("storage.raw_bucket: {e}"))?;
        Ok(())
    }

    /// Raw bucket as a validated name
    pub fn raw_bucket_name(&self) -> Result<BucketName, String> {
        BucketName::new(self.raw_bucket.clone())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
            raw_bucket: default_raw_bucket(),
        }
    }
}

/// Event stream configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Stream name shared by the producer and the consumer
    #[serde(default = "default_stream_name")]
    pub name: String,

    /// Root directory of the local stream logs
    #[serde(default = "default_stream_root")]
    pub root: String,

    /// Number of shards
    #[serde(default = "default_shard_count")]
    pub shard_count: u32,
}

impl StreamConfig {
    fn validate(&self) -> Result<(), String> {
        StreamName::new(self.name.clone()).map_err(|e| format!("stream.name: {e}"))?;

        if self.root.is_empty() {
            return Err("stream.root cannot be empty".to_string());
        }

        if !(1..=64).contains(&self.shard_count) {
            return Err(format!(
                "stream.shard_count must be between 1 and 64, got {}",
                self.shard_count
            ));
        }
        Ok(())
    }

    /// Stream name as a validated identifier
    pub fn stream_name(&self) -> Result<StreamName, String> {
        StreamName::new(self.name.clone())
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            name: default_stream_name(),
            root: default_stream_root(),
            shard_count: default_shard_count(),
        }
    }
}

/// Ingestion streamer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Flush threshold for the accumulation buffer, in bytes
    #[serde(default = "default_batch_size_bytes")]
    pub batch_size_bytes: usize,

    /// Hard wall-clock ceiling for one invocation
    #[serde(default = "default_invocation_timeout_secs")]
    pub invocation_timeout_secs: u64,
}

impl IngestConfig {
    fn validate(&self) -> Result<(), String> {
        if self.batch_size_bytes == 0 || self.batch_size_bytes > MAX_RECORD_PAYLOAD_BYTES {
            return Err(format!(
                "ingest.batch_size_bytes must be between 1 and {}, got {}",
                MAX_RECORD_PAYLOAD_BYTES, self.batch_size_bytes
            ));
        }

        if !(1..=900).contains(&self.invocation_timeout_secs) {
            return Err(format!(
                "ingest.invocation_timeout_secs must be between 1 and 900, got {}",
                self.invocation_timeout_secs
            ));
        }
        Ok(())
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size_bytes: default_batch_size_bytes(),
            invocation_timeout_secs: default_invocation_timeout_secs(),
        }
    }
}

/// Batch transformer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Job name, also the checkpoint object name
    #[serde(default = "default_job_name")]
    pub job_name: String,

    /// Target region
    #[serde(default = "default_region")]
    pub region: String,

    /// Output path prefix, `bucket/prefix` or `s3://bucket/prefix`
    pub output_path: String,

    /// Micro-batch window length in seconds
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,

    /// Checkpoint location; defaults to `<output_path>temp/checkpoint/`
    #[serde(default)]
    pub checkpoint_location: Option<String>,

    /// Where to start when no checkpoint exists
    #[serde(default)]
    pub starting_position: StartingPosition,

    /// Upper bound on stream records pulled into one micro-batch
    #[serde(default = "default_max_records_per_batch")]
    pub max_records_per_batch: usize,
}

impl TransformConfig {
    fn validate(&self) -> Result<(), String> {
        if self.job_name.trim().is_empty() {
            return Err("transform.job_name cannot be empty".to_string());
        }

        if !self
            .job_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
        {
            return Err(format!(
                "transform.job_name '{}' may only contain letters, digits, '_' and '-'",
                self.job_name
            ));
        }

        if self.region.trim().is_empty() {
            return Err("transform.region cannot be empty".to_string());
        }

        ObjectLocation::parse(&self.output_path)
            .map_err(|e| format!("transform.output_path: {e}"))?;
        ObjectLocation::parse(&self.checkpoint_path())
            .map_err(|e| format!("transform.checkpoint_location: {e}"))?;

        if self.window_seconds == 0 {
            return Err("transform.window_seconds must be > 0".to_string());
        }

        if self.max_records_per_batch == 0 {
            return Err("transform.max_records_per_batch must be > 0".to_string());
        }
        Ok(())
    }

    /// Effective checkpoint location
    pub fn checkpoint_path(&self) -> String {
        match &self.checkpoint_location {
            Some(location) => location.clone(),
            None => format!("{}temp/checkpoint/", with_trailing_slash(&self.output_path)),
        }
    }
}

fn with_trailing_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log file path
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_storage_root() -> String {
    "./data/buckets".to_string()
}

fn default_raw_bucket() -> String {
    "rawhealthdata".to_string()
}

fn default_stream_name() -> String {
    "health_data".to_string()
}

fn default_stream_root() -> String {
    "./data/streams".to_string()
}

fn default_shard_count() -> u32 {
    5
}

fn default_batch_size_bytes() -> usize {
    20 * 15024
}

fn default_invocation_timeout_secs() -> u64 {
    900
}

fn default_job_name() -> String {
    "health_etl".to_string()
}

fn default_region() -> String {
    "local".to_string()
}

fn default_window_seconds() -> u64 {
    100
}

fn default_max_records_per_batch() -> usize {
    10_000
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
