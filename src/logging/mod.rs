//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Configurable log levels, overridable with `RUST_LOG`
//! - Console output
//! - JSON-formatted local file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use vitalstream::logging::init_logging;
//! use vitalstream::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a flush of the ingestion buffer to the stream
///
/// # Example
///
/// ```no_run
/// use vitalstream::log_flush;
///
/// log_flush!(3, 12, 300_480, "shard-00001");
/// ```
#[macro_export]
macro_rules! log_flush {
    ($sequence:expr, $records:expr, $bytes:expr, $shard:expr) => {
        tracing::debug!(
            flush = $sequence,
            records = $records,
            bytes = $bytes,
            shard = %$shard,
            "Flushed buffer to stream"
        );
    };
}

/// Log a processed micro-batch window
///
/// # Example
///
/// ```no_run
/// use vitalstream::log_window_processed;
/// use std::time::Duration;
///
/// log_window_processed!(7, 1200, "processedhealthdata/health_metrics/part-00007.json", Duration::from_millis(250));
/// ```
#[macro_export]
macro_rules! log_window_processed {
    ($batch_id:expr, $records:expr, $output:expr, $duration:expr) => {
        tracing::info!(
            batch_id = $batch_id,
            records = $records,
            output = %$output,
            duration_ms = $duration.as_millis(),
            "Window processed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use vitalstream::log_error_with_context;
/// use vitalstream::domain::PipelineError;
///
/// let error = PipelineError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
