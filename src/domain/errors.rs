//! Domain error types
//!
//! This module defines the error hierarchy for the pipeline. All errors are
//! domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main pipeline error type
///
/// This is the primary error type used throughout the application.
/// It wraps the stream and storage error types and carries enough context
/// for the CLI to map a failure to an exit code.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Stream-related errors
    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    /// Object storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// XML document could not be parsed
    #[error("XML parse error: {0}")]
    Xml(String),

    /// A record could not be coerced into its typed form
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Checkpoint management errors
    #[error("State management error: {0}")]
    State(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// The invocation wall-clock ceiling was reached
    #[error("Invocation timed out after {0} seconds")]
    Timeout(u64),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Stream-specific errors
///
/// Errors raised by stream adapters when publishing or consuming records.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Stream does not exist
    #[error("Stream not found: {0}")]
    StreamNotFound(String),

    /// Shard does not exist
    #[error("Shard not found: {0}")]
    ShardNotFound(String),

    /// Publishing a record failed
    #[error("Failed to put record: {0}")]
    PublishFailed(String),

    /// Reading records failed
    #[error("Failed to get records: {0}")]
    ReadFailed(String),

    /// Record payload exceeds the per-record ceiling
    #[error("Record payload of {size} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge { size: usize, limit: usize },

    /// A stored record envelope could not be decoded
    #[error("Invalid record envelope: {0}")]
    InvalidRecord(String),
}

/// Object storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Bucket does not exist
    #[error("Bucket not found: {0}")]
    BucketNotFound(String),

    /// Object does not exist
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    /// Object key or location is invalid
    #[error("Invalid object location: {0}")]
    InvalidLocation(String),

    /// Reading an object failed
    #[error("Failed to read object: {0}")]
    ReadFailed(String),

    /// Writing an object failed
    #[error("Failed to write object: {0}")]
    WriteFailed(String),
}

impl PipelineError {
    /// Whether the error was caused by malformed input rather than infrastructure
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, PipelineError::MalformedRecord(_) | PipelineError::Xml(_))
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for PipelineError {
    fn from(err: toml::de::Error) -> Self {
        PipelineError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<quick_xml::Error> for PipelineError {
    fn from(err: quick_xml::Error) -> Self {
        PipelineError::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for PipelineError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        PipelineError::Xml(format!("invalid attribute: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_display() {
        let err = PipelineError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_stream_error_conversion() {
        let stream_err = StreamError::PublishFailed("connection reset".to_string());
        let err: PipelineError = stream_err.into();
        assert!(matches!(err, PipelineError::Stream(_)));
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_storage_error_conversion() {
        let storage_err = StorageError::ObjectNotFound("raw/export.xml".to_string());
        let err: PipelineError = storage_err.into();
        assert!(matches!(err, PipelineError::Storage(_)));
    }

    #[test]
    fn test_payload_too_large_display() {
        let err = StreamError::PayloadTooLarge {
            size: 2_000_000,
            limit: 1_048_576,
        };
        assert_eq!(
            err.to_string(),
            "Record payload of 2000000 bytes exceeds limit of 1048576 bytes"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: PipelineError = io_err.into();
        assert!(matches!(err, PipelineError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: PipelineError = json_err.into();
        assert!(matches!(err, PipelineError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: PipelineError = toml_err.into();
        assert!(matches!(err, PipelineError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_malformed_input_classification() {
        assert!(PipelineError::MalformedRecord("bad value".to_string()).is_malformed_input());
        assert!(PipelineError::Xml("unexpected eof".to_string()).is_malformed_input());
        assert!(!PipelineError::Timeout(900).is_malformed_input());
    }

    #[test]
    fn test_pipeline_error_implements_std_error() {
        let err = PipelineError::Validation("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
