//! Domain models and types.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Records** ([`HealthRecord`] on the wire, [`TypedHealthRecord`] at rest)
//! - **Triggers** ([`TriggerEvent`], validated into [`ObjectRef`]s)
//! - **Strongly-typed identifiers** ([`StreamName`], [`ShardId`], [`PartitionKey`], [`BucketName`])
//! - **Error types** ([`PipelineError`], [`StreamError`], [`StorageError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, PipelineError>`]:
//!
//! ```rust
//! use vitalstream::domain::{PipelineError, Result, StreamName};
//!
//! fn stream(name: &str) -> Result<StreamName> {
//!     StreamName::new(name).map_err(PipelineError::Validation)
//! }
//!
//! assert!(stream("health_data").is_ok());
//! assert!(stream("bad name").is_err());
//! ```

pub mod errors;
pub mod ids;
pub mod record;
pub mod result;
pub mod trigger;

// Re-export commonly used types for convenience
pub use errors::{PipelineError, StorageError, StreamError};
pub use ids::{BucketName, PartitionKey, ShardId, StreamName};
pub use record::{HealthRecord, TypedHealthRecord, RECORD_ATTRIBUTES};
pub use result::Result;
pub use trigger::{ObjectRef, TriggerEvent};
