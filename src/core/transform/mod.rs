//! Batch transformer
//!
//! Consumes the event stream in fixed time windows and lands typed,
//! pseudonymized records in processing-time partitions:
//!
//! - [`mapping`] - JSON lines to typed rows (`value` string to double)
//! - [`hash`] - SHA-256 pseudonymization of the device field
//! - [`partition`] - `ingest_year=/ingest_month=/ingest_day=/ingest_hour=` paths
//! - [`batch`] - one micro-batch to one output object
//! - [`transformer`] - the windowed job and its state machine

pub mod batch;
pub mod hash;
pub mod mapping;
pub mod partition;
pub mod transformer;

pub use batch::{BatchProcessor, BatchResult, MicroBatch, OUTPUT_TABLE};
pub use hash::hash_device;
pub use mapping::{decode_message, map_record, parse_value};
pub use partition::{Clock, FixedClock, PartitionPath, SystemClock};
pub use transformer::{BatchTransformer, TransformSummary, TransformerSettings, TransformerState};
