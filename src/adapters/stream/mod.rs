//! Event stream adapters
//!
//! - [`traits`] - publish/consume primitives
//! - [`file`] - sharded append-only logs on the local filesystem
//! - [`memory`] - in-memory stream that records publish calls

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileStream;
pub use memory::{MemoryStream, PublishedRecord};
pub use traits::{
    shard_for_key, GetRecordsOutput, PutRecordOutput, StreamConsumer, StreamPublisher,
    StreamRecord, MAX_RECORD_PAYLOAD_BYTES,
};
