//! Ingestion streamer
//!
//! Parses a raw export incrementally and publishes its records to the event
//! stream as newline-delimited JSON, batched by byte size.
//!
//! - [`reader`] - pull-based `Record` element reader
//! - [`accumulator`] - byte-bounded line buffer with explicit flush
//! - [`streamer`] - document to publish calls
//! - [`handler`] - trigger notification to documents, under a timeout

pub mod accumulator;
pub mod handler;
pub mod reader;
pub mod streamer;
pub mod summary;

pub use accumulator::{Payload, RecordAccumulator};
pub use handler::IngestHandler;
pub use reader::RecordReader;
pub use streamer::IngestionStreamer;
pub use summary::IngestSummary;
