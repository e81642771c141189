//! Core business logic for Vitalstream.
//!
//! # Modules
//!
//! - [`ingest`] - XML export to stream messages
//! - [`transform`] - stream windows to typed, partitioned output
//! - [`state`] - transformer checkpoints
//!
//! # Pipeline
//!
//! 1. **Trigger**: an object-created notification names a raw export
//! 2. **Ingest**: records are parsed incrementally and published in byte-bounded messages
//! 3. **Window**: the transformer reads everything published since its checkpoint
//! 4. **Transform**: values are typed and devices hashed; a bad value fails the window
//! 5. **Write**: one object per window under a processing-time partition
//! 6. **Checkpoint**: positions advance only after the write succeeds
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use vitalstream::adapters::storage::LocalObjectStore;
//! use vitalstream::adapters::stream::FileStream;
//! use vitalstream::core::ingest::{IngestHandler, IngestionStreamer};
//! use vitalstream::domain::{BucketName, StreamName, TriggerEvent};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(LocalObjectStore::new("./data/buckets"));
//! let stream = Arc::new(FileStream::new("./data/streams", 5));
//! let name = StreamName::new("health_data")?;
//! stream.ensure_stream(&name).await?;
//!
//! let streamer = IngestionStreamer::new(stream, name, 20 * 15024);
//! let handler = IngestHandler::new(store, streamer, Duration::from_secs(900));
//!
//! let bucket = BucketName::new("rawhealthdata")?;
//! let summary = handler.handle(&TriggerEvent::for_object(&bucket, "export.xml")).await?;
//! println!("Published {} messages", summary.messages_published);
//! # Ok(())
//! # }
//! ```

pub mod ingest;
pub mod state;
pub mod transform;
