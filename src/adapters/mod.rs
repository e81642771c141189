//! External system integrations.
//!
//! The pipeline talks to two managed services, both behind traits:
//!
//! - [`stream`] - the ordered, sharded event stream ([`stream::StreamPublisher`],
//!   [`stream::StreamConsumer`])
//! - [`storage`] - object storage for raw exports, output partitions and
//!   checkpoints ([`storage::ObjectStore`])
//! - [`factory`] - builds both from configuration
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies and
//! enable testing with in-memory implementations:
//!
//! ```rust,no_run
//! use vitalstream::adapters::storage::{LocalObjectStore, ObjectLocation, ObjectStore};
//! use vitalstream::adapters::stream::{FileStream, StreamPublisher};
//! use vitalstream::domain::{PartitionKey, StreamName};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = LocalObjectStore::new("./data/buckets");
//! let raw = ObjectLocation::parse("rawhealthdata/export.xml")?;
//! let _reader = store.get_object(&raw).await?;
//!
//! let stream = FileStream::new("./data/streams", 5);
//! let name = StreamName::new("health_data")?;
//! stream.ensure_stream(&name).await?;
//! stream.put_record(&name, &PartitionKey::random(), b"{}\n".to_vec()).await?;
//! # Ok(())
//! # }
//! ```

pub mod factory;
pub mod storage;
pub mod stream;
