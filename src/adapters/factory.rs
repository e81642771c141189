//! Adapter factory
//!
//! Builds the object store, stream and checkpoint backend described by the
//! configuration, and the two pipeline stages on top of them.

use crate::adapters::storage::{LocalObjectStore, ObjectLocation};
use crate::adapters::stream::FileStream;
use crate::config::VitalstreamConfig;
use crate::core::ingest::{IngestHandler, IngestionStreamer};
use crate::core::state::{ObjectStoreCheckpointStorage, StateManager};
use crate::core::transform::{BatchProcessor, BatchTransformer, TransformerSettings};
use crate::domain::{PipelineError, Result, StreamName};
use std::sync::Arc;
use std::time::Duration;

/// Create the object store and make sure the raw bucket exists
pub async fn create_object_store(config: &VitalstreamConfig) -> Result<Arc<LocalObjectStore>> {
    let store = LocalObjectStore::new(&config.storage.root);
    let raw_bucket = config
        .storage
        .raw_bucket_name()
        .map_err(PipelineError::Configuration)?;
    store.create_bucket(&raw_bucket).await?;

    tracing::debug!(root = %config.storage.root, "Object store ready");
    Ok(Arc::new(store))
}

/// Create the stream and make sure its shard logs exist
pub async fn create_stream(config: &VitalstreamConfig) -> Result<(Arc<FileStream>, StreamName)> {
    let name = config
        .stream
        .stream_name()
        .map_err(PipelineError::Configuration)?;
    let stream = FileStream::new(&config.stream.root, config.stream.shard_count);
    stream.ensure_stream(&name).await?;
    Ok((Arc::new(stream), name))
}

/// Create the checkpoint manager under `transform.checkpoint_location`
pub async fn create_state_manager(
    config: &VitalstreamConfig,
    store: Arc<LocalObjectStore>,
) -> Result<StateManager> {
    let location = ObjectLocation::parse(&config.transform.checkpoint_path())?;
    store.create_bucket(&location.bucket).await?;

    let storage = ObjectStoreCheckpointStorage::new(store, location);
    Ok(StateManager::new_with_storage(Arc::new(storage)))
}

/// Create the ingestion handler
pub async fn create_ingest_handler(config: &VitalstreamConfig) -> Result<IngestHandler> {
    let store = create_object_store(config).await?;
    let (stream, name) = create_stream(config).await?;

    let streamer = IngestionStreamer::new(stream, name, config.ingest.batch_size_bytes)
        .with_dry_run(config.application.dry_run);
    Ok(IngestHandler::new(
        store,
        streamer,
        Duration::from_secs(config.ingest.invocation_timeout_secs),
    ))
}

/// Create the batch transformer job
pub async fn create_transformer(config: &VitalstreamConfig) -> Result<BatchTransformer> {
    let store = create_object_store(config).await?;
    let (stream, name) = create_stream(config).await?;

    let output = ObjectLocation::parse(&config.transform.output_path)?;
    store.create_bucket(&output.bucket).await?;

    let processor =
        BatchProcessor::new(store.clone(), &output)?.with_dry_run(config.application.dry_run);
    let state_manager = create_state_manager(config, store).await?;

    let settings = TransformerSettings {
        job_name: config.transform.job_name.clone(),
        stream: name,
        window: Duration::from_secs(config.transform.window_seconds),
        starting_position: config.transform.starting_position,
        max_records_per_batch: config.transform.max_records_per_batch,
        dry_run: config.application.dry_run,
    };

    Ok(BatchTransformer::new(
        stream,
        processor,
        Arc::new(state_manager),
        settings,
    ))
}
