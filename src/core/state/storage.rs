//! Checkpoint persistence backends

use crate::adapters::storage::{ObjectLocation, ObjectStore};
use crate::core::state::checkpoint::Checkpoint;
use crate::domain::{PipelineError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Storage backend for checkpoints
#[async_trait]
pub trait CheckpointStorage: Send + Sync {
    /// Load the checkpoint of a job, `None` if the job has never committed
    async fn load_checkpoint(&self, job_name: &str) -> Result<Option<Checkpoint>>;

    /// Replace the checkpoint of a job
    async fn save_checkpoint(&self, checkpoint: &Checkpoint) -> Result<()>;
}

/// Checkpoints stored as `<location>/<job_name>.json` objects
pub struct ObjectStoreCheckpointStorage {
    store: Arc<dyn ObjectStore>,
    location: ObjectLocation,
}

impl ObjectStoreCheckpointStorage {
    /// Create a backend writing under `location`
    pub fn new(store: Arc<dyn ObjectStore>, location: ObjectLocation) -> Self {
        Self { store, location }
    }

    fn object_for(&self, job_name: &str) -> Result<ObjectLocation> {
        self.location.join(&format!("{job_name}.json"))
    }
}

#[async_trait]
impl CheckpointStorage for ObjectStoreCheckpointStorage {
    async fn load_checkpoint(&self, job_name: &str) -> Result<Option<Checkpoint>> {
        let location = self.object_for(job_name)?;
        let Some(bytes) = self.store.get_object_bytes(&location).await? else {
            return Ok(None);
        };

        let checkpoint = serde_json::from_slice(&bytes).map_err(|e| {
            PipelineError::State(format!("Corrupt checkpoint at {location}: {e}"))
        })?;
        Ok(Some(checkpoint))
    }

    async fn save_checkpoint(&self, checkpoint: &Checkpoint) -> Result<()> {
        let location = self.object_for(&checkpoint.job_name)?;
        let body = serde_json::to_vec_pretty(checkpoint)?;
        self.store.put_object(&location, body).await
    }
}

/// Checkpoints kept in process memory, for tests and dry runs
#[derive(Default)]
pub struct InMemoryCheckpointStorage {
    checkpoints: Mutex<HashMap<String, Checkpoint>>,
}

impl InMemoryCheckpointStorage {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckpointStorage for InMemoryCheckpointStorage {
    async fn load_checkpoint(&self, job_name: &str) -> Result<Option<Checkpoint>> {
        let checkpoints = self
            .checkpoints
            .lock()
            .map_err(|_| PipelineError::State("checkpoint lock poisoned".to_string()))?;
        Ok(checkpoints.get(job_name).cloned())
    }

    async fn save_checkpoint(&self, checkpoint: &Checkpoint) -> Result<()> {
        let mut checkpoints = self
            .checkpoints
            .lock()
            .map_err(|_| PipelineError::State("checkpoint lock poisoned".to_string()))?;
        checkpoints.insert(checkpoint.job_name.clone(), checkpoint.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::LocalObjectStore;
    use crate::core::state::checkpoint::CheckpointBuilder;
    use crate::domain::{BucketName, ShardId, StreamName};
    use tempfile::TempDir;

    fn checkpoint() -> Checkpoint {
        CheckpointBuilder::new("health_etl", StreamName::new("health_data").unwrap())
            .position(ShardId::from_index(0), 42)
            .build()
    }

    #[tokio::test]
    async fn test_object_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = LocalObjectStore::new(dir.path());
        let bucket = BucketName::new("processedhealthdata").unwrap();
        store.create_bucket(&bucket).await.unwrap();

        let location = ObjectLocation::parse("processedhealthdata/temp/checkpoint/").unwrap();
        let storage = ObjectStoreCheckpointStorage::new(Arc::new(store), location);

        assert!(storage.load_checkpoint("health_etl").await.unwrap().is_none());

        storage.save_checkpoint(&checkpoint()).await.unwrap();
        let loaded = storage.load_checkpoint("health_etl").await.unwrap().unwrap();
        assert_eq!(loaded, checkpoint());

        assert!(dir
            .path()
            .join("processedhealthdata/temp/checkpoint/health_etl.json")
            .exists());
    }

    #[tokio::test]
    async fn test_corrupt_checkpoint_is_state_error() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(LocalObjectStore::new(dir.path()));
        let bucket = BucketName::new("processedhealthdata").unwrap();
        store.create_bucket(&bucket).await.unwrap();

        let location = ObjectLocation::parse("processedhealthdata/checkpoint").unwrap();
        store
            .put_object(
                &location.join("health_etl.json").unwrap(),
                b"not json".to_vec(),
            )
            .await
            .unwrap();

        let storage = ObjectStoreCheckpointStorage::new(store, location);
        let err = storage.load_checkpoint("health_etl").await.unwrap_err();
        assert!(matches!(err, PipelineError::State(_)));
    }

    #[tokio::test]
    async fn test_in_memory_round_trip() {
        let storage = InMemoryCheckpointStorage::new();
        assert!(storage.load_checkpoint("health_etl").await.unwrap().is_none());

        storage.save_checkpoint(&checkpoint()).await.unwrap();
        assert_eq!(
            storage.load_checkpoint("health_etl").await.unwrap(),
            Some(checkpoint())
        );
    }
}
