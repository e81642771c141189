//! State manager for checkpoint persistence
//!
//! This module provides the StateManager for loading and committing the
//! transformer checkpoint through a [`CheckpointStorage`] backend.

use crate::core::state::checkpoint::{Checkpoint, CheckpointBuilder};
use crate::core::state::storage::CheckpointStorage;
use crate::domain::ids::StreamName;
use crate::domain::Result;
use std::sync::Arc;

/// State manager for checkpoint persistence
pub struct StateManager {
    /// Checkpoint storage backend
    storage: Arc<dyn CheckpointStorage>,
}

impl StateManager {
    /// Create a new StateManager with a checkpoint storage backend
    pub fn new_with_storage(storage: Arc<dyn CheckpointStorage>) -> Self {
        Self { storage }
    }

    /// Load the checkpoint of a job
    ///
    /// # Returns
    ///
    /// Returns `Ok(Some(Checkpoint))` if found, `Ok(None)` if the job has
    /// never committed a window.
    pub async fn load_checkpoint(&self, job_name: &str) -> Result<Option<Checkpoint>> {
        self.storage.load_checkpoint(job_name).await
    }

    /// Load the checkpoint of a job, or create a fresh one in memory
    ///
    /// A fresh checkpoint has no shard positions; it is not persisted until
    /// the first window commits.
    pub async fn load_or_create(&self, job_name: &str, stream: &StreamName) -> Result<Checkpoint> {
        match self.load_checkpoint(job_name).await? {
            Some(checkpoint) => {
                tracing::info!(
                    job_name,
                    next_batch_id = checkpoint.next_batch_id,
                    shards = checkpoint.positions.len(),
                    status = ?checkpoint.last_status,
                    "Resuming from checkpoint"
                );
                Ok(checkpoint)
            }
            None => {
                tracing::info!(job_name, "No checkpoint found, starting fresh");
                Ok(CheckpointBuilder::new(job_name, stream.clone()).build())
            }
        }
    }

    /// Persist a committed window
    ///
    /// Called only after the window's output has been written, so a crash
    /// between the two replays the window onto the same output key.
    pub async fn checkpoint_batch(&self, checkpoint: &Checkpoint) -> Result<()> {
        tracing::info!(
            job_name = %checkpoint.job_name,
            next_batch_id = checkpoint.next_batch_id,
            records_processed = checkpoint.records_processed,
            "Checkpointing batch"
        );

        self.storage.save_checkpoint(checkpoint).await
    }

    /// Persist a failed window status; positions are left unchanged
    pub async fn record_failure(&self, checkpoint: &Checkpoint) -> Result<()> {
        tracing::warn!(
            job_name = %checkpoint.job_name,
            next_batch_id = checkpoint.next_batch_id,
            "Recording failed window"
        );

        self.storage.save_checkpoint(checkpoint).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::checkpoint::BatchStatus;
    use crate::core::state::storage::InMemoryCheckpointStorage;
    use crate::domain::ShardId;
    use std::collections::BTreeMap;

    fn manager() -> StateManager {
        StateManager::new_with_storage(Arc::new(InMemoryCheckpointStorage::new()))
    }

    #[tokio::test]
    async fn test_load_or_create_fresh() {
        let manager = manager();
        let stream = StreamName::new("health_data").unwrap();

        let checkpoint = manager.load_or_create("health_etl", &stream).await.unwrap();
        assert_eq!(checkpoint.last_status, BatchStatus::NotStarted);

        // A fresh checkpoint is not persisted
        assert!(manager.load_checkpoint("health_etl").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_checkpoint_batch_then_resume() {
        let manager = manager();
        let stream = StreamName::new("health_data").unwrap();

        let mut checkpoint = manager.load_or_create("health_etl", &stream).await.unwrap();
        checkpoint.mark_started();
        let mut positions = BTreeMap::new();
        positions.insert(ShardId::from_index(0), 7);
        checkpoint.commit(positions, 2, None);
        manager.checkpoint_batch(&checkpoint).await.unwrap();

        let resumed = manager.load_or_create("health_etl", &stream).await.unwrap();
        assert_eq!(resumed.position(&ShardId::from_index(0)), Some(7));
        assert_eq!(resumed.next_batch_id, 1);
    }
}
