// State management and checkpoint tracking

pub mod checkpoint;
pub mod manager;
pub mod storage;

pub use checkpoint::{BatchStatus, Checkpoint, CheckpointBuilder};
pub use manager::StateManager;
pub use storage::{CheckpointStorage, InMemoryCheckpointStorage, ObjectStoreCheckpointStorage};
