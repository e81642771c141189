//! Object storage adapters

pub mod local;
pub mod traits;

pub use local::LocalObjectStore;
pub use traits::{ObjectLocation, ObjectReader, ObjectStore};
