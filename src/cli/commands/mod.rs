//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod ingest;
pub mod init;
pub mod status;
pub mod transform;
pub mod upload;
pub mod validate;
