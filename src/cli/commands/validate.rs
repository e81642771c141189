//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Vitalstream configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates before returning
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  Storage Root: {}", config.storage.root);
        println!("  Raw Bucket: {}", config.storage.raw_bucket);
        println!("  Stream: {}", config.stream.name);
        println!("  Shards: {}", config.stream.shard_count);
        println!("  Flush Threshold: {} bytes", config.ingest.batch_size_bytes);
        println!("  Job Name: {}", config.transform.job_name);
        println!("  Output Path: {}", config.transform.output_path);
        println!("  Checkpoint Path: {}", config.transform.checkpoint_path());
        println!("  Window: {}s", config.transform.window_seconds);
        println!(
            "  Starting Position: {:?}",
            config.transform.starting_position
        );
        println!();
        Ok(0)
    }
}
