//! Status command implementation
//!
//! This module implements the `status` command for displaying the batch
//! transformer checkpoint.

use crate::adapters::factory::{create_object_store, create_state_manager};
use crate::config::load_config;
use crate::core::state::{BatchStatus, Checkpoint};
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Job name to inspect (defaults to transform.job_name)
    #[arg(long)]
    pub job_name: Option<String>,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking transformer status");

        println!("📊 Transformer Status");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let state_manager = match create_object_store(&config).await {
            Ok(store) => create_state_manager(&config, store).await,
            Err(e) => Err(e),
        };
        let state_manager = match state_manager {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Failed to open checkpoint storage");
                println!("   Error: {e}");
                return Ok(4);
            }
        };

        let job_name = self
            .job_name
            .as_deref()
            .unwrap_or(&config.transform.job_name);

        let checkpoint = match state_manager.load_checkpoint(job_name).await {
            Ok(Some(c)) => c,
            Ok(None) => {
                println!("No checkpoint found for job '{job_name}'.");
                println!("Run 'vitalstream transform' to start processing.");
                return Ok(0);
            }
            Err(e) => {
                println!("❌ Failed to load checkpoint");
                println!("   Error: {e}");
                return Ok(5);
            }
        };

        print_checkpoint(&checkpoint);
        Ok(0)
    }
}

fn status_label(status: BatchStatus) -> &'static str {
    match status {
        BatchStatus::Completed => "✅ Completed",
        BatchStatus::Processing => "🔄 Processing",
        BatchStatus::Failed => "❌ Failed",
        BatchStatus::NotStarted => "⏸️  Not Started",
    }
}

fn print_checkpoint(checkpoint: &Checkpoint) {
    let last_completed = checkpoint
        .last_batch_completed_at
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "Never".to_string());

    println!("  Job: {}", checkpoint.job_name);
    println!("  Stream: {}", checkpoint.stream_name);
    println!("  Last Status: {}", status_label(checkpoint.last_status));
    println!("  Next Batch Id: {}", checkpoint.next_batch_id);
    println!("  Batches Processed: {}", checkpoint.batches_processed);
    println!("  Records Processed: {}", checkpoint.records_processed);
    println!("  Last Completed: {last_completed}");
    if let Some(key) = &checkpoint.last_output_key {
        println!("  Last Output: {key}");
    }
    println!();

    println!("{:<20} {:>15}", "Shard", "Position");
    println!("{}", "-".repeat(36));
    for (shard, position) in &checkpoint.positions {
        println!("{:<20} {:>15}", shard.as_str(), position);
    }
    println!();
}
