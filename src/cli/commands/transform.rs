//! Transform command implementation
//!
//! This module implements the `transform` command, which runs the windowed
//! batch transformer until it is interrupted or a window fails.

use crate::adapters::factory::create_transformer;
use crate::config::load_config;
use crate::core::transform::TransformSummary;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the transform command
#[derive(Args, Debug)]
pub struct TransformArgs {
    /// Process a single window and exit
    #[arg(long)]
    pub once: bool,

    /// Dry run mode - map and hash without writing output or checkpoints
    #[arg(long)]
    pub dry_run: bool,
}

impl TransformArgs {
    /// Execute the transform command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting transform command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
            println!("🔍 DRY RUN MODE - No output or checkpoints will be written");
            println!();
        }

        let mut transformer = match create_transformer(&config).await {
            Ok(t) => t,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create transformer");
                eprintln!("Failed to initialize transformer: {e}");
                return Ok(4);
            }
        };

        if self.once {
            return match transformer.run_once().await {
                Ok(result) => {
                    match &result.output {
                        Some(output) => println!(
                            "✅ Batch {} wrote {} records to {output}",
                            result.batch_id, result.records_written
                        ),
                        None => println!("✅ Window was empty, nothing written"),
                    }
                    Ok(0)
                }
                Err(e) => {
                    eprintln!("Window failed: {e}");
                    Ok(1)
                }
            };
        }

        println!(
            "🚀 Transformer running every {}s (Ctrl+C to stop)...",
            config.transform.window_seconds
        );
        println!();

        let interrupted = shutdown_signal.clone();
        let summary = match transformer.run(shutdown_signal).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Transformer failed");
                eprintln!("Transformer failed: {e}");
                println!("   The checkpoint was not advanced past the failed window.");
                print_summary(transformer.summary());
                return Ok(1);
            }
        };

        print_summary(&summary);

        if *interrupted.borrow() {
            println!("⚠️  Transformer interrupted gracefully. Progress saved.");
            println!("   Run the same command to resume from checkpoint.");
            tracing::info!("Transformer interrupted by user signal");
            return Ok(130);
        }
        Ok(0)
    }
}

fn print_summary(summary: &TransformSummary) {
    println!();
    println!("📊 Transform Summary:");
    println!("  Windows Written: {}", summary.windows_processed);
    println!("  Empty Windows: {}", summary.empty_windows);
    println!("  Messages Consumed: {}", summary.messages_consumed);
    println!("  Records Written: {}", summary.records_written);
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();
}
