//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "vitalstream.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Vitalstream configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Validate configuration: vitalstream validate-config");
                println!("  3. Upload an export: vitalstream upload export.xml --trigger");
                println!("  4. Run the transformer: vitalstream transform");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Vitalstream Configuration File
# Health export ingestion and batch transformation

[application]
log_level = "info"
dry_run = false

[storage]
root = "./data/buckets"
raw_bucket = "rawhealthdata"

[stream]
name = "health_data"
root = "./data/streams"
shard_count = 5

[ingest]
batch_size_bytes = 300480
invocation_timeout_secs = 900

[transform]
job_name = "health_etl"
region = "local"
output_path = "processedhealthdata/"
window_seconds = 100
starting_position = "trim_horizon"
max_records_per_batch = 10000

[logging]
local_enabled = false
local_path = "./logs"
local_rotation = "daily"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# Vitalstream Configuration File
# Health export ingestion and batch transformation
#
# Every value can be overridden with an environment variable named
# VITALSTREAM_<SECTION>_<KEY>, e.g. VITALSTREAM_STREAM_SHARD_COUNT=8.
# Values may also reference variables with ${VAR_NAME}.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# Dry run mode (parse and map without publishing, writing or checkpointing)
dry_run = false

# ============================================================================
# Object Storage
# ============================================================================
[storage]
# Directory holding one sub-directory per bucket
root = "./data/buckets"

# Bucket that receives uploaded exports
raw_bucket = "rawhealthdata"

# ============================================================================
# Event Stream
# ============================================================================
[stream]
# Stream name
name = "health_data"

# Directory holding one sub-directory of shard logs per stream
root = "./data/streams"

# Number of shards (1-64)
shard_count = 5

# ============================================================================
# Ingestion
# ============================================================================
[ingest]
# Flush threshold in bytes; a message is published once the buffer
# reaches this size (max 1048576)
batch_size_bytes = 300480

# Wall-clock ceiling for one trigger, in seconds (1-900)
invocation_timeout_secs = 900

# ============================================================================
# Batch Transformer
# ============================================================================
[transform]
# Job name; also names the checkpoint object
job_name = "health_etl"

# Region label attached to logs
region = "local"

# Output location: <bucket>/<prefix>
output_path = "processedhealthdata/"

# Window length in seconds
window_seconds = 100

# Where to start when no checkpoint exists: trim_horizon | latest
starting_position = "trim_horizon"

# Upper bound on stream records read per window
max_records_per_batch = 10000

# Checkpoint location (defaults to <output_path>temp/checkpoint/)
# checkpoint_location = "processedhealthdata/temp/checkpoint/"

# ============================================================================
# Logging Configuration
# ============================================================================
[logging]
# Enable local JSON file logging
local_enabled = false

# Local log directory
local_path = "./logs"

# Log rotation (daily or hourly)
local_rotation = "daily"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VitalstreamConfig;
    use tempfile::TempDir;

    #[test]
    fn test_init_args_defaults() {
        let args = InitArgs {
            output: "vitalstream.toml".to_string(),
            with_examples: false,
            force: false,
        };

        assert_eq!(args.output, "vitalstream.toml");
        assert!(!args.with_examples);
        assert!(!args.force);
    }

    #[test]
    fn test_generated_configs_are_valid() {
        for content in [
            InitArgs::generate_minimal_config(),
            InitArgs::generate_config_with_examples(),
        ] {
            let config: VitalstreamConfig = toml::from_str(&content).unwrap();
            config.validate().unwrap();
            assert_eq!(config.transform.output_path, "processedhealthdata/");
        }
    }

    #[tokio::test]
    async fn test_refuses_to_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("vitalstream.toml");
        fs::write(&output, "existing").unwrap();

        let args = InitArgs {
            output: output.to_string_lossy().into_owned(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 2);
        assert_eq!(fs::read_to_string(&output).unwrap(), "existing");

        let args = InitArgs { force: true, ..args };
        assert_eq!(args.execute().await.unwrap(), 0);
        assert!(fs::read_to_string(&output).unwrap().contains("[transform]"));
    }
}
