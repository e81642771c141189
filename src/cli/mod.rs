//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Vitalstream using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Vitalstream - health export ingestion and batch transformation
#[derive(Parser, Debug)]
#[command(name = "vitalstream")]
#[command(version, about, long_about = None)]
#[command(author = "Vitalstream Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "vitalstream.toml", env = "VITALSTREAM_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "VITALSTREAM_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream an uploaded export from the raw bucket onto the event stream
    Ingest(commands::ingest::IngestArgs),

    /// Upload a local export into the raw bucket
    Upload(commands::upload::UploadArgs),

    /// Run the windowed batch transformer
    Transform(commands::transform::TransformArgs),

    /// Show the transformer checkpoint
    Status(commands::status::StatusArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_ingest() {
        let cli = Cli::parse_from(["vitalstream", "ingest", "--key", "export.xml"]);
        assert_eq!(cli.config, "vitalstream.toml");
        match cli.command {
            Commands::Ingest(args) => assert_eq!(args.key.as_deref(), Some("export.xml")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_ingest_event_conflicts_with_key() {
        let result = Cli::try_parse_from([
            "vitalstream",
            "ingest",
            "--event",
            "event.json",
            "--key",
            "export.xml",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["vitalstream", "--config", "custom.toml", "transform"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["vitalstream", "--log-level", "debug", "status"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_transform_once() {
        let cli = Cli::parse_from(["vitalstream", "transform", "--once", "--dry-run"]);
        match cli.command {
            Commands::Transform(args) => {
                assert!(args.once);
                assert!(args.dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_upload() {
        let cli = Cli::parse_from(["vitalstream", "upload", "export.xml", "--trigger"]);
        match cli.command {
            Commands::Upload(args) => {
                assert_eq!(args.file.to_str(), Some("export.xml"));
                assert!(args.trigger);
                assert!(args.key.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["vitalstream", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["vitalstream", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
