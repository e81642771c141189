//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{StartingPosition, VitalstreamConfig};
use crate::domain::errors::PipelineError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`VitalstreamConfig`]
/// 4. Applies environment variable overrides (`VITALSTREAM_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns `PipelineError::Configuration` if the file cannot be read or
/// parsed, a referenced variable is unset, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use vitalstream::config::loader::load_config;
///
/// let config = load_config("vitalstream.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<VitalstreamConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(PipelineError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        PipelineError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    load_config_from_str(&contents)
}

/// Loads configuration from TOML text
///
/// Same steps as [`load_config`] without the file read.
pub fn load_config_from_str(contents: &str) -> Result<VitalstreamConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: VitalstreamConfig = toml::from_str(&contents)
        .map_err(|e| PipelineError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        PipelineError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are copied unchanged. All missing variables are reported
/// together.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| PipelineError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(PipelineError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(val) => val.trim().parse().map(Some).map_err(|_| {
            PipelineError::Configuration(format!("Invalid value for {name}: '{val}'"))
        }),
        Err(_) => Ok(None),
    }
}

/// Applies environment variable overrides using the `VITALSTREAM_` prefix
///
/// Variables follow the pattern `VITALSTREAM_<SECTION>_<KEY>`, for example
/// `VITALSTREAM_STREAM_SHARD_COUNT` or `VITALSTREAM_TRANSFORM_OUTPUT_PATH`.
fn apply_env_overrides(config: &mut VitalstreamConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("VITALSTREAM_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = env_parse("VITALSTREAM_APPLICATION_DRY_RUN")? {
        config.application.dry_run = val;
    }

    // Storage overrides
    if let Ok(val) = std::env::var("VITALSTREAM_STORAGE_ROOT") {
        config.storage.root = val;
    }
    if let Ok(val) = std::env::var("VITALSTREAM_STORAGE_RAW_BUCKET") {
        config.storage.raw_bucket = val;
    }

    // Stream overrides
    if let Ok(val) = std::env::var("VITALSTREAM_STREAM_NAME") {
        config.stream.name = val;
    }
    if let Ok(val) = std::env::var("VITALSTREAM_STREAM_ROOT") {
        config.stream.root = val;
    }
    if let Some(val) = env_parse("VITALSTREAM_STREAM_SHARD_COUNT")? {
        config.stream.shard_count = val;
    }

    // Ingest overrides
    if let Some(val) = env_parse("VITALSTREAM_INGEST_BATCH_SIZE_BYTES")? {
        config.ingest.batch_size_bytes = val;
    }
    if let Some(val) = env_parse("VITALSTREAM_INGEST_INVOCATION_TIMEOUT_SECS")? {
        config.ingest.invocation_timeout_secs = val;
    }

    // Transform overrides
    if let Ok(val) = std::env::var("VITALSTREAM_TRANSFORM_JOB_NAME") {
        config.transform.job_name = val;
    }
    if let Ok(val) = std::env::var("VITALSTREAM_TRANSFORM_REGION") {
        config.transform.region = val;
    }
    if let Ok(val) = std::env::var("VITALSTREAM_TRANSFORM_OUTPUT_PATH") {
        config.transform.output_path = val;
    }
    if let Some(val) = env_parse("VITALSTREAM_TRANSFORM_WINDOW_SECONDS")? {
        config.transform.window_seconds = val;
    }
    if let Ok(val) = std::env::var("VITALSTREAM_TRANSFORM_CHECKPOINT_LOCATION") {
        config.transform.checkpoint_location = Some(val);
    }
    if let Ok(val) = std::env::var("VITALSTREAM_TRANSFORM_STARTING_POSITION") {
        config.transform.starting_position = match val.to_lowercase().as_str() {
            "trim_horizon" => StartingPosition::TrimHorizon,
            "latest" => StartingPosition::Latest,
            _ => {
                return Err(PipelineError::Configuration(format!(
                    "Invalid value for VITALSTREAM_TRANSFORM_STARTING_POSITION: '{val}'"
                )))
            }
        };
    }
    if let Some(val) = env_parse("VITALSTREAM_TRANSFORM_MAX_RECORDS_PER_BATCH")? {
        config.transform.max_records_per_batch = val;
    }

    // Logging overrides
    if let Some(val) = env_parse("VITALSTREAM_LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = val;
    }
    if let Ok(val) = std::env::var("VITALSTREAM_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("VITALSTREAM_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
