//! Integration tests for configuration loading and validation

use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;
use test_case::test_case;
use vitalstream::config::{load_config, StartingPosition};

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn cleanup_env_vars() {
    for name in [
        "VITALSTREAM_APPLICATION_LOG_LEVEL",
        "VITALSTREAM_APPLICATION_DRY_RUN",
        "VITALSTREAM_STREAM_SHARD_COUNT",
        "VITALSTREAM_INGEST_BATCH_SIZE_BYTES",
        "VITALSTREAM_TRANSFORM_OUTPUT_PATH",
        "VITALSTREAM_TRANSFORM_WINDOW_SECONDS",
        "TEST_OUTPUT_BUCKET",
    ] {
        std::env::remove_var(name);
    }
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(contents.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let temp_file = write_config(
        r#"
[application]
log_level = "debug"
dry_run = true

[storage]
root = "/var/lib/vitalstream/buckets"
raw_bucket = "raw-exports"

[stream]
name = "vitals"
root = "/var/lib/vitalstream/streams"
shard_count = 8

[ingest]
batch_size_bytes = 65536
invocation_timeout_secs = 300

[transform]
job_name = "vitals_etl"
region = "eu-west-1"
output_path = "s3://curated/vitals/"
window_seconds = 60
checkpoint_location = "state/vitals/"
starting_position = "latest"
max_records_per_batch = 500

[logging]
local_enabled = true
local_path = "/tmp/vitalstream"
local_rotation = "hourly"
"#,
    );

    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert_eq!(config.application.log_level, "debug");
    assert!(config.application.dry_run);
    assert_eq!(config.storage.raw_bucket, "raw-exports");
    assert_eq!(config.stream.name, "vitals");
    assert_eq!(config.stream.shard_count, 8);
    assert_eq!(config.ingest.batch_size_bytes, 65_536);
    assert_eq!(config.ingest.invocation_timeout_secs, 300);
    assert_eq!(config.transform.job_name, "vitals_etl");
    assert_eq!(config.transform.window_seconds, 60);
    assert_eq!(config.transform.starting_position, StartingPosition::Latest);
    assert_eq!(config.transform.max_records_per_batch, 500);
    assert_eq!(config.transform.checkpoint_path(), "state/vitals/");
    assert!(config.logging.local_enabled);
    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_load_minimal_config_with_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let temp_file = write_config("[transform]\noutput_path = \"processedhealthdata\"\n");
    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert_eq!(config.application.log_level, "info");
    assert!(!config.application.dry_run);
    assert_eq!(config.storage.raw_bucket, "rawhealthdata");
    assert_eq!(config.stream.name, "health_data");
    assert_eq!(config.stream.shard_count, 5);
    assert_eq!(config.ingest.batch_size_bytes, 20 * 15_024);
    assert_eq!(config.ingest.invocation_timeout_secs, 900);
    assert_eq!(config.transform.window_seconds, 100);
    assert_eq!(
        config.transform.starting_position,
        StartingPosition::TrimHorizon
    );
    assert_eq!(
        config.transform.checkpoint_path(),
        "processedhealthdata/temp/checkpoint/"
    );
    assert!(!config.logging.local_enabled);
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("TEST_OUTPUT_BUCKET", "curated");

    let temp_file = write_config(
        r#"
# output_path = "${NOT_SET_IN_COMMENTS}"
[transform]
output_path = "${TEST_OUTPUT_BUCKET}/health/"
"#,
    );
    let result = load_config(temp_file.path());
    cleanup_env_vars();

    let config = result.expect("Failed to load config");
    assert_eq!(config.transform.output_path, "curated/health/");
}

#[test]
fn test_missing_substitution_variable_fails() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let temp_file = write_config("[transform]\noutput_path = \"${TEST_OUTPUT_BUCKET}/\"\n");
    let err = load_config(temp_file.path()).unwrap_err();
    assert!(err.to_string().contains("TEST_OUTPUT_BUCKET"));
}

#[test]
fn test_env_overrides_take_precedence() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("VITALSTREAM_APPLICATION_LOG_LEVEL", "warn");
    std::env::set_var("VITALSTREAM_TRANSFORM_WINDOW_SECONDS", "30");
    std::env::set_var("VITALSTREAM_TRANSFORM_OUTPUT_PATH", "other/out/");

    let temp_file = write_config(
        "[application]\nlog_level = \"debug\"\n[transform]\noutput_path = \"processedhealthdata/\"\n",
    );
    let result = load_config(temp_file.path());
    cleanup_env_vars();

    let config = result.expect("Failed to load config");
    assert_eq!(config.application.log_level, "warn");
    assert_eq!(config.transform.window_seconds, 30);
    assert_eq!(config.transform.output_path, "other/out/");
}

#[test_case("[stream]\nshard_count = 0\n"; "zero shards")]
#[test_case("[stream]\nshard_count = 65\n"; "too many shards")]
#[test_case("[ingest]\nbatch_size_bytes = 0\n"; "zero threshold")]
#[test_case("[ingest]\nbatch_size_bytes = 2000000\n"; "threshold above payload limit")]
#[test_case("[ingest]\ninvocation_timeout_secs = 901\n"; "timeout above ceiling")]
#[test_case("[application]\nlog_level = \"verbose\"\n"; "bad log level")]
#[test_case("[logging]\nlocal_rotation = \"weekly\"\n"; "bad rotation")]
#[test_case("[stream]\nname = \"bad name\"\n"; "bad stream name")]
fn test_invalid_config_rejected(extra: &str) {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let temp_file = write_config(&format!(
        "[transform]\noutput_path = \"processedhealthdata/\"\n{extra}"
    ));
    assert!(load_config(temp_file.path()).is_err());
}

#[test_case("window_seconds = 0"; "zero window")]
#[test_case("job_name = \"bad job!\""; "bad job name")]
#[test_case("max_records_per_batch = 0"; "zero max records")]
fn test_invalid_transform_rejected(line: &str) {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let temp_file = write_config(&format!(
        "[transform]\noutput_path = \"processedhealthdata/\"\n{line}\n"
    ));
    assert!(load_config(temp_file.path()).is_err());
}

#[test]
fn test_missing_transform_section_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let temp_file = write_config("[stream]\nshard_count = 2\n");
    assert!(load_config(temp_file.path()).is_err());
}
