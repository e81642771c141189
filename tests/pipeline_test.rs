//! End-to-end tests: upload, ingest, transform
//!
//! These tests drive both stages through the configuration-built adapters,
//! exactly as the CLI does, against a scratch directory.

use chrono::{TimeZone, Utc};
use std::sync::Arc;
use tempfile::TempDir;
use vitalstream::adapters::factory::{
    create_ingest_handler, create_object_store, create_state_manager, create_transformer,
};
use vitalstream::adapters::storage::{ObjectLocation, ObjectStore};
use vitalstream::config::VitalstreamConfig;
use vitalstream::core::transform::{hash_device, FixedClock};
use vitalstream::domain::{BucketName, TriggerEvent};

const EXPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE HealthData [
<!ELEMENT HealthData (ExportDate,Me,(Record|Workout)*)>
]>
<HealthData locale="en_US">
 <ExportDate value="2024-01-05 03:00:00 +0000"/>
 <Me HKCharacteristicTypeIdentifierDateOfBirth=""/>
 <Record type="HKQuantityTypeIdentifierBodyTemperature" sourceName="Thermo" device="&lt;&lt;HKDevice: 0x1&gt;, name:Thermometer&gt;" unit="degF" creationDate="2024-01-05 03:01:00 +0000" startDate="2024-01-05 03:01:00 +0000" endDate="2024-01-05 03:01:00 +0000" value="98.6"/>
 <Record type="HKQuantityTypeIdentifierHeartRate" sourceName="Watch" device="&lt;&lt;HKDevice: 0x2&gt;, name:Apple Watch&gt;" unit="count/min" creationDate="2024-01-05 03:02:00 +0000" startDate="2024-01-05 03:02:00 +0000" endDate="2024-01-05 03:02:00 +0000" value="72"/>
 <Workout workoutActivityType="HKWorkoutActivityTypeWalking" duration="30"/>
 <Record type="HKQuantityTypeIdentifierBloodPressureSystolic" sourceName="Cuff" creationDate="2024-01-05 03:03:00 +0000" value="120"/>
</HealthData>
"#;

fn config(dir: &TempDir) -> VitalstreamConfig {
    let root = dir.path().display();
    let config: VitalstreamConfig = toml::from_str(&format!(
        r#"
[storage]
root = "{root}/buckets"
raw_bucket = "rawhealthdata"

[stream]
name = "health_data"
root = "{root}/streams"
shard_count = 5

[transform]
job_name = "health_etl"
output_path = "processedhealthdata/"
"#
    ))
    .unwrap();
    config.validate().unwrap();
    config
}

async fn upload(config: &VitalstreamConfig, key: &str, body: &str) -> TriggerEvent {
    let store = create_object_store(config).await.unwrap();
    let bucket = BucketName::new(config.storage.raw_bucket.clone()).unwrap();
    let location = ObjectLocation::new(bucket.clone(), key).unwrap();
    store
        .put_object(&location, body.as_bytes().to_vec())
        .await
        .unwrap();
    TriggerEvent::for_object(&bucket, key)
}

fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 1, 5, 3, 15, 0).unwrap()))
}

#[tokio::test]
async fn test_export_flows_to_partitioned_output() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);

    let event = upload(&config, "export.xml", EXPORT).await;
    let summary = create_ingest_handler(&config)
        .await
        .unwrap()
        .handle(&event)
        .await
        .unwrap();
    assert_eq!(summary.records_parsed, 3);
    assert_eq!(summary.messages_published, 1);

    let mut transformer = create_transformer(&config).await.unwrap().with_clock(clock());
    let result = transformer.run_once().await.unwrap();
    assert_eq!(result.messages, 1);
    assert_eq!(result.records_written, 3);

    let output = result.output.unwrap();
    assert_eq!(output.bucket.as_str(), "processedhealthdata");
    assert!(output.key.starts_with(
        "health_metrics/ingest_year=2024/ingest_month=01/ingest_day=05/ingest_hour=03/"
    ));

    let store = create_object_store(&config).await.unwrap();
    let body = String::from_utf8(store.get_object_bytes(&output).await.unwrap().unwrap()).unwrap();
    let lines: Vec<serde_json::Value> = body
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 3);

    let values: Vec<f64> = lines.iter().map(|l| l["value"].as_f64().unwrap()).collect();
    assert_eq!(values, vec![98.6, 72.0, 120.0]);

    let device = lines[0]["device"].as_str().unwrap();
    assert_eq!(device.len(), 64);
    assert!(device.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    assert_eq!(device, hash_device("<<HKDevice: 0x1>, name:Thermometer>"));
    assert!(!body.contains("Apple Watch"));

    // The third record had no device: omitted, not null
    assert!(lines[2].get("device").is_none());
    assert_eq!(lines[2]["type"], "HKQuantityTypeIdentifierBloodPressureSystolic");
    assert_eq!(lines[2]["creationDate"], "2024-01-05 03:03:00 +0000");

    let checkpoint = create_state_manager(&config, store)
        .await
        .unwrap()
        .load_checkpoint("health_etl")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(checkpoint.records_processed, 3);
    assert_eq!(checkpoint.next_batch_id, 1);
}

#[tokio::test]
async fn test_second_upload_only_new_records() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let handler = create_ingest_handler(&config).await.unwrap();

    let event = upload(&config, "first.xml", EXPORT).await;
    handler.handle(&event).await.unwrap();
    create_transformer(&config)
        .await
        .unwrap()
        .with_clock(clock())
        .run_once()
        .await
        .unwrap();

    let second = r#"<HealthData><Record type="HKQuantityTypeIdentifierStepCount" value="1200"/></HealthData>"#;
    let event = upload(&config, "second.xml", second).await;
    handler.handle(&event).await.unwrap();

    let mut transformer = create_transformer(&config).await.unwrap().with_clock(clock());
    let result = transformer.run_once().await.unwrap();
    assert_eq!(result.batch_id, 1);
    assert_eq!(result.records_written, 1);
}

#[tokio::test]
async fn test_dry_run_leaves_no_trace() {
    let dir = TempDir::new().unwrap();
    let mut config = config(&dir);

    let event = upload(&config, "export.xml", EXPORT).await;
    config.application.dry_run = true;

    let summary = create_ingest_handler(&config)
        .await
        .unwrap()
        .handle(&event)
        .await
        .unwrap();
    assert!(summary.dry_run);
    assert_eq!(summary.records_parsed, 3);

    let result = create_transformer(&config)
        .await
        .unwrap()
        .run_once()
        .await
        .unwrap();
    assert!(result.output.is_none());

    let store = create_object_store(&config).await.unwrap();
    let processed = ObjectLocation::parse("processedhealthdata/").unwrap();
    assert!(store.list_objects(&processed).await.unwrap().is_empty());
}
