//! Storage notification trigger
//!
//! The ingestion handler is driven by an object-created notification. The
//! payload mirrors the shape object stores emit:
//!
//! ```json
//! {"Records": [{"s3": {"bucket": {"name": "rawhealthdata"}, "object": {"key": "export.xml"}}}]}
//! ```
//!
//! [`TriggerEvent::objects`] validates the payload and yields the objects to ingest.

use super::errors::PipelineError;
use super::ids::BucketName;
use super::Result;
use serde::{Deserialize, Serialize};

/// Raw notification payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerEvent {
    /// Notification records, one per created object
    #[serde(rename = "Records", default)]
    pub records: Vec<NotificationRecord>,
}

/// One entry of a notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    /// Event name, e.g. `ObjectCreated:Put`
    #[serde(rename = "eventName", default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,

    /// Storage section
    pub s3: StorageEntity,
}

/// Storage section of a notification record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageEntity {
    /// Bucket the object was written to
    pub bucket: BucketEntity,

    /// Object that was written
    pub object: ObjectEntity,
}

/// Bucket reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketEntity {
    /// Bucket name
    pub name: String,
}

/// Object reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectEntity {
    /// Object key
    pub key: String,

    /// Object size in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// A validated object reference taken from a trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    /// Bucket holding the object
    pub bucket: BucketName,

    /// Object key inside the bucket
    pub key: String,
}

impl TriggerEvent {
    /// Builds a single-object notification, as the upload path emits
    pub fn for_object(bucket: &BucketName, key: impl Into<String>) -> Self {
        Self {
            records: vec![NotificationRecord {
                event_name: Some("ObjectCreated:Put".to_string()),
                s3: StorageEntity {
                    bucket: BucketEntity {
                        name: bucket.as_str().to_string(),
                    },
                    object: ObjectEntity {
                        key: key.into(),
                        size: None,
                    },
                },
            }],
        }
    }

    /// Parses a notification from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| PipelineError::Validation(format!("Invalid trigger event: {e}")))
    }

    /// Validates the notification and returns the referenced objects in order
    ///
    /// # Errors
    ///
    /// Returns a validation error if the event carries no records, or if any
    /// record has an invalid bucket name or an empty key.
    pub fn objects(&self) -> Result<Vec<ObjectRef>> {
        if self.records.is_empty() {
            return Err(PipelineError::Validation(
                "Trigger event contains no records".to_string(),
            ));
        }

        self.records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let bucket = BucketName::new(record.s3.bucket.name.clone()).map_err(|e| {
                    PipelineError::Validation(format!("Trigger record {i}: {e}"))
                })?;
                let key = record.s3.object.key.trim();
                if key.is_empty() {
                    return Err(PipelineError::Validation(format!(
                        "Trigger record {i}: object key cannot be empty"
                    )));
                }
                Ok(ObjectRef {
                    bucket,
                    key: key.to_string(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_notification() {
        let json = r#"{
            "Records": [
                {
                    "eventName": "ObjectCreated:Put",
                    "s3": {
                        "bucket": {"name": "rawhealthdata"},
                        "object": {"key": "export.xml", "size": 1024}
                    }
                }
            ]
        }"#;

        let event = TriggerEvent::from_json(json).unwrap();
        let objects = event.objects().unwrap();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].bucket.as_str(), "rawhealthdata");
        assert_eq!(objects[0].key, "export.xml");
    }

    #[test]
    fn test_empty_records_rejected() {
        let event = TriggerEvent::from_json(r#"{"Records": []}"#).unwrap();
        assert!(event.objects().is_err());

        let event = TriggerEvent::from_json("{}").unwrap();
        assert!(event.objects().is_err());
    }

    #[test]
    fn test_blank_key_rejected() {
        let bucket = BucketName::new("rawhealthdata").unwrap();
        let event = TriggerEvent::for_object(&bucket, "   ");
        let err = event.objects().unwrap_err();
        assert!(err.to_string().contains("object key cannot be empty"));
    }

    #[test]
    fn test_invalid_bucket_rejected() {
        let json = r#"{"Records":[{"s3":{"bucket":{"name":"Raw_Data"},"object":{"key":"export.xml"}}}]}"#;
        let event = TriggerEvent::from_json(json).unwrap();
        assert!(matches!(
            event.objects(),
            Err(PipelineError::Validation(_))
        ));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(TriggerEvent::from_json("not json").is_err());
    }

    #[test]
    fn test_for_object_round_trip() {
        let bucket = BucketName::new("rawhealthdata").unwrap();
        let event = TriggerEvent::for_object(&bucket, "2024/export.xml");
        let json = serde_json::to_string(&event).unwrap();
        let parsed = TriggerEvent::from_json(&json).unwrap();
        assert_eq!(parsed.objects().unwrap()[0].key, "2024/export.xml");
    }
}
