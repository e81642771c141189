//! Health record models
//!
//! [`HealthRecord`] is the wire entity carried on the stream: one per XML
//! `Record` element, every attribute kept as a string. [`TypedHealthRecord`]
//! is the pseudonymized, typed row written to the output store.

use serde::{Deserialize, Serialize};

/// Attribute names read from a `Record` element, in wire order
pub const RECORD_ATTRIBUTES: [&str; 8] = [
    "type",
    "sourceName",
    "sourceVersion",
    "device",
    "creationDate",
    "startDate",
    "endDate",
    "value",
];

/// A single health measurement as exported by the device
///
/// Attributes that are absent on the source element serialize as `null`.
///
/// # Examples
///
/// ```
/// use vitalstream::domain::HealthRecord;
///
/// let mut record = HealthRecord::default();
/// assert!(record.set_attribute("type", "HKQuantityTypeIdentifierHeartRate"));
/// assert!(record.set_attribute("value", "72"));
/// assert!(!record.set_attribute("unit", "count/min"));
///
/// let line = serde_json::to_string(&record).unwrap();
/// assert!(line.starts_with(r#"{"type":"HKQuantityTypeIdentifierHeartRate""#));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecord {
    /// Category of measurement
    #[serde(rename = "type")]
    pub record_type: Option<String>,

    /// Application that produced the record
    pub source_name: Option<String>,

    /// Version of the producing application
    pub source_version: Option<String>,

    /// Hardware that emitted the measurement (sensitive)
    pub device: Option<String>,

    /// When the record was written
    pub creation_date: Option<String>,

    /// Start of the measured interval
    pub start_date: Option<String>,

    /// End of the measured interval
    pub end_date: Option<String>,

    /// Measured value, still a string in transit
    pub value: Option<String>,
}

impl HealthRecord {
    /// Sets the field matching an XML attribute name
    ///
    /// Returns `false` when the attribute is not part of the wire schema.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) -> bool {
        let slot = match name {
            "type" => &mut self.record_type,
            "sourceName" => &mut self.source_name,
            "sourceVersion" => &mut self.source_version,
            "device" => &mut self.device,
            "creationDate" => &mut self.creation_date,
            "startDate" => &mut self.start_date,
            "endDate" => &mut self.end_date,
            "value" => &mut self.value,
            _ => return false,
        };
        *slot = Some(value.into());
        true
    }
}

/// Typed, pseudonymized record as stored in the output partitions
///
/// Absent fields are omitted from the JSON line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedHealthRecord {
    /// Category of measurement
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub record_type: Option<String>,

    /// When the record was written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,

    /// Measured value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,

    /// Hex SHA-256 digest of the device description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
}
