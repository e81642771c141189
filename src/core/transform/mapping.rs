//! Typed column mapping
//!
//! Decodes stream payloads back into [`HealthRecord`]s and maps them onto the
//! typed output row. Any record that cannot be coerced fails the whole
//! micro-batch; there is no partial-row skip.

use crate::core::transform::hash::hash_device;
use crate::domain::{HealthRecord, PipelineError, Result, TypedHealthRecord};

/// Decode one stream message into its records
///
/// Blank lines are ignored; any other line must be a JSON object.
pub fn decode_message(data: &[u8]) -> Result<Vec<HealthRecord>> {
    let text = std::str::from_utf8(data)
        .map_err(|e| PipelineError::MalformedRecord(format!("message is not UTF-8: {e}")))?;

    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|e| {
                PipelineError::MalformedRecord(format!("line {}: invalid record JSON: {e}", i + 1))
            })
        })
        .collect()
}

/// Parse the in-transit string value into a double
///
/// Leading and trailing whitespace is ignored. `None`, an empty string and a
/// whitespace-only string all map to `None`.
///
/// # Errors
///
/// Returns `PipelineError::MalformedRecord` for text that is not a number or
/// that parses to NaN or infinity.
pub fn parse_value(value: Option<&str>) -> Result<Option<f64>> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let parsed: f64 = trimmed
        .parse()
        .map_err(|_| PipelineError::MalformedRecord(format!("value '{raw}' is not a number")))?;

    if !parsed.is_finite() {
        return Err(PipelineError::MalformedRecord(format!(
            "value '{raw}' is not a finite number"
        )));
    }
    Ok(Some(parsed))
}

/// Map a wire record onto the typed, pseudonymized output row
///
/// # Examples
///
/// ```
/// use vitalstream::core::transform::map_record;
/// use vitalstream::domain::HealthRecord;
///
/// let mut record = HealthRecord::default();
/// record.set_attribute("value", "72");
/// record.set_attribute("device", "Watch");
///
/// let typed = map_record(record).unwrap();
/// assert_eq!(typed.value, Some(72.0));
/// assert_eq!(typed.device.unwrap().len(), 64);
/// ```
pub fn map_record(record: HealthRecord) -> Result<TypedHealthRecord> {
    let value = parse_value(record.value.as_deref())?;

    Ok(TypedHealthRecord {
        record_type: record.record_type,
        creation_date: record.creation_date,
        value,
        device: record.device.as_deref().map(hash_device),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("98.6", 98.6 ; "decimal")]
    #[test_case("72", 72.0 ; "integer")]
    #[test_case(" 120 ", 120.0 ; "padded")]
    #[test_case("-3.5e2", -350.0 ; "exponent")]
    fn test_parse_value_numeric(raw: &str, expected: f64) {
        assert_eq!(parse_value(Some(raw)).unwrap(), Some(expected));
    }

    #[test_case("abc" ; "text")]
    #[test_case("NaN" ; "nan")]
    #[test_case("inf" ; "infinity")]
    #[test_case("1,5" ; "comma decimal")]
    fn test_parse_value_rejected(raw: &str) {
        let err = parse_value(Some(raw)).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedRecord(_)));
    }

    #[test]
    fn test_parse_value_absent() {
        assert_eq!(parse_value(None).unwrap(), None);
    }

    #[test_case("" ; "empty")]
    #[test_case("   " ; "spaces")]
    #[test_case("\t\n" ; "tab and newline")]
    fn test_parse_value_blank_is_absent(raw: &str) {
        assert_eq!(parse_value(Some(raw)).unwrap(), None);
    }

    #[test]
    fn test_map_record_blank_value_omitted() {
        let mut record = HealthRecord::default();
        record.set_attribute("type", "HKQuantityTypeIdentifierHeartRate");
        record.set_attribute("value", "  ");

        let typed = map_record(record).unwrap();
        assert_eq!(typed.value, None);
        let json = serde_json::to_string(&typed).unwrap();
        assert!(!json.contains("\"value\""));
    }

    #[test]
    fn test_map_record_drops_unmapped_fields() {
        let mut record = HealthRecord::default();
        record.set_attribute("type", "HKQuantityTypeIdentifierHeartRate");
        record.set_attribute("sourceName", "Watch");
        record.set_attribute("creationDate", "2024-01-05 03:00:00 +0000");
        record.set_attribute("value", "72");

        let typed = map_record(record).unwrap();
        let json = serde_json::to_string(&typed).unwrap();
        assert_eq!(
            json,
            r#"{"type":"HKQuantityTypeIdentifierHeartRate","creationDate":"2024-01-05 03:00:00 +0000","value":72.0}"#
        );
    }

    #[test]
    fn test_decode_message() {
        let data = b"{\"type\":\"a\",\"value\":\"1\"}\n\n{\"type\":\"b\",\"value\":null}\n";
        let records = decode_message(data).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].value.as_deref(), Some("1"));
        assert!(records[1].value.is_none());
    }

    #[test]
    fn test_decode_message_rejects_garbage() {
        let err = decode_message(b"{\"type\":\"a\"}\nnot json\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
