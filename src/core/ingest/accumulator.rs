//! Byte-bounded accumulation buffer
//!
//! Records are appended as JSON lines until the buffer reaches the flush
//! threshold; the caller then takes the buffer and publishes it as one
//! stream message. A buffer never grows past the stream's payload ceiling:
//! a line that would overflow it closes the current buffer first.

use crate::adapters::stream::MAX_RECORD_PAYLOAD_BYTES;
use crate::domain::{HealthRecord, Result};

/// Accumulates newline-delimited JSON records up to a byte threshold
///
/// # Examples
///
/// ```
/// use vitalstream::core::ingest::RecordAccumulator;
/// use vitalstream::domain::HealthRecord;
///
/// let mut acc = RecordAccumulator::new(16);
/// assert!(acc.push(&HealthRecord::default()).unwrap().is_none());
/// assert!(acc.is_full());
///
/// let payload = acc.take().unwrap();
/// assert!(payload.data.ends_with('\n'));
/// assert_eq!(payload.records, 1);
/// assert!(acc.is_empty());
/// ```
#[derive(Debug)]
pub struct RecordAccumulator {
    buffer: String,
    threshold: usize,
    ceiling: usize,
    records: usize,
    peak_bytes: usize,
}

/// A buffered payload ready to publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// Newline-terminated JSON lines
    pub data: String,
    /// Number of lines in `data`
    pub records: usize,
}

impl RecordAccumulator {
    /// Create an accumulator that asks for a flush at `threshold` bytes
    ///
    /// The threshold is clamped to the stream payload ceiling.
    pub fn new(threshold: usize) -> Self {
        Self::with_ceiling(threshold, MAX_RECORD_PAYLOAD_BYTES)
    }

    /// Create an accumulator with an explicit payload ceiling
    pub fn with_ceiling(threshold: usize, ceiling: usize) -> Self {
        let ceiling = ceiling.max(1);
        Self {
            buffer: String::new(),
            threshold: threshold.clamp(1, ceiling),
            ceiling,
            records: 0,
            peak_bytes: 0,
        }
    }

    /// Append one record as a JSON line
    ///
    /// If the line would take a non-empty buffer past the payload ceiling,
    /// the buffered lines are taken first and returned for publishing; the
    /// new line then starts the next buffer. Check [`is_full`](Self::is_full)
    /// afterwards to decide whether to flush.
    pub fn push(&mut self, record: &HealthRecord) -> Result<Option<Payload>> {
        let line = serde_json::to_string(record)?;
        let overflow =
            if !self.buffer.is_empty() && self.buffer.len() + line.len() + 1 > self.ceiling {
                self.take()
            } else {
                None
            };

        self.buffer.push_str(&line);
        self.buffer.push('\n');
        self.records += 1;
        self.peak_bytes = self.peak_bytes.max(self.buffer.len());
        Ok(overflow)
    }

    /// Whether the buffer has reached the flush threshold
    pub fn is_full(&self) -> bool {
        self.buffer.len() >= self.threshold
    }

    /// Whether nothing is buffered
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Buffered size in bytes
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Records currently buffered
    pub fn records(&self) -> usize {
        self.records
    }

    /// Largest buffered size seen so far
    pub fn peak_bytes(&self) -> usize {
        self.peak_bytes
    }

    /// Take the buffered payload and reset, `None` if empty
    pub fn take(&mut self) -> Option<Payload> {
        if self.buffer.is_empty() {
            return None;
        }
        let capacity = self.buffer.capacity();
        let data = std::mem::replace(&mut self.buffer, String::with_capacity(capacity));
        Some(Payload {
            data,
            records: std::mem::take(&mut self.records),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(value: &str) -> HealthRecord {
        let mut record = HealthRecord::default();
        record.set_attribute("type", "HKQuantityTypeIdentifierHeartRate");
        record.set_attribute("value", value);
        record
    }

    #[test]
    fn test_push_signals_flush_at_threshold() {
        let line_len = serde_json::to_string(&record("72")).unwrap().len() + 1;
        let mut acc = RecordAccumulator::new(line_len * 2);

        assert!(acc.push(&record("72")).unwrap().is_none());
        assert!(!acc.is_full());
        assert!(acc.push(&record("72")).unwrap().is_none());
        assert!(acc.is_full());
        assert_eq!(acc.len(), line_len * 2);
        assert_eq!(acc.records(), 2);
    }

    #[test]
    fn test_take_resets_buffer() {
        let mut acc = RecordAccumulator::new(1024);
        acc.push(&record("98.6")).unwrap();
        acc.push(&record("72")).unwrap();

        let payload = acc.take().unwrap();
        assert_eq!(payload.records, 2);
        let lines: Vec<_> = payload.data.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"value\":\"98.6\""));
        assert!(lines[1].contains("\"value\":\"72\""));

        assert!(acc.is_empty());
        assert_eq!(acc.records(), 0);
        assert!(acc.take().is_none());
    }

    #[test]
    fn test_peak_bytes_survives_take() {
        let mut acc = RecordAccumulator::new(1);
        acc.push(&record("120")).unwrap();
        let peak = acc.peak_bytes();
        acc.take();

        assert_eq!(acc.peak_bytes(), peak);
        assert!(peak > 0);
    }

    #[test]
    fn test_absent_attributes_serialize_as_null() {
        let mut acc = RecordAccumulator::new(1024);
        acc.push(&HealthRecord::default()).unwrap();
        let payload = acc.take().unwrap();
        assert!(payload.data.contains("\"device\":null"));
    }

    #[test]
    fn test_line_past_ceiling_closes_buffer_first() {
        let line_len = serde_json::to_string(&record("72")).unwrap().len() + 1;
        let ceiling = line_len * 2 + line_len / 2;
        let mut acc = RecordAccumulator::with_ceiling(ceiling, ceiling);

        assert!(acc.push(&record("72")).unwrap().is_none());
        assert!(acc.push(&record("72")).unwrap().is_none());
        assert!(!acc.is_full());

        let overflow = acc.push(&record("72")).unwrap().unwrap();
        assert_eq!(overflow.records, 2);
        assert_eq!(overflow.data.len(), line_len * 2);
        assert_eq!(acc.records(), 1);
        assert_eq!(acc.len(), line_len);
        assert!(acc.peak_bytes() <= ceiling);
    }

    #[test]
    fn test_threshold_clamped_to_ceiling() {
        let mut acc = RecordAccumulator::with_ceiling(usize::MAX, 64);
        acc.push(&record("72")).unwrap();
        assert!(acc.is_full());
    }
}
