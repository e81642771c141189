//! Processing-time partitions
//!
//! Output is partitioned by the wall-clock time at which a window is
//! processed, not by anything inside the records.

use chrono::{DateTime, Datelike, Timelike, Utc};
use std::fmt;

/// Source of processing time
pub trait Clock: Send + Sync {
    /// Current time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// `ingest_year=YYYY/ingest_month=MM/ingest_day=DD/ingest_hour=HH`
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use vitalstream::core::transform::PartitionPath;
///
/// let at = Utc.with_ymd_and_hms(2024, 1, 5, 3, 59, 0).unwrap();
/// assert_eq!(
///     PartitionPath::from_time(at).to_string(),
///     "ingest_year=2024/ingest_month=01/ingest_day=05/ingest_hour=03"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionPath {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
}

impl PartitionPath {
    /// Partition for a processing instant
    pub fn from_time(at: DateTime<Utc>) -> Self {
        Self {
            year: at.year(),
            month: at.month(),
            day: at.day(),
            hour: at.hour(),
        }
    }
}

impl fmt::Display for PartitionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ingest_year={:04}/ingest_month={:02}/ingest_day={:02}/ingest_hour={:02}",
            self.year, self.month, self.day, self.hour
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    #[test_case(2024, 1, 5, 3, "ingest_year=2024/ingest_month=01/ingest_day=05/ingest_hour=03" ; "single digits padded")]
    #[test_case(2024, 12, 31, 23, "ingest_year=2024/ingest_month=12/ingest_day=31/ingest_hour=23" ; "end of year")]
    #[test_case(2025, 6, 15, 0, "ingest_year=2025/ingest_month=06/ingest_day=15/ingest_hour=00" ; "midnight")]
    fn test_partition_path(year: i32, month: u32, day: u32, hour: u32, expected: &str) {
        let at = Utc.with_ymd_and_hms(year, month, day, hour, 30, 15).unwrap();
        assert_eq!(PartitionPath::from_time(at).to_string(), expected);
    }

    #[test]
    fn test_fixed_clock() {
        let at = Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap();
        assert_eq!(FixedClock(at).now(), at);
    }
}
