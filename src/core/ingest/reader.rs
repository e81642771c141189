//! Incremental reader of `Record` elements
//!
//! Pulls events from an async buffered source one at a time and yields a
//! [`HealthRecord`] for every `Record` start (or self-closing) tag. Only the
//! current event is ever held, so memory stays flat regardless of document
//! size. Child elements such as `MetadataEntry` are skipped.

use crate::domain::{HealthRecord, PipelineError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tokio::io::AsyncBufRead;

/// Element name that carries a health record
const RECORD_TAG: &[u8] = b"Record";

/// Streaming reader of health records from an XML export
pub struct RecordReader<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    records_read: u64,
}

impl<R: AsyncBufRead + Unpin> RecordReader<R> {
    /// Wrap an async buffered source
    pub fn new(source: R) -> Self {
        Self {
            reader: Reader::from_reader(source),
            buf: Vec::new(),
            records_read: 0,
        }
    }

    /// Read the next record in document order
    ///
    /// Returns `Ok(None)` at end of document.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Xml` if the document is not well formed or a
    /// `Record` element carries an unreadable attribute.
    pub async fn next_record(&mut self) -> Result<Option<HealthRecord>> {
        loop {
            self.buf.clear();
            let event = self
                .reader
                .read_event_into_async(&mut self.buf)
                .await
                .map_err(|e| {
                    PipelineError::Xml(format!(
                        "at byte {}: {e}",
                        self.reader.error_position()
                    ))
                })?;

            match event {
                Event::Start(ref element) | Event::Empty(ref element)
                    if element.name().as_ref() == RECORD_TAG =>
                {
                    let record = record_from_element(element)?;
                    self.records_read += 1;
                    return Ok(Some(record));
                }
                Event::Eof => return Ok(None),
                _ => {}
            }
        }
    }

    /// Records yielded so far
    pub fn records_read(&self) -> u64 {
        self.records_read
    }
}

/// Build a record from the attributes of one element
///
/// Attributes outside the wire schema are ignored.
fn record_from_element(element: &BytesStart<'_>) -> Result<HealthRecord> {
    let mut record = HealthRecord::default();
    for attribute in element.attributes() {
        let attribute = attribute?;
        let name = std::str::from_utf8(attribute.key.as_ref())
            .map_err(|e| PipelineError::Xml(format!("attribute name is not UTF-8: {e}")))?;
        let value = attribute.unescape_value()?;
        record.set_attribute(name, value.into_owned());
    }
    Ok(record)
}
