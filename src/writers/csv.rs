// src/writers/csv.rs

//! Implements a [`CsvWriter`]: RFC 4180 comma-separated values with a single
//! header row.
//!
//! Quoting: a field is quoted only when it contains a comma, a double quote,
//! or a line break; embedded double quotes are doubled. Rows end with LF.
//! A multi-line event message therefore stays one logical CSV record.
//!
//! [`CsvWriter`]: self::CsvWriter

use std::io::{Result, Write};

#[allow(unused_imports)]
use ::si_trace_print::{
    defn,
    defo,
    defx,
    defñ,
};

use crate::common::Count;
use crate::writers::{
    ExportRecord,
    OutputSink,
    RecordWriter,
};

/// the header row, matching [`ExportRecord`] field order
pub const CSV_HEADER: &str = "timestamp,host,source,sourcetype,message\n";

/// Writes each [`ExportRecord`] as one CSV row.
pub struct CsvWriter {
    sink: OutputSink,
    /// header not yet written; written lazily by the first record (or by
    /// `finish` for an empty extraction)
    header_pending: bool,
    /// `Count` of records written, header excluded
    records_written: Count,
}

impl CsvWriter {
    pub fn new(sink: OutputSink) -> CsvWriter {
        CsvWriter {
            sink,
            header_pending: true,
            records_written: 0,
        }
    }

    #[inline(always)]
    pub const fn count_records_written(&self) -> Count {
        self.records_written
    }

    fn write_header_once(&mut self) -> Result<()> {
        if self.header_pending {
            self.sink.write_all(CSV_HEADER.as_bytes())?;
            self.header_pending = false;
        }

        Ok(())
    }
}

impl RecordWriter for CsvWriter {
    fn write_record(
        &mut self,
        record: &ExportRecord,
    ) -> Result<()> {
        self.write_header_once()?;
        let mut row: String = String::with_capacity(64 + record.message.len());
        row.push_str(record.timestamp.to_string().as_str());
        for field in [
            record.host.as_str(),
            record.source.as_str(),
            record.sourcetype.as_str(),
            record.message.as_str(),
        ] {
            row.push(',');
            push_field_escaped(&mut row, field);
        }
        row.push('\n');
        self.sink.write_all(row.as_bytes())?;
        self.records_written += 1;

        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        defñ!("records_written {}", self.records_written);
        // an extraction of zero events still produces the header
        self.write_header_once()?;

        self.sink.flush()
    }
}

/// Append `field` to `row`, quoting per RFC 4180 when `field` contains a
/// comma, double quote, CR, or LF.
pub fn push_field_escaped(
    row: &mut String,
    field: &str,
) {
    if !field.contains(['"', ',', '\n', '\r']) {
        row.push_str(field);
        return;
    }
    row.push('"');
    for c in field.chars() {
        if c == '"' {
            row.push('"');
        }
        row.push(c);
    }
    row.push('"');
}
