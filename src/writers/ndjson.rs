// src/writers/ndjson.rs

//! Implements a [`NdjsonWriter`]: newline-delimited JSON, one complete
//! object per event, UTF-8, key order
//! `timestamp, host, source, sourcetype, message`.
//!
//! NDJSON is the default output format. It streams (nothing is buffered
//! beyond the sink's own buffering) and downstream tooling can consume it
//! line by line.
//!
//! [`NdjsonWriter`]: self::NdjsonWriter

use std::io::{Error, ErrorKind, Result, Write};

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

/// Writes each [`ExportRecord`] as one JSON line.
pub struct NdjsonWriter {
    sink: OutputSink,
    /// `Count` of records written
    records_written: Count,
}

impl NdjsonWriter {
    pub fn new(sink: OutputSink) -> NdjsonWriter {
        NdjsonWriter {
            sink,
            records_written: 0,
        }
    }

    #[inline(always)]
    pub const fn count_records_written(&self) -> Count {
        self.records_written
    }
}

impl RecordWriter for NdjsonWriter {
    fn write_record(
        &mut self,
        record: &ExportRecord,
    ) -> Result<()> {
        match ::serde_json::to_writer(&mut self.sink, record) {
            Ok(_) => {}
            Err(err) => {
                defñ!("serde_json::to_writer Error {:?}", err);
                return Err(Error::new(ErrorKind::Other, err));
            }
        }
        self.sink.write_all(b"\n")?;
        self.records_written += 1;

        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        defñ!("records_written {}", self.records_written);

        self.sink.flush()
    }
}
