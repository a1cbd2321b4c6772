// src/writers/mod.rs

//! "Writers" for _ddsslib_: serialize extracted records to an output sink.
//!
//! A [`RecordWriter`] consumes [`ExportRecord`]s in arrival order and writes
//! bytes to whatever sink it was constructed over. Three formats:
//!
//! * [`NdjsonWriter`]: one JSON object per line
//! * [`CsvWriter`]: RFC 4180, single header row
//! * [`ParquetWriter`]: columnar row groups (cargo feature `parquet`)
//!
//! A writer buffers at its own discretion; [`finish`] flushes everything and
//! completes the file format (CSV and NDJSON need no trailer, Parquet does).
//! Dropping a writer without `finish` may leave the output incomplete.
//!
//! [`RecordWriter`]: self::RecordWriter
//! [`ExportRecord`]: self::ExportRecord
//! [`NdjsonWriter`]: crate::writers::ndjson::NdjsonWriter
//! [`CsvWriter`]: crate::writers::csv::CsvWriter
//! [`ParquetWriter`]: crate::writers::parquet::ParquetWriter
//! [`finish`]: self::RecordWriter#tymethod.finish

use std::fmt;
use std::io::{Result, Write};

use ::serde::Serialize;

use crate::common::IndexTime;
use crate::data::event::Event;

pub mod csv;
#[cfg(test)]
pub mod csv_tests;
pub mod ndjson;
#[cfg(feature = "parquet")]
pub mod parquet;

/// The byte sink a writer serializes into.
///
/// `Send` so sinks can back writers handed to worker threads (and because
/// the parquet writer requires it).
pub type OutputSink = Box<dyn Write + Send>;

/// One extracted record, ready for serialization.
///
/// Field declaration order is the serialization order:
/// `timestamp, host, source, sourcetype, message`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ExportRecord {
    pub timestamp: IndexTime,
    pub host: String,
    pub source: String,
    pub sourcetype: String,
    pub message: String,
}

impl ExportRecord {
    /// Join a decoded [`Event`] with its dictionary-resolved metadata.
    ///
    /// Metadata and message bytes are interpreted as UTF-8 with lossy
    /// replacement; the journal stores bytes, the output formats store text.
    pub fn from_event(
        event: &Event,
        host: &[u8],
        source: &[u8],
        sourcetype: &[u8],
    ) -> ExportRecord {
        ExportRecord {
            timestamp: event.index_time(),
            host: String::from_utf8_lossy(host).into_owned(),
            source: String::from_utf8_lossy(source).into_owned(),
            sourcetype: String::from_utf8_lossy(sourcetype).into_owned(),
            message: event.message_string().into_owned(),
        }
    }
}

/// Serialization format for extracted records.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ::clap::ValueEnum)]
pub enum OutputFormat {
    /// newline-delimited JSON, one object per event
    Ndjson,
    /// comma-separated values with a header row
    Csv,
    /// Apache Parquet columnar file
    Parquet,
}

impl fmt::Display for OutputFormat {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        match self {
            OutputFormat::Ndjson => write!(f, "ndjson"),
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Parquet => write!(f, "parquet"),
        }
    }
}

/// Sink for [`ExportRecord`]s; one implementation per [`OutputFormat`].
pub trait RecordWriter {
    /// Serialize one record. Records arrive in stream order.
    fn write_record(
        &mut self,
        record: &ExportRecord,
    ) -> Result<()>;

    /// Flush buffered records and complete the output format.
    /// Must be called exactly once, after the last `write_record`.
    fn finish(&mut self) -> Result<()>;
}

/// Construct the [`RecordWriter`] for `format` over `sink`.
///
/// `Err` of kind [`Unsupported`] when `format` names a writer this build
/// does not carry (see the `parquet` cargo feature).
///
/// [`Unsupported`]: std::io::ErrorKind#variant.Unsupported
pub fn new_record_writer(
    format: OutputFormat,
    sink: OutputSink,
) -> Result<Box<dyn RecordWriter>> {
    match format {
        OutputFormat::Ndjson => Ok(Box::new(ndjson::NdjsonWriter::new(sink))),
        OutputFormat::Csv => Ok(Box::new(csv::CsvWriter::new(sink))),
        #[cfg(feature = "parquet")]
        OutputFormat::Parquet => Ok(Box::new(parquet::ParquetWriter::new(sink)?)),
        #[cfg(not(feature = "parquet"))]
        OutputFormat::Parquet => Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "parquet output requires building with the `parquet` feature",
        )),
    }
}
