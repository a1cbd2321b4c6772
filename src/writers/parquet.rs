// src/writers/parquet.rs

//! Implements a [`ParquetWriter`]: Apache Parquet columnar output.
//!
//! Records buffer in memory and flush as one Arrow `RecordBatch` per row
//! group ([`ROW_GROUP_SZ_DEFAULT`] rows). Column types:
//!
//! ```text
//! timestamp:  UInt32
//! host:       Utf8
//! source:     Utf8
//! sourcetype: Utf8
//! message:    Utf8
//! ```
//!
//! Parquet is not streamable the way NDJSON is: the file footer is written
//! by [`finish`], and an unfinished file is unreadable. The driver treats a
//! `finish` failure as a commit failure.
//!
//! Only compiled with the `parquet` cargo feature.
//!
//! [`ParquetWriter`]: self::ParquetWriter
//! [`ROW_GROUP_SZ_DEFAULT`]: self::ROW_GROUP_SZ_DEFAULT
//! [`finish`]: crate::writers::RecordWriter#tymethod.finish

use std::io::{Error, ErrorKind, Result};
use std::sync::Arc;

use ::arrow_array::{
    ArrayRef,
    RecordBatch,
    StringArray,
    UInt32Array,
};
use ::arrow_schema::{
    ArrowError,
    DataType,
    Field,
    Schema,
    SchemaRef,
};
use ::parquet::arrow::ArrowWriter;
use ::parquet::errors::ParquetError;
use ::parquet::file::properties::WriterProperties;
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

/// Rows buffered per row group before a flush.
pub const ROW_GROUP_SZ_DEFAULT: usize = 10_000;

fn err_from_parquet(err: ParquetError) -> Error {
    Error::new(ErrorKind::Other, err)
}

fn err_from_arrow(err: ArrowError) -> Error {
    Error::new(ErrorKind::Other, err)
}

/// the five-column schema shared by every journal extraction
fn record_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("timestamp", DataType::UInt32, false),
        Field::new("host", DataType::Utf8, false),
        Field::new("source", DataType::Utf8, false),
        Field::new("sourcetype", DataType::Utf8, false),
        Field::new("message", DataType::Utf8, false),
    ]))
}

/// Buffers [`ExportRecord`]s and writes them as Parquet row groups.
pub struct ParquetWriter {
    /// `None` once `finish` has reclaimed the sink
    writer: Option<ArrowWriter<OutputSink>>,
    schema: SchemaRef,
    /// records awaiting the next row-group flush
    buffered: Vec<ExportRecord>,
    /// rows per row group
    row_group_sz: usize,
    /// `Count` of records accepted
    records_written: Count,
}

impl ParquetWriter {
    pub fn new(sink: OutputSink) -> Result<ParquetWriter> {
        Self::with_row_group_sz(sink, ROW_GROUP_SZ_DEFAULT)
    }

    pub fn with_row_group_sz(
        sink: OutputSink,
        row_group_sz: usize,
    ) -> Result<ParquetWriter> {
        defñ!("(row_group_sz={})", row_group_sz);
        debug_assert!(row_group_sz > 0, "row_group_sz must be nonzero");
        let schema: SchemaRef = record_schema();
        let properties: WriterProperties = WriterProperties::builder()
            .set_max_row_group_size(row_group_sz)
            .build();
        let writer: ArrowWriter<OutputSink> =
            match ArrowWriter::try_new(sink, schema.clone(), Some(properties)) {
                Ok(val) => val,
                Err(err) => return Err(err_from_parquet(err)),
            };

        Ok(ParquetWriter {
            writer: Some(writer),
            schema,
            buffered: Vec::with_capacity(row_group_sz),
            row_group_sz,
            records_written: 0,
        })
    }

    #[inline(always)]
    pub const fn count_records_written(&self) -> Count {
        self.records_written
    }

    /// drain the buffer into one `RecordBatch` and hand it to the
    /// `ArrowWriter`
    fn flush_row_group(&mut self) -> Result<()> {
        if self.buffered.is_empty() {
            return Ok(());
        }
        defñ!("flush {} rows", self.buffered.len());
        let timestamps: UInt32Array =
            UInt32Array::from_iter_values(self.buffered.iter().map(|record| record.timestamp));
        let hosts: StringArray =
            StringArray::from_iter_values(self.buffered.iter().map(|record| record.host.as_str()));
        let sources: StringArray =
            StringArray::from_iter_values(self.buffered.iter().map(|record| record.source.as_str()));
        let sourcetypes: StringArray = StringArray::from_iter_values(
            self.buffered.iter().map(|record| record.sourcetype.as_str()),
        );
        let messages: StringArray = StringArray::from_iter_values(
            self.buffered.iter().map(|record| record.message.as_str()),
        );
        let columns: Vec<ArrayRef> = vec![
            Arc::new(timestamps),
            Arc::new(hosts),
            Arc::new(sources),
            Arc::new(sourcetypes),
            Arc::new(messages),
        ];
        let batch: RecordBatch = match RecordBatch::try_new(self.schema.clone(), columns) {
            Ok(val) => val,
            Err(err) => return Err(err_from_arrow(err)),
        };
        let writer: &mut ArrowWriter<OutputSink> = match self.writer.as_mut() {
            Some(val) => val,
            None => {
                return Err(Error::new(ErrorKind::Other, "parquet writer already finished"));
            }
        };
        match writer.write(&batch) {
            Ok(_) => {}
            Err(err) => return Err(err_from_parquet(err)),
        }
        self.buffered.clear();

        Ok(())
    }
}

impl RecordWriter for ParquetWriter {
    fn write_record(
        &mut self,
        record: &ExportRecord,
    ) -> Result<()> {
        self.buffered.push(record.clone());
        self.records_written += 1;
        if self.buffered.len() >= self.row_group_sz {
            self.flush_row_group()?;
        }

        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        defñ!("records_written {}", self.records_written);
        self.flush_row_group()?;
        let writer: ArrowWriter<OutputSink> = match self.writer.take() {
            Some(val) => val,
            None => {
                return Err(Error::new(ErrorKind::Other, "parquet writer already finished"));
            }
        };
        // writes the file footer, then hands back the sink for the final
        // flush (which commits a compressing sink)
        let mut sink: OutputSink = match writer.into_inner() {
            Ok(val) => val,
            Err(err) => return Err(err_from_parquet(err)),
        };

        sink.flush()
    }
}
