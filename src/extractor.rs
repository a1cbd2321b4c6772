// src/extractor.rs

//! The extraction driver: wires an input endpoint through the
//! compression-sniffing reader and the [`JournalReader`] into a
//! [`RecordWriter`] over an output endpoint.
//!
//! One call to [`extract`] is one complete extraction: open everything,
//! pull events until the journal ends, flush, commit, report the event
//! count. Any failure is fatal for the extraction (there is no partial
//! retry) and carries the count of events already written so the caller
//! knows how much output exists.
//!
//! Everything runs on the calling thread. Independent extractions may run
//! on separate threads, each with its own reader, dictionaries, and
//! endpoints.
//!
//! [`extract`]: self::extract
//! [`JournalReader`]: crate::readers::journalreader::JournalReader
//! [`RecordWriter`]: crate::writers::RecordWriter

use std::fmt;
use std::io::{Error, ErrorKind};
use std::sync::atomic::{AtomicBool, Ordering};

use ::chrono::{
    DateTime,
    Utc,
};
#[allow(unused_imports)]
use ::si_trace_print::{
    defn,
    defo,
    defx,
    defñ,
};

use crate::common::{
    Count,
    DecodeError,
    IndexTime,
};
use crate::debug_panic;
use crate::debug::printers::{
    e_dbg,
    e_inf,
    e_wrn,
};
use crate::endpoint::{
    open_input,
    open_output,
    EndpointPath,
    InputStream,
    OutputStream,
};
use crate::readers::compressreader::CompressReader;
use crate::readers::journalreader::{
    JournalReader,
    SummaryJournalReader,
};
use crate::writers::{
    new_record_writer,
    ExportRecord,
    OutputFormat,
    RecordWriter,
};

/// events between progress lines at debug verbosity
const PROGRESS_EVERY: Count = 10_000;

/// Why an extraction stopped short. Every variant that can occur after the
/// first event carries the count of events already written.
#[derive(Debug)]
pub enum ExtractError {
    /// an endpoint could not be opened (file missing, remote transport
    /// absent, sniff read failed)
    EndpointOpen {
        endpoint: String,
        error: Error,
    },
    /// the selected output format is not compiled into this build
    FormatUnavailable {
        format: OutputFormat,
    },
    /// the journal stream is corrupt or truncated
    Decode {
        error: DecodeError,
        events: Count,
    },
    /// the writer or its sink failed mid-stream
    Writer {
        error: Error,
        events: Count,
    },
    /// the final flush-and-commit failed; output is incomplete
    Commit {
        error: Error,
        events: Count,
    },
    /// the caller's cancellation flag was raised
    Cancelled {
        events: Count,
    },
}

impl ExtractError {
    /// Events written to the output before the failure.
    pub const fn events(&self) -> Count {
        match self {
            ExtractError::EndpointOpen { .. } => 0,
            ExtractError::FormatUnavailable { .. } => 0,
            ExtractError::Decode { events, .. } => *events,
            ExtractError::Writer { events, .. } => *events,
            ExtractError::Commit { events, .. } => *events,
            ExtractError::Cancelled { events } => *events,
        }
    }
}

impl fmt::Display for ExtractError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        match self {
            ExtractError::EndpointOpen { endpoint, error } => {
                write!(f, "cannot open {}: {}", endpoint, error)
            }
            ExtractError::FormatUnavailable { format } => {
                write!(f, "output format {} is not available in this build", format)
            }
            ExtractError::Decode { error, events } => {
                write!(f, "journal decode failed after {} events: {}", events, error)
            }
            ExtractError::Writer { error, events } => {
                write!(f, "writer failed after {} events: {}", events, error)
            }
            ExtractError::Commit { error, events } => {
                write!(f, "commit failed after {} events: {}", events, error)
            }
            ExtractError::Cancelled { events } => {
                write!(f, "cancelled after {} events", events)
            }
        }
    }
}

impl std::error::Error for ExtractError {}

pub type ExtractResult = std::result::Result<Count, ExtractError>;

/// Extract one journal: decode every event from `input` and serialize it to
/// `output` as `format`. Returns the event count.
pub fn extract(
    input: &EndpointPath,
    output: &EndpointPath,
    format: OutputFormat,
) -> ExtractResult {
    let cancel = AtomicBool::new(false);

    extract_cancellable(input, output, format, &cancel)
}

/// [`extract`] with a cancellation flag, tested between `scan` calls.
///
/// On cancellation the writer is flushed best-effort and
/// [`ExtractError::Cancelled`] reports the events already written.
pub fn extract_cancellable(
    input: &EndpointPath,
    output: &EndpointPath,
    format: OutputFormat,
    cancel: &AtomicBool,
) -> ExtractResult {
    defn!("({}, {}, {})", input, output, format);

    let input_stream: InputStream = match open_input(input) {
        Ok(val) => val,
        Err(err) => {
            defx!("open_input Error {:?}", err);
            return Err(ExtractError::EndpointOpen {
                endpoint: input.to_string(),
                error: err,
            });
        }
    };
    // the sniff reads the first bytes of the input, so a failure here is an
    // input problem, not a decode problem
    let compress_reader: CompressReader<InputStream> = match CompressReader::new(input_stream) {
        Ok(val) => val,
        Err(err) => {
            defx!("CompressReader::new Error {:?}", err);
            return Err(ExtractError::EndpointOpen {
                endpoint: input.to_string(),
                error: err,
            });
        }
    };
    e_dbg!("input {} compression {}", input, compress_reader.kind());
    let mut journal_reader: JournalReader<CompressReader<InputStream>> =
        JournalReader::new(compress_reader);

    let output_stream: OutputStream = match open_output(output) {
        Ok(val) => val,
        Err(err) => {
            defx!("open_output Error {:?}", err);
            return Err(ExtractError::EndpointOpen {
                endpoint: output.to_string(),
                error: err,
            });
        }
    };
    let mut writer: Box<dyn RecordWriter> = match new_record_writer(format, output_stream) {
        Ok(val) => val,
        Err(err) if err.kind() == ErrorKind::Unsupported => {
            defx!("format {} unavailable", format);
            return Err(ExtractError::FormatUnavailable { format });
        }
        Err(err) => {
            defx!("new_record_writer Error {:?}", err);
            return Err(ExtractError::Writer { error: err, events: 0 });
        }
    };

    let mut events: Count = 0;
    while journal_reader.scan() {
        if cancel.load(Ordering::Relaxed) {
            defx!("cancelled at {} events", events);
            finish_best_effort(writer.as_mut());
            return Err(ExtractError::Cancelled { events });
        }
        // resolve metadata before taking the event; the accessors read the
        // current event's indices
        let record: ExportRecord = match journal_reader.get_event() {
            Some(event) => ExportRecord::from_event(
                event,
                journal_reader.host(),
                journal_reader.source(),
                journal_reader.source_type(),
            ),
            None => {
                debug_panic!("scan() returned true without an event");
                break;
            }
        };
        match writer.write_record(&record) {
            Ok(_) => {}
            Err(err) => {
                defx!("write_record Error {:?}", err);
                return Err(ExtractError::Writer { error: err, events });
            }
        }
        events += 1;
        if events % PROGRESS_EVERY == 0 {
            e_dbg!("processed {} events at byte offset {}", events, journal_reader.position());
        }
    }

    if let Some(decode_error) = journal_reader.err() {
        let error: DecodeError = decode_error.clone();
        defx!("decode Error {}", error);
        // keep what was extracted; the partial output is caller-visible
        finish_best_effort(writer.as_mut());
        return Err(ExtractError::Decode { error, events });
    }

    match writer.finish() {
        Ok(_) => {}
        Err(err) => {
            defx!("finish Error {:?}", err);
            return Err(ExtractError::Commit { error: err, events });
        }
    }

    let summary: SummaryJournalReader = journal_reader.summary();
    e_dbg!("{:?}", summary);
    match (
        summary.journalreader_index_time_first,
        summary.journalreader_index_time_last,
    ) {
        (Some(first), Some(last)) => {
            e_inf!(
                "extracted {} events spanning {} to {} from {}",
                events,
                index_time_string(first),
                index_time_string(last),
                input,
            );
        }
        _ => {
            e_inf!("extracted {} events from {}", events, input);
        }
    }
    defx!("return Ok({})", events);

    Ok(events)
}

/// render an event `index_time` as UTC for diagnostics
fn index_time_string(index_time: IndexTime) -> String {
    match DateTime::<Utc>::from_timestamp(index_time as i64, 0) {
        Some(datetime) => datetime.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        None => index_time.to_string(),
    }
}

/// flush a writer on an already-failing path; its own error is secondary
fn finish_best_effort(writer: &mut dyn RecordWriter) {
    match writer.finish() {
        Ok(_) => {}
        Err(err) => {
            e_wrn!("flushing partial output also failed: {}", err);
        }
    }
}
