// src/writers/csv_tests.rs

//! tests for `csv.rs`

#![allow(non_snake_case)]

use ::test_case::test_case;

use crate::writers::csv::{
    push_field_escaped,
    CsvWriter,
    CSV_HEADER,
};
use crate::writers::ndjson_tests::{
    record,
    SharedSink,
};
use crate::writers::{
    OutputSink,
    RecordWriter,
};

fn written(sink: &SharedSink) -> String {
    String::from_utf8(sink.0.lock().unwrap().clone()).unwrap()
}

#[test_case("plain", "plain"; "no quoting needed")]
#[test_case("has,comma", "\"has,comma\""; "comma")]
#[test_case("has \"quote\"", "\"has \"\"quote\"\"\""; "quotes doubled")]
#[test_case("line1\nline2", "\"line1\nline2\""; "embedded LF")]
#[test_case("cr\rhere", "\"cr\rhere\""; "embedded CR")]
#[test_case("", ""; "empty")]
fn test_push_field_escaped(
    field: &str,
    expect: &str,
) {
    let mut row = String::new();
    push_field_escaped(&mut row, field);
    assert_eq!(row, expect);
}

#[test]
fn test_CsvWriter_header_and_rows() {
    let sink = SharedSink::default();
    let mut writer = CsvWriter::new(Box::new(sink.clone()) as OutputSink);
    writer
        .write_record(&record(100, "host001", "/var/log/syslog", "syslog", "hello"))
        .unwrap();
    writer
        .write_record(&record(200, "host002", "/var/log/auth.log", "linux_secure", "bye"))
        .unwrap();
    writer.finish().unwrap();
    let out = written(&sink);
    let mut lines = out.lines();
    assert_eq!(lines.next().unwrap(), CSV_HEADER.trim_end());
    assert_eq!(lines.next().unwrap(), "100,host001,/var/log/syslog,syslog,hello");
    assert_eq!(lines.next().unwrap(), "200,host002,/var/log/auth.log,linux_secure,bye");
    assert!(lines.next().is_none());
    assert_eq!(writer.count_records_written(), 2);
}

#[test]
fn test_CsvWriter_quotes_message_with_specials() {
    let sink = SharedSink::default();
    let mut writer = CsvWriter::new(Box::new(sink.clone()) as OutputSink);
    writer
        .write_record(&record(1, "h", "s", "st", "say \"hi\", world"))
        .unwrap();
    writer.finish().unwrap();
    let out = written(&sink);
    assert!(out.ends_with("1,h,s,st,\"say \"\"hi\"\", world\"\n"));
}

#[test]
fn test_CsvWriter_multiline_message_is_one_record() {
    let sink = SharedSink::default();
    let mut writer = CsvWriter::new(Box::new(sink.clone()) as OutputSink);
    writer
        .write_record(&record(1, "h", "s", "st", "first\nsecond"))
        .unwrap();
    writer.finish().unwrap();
    let out = written(&sink);
    // header row + one quoted record spanning two physical lines
    assert_eq!(out.matches('\n').count(), 3);
    assert!(out.contains("\"first\nsecond\""));
}

#[test]
fn test_CsvWriter_empty_extraction_still_has_header() {
    let sink = SharedSink::default();
    let mut writer = CsvWriter::new(Box::new(sink.clone()) as OutputSink);
    writer.finish().unwrap();
    assert_eq!(written(&sink), CSV_HEADER);
}
