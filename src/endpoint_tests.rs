// src/endpoint_tests.rs

//! tests for `endpoint.rs`

#![allow(non_snake_case)]

use std::io::{Read, Write};

use ::tempfile::TempDir;
use ::test_case::test_case;

use crate::common::Bytes;
use crate::endpoint::{
    open_input,
    open_output,
    EndpointPath,
    ObjectUri,
};
use crate::readers::helpers::path_to_fpath;

#[test]
fn test_ObjectUri_parse() {
    let uri = ObjectUri::parse("s3://my-bucket/path/to/journal.zst").unwrap();
    assert_eq!(uri.scheme, "s3");
    assert_eq!(uri.bucket, "my-bucket");
    assert_eq!(uri.key, "path/to/journal.zst");
    assert_eq!(uri.to_string(), "s3://my-bucket/path/to/journal.zst");
}

#[test_case("s3://bucket-only"; "no key")]
#[test_case("s3://"; "no bucket")]
#[test_case("s3:///key"; "empty bucket")]
#[test_case("://bucket/key"; "empty scheme")]
#[test_case("plain/path"; "not a uri")]
fn test_ObjectUri_parse_rejects(uri: &str) {
    assert!(ObjectUri::parse(uri).is_err());
}

#[test]
fn test_EndpointPath_from_arg() {
    assert_eq!(EndpointPath::from_arg(None).unwrap(), EndpointPath::Stdio);
    assert_eq!(
        EndpointPath::from_arg(Some("/tmp/journal")).unwrap(),
        EndpointPath::Local(String::from("/tmp/journal")),
    );
    match EndpointPath::from_arg(Some("s3://bucket/key")).unwrap() {
        EndpointPath::Remote(uri) => assert_eq!(uri.bucket, "bucket"),
        other => panic!("expected Remote, got {:?}", other),
    }
    assert!(EndpointPath::from_arg(Some("s3://bad")).is_err());
}

#[test_case(None, false; "stdio never gzips")]
#[test_case(Some("out.json"), false; "plain json")]
#[test_case(Some("out.json.gz"), true; "gz suffix")]
#[test_case(Some("OUT.JSON.GZ"), true; "gz suffix uppercase")]
#[test_case(Some("s3://bucket/key.gz"), true; "remote gz key")]
fn test_EndpointPath_wants_gzip(
    arg: Option<&str>,
    expect: bool,
) {
    assert_eq!(EndpointPath::from_arg(arg).unwrap().wants_gzip(), expect);
}

#[test]
fn test_open_input_local_file() {
    let tempdir = TempDir::new().unwrap();
    let path = tempdir.path().join("journal");
    std::fs::write(&path, b"raw bytes").unwrap();
    let endpoint = EndpointPath::Local(path_to_fpath(&path));
    let mut stream = open_input(&endpoint).unwrap();
    let mut out = Bytes::new();
    stream.read_to_end(&mut out).unwrap();
    assert_eq!(out, b"raw bytes");
}

#[test]
fn test_open_input_missing_file() {
    let endpoint = EndpointPath::Local(String::from("/nonexistent/journal"));
    assert!(open_input(&endpoint).is_err());
}

#[test_case("journal.zst"; "zst name wins")]
#[test_case("journal.gz"; "gz name")]
#[test_case("journal"; "bare name")]
fn test_open_input_thawed_bucket_directory(name: &str) {
    let tempdir = TempDir::new().unwrap();
    let rawdata = tempdir.path().join("rawdata");
    std::fs::create_dir(&rawdata).unwrap();
    std::fs::write(rawdata.join(name), b"journal contents").unwrap();
    let endpoint = EndpointPath::Local(path_to_fpath(tempdir.path()));
    let mut stream = open_input(&endpoint).unwrap();
    let mut out = Bytes::new();
    stream.read_to_end(&mut out).unwrap();
    assert_eq!(out, b"journal contents");
}

#[test]
fn test_open_input_directory_without_journal() {
    let tempdir = TempDir::new().unwrap();
    let endpoint = EndpointPath::Local(path_to_fpath(tempdir.path()));
    // no rawdata/journal*; opening the directory itself fails
    assert!(open_input(&endpoint).is_err());
}

#[test]
fn test_open_input_remote_unsupported() {
    let endpoint = EndpointPath::from_arg(Some("s3://bucket/key")).unwrap();
    let err = match open_input(&endpoint) {
        Err(err) => err,
        Ok(_) => panic!("expected error"),
    };
    assert_eq!(err.kind(), std::io::ErrorKind::Unsupported);
}

#[test]
fn test_open_output_creates_parent_dirs() {
    let tempdir = TempDir::new().unwrap();
    let path = tempdir.path().join("a").join("b").join("out.json");
    let endpoint = EndpointPath::Local(path_to_fpath(&path));
    let mut sink = open_output(&endpoint).unwrap();
    sink.write_all(b"content").unwrap();
    sink.flush().unwrap();
    drop(sink);
    assert_eq!(std::fs::read(&path).unwrap(), b"content");
}

#[test]
fn test_open_output_gz_wraps_and_commits_on_flush() {
    let tempdir = TempDir::new().unwrap();
    let path = tempdir.path().join("out.json.gz");
    let endpoint = EndpointPath::Local(path_to_fpath(&path));
    let mut sink = open_output(&endpoint).unwrap();
    sink.write_all(b"compress me").unwrap();
    sink.flush().unwrap();
    drop(sink);

    let compressed = std::fs::read(&path).unwrap();
    assert_eq!(&compressed[..2], [0x1F, 0x8B]);
    let mut decoder = ::flate2::read::GzDecoder::new(compressed.as_slice());
    let mut out = Bytes::new();
    decoder.read_to_end(&mut out).unwrap();
    assert_eq!(out, b"compress me");
}

#[test]
fn test_open_output_remote_unsupported() {
    let endpoint = EndpointPath::from_arg(Some("s3://bucket/out.json")).unwrap();
    let err = match open_output(&endpoint) {
        Err(err) => err,
        Ok(_) => panic!("expected error"),
    };
    assert_eq!(err.kind(), std::io::ErrorKind::Unsupported);
}
