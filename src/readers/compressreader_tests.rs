// src/readers/compressreader_tests.rs

//! tests for `compressreader.rs`

#![allow(non_snake_case)]

use std::io::{Cursor, Read};

use ::test_case::test_case;

use crate::common::Bytes;
use crate::readers::compressreader::{
    sniff_kind,
    CompressKind,
    CompressReader,
    MAGIC_GZ,
    MAGIC_ZSTD,
};
use crate::tests::common::{
    gzip_bytes,
    zstd_bytes,
};

const PAYLOAD: &[u8] = b"The quick brown fox jumps over the lazy dog. 0123456789.";

fn read_all(reader: &mut dyn Read) -> Bytes {
    let mut out = Bytes::new();
    reader
        .read_to_end(&mut out)
        .unwrap();

    out
}

#[test_case(&[0x28, 0xB5, 0x2F, 0xFD], CompressKind::Zstd; "zstd magic")]
#[test_case(&[0x1F, 0x8B, 0x08, 0x00], CompressKind::Gz; "gzip magic")]
#[test_case(&[0x1F, 0x8B], CompressKind::Gz; "gzip magic only two bytes")]
#[test_case(&[0x20, 0x00, 0x00, 0x00], CompressKind::Plain; "journal event tag")]
#[test_case(&[0x28, 0xB5, 0x2F], CompressKind::Plain; "zstd magic truncated")]
#[test_case(&[], CompressKind::Plain; "empty")]
fn test_sniff_kind(
    prefix: &[u8],
    expect: CompressKind,
) {
    assert_eq!(sniff_kind(prefix), expect);
}

#[test]
fn test_CompressReader_plain_passthrough() {
    let mut reader = CompressReader::new(Cursor::new(Bytes::from(PAYLOAD))).unwrap();
    assert_eq!(reader.kind(), CompressKind::Plain);
    // the sniffed prefix is replayed; nothing is lost
    assert_eq!(read_all(&mut reader), PAYLOAD);
}

#[test]
fn test_CompressReader_plain_short_stream() {
    // shorter than the sniff window
    let mut reader = CompressReader::new(Cursor::new(Bytes::from(&b"ab"[..]))).unwrap();
    assert_eq!(reader.kind(), CompressKind::Plain);
    assert_eq!(read_all(&mut reader), b"ab");
}

#[test]
fn test_CompressReader_empty_stream() {
    let mut reader = CompressReader::new(Cursor::new(Bytes::new())).unwrap();
    assert_eq!(reader.kind(), CompressKind::Plain);
    assert_eq!(read_all(&mut reader), b"");
}

#[test]
fn test_CompressReader_gzip() {
    let compressed: Bytes = gzip_bytes(PAYLOAD);
    assert_eq!(&compressed[..MAGIC_GZ.len()], MAGIC_GZ);
    let mut reader = CompressReader::new(Cursor::new(compressed)).unwrap();
    assert_eq!(reader.kind(), CompressKind::Gz);
    assert_eq!(read_all(&mut reader), PAYLOAD);
}

#[test]
fn test_CompressReader_zstd() {
    let compressed: Bytes = zstd_bytes(PAYLOAD);
    assert_eq!(&compressed[..MAGIC_ZSTD.len()], MAGIC_ZSTD);
    let mut reader = CompressReader::new(Cursor::new(compressed)).unwrap();
    assert_eq!(reader.kind(), CompressKind::Zstd);
    assert_eq!(read_all(&mut reader), PAYLOAD);
}

#[test]
fn test_CompressReader_gzip_corrupt() {
    let mut compressed: Bytes = gzip_bytes(PAYLOAD);
    // mangle the deflate stream past the header
    let len = compressed.len();
    for byte in compressed[12..len - 8].iter_mut() {
        *byte ^= 0xA5;
    }
    let mut reader = CompressReader::new(Cursor::new(compressed)).unwrap();
    let mut out = Bytes::new();
    assert!(reader.read_to_end(&mut out).is_err());
}

#[test]
fn test_CompressReader_zstd_truncated() {
    let compressed: Bytes = zstd_bytes(PAYLOAD);
    let truncated: Bytes = Bytes::from(&compressed[..compressed.len() / 2]);
    let mut reader = CompressReader::new(Cursor::new(truncated)).unwrap();
    let mut out = Bytes::new();
    assert!(reader.read_to_end(&mut out).is_err());
}
