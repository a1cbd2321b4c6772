// src/tests/common.rs

//! Shared test fixtures: journal byte-stream builders and canned streams.
//!
//! The production crate never encodes journals (re-encoding is an explicit
//! non-goal) so the tiny frame encoders live here, test-only. Round-trip
//! tests fabricate a journal with these, decode it, and compare.

use crate::common::Bytes;
use crate::readers::journalreader::{
    TAG_END,
    TAG_EVENT,
    TAG_EXT_BLOCK,
    TAG_KV_PAIR,
    TAG_META_ADD_HOST,
    TAG_META_ADD_SOURCE,
    TAG_META_ADD_SOURCETYPE,
    TAG_META_REF_HOST,
    TAG_META_REF_SOURCE,
    TAG_META_REF_SOURCETYPE,
};

use ::lazy_static::lazy_static;

/// append one LEB128 varint
pub fn put_varint(
    buf: &mut Bytes,
    mut value: u64,
) {
    loop {
        let byte: u8 = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            break;
        } else {
            buf.push(byte | 0x80);
        }
    }
}

/// append a varint length then the bytes
pub fn put_string(
    buf: &mut Bytes,
    bytes: &[u8],
) {
    put_varint(buf, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

pub fn put_meta_add_host(
    buf: &mut Bytes,
    host: &[u8],
) {
    buf.push(TAG_META_ADD_HOST);
    put_string(buf, host);
}

pub fn put_meta_add_source(
    buf: &mut Bytes,
    source: &[u8],
) {
    buf.push(TAG_META_ADD_SOURCE);
    put_string(buf, source);
}

pub fn put_meta_add_sourcetype(
    buf: &mut Bytes,
    sourcetype: &[u8],
) {
    buf.push(TAG_META_ADD_SOURCETYPE);
    put_string(buf, sourcetype);
}

pub fn put_meta_ref_host(
    buf: &mut Bytes,
    idx: u64,
) {
    buf.push(TAG_META_REF_HOST);
    put_varint(buf, idx);
}

pub fn put_meta_ref_source(
    buf: &mut Bytes,
    idx: u64,
) {
    buf.push(TAG_META_REF_SOURCE);
    put_varint(buf, idx);
}

pub fn put_meta_ref_sourcetype(
    buf: &mut Bytes,
    idx: u64,
) {
    buf.push(TAG_META_REF_SOURCETYPE);
    put_varint(buf, idx);
}

pub fn put_event(
    buf: &mut Bytes,
    index_time: u32,
    message: &[u8],
) {
    buf.push(TAG_EVENT);
    buf.extend_from_slice(&index_time.to_be_bytes());
    put_string(buf, message);
}

pub fn put_kv_pair(
    buf: &mut Bytes,
    key: &[u8],
    value: &[u8],
) {
    buf.push(TAG_KV_PAIR);
    put_string(buf, key);
    put_string(buf, value);
}

pub fn put_ext_block(
    buf: &mut Bytes,
    payload: &[u8],
) {
    buf.push(TAG_EXT_BLOCK);
    put_string(buf, payload);
}

pub fn put_end(buf: &mut Bytes) {
    buf.push(TAG_END);
}

/// a small journal: one host, two sources, two events with trailing
/// key/value pairs, an extended-storage block, `END`-terminated
pub fn journal_small() -> Bytes {
    let mut buf: Bytes = Bytes::new();
    put_meta_add_host(&mut buf, b"host001");
    put_meta_add_source(&mut buf, b"/var/log/auth.log");
    put_meta_add_source(&mut buf, b"/var/log/syslog");
    put_meta_add_sourcetype(&mut buf, b"linux_secure");
    put_meta_ref_host(&mut buf, 0);
    put_meta_ref_source(&mut buf, 0);
    put_meta_ref_sourcetype(&mut buf, 0);
    put_event(&mut buf, 1611854821, b"Accepted publickey for root");
    put_kv_pair(&mut buf, b"pid", b"4077");
    put_ext_block(&mut buf, &[0xAA; 16]);
    put_meta_ref_source(&mut buf, 1);
    put_event(&mut buf, 1611854822, b"session opened for user root");
    put_end(&mut buf);

    buf
}

/// gzip-compress `bytes` in one member
pub fn gzip_bytes(bytes: &[u8]) -> Bytes {
    use std::io::Write;

    let mut encoder = ::flate2::write::GzEncoder::new(Bytes::new(), ::flate2::Compression::default());
    encoder
        .write_all(bytes)
        .unwrap();

    encoder
        .finish()
        .unwrap()
}

/// zstd-compress `bytes` in one frame
pub fn zstd_bytes(bytes: &[u8]) -> Bytes {
    ::zstd::encode_all(bytes, 3).unwrap()
}

// spec'd end-to-end scenario byte streams, spelled out literally

lazy_static! {
    /// single event, no metadata:
    /// `{time=100, host="", source="", sourcetype="", message="hello"}`
    pub static ref JOURNAL_S1: Bytes = vec![
        0x20, 0x00, 0x00, 0x00, 0x64, 0x05, 0x68, 0x65, 0x6C, 0x6C, 0x6F, 0x00,
    ];
    /// one host, one event: `{time=200, host="host001", message="foo"}`
    pub static ref JOURNAL_S2: Bytes = vec![
        0x01, 0x07, 0x68, 0x6F, 0x73, 0x74, 0x30, 0x30, 0x31, // META_ADD_HOST "host001"
        0x11, 0x00, // META_REF_HOST 0
        0x20, 0x00, 0x00, 0x00, 0xC8, 0x03, 0x66, 0x6F, 0x6F, // EVENT t=200 "foo"
        0x00, // END
    ];
    /// two events share a host, differ in source
    pub static ref JOURNAL_S3: Bytes = vec![
        0x01, 0x04, 0x68, 0x30, 0x30, 0x31, // META_ADD_HOST "h001"
        0x02, 0x02, 0x73, 0x41, // META_ADD_SOURCE "sA"
        0x02, 0x02, 0x73, 0x42, // META_ADD_SOURCE "sB"
        0x11, 0x00, // META_REF_HOST 0
        0x12, 0x00, // META_REF_SOURCE 0
        0x20, 0x00, 0x00, 0x00, 0x01, 0x01, 0x61, // EVENT t=1 "a"
        0x12, 0x01, // META_REF_SOURCE 1
        0x20, 0x00, 0x00, 0x00, 0x02, 0x01, 0x62, // EVENT t=2 "b"
        0x00, // END
    ];
    /// `META_REF_HOST 5` against an empty host dictionary
    pub static ref JOURNAL_S4: Bytes = vec![0x11, 0x05, 0x00];
    /// unknown forward-compatible tag skipped, then one event
    pub static ref JOURNAL_S5: Bytes = vec![
        0x80, 0x03, 0xFF, 0xFF, 0xFF, // reserved tag, 3 bytes, skipped
        0x20, 0x00, 0x00, 0x00, 0x09, 0x01, 0x78, // EVENT t=9 "x"
        0x00, // END
    ];
}
