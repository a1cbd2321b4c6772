// benches/bench_journalreader.rs

//! Benchmark functions of `crate::readers::journalreader::JournalReader`

use std::io::Cursor;

use ::ddsslib::readers::compressreader::CompressReader;
use ::ddsslib::readers::journalreader::JournalReader;

use ::criterion::{black_box, criterion_group, criterion_main, Criterion};

/// events in the synthetic journal
const EVENT_COUNT: u32 = 10_000;

fn put_varint(
    buf: &mut Vec<u8>,
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

fn put_string(
    buf: &mut Vec<u8>,
    bytes: &[u8],
) {
    put_varint(buf, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

/// a journal of `count` events with a handful of hosts and trailing
/// key/value pairs on every tenth event
fn build_journal(count: u32) -> Vec<u8> {
    let mut buf: Vec<u8> = Vec::new();
    for n in 0..8u64 {
        buf.push(0x01); // META_ADD_HOST
        put_string(&mut buf, format!("host{:03}", n).as_bytes());
    }
    buf.push(0x02); // META_ADD_SOURCE
    put_string(&mut buf, b"/var/log/messages");
    buf.push(0x03); // META_ADD_SOURCETYPE
    put_string(&mut buf, b"syslog");
    buf.push(0x12);
    put_varint(&mut buf, 0);
    buf.push(0x13);
    put_varint(&mut buf, 0);
    for n in 0..count {
        buf.push(0x11); // META_REF_HOST
        put_varint(&mut buf, (n % 8) as u64);
        buf.push(0x20); // EVENT
        buf.extend_from_slice(&(1_600_000_000 + n).to_be_bytes());
        put_string(
            &mut buf,
            format!("kernel: [{:>10}.123456] audit: type=1400 apparmor=\"ALLOWED\" n={}", n, n)
                .as_bytes(),
        );
        if n % 10 == 0 {
            buf.push(0x21); // KV_PAIR
            put_string(&mut buf, b"seq");
            put_string(&mut buf, format!("{}", n).as_bytes());
        }
    }
    buf.push(0x00); // END

    buf
}

#[inline(never)]
fn journalreader_scan_all(journal: &[u8]) -> u64 {
    let mut reader = JournalReader::new(Cursor::new(journal));
    let mut events: u64 = 0;
    while reader.scan() {
        let event = reader.get_event().unwrap();
        black_box(event.raw_message());
        black_box(reader.host());
        events += 1;
    }
    assert!(reader.err().is_none());

    events
}

#[inline(never)]
fn journalreader_scan_all_zstd(journal_zstd: &[u8]) -> u64 {
    let compress_reader = CompressReader::new(Cursor::new(journal_zstd)).unwrap();
    let mut reader = JournalReader::new(compress_reader);
    let mut events: u64 = 0;
    while reader.scan() {
        black_box(reader.get_event().unwrap());
        events += 1;
    }

    events
}

// criterion runners

fn criterion_benchmark(c: &mut Criterion) {
    let journal: Vec<u8> = build_journal(EVENT_COUNT);
    let journal_zstd: Vec<u8> = ::zstd::encode_all(journal.as_slice(), 3).unwrap();

    let mut group = c.benchmark_group("journalreader");
    group.bench_function("scan_all_plain", |b| {
        b.iter(|| {
            let events = journalreader_scan_all(black_box(journal.as_slice()));
            assert_eq!(events, EVENT_COUNT as u64);
        })
    });
    group.bench_function("scan_all_zstd", |b| {
        b.iter(|| {
            let events = journalreader_scan_all_zstd(black_box(journal_zstd.as_slice()));
            assert_eq!(events, EVENT_COUNT as u64);
        })
    });
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
