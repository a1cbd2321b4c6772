// src/readers/journalreader.rs

//! Implements a [`JournalReader`],
//! the driver of deriving [`Event`s] from a Splunk DDSS archive journal
//! byte stream.
//!
//! ### Framing
//!
//! A journal is a concatenation of frames, each a tag byte followed by a
//! tag-specific payload. Fixed-width integers are big-endian; lengths and
//! dictionary indices are LEB128 varints; byte strings are varint length
//! then bytes.
//!
//! | tag         | name                | payload                      |
//! |-------------|---------------------|------------------------------|
//! | `0x01`      | META_ADD_HOST       | string                       |
//! | `0x02`      | META_ADD_SOURCE     | string                       |
//! | `0x03`      | META_ADD_SOURCETYPE | string                       |
//! | `0x11`      | META_REF_HOST       | varint index                 |
//! | `0x12`      | META_REF_SOURCE     | varint index                 |
//! | `0x13`      | META_REF_SOURCETYPE | varint index                 |
//! | `0x20`      | EVENT               | u32 time, string message     |
//! | `0x21`      | KV_PAIR             | string key, string value     |
//! | `0x7F`      | EXT_BLOCK           | varint n, n bytes (skipped)  |
//! | `0x00`      | END                 | (none)                       |
//! | `0x80–0xFF` | reserved            | varint n, n bytes (skipped)  |
//!
//! The format is self-referential: events do not carry their host, source,
//! or sourcetype inline. `META_ADD` frames intern each distinct string into a
//! per-scope [`DictTable`]; `META_REF` frames move the per-scope "current"
//! pointer; an event inherits whatever the pointers name at that moment.
//! A `META_REF` to an index the dictionary does not (yet) hold is corrupt
//! input, never a forward reference.
//!
//! Tags `0x80` and above carry a self-describing varint length and are
//! skipped wholesale, so future frame kinds pass through old decoders. The
//! "extended storage" sideband (`EXT_BLOCK`) is skipped the same way.
//!
//! ### Scanning
//!
//! `JournalReader` is a pull-parser driven by [`scan`]: each call advances
//! the stream to the next complete event, consuming any metadata frames
//! along the way, and returns `true` with the event available from
//! [`get_event`]. Trailing `KV_PAIR` frames belong to the event just read;
//! the first non-`KV_PAIR` tag after an event ends it, and that one tag byte
//! is pushed back to be re-read on the next `scan`.
//!
//! The first failure of any kind is terminal: `scan` returns `false`,
//! [`err`] reports the [`DecodeError`], and every later `scan` keeps
//! returning `false`. There is no resynchronization; events decoded before
//! the failure remain valid.
//!
//! Sibling of the other "Readers" in this module, but the only one that owns
//! the whole pipeline from raw bytes to yielded values.
//!
//! [`JournalReader`]: self::JournalReader
//! [`Event`s]: crate::data::event::Event
//! [`DictTable`]: crate::readers::dicttable::DictTable
//! [`scan`]: self::JournalReader#method.scan
//! [`get_event`]: self::JournalReader#method.get_event
//! [`err`]: self::JournalReader#method.err
//! [`DecodeError`]: crate::common::DecodeError

use std::fmt;
use std::io::Read;

#[allow(unused_imports)]
use ::more_asserts::{
    debug_assert_le,
    debug_assert_lt,
};
#[allow(unused_imports)]
use ::si_trace_print::{
    defn,
    defo,
    defx,
    defñ,
    den,
    deo,
    dex,
    deñ,
};

use crate::common::{
    Count,
    DecodeError,
    DecodeErrorKind,
    DecodeResult,
    DictIndex,
    DictIndexOpt,
    FileOffset,
    IndexTime,
    IndexTimeOpt,
    ResultS3,
};
use crate::data::event::{
    Bytes,
    Event,
};
use crate::readers::bytereader::{
    ByteReader,
    FRAME_SZ_MAX_DEFAULT,
};
use crate::readers::dicttable::{
    MetaScope,
    MetaTables,
};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// frame tags
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub const TAG_END: u8 = 0x00;
pub const TAG_META_ADD_HOST: u8 = 0x01;
pub const TAG_META_ADD_SOURCE: u8 = 0x02;
pub const TAG_META_ADD_SOURCETYPE: u8 = 0x03;
pub const TAG_META_REF_HOST: u8 = 0x11;
pub const TAG_META_REF_SOURCE: u8 = 0x12;
pub const TAG_META_REF_SOURCETYPE: u8 = 0x13;
pub const TAG_EVENT: u8 = 0x20;
pub const TAG_KV_PAIR: u8 = 0x21;
pub const TAG_EXT_BLOCK: u8 = 0x7F;
/// tags at or above this carry a self-describing varint length and are
/// skipped for forward compatibility
pub const TAG_RESERVED_MIN: u8 = 0x80;

/// unwrap a [`DecodeResult`] inside a function returning [`ResultS3`]
macro_rules! scan_try {
    ($result:expr) => {
        match $result {
            Ok(val) => val,
            Err(err) => {
                defx!("return Err({})", err);
                return ResultS3::Err(err);
            }
        }
    };
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// JournalReader
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// result of one internal scan step
type ResultScan = ResultS3<Event, DecodeError>;

/// where the reader is in the stream's lifecycle
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ScanState {
    /// frames remain (as far as is known)
    Scanning,
    /// `END` frame seen, or clean EOF at a frame boundary
    Ended,
    /// a terminal [`DecodeError`] occurred
    Failed,
}

/// A streaming pull-parser over one journal byte stream.
///
/// Owns the byte source and the three metadata dictionaries. Yielded
/// [`Event`]s own their buffers and outlive the reader.
///
/// One `JournalReader` serves one extraction on one thread; it creates no
/// threads and holds at most one decoded event at a time.
pub struct JournalReader<R: Read> {
    /// primitive reads over the (decompressed) stream
    reader: ByteReader<R>,
    /// the interned metadata strings
    tables: MetaTables,
    /// "current" pointer per scope; events inherit these
    host_cur: DictIndexOpt,
    source_cur: DictIndexOpt,
    sourcetype_cur: DictIndexOpt,
    /// the most recently yielded event, valid until the next `scan`
    event: Option<Event>,
    state: ScanState,
    /// the terminal error, if any
    error: Option<DecodeError>,
    /// ceiling for any one length-prefixed field
    frame_sz_max: u64,
    /// `Count` of frames consumed, all kinds
    frames_processed: Count,
    /// `Count` of events yielded
    events_processed: Count,
    /// `Count` of `EXT_BLOCK` frames skipped
    ext_blocks_skipped: Count,
    /// `Count` of reserved-tag frames skipped
    reserved_skipped: Count,
    /// earliest `index_time` seen; for `--summary`-style reporting
    index_time_first: IndexTimeOpt,
    /// latest `index_time` seen
    index_time_last: IndexTimeOpt,
}

impl<R: Read> fmt::Debug for JournalReader<R> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        f.debug_struct("JournalReader")
            .field("position", &self.reader.position())
            .field("state", &self.state)
            .field("events_processed", &self.events_processed)
            .field("dict entries", &self.tables.total_entries())
            .field("Error?", &self.error)
            .finish()
    }
}

/// Running counts of one `JournalReader`, for end-of-run reporting.
#[derive(Clone, Default, Eq, PartialEq, Debug)]
pub struct SummaryJournalReader {
    pub journalreader_events_processed: Count,
    pub journalreader_frames_processed: Count,
    pub journalreader_ext_blocks_skipped: Count,
    pub journalreader_reserved_skipped: Count,
    pub journalreader_bytes_processed: FileOffset,
    pub journalreader_dict_host_len: usize,
    pub journalreader_dict_source_len: usize,
    pub journalreader_dict_sourcetype_len: usize,
    /// earliest event `index_time` processed
    pub journalreader_index_time_first: IndexTimeOpt,
    /// latest event `index_time` processed
    pub journalreader_index_time_last: IndexTimeOpt,
}

/// Implement the JournalReader.
impl<R: Read> JournalReader<R> {
    /// Create a new `JournalReader` over `inner` with the default
    /// frame-size ceiling.
    ///
    /// `inner` must yield uncompressed journal bytes; wrap raw input in a
    /// [`CompressReader`] first.
    ///
    /// [`CompressReader`]: crate::readers::compressreader::CompressReader
    pub fn new(inner: R) -> JournalReader<R> {
        Self::with_frame_sz_max(inner, FRAME_SZ_MAX_DEFAULT)
    }

    /// Create a new `JournalReader` with a custom ceiling for any one
    /// length-prefixed field.
    pub fn with_frame_sz_max(
        inner: R,
        frame_sz_max: u64,
    ) -> JournalReader<R> {
        defñ!("(frame_sz_max={})", frame_sz_max);
        JournalReader {
            reader: ByteReader::new(inner),
            tables: MetaTables::new(),
            host_cur: None,
            source_cur: None,
            sourcetype_cur: None,
            event: None,
            state: ScanState::Scanning,
            error: None,
            frame_sz_max,
            frames_processed: 0,
            events_processed: 0,
            ext_blocks_skipped: 0,
            reserved_skipped: 0,
            index_time_first: None,
            index_time_last: None,
        }
    }

    /// Advance to the next event.
    ///
    /// Returns `true` when an event is available from [`get_event`].
    /// Returns `false` on clean end-of-stream, after which further calls
    /// keep returning `false`; and on failure, reported by [`err`],
    /// after which further calls keep returning `false`.
    ///
    /// [`get_event`]: Self::get_event
    /// [`err`]: Self::err
    pub fn scan(&mut self) -> bool {
        defn!();
        match self.state {
            ScanState::Scanning => {}
            ScanState::Ended | ScanState::Failed => {
                defx!("state {:?}; return false", self.state);
                return false;
            }
        }
        self.event = None;
        match self.scan_next() {
            ResultS3::Found(event) => {
                self.events_processed += 1;
                self.index_time_update(event.index_time());
                self.event = Some(event);
                defx!("return true");

                true
            }
            ResultS3::Done => {
                self.state = ScanState::Ended;
                defx!("Done; return false");

                false
            }
            ResultS3::Err(err) => {
                self.state = ScanState::Failed;
                self.error = Some(err);
                defx!("Err; return false");

                false
            }
        }
    }

    /// the frame loop: consume frames until one event is complete, the
    /// stream ends, or something is wrong
    fn scan_next(&mut self) -> ResultScan {
        defn!();
        let mut pending: Option<Event> = None;
        loop {
            let tag: u8 = match self.reader.read_u8() {
                Ok(val) => val,
                Err(err) if err.kind() == DecodeErrorKind::UnexpectedEof => {
                    // EOF at a frame boundary is the clean end of the
                    // stream. An event not sealed by `END` or a following
                    // frame is a truncated tail and is not yielded.
                    defx!("EOF at frame boundary; return Done");
                    return ResultS3::Done;
                }
                Err(err) => {
                    defx!("return Err({})", err);
                    return ResultS3::Err(err);
                }
            };
            defo!("tag 0x{:02X} at offset {}", tag, self.reader.position() - 1);
            if let Some(event) = pending.take() {
                match tag {
                    TAG_KV_PAIR | TAG_END => {
                        pending = Some(event);
                    }
                    _ => {
                        // the event is complete; re-read this tag next scan
                        self.reader.unread_u8(tag);
                        defx!("event complete before tag 0x{:02X}; return Found", tag);
                        return ResultS3::Found(event);
                    }
                }
            }
            self.frames_processed += 1;
            match tag {
                TAG_END => {
                    defo!("END");
                    self.state = ScanState::Ended;
                    match pending {
                        Some(event) => {
                            defx!("return Found (final event)");
                            return ResultS3::Found(event);
                        }
                        None => {
                            defx!("return Done");
                            return ResultS3::Done;
                        }
                    }
                }
                TAG_META_ADD_HOST | TAG_META_ADD_SOURCE | TAG_META_ADD_SOURCETYPE => {
                    let scope: MetaScope = match tag {
                        TAG_META_ADD_HOST => MetaScope::Host,
                        TAG_META_ADD_SOURCE => MetaScope::Source,
                        _ => MetaScope::SourceType,
                    };
                    let bytes: Bytes = scan_try!(self.reader.read_len_prefixed(self.frame_sz_max));
                    let _idx: DictIndex = self.tables.table_mut(scope).append(bytes);
                    defo!("META_ADD {} [{}]", scope, _idx);
                }
                TAG_META_REF_HOST | TAG_META_REF_SOURCE | TAG_META_REF_SOURCETYPE => {
                    let scope: MetaScope = match tag {
                        TAG_META_REF_HOST => MetaScope::Host,
                        TAG_META_REF_SOURCE => MetaScope::Source,
                        _ => MetaScope::SourceType,
                    };
                    let idx: DictIndex = scan_try!(self.reader.read_varint_u64());
                    if idx as usize >= self.tables.table(scope).len() {
                        defx!("META_REF {} [{}] dangles; return Err", scope, idx);
                        return ResultS3::Err(DecodeError::new(
                            DecodeErrorKind::DanglingRef,
                            self.reader.position(),
                            format!(
                                "{} index {} names no entry; dictionary holds {}",
                                scope,
                                idx,
                                self.tables.table(scope).len()
                            ),
                        ));
                    }
                    defo!("META_REF {} [{}]", scope, idx);
                    match scope {
                        MetaScope::Host => self.host_cur = Some(idx),
                        MetaScope::Source => self.source_cur = Some(idx),
                        MetaScope::SourceType => self.sourcetype_cur = Some(idx),
                    }
                }
                TAG_EVENT => {
                    // `pending` is always `None` here; a preceding event
                    // was completed by the lookahead above
                    let index_time: IndexTime = scan_try!(self.reader.read_u32_be());
                    let raw_message: Bytes = scan_try!(self.reader.read_len_prefixed(self.frame_sz_max));
                    defo!("EVENT time={} message {} bytes", index_time, raw_message.len());
                    pending = Some(Event::new(
                        index_time,
                        self.host_cur,
                        self.source_cur,
                        self.sourcetype_cur,
                        raw_message,
                    ));
                }
                TAG_KV_PAIR => {
                    match pending.as_mut() {
                        Some(event) => {
                            let key: Bytes = scan_try!(self.reader.read_len_prefixed(self.frame_sz_max));
                            let value: Bytes = scan_try!(self.reader.read_len_prefixed(self.frame_sz_max));
                            defo!("KV_PAIR {} + {} bytes", key.len(), value.len());
                            event.push_extra_field(key, value);
                        }
                        None => {
                            defx!("KV_PAIR outside event; return Err");
                            return ResultS3::Err(DecodeError::new(
                                DecodeErrorKind::UnexpectedKv,
                                self.reader.position(),
                                String::from("KV_PAIR frame outside an event"),
                            ));
                        }
                    }
                }
                TAG_EXT_BLOCK => {
                    let len: u64 = scan_try!(self.reader.read_varint_u64());
                    scan_try!(self.check_skip_len(len, "EXT_BLOCK"));
                    defo!("EXT_BLOCK skip {} bytes", len);
                    scan_try!(self.reader.skip(len));
                    self.ext_blocks_skipped += 1;
                }
                TAG_RESERVED_MIN..=u8::MAX => {
                    // self-describing length; skip for forward compatibility
                    let len: u64 = scan_try!(self.reader.read_varint_u64());
                    scan_try!(self.check_skip_len(len, "reserved frame"));
                    defo!("reserved tag 0x{:02X} skip {} bytes", tag, len);
                    scan_try!(self.reader.skip(len));
                    self.reserved_skipped += 1;
                }
                _ => {
                    defx!("unknown tag 0x{:02X}; return Err", tag);
                    return ResultS3::Err(DecodeError::new(
                        DecodeErrorKind::UnknownTag,
                        self.reader.position(),
                        format!("unknown tag byte 0x{:02X}", tag),
                    ));
                }
            }
        }
    }

    /// a skippable frame declaring a length above the ceiling is as corrupt
    /// as an oversized string
    fn check_skip_len(
        &self,
        len: u64,
        what: &str,
    ) -> DecodeResult<()> {
        if len > self.frame_sz_max {
            return Err(DecodeError::new(
                DecodeErrorKind::FrameTooLarge,
                self.reader.position(),
                format!("{} declares length {} exceeding ceiling {}", what, len, self.frame_sz_max),
            ));
        }

        Ok(())
    }

    fn index_time_update(
        &mut self,
        index_time: IndexTime,
    ) {
        match self.index_time_first {
            Some(first) if first <= index_time => {}
            _ => self.index_time_first = Some(index_time),
        }
        match self.index_time_last {
            Some(last) if last >= index_time => {}
            _ => self.index_time_last = Some(index_time),
        }
    }

    /// The event found by the latest [`scan`] returning `true`.
    ///
    /// [`scan`]: Self::scan
    pub fn get_event(&self) -> Option<&Event> {
        self.event.as_ref()
    }

    /// Take ownership of the event found by the latest [`scan`].
    ///
    /// The accessors [`host`], [`source`], [`source_type`] remain valid
    /// until the next `scan`.
    ///
    /// [`scan`]: Self::scan
    /// [`host`]: Self::host
    /// [`source`]: Self::source
    /// [`source_type`]: Self::source_type
    pub fn take_event(&mut self) -> Option<Event> {
        self.event.take()
    }

    /// resolve one scope's index against its table; empty when unset
    fn resolve(
        &self,
        idx: DictIndexOpt,
        scope: MetaScope,
    ) -> &[u8] {
        match idx {
            Some(idx) => self.tables.table(scope).get(idx).unwrap_or(b""),
            None => b"",
        }
    }

    /// The current event's host, resolved against the host dictionary.
    /// Empty bytes when the stream never referenced a host.
    pub fn host(&self) -> &[u8] {
        let idx: DictIndexOpt = match self.event.as_ref() {
            Some(event) => event.host_idx(),
            None => self.host_cur,
        };

        self.resolve(idx, MetaScope::Host)
    }

    /// The current event's source. See [`host`](Self::host).
    pub fn source(&self) -> &[u8] {
        let idx: DictIndexOpt = match self.event.as_ref() {
            Some(event) => event.source_idx(),
            None => self.source_cur,
        };

        self.resolve(idx, MetaScope::Source)
    }

    /// The current event's sourcetype. See [`host`](Self::host).
    pub fn source_type(&self) -> &[u8] {
        let idx: DictIndexOpt = match self.event.as_ref() {
            Some(event) => event.sourcetype_idx(),
            None => self.sourcetype_cur,
        };

        self.resolve(idx, MetaScope::SourceType)
    }

    /// The terminal error, if scanning failed.
    pub fn err(&self) -> Option<&DecodeError> {
        self.error.as_ref()
    }

    /// Bytes consumed from the (decompressed) stream so far.
    #[inline(always)]
    pub fn position(&self) -> FileOffset {
        self.reader.position()
    }

    /// The metadata dictionaries. Grows monotonically during scanning.
    #[inline(always)]
    pub const fn tables(&self) -> &MetaTables {
        &self.tables
    }

    /// `Count` of events yielded by this `JournalReader`
    /// (i.e. `self.events_processed`).
    #[inline(always)]
    pub const fn count_events_processed(&self) -> Count {
        self.events_processed
    }

    /// Return an up-to-date `SummaryJournalReader` instance for this
    /// `JournalReader`.
    pub fn summary(&self) -> SummaryJournalReader {
        SummaryJournalReader {
            journalreader_events_processed: self.events_processed,
            journalreader_frames_processed: self.frames_processed,
            journalreader_ext_blocks_skipped: self.ext_blocks_skipped,
            journalreader_reserved_skipped: self.reserved_skipped,
            journalreader_bytes_processed: self.reader.position(),
            journalreader_dict_host_len: self.tables.host.len(),
            journalreader_dict_source_len: self.tables.source.len(),
            journalreader_dict_sourcetype_len: self.tables.sourcetype.len(),
            journalreader_index_time_first: self.index_time_first,
            journalreader_index_time_last: self.index_time_last,
        }
    }
}
