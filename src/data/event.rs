// src/data/event.rs

//! Data representation of one Splunk journal event.

use std::borrow::Cow;
use std::fmt;

use ::bstr::ByteSlice;

#[doc(hidden)]
pub use crate::common::{
    Bytes,
    Count,
    DictIndex,
    DictIndexOpt,
    IndexTime,
};

/// One key/value pair captured from a `KV_PAIR` frame. Both halves are
/// opaque byte strings.
pub type KvPair = (Bytes, Bytes);

/// Ordered sequence of [`KvPair`]s; duplicate keys allowed and preserved.
pub type KvPairs = Vec<KvPair>;

/// Data representing a single journal event.
///
/// An `Event` owns its buffers; it remains valid after the decoder that
/// yielded it advances or is dropped.
///
/// The three `*_idx` fields refer into the decoder's dictionary tables.
/// `None` means the stream never referenced that scope before this event;
/// such events resolve to the empty string.
#[derive(Clone, Eq, PartialEq)]
pub struct Event {
    /// Unix epoch seconds recorded when Splunk indexed the event.
    index_time: IndexTime,
    /// Index into the host dictionary at the time this event was decoded.
    host_idx: DictIndexOpt,
    /// Index into the source dictionary.
    source_idx: DictIndexOpt,
    /// Index into the sourcetype dictionary.
    sourcetype_idx: DictIndexOpt,
    /// The event payload as stored, byte-for-byte. Typically UTF-8 text but
    /// the journal does not promise that.
    raw_message: Bytes,
    /// Trailing `KV_PAIR` frames, in wire order.
    extra_fields: KvPairs,
}

impl fmt::Debug for Event {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        f.debug_struct("Event")
            .field("index_time", &self.index_time)
            .field("host_idx", &self.host_idx)
            .field("source_idx", &self.source_idx)
            .field("sourcetype_idx", &self.sourcetype_idx)
            .field("raw_message", &self.raw_message.as_bstr())
            .field("extra_fields", &self.extra_fields.len())
            .finish()
    }
}

impl Event {
    pub fn new(
        index_time: IndexTime,
        host_idx: DictIndexOpt,
        source_idx: DictIndexOpt,
        sourcetype_idx: DictIndexOpt,
        raw_message: Bytes,
    ) -> Event {
        Event {
            index_time,
            host_idx,
            source_idx,
            sourcetype_idx,
            raw_message,
            extra_fields: KvPairs::new(),
        }
    }

    #[inline(always)]
    pub const fn index_time(&self) -> IndexTime {
        self.index_time
    }

    #[inline(always)]
    pub const fn host_idx(&self) -> DictIndexOpt {
        self.host_idx
    }

    #[inline(always)]
    pub const fn source_idx(&self) -> DictIndexOpt {
        self.source_idx
    }

    #[inline(always)]
    pub const fn sourcetype_idx(&self) -> DictIndexOpt {
        self.sourcetype_idx
    }

    /// The message payload as a `&[u8]`, exactly as stored in the journal.
    #[inline(always)]
    pub fn raw_message(&self) -> &[u8] {
        self.raw_message.as_slice()
    }

    #[inline(always)]
    pub fn extra_fields(&self) -> &[KvPair] {
        self.extra_fields.as_slice()
    }

    /// Append one key/value pair from a trailing `KV_PAIR` frame.
    /// Insertion order and duplicate keys are preserved.
    pub fn push_extra_field(
        &mut self,
        key: Bytes,
        value: Bytes,
    ) {
        self.extra_fields.push((key, value));
    }

    /// The message payload interpreted as UTF-8, invalid sequences replaced
    /// with U+FFFD.
    pub fn message_string(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.raw_message.as_slice())
    }
}
