// src/readers/compressreader.rs

//! Implements a [`CompressReader`], a [`Read`] adapter that sniffs the magic
//! bytes at the front of a raw byte stream and transparently decompresses
//! zstd and gzip streams. Anything else passes through unchanged.
//!
//! The sniff consumes nothing from the logical input: the peeked bytes are
//! replayed in front of whichever decoder is chosen, so the downstream
//! [`ByteReader`] always sees a continuous uncompressed stream starting at
//! offset zero.
//!
//! Compression is never decided by file extension. A `journal.gz` that holds
//! plain bytes decodes as plain bytes.
//!
//! [`CompressReader`]: self::CompressReader
//! [`Read`]: std::io::Read
//! [`ByteReader`]: crate::readers::bytereader::ByteReader

use std::fmt;
use std::io::{BufReader, Read, Result};

use ::flate2::read::GzDecoder;
#[allow(unused_imports)]
use ::si_trace_print::{
    defn,
    defo,
    defx,
    defñ,
};

/// zstd frame magic, little-endian `0xFD2FB528`.
pub const MAGIC_ZSTD: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// gzip member magic.
pub const MAGIC_GZ: [u8; 2] = [0x1F, 0x8B];

/// bytes needed to distinguish the known magics
const SNIFF_SZ: usize = 4;

/// Compression framing found in front of a journal stream.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompressKind {
    /// no recognized compression; bytes pass through
    Plain,
    /// gzip member, magic `1F 8B`
    Gz,
    /// zstd frame, magic `28 B5 2F FD`
    Zstd,
}

impl fmt::Display for CompressKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        match self {
            CompressKind::Plain => write!(f, "PLAIN"),
            CompressKind::Gz => write!(f, "GZIP"),
            CompressKind::Zstd => write!(f, "ZSTD"),
        }
    }
}

/// A reader that replays a small sniffed prefix before continuing with the
/// wrapped stream. This is the push-back buffer in front of the decoders.
pub struct PrefixReader<R: Read> {
    inner: R,
    prefix: Vec<u8>,
    /// how much of `prefix` was already replayed
    replayed: usize,
}

impl<R: Read> PrefixReader<R> {
    pub fn new(
        inner: R,
        prefix: Vec<u8>,
    ) -> PrefixReader<R> {
        PrefixReader {
            inner,
            prefix,
            replayed: 0,
        }
    }
}

impl<R: Read> Read for PrefixReader<R> {
    fn read(
        &mut self,
        buf: &mut [u8],
    ) -> Result<usize> {
        if self.replayed < self.prefix.len() {
            let remain: &[u8] = &self.prefix[self.replayed..];
            let n: usize = std::cmp::min(remain.len(), buf.len());
            buf[..n].copy_from_slice(&remain[..n]);
            self.replayed += n;
            return Ok(n);
        }

        self.inner.read(buf)
    }
}

/// one decoder per [`CompressKind`], each wrapping a [`PrefixReader`]
enum Decoder<R: Read> {
    Plain(PrefixReader<R>),
    Gz(Box<GzDecoder<PrefixReader<R>>>),
    Zstd(::zstd::stream::read::Decoder<'static, BufReader<PrefixReader<R>>>),
}

/// A compression-detecting [`Read`] over a raw journal byte source.
///
/// Construction performs the sniff, which may block on the first read of the
/// underlying stream but never fails on short input: a stream shorter than
/// the longest magic is simply `Plain`.
pub struct CompressReader<R: Read> {
    decoder: Decoder<R>,
    kind: CompressKind,
}

impl<R: Read> CompressReader<R> {
    /// Sniff `inner` and wrap it in the matching decoder.
    pub fn new(mut inner: R) -> Result<CompressReader<R>> {
        defn!();
        let mut prefix: Vec<u8> = Vec::with_capacity(SNIFF_SZ);
        let mut buf: [u8; 1] = [0; 1];
        // one byte at a time; the source may be an unbuffered pipe and
        // over-reading here would lose bytes past the sniff window
        while prefix.len() < SNIFF_SZ {
            match inner.read(&mut buf) {
                Ok(0) => break,
                Ok(_) => prefix.push(buf[0]),
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    defx!("sniff read error; return {:?}", err);
                    return Err(err);
                }
            }
        }
        let kind: CompressKind = sniff_kind(prefix.as_slice());
        defo!("sniffed {:?} from {:?}", kind, prefix);
        let replay: PrefixReader<R> = PrefixReader::new(inner, prefix);
        let decoder: Decoder<R> = match kind {
            CompressKind::Plain => Decoder::Plain(replay),
            CompressKind::Gz => Decoder::Gz(Box::new(GzDecoder::new(replay))),
            CompressKind::Zstd => Decoder::Zstd(::zstd::stream::read::Decoder::new(replay)?),
        };
        defx!("return CompressReader {}", kind);

        Ok(CompressReader { decoder, kind })
    }

    /// The compression framing found by the sniff.
    #[inline(always)]
    pub const fn kind(&self) -> CompressKind {
        self.kind
    }
}

impl<R: Read> Read for CompressReader<R> {
    fn read(
        &mut self,
        buf: &mut [u8],
    ) -> Result<usize> {
        match &mut self.decoder {
            Decoder::Plain(reader) => reader.read(buf),
            Decoder::Gz(decoder) => decoder.read(buf),
            Decoder::Zstd(decoder) => decoder.read(buf),
        }
    }
}

/// Match the sniffed prefix against the known magics.
pub fn sniff_kind(prefix: &[u8]) -> CompressKind {
    if prefix.len() >= MAGIC_ZSTD.len() && prefix[..MAGIC_ZSTD.len()] == MAGIC_ZSTD {
        return CompressKind::Zstd;
    }
    if prefix.len() >= MAGIC_GZ.len() && prefix[..MAGIC_GZ.len()] == MAGIC_GZ {
        return CompressKind::Gz;
    }

    CompressKind::Plain
}
