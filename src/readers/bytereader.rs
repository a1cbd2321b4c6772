// src/readers/bytereader.rs

//! Implements a [`ByteReader`], sequential primitive reads over any
//! [`Read`] source: single bytes, big-endian fixed-width integers, LEB128
//! varints, and length-prefixed byte strings.
//!
//! The journal framing needs exactly one byte of lookahead (to notice that an
//! event's trailing `KV_PAIR` frames have ended) so a `ByteReader` supports
//! pushing back the most recently read byte with [`unread_u8`].
//!
//! A `ByteReader` does no buffering of its own beyond the push-back slot;
//! callers wanting fewer syscalls should hand it a [`BufReader`] or a
//! [`CompressReader`] (which buffers internally).
//!
//! [`ByteReader`]: self::ByteReader
//! [`Read`]: std::io::Read
//! [`unread_u8`]: self::ByteReader#method.unread_u8
//! [`BufReader`]: std::io::BufReader
//! [`CompressReader`]: crate::readers::compressreader::CompressReader

use std::io::{ErrorKind, Read};

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
};

use crate::common::{
    Bytes,
    DecodeError,
    DecodeErrorKind,
    DecodeResult,
    FileOffset,
};

/// Maximum bytes in one LEB128 varint encoding a `u64`.
pub const VARINT_SZ_MAX: usize = 10;

/// Default ceiling for one length-prefixed field, 64 MiB.
///
/// A declared length above this fails with
/// [`FrameTooLarge`](crate::common::DecodeErrorKind#variant.FrameTooLarge)
/// before any allocation happens.
pub const FRAME_SZ_MAX_DEFAULT: u64 = 64 * 1024 * 1024;

/// buffer size for [`ByteReader::skip`], one read at a time
const SKIP_BUF_SZ: usize = 8192;

/// Sequential reads of wire primitives with position tracking and one byte
/// of push-back.
pub struct ByteReader<R: Read> {
    /// the underlying byte source; typically a
    /// [`CompressReader`](crate::readers::compressreader::CompressReader)
    inner: R,
    /// byte pushed back by [`unread_u8`](Self::unread_u8), consumed by the
    /// next read
    unread: Option<u8>,
    /// count of bytes consumed so far, for diagnostics; push-back rewinds it
    pos: FileOffset,
}

impl<R: Read> ByteReader<R> {
    pub fn new(inner: R) -> ByteReader<R> {
        ByteReader {
            inner,
            unread: None,
            pos: 0,
        }
    }

    /// Best-effort count of bytes consumed from the underlying stream.
    #[inline(always)]
    pub const fn position(&self) -> FileOffset {
        self.pos
    }

    /// helper to build an EOF error at the current position
    fn err_eof(
        &self,
        mesg: &str,
    ) -> DecodeError {
        DecodeError::new(DecodeErrorKind::UnexpectedEof, self.pos, String::from(mesg))
    }

    /// helper to map an underlying read failure.
    ///
    /// `UnexpectedEof` keeps its kind; anything else came from the byte
    /// source itself (i.e. a decompressor reporting corruption) and maps to
    /// `Compression`.
    fn err_read(
        &self,
        err: std::io::Error,
        mesg: &str,
    ) -> DecodeError {
        let kind: DecodeErrorKind = match err.kind() {
            ErrorKind::UnexpectedEof => DecodeErrorKind::UnexpectedEof,
            _ => DecodeErrorKind::Compression,
        };

        DecodeError::new(kind, self.pos, format!("{}: {}", mesg, err))
    }

    /// Read one byte. Fails `UnexpectedEof` at stream end.
    pub fn read_u8(&mut self) -> DecodeResult<u8> {
        if let Some(byte) = self.unread.take() {
            self.pos += 1;
            return Ok(byte);
        }
        let mut buf: [u8; 1] = [0; 1];
        loop {
            match self.inner.read(&mut buf) {
                Ok(0) => return Err(self.err_eof("read_u8 at end of stream")),
                Ok(_) => break,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(self.err_read(err, "read_u8")),
            }
        }
        self.pos += 1;

        Ok(buf[0])
    }

    /// Push back the most recently read byte; the next read returns it.
    ///
    /// Only one byte of push-back is held; a second `unread_u8` before a
    /// read is a logic error.
    pub fn unread_u8(
        &mut self,
        byte: u8,
    ) {
        debug_assert!(self.unread.is_none(), "unread_u8 called twice without an intervening read");
        debug_assert_le!(1, self.pos, "unread_u8 before any read");
        self.unread = Some(byte);
        self.pos -= 1;
    }

    /// fill `buf` entirely or fail
    fn read_exact_(
        &mut self,
        buf: &mut [u8],
        mesg: &str,
    ) -> DecodeResult<()> {
        let mut filled: usize = 0;
        if let Some(byte) = self.unread.take() {
            if buf.is_empty() {
                self.unread = Some(byte);
                return Ok(());
            }
            buf[0] = byte;
            filled = 1;
        }
        match self.inner.read_exact(&mut buf[filled..]) {
            Ok(_) => {}
            Err(err) => {
                return Err(self.err_read(err, mesg));
            }
        }
        self.pos += buf.len() as FileOffset;

        Ok(())
    }

    /// Read a big-endian `u16`.
    pub fn read_u16_be(&mut self) -> DecodeResult<u16> {
        let mut buf: [u8; 2] = [0; 2];
        self.read_exact_(&mut buf, "read_u16_be")?;

        Ok(u16::from_be_bytes(buf))
    }

    /// Read a big-endian `u32`.
    pub fn read_u32_be(&mut self) -> DecodeResult<u32> {
        let mut buf: [u8; 4] = [0; 4];
        self.read_exact_(&mut buf, "read_u32_be")?;

        Ok(u32::from_be_bytes(buf))
    }

    /// Read a big-endian `u64`.
    pub fn read_u64_be(&mut self) -> DecodeResult<u64> {
        let mut buf: [u8; 8] = [0; 8];
        self.read_exact_(&mut buf, "read_u64_be")?;

        Ok(u64::from_be_bytes(buf))
    }

    /// Read one LEB128 unsigned varint: 7 value bits per byte, least
    /// significant group first, continuation flag in the MSB.
    ///
    /// At most [`VARINT_SZ_MAX`] bytes. Fails `MalformedVarint` when an 11th
    /// byte would be needed or when the 10th byte carries bits that do not
    /// fit in a `u64`; fails `MalformedVarint` on EOF mid-varint.
    pub fn read_varint_u64(&mut self) -> DecodeResult<u64> {
        let mut result: u64 = 0;
        let mut shift: u32 = 0;
        for nbyte in 0..VARINT_SZ_MAX {
            let byte: u8 = match self.read_u8() {
                Ok(val) => val,
                Err(err) if err.kind() == DecodeErrorKind::UnexpectedEof && nbyte != 0 => {
                    return Err(DecodeError::new(
                        DecodeErrorKind::MalformedVarint,
                        self.pos,
                        String::from("stream ended mid-varint"),
                    ));
                }
                Err(err) => return Err(err),
            };
            let group: u64 = (byte & 0x7F) as u64;
            // the 10th byte holds bit 63 and nothing more
            if shift == 63 && group > 1 {
                return Err(DecodeError::new(
                    DecodeErrorKind::MalformedVarint,
                    self.pos,
                    String::from("varint overflows u64"),
                ));
            }
            result |= group << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
        }

        Err(DecodeError::new(
            DecodeErrorKind::MalformedVarint,
            self.pos,
            format!("varint continues past {} bytes", VARINT_SZ_MAX),
        ))
    }

    /// Read a varint length `n` then exactly `n` bytes.
    ///
    /// `n` above `max_sz` fails `FrameTooLarge` without reading the payload.
    pub fn read_len_prefixed(
        &mut self,
        max_sz: u64,
    ) -> DecodeResult<Bytes> {
        let len: u64 = self.read_varint_u64()?;
        if len > max_sz {
            return Err(DecodeError::new(
                DecodeErrorKind::FrameTooLarge,
                self.pos,
                format!("declared length {} exceeds ceiling {}", len, max_sz),
            ));
        }
        let mut buf: Bytes = vec![0; len as usize];
        self.read_exact_(&mut buf, "read_len_prefixed payload")?;

        Ok(buf)
    }

    /// Discard exactly `n` bytes. Fails `UnexpectedEof` when fewer remain.
    pub fn skip(
        &mut self,
        n: u64,
    ) -> DecodeResult<()> {
        defñ!("({})", n);
        let mut remain: u64 = n;
        if remain > 0 && self.unread.take().is_some() {
            self.pos += 1;
            remain -= 1;
        }
        let mut buf: [u8; SKIP_BUF_SZ] = [0; SKIP_BUF_SZ];
        while remain > 0 {
            let want: usize = std::cmp::min(remain, SKIP_BUF_SZ as u64) as usize;
            match self.inner.read(&mut buf[..want]) {
                Ok(0) => {
                    return Err(self.err_eof("stream ended mid-skip"));
                }
                Ok(nread) => {
                    self.pos += nread as FileOffset;
                    remain -= nread as u64;
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(self.err_read(err, "skip")),
            }
        }

        Ok(())
    }
}
