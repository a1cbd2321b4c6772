// src/readers/mod.rs

//! "Readers" for _ddsslib_.
//!
//! ## Overview of readers
//!
//! * A [`JournalReader`] drives a [`ByteReader`] to derive [`Event`s].
//! * A `ByteReader` reads primitives (bytes, big-endian integers, varints,
//!   length-prefixed byte strings) from any [`Read`] source.
//! * A [`CompressReader`] sits underneath the `ByteReader`: it sniffs the
//!   first bytes of the raw input and transparently undoes zstd or gzip
//!   stream compression.
//! * A [`DictTable`] holds the interned metadata strings (host, source,
//!   sourcetype) that `META_ADD` frames append and events refer to by index.
//!
//! <br/>
//!
//! _A `JournalReader` is not a rust "Reader"; it does not implement the trait
//! [`Read`]. It is a "reader" in an informal sense._
//!
//! [`JournalReader`]: crate::readers::journalreader::JournalReader
//! [`ByteReader`]: crate::readers::bytereader::ByteReader
//! [`CompressReader`]: crate::readers::compressreader::CompressReader
//! [`DictTable`]: crate::readers::dicttable::DictTable
//! [`Event`s]: crate::data::event::Event
//! [`Read`]: std::io::Read

pub mod bytereader;

pub mod compressreader;
#[cfg(test)]
pub mod compressreader_tests;

pub mod dicttable;

pub mod helpers;

pub mod journalreader;
