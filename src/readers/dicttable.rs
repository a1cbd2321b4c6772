// src/readers/dicttable.rs

//! Dictionary tables for journal metadata strings.
//!
//! A journal interns each distinct host, source, and sourcetype string once,
//! in a `META_ADD` frame; every event thereafter names them by index. The
//! tables are append-only for the lifetime of one decode: entries are never
//! deleted, replaced, or re-ordered, so an index handed out at any point
//! resolves to the same bytes forever after.
//!
//! Entries are stored as-is. No normalization, no deduplication; if a
//! journal appends the same host twice, it occupies two indices.

use std::fmt;

use crate::common::{
    Bytes,
    DictIndex,
};

/// The three metadata scopes a journal maintains dictionaries for.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetaScope {
    Host,
    Source,
    SourceType,
}

impl fmt::Display for MetaScope {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        match self {
            MetaScope::Host => write!(f, "host"),
            MetaScope::Source => write!(f, "source"),
            MetaScope::SourceType => write!(f, "sourcetype"),
        }
    }
}

/// An append-only, index-addressed store of interned metadata byte strings.
#[derive(Debug, Clone, Default)]
pub struct DictTable {
    /// entries in append order; the index is the position
    entries: Vec<Bytes>,
}

impl DictTable {
    pub fn new() -> DictTable {
        DictTable::default()
    }

    /// Append one string, returning its index (the previous length).
    pub fn append(
        &mut self,
        bytes: Bytes,
    ) -> DictIndex {
        let idx: DictIndex = self.entries.len() as DictIndex;
        self.entries.push(bytes);

        idx
    }

    /// Resolve an index. `None` for an index never handed out.
    pub fn get(
        &self,
        idx: DictIndex,
    ) -> Option<&[u8]> {
        self.entries
            .get(idx as usize)
            .map(|entry| entry.as_slice())
    }

    /// Number of entries.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The per-decoder bundle of all three dictionary tables.
#[derive(Debug, Clone, Default)]
pub struct MetaTables {
    pub host: DictTable,
    pub source: DictTable,
    pub sourcetype: DictTable,
}

impl MetaTables {
    pub fn new() -> MetaTables {
        MetaTables::default()
    }

    /// The table for `scope`.
    pub fn table(
        &self,
        scope: MetaScope,
    ) -> &DictTable {
        match scope {
            MetaScope::Host => &self.host,
            MetaScope::Source => &self.source,
            MetaScope::SourceType => &self.sourcetype,
        }
    }

    /// The table for `scope`, mutable.
    pub fn table_mut(
        &mut self,
        scope: MetaScope,
    ) -> &mut DictTable {
        match scope {
            MetaScope::Host => &mut self.host,
            MetaScope::Source => &mut self.source,
            MetaScope::SourceType => &mut self.sourcetype,
        }
    }

    /// Total entries across all three tables.
    pub fn total_entries(&self) -> usize {
        self.host.len() + self.source.len() + self.sourcetype.len()
    }
}
