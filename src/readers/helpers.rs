// src/readers/helpers.rs

//! Miscellaneous helper functions for _Readers_.

use std;

#[allow(unused_imports)]
use ::si_trace_print::{
    defn,
    defo,
    defx,
    defñ,
};

use crate::common::{
    FPath,
    FileSz,
};

/// Helper function for a slightly annoying set of calls.
pub fn path_to_fpath(path: &std::path::Path) -> FPath {
    // `PathBuf` to `String` https://stackoverflow.com/q/37388107/471376
    (*(path.to_string_lossy())).to_string()
}

/// Helper function for completeness.
pub fn fpath_to_path(path: &FPath) -> &std::path::Path {
    std::path::Path::new(path)
}

/// return the size of the file
pub fn path_filesz(path: &std::path::Path) -> Option<FileSz> {
    defn!("({:?})", path);
    let metadata = match std::fs::metadata(path) {
        Ok(val) => val,
        Err(_err) => {
            defx!("error {}, return None", _err);
            return None;
        }
    };
    let len: FileSz = metadata.len();
    defx!("return {}", len);

    Some(len)
}

/// File names tried, in order, when the input path is a thawed bucket
/// directory instead of a journal file.
const JOURNAL_CANDIDATES: [&str; 3] = ["journal.zst", "journal.gz", "journal"];

/// Sub-directory of a Splunk bucket that holds the journal.
const RAWDATA_DIR: &str = "rawdata";

/// Resolve a thawed bucket directory to the journal file within it.
///
/// Looks for `<dir>/rawdata/journal.zst`, then `journal.gz`, then `journal`,
/// returning the first that exists. The extension only selects the file;
/// decompression is chosen later by content sniffing.
///
/// Returns `None` when `path` is not a directory or holds no journal.
pub fn resolve_journal_dir(path: &std::path::Path) -> Option<FPath> {
    defn!("({:?})", path);
    if !path.is_dir() {
        defx!("not a directory; return None");
        return None;
    }
    let rawdata = path.join(RAWDATA_DIR);
    for candidate in JOURNAL_CANDIDATES.iter() {
        let journal = rawdata.join(candidate);
        defo!("try {:?}", journal);
        if journal.is_file() {
            defx!("found {:?}", journal);
            return Some(path_to_fpath(journal.as_path()));
        }
    }
    defx!("no journal under {:?}; return None", rawdata);

    None
}

/// Does the file name end in `.gz`? Decides gzip wrapping of _output_ paths.
pub fn filename_ends_gz(path: &FPath) -> bool {
    path.to_lowercase().ends_with(".gz")
}
