// src/endpoint.rs

//! I/O endpoints: where journal bytes come from and where extracted records
//! go.
//!
//! Three families of endpoint path:
//!
//! * no path: standard input / standard output
//! * a bare path: the local filesystem; an input path may be a thawed
//!   bucket directory, resolved to the journal file within it
//! * `scheme://bucket/key`: a remote object store
//!
//! Object-store URIs are parsed and validated here ([`ObjectUri`]) but the
//! transport itself is an external collaborator; opening a remote endpoint
//! without one configured reports [`ErrorKind::Unsupported`]. Credentials
//! and timeouts belong to that layer, not to this crate.
//!
//! Readers are plain pull-based byte streams, no seeking, so the rest of
//! the pipeline cannot tell the families apart. Writers are append-only
//! sinks; the final flush-and-close is the commit.
//!
//! [`ObjectUri`]: self::ObjectUri
//! [`ErrorKind::Unsupported`]: std::io::ErrorKind#variant.Unsupported

use std::fmt;
use std::io::{Error, ErrorKind, Read, Result, Write};

use ::flate2::write::GzEncoder;
use ::flate2::Compression;
#[allow(unused_imports)]
use ::si_trace_print::{
    defn,
    defo,
    defx,
    defñ,
};

use crate::common::{
    File,
    FPath,
    FileOpenOptions,
    Path,
};
use crate::debug::printers::e_dbg;
use crate::readers::helpers::{
    filename_ends_gz,
    fpath_to_path,
    path_filesz,
    resolve_journal_dir,
};

/// URI scheme separator for remote endpoints.
pub const SCHEME_SEP: &str = "://";

/// A parsed `scheme://bucket/key` object-store location.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ObjectUri {
    pub scheme: String,
    pub bucket: String,
    pub key: String,
}

impl fmt::Display for ObjectUri {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        write!(f, "{}{}{}/{}", self.scheme, SCHEME_SEP, self.bucket, self.key)
    }
}

impl ObjectUri {
    /// Parse `scheme://bucket/key`. The key may contain further slashes;
    /// the bucket and key must both be non-empty.
    pub fn parse(uri: &str) -> Result<ObjectUri> {
        let (scheme, remain) = match uri.split_once(SCHEME_SEP) {
            Some(val) => val,
            None => {
                return Err(Error::new(
                    ErrorKind::InvalidInput,
                    format!("not an object-store URI: {:?}", uri),
                ));
            }
        };
        let (bucket, key) = match remain.split_once('/') {
            Some(val) => val,
            None => (remain, ""),
        };
        if scheme.is_empty() || bucket.is_empty() || key.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("object-store URI needs scheme, bucket, and key: {:?}", uri),
            ));
        }

        Ok(ObjectUri {
            scheme: String::from(scheme),
            bucket: String::from(bucket),
            key: String::from(key),
        })
    }
}

/// One endpoint location, input or output.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EndpointPath {
    /// standard input or standard output
    Stdio,
    /// local filesystem path
    Local(FPath),
    /// remote object store
    Remote(ObjectUri),
}

impl fmt::Display for EndpointPath {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        match self {
            EndpointPath::Stdio => write!(f, "<stdio>"),
            EndpointPath::Local(path) => write!(f, "{}", path),
            EndpointPath::Remote(uri) => write!(f, "{}", uri),
        }
    }
}

impl EndpointPath {
    /// Classify a user-passed path. `None` means stdio.
    pub fn from_arg(path: Option<&str>) -> Result<EndpointPath> {
        match path {
            None => Ok(EndpointPath::Stdio),
            Some(path) if path.contains(SCHEME_SEP) => {
                Ok(EndpointPath::Remote(ObjectUri::parse(path)?))
            }
            Some(path) => Ok(EndpointPath::Local(FPath::from(path))),
        }
    }

    /// Does the path name a `.gz` output? Stdio never does.
    pub fn wants_gzip(&self) -> bool {
        match self {
            EndpointPath::Stdio => false,
            EndpointPath::Local(path) => filename_ends_gz(path),
            EndpointPath::Remote(uri) => filename_ends_gz(&uri.key),
        }
    }
}

/// readable byte stream handed to the decoder pipeline
pub type InputStream = Box<dyn Read + Send>;

/// writable byte sink handed to a writer
pub type OutputStream = Box<dyn Write + Send>;

/// Gzip sink whose `flush` completes the gzip member (writes the trailer)
/// before flushing the underlying sink.
///
/// A bare `GzEncoder` only writes its trailer on drop, where an error has
/// nowhere to go. Writers call `flush` exactly once, from `finish`, so
/// hooking the trailer there makes commit failures visible to the driver.
struct GzCommitSink {
    encoder: GzEncoder<OutputStream>,
}

impl Write for GzCommitSink {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> Result<usize> {
        self.encoder.write(buf)
    }

    fn flush(&mut self) -> Result<()> {
        // idempotent; completes the member on first call
        self.encoder.try_finish()?;

        self.encoder.get_mut().flush()
    }
}

fn err_remote_unsupported(uri: &ObjectUri) -> Error {
    Error::new(
        ErrorKind::Unsupported,
        format!("no object-store transport configured for {}", uri),
    )
}

/// Open an endpoint for reading.
///
/// A local directory is resolved to the journal file within it
/// (`rawdata/journal{.zst,.gz,}`).
pub fn open_input(endpoint: &EndpointPath) -> Result<InputStream> {
    defn!("({})", endpoint);
    match endpoint {
        EndpointPath::Stdio => {
            defx!("stdin");
            Ok(Box::new(std::io::stdin()))
        }
        EndpointPath::Local(fpath) => {
            let mut path: &Path = fpath_to_path(fpath);
            let resolved: FPath;
            if let Some(journal) = resolve_journal_dir(path) {
                defo!("resolved directory to {:?}", journal);
                resolved = journal;
                path = fpath_to_path(&resolved);
            }
            let mut open_options = FileOpenOptions::new();
            defo!("open_options.read(true).open({:?})", path);
            let file: File = match open_options
                .read(true)
                .open(path)
            {
                Ok(val) => val,
                Err(err) => {
                    defx!("return {:?}", err);
                    return Err(err);
                }
            };
            if let Some(filesz) = path_filesz(path) {
                e_dbg!("input {:?} is {} bytes", path, filesz);
            }
            defx!();
            Ok(Box::new(file))
        }
        EndpointPath::Remote(uri) => {
            defx!("remote {}; unsupported", uri);
            Err(err_remote_unsupported(uri))
        }
    }
}

/// Open an endpoint for writing, creating local parent directories as
/// needed. When the path ends in `.gz` the sink is wrapped in a streaming
/// gzip compressor whose trailer is written at `finish`.
pub fn open_output(endpoint: &EndpointPath) -> Result<OutputStream> {
    defn!("({})", endpoint);
    let sink: OutputStream = match endpoint {
        EndpointPath::Stdio => {
            defo!("stdout");
            Box::new(std::io::stdout())
        }
        EndpointPath::Local(fpath) => {
            let path: &Path = fpath_to_path(fpath);
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    defo!("create_dir_all({:?})", parent);
                    std::fs::create_dir_all(parent)?;
                }
            }
            defo!("File::create({:?})", path);
            match File::create(path) {
                Ok(file) => Box::new(file),
                Err(err) => {
                    defx!("return {:?}", err);
                    return Err(err);
                }
            }
        }
        EndpointPath::Remote(uri) => {
            defx!("remote {}; unsupported", uri);
            return Err(err_remote_unsupported(uri));
        }
    };
    if endpoint.wants_gzip() {
        defx!("wrap sink in GzEncoder");
        return Ok(Box::new(GzCommitSink {
            encoder: GzEncoder::new(sink, Compression::default()),
        }));
    }
    defx!();

    Ok(sink)
}
