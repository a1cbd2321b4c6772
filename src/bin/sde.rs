// src/bin/sde.rs

//! Driver program _sde_ ("Splunk DDSS extract") drives the [_ddsslib_].
//!
//! Processes user-passed command-line arguments, resolves the input and
//! output endpoints, then runs one extraction: journal bytes in, serialized
//! event records out.
//!
//! All diagnostics go to stderr; only extracted records go to stdout (when
//! stdout is the output endpoint).
//!
//! Exit values:
//! * 0 is a clean extraction
//! * 1 is a fatal error from the decoder or I/O
//! * 2 is a usage error
//! * 3 means the selected output format is not compiled into this build
//!
//! [_ddsslib_]: ddsslib

#![allow(non_camel_case_types)]

use std::process::ExitCode;

extern crate clap;
use clap::Parser;

extern crate ddsslib;
use ddsslib::common::FPath;
use ddsslib::debug::printers::{
    set_verbosity,
    Verbosity,
};
use ddsslib::e_err;
use ddsslib::endpoint::EndpointPath;
use ddsslib::extractor::{
    extract,
    ExtractError,
};
use ddsslib::writers::OutputFormat;

#[allow(unused_imports)]
use ::si_trace_print::{
    defn,
    defo,
    defx,
    defñ,
};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// command-line parsing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// clean extraction
const EXIT_OK: u8 = 0;
/// general error exit value
const EXIT_ERR: u8 = 1;
/// selected output format not compiled in
const EXIT_FORMAT_UNAVAILABLE: u8 = 3;

const CLI_HELP_AFTER: &str = "\
Paths may be a local file, a local thawed-bucket directory (the journal is
found under rawdata/), or an object-store URI such as s3://bucket/key.
Input compression (zstd, gzip, none) is detected from the stream content.
An output path ending in .gz is gzip-compressed.

Examples:
  sde -i journal.zst -o events.json
  sde -i /splunk/thawed/db_1611854821_1611853examp_0/ -f csv -o events.csv
  cat journal | sde -q > events.json
  sde -i journal.gz -f parquet -o events.parquet";

/// CLI enum mapped to [`Verbosity`]
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
enum CLI_LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

// `Display` must match the `ValueEnum` possible values; needed for
// `default_value_t`
impl std::fmt::Display for CLI_LogLevel {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter,
    ) -> std::fmt::Result {
        match self {
            CLI_LogLevel::Error => write!(f, "error"),
            CLI_LogLevel::Warn => write!(f, "warn"),
            CLI_LogLevel::Info => write!(f, "info"),
            CLI_LogLevel::Debug => write!(f, "debug"),
        }
    }
}

// Note:
// * the `about` is taken from `Cargo.toml:[package]:description`.
#[derive(Parser, Debug)]
#[command(
    name = "sde",
    author,
    version,
    about,
    after_help = CLI_HELP_AFTER,
)]
struct CLI_Args {
    /// Input journal (local path, thawed-bucket directory, or
    /// scheme://bucket/key). Reads from STDIN when not passed.
    #[arg(
        short = 'i',
        long = "input",
    )]
    input: Option<String>,

    /// Output file (local path or scheme://bucket/key). Writes to STDOUT
    /// when not passed.
    #[arg(
        short = 'o',
        long = "output",
    )]
    output: Option<String>,

    /// Output serialization format.
    #[arg(
        short = 'f',
        long = "format",
        value_enum,
        default_value_t = OutputFormat::Ndjson,
    )]
    format: OutputFormat,

    /// Diagnostic verbosity, printed to stderr.
    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value_t = CLI_LogLevel::Info,
    )]
    log_level: CLI_LogLevel,

    /// Verbose diagnostics (same as --log-level debug).
    #[arg(
        short = 'v',
        long,
        group = "verbosity_args",
    )]
    verbose: bool,

    /// Quiet; warnings and errors only (same as --log-level warn).
    #[arg(
        short = 'q',
        long,
        group = "verbosity_args",
    )]
    quiet: bool,
}

/// determine the effective [`Verbosity`] from `-l`, `-v`, `-q`
fn cli_determine_verbosity(args: &CLI_Args) -> Verbosity {
    if args.verbose {
        return Verbosity::Debug;
    }
    if args.quiet {
        return Verbosity::Warn;
    }
    match args.log_level {
        CLI_LogLevel::Error => Verbosity::Error,
        CLI_LogLevel::Warn => Verbosity::Warn,
        CLI_LogLevel::Info => Verbosity::Info,
        CLI_LogLevel::Debug => Verbosity::Debug,
    }
}

/// resolve a user-passed path argument to an [`EndpointPath`];
/// a bad URI is a usage error so this exits the process
fn cli_process_endpoint(
    arg: Option<&FPath>,
    what: &str,
) -> EndpointPath {
    match EndpointPath::from_arg(arg.map(|fpath| fpath.as_str())) {
        Ok(val) => val,
        Err(err) => {
            e_err!("bad {} path: {}", what, err);
            // usage error, same exit value clap uses
            std::process::exit(2);
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// main
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub fn main() -> ExitCode {
    // a clap parse failure exits 2
    let args: CLI_Args = CLI_Args::parse();
    let verbosity: Verbosity = cli_determine_verbosity(&args);
    set_verbosity(verbosity);
    defo!("args {:?}", args);

    let input: EndpointPath = cli_process_endpoint(args.input.as_ref(), "input");
    let output: EndpointPath = cli_process_endpoint(args.output.as_ref(), "output");

    match extract(&input, &output, args.format) {
        Ok(_events) => {
            defñ!("extract Ok({})", _events);

            ExitCode::from(EXIT_OK)
        }
        Err(err @ ExtractError::FormatUnavailable { .. }) => {
            e_err!("{}", err);

            ExitCode::from(EXIT_FORMAT_UNAVAILABLE)
        }
        Err(err) => {
            e_err!("{}", err);

            ExitCode::from(EXIT_ERR)
        }
    }
}
