// src/debug/printers.rs

//! Macros for printing messages to stderr.
//!
//! The `e_*` macros print in all builds, gated at runtime by the process-wide
//! [`Verbosity`] (set once by the CLI from `-l`/`-v`/`-q`).
//! The `de_*` macros only print in debug and test builds.

use std::sync::atomic::{AtomicU8, Ordering};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// runtime verbosity
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// How much the `e_*` macros print. Each level includes the ones above it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Verbosity {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
}

impl std::fmt::Display for Verbosity {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter,
    ) -> std::fmt::Result {
        match self {
            Verbosity::Error => write!(f, "error"),
            Verbosity::Warn => write!(f, "warn"),
            Verbosity::Info => write!(f, "info"),
            Verbosity::Debug => write!(f, "debug"),
        }
    }
}

/// process-wide level checked by `e_inf!` and `e_dbg!`; default `Info`
static VERBOSITY: AtomicU8 = AtomicU8::new(Verbosity::Info as u8);

/// Set the process-wide [`Verbosity`]. Intended to be called once,
/// from the CLI, before any extraction begins.
pub fn set_verbosity(level: Verbosity) {
    VERBOSITY.store(level as u8, Ordering::Relaxed);
}

/// The current process-wide [`Verbosity`].
pub fn verbosity() -> Verbosity {
    match VERBOSITY.load(Ordering::Relaxed) {
        0 => Verbosity::Error,
        1 => Verbosity::Warn,
        2 => Verbosity::Info,
        _ => Verbosity::Debug,
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// always-on printers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `e`println! an `err`or
#[macro_export]
macro_rules! e_err {
    (
        $($args:tt)*
    ) => {
        {
            eprint!("ERROR: ");
            eprintln!($($args)*)
        }
    }
}
pub use e_err;

/// `e`println! a `wrn`ing
#[macro_export]
macro_rules! e_wrn {
    (
        $($args:tt)*
    ) => {
        {
            if $crate::debug::printers::verbosity() >= $crate::debug::printers::Verbosity::Warn {
                eprint!("WARNING: ");
                eprintln!($($args)*);
            }
        }
    }
}
pub use e_wrn;

/// `e`println! an `inf`ormational message
#[macro_export]
macro_rules! e_inf {
    (
        $($args:tt)*
    ) => {
        {
            if $crate::debug::printers::verbosity() >= $crate::debug::printers::Verbosity::Info {
                eprint!("INFO: ");
                eprintln!($($args)*);
            }
        }
    }
}
pub use e_inf;

/// `e`println! a `d`e`b`u`g` message
#[macro_export]
macro_rules! e_dbg {
    (
        $($args:tt)*
    ) => {
        {
            if $crate::debug::printers::verbosity() >= $crate::debug::printers::Verbosity::Debug {
                eprint!("DEBUG: ");
                eprintln!($($args)*);
            }
        }
    }
}
pub use e_dbg;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// debug-build printers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `d`ebug `e`println! an `err`or
#[macro_export]
macro_rules! de_err {
    (
        $($args:tt)*
    ) => {
        {
            #[cfg(any(debug_assertions,test))]
            eprint!("ERROR: ");
            #[cfg(any(debug_assertions,test))]
            eprintln!($($args)*)
        }
    }
}
pub use de_err;

/// `d`ebug `e`println! a `wrn`ing
#[macro_export]
macro_rules! de_wrn {
    (
        $($args:tt)*
    ) => {
        {
            #[cfg(any(debug_assertions,test))]
            eprint!("WARNING: ");
            #[cfg(any(debug_assertions,test))]
            eprintln!($($args)*)
        }
    }
}
pub use de_wrn;
