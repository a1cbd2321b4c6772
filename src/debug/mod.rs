// src/debug/mod.rs

//! The `debug` module is macros and helpers for printing to stderr in
//! release, debug, and test builds.

pub mod printers;
