// src/data/mod.rs

//! The `data` module is specialized data containers; currently only
//! [`Event`]s.
//!
//! ## Definitions of data
//!
//! ### Event
//!
//! An `Event` is one decoded journal record: an index-time epoch timestamp,
//! references into the three metadata dictionaries (host, source,
//! sourcetype), the raw message payload exactly as stored, and any key/value
//! pairs that trailed the event on the wire.
//!
//! [`Event`]: crate::data::event::Event

pub mod event;
