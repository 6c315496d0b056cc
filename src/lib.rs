//! Application wizard and validation engine for diversity-visa lottery
//! entries: a six-step form state machine with per-field and cross-field
//! validation, a partitioned dependent roster, Ethiopian/Gregorian calendar
//! conversion, debounced draft persistence, and a mailbox-based photo-capture
//! handoff to a separate cropping view.

pub mod calendar;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod wizard;
