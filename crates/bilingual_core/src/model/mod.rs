//! Domain model for bilingual content records.
//!
//! # Invariants
//! - Every record is identified by a stable `RecordId`.
//! - A record's language is derived from its category, never stored.

pub mod record;
