//! Content store abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the store capability the link registry and site adapter need.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Record writes must enforce `ContentRecord::validate()` before persistence.
//! - Metadata writes never require the annotated record to exist.
//! - `atomically` either applies every write made by its closure or none.

pub mod memory_repo;
pub mod record_repo;
