//! Student domain model and its transfer projection.
//!
//! # Responsibility
//! - Define the record shape the store persists and returns.
//! - Provide a read-only projection for hand-off outside the core.
//!
//! # Invariants
//! - Every persisted record is identified by its `registration` business key.

pub mod dto;
pub mod student;
