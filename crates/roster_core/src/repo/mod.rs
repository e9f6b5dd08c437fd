//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the async data access contract for student records.
//! - Isolate SQLite statements and transactions from callers.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `Duplicate`) in
//!   addition to store transport errors.

pub mod student_repo;
