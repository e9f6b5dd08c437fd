//! Core data access for Roster, a local student record store.
//! This crate owns the store schema, the shared connection and the
//! student repository.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod repo;

pub use config::{StoreConfig, StoreLocation};
pub use db::{ConnectionManager, ConnectionState, SharedConnection};
pub use error::{StoreError, StoreResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::dto::StudentDto;
pub use model::student::{Registration, Student, StudentValidationError};
pub use repo::student_repo::{SqliteStudentRepository, StudentRepository};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
