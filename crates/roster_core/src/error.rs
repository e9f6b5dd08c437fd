//! Error signal surfaced by the connection manager and data access layer.
//!
//! # Responsibility
//! - Classify store failures into the categories callers act on.
//! - Carry a human-readable message for every failure.
//!
//! # Invariants
//! - `StoreError` is `Clone`, so a cached open failure can be handed to
//!   every caller unchanged.
//! - Absence on lookup is never an error; absence on mutation is `NotFound`.

use crate::db::DbError;
use crate::model::student::StudentValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure reported by store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be opened. Cached for the lifetime of the manager.
    Open { message: String },
    /// Transaction, table or index could not be set up for an operation.
    TransactionSetup(String),
    /// Update/delete target does not exist.
    NotFound { registration: String },
    /// Create rejected by the unique registration index.
    Duplicate { registration: String },
    /// Any other failure while executing a statement.
    Db(String),
    /// A stored row could not be turned back into a valid record.
    InvalidData(String),
}

impl StoreError {
    /// Human-readable description of the failure.
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub(crate) fn open(err: impl Display) -> Self {
        Self::Open {
            message: err.to_string(),
        }
    }

    /// Stable machine-readable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Open { .. } => "db_open_failed",
            Self::TransactionSetup(_) => "tx_setup_failed",
            Self::NotFound { .. } => "not_found",
            Self::Duplicate { .. } => "duplicate_registration",
            Self::Db(_) => "db_error",
            Self::InvalidData(_) => "invalid_data",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { message } => write!(f, "unable to open student store: {message}"),
            Self::TransactionSetup(message) => {
                write!(f, "unable to prepare student transaction: {message}")
            }
            Self::NotFound { registration } => {
                write!(f, "student with registration {registration} not found")
            }
            Self::Duplicate { registration } => {
                write!(f, "student with registration {registration} already exists")
            }
            Self::Db(message) => write!(f, "student store error: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted student data: {message}"),
        }
    }
}

impl Error for StoreError {}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::open(value)
    }
}

impl From<StudentValidationError> for StoreError {
    fn from(value: StudentValidationError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::StoreError;
    use crate::db::DbError;

    #[test]
    fn not_found_message_names_the_registration() {
        let err = StoreError::NotFound {
            registration: "2023009".to_string(),
        };
        assert_eq!(err.message(), "student with registration 2023009 not found");
        assert_eq!(err.code(), "not_found");
    }

    #[test]
    fn db_errors_fold_into_open_failures() {
        let err = StoreError::from(DbError::UnsupportedSchemaVersion {
            db_version: 7,
            latest_supported: 1,
        });
        match err {
            StoreError::Open { message } => assert!(message.contains("newer than supported")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
