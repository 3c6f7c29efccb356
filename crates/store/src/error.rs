//! Errors returned by the store.
//!
//! - [`InvalidArgument`] is raised before any I/O when a caller passes a value
//!   a query cannot work with (e.g. a blank account name).
//! - [`Overflow`] is raised when summing amounts leaves the `i64` range.
//! - [`Database`] wraps everything the database reports, constraint
//!   violations included. The store never retries or swallows these.
//!
//!  [`InvalidArgument`]: StoreError::InvalidArgument
//!  [`Overflow`]: StoreError::Overflow
//!  [`Database`]: StoreError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Store custom errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Amount overflow: {0}")]
    Overflow(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl StoreError {
    /// Returns `true` when the database rejected a write because of a unique
    /// or foreign key constraint.
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            Self::Database(err) => matches!(
                err.sql_err(),
                Some(
                    sea_orm::SqlErr::UniqueConstraintViolation(_)
                        | sea_orm::SqlErr::ForeignKeyConstraintViolation(_)
                )
            ),
            _ => false,
        }
    }
}

impl PartialEq for StoreError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidArgument(a), Self::InvalidArgument(b)) => a == b,
            (Self::Overflow(a), Self::Overflow(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
