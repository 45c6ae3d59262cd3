//! Shared Diesel error mapping for the repository adapters.
//!
//! Every adapter maps pool failures to its `Connection` variant and generic
//! query failures to `Query`. Constraint violations are surfaced through
//! [`constraint_violation`] so each adapter can translate the constraints it
//! owns into domain-specific variants.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map common Diesel error variants into query/connection constructors.
pub fn map_basic_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        _ => query("database error"),
    }
}

/// Constraint class of a database error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
    Check,
}

/// A violated constraint and, when the server reports it, its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstraintViolation<'a> {
    pub kind: ConstraintKind,
    pub name: Option<&'a str>,
}

impl ConstraintViolation<'_> {
    /// Whether the violation concerns the named constraint.
    pub fn is(&self, kind: ConstraintKind, name: &str) -> bool {
        self.kind == kind && self.name == Some(name)
    }
}

/// Classify a Diesel error as a constraint violation, if it is one.
pub fn constraint_violation(error: &DieselError) -> Option<ConstraintViolation<'_>> {
    let DieselError::DatabaseError(kind, info) = error else {
        return None;
    };
    let kind = match kind {
        DatabaseErrorKind::UniqueViolation => ConstraintKind::Unique,
        DatabaseErrorKind::ForeignKeyViolation => ConstraintKind::ForeignKey,
        DatabaseErrorKind::CheckViolation => ConstraintKind::Check,
        _ => return None,
    };
    Some(ConstraintViolation {
        kind,
        name: info.constraint_name(),
    })
}
