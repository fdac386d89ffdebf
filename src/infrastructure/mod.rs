pub mod billing_repo;
pub mod catalog_repo;
pub mod checkin_repo;
pub mod issuance_repo;
pub mod models;
pub mod notifier;
pub mod order_repo;
pub mod payment_repo;
pub mod phonepe;

#[cfg(test)]
pub(crate) mod test_support;

use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::domain::errors::DomainError;

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<DieselError> for DomainError {
    fn from(e: DieselError) -> Self {
        match e {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                log::warn!(
                    "Unique violation on {}: {}",
                    info.constraint_name().unwrap_or("unknown constraint"),
                    info.message()
                );
                DomainError::Conflict("record already exists".to_string())
            }
            other => DomainError::Internal(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<reqwest::Error> for DomainError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            DomainError::Upstream("payment gateway timed out".to_string())
        } else {
            DomainError::Upstream(e.to_string())
        }
    }
}

/// Name of the constraint behind a unique violation, if that is what `e` is.
pub(crate) fn violated_constraint(e: &DieselError) -> Option<&str> {
    match e {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            info.constraint_name()
        }
        _ => None,
    }
}
