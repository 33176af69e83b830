//! # Database Error Types
//!
//! Error types for storage operations and the shipment orchestrator.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  SQLite error (sqlx::Error)                                 │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  DbError ← categorized: busy, constraint, not-found, ...    │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  ShipmentError ← closed set callers can branch on:          │
//! │    Validation | SerialConflict | Storage                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation and conflict errors are recoverable by correcting input;
//! storage errors are opaque and the caller's only recourse is resubmit.

use thiserror::Error;

use challan_core::error::ValidationError;

/// SQLite extended error message for a held write lock.
const SQLITE_BUSY_MESSAGE: &str = "database is locked";

// =============================================================================
// DbError
// =============================================================================

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation (duplicate document number, duplicate
    /// serial within a project).
    #[error("duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// The write lock was held past the busy timeout.
    ///
    /// The transaction was rolled back; callers must resubmit.
    #[error("storage busy: write lock not acquired within the timeout")]
    Busy,

    /// Connection pool exhausted (all connections in use).
    #[error("connection pool exhausted")]
    PoolExhausted,

    /// Database connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Document is not in draft status, so the operation is refused.
    #[error("document {id} is not a draft")]
    NotDraft { id: i64 },

    /// Document has no line items, so it cannot be issued.
    #[error("document {id} has no line items")]
    NoLineItems { id: i64 },

    /// A transit line item does not have one serial per unit.
    #[error("line item {line_item_id}: serial count {got} does not match quantity {expected}")]
    SerialCountMismatch {
        line_item_id: i64,
        expected: i64,
        got: i64,
    },

    /// The project has no document-number prefix configured.
    #[error("project {0} has no document number prefix set")]
    PrefixNotSet(i64),

    /// Internal database error.
    #[error("internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and id.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// SQLite constraint failures arrive as database errors whose message
/// carries the constraint kind; SQLITE_BUSY (the bounded write-lock wait
/// expiring) maps to [`DbError::Busy`].
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                if msg.contains(SQLITE_BUSY_MESSAGE) {
                    DbError::Busy
                } else if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// ShipmentError
// =============================================================================

/// Errors from the shipment orchestrator, as a closed set callers can
/// branch on without substring-matching messages.
#[derive(Debug, Error)]
pub enum ShipmentError {
    /// Deterministic input failure (steps 1–2); nothing was written.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A supplied serial already exists in the project (step 3); nothing
    /// was written. Names the serial and its owning document.
    #[error("serial '{serial}' already exists on {dc_number}")]
    SerialConflict {
        serial: String,
        dc_number: String,
        product_name: String,
    },

    /// Transactional failure (steps 4–9); every write was rolled back,
    /// including sequence allocations. Resubmit the whole request.
    #[error("storage error: {0}")]
    Storage(#[from] DbError),
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = DbError::not_found("Project", 42);
        assert_eq!(err.to_string(), "Project not found: 42");

        let err = DbError::SerialCountMismatch {
            line_item_id: 3,
            expected: 6,
            got: 5,
        };
        assert!(err.to_string().contains("serial count 5"));
    }

    #[test]
    fn test_validation_wraps_into_shipment_error() {
        let err = ValidationError::Required {
            field: "challan_date".to_string(),
        };
        let wrapped: ShipmentError = err.into();
        assert!(matches!(wrapped, ShipmentError::Validation(_)));
    }

    #[test]
    fn test_busy_message() {
        assert_eq!(
            DbError::Busy.to_string(),
            "storage busy: write lock not acquired within the timeout"
        );
    }
}
