//! # Error Types
//!
//! Domain-specific error types for challan-core.
//!
//! ## Error Taxonomies
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  challan-core errors (this file)                            │
//! │  ├── ValidationError  - shipment input failures, named      │
//! │  │                      by field/product/serial             │
//! │  └── ParseError       - malformed document numbers and      │
//! │                         fiscal-year labels                  │
//! │                                                             │
//! │  challan-db errors (separate crate)                         │
//! │  ├── DbError          - storage failures, busy timeouts     │
//! │  └── ShipmentError    - {Validation, SerialConflict,        │
//! │                          Storage} closed set                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation errors are deterministic and recoverable by correcting the
//! input; parse errors are always non-fatal to the caller.

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Shipment-request validation failures.
///
/// Every variant names the offending field, product, serial or destination
/// so operators can fix the submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value must be at least 1.
    #[error("{field} must be at least 1")]
    MustBePositive { field: String },

    /// A date field could not be parsed as `YYYY-MM-DD`.
    #[error("{field} is not a valid date: {value}")]
    InvalidDate { field: String, value: String },

    /// A collection does not have the expected number of elements.
    ///
    /// Used for the destination-count check (`ship_to_address_ids` vs
    /// `num_sets`) and the per-product serial-count check
    /// (`quantity_per_set * num_sets`).
    #[error("{field}: expected {expected}, got {got}")]
    CountMismatch {
        field: String,
        expected: usize,
        got: usize,
    },

    /// The transit ship-to address is not among the selected destinations.
    #[error("transit ship-to address {address_id} must be one of the selected ship-to addresses")]
    TransitDestinationNotSelected { address_id: i64 },

    /// The same serial appears more than once within one line item.
    #[error("duplicate serial '{serial}' for product {product_id}")]
    DuplicateSerial { product_id: i64, serial: String },

    /// A serial assignment references an address that is not a selected
    /// destination.
    #[error("product {product_id}: assignment references unknown destination {address_id}")]
    UnknownAssignmentDestination { product_id: i64, address_id: i64 },

    /// More serials assigned to one destination than fit in a set.
    #[error("product {product_id}: too many serials assigned to destination {address_id} (max {max})")]
    TooManyAssigned {
        product_id: i64,
        address_id: i64,
        max: i64,
    },
}

// =============================================================================
// Parse Error
// =============================================================================

/// Malformed document-number strings and fiscal-year labels.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The string does not match `PREFIX-{TDC|ODC}-FY-SEQ`.
    #[error("invalid document number format: {value}")]
    InvalidNumberFormat { value: String },

    /// The type-code segment is not `TDC` or `ODC`.
    #[error("invalid document type code: {code}")]
    InvalidTypeCode { code: String },

    /// The sequence segment is not a ≥3-digit decimal.
    #[error("invalid sequence number in document number: {value}")]
    InvalidSequence { value: String },

    /// The fiscal-year label is not exactly 4 digits.
    #[error("invalid fiscal year label: {value} (expected 4 digits like '2526')")]
    InvalidFiscalYear { value: String },

    /// The label's end year is not start year + 1.
    #[error("invalid fiscal year: end year must be start year + 1, got {value}")]
    NonConsecutiveFiscalYear { value: String },
}

// =============================================================================
// Core Error
// =============================================================================

/// Umbrella error for challan-core operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Convenience alias for validation results.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::CountMismatch {
            field: "ship_to_address_ids".to_string(),
            expected: 3,
            got: 2,
        };
        assert_eq!(err.to_string(), "ship_to_address_ids: expected 3, got 2");

        let err = ValidationError::DuplicateSerial {
            product_id: 7,
            serial: "SN-001".to_string(),
        };
        assert_eq!(err.to_string(), "duplicate serial 'SN-001' for product 7");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let err = ValidationError::Required {
            field: "challan_date".to_string(),
        };
        let core: CoreError = err.into();
        assert!(matches!(core, CoreError::Validation(_)));
    }

    #[test]
    fn test_parse_error_messages() {
        let err = ParseError::InvalidFiscalYear {
            value: "25261".to_string(),
        };
        assert!(err.to_string().contains("25261"));
    }
}
