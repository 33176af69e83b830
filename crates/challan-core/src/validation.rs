//! # Shipment Validation
//!
//! Pre-transaction validation of shipment submissions.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Layer 1: THIS MODULE (pure, fail-fast)                     │
//! │  ├── shape: sets, date, destination count, membership       │
//! │  └── serial semantics: counts, duplicates, assignments      │
//! │           │                                                 │
//! │  Layer 2: challan-db (read-only query)                      │
//! │  └── cross-shipment serial uniqueness in the project        │
//! │           │                                                 │
//! │  Layer 3: SQLite constraints inside the transaction         │
//! │  └── UNIQUE / FOREIGN KEY as the last line                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing is written while any layer here fails; errors name the
//! offending field, product, serial or destination.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::error::{ValidationError, ValidationResult};
use crate::types::ShipmentParams;
use crate::CHALLAN_DATE_FORMAT;

/// Validates a shipment submission's shape and serial semantics.
///
/// Checks run in a fixed order and stop at the first failure:
/// 1. `num_sets` ≥ 1
/// 2. challan date present and ISO-parseable
/// 3. one ship-to address per set
/// 4. the transit ship-to is among the selected ship-tos
/// 5. at least one line item, each with a positive quantity per set
/// 6. per line item: supplied serials (if any) count exactly
///    `quantity_per_set * num_sets` with no duplicates, and every
///    destination assignment stays within `quantity_per_set` and
///    references a selected ship-to
pub fn validate_shipment(params: &ShipmentParams) -> ValidationResult<()> {
    if params.num_sets < 1 {
        return Err(ValidationError::MustBePositive {
            field: "num_sets".to_string(),
        });
    }

    if params.challan_date.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "challan_date".to_string(),
        });
    }
    parse_challan_date(&params.challan_date)?;

    if params.ship_to_address_ids.len() != params.num_sets as usize {
        return Err(ValidationError::CountMismatch {
            field: "ship_to_address_ids".to_string(),
            expected: params.num_sets as usize,
            got: params.ship_to_address_ids.len(),
        });
    }

    let destinations: HashSet<i64> = params.ship_to_address_ids.iter().copied().collect();
    if !destinations.contains(&params.transit_ship_to_address_id) {
        return Err(ValidationError::TransitDestinationNotSelected {
            address_id: params.transit_ship_to_address_id,
        });
    }

    if params.line_items.is_empty() {
        return Err(ValidationError::Required {
            field: "line_items".to_string(),
        });
    }

    for item in &params.line_items {
        if item.quantity_per_set < 1 {
            return Err(ValidationError::MustBePositive {
                field: format!("line_items[{}].quantity_per_set", item.product_id),
            });
        }

        validate_serials(item, params.num_sets, &destinations)?;
    }

    Ok(())
}

/// Parses a challan date in ISO format.
pub fn parse_challan_date(value: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(value, CHALLAN_DATE_FORMAT).map_err(|_| {
        ValidationError::InvalidDate {
            field: "challan_date".to_string(),
            value: value.to_string(),
        }
    })
}

fn validate_serials(
    item: &crate::types::ShipmentLineItem,
    num_sets: i64,
    destinations: &HashSet<i64>,
) -> ValidationResult<()> {
    // Serial tracking is optional per product; an empty list skips the
    // count check entirely.
    if !item.serials.is_empty() {
        let expected = (item.quantity_per_set * num_sets) as usize;
        if item.serials.len() != expected {
            return Err(ValidationError::CountMismatch {
                field: format!("serials[{}]", item.product_id),
                expected,
                got: item.serials.len(),
            });
        }

        let mut seen = HashSet::with_capacity(item.serials.len());
        for serial in &item.serials {
            if !seen.insert(serial.as_str()) {
                return Err(ValidationError::DuplicateSerial {
                    product_id: item.product_id,
                    serial: serial.clone(),
                });
            }
        }
    }

    for (&address_id, assigned) in &item.assignments {
        if !destinations.contains(&address_id) {
            return Err(ValidationError::UnknownAssignmentDestination {
                product_id: item.product_id,
                address_id,
            });
        }
        if assigned.len() as i64 > item.quantity_per_set {
            return Err(ValidationError::TooManyAssigned {
                product_id: item.product_id,
                address_id,
                max: item.quantity_per_set,
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
