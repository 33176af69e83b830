//! # challan-core: Pure Business Logic for the Challan Engine
//!
//! This crate is the I/O-free heart of the delivery-challan system. It owns
//! the fiscal-year calculator, the document-number codec, money/tax
//! arithmetic and shipment-request validation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Challan Engine Layers                     │
//! │                                                             │
//! │  Handlers / exports (out of scope for this workspace)       │
//! │       │                                                     │
//! │  ┌────▼───────────────────────────────────────────────┐     │
//! │  │            ★ challan-core (THIS CRATE) ★           │     │
//! │  │                                                    │     │
//! │  │  fiscal_year   number    money    validation       │     │
//! │  │  Apr–Mar FY    codec     paise    shipment rules   │     │
//! │  │                                                    │     │
//! │  │  NO I/O • NO DATABASE • PURE FUNCTIONS             │     │
//! │  └────┬───────────────────────────────────────────────┘     │
//! │       │                                                     │
//! │  ┌────▼───────────────────────────────────────────────┐     │
//! │  │         challan-db (sequences, shipment txn)       │     │
//! │  └────────────────────────────────────────────────────┘     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: same input, same output; everything here is
//!    testable without a database.
//! 2. **Integer money**: all monetary values are paise (i64), never floats
//!    past the input boundary.
//! 3. **Explicit errors**: typed enums via `thiserror`, never strings.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod fiscal_year;
pub mod money;
pub mod number;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ParseError, ValidationError};
pub use money::{line_amounts, LineAmounts, Money};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default zero-padding width for the sequence segment of a document number.
///
/// `1` renders as `001`; sequences past 999 widen instead of truncating.
pub const DEFAULT_SEQ_PADDING: usize = 3;

/// Date format accepted for challan dates (ISO, `2026-01-31`).
pub const CHALLAN_DATE_FORMAT: &str = "%Y-%m-%d";

/// Default document-number template: `PREFIX-TDC-2526-001`.
pub const DEFAULT_NUMBER_FORMAT: &str = "{PREFIX}-{TYPE}-{FY}-{SEQ}";
