//! # Domain Types
//!
//! Core domain types for the challan engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Domain Types                          │
//! │                                                             │
//! │  ShipmentGroup ─── owns ──► DeliveryChallan (1 transit,     │
//! │                             N official)                     │
//! │  DeliveryChallan ─ owns ──► DcLineItem ── owns ──► serial   │
//! │  (unique number)            (qty, paise amounts)   rows     │
//! │                                                             │
//! │  ShipmentParams / ShipmentLineItem: one wizard submission   │
//! │  DcType {Transit, Official} • DcStatus {Draft, Issued}      │
//! │  TaxType {CgstSgst, Igst}   • TaxRate (basis points)        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Identifiers are database rowids (i64). Document numbers are the
//! human-facing business keys and are unique system-wide.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Document Type
// =============================================================================

/// The kind of delivery challan.
///
/// A transit challan travels with the consolidated shipment and carries
/// pricing, transporter details and serial numbers. Official challans are
/// per-destination paperwork without pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum DcType {
    Transit,
    Official,
}

impl DcType {
    /// Storage representation (`transit` / `official`).
    pub const fn as_str(&self) -> &'static str {
        match self {
            DcType::Transit => "transit",
            DcType::Official => "official",
        }
    }

    /// Code used inside document numbers (`TDC` / `ODC`).
    pub const fn code(&self) -> &'static str {
        match self {
            DcType::Transit => "TDC",
            DcType::Official => "ODC",
        }
    }

    /// Parses a document-number code back into a type.
    pub fn from_code(code: &str) -> Option<DcType> {
        match code {
            "TDC" => Some(DcType::Transit),
            "ODC" => Some(DcType::Official),
            _ => None,
        }
    }
}

impl fmt::Display for DcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Document Status
// =============================================================================

/// Lifecycle status of a challan or shipment group.
///
/// Transitions are forward-only: draft → issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum DcStatus {
    Draft,
    Issued,
}

impl Default for DcStatus {
    fn default() -> Self {
        DcStatus::Draft
    }
}

impl DcStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DcStatus::Draft => "draft",
            DcStatus::Issued => "issued",
        }
    }
}

impl fmt::Display for DcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Tax Mode
// =============================================================================

/// GST split mode for a shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum TaxType {
    /// Intra-state: tax split into CGST + SGST halves.
    CgstSgst,
    /// Inter-state: single IGST component.
    Igst,
}

impl Default for TaxType {
    fn default() -> Self {
        TaxType::CgstSgst
    }
}

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (1 bps = 0.01%).
///
/// 1800 bps = 18% GST. Integer basis points keep tax math exact until the
/// single rounding step in [`crate::money::line_amounts`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (form input convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Shipment Group
// =============================================================================

/// One wizard submission: a transit challan plus N official challans
/// shipped together.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ShipmentGroup {
    pub id: i64,
    pub project_id: i64,
    pub template_id: Option<i64>,
    /// Number of destination sets; equals the official-challan count.
    pub num_sets: i64,
    pub tax_type: TaxType,
    pub reverse_charge: bool,
    pub status: DcStatus,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Delivery Challan
// =============================================================================

/// A delivery challan (transit or official).
///
/// `dc_number` is unique across the whole system. `shipment_group_id` is
/// NULL for challans created outside the wizard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DeliveryChallan {
    pub id: i64,
    pub project_id: i64,
    pub dc_number: String,
    pub dc_type: DcType,
    pub status: DcStatus,
    pub template_id: Option<i64>,
    pub bill_to_address_id: Option<i64>,
    pub ship_to_address_id: i64,
    pub challan_date: Option<NaiveDate>,
    pub issued_at: Option<DateTime<Utc>>,
    pub issued_by: Option<i64>,
    pub created_by: i64,
    pub shipment_group_id: Option<i64>,
    pub bill_from_address_id: Option<i64>,
    pub dispatch_from_address_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Transit-specific metadata, one row per transit challan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DcTransitDetails {
    pub id: i64,
    pub dc_id: i64,
    pub transporter_name: String,
    pub vehicle_number: String,
    pub eway_bill_number: String,
    pub notes: String,
}

// =============================================================================
// Line Item
// =============================================================================

/// A product line in a delivery challan.
///
/// Monetary columns are integer paise. Official-challan lines carry zero
/// amounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DcLineItem {
    pub id: i64,
    pub dc_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub rate_paise: i64,
    pub tax_rate_bps: i64,
    pub taxable_paise: i64,
    pub tax_paise: i64,
    pub total_paise: i64,
    /// 1-based ordinal position within the challan.
    pub line_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DcLineItem {
    #[inline]
    pub fn rate(&self) -> Money {
        Money::from_paise(self.rate_paise)
    }

    #[inline]
    pub fn taxable_amount(&self) -> Money {
        Money::from_paise(self.taxable_paise)
    }

    #[inline]
    pub fn tax_amount(&self) -> Money {
        Money::from_paise(self.tax_paise)
    }

    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_paise(self.total_paise)
    }

    #[inline]
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps as u32)
    }
}

/// A serial number tracked per transit line item, unique within a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SerialNumber {
    pub id: i64,
    pub project_id: i64,
    pub line_item_id: i64,
    pub product_id: i64,
    pub serial_number: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Shipment Submission
// =============================================================================

/// Product line input for a shipment submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentLineItem {
    pub product_id: i64,
    /// Units of this product per destination set.
    pub quantity_per_set: i64,
    pub rate: Money,
    pub tax_rate: TaxRate,
    /// Every serial shipped, across all sets. May be empty for products
    /// that are not serial-tracked.
    pub serials: Vec<String>,
    /// ship-to address id → serials assigned to that destination.
    /// Validated against `quantity_per_set`, not persisted per official
    /// challan.
    pub assignments: HashMap<i64, Vec<String>>,
}

/// Everything needed to create a shipment group with its challans.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentParams {
    pub project_id: i64,
    pub template_id: i64,
    pub num_sets: i64,
    /// ISO date string, `2026-01-31`.
    pub challan_date: String,
    pub tax_type: TaxType,
    pub reverse_charge: bool,

    // Transit metadata
    pub transporter_name: String,
    pub vehicle_number: String,
    pub eway_bill_number: String,
    pub docket_number: String,

    // Address references
    pub bill_from_address_id: i64,
    pub dispatch_from_address_id: i64,
    pub bill_to_address_id: i64,
    /// One ship-to per set, in submission order.
    pub ship_to_address_ids: Vec<i64>,
    /// Destination printed on the transit challan; must be one of
    /// `ship_to_address_ids`.
    pub transit_ship_to_address_id: i64,

    pub line_items: Vec<ShipmentLineItem>,
    pub created_by: i64,
}

/// Result of a successful shipment creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentResult {
    pub group_id: i64,
    pub transit_dc: DeliveryChallan,
    pub official_dcs: Vec<DeliveryChallan>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dc_type_codes() {
        assert_eq!(DcType::Transit.code(), "TDC");
        assert_eq!(DcType::Official.code(), "ODC");
        assert_eq!(DcType::from_code("TDC"), Some(DcType::Transit));
        assert_eq!(DcType::from_code("ODC"), Some(DcType::Official));
        assert_eq!(DcType::from_code("XDC"), None);
    }

    #[test]
    fn test_dc_type_storage_strings() {
        assert_eq!(DcType::Transit.to_string(), "transit");
        assert_eq!(DcType::Official.to_string(), "official");
    }

    #[test]
    fn test_status_default_is_draft() {
        assert_eq!(DcStatus::default(), DcStatus::Draft);
    }

    #[test]
    fn test_tax_rate_conversions() {
        let rate = TaxRate::from_percentage(18.0);
        assert_eq!(rate.bps(), 1800);
        assert!((rate.percentage() - 18.0).abs() < 1e-9);
        assert!(TaxRate::zero().is_zero());
    }
}
