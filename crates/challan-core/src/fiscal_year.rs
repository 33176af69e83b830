//! # Fiscal Year Calculator
//!
//! Maps calendar dates onto the April 1 – March 31 fiscal year and back.
//!
//! Labels are compact 4-digit strings: two-digit start year followed by
//! two-digit end year. April 2025 – March 2026 is `"2526"`. Document-number
//! sequences are keyed by these labels, so crossing April 1 starts a fresh
//! counter.

use chrono::{Datelike, NaiveDate, Utc};

use crate::error::ParseError;

/// Returns the fiscal-year label for a given date.
///
/// January–March belong to the fiscal year that started the previous
/// April; April–December belong to the fiscal year starting that year.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use challan_core::fiscal_year::fiscal_year;
///
/// let d = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
/// assert_eq!(fiscal_year(d), "2526");
///
/// let d = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
/// assert_eq!(fiscal_year(d), "2526");
/// ```
pub fn fiscal_year(date: NaiveDate) -> String {
    let year = date.year();
    let start_year = if date.month() >= 4 { year } else { year - 1 };
    let end_year = start_year + 1;

    format!("{:02}{:02}", start_year % 100, end_year % 100)
}

/// Returns the fiscal-year label for today.
pub fn current_fiscal_year() -> String {
    fiscal_year(Utc::now().date_naive())
}

/// Returns April 1 of the given fiscal-year start year.
pub fn fiscal_year_start(start_year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(start_year, 4, 1).expect("April 1 is a valid date")
}

/// Returns March 31 of the year following the given start year.
pub fn fiscal_year_end(start_year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(start_year + 1, 3, 31).expect("March 31 is a valid date")
}

/// Parses a compact label like `"2526"` into (start_year, end_year).
///
/// Years are 2000-based. Rejects labels of the wrong length, non-digit
/// labels, and labels whose end year is not start year + 1.
pub fn parse_fiscal_year(label: &str) -> Result<(i32, i32), ParseError> {
    if label.len() != 4 || !label.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidFiscalYear {
            value: label.to_string(),
        });
    }

    let sy: i32 = label[..2].parse().expect("checked digits");
    let ey: i32 = label[2..].parse().expect("checked digits");

    let start_year = 2000 + sy;
    let end_year = 2000 + ey;

    if end_year != start_year + 1 {
        return Err(ParseError::NonConsecutiveFiscalYear {
            value: label.to_string(),
        });
    }

    Ok((start_year, end_year))
}

/// Returns the (start, end) dates covered by a fiscal-year label.
///
/// Used by report date filters: `"2526"` → (2025-04-01, 2026-03-31).
pub fn fiscal_year_bounds(label: &str) -> Result<(NaiveDate, NaiveDate), ParseError> {
    let (start_year, _) = parse_fiscal_year(label)?;
    Ok((fiscal_year_start(start_year), fiscal_year_end(start_year)))
}

// =============================================================================
// Unit Tests
// =============================================================================
