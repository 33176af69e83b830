//! # Document Number Codec
//!
//! Formats and parses delivery-challan numbers.
//!
//! The canonical shape is `PREFIX-{TDC|ODC}-FY-SEQ`:
//!
//! ```text
//! SCP-TDC-2526-001
//! │   │   │    └── sequence, zero-padded to ≥3 digits (widens past 999)
//! │   │   └────── fiscal-year label ("2526" = Apr 2025 – Mar 2026)
//! │   └────────── type code: TDC transit, ODC official
//! └────────────── project prefix (may itself contain '-' or '/')
//! ```
//!
//! Because the prefix may contain hyphens, parsing anchors on the LAST
//! three `-`-delimited segments instead of the first.
//!
//! Projects may also configure a token template (`{PREFIX}`,
//! `{PROJECT_CODE}`, `{FY}`, `{TYPE}`, `{SEQ}`) with custom sequence
//! padding; only the canonical template is guaranteed to round-trip
//! through [`parse_dc_number`].

use crate::error::ParseError;
use crate::fiscal_year::current_fiscal_year;
use crate::types::DcType;
use crate::{DEFAULT_NUMBER_FORMAT, DEFAULT_SEQ_PADDING};

// =============================================================================
// Parsed Parts
// =============================================================================

/// The components of a parsed document number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DcNumberParts {
    pub prefix: String,
    pub fiscal_year: String,
    pub dc_type: DcType,
    pub sequence: i64,
}

/// A project's configurable number-format settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberFormat {
    /// Token template, e.g. `{PREFIX}/{PROJECT_CODE}/{FY}/{SEQ}`.
    pub format: String,
    /// Zero-padding for the sequence segment.
    pub padding: usize,
}

impl Default for NumberFormat {
    fn default() -> Self {
        NumberFormat {
            format: DEFAULT_NUMBER_FORMAT.to_string(),
            padding: DEFAULT_SEQ_PADDING,
        }
    }
}

// =============================================================================
// Formatting
// =============================================================================

/// Formats a document number in the canonical shape.
///
/// ## Example
/// ```rust
/// use challan_core::number::format_dc_number;
/// use challan_core::types::DcType;
///
/// assert_eq!(format_dc_number("SCP", "2425", DcType::Transit, 1), "SCP-TDC-2425-001");
/// assert_eq!(format_dc_number("PWD/AP", "2526", DcType::Official, 12), "PWD/AP-ODC-2526-012");
/// ```
pub fn format_dc_number(prefix: &str, fiscal_year: &str, dc_type: DcType, sequence: i64) -> String {
    format!("{}-{}-{}-{:03}", prefix, dc_type.code(), fiscal_year, sequence)
}

/// Formats a document number using a project's token template.
///
/// An empty template falls back to the canonical one; padding below 1
/// falls back to the default. `{FY}` renders dashed ("25-26") in custom
/// templates.
pub fn format_configurable(
    format: &str,
    prefix: &str,
    project_code: &str,
    fiscal_year: &str,
    dc_type: DcType,
    sequence: i64,
    padding: usize,
) -> String {
    let format = if format.is_empty() {
        DEFAULT_NUMBER_FORMAT
    } else {
        format
    };
    let padding = if padding < 1 {
        DEFAULT_SEQ_PADDING
    } else {
        padding
    };

    let seq = format!("{:0width$}", sequence, width = padding);
    let fy_dashed = if fiscal_year.len() == 4 {
        format!("{}-{}", &fiscal_year[..2], &fiscal_year[2..])
    } else {
        fiscal_year.to_string()
    };

    format
        .replace("{PREFIX}", prefix)
        .replace("{PROJECT_CODE}", project_code)
        .replace("{FY}", &fy_dashed)
        .replace("{SEQ}", &seq)
        .replace("{TYPE}", dc_type.code())
}

/// Renders what a configured format would produce, for the settings page.
///
/// Uses the current fiscal year, transit type and sequence 1.
pub fn preview_dc_number(format: &str, prefix: &str, project_code: &str, padding: usize) -> String {
    let fy = current_fiscal_year();
    format_configurable(format, prefix, project_code, &fy, DcType::Transit, 1, padding)
}

/// Renders a number with a project's settings, using the canonical
/// formatter when the template is the default one.
///
/// The canonical path keeps default-format numbers parseable; custom
/// templates are display-only.
pub fn format_with(
    settings: &NumberFormat,
    prefix: &str,
    fiscal_year: &str,
    dc_type: DcType,
    sequence: i64,
) -> String {
    if settings.format.is_empty() || settings.format == DEFAULT_NUMBER_FORMAT {
        format_dc_number(prefix, fiscal_year, dc_type, sequence)
    } else {
        format_configurable(
            &settings.format,
            prefix,
            prefix,
            fiscal_year,
            dc_type,
            sequence,
            settings.padding,
        )
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Parses a canonical document number into its components.
///
/// Splits from the right so prefixes containing `-` or `/` survive:
/// the last three segments are sequence, fiscal year and type code;
/// everything before them is the prefix.
///
/// ## Example
/// ```rust
/// use challan_core::number::parse_dc_number;
/// use challan_core::types::DcType;
///
/// let parts = parse_dc_number("PWD/AP-ODC-2526-012").unwrap();
/// assert_eq!(parts.prefix, "PWD/AP");
/// assert_eq!(parts.dc_type, DcType::Official);
/// assert_eq!(parts.fiscal_year, "2526");
/// assert_eq!(parts.sequence, 12);
/// ```
pub fn parse_dc_number(value: &str) -> Result<DcNumberParts, ParseError> {
    let invalid = || ParseError::InvalidNumberFormat {
        value: value.to_string(),
    };

    // rsplitn yields segments right-to-left: SEQ, FY, TYPE, PREFIX-rest.
    let mut segments = value.rsplitn(4, '-');
    let seq_raw = segments.next().ok_or_else(invalid)?;
    let fy_raw = segments.next().ok_or_else(invalid)?;
    let code_raw = segments.next().ok_or_else(invalid)?;
    let prefix = segments.next().ok_or_else(invalid)?;

    if prefix.is_empty()
        || !prefix
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'/' || b == b'-')
    {
        return Err(invalid());
    }

    let dc_type = DcType::from_code(code_raw).ok_or_else(|| ParseError::InvalidTypeCode {
        code: code_raw.to_string(),
    })?;

    if fy_raw.len() != 4 || !fy_raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidFiscalYear {
            value: fy_raw.to_string(),
        });
    }

    if seq_raw.len() < 3 || !seq_raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidSequence {
            value: seq_raw.to_string(),
        });
    }
    let sequence: i64 = seq_raw.parse().map_err(|_| ParseError::InvalidSequence {
        value: seq_raw.to_string(),
    })?;

    Ok(DcNumberParts {
        prefix: prefix.to_string(),
        fiscal_year: fy_raw.to_string(),
        dc_type,
        sequence,
    })
}

/// Checks whether a string is a well-formed canonical document number.
pub fn is_valid_dc_number(value: &str) -> bool {
    parse_dc_number(value).is_ok()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_literals() {
        assert_eq!(
            format_dc_number("SCP", "2425", DcType::Transit, 1),
            "SCP-TDC-2425-001"
        );
        assert_eq!(
            format_dc_number("PWD/AP", "2526", DcType::Official, 12),
            "PWD/AP-ODC-2526-012"
        );
    }

    #[test]
    fn test_format_wide_sequences() {
        assert_eq!(
            format_dc_number("SCP", "2526", DcType::Transit, 999),
            "SCP-TDC-2526-999"
        );
        // Past 999 the sequence widens, never truncates.
        assert_eq!(
            format_dc_number("SCP", "2526", DcType::Transit, 1000),
            "SCP-TDC-2526-1000"
        );
        assert_eq!(
            format_dc_number("SCP", "2526", DcType::Transit, 12345),
            "SCP-TDC-2526-12345"
        );
    }

    #[test]
    fn test_parse_basic() {
        let parts = parse_dc_number("SCP-TDC-2526-001").unwrap();
        assert_eq!(parts.prefix, "SCP");
        assert_eq!(parts.dc_type, DcType::Transit);
        assert_eq!(parts.fiscal_year, "2526");
        assert_eq!(parts.sequence, 1);
    }

    #[test]
    fn test_parse_prefix_with_slash_and_hyphen() {
        let parts = parse_dc_number("PWD/AP-ODC-2526-012").unwrap();
        assert_eq!(parts.prefix, "PWD/AP");

        let parts = parse_dc_number("AB-CD-TDC-2425-100").unwrap();
        assert_eq!(parts.prefix, "AB-CD");
        assert_eq!(parts.dc_type, DcType::Transit);
        assert_eq!(parts.sequence, 100);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse_dc_number("").is_err());
        assert!(parse_dc_number("SCP").is_err());
        assert!(parse_dc_number("SCP-TDC-2526").is_err());
        assert!(parse_dc_number("-TDC-2526-001").is_err());

        // Bad type code
        assert!(matches!(
            parse_dc_number("SCP-XDC-2526-001"),
            Err(ParseError::InvalidTypeCode { .. })
        ));

        // Bad fiscal year
        assert!(parse_dc_number("SCP-TDC-256-001").is_err());
        assert!(parse_dc_number("SCP-TDC-25a6-001").is_err());

        // Bad sequence
        assert!(parse_dc_number("SCP-TDC-2526-01").is_err());
        assert!(parse_dc_number("SCP-TDC-2526-0a1").is_err());

        // Bad prefix characters
        assert!(parse_dc_number("S P-TDC-2526-001").is_err());
        assert!(parse_dc_number("S_P-TDC-2526-001").is_err());
    }

    #[test]
    fn test_round_trip() {
        let cases = [
            ("SCP", "2425", DcType::Transit, 1),
            ("SCP", "2526", DcType::Official, 999),
            ("PWD/AP", "2526", DcType::Official, 12),
            ("AB-CD/EF", "9900", DcType::Transit, 123_456),
        ];

        for (prefix, fy, dc_type, seq) in cases {
            let formatted = format_dc_number(prefix, fy, dc_type, seq);
            let parts = parse_dc_number(&formatted).unwrap();
            assert_eq!(parts.prefix, prefix);
            assert_eq!(parts.fiscal_year, fy);
            assert_eq!(parts.dc_type, dc_type);
            assert_eq!(parts.sequence, seq);
        }
    }

    #[test]
    fn test_is_valid() {
        assert!(is_valid_dc_number("SCP-TDC-2526-001"));
        assert!(!is_valid_dc_number("garbage"));
    }

    #[test]
    fn test_configurable_format() {
        let number = format_configurable(
            "{PREFIX}/{PROJECT_CODE}/{FY}/{SEQ}",
            "SCP",
            "SCP",
            "2526",
            DcType::Transit,
            7,
            4,
        );
        assert_eq!(number, "SCP/SCP/25-26/0007");

        // Empty template falls back to the canonical shape (dashed FY).
        let number = format_configurable("", "SCP", "SCP", "2526", DcType::Transit, 7, 0);
        assert_eq!(number, "SCP-TDC-25-26-007");
    }

    #[test]
    fn test_format_with_default_settings_round_trips() {
        let settings = NumberFormat::default();
        let number = format_with(&settings, "SCP", "2526", DcType::Official, 42);
        assert_eq!(number, "SCP-ODC-2526-042");
        assert!(is_valid_dc_number(&number));
    }

    #[test]
    fn test_format_with_custom_settings() {
        let settings = NumberFormat {
            format: "{PROJECT_CODE}/{TYPE}/{FY}/{SEQ}".to_string(),
            padding: 5,
        };
        let number = format_with(&settings, "SCP", "2526", DcType::Transit, 3);
        assert_eq!(number, "SCP/TDC/25-26/00003");
    }
}
