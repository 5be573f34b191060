//! # Validation Module
//!
//! Input validation utilities for Racedesk.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Admin frontend (TypeScript)                                  │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (called by the repositories)                     │
//! │  ├── Required fields, lengths, ranges                                  │
//! │  ├── Strict calendar dates                                             │
//! │  └── The empty-replacement guard                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / UNIQUE constraints                                     │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{CoreError, CoreResult, ValidationError};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length for names and labels.
pub const MAX_NAME_LEN: usize = 200;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required name/label field and returns it trimmed.
///
/// ## Example
/// ```rust
/// use racedesk_core::validation::validate_name;
///
/// assert_eq!(validate_name("name", "  Night Trail 10K ").unwrap(), "Night Trail 10K");
/// assert!(validate_name("name", "   ").is_err());
/// ```
pub fn validate_name(field: &'static str, value: &str) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required { field });
    }

    if value.len() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_NAME_LEN,
        });
    }

    Ok(value.to_string())
}

/// Trims an optional text field, mapping blank to `None`.
pub fn clean_optional(value: Option<&str>) -> Option<String> {
    match value {
        None => None,
        Some(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        }
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a counter (quantity, photos, downloads). Zero is fine;
/// negative is not.
pub fn validate_count(field: &'static str, value: i64) -> ValidationResult<i64> {
    if value < 0 {
        return Err(ValidationError::Negative { field });
    }
    Ok(value)
}

// =============================================================================
// Dates
// =============================================================================

/// Strict calendar-date pattern. The pattern gates the shape; chrono gates
/// whether the day actually exists.
static ISO_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern is valid")
});

/// Parses a strict `YYYY-MM-DD` string into a calendar date.
///
/// ## Example
/// ```rust
/// use racedesk_core::validation::parse_iso_date;
///
/// assert!(parse_iso_date("2026-03-15").is_ok());
/// assert!(parse_iso_date("2026-3-15").is_err());  // shape
/// assert!(parse_iso_date("2026-02-30").is_err()); // not a real day
/// ```
pub fn parse_iso_date(raw: &str) -> CoreResult<NaiveDate> {
    if !ISO_DATE.is_match(raw) {
        return Err(CoreError::InvalidDate(raw.to_string()));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| CoreError::InvalidDate(raw.to_string()))
}

/// Parses a strict date string into a midnight timestamp, the form ledger
/// movements are stored in.
pub fn parse_iso_date_midnight(raw: &str) -> CoreResult<NaiveDateTime> {
    Ok(parse_iso_date(raw)?.and_time(NaiveTime::MIN))
}

// =============================================================================
// Replacement Guard
// =============================================================================

/// The empty-replacement safety rule: replacing a non-empty child set with
/// an empty one is treated as a caller mistake and rejected. Wiping data on
/// purpose goes through delete, not through replace.
pub fn guard_replacement(existing: usize, incoming: usize) -> CoreResult<()> {
    if existing > 0 && incoming == 0 {
        return Err(CoreError::EmptyReplacementGuard { existing });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
