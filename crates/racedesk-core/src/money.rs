//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely, plus the
//! codec that turns free-form localized numeric strings into exact cents.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    "$10.99" is 1099 cents, end to end: database, totals, API.           │
//! │    Only the UI ever formats it back to a decimal string.                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Localized Parsing Problem
//! Admin users type amounts the way their locale taught them:
//! `"1.234,56"` and `"1,234.56"` both mean 123456 cents. The codec treats
//! the RIGHT-MOST `.` or `,` as the decimal separator and ignores every
//! other separator, so both styles parse to the same value. Malformed input
//! parses to zero instead of failing; the caller decides whether zero is
//! acceptable where the value was mandatory.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for refunds and losses
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Currency-agnostic**: ARS and USD amounts are both plain cents; the
///   row that carries the amount says which bucket it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Parses a free-form localized amount string into cents.
    ///
    /// ## Rules
    /// - Everything except digits, `.` and `,` is stripped; a leading `-`
    ///   is the sign
    /// - The right-most `.` or `,` is the decimal separator; all other
    ///   separators are grouping noise
    /// - The fraction is padded/truncated to exactly 2 digits
    /// - Empty, absent or otherwise malformed input parses to 0
    ///
    /// ## Example
    /// ```rust
    /// use racedesk_core::money::Money;
    ///
    /// assert_eq!(Money::parse("1.234,56").cents(), 123_456);
    /// assert_eq!(Money::parse("1,234.56").cents(), 123_456);
    /// assert_eq!(Money::parse("-10").cents(), -1_000);
    /// assert_eq!(Money::parse("n/a").cents(), 0);
    /// ```
    pub fn parse(raw: &str) -> Money {
        let (negative, int_digits, frac_digits) = split_by_last_sep(raw);

        let int_part = int_digits.trim_start_matches('0');
        let int_part = if int_part.is_empty() { "0" } else { int_part };

        let mut frac = frac_digits;
        frac.push_str("00");
        // Only ASCII digits survive split_by_last_sep, so byte slicing is safe.
        let frac = &frac[..2];

        // Amounts whose cent representation overflows i64 are treated the
        // same as any other malformed remainder.
        let cents: i64 = format!("{int_part}{frac}").parse().unwrap_or(0);

        Money(if negative { -cents } else { cents })
    }
}

// =============================================================================
// Percentage Parsing
// =============================================================================

/// Parses a localized percentage string into an exact decimal.
///
/// Same separator rules as [`Money::parse`], but the fraction keeps its
/// positional value instead of being forced to 2 digits: `"10,5"` is 10.5.
///
/// Returns `None` for empty/whitespace input. This is how "unspecified"
/// stays distinguishable from an explicit zero, which matters for default
/// substitution at event creation.
pub fn parse_percent(raw: &str) -> Option<Decimal> {
    if raw.trim().is_empty() {
        return None;
    }

    let (negative, int_digits, frac_digits) = split_by_last_sep(raw);

    let int_part = int_digits.trim_start_matches('0');
    let int_part = if int_part.is_empty() { "0" } else { int_part };
    let frac_part = if frac_digits.is_empty() {
        "0"
    } else {
        frac_digits.as_str()
    };

    let value: Decimal = format!("{int_part}.{frac_part}").parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Parses a percentage, substituting `default` when the input is absent or
/// blank.
///
/// ## Example
/// ```rust
/// use racedesk_core::money::parse_percent_or_default;
/// use rust_decimal::Decimal;
///
/// let def = Decimal::new(105, 1); // 10.5
/// assert_eq!(parse_percent_or_default(None, def), Some(def));
/// assert_eq!(parse_percent_or_default(Some("  "), def), Some(def));
/// assert_eq!(parse_percent_or_default(Some("0"), def), Some(Decimal::ZERO));
/// ```
pub fn parse_percent_or_default(raw: Option<&str>, default: Decimal) -> Option<Decimal> {
    match raw {
        None => Some(default),
        Some(s) if s.trim().is_empty() => Some(default),
        Some(s) => parse_percent(s),
    }
}

/// Splits a raw numeric string on its right-most decimal separator.
///
/// Returns `(negative, integer_digits, fraction_digits)` with every
/// non-digit stripped from both parts.
fn split_by_last_sep(raw: &str) -> (bool, String, String) {
    let mut s = raw.trim();

    let mut negative = false;
    if let Some(rest) = s.strip_prefix('-') {
        negative = true;
        s = rest;
    }

    let kept: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();

    match kept.rfind(|c| c == '.' || c == ',') {
        None => (negative, kept, String::new()),
        Some(idx) => {
            let int_digits = kept[..idx].chars().filter(|c| c.is_ascii_digit()).collect();
            let frac_digits = kept[idx + 1..]
                .chars()
                .filter(|c| c.is_ascii_digit())
                .collect();
            (negative, int_digits, frac_digits)
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// This is for debugging and logs. The frontend owns real formatting.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by quantity (for line subtotals).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
