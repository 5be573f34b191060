//! # Error Types
//!
//! Domain-specific error types for racedesk-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  racedesk-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  racedesk-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → serving layer           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, id, offending value)
//! 3. Errors are enum variants, never String
//!
//! Note that unparseable money and percentage strings are NOT errors here:
//! the codec resolves them to `0`/`None` and the caller decides whether that
//! is acceptable in context.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Date string is malformed or not a real calendar date.
    ///
    /// ## When This Occurs
    /// - Input does not match `YYYY-MM-DD`
    /// - Input matches the pattern but names a day that does not exist
    ///   (e.g. `2026-02-30`)
    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Value is outside a fixed enumerated set (currency, sale kind,
    /// movement kind, movement scope).
    #[error("invalid {field}: '{value}' is not in the allowed set")]
    InvalidEnum { field: &'static str, value: String },

    /// An assignment row carried neither a known photographer id nor a
    /// usable name. Callers drop such rows from the batch; they are never
    /// silently invented.
    #[error("assignment row could not be resolved to a photographer")]
    UnresolvedReference,

    /// Replacing a non-empty child set with an empty one is treated as a
    /// caller mistake, not as a request to wipe the data.
    #[error("refusing to replace {existing} existing rows with an empty set")]
    EmptyReplacementGuard { existing: usize },

    /// Event-scoped ledger movements are immutable from the global-ledger
    /// surface.
    #[error("movement {0} belongs to an event and cannot be changed from the global ledger")]
    EventScopedMovement(i64),

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when a field fails a structural rule before any business
/// logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: &'static str },

    /// Invalid format (anything with a shape rule that is not a date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat {
        field: &'static str,
        reason: &'static str,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
