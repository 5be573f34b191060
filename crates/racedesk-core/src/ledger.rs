//! # Ledger Entry Validator/Normalizer
//!
//! Validates and normalizes a cash-movement payload before the repository
//! persists it, and enforces the global/event scope split.
//!
//! ## Scope Split
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Ledger Scopes                                        │
//! │                                                                         │
//! │  event_id = NULL  → GLOBAL movement ("caja")                            │
//! │    editable and deletable through the global-ledger surface only        │
//! │                                                                         │
//! │  event_id = n     → EVENT movement                                      │
//! │    immutable from the global surface; owned by the event's books        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CashMovement, MovementKind, MovementType};
use crate::validation::{clean_optional, parse_iso_date_midnight};

/// Home currency substituted when a movement omits its currency.
pub const HOME_CURRENCY: &str = "ARS";

/// Default movement status.
pub const DEFAULT_STATUS: &str = "pending";

/// Default invoice status.
pub const DEFAULT_INVOICE_STATUS: &str = "not_applicable";

// =============================================================================
// Draft and Normalized Forms
// =============================================================================

/// Raw cash-movement payload as submitted by the admin UI. Amounts are
/// localized strings; account references arrive as loose numbers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MovementDraft {
    /// Strict `YYYY-MM-DD`; mandatory.
    pub date: Option<String>,
    /// Fee-type catalog id; mandatory on creation.
    pub type_id: Option<String>,
    /// Operation kind; absent means a plain expense.
    pub kind: Option<String>,
    pub currency: Option<String>,
    pub amount: Option<String>,
    pub from_account: Option<f64>,
    pub to_account: Option<f64>,
    pub status: Option<String>,
    pub invoice_status: Option<String>,
    pub subtype: Option<String>,
    pub note: Option<String>,
}

impl MovementDraft {
    /// True when the draft carries nothing to apply (useful for the sparse
    /// update surface).
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.type_id.is_none()
            && self.kind.is_none()
            && self.currency.is_none()
            && self.amount.is_none()
            && self.from_account.is_none()
            && self.to_account.is_none()
            && self.status.is_none()
            && self.invoice_status.is_none()
            && self.subtype.is_none()
            && self.note.is_none()
    }
}

/// A validated movement ready for insertion. The repository assigns the id
/// and the event link (None for the global surface).
#[derive(Debug, Clone, PartialEq)]
pub struct NewCashMovement {
    pub event_id: Option<i64>,
    pub date: NaiveDateTime,
    pub kind: MovementKind,
    pub type_id: String,
    pub group: String,
    pub currency: String,
    pub amount_cents: i64,
    pub from_account: Option<i64>,
    pub to_account: Option<i64>,
    pub status: String,
    pub invoice_status: String,
    pub subtype: Option<String>,
    pub note: Option<String>,
}

// =============================================================================
// Normalization
// =============================================================================

/// Validates a draft against its catalog entry and produces the row to
/// persist.
///
/// ## Rules
/// - date: mandatory, strict calendar `YYYY-MM-DD`, stored as midnight
/// - kind: member of the fixed set when supplied, expense when absent
/// - currency: trimmed and upper-cased, [`HOME_CURRENCY`] when absent
/// - amount: through the money codec (malformed parses to 0)
/// - accounts: whole numbers, or absent when the input is not finite
/// - group: copied from the catalog entry, never trusted from the caller
pub fn normalize_movement(
    draft: &MovementDraft,
    movement_type: &MovementType,
) -> CoreResult<NewCashMovement> {
    let date = match draft.date.as_deref() {
        Some(raw) => parse_iso_date_midnight(raw)?,
        None => return Err(CoreError::InvalidDate(String::new())),
    };

    let kind = match draft.kind.as_deref() {
        Some(raw) => MovementKind::parse(raw)?,
        None => MovementKind::Expense,
    };

    let currency = match clean_optional(draft.currency.as_deref()) {
        Some(c) => c.to_ascii_uppercase(),
        None => HOME_CURRENCY.to_string(),
    };

    let amount_cents = Money::parse(draft.amount.as_deref().unwrap_or("")).cents();

    Ok(NewCashMovement {
        event_id: None,
        date,
        kind,
        type_id: movement_type.id.clone(),
        group: movement_type.group.clone(),
        currency,
        amount_cents,
        from_account: coerce_account(draft.from_account),
        to_account: coerce_account(draft.to_account),
        status: clean_optional(draft.status.as_deref())
            .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        invoice_status: clean_optional(draft.invoice_status.as_deref())
            .unwrap_or_else(|| DEFAULT_INVOICE_STATUS.to_string()),
        subtype: clean_optional(draft.subtype.as_deref()),
        note: clean_optional(draft.note.as_deref()),
    })
}

/// Coerces a loose numeric account reference to a whole id. Non-finite
/// values count as absent rather than corrupting the link.
fn coerce_account(raw: Option<f64>) -> Option<i64> {
    raw.and_then(|v| {
        if v.is_finite() {
            Some(v.trunc() as i64)
        } else {
            None
        }
    })
}

// =============================================================================
// Scope Guard
// =============================================================================

/// Rejects event-scoped movements on the global update/delete surface.
pub fn ensure_global(movement: &CashMovement) -> CoreResult<()> {
    if movement.is_global() {
        Ok(())
    } else {
        Err(CoreError::EventScopedMovement(movement.id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MovementScope;
    use chrono::NaiveDate;

    fn catalog_entry() -> MovementType {
        MovementType {
            id: "fixed_expense".to_string(),
            name: "Fixed expense".to_string(),
            group: "fixed".to_string(),
            scope: MovementScope::Global,
        }
    }

    fn draft(date: &str) -> MovementDraft {
        MovementDraft {
            date: Some(date.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_defaults() {
        let normalized = normalize_movement(&draft("2026-03-15"), &catalog_entry()).unwrap();

        assert_eq!(
            normalized.date,
            NaiveDate::from_ymd_opt(2026, 3, 15)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
        assert_eq!(normalized.kind, MovementKind::Expense);
        assert_eq!(normalized.currency, "ARS");
        assert_eq!(normalized.amount_cents, 0);
        assert_eq!(normalized.status, "pending");
        assert_eq!(normalized.invoice_status, "not_applicable");
        assert_eq!(normalized.type_id, "fixed_expense");
        assert_eq!(normalized.group, "fixed");
        assert_eq!(normalized.event_id, None);
    }

    #[test]
    fn test_normalize_full_payload() {
        let d = MovementDraft {
            date: Some("2026-01-02".to_string()),
            type_id: None,
            kind: Some("transfer".to_string()),
            currency: Some(" usd ".to_string()),
            amount: Some("1.234,56".to_string()),
            from_account: Some(3.0),
            to_account: Some(7.9),
            status: Some("settled".to_string()),
            invoice_status: Some("issued".to_string()),
            subtype: Some("  rent  ".to_string()),
            note: Some("  office ".to_string()),
        };
        let normalized = normalize_movement(&d, &catalog_entry()).unwrap();

        assert_eq!(normalized.kind, MovementKind::Transfer);
        assert_eq!(normalized.currency, "USD");
        assert_eq!(normalized.amount_cents, 123_456);
        assert_eq!(normalized.from_account, Some(3));
        // whole-number coercion truncates
        assert_eq!(normalized.to_account, Some(7));
        assert_eq!(normalized.subtype, Some("rent".to_string()));
        assert_eq!(normalized.note, Some("office".to_string()));
    }

    #[test]
    fn test_normalize_rejects_bad_dates() {
        assert!(matches!(
            normalize_movement(&draft("15-03-2026"), &catalog_entry()),
            Err(CoreError::InvalidDate(_))
        ));
        assert!(matches!(
            normalize_movement(&draft("2026-02-30"), &catalog_entry()),
            Err(CoreError::InvalidDate(_))
        ));
        assert!(matches!(
            normalize_movement(&MovementDraft::default(), &catalog_entry()),
            Err(CoreError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_normalize_rejects_unknown_kind() {
        let mut d = draft("2026-03-15");
        d.kind = Some("withdrawal".to_string());
        assert!(matches!(
            normalize_movement(&d, &catalog_entry()),
            Err(CoreError::InvalidEnum { field: "movement kind", .. })
        ));
    }

    #[test]
    fn test_non_finite_accounts_are_absent() {
        let mut d = draft("2026-03-15");
        d.from_account = Some(f64::NAN);
        d.to_account = Some(f64::INFINITY);
        let normalized = normalize_movement(&d, &catalog_entry()).unwrap();
        assert_eq!(normalized.from_account, None);
        assert_eq!(normalized.to_account, None);
    }

    #[test]
    fn test_ensure_global() {
        let global = CashMovement {
            id: 1,
            event_id: None,
            date: NaiveDate::from_ymd_opt(2026, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            kind: MovementKind::Expense,
            type_id: "fixed_expense".to_string(),
            group: "fixed".to_string(),
            currency: "ARS".to_string(),
            amount_cents: 100,
            from_account: None,
            to_account: None,
            status: "pending".to_string(),
            invoice_status: "not_applicable".to_string(),
            subtype: None,
            note: None,
        };
        assert!(ensure_global(&global).is_ok());

        let scoped = CashMovement {
            id: 2,
            event_id: Some(9),
            ..global
        };
        let err = ensure_global(&scoped).unwrap_err();
        assert!(matches!(err, CoreError::EventScopedMovement(2)));
    }
}
