//! # Domain Types
//!
//! Core domain types used throughout Racedesk.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │     Event       │   │   TicketSale    │   │  Photographer   │        │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │        │
//! │  │  id             │   │  event_id (FK)  │   │  id             │        │
//! │  │  revenue (ARS)  │   │  currency       │   │  name           │        │
//! │  │  revenue (USD)  │   │  price_cents    │   │  billing data   │        │
//! │  │  fee schedule   │   │  commission_pct │   └────────┬────────┘        │
//! │  └───────┬─────────┘   └─────────────────┘            │                 │
//! │          │                                            │                 │
//! │          │        ┌───────────────────────┐           │                 │
//! │          └────────┤ PhotographerAssignment├───────────┘                 │
//! │                   │ (event ↔ photographer)│                             │
//! │                   └───────────────────────┘                             │
//! │                                                                         │
//! │  SpecificExpense (per event)    CashMovement + MovementType (ledger)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every monetary field is integer cents. Percentages are exact decimals.
//! The `*Draft` types at the bottom are the raw write payloads the admin UI
//! submits; money and percentages arrive there as localized strings and go
//! through the codec in [`crate::money`].

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;
use crate::fees::FeeSchedule;
use crate::money::Money;

// =============================================================================
// Currency
// =============================================================================

/// The two currencies ticket sales are denominated in.
///
/// Photographer costs and specific expenses carry no currency column and
/// are ARS by business rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Ars,
    Usd,
}

impl Currency {
    /// ISO-style code used on the wire and in the database.
    pub const fn code(&self) -> &'static str {
        match self {
            Currency::Ars => "ARS",
            Currency::Usd => "USD",
        }
    }

    /// Parses a currency code, case-insensitively. Anything outside the
    /// fixed two-value set is rejected.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ARS" => Ok(Currency::Ars),
            "USD" => Ok(Currency::Usd),
            _ => Err(CoreError::InvalidEnum {
                field: "currency",
                value: raw.to_string(),
            }),
        }
    }
}

// =============================================================================
// Sale Kind
// =============================================================================

/// Ticket-sale category tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleKind {
    /// Sold before the race.
    Presale,
    /// Bundled photo pack.
    Pack,
    /// Single photo.
    Unit,
    Other,
}

impl SaleKind {
    pub const fn code(&self) -> &'static str {
        match self {
            SaleKind::Presale => "presale",
            SaleKind::Pack => "pack",
            SaleKind::Unit => "unit",
            SaleKind::Other => "other",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "presale" => Ok(SaleKind::Presale),
            "pack" => Ok(SaleKind::Pack),
            "unit" => Ok(SaleKind::Unit),
            "other" => Ok(SaleKind::Other),
            _ => Err(CoreError::InvalidEnum {
                field: "sale kind",
                value: raw.to_string(),
            }),
        }
    }
}

// =============================================================================
// Ledger Enums
// =============================================================================

/// Operation kind of a cash movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    Income,
    Expense,
    Transfer,
    /// Opening balance; meaningful for the global ledger only.
    Opening,
}

impl MovementKind {
    pub const fn code(&self) -> &'static str {
        match self {
            MovementKind::Income => "income",
            MovementKind::Expense => "expense",
            MovementKind::Transfer => "transfer",
            MovementKind::Opening => "opening",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(MovementKind::Income),
            "expense" => Ok(MovementKind::Expense),
            "transfer" => Ok(MovementKind::Transfer),
            "opening" => Ok(MovementKind::Opening),
            _ => Err(CoreError::InvalidEnum {
                field: "movement kind",
                value: raw.to_string(),
            }),
        }
    }
}

/// Whether a movement type belongs to the global ledger or to events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MovementScope {
    Global,
    Event,
}

impl MovementScope {
    pub const fn code(&self) -> &'static str {
        match self {
            MovementScope::Global => "global",
            MovementScope::Event => "event",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "global" => Ok(MovementScope::Global),
            "event" => Ok(MovementScope::Event),
            _ => Err(CoreError::InvalidEnum {
                field: "movement scope",
                value: raw.to_string(),
            }),
        }
    }
}

// =============================================================================
// Event
// =============================================================================

/// A race event being financially tracked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Event {
    pub id: i64,

    /// Display name of the race.
    pub name: String,

    /// Race day.
    #[ts(as = "String")]
    pub date: NaiveDate,

    pub venue: Option<String>,

    /// Free-form event classification (trail, street, etc.).
    pub kind: Option<String>,

    /// Registered runner count.
    pub runners: Option<i64>,

    /// Photo platform access count.
    pub accesses: Option<i64>,

    /// Accounting base currency. Always ARS today.
    pub base_currency: Currency,

    /// ARS revenue in cents. Overwritten by every ticket-sale replacement.
    pub revenue_ars_cents: i64,

    /// USD revenue in cents. Overwritten by every ticket-sale replacement.
    pub revenue_usd_cents: i64,

    /// Payment processor fee percentage.
    #[ts(as = "Option<String>")]
    pub processor_pct: Option<Decimal>,

    /// Gross receipts tax percentage.
    #[ts(as = "Option<String>")]
    pub gross_receipts_pct: Option<Decimal>,

    /// VAT percentage.
    #[ts(as = "Option<String>")]
    pub vat_pct: Option<Decimal>,

    /// Photo provider commission percentage.
    #[ts(as = "Option<String>")]
    pub provider_pct: Option<Decimal>,

    /// Debit/credit card tax percentage.
    #[ts(as = "Option<String>")]
    pub debit_credit_pct: Option<Decimal>,
}

impl Event {
    /// Bundles the five fee percentages for the fee engine.
    pub fn fee_schedule(&self) -> FeeSchedule {
        FeeSchedule {
            processor_pct: self.processor_pct,
            gross_receipts_pct: self.gross_receipts_pct,
            vat_pct: self.vat_pct,
            provider_pct: self.provider_pct,
            debit_credit_pct: self.debit_credit_pct,
        }
    }

    /// Stored ARS revenue as Money.
    #[inline]
    pub fn revenue_ars(&self) -> Money {
        Money::from_cents(self.revenue_ars_cents)
    }

    /// Stored USD revenue as Money.
    #[inline]
    pub fn revenue_usd(&self) -> Money {
        Money::from_cents(self.revenue_usd_cents)
    }
}

// =============================================================================
// Ticket Sale
// =============================================================================

/// One ticket type sold for an event (a price point, not an individual
/// order). `quantity` is how many were sold at that price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TicketSale {
    pub id: i64,
    pub event_id: i64,
    pub label: String,
    pub kind: SaleKind,
    pub currency: Currency,
    pub unit_price_cents: i64,
    pub quantity: i64,
    /// Commission owed on this ticket type, if any. Applied to the row's
    /// own subtotal in the row's own currency.
    #[ts(as = "Option<String>")]
    pub commission_pct: Option<Decimal>,
}

impl TicketSale {
    /// Row subtotal: unit price times quantity.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.unit_price_cents) * self.quantity
    }
}

// =============================================================================
// Photographer
// =============================================================================

/// Global photographer identity with contact and billing metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Photographer {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    /// Tax identifier (CUIT).
    pub tax_id: Option<String>,
    /// National identity document.
    pub national_id: Option<String>,
    /// Bank account number (CBU).
    pub bank_account: Option<String>,
    pub bank_alias: Option<String>,
    pub billing_kind: Option<String>,
    pub notes: Option<String>,
}

/// A photographer working one event: the join row between [`Event`] and
/// [`Photographer`], carrying cost and performance counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PhotographerAssignment {
    pub id: i64,
    pub event_id: i64,
    pub photographer_id: i64,
    /// Name snapshot at assignment time.
    pub name: String,
    /// What the photographer charges for the event. ARS by business rule.
    pub cost_cents: i64,
    pub photos_taken: i64,
    pub downloads: i64,
    pub unique_downloads: i64,
    pub hours_worked: f64,
    /// Whether the photographer has invoiced us.
    pub invoiced: bool,
    /// Whether we have paid the photographer.
    pub paid: bool,
    pub role: Option<String>,
}

impl PhotographerAssignment {
    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_cents(self.cost_cents)
    }
}

// =============================================================================
// Specific Expense
// =============================================================================

/// A one-off expense tied to a single event (venue fee, fuel, printing).
/// ARS by business rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SpecificExpense {
    pub id: i64,
    pub event_id: i64,
    pub label: String,
    pub kind: Option<String>,
    pub amount_cents: i64,
    pub paid: bool,
    pub invoiced: bool,
}

impl SpecificExpense {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Ledger
// =============================================================================

/// Catalog entry classifying cash movements (fee types).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MovementType {
    /// Stable slug id, e.g. `fixed_expense`.
    pub id: String,
    pub name: String,
    /// Reporting group: fixed, variable, investment or debt.
    pub group: String,
    pub scope: MovementScope,
}

/// A cash-ledger movement. Global when `event_id` is `None`, event-scoped
/// otherwise; the two populations are managed through different surfaces
/// and never mix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CashMovement {
    pub id: i64,
    pub event_id: Option<i64>,
    /// Midnight-local timestamp of the movement day.
    #[ts(as = "String")]
    pub date: NaiveDateTime,
    pub kind: MovementKind,
    /// Fee-type catalog id this movement was classified under.
    pub type_id: String,
    /// Reporting group copied from the catalog entry at write time.
    pub group: String,
    /// Upper-cased currency code; ARS when the caller omitted it.
    pub currency: String,
    pub amount_cents: i64,
    pub from_account: Option<i64>,
    pub to_account: Option<i64>,
    pub status: String,
    pub invoice_status: String,
    pub subtype: Option<String>,
    pub note: Option<String>,
}

impl CashMovement {
    /// A movement is global iff it has no event link.
    #[inline]
    pub fn is_global(&self) -> bool {
        self.event_id.is_none()
    }

    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Write Payloads (Drafts)
// =============================================================================
// Money and percentages arrive as localized strings and are parsed by the
// codec at the repository boundary, exactly where the collaborator builds
// rows for persistence.

/// Payload for creating an event. Omitted fee percentages receive the
/// business defaults; omitted revenue parses to zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewEvent {
    pub name: String,
    /// Strict `YYYY-MM-DD`.
    pub date: String,
    pub venue: Option<String>,
    pub kind: Option<String>,
    pub runners: Option<i64>,
    pub accesses: Option<i64>,
    pub revenue_ars: Option<String>,
    pub revenue_usd: Option<String>,
    pub processor_pct: Option<String>,
    pub gross_receipts_pct: Option<String>,
    pub vat_pct: Option<String>,
    pub provider_pct: Option<String>,
    pub debit_credit_pct: Option<String>,
}

/// Sparse event update. `None` leaves a column untouched; blank strings are
/// also ignored so a half-filled form never wipes stored values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EventPatch {
    pub name: Option<String>,
    pub date: Option<String>,
    pub venue: Option<String>,
    pub kind: Option<String>,
    pub runners: Option<i64>,
    pub accesses: Option<i64>,
    pub revenue_ars: Option<String>,
    pub revenue_usd: Option<String>,
    pub processor_pct: Option<String>,
    pub gross_receipts_pct: Option<String>,
    pub vat_pct: Option<String>,
    pub provider_pct: Option<String>,
    pub debit_credit_pct: Option<String>,
}

impl EventPatch {
    /// True when the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.date.is_none()
            && self.venue.is_none()
            && self.kind.is_none()
            && self.runners.is_none()
            && self.accesses.is_none()
            && self.revenue_ars.is_none()
            && self.revenue_usd.is_none()
            && self.processor_pct.is_none()
            && self.gross_receipts_pct.is_none()
            && self.vat_pct.is_none()
            && self.provider_pct.is_none()
            && self.debit_credit_pct.is_none()
    }
}

/// One ticket-sale row in a full-set replacement.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleDraft {
    pub label: String,
    pub kind: String,
    pub currency: String,
    pub unit_price: Option<String>,
    pub quantity: Option<i64>,
    pub commission_pct: Option<String>,
}

/// One photographer row in a full-set replacement. Either
/// `photographer_id` or a non-blank `name` must resolve; rows that resolve
/// to neither are dropped from the batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AssignmentDraft {
    pub photographer_id: Option<i64>,
    pub name: Option<String>,
    pub cost: Option<String>,
    pub photos_taken: Option<i64>,
    pub downloads: Option<i64>,
    pub unique_downloads: Option<i64>,
    /// Accepts comma decimals ("2,5").
    pub hours_worked: Option<String>,
    pub invoiced: Option<bool>,
    pub paid: Option<bool>,
    pub role: Option<String>,
}

/// One specific-expense row in a full-set replacement. Blank labels are
/// skipped.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExpenseDraft {
    pub label: Option<String>,
    pub kind: Option<String>,
    pub amount: Option<String>,
    pub paid: Option<bool>,
    pub invoiced: Option<bool>,
}

/// Sparse photographer contact/billing update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PhotographerPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub tax_id: Option<String>,
    pub national_id: Option<String>,
    pub bank_account: Option<String>,
    pub bank_alias: Option<String>,
    pub billing_kind: Option<String>,
    pub notes: Option<String>,
}

impl PhotographerPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.location.is_none()
            && self.tax_id.is_none()
            && self.national_id.is_none()
            && self.bank_account.is_none()
            && self.bank_alias.is_none()
            && self.billing_kind.is_none()
            && self.notes.is_none()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
