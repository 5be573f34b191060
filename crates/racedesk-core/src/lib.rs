//! # racedesk-core: Pure Business Logic for Racedesk
//!
//! This crate is the **heart** of Racedesk. It turns raw stored rows
//! (ticket sales, photographer cost entries, fee schedules, specific
//! expenses, ledger movements) into the derived financial figures the
//! admin endpoints expose, as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Racedesk Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                 Admin Frontend (TypeScript)                     │    │
//! │  │      Events ──► Sales ──► Photographers ──► Cash Ledger         │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │ HTTP (outside this repo)               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │                racedesk-db (repositories)                       │    │
//! │  │        fetch rows ──► call core ──► persist/return              │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │               ★ racedesk-core (THIS CRATE) ★                    │    │
//! │  │                                                                 │    │
//! │  │   ┌─────────┐ ┌───────┐ ┌────────┐ ┌─────────┐ ┌────────┐       │    │
//! │  │   │  money  │ │ fees  │ │ report │ │ ranking │ │ ledger │       │    │
//! │  │   │  codec  │ │  bps  │ │  aggr  │ │  score  │ │  rules │       │    │
//! │  │   └─────────┘ └───────┘ └────────┘ └─────────┘ └────────┘       │    │
//! │  │                                                                 │    │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS              │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer-cents `Money` type and the localized amount codec
//! - [`fees`] - Basis-point conversion and exact percentage application
//! - [`report`] - Event financial aggregation (detail and list)
//! - [`ranking`] - Photographer ranking scorer and KPIs
//! - [`ledger`] - Cash-movement validation/normalization and scope rules
//! - [`types`] - Domain entities and write payloads
//! - [`validation`] - Field validators and the empty-replacement guard
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same rows in, same figures out, every time
//! 2. **Integer Money**: all monetary values are i64 cents, never floats
//! 3. **Exact Percentages**: decimal in, basis points internally
//! 4. **Explicit Errors**: all errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use racedesk_core::fees::{apply_percent, FeeSchedule};
//! use racedesk_core::money::Money;
//! use rust_decimal::Decimal;
//!
//! // Parse what the admin typed (never floats!)
//! let revenue = Money::parse("1.000,00"); // ARS 1000 = 100000 cents
//!
//! // 10.5% of it, exactly
//! let fee = apply_percent(revenue, Some(Decimal::new(105, 1)));
//! assert_eq!(fee.cents(), 10_500);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod fees;
pub mod ledger;
pub mod money;
pub mod ranking;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use racedesk_core::Money` instead of
// `use racedesk_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use fees::FeeSchedule;
pub use ledger::{MovementDraft, NewCashMovement};
pub use money::Money;
pub use ranking::{AssignmentStats, PhotographerKpis, PhotographerRank, RankingComponents};
pub use report::{EventFinancials, EventSummary};
pub use types::*;
