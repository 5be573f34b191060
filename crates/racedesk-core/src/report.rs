//! # Event Financial Aggregator
//!
//! Turns an event's raw rows into the derived financial figures the read
//! endpoints expose.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Event Financial Aggregation                           │
//! │                                                                         │
//! │  ticket sales ────┐                                                     │
//! │  assignments ─────┼──► compute_event_financials() ──► EventFinancials   │
//! │  expenses ────────┤         (detail view)                               │
//! │  fee schedule ────┘                                                     │
//! │                                                                         │
//! │  all events ──────┐                                                     │
//! │  grouped sums ────┼──► summarize_events() ──────────► Vec<EventSummary> │
//! │  all sales ───────┘         (list view)                                 │
//! │                                                                         │
//! │  INVARIANT: for every event the list fold produces the same             │
//! │  net/total-cost figures as the detail computation would.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Currency Rules
//! - Revenue buckets per sale-row currency (ARS or USD)
//! - The five schedule fees apply to ARS revenue only
//! - Per-row commissions bucket into the row's own currency
//! - Photographer costs and specific expenses are ARS
//! - USD costs therefore consist of USD commissions alone

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::fees::{apply_percent, FeeSchedule};
use crate::money::Money;
use crate::types::{Currency, Event, PhotographerAssignment, SpecificExpense, TicketSale};

// =============================================================================
// Output Records
// =============================================================================

/// Full cost breakdown for one event. Every intermediate figure is emitted
/// so the frontend can render the whole table without re-deriving anything.
///
/// The two organizer-commission fields are legacy: that fee no longer
/// exists, but the frontend still reads the keys, so they are always zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EventFinancials {
    pub revenue_ars_cents: i64,
    pub revenue_usd_cents: i64,

    pub photographer_cost_cents: i64,
    pub processor_fee_cents: i64,
    pub gross_receipts_tax_cents: i64,
    pub vat_cents: i64,
    pub provider_fee_cents: i64,
    pub debit_credit_tax_cents: i64,

    /// Legacy, always 0.
    pub organizer_presale_commission_cents: i64,
    /// Legacy, always 0.
    pub organizer_post_commission_cents: i64,

    pub sale_commission_ars_cents: i64,
    pub sale_commission_usd_cents: i64,
    pub specific_expense_cents: i64,

    pub total_costs_ars_cents: i64,
    pub total_costs_usd_cents: i64,
    pub net_ars_cents: i64,
    pub net_usd_cents: i64,

    /// Legacy single-currency aggregate: ARS + USD commissions.
    pub sale_commission_cents: i64,
    /// Legacy alias of `total_costs_ars_cents`.
    pub total_costs_cents: i64,
    /// Legacy alias of `net_ars_cents`.
    pub net_cents: i64,

    /// Sum of quantities across all sale rows, commission or not.
    pub total_orders: i64,
}

/// One row of the executive event list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EventSummary {
    pub event: Event,
    pub processor_fee_cents: i64,
    pub photographer_cost_cents: i64,
    pub specific_expense_cents: i64,
    pub total_costs_ars_cents: i64,
    pub net_ars_cents: i64,
    pub total_orders: i64,
    pub sale_commission_ars_cents: i64,
    pub sale_commission_usd_cents: i64,
}

// =============================================================================
// Detail Computation
// =============================================================================

/// Computes the full financial picture of a single event from its raw rows.
///
/// Pure and deterministic: same rows in, same figures out, no I/O.
///
/// ## Example
/// One ARS sale of 10000 cents x 3, processor 2%, gross receipts 4%,
/// everything else zero: revenue 30000, fees 600 + 1200, net 28200.
pub fn compute_event_financials(
    sales: &[TicketSale],
    assignments: &[PhotographerAssignment],
    expenses: &[SpecificExpense],
    fees: &FeeSchedule,
) -> EventFinancials {
    // Revenue per currency from the sale rows themselves.
    let mut revenue_ars = Money::zero();
    let mut revenue_usd = Money::zero();
    for sale in sales {
        match sale.currency {
            Currency::Ars => revenue_ars += sale.subtotal(),
            Currency::Usd => revenue_usd += sale.subtotal(),
        }
    }

    let mut photographer_cost = Money::zero();
    for a in assignments {
        photographer_cost += a.cost();
    }

    // The five schedule fees are charged against ARS revenue only.
    let processor_fee = apply_percent(revenue_ars, fees.processor_pct);
    let gross_receipts_tax = apply_percent(revenue_ars, fees.gross_receipts_pct);
    let vat = apply_percent(revenue_ars, fees.vat_pct);
    let provider_fee = apply_percent(revenue_ars, fees.provider_pct);
    let debit_credit_tax = apply_percent(revenue_ars, fees.debit_credit_pct);

    let (commission_ars, commission_usd, total_orders) = fold_sale_commissions(sales);

    let mut specific_expense = Money::zero();
    for e in expenses {
        specific_expense += e.amount();
    }

    let total_costs_ars = photographer_cost
        + processor_fee
        + gross_receipts_tax
        + vat
        + provider_fee
        + debit_credit_tax
        + commission_ars
        + specific_expense;
    let total_costs_usd = commission_usd;

    let net_ars = revenue_ars - total_costs_ars;
    let net_usd = revenue_usd - total_costs_usd;

    EventFinancials {
        revenue_ars_cents: revenue_ars.cents(),
        revenue_usd_cents: revenue_usd.cents(),
        photographer_cost_cents: photographer_cost.cents(),
        processor_fee_cents: processor_fee.cents(),
        gross_receipts_tax_cents: gross_receipts_tax.cents(),
        vat_cents: vat.cents(),
        provider_fee_cents: provider_fee.cents(),
        debit_credit_tax_cents: debit_credit_tax.cents(),
        organizer_presale_commission_cents: 0,
        organizer_post_commission_cents: 0,
        sale_commission_ars_cents: commission_ars.cents(),
        sale_commission_usd_cents: commission_usd.cents(),
        specific_expense_cents: specific_expense.cents(),
        total_costs_ars_cents: total_costs_ars.cents(),
        total_costs_usd_cents: total_costs_usd.cents(),
        net_ars_cents: net_ars.cents(),
        net_usd_cents: net_usd.cents(),
        sale_commission_cents: (commission_ars + commission_usd).cents(),
        total_costs_cents: total_costs_ars.cents(),
        net_cents: net_ars.cents(),
        total_orders,
    }
}

// =============================================================================
// List Computation
// =============================================================================

/// Folds the whole event table into list rows.
///
/// Vectorized shape: the caller fetches all events, the per-event
/// photographer-cost and specific-expense sums (grouped in SQL), and every
/// sale row for those events, in bulk. This function then folds per event
/// in memory. The stored revenue fields stand in for recomputing revenue
/// from sale rows; sale replacement keeps them in sync.
///
/// Events with no child rows still appear, with zero aggregates.
pub fn summarize_events(
    events: Vec<Event>,
    photographer_costs: &HashMap<i64, i64>,
    expense_totals: &HashMap<i64, i64>,
    sales: &[TicketSale],
) -> Vec<EventSummary> {
    // event id → (commission ARS, commission USD, orders)
    let mut sale_agg: HashMap<i64, (Money, Money, i64)> = HashMap::new();
    for sale in sales {
        let entry = sale_agg
            .entry(sale.event_id)
            .or_insert((Money::zero(), Money::zero(), 0));
        let commission = apply_percent(sale.subtotal(), sale.commission_pct);
        match sale.currency {
            Currency::Ars => entry.0 += commission,
            Currency::Usd => entry.1 += commission,
        }
        entry.2 += sale.quantity;
    }

    events
        .into_iter()
        .map(|event| {
            let revenue_ars = event.revenue_ars();
            let fees = event.fee_schedule();

            let processor_fee = apply_percent(revenue_ars, fees.processor_pct);
            let gross_receipts_tax = apply_percent(revenue_ars, fees.gross_receipts_pct);
            let vat = apply_percent(revenue_ars, fees.vat_pct);
            let provider_fee = apply_percent(revenue_ars, fees.provider_pct);
            let debit_credit_tax = apply_percent(revenue_ars, fees.debit_credit_pct);

            let photographer_cost =
                Money::from_cents(photographer_costs.get(&event.id).copied().unwrap_or(0));
            let specific_expense =
                Money::from_cents(expense_totals.get(&event.id).copied().unwrap_or(0));

            let (commission_ars, commission_usd, total_orders) = sale_agg
                .get(&event.id)
                .copied()
                .unwrap_or((Money::zero(), Money::zero(), 0));

            let total_costs_ars = photographer_cost
                + processor_fee
                + gross_receipts_tax
                + vat
                + provider_fee
                + debit_credit_tax
                + commission_ars
                + specific_expense;
            let net_ars = revenue_ars - total_costs_ars;

            EventSummary {
                event,
                processor_fee_cents: processor_fee.cents(),
                photographer_cost_cents: photographer_cost.cents(),
                specific_expense_cents: specific_expense.cents(),
                total_costs_ars_cents: total_costs_ars.cents(),
                net_ars_cents: net_ars.cents(),
                total_orders,
                sale_commission_ars_cents: commission_ars.cents(),
                sale_commission_usd_cents: commission_usd.cents(),
            }
        })
        .collect()
}

/// Commission and order-count fold shared by the detail path.
fn fold_sale_commissions(sales: &[TicketSale]) -> (Money, Money, i64) {
    let mut commission_ars = Money::zero();
    let mut commission_usd = Money::zero();
    let mut total_orders = 0i64;

    for sale in sales {
        total_orders += sale.quantity;

        let commission = apply_percent(sale.subtotal(), sale.commission_pct);
        match sale.currency {
            Currency::Ars => commission_ars += commission,
            Currency::Usd => commission_usd += commission,
        }
    }

    (commission_ars, commission_usd, total_orders)
}

/// Revenue per currency from a set of sale rows. Used by the sale
/// replacement flow to recompute the event's stored revenue fields.
pub fn revenue_by_currency(sales: &[TicketSale]) -> (Money, Money) {
    let mut ars = Money::zero();
    let mut usd = Money::zero();
    for sale in sales {
        match sale.currency {
            Currency::Ars => ars += sale.subtotal(),
            Currency::Usd => usd += sale.subtotal(),
        }
    }
    (ars, usd)
}

// =============================================================================
// Unit Tests
// =============================================================================
