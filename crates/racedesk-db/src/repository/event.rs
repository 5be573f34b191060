//! # Event Repository
//!
//! Database operations for events and their child rows: ticket sales,
//! photographer assignments and specific expenses.
//!
//! ## Replace-On-Write
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Child-Set Replacement                                   │
//! │                                                                         │
//! │  PUT sales / assignments / expenses                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. normalize every draft row through the core codec                    │
//! │  2. BEGIN                                                               │
//! │  3.   (assignments only) resolve-or-create photographers,              │
//! │       count existing rows, apply the empty-replacement guard           │
//! │  4.   DELETE the full child set                                        │
//! │  5.   INSERT the replacement rows                                      │
//! │  6.   (sales only) recompute and store the event's revenue fields     │
//! │  7. COMMIT                                                             │
//! │                                                                         │
//! │  Concurrent replacements of the same parent are serialized by          │
//! │  SQLite; the core never reconciles concurrent writes.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use tracing::{debug, warn};

use racedesk_core::fees::{
    DEFAULT_DEBIT_CREDIT_PCT, DEFAULT_GROSS_RECEIPTS_PCT, DEFAULT_PROCESSOR_PCT,
    DEFAULT_PROVIDER_PCT, DEFAULT_VAT_PCT,
};
use racedesk_core::money::{parse_percent, parse_percent_or_default};
use racedesk_core::report::{compute_event_financials, revenue_by_currency, summarize_events};
use racedesk_core::validation::{
    clean_optional, guard_replacement, parse_iso_date, validate_count, validate_name,
};
use racedesk_core::{
    AssignmentDraft, CoreError, Currency, Event, EventFinancials, EventPatch, EventSummary,
    ExpenseDraft, Money, NewEvent, PhotographerAssignment, SaleDraft, SaleKind, SpecificExpense,
    TicketSale, ValidationError,
};

use crate::error::{DbError, DbResult};
use crate::repository::decimal_col;

/// Event read model: the event, its raw child rows and the computed
/// financial breakdown, everything the detail endpoint renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDetail {
    pub event: Event,
    pub sales: Vec<TicketSale>,
    pub photographers: Vec<PhotographerAssignment>,
    pub expenses: Vec<SpecificExpense>,
    pub financials: EventFinancials,
}

/// Repository for event database operations.
#[derive(Debug, Clone)]
pub struct EventRepository {
    pool: SqlitePool,
}

impl EventRepository {
    /// Creates a new EventRepository.
    pub fn new(pool: SqlitePool) -> Self {
        EventRepository { pool }
    }

    // =========================================================================
    // Event CRUD
    // =========================================================================

    /// Creates an event. Fee percentages omitted from the payload receive
    /// the business defaults; an explicit value (including zero) is kept.
    pub async fn create(&self, draft: &NewEvent) -> DbResult<Event> {
        let name = validate_name("name", &draft.name).map_err(CoreError::from)?;
        let date = parse_iso_date(&draft.date)?;

        let processor =
            parse_percent_or_default(draft.processor_pct.as_deref(), DEFAULT_PROCESSOR_PCT);
        let gross_receipts = parse_percent_or_default(
            draft.gross_receipts_pct.as_deref(),
            DEFAULT_GROSS_RECEIPTS_PCT,
        );
        let vat = parse_percent_or_default(draft.vat_pct.as_deref(), DEFAULT_VAT_PCT);
        let provider =
            parse_percent_or_default(draft.provider_pct.as_deref(), DEFAULT_PROVIDER_PCT);
        let debit_credit =
            parse_percent_or_default(draft.debit_credit_pct.as_deref(), DEFAULT_DEBIT_CREDIT_PCT);

        debug!(name = %name, date = %date, "Creating event");

        let result = sqlx::query(
            r#"
            INSERT INTO events (
                name, date, venue, kind, runners, accesses, base_currency,
                revenue_ars_cents, revenue_usd_cents,
                processor_pct, gross_receipts_pct, vat_pct, provider_pct, debit_credit_pct
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&name)
        .bind(date)
        .bind(clean_optional(draft.venue.as_deref()))
        .bind(clean_optional(draft.kind.as_deref()))
        .bind(draft.runners)
        .bind(draft.accesses)
        .bind(Currency::Ars.code())
        .bind(Money::parse(draft.revenue_ars.as_deref().unwrap_or("")).cents())
        .bind(Money::parse(draft.revenue_usd.as_deref().unwrap_or("")).cents())
        .bind(processor.map(|d| d.to_string()))
        .bind(gross_receipts.map(|d| d.to_string()))
        .bind(vat.map(|d| d.to_string()))
        .bind(provider.map(|d| d.to_string()))
        .bind(debit_credit.map(|d| d.to_string()))
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Event", id))
    }

    /// Gets an event by id.
    pub async fn get(&self, id: i64) -> DbResult<Option<Event>> {
        let row = sqlx::query("SELECT * FROM events WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_event).transpose()
    }

    /// Applies a sparse update. Blank strings leave the stored value
    /// untouched so a half-filled form never wipes anything.
    pub async fn update(&self, id: i64, patch: &EventPatch) -> DbResult<Event> {
        if patch.is_empty() {
            return Err(CoreError::from(ValidationError::Required {
                field: "update data",
            })
            .into());
        }

        let mut event = self
            .get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Event", id))?;

        if let Some(name) = &patch.name {
            event.name = validate_name("name", name).map_err(CoreError::from)?;
        }
        if let Some(date) = &patch.date {
            if !date.trim().is_empty() {
                event.date = parse_iso_date(date)?;
            }
        }
        if patch.venue.is_some() {
            event.venue = clean_optional(patch.venue.as_deref());
        }
        if patch.kind.is_some() {
            event.kind = clean_optional(patch.kind.as_deref());
        }
        if let Some(runners) = patch.runners {
            event.runners = Some(validate_count("runners", runners).map_err(CoreError::from)?);
        }
        if let Some(accesses) = patch.accesses {
            event.accesses = Some(validate_count("accesses", accesses).map_err(CoreError::from)?);
        }

        // Money and percentages: only non-blank inputs change anything
        let set_money = |target: &mut i64, raw: &Option<String>| {
            if let Some(s) = raw {
                if !s.trim().is_empty() {
                    *target = Money::parse(s).cents();
                }
            }
        };
        set_money(&mut event.revenue_ars_cents, &patch.revenue_ars);
        set_money(&mut event.revenue_usd_cents, &patch.revenue_usd);

        let set_pct = |target: &mut Option<rust_decimal::Decimal>, raw: &Option<String>| {
            if let Some(s) = raw {
                if !s.trim().is_empty() {
                    *target = parse_percent(s);
                }
            }
        };
        set_pct(&mut event.processor_pct, &patch.processor_pct);
        set_pct(&mut event.gross_receipts_pct, &patch.gross_receipts_pct);
        set_pct(&mut event.vat_pct, &patch.vat_pct);
        set_pct(&mut event.provider_pct, &patch.provider_pct);
        set_pct(&mut event.debit_credit_pct, &patch.debit_credit_pct);

        sqlx::query(
            r#"
            UPDATE events SET
                name = ?2, date = ?3, venue = ?4, kind = ?5,
                runners = ?6, accesses = ?7,
                revenue_ars_cents = ?8, revenue_usd_cents = ?9,
                processor_pct = ?10, gross_receipts_pct = ?11, vat_pct = ?12,
                provider_pct = ?13, debit_credit_pct = ?14
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&event.name)
        .bind(event.date)
        .bind(&event.venue)
        .bind(&event.kind)
        .bind(event.runners)
        .bind(event.accesses)
        .bind(event.revenue_ars_cents)
        .bind(event.revenue_usd_cents)
        .bind(event.processor_pct.map(|d| d.to_string()))
        .bind(event.gross_receipts_pct.map(|d| d.to_string()))
        .bind(event.vat_pct.map(|d| d.to_string()))
        .bind(event.provider_pct.map(|d| d.to_string()))
        .bind(event.debit_credit_pct.map(|d| d.to_string()))
        .execute(&self.pool)
        .await?;

        Ok(event)
    }

    /// Deletes an event and every dependent row in one transaction.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        // children before the parent
        sqlx::query("DELETE FROM ticket_sales WHERE event_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM event_photographers WHERE event_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM specific_expenses WHERE event_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM cash_movements WHERE event_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM events WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Event", id));
        }

        tx.commit().await?;
        Ok(())
    }

    // =========================================================================
    // Read Models
    // =========================================================================

    /// Full detail view: event, raw child rows, computed financials.
    pub async fn detail(&self, id: i64) -> DbResult<Option<EventDetail>> {
        let Some(event) = self.get(id).await? else {
            return Ok(None);
        };

        let sales = self.sales(id).await?;
        let photographers = self.assignments(id).await?;
        let expenses = self.expenses(id).await?;

        let financials =
            compute_event_financials(&sales, &photographers, &expenses, &event.fee_schedule());

        Ok(Some(EventDetail {
            event,
            sales,
            photographers,
            expenses,
            financials,
        }))
    }

    /// Executive list: every event with its summary figures, newest race
    /// first. Three grouped bulk queries feed one in-memory fold; the
    /// figures match what `detail` would compute for each event.
    pub async fn list(&self) -> DbResult<Vec<EventSummary>> {
        let rows = sqlx::query("SELECT * FROM events ORDER BY date DESC, id DESC")
            .fetch_all(&self.pool)
            .await?;
        let events: Vec<Event> = rows.iter().map(map_event).collect::<DbResult<_>>()?;

        if events.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = events.iter().map(|e| e.id).collect();

        let mut photographer_costs: HashMap<i64, i64> = HashMap::new();
        let rows = sqlx::query(
            "SELECT event_id, SUM(cost_cents) AS total FROM event_photographers GROUP BY event_id",
        )
        .fetch_all(&self.pool)
        .await?;
        for row in &rows {
            photographer_costs.insert(row.try_get("event_id")?, row.try_get("total")?);
        }

        let mut expense_totals: HashMap<i64, i64> = HashMap::new();
        let rows = sqlx::query(
            "SELECT event_id, SUM(amount_cents) AS total FROM specific_expenses GROUP BY event_id",
        )
        .fetch_all(&self.pool)
        .await?;
        for row in &rows {
            expense_totals.insert(row.try_get("event_id")?, row.try_get("total")?);
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("SELECT * FROM ticket_sales WHERE event_id IN ({placeholders})");
        let mut query = sqlx::query(&sql);
        for id in &ids {
            query = query.bind(*id);
        }
        let rows = query.fetch_all(&self.pool).await?;
        let sales: Vec<TicketSale> = rows.iter().map(map_sale).collect::<DbResult<_>>()?;

        Ok(summarize_events(
            events,
            &photographer_costs,
            &expense_totals,
            &sales,
        ))
    }

    // =========================================================================
    // Ticket Sales
    // =========================================================================

    /// All sale rows of an event.
    pub async fn sales(&self, event_id: i64) -> DbResult<Vec<TicketSale>> {
        let rows = sqlx::query("SELECT * FROM ticket_sales WHERE event_id = ?1 ORDER BY id ASC")
            .bind(event_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(map_sale).collect()
    }

    /// Replaces the full sale set and recomputes the event's stored
    /// revenue fields from the replacement rows, atomically.
    ///
    /// Rows with a blank label are skipped. An invalid currency or sale
    /// kind rejects the whole batch before anything is written.
    pub async fn replace_sales(
        &self,
        event_id: i64,
        drafts: &[SaleDraft],
    ) -> DbResult<Vec<TicketSale>> {
        self.get(event_id)
            .await?
            .ok_or_else(|| DbError::not_found("Event", event_id))?;

        let mut cleaned: Vec<TicketSale> = Vec::new();
        for draft in drafts {
            let label = draft.label.trim();
            if label.is_empty() {
                continue;
            }

            cleaned.push(TicketSale {
                id: 0, // assigned on insert
                event_id,
                label: label.to_string(),
                kind: SaleKind::parse(&draft.kind)?,
                currency: Currency::parse(&draft.currency)?,
                unit_price_cents: Money::parse(draft.unit_price.as_deref().unwrap_or("")).cents(),
                quantity: validate_count("quantity", draft.quantity.unwrap_or(0))
                    .map_err(CoreError::from)?,
                commission_pct: match draft.commission_pct.as_deref() {
                    None => None,
                    Some(s) if s.trim().is_empty() => None,
                    Some(s) => parse_percent(s),
                },
            });
        }

        debug!(event_id, rows = cleaned.len(), "Replacing ticket sales");

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM ticket_sales WHERE event_id = ?1")
            .bind(event_id)
            .execute(&mut *tx)
            .await?;

        for sale in &cleaned {
            sqlx::query(
                r#"
                INSERT INTO ticket_sales (
                    event_id, label, kind, currency,
                    unit_price_cents, quantity, commission_pct
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(event_id)
            .bind(&sale.label)
            .bind(sale.kind.code())
            .bind(sale.currency.code())
            .bind(sale.unit_price_cents)
            .bind(sale.quantity)
            .bind(sale.commission_pct.map(|d| d.to_string()))
            .execute(&mut *tx)
            .await?;
        }

        // Revenue follows the sale rows; same transaction so readers never
        // observe the fields out of sync with the set.
        let (revenue_ars, revenue_usd) = revenue_by_currency(&cleaned);
        sqlx::query(
            "UPDATE events SET revenue_ars_cents = ?2, revenue_usd_cents = ?3 WHERE id = ?1",
        )
        .bind(event_id)
        .bind(revenue_ars.cents())
        .bind(revenue_usd.cents())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.sales(event_id).await
    }

    // =========================================================================
    // Photographer Assignments
    // =========================================================================

    /// All assignment rows of an event.
    pub async fn assignments(&self, event_id: i64) -> DbResult<Vec<PhotographerAssignment>> {
        let rows =
            sqlx::query("SELECT * FROM event_photographers WHERE event_id = ?1 ORDER BY id ASC")
                .bind(event_id)
                .fetch_all(&self.pool)
                .await?;
        rows.iter().map(map_assignment).collect()
    }

    /// Replaces the full assignment set.
    ///
    /// Each draft row resolves to a photographer by id, then by name, and
    /// is created by name as a last resort; rows resolving to neither are
    /// dropped. Replacing a non-empty set with an empty result is rejected
    /// and nothing changes (photographers created while cleaning roll back
    /// with the transaction).
    pub async fn replace_assignments(
        &self,
        event_id: i64,
        drafts: &[AssignmentDraft],
    ) -> DbResult<Vec<PhotographerAssignment>> {
        self.get(event_id)
            .await?
            .ok_or_else(|| DbError::not_found("Event", event_id))?;

        let mut tx = self.pool.begin().await?;

        let existing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM event_photographers WHERE event_id = ?1")
                .bind(event_id)
                .fetch_one(&mut *tx)
                .await?;

        let mut cleaned: Vec<PhotographerAssignment> = Vec::new();
        for draft in drafts {
            let Some((photographer_id, name)) = resolve_photographer(&mut tx, draft).await? else {
                warn!(event_id, "{}", CoreError::UnresolvedReference);
                continue;
            };

            cleaned.push(PhotographerAssignment {
                id: 0, // assigned on insert
                event_id,
                photographer_id,
                name,
                cost_cents: Money::parse(draft.cost.as_deref().unwrap_or("")).cents(),
                photos_taken: validate_count("photos_taken", draft.photos_taken.unwrap_or(0))
                    .map_err(CoreError::from)?,
                downloads: validate_count("downloads", draft.downloads.unwrap_or(0))
                    .map_err(CoreError::from)?,
                unique_downloads: validate_count(
                    "unique_downloads",
                    draft.unique_downloads.unwrap_or(0),
                )
                .map_err(CoreError::from)?,
                hours_worked: parse_hours(draft.hours_worked.as_deref()),
                invoiced: draft.invoiced.unwrap_or(false),
                paid: draft.paid.unwrap_or(false),
                role: clean_optional(draft.role.as_deref()),
            });
        }

        // Dropping the transaction on error rolls back any photographers
        // created while cleaning.
        guard_replacement(existing as usize, cleaned.len()).map_err(DbError::from)?;

        debug!(event_id, rows = cleaned.len(), "Replacing assignments");

        sqlx::query("DELETE FROM event_photographers WHERE event_id = ?1")
            .bind(event_id)
            .execute(&mut *tx)
            .await?;

        for a in &cleaned {
            sqlx::query(
                r#"
                INSERT INTO event_photographers (
                    event_id, photographer_id, name, cost_cents,
                    photos_taken, downloads, unique_downloads,
                    hours_worked, invoiced, paid, role
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                "#,
            )
            .bind(event_id)
            .bind(a.photographer_id)
            .bind(&a.name)
            .bind(a.cost_cents)
            .bind(a.photos_taken)
            .bind(a.downloads)
            .bind(a.unique_downloads)
            .bind(a.hours_worked)
            .bind(a.invoiced)
            .bind(a.paid)
            .bind(&a.role)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.assignments(event_id).await
    }

    // =========================================================================
    // Specific Expenses
    // =========================================================================

    /// All specific-expense rows of an event.
    pub async fn expenses(&self, event_id: i64) -> DbResult<Vec<SpecificExpense>> {
        let rows =
            sqlx::query("SELECT * FROM specific_expenses WHERE event_id = ?1 ORDER BY id ASC")
                .bind(event_id)
                .fetch_all(&self.pool)
                .await?;
        rows.iter().map(map_expense).collect()
    }

    /// Replaces the full specific-expense set. Rows with blank labels are
    /// skipped.
    pub async fn replace_expenses(
        &self,
        event_id: i64,
        drafts: &[ExpenseDraft],
    ) -> DbResult<Vec<SpecificExpense>> {
        self.get(event_id)
            .await?
            .ok_or_else(|| DbError::not_found("Event", event_id))?;

        let mut cleaned = Vec::new();
        for draft in drafts {
            let Some(label) = clean_optional(draft.label.as_deref()) else {
                continue;
            };
            cleaned.push(SpecificExpense {
                id: 0, // assigned on insert
                event_id,
                label,
                kind: clean_optional(draft.kind.as_deref()),
                amount_cents: Money::parse(draft.amount.as_deref().unwrap_or("0")).cents(),
                paid: draft.paid.unwrap_or(false),
                invoiced: draft.invoiced.unwrap_or(false),
            });
        }

        debug!(event_id, rows = cleaned.len(), "Replacing specific expenses");

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM specific_expenses WHERE event_id = ?1")
            .bind(event_id)
            .execute(&mut *tx)
            .await?;

        for e in &cleaned {
            sqlx::query(
                r#"
                INSERT INTO specific_expenses (
                    event_id, label, kind, amount_cents, paid, invoiced
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(event_id)
            .bind(&e.label)
            .bind(&e.kind)
            .bind(e.amount_cents)
            .bind(e.paid)
            .bind(e.invoiced)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.expenses(event_id).await
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Resolves a draft row to `(photographer_id, name)`: by id, then by exact
/// name, then by creating the photographer. `None` when the row carries
/// neither a known id nor a usable name.
async fn resolve_photographer(
    tx: &mut Transaction<'_, Sqlite>,
    draft: &AssignmentDraft,
) -> DbResult<Option<(i64, String)>> {
    let name = clean_optional(draft.name.as_deref());

    if let Some(id) = draft.photographer_id {
        let row = sqlx::query("SELECT id, name FROM photographers WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
        if let Some(row) = row {
            return Ok(Some((row.try_get("id")?, row.try_get("name")?)));
        }
    }

    let Some(name) = name else {
        return Ok(None);
    };

    let row = sqlx::query("SELECT id, name FROM photographers WHERE name = ?1 LIMIT 1")
        .bind(&name)
        .fetch_optional(&mut **tx)
        .await?;
    if let Some(row) = row {
        return Ok(Some((row.try_get("id")?, row.try_get("name")?)));
    }

    let result = sqlx::query("INSERT INTO photographers (name) VALUES (?1)")
        .bind(&name)
        .execute(&mut **tx)
        .await?;
    Ok(Some((result.last_insert_rowid(), name)))
}

/// Hours accept comma decimals ("2,5"); anything unparseable is 0.
fn parse_hours(raw: Option<&str>) -> f64 {
    match raw {
        None => 0.0,
        Some(s) => s.trim().replace(',', ".").parse().unwrap_or(0.0),
    }
}

// =============================================================================
// Row Mapping
// =============================================================================

pub(crate) fn map_event(row: &SqliteRow) -> DbResult<Event> {
    let base_currency: String = row.try_get("base_currency")?;
    Ok(Event {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        date: row.try_get("date")?,
        venue: row.try_get("venue")?,
        kind: row.try_get("kind")?,
        runners: row.try_get("runners")?,
        accesses: row.try_get("accesses")?,
        base_currency: Currency::parse(&base_currency)?,
        revenue_ars_cents: row.try_get("revenue_ars_cents")?,
        revenue_usd_cents: row.try_get("revenue_usd_cents")?,
        processor_pct: decimal_col(row, "processor_pct")?,
        gross_receipts_pct: decimal_col(row, "gross_receipts_pct")?,
        vat_pct: decimal_col(row, "vat_pct")?,
        provider_pct: decimal_col(row, "provider_pct")?,
        debit_credit_pct: decimal_col(row, "debit_credit_pct")?,
    })
}

pub(crate) fn map_sale(row: &SqliteRow) -> DbResult<TicketSale> {
    let kind: String = row.try_get("kind")?;
    let currency: String = row.try_get("currency")?;
    Ok(TicketSale {
        id: row.try_get("id")?,
        event_id: row.try_get("event_id")?,
        label: row.try_get("label")?,
        kind: SaleKind::parse(&kind)?,
        currency: Currency::parse(&currency)?,
        unit_price_cents: row.try_get("unit_price_cents")?,
        quantity: row.try_get("quantity")?,
        commission_pct: decimal_col(row, "commission_pct")?,
    })
}

pub(crate) fn map_assignment(row: &SqliteRow) -> DbResult<PhotographerAssignment> {
    Ok(PhotographerAssignment {
        id: row.try_get("id")?,
        event_id: row.try_get("event_id")?,
        photographer_id: row.try_get("photographer_id")?,
        name: row.try_get("name")?,
        cost_cents: row.try_get("cost_cents")?,
        photos_taken: row.try_get("photos_taken")?,
        downloads: row.try_get("downloads")?,
        unique_downloads: row.try_get("unique_downloads")?,
        hours_worked: row.try_get("hours_worked")?,
        invoiced: row.try_get("invoiced")?,
        paid: row.try_get("paid")?,
        role: row.try_get("role")?,
    })
}

pub(crate) fn map_expense(row: &SqliteRow) -> DbResult<SpecificExpense> {
    Ok(SpecificExpense {
        id: row.try_get("id")?,
        event_id: row.try_get("event_id")?,
        label: row.try_get("label")?,
        kind: row.try_get("kind")?,
        amount_cents: row.try_get("amount_cents")?,
        paid: row.try_get("paid")?,
        invoiced: row.try_get("invoiced")?,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use rust_decimal::Decimal;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn race(name: &str) -> NewEvent {
        NewEvent {
            name: name.to_string(),
            date: "2026-03-15".to_string(),
            ..Default::default()
        }
    }

    fn ars_sale(label: &str, unit_price: &str, quantity: i64) -> SaleDraft {
        SaleDraft {
            label: label.to_string(),
            kind: "presale".to_string(),
            currency: "ARS".to_string(),
            unit_price: Some(unit_price.to_string()),
            quantity: Some(quantity),
            commission_pct: None,
        }
    }

    fn crew(name: &str) -> AssignmentDraft {
        AssignmentDraft {
            name: Some(name.to_string()),
            cost: Some("100".to_string()),
            photos_taken: Some(10),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_applies_fee_defaults() {
        let db = test_db().await;
        let event = db.events().create(&race("Night Trail 10K")).await.unwrap();

        assert_eq!(event.name, "Night Trail 10K");
        assert_eq!(event.base_currency, Currency::Ars);
        assert_eq!(event.processor_pct, Some(Decimal::from(2)));
        assert_eq!(event.gross_receipts_pct, Some(Decimal::from(4)));
        assert_eq!(event.vat_pct, Some(Decimal::new(105, 1)));
        assert_eq!(event.provider_pct, Some(Decimal::from(17)));
        assert_eq!(event.debit_credit_pct, Some(Decimal::new(12, 1)));
    }

    #[tokio::test]
    async fn test_create_keeps_explicit_zero_percentages() {
        let db = test_db().await;
        let draft = NewEvent {
            vat_pct: Some("0".to_string()),
            ..race("Street 5K")
        };
        let event = db.events().create(&draft).await.unwrap();

        // explicit zero is not replaced by the 10.5 default
        assert_eq!(event.vat_pct, Some(Decimal::ZERO));
        assert_eq!(event.processor_pct, Some(Decimal::from(2)));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_dates() {
        let db = test_db().await;
        let draft = NewEvent {
            date: "15/03/2026".to_string(),
            ..race("Bad Date")
        };
        let err = db.events().create(&draft).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::InvalidDate(_))));
    }

    #[tokio::test]
    async fn test_replace_sales_recomputes_revenue() {
        let db = test_db().await;
        let event = db.events().create(&race("Trail")).await.unwrap();

        let sales = db
            .events()
            .replace_sales(event.id, &[ars_sale("Presale 1", "100", 3)])
            .await
            .unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].unit_price_cents, 10_000);

        let stored = db.events().get(event.id).await.unwrap().unwrap();
        assert_eq!(stored.revenue_ars_cents, 30_000);
        assert_eq!(stored.revenue_usd_cents, 0);
    }

    #[tokio::test]
    async fn test_replace_sales_is_idempotent_on_revenue() {
        let db = test_db().await;
        let event = db.events().create(&race("Trail")).await.unwrap();

        let drafts = vec![
            ars_sale("Presale 1", "100", 3),
            SaleDraft {
                label: "USD pack".to_string(),
                kind: "pack".to_string(),
                currency: "USD".to_string(),
                unit_price: Some("25".to_string()),
                quantity: Some(2),
                commission_pct: Some("5".to_string()),
            },
        ];

        db.events().replace_sales(event.id, &drafts).await.unwrap();
        let first = db.events().get(event.id).await.unwrap().unwrap();

        // replacing with an identical set leaves the stored revenue unchanged
        db.events().replace_sales(event.id, &drafts).await.unwrap();
        let second = db.events().get(event.id).await.unwrap().unwrap();

        assert_eq!(first.revenue_ars_cents, second.revenue_ars_cents);
        assert_eq!(first.revenue_usd_cents, second.revenue_usd_cents);
        assert_eq!(second.revenue_ars_cents, 30_000);
        assert_eq!(second.revenue_usd_cents, 5_000);
    }

    #[tokio::test]
    async fn test_replace_sales_rejects_unknown_currency() {
        let db = test_db().await;
        let event = db.events().create(&race("Trail")).await.unwrap();

        let mut draft = ars_sale("Presale 1", "100", 3);
        draft.currency = "EUR".to_string();

        let err = db
            .events()
            .replace_sales(event.id, &[draft])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::InvalidEnum { field: "currency", .. })
        ));

        // nothing was written
        assert!(db.events().sales(event.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_detail_matches_worked_example() {
        let db = test_db().await;
        let draft = NewEvent {
            processor_pct: Some("2".to_string()),
            gross_receipts_pct: Some("4".to_string()),
            vat_pct: Some("0".to_string()),
            provider_pct: Some("0".to_string()),
            debit_credit_pct: Some("0".to_string()),
            ..race("Worked Example")
        };
        let event = db.events().create(&draft).await.unwrap();
        db.events()
            .replace_sales(event.id, &[ars_sale("Presale", "100", 3)])
            .await
            .unwrap();

        let detail = db.events().detail(event.id).await.unwrap().unwrap();
        let calc = &detail.financials;

        assert_eq!(calc.revenue_ars_cents, 30_000);
        assert_eq!(calc.processor_fee_cents, 600);
        assert_eq!(calc.gross_receipts_tax_cents, 1_200);
        assert_eq!(calc.total_costs_ars_cents, 1_800);
        assert_eq!(calc.net_ars_cents, 28_200);
    }

    #[tokio::test]
    async fn test_list_matches_detail() {
        let db = test_db().await;
        let events = db.events();

        let a = events.create(&race("Race A")).await.unwrap();
        let b = events.create(&race("Race B")).await.unwrap();
        // Race C stays empty on purpose
        let c = events.create(&race("Race C")).await.unwrap();

        events
            .replace_sales(
                a.id,
                &[
                    ars_sale("Presale 1", "150", 10),
                    SaleDraft {
                        label: "Pack".to_string(),
                        kind: "pack".to_string(),
                        currency: "USD".to_string(),
                        unit_price: Some("30".to_string()),
                        quantity: Some(4),
                        commission_pct: Some("2,5".to_string()),
                    },
                ],
            )
            .await
            .unwrap();
        events
            .replace_assignments(a.id, &[crew("Ana"), crew("Bruno")])
            .await
            .unwrap();
        events
            .replace_expenses(
                a.id,
                &[ExpenseDraft {
                    label: Some("Fuel".to_string()),
                    amount: Some("50,25".to_string()),
                    ..Default::default()
                }],
            )
            .await
            .unwrap();

        events
            .replace_sales(b.id, &[ars_sale("Unit", "999,99", 7)])
            .await
            .unwrap();

        let summaries = events.list().await.unwrap();
        assert_eq!(summaries.len(), 3);

        for summary in &summaries {
            let detail = events.detail(summary.event.id).await.unwrap().unwrap();
            assert_eq!(
                summary.net_ars_cents, detail.financials.net_ars_cents,
                "net mismatch for {}",
                summary.event.name
            );
            assert_eq!(
                summary.total_costs_ars_cents, detail.financials.total_costs_ars_cents,
                "cost mismatch for {}",
                summary.event.name
            );
            assert_eq!(summary.total_orders, detail.financials.total_orders);
        }

        // the empty event appears with zero aggregates
        let empty = summaries.iter().find(|s| s.event.id == c.id).unwrap();
        assert_eq!(empty.total_costs_ars_cents, 0);
        assert_eq!(empty.net_ars_cents, 0);
        assert_eq!(empty.total_orders, 0);
    }

    #[tokio::test]
    async fn test_empty_replacement_guard() {
        let db = test_db().await;
        let event = db.events().create(&race("Guarded")).await.unwrap();

        let rows = db
            .events()
            .replace_assignments(event.id, &[crew("Ana"), crew("Bruno")])
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);

        let err = db
            .events()
            .replace_assignments(event.id, &[])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::EmptyReplacementGuard { existing: 2 })
        ));

        // the original rows survived
        let rows = db.events().assignments(event.id).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Ana");
    }

    #[tokio::test]
    async fn test_unresolvable_assignment_rows_are_dropped() {
        let db = test_db().await;
        let event = db.events().create(&race("Partial")).await.unwrap();

        let rows = db
            .events()
            .replace_assignments(
                event.id,
                &[
                    crew("Ana"),
                    // neither id nor name: dropped, not invented
                    AssignmentDraft::default(),
                    // unknown id but a usable name: resolved by name
                    AssignmentDraft {
                        photographer_id: Some(9_999),
                        name: Some("Bruno".to_string()),
                        ..Default::default()
                    },
                ],
            )
            .await
            .unwrap();

        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Bruno"]);
    }

    #[tokio::test]
    async fn test_assignments_reuse_photographers_by_name() {
        let db = test_db().await;
        let event = db.events().create(&race("Reuse")).await.unwrap();

        let first = db
            .events()
            .replace_assignments(event.id, &[crew("Ana")])
            .await
            .unwrap();
        let second = db
            .events()
            .replace_assignments(event.id, &[crew("Ana")])
            .await
            .unwrap();

        // same global identity both times, no duplicate photographer rows
        assert_eq!(first[0].photographer_id, second[0].photographer_id);
        let photographers = db.photographers().list_with_kpis().await.unwrap();
        assert_eq!(photographers.len(), 1);
    }

    #[tokio::test]
    async fn test_update_patch_semantics() {
        let db = test_db().await;
        let event = db.events().create(&race("Patchable")).await.unwrap();

        let patch = EventPatch {
            name: Some("Renamed".to_string()),
            // blank strings must not wipe stored values
            revenue_ars: Some("".to_string()),
            vat_pct: Some(" ".to_string()),
            ..Default::default()
        };
        let updated = db.events().update(event.id, &patch).await.unwrap();

        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.revenue_ars_cents, event.revenue_ars_cents);
        assert_eq!(updated.vat_pct, event.vat_pct);

        let err = db
            .events()
            .update(event.id, &EventPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_cascades_children() {
        let db = test_db().await;
        let event = db.events().create(&race("Doomed")).await.unwrap();
        db.events()
            .replace_sales(event.id, &[ars_sale("Presale", "10", 1)])
            .await
            .unwrap();
        db.events()
            .replace_assignments(event.id, &[crew("Ana")])
            .await
            .unwrap();

        db.events().delete(event.id).await.unwrap();

        assert!(db.events().get(event.id).await.unwrap().is_none());
        assert!(db.events().sales(event.id).await.unwrap().is_empty());
        assert!(db.events().assignments(event.id).await.unwrap().is_empty());

        // the photographer identity itself survives
        assert_eq!(db.photographers().list_with_kpis().await.unwrap().len(), 1);

        let err = db.events().delete(event.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
