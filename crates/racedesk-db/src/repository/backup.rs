//! # Backup Repository
//!
//! Bulk export/import/reset for backup and migration.
//!
//! ## Referential Integrity Ordering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Import / Reset Sequencing                            │
//! │                                                                         │
//! │  DELETE children before parents:                                       │
//! │    cash_movements → specific_expenses → event_photographers            │
//! │    → ticket_sales → events → photographers → movement_types            │
//! │                                                                         │
//! │  INSERT parents before children:                                       │
//! │    events, photographers, movement_types                               │
//! │    → ticket_sales, event_photographers, specific_expenses              │
//! │    → cash_movements                                                    │
//! │                                                                         │
//! │  The whole sequence is one transaction: a failed import leaves the     │
//! │  previous data fully intact.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ids are preserved verbatim so cross-references inside the document stay
//! valid after a round trip.

use serde::{Deserialize, Serialize};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::info;

use racedesk_core::{
    CashMovement, Event, MovementType, Photographer, PhotographerAssignment, SpecificExpense,
    TicketSale,
};

use crate::error::DbResult;
use crate::repository::event::{map_assignment, map_event, map_expense, map_sale};
use crate::repository::ledger::{map_movement, map_movement_type};
use crate::repository::photographer::map_photographer;

/// Everything the database holds, as one serializable document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackupDocument {
    pub events: Vec<Event>,
    pub photographers: Vec<Photographer>,
    pub ticket_sales: Vec<TicketSale>,
    pub assignments: Vec<PhotographerAssignment>,
    pub specific_expenses: Vec<SpecificExpense>,
    pub movement_types: Vec<MovementType>,
    pub cash_movements: Vec<CashMovement>,
}

/// Repository for bulk backup operations.
#[derive(Debug, Clone)]
pub struct BackupRepository {
    pool: SqlitePool,
}

impl BackupRepository {
    /// Creates a new BackupRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BackupRepository { pool }
    }

    /// Exports every table into one document.
    pub async fn export(&self) -> DbResult<BackupDocument> {
        let events = sqlx::query("SELECT * FROM events ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(map_event)
            .collect::<DbResult<_>>()?;
        let photographers = sqlx::query("SELECT * FROM photographers ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(map_photographer)
            .collect::<DbResult<_>>()?;
        let ticket_sales = sqlx::query("SELECT * FROM ticket_sales ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(map_sale)
            .collect::<DbResult<_>>()?;
        let assignments = sqlx::query("SELECT * FROM event_photographers ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(map_assignment)
            .collect::<DbResult<_>>()?;
        let specific_expenses = sqlx::query("SELECT * FROM specific_expenses ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(map_expense)
            .collect::<DbResult<_>>()?;
        let movement_types = sqlx::query("SELECT * FROM movement_types ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(map_movement_type)
            .collect::<DbResult<_>>()?;
        let cash_movements = sqlx::query("SELECT * FROM cash_movements ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(map_movement)
            .collect::<DbResult<_>>()?;

        Ok(BackupDocument {
            events,
            photographers,
            ticket_sales,
            assignments,
            specific_expenses,
            movement_types,
            cash_movements,
        })
    }

    /// Replaces the whole database with the document's content, in one
    /// transaction.
    pub async fn import(&self, doc: &BackupDocument) -> DbResult<()> {
        info!(
            events = doc.events.len(),
            photographers = doc.photographers.len(),
            movements = doc.cash_movements.len(),
            "Importing backup"
        );

        let mut tx = self.pool.begin().await?;

        delete_all(&mut tx).await?;

        for e in &doc.events {
            sqlx::query(
                r#"
                INSERT INTO events (
                    id, name, date, venue, kind, runners, accesses, base_currency,
                    revenue_ars_cents, revenue_usd_cents,
                    processor_pct, gross_receipts_pct, vat_pct, provider_pct, debit_credit_pct
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
                "#,
            )
            .bind(e.id)
            .bind(&e.name)
            .bind(e.date)
            .bind(&e.venue)
            .bind(&e.kind)
            .bind(e.runners)
            .bind(e.accesses)
            .bind(e.base_currency.code())
            .bind(e.revenue_ars_cents)
            .bind(e.revenue_usd_cents)
            .bind(e.processor_pct.map(|d| d.to_string()))
            .bind(e.gross_receipts_pct.map(|d| d.to_string()))
            .bind(e.vat_pct.map(|d| d.to_string()))
            .bind(e.provider_pct.map(|d| d.to_string()))
            .bind(e.debit_credit_pct.map(|d| d.to_string()))
            .execute(&mut *tx)
            .await?;
        }

        for p in &doc.photographers {
            sqlx::query(
                r#"
                INSERT INTO photographers (
                    id, name, email, phone, location, tax_id, national_id,
                    bank_account, bank_alias, billing_kind, notes
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                "#,
            )
            .bind(p.id)
            .bind(&p.name)
            .bind(&p.email)
            .bind(&p.phone)
            .bind(&p.location)
            .bind(&p.tax_id)
            .bind(&p.national_id)
            .bind(&p.bank_account)
            .bind(&p.bank_alias)
            .bind(&p.billing_kind)
            .bind(&p.notes)
            .execute(&mut *tx)
            .await?;
        }

        for t in &doc.movement_types {
            sqlx::query(
                "INSERT INTO movement_types (id, name, movement_group, scope) VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(&t.id)
            .bind(&t.name)
            .bind(&t.group)
            .bind(t.scope.code())
            .execute(&mut *tx)
            .await?;
        }

        for s in &doc.ticket_sales {
            sqlx::query(
                r#"
                INSERT INTO ticket_sales (
                    id, event_id, label, kind, currency,
                    unit_price_cents, quantity, commission_pct
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(s.id)
            .bind(s.event_id)
            .bind(&s.label)
            .bind(s.kind.code())
            .bind(s.currency.code())
            .bind(s.unit_price_cents)
            .bind(s.quantity)
            .bind(s.commission_pct.map(|d| d.to_string()))
            .execute(&mut *tx)
            .await?;
        }

        for a in &doc.assignments {
            sqlx::query(
                r#"
                INSERT INTO event_photographers (
                    id, event_id, photographer_id, name, cost_cents,
                    photos_taken, downloads, unique_downloads,
                    hours_worked, invoiced, paid, role
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                "#,
            )
            .bind(a.id)
            .bind(a.event_id)
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

        for e in &doc.specific_expenses {
            sqlx::query(
                r#"
                INSERT INTO specific_expenses (
                    id, event_id, label, kind, amount_cents, paid, invoiced
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(e.id)
            .bind(e.event_id)
            .bind(&e.label)
            .bind(&e.kind)
            .bind(e.amount_cents)
            .bind(e.paid)
            .bind(e.invoiced)
            .execute(&mut *tx)
            .await?;
        }

        for m in &doc.cash_movements {
            sqlx::query(
                r#"
                INSERT INTO cash_movements (
                    id, event_id, date, kind, type_id, movement_group, currency,
                    amount_cents, from_account, to_account,
                    status, invoice_status, subtype, note
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                "#,
            )
            .bind(m.id)
            .bind(m.event_id)
            .bind(m.date)
            .bind(m.kind.code())
            .bind(&m.type_id)
            .bind(&m.group)
            .bind(&m.currency)
            .bind(m.amount_cents)
            .bind(m.from_account)
            .bind(m.to_account)
            .bind(&m.status)
            .bind(&m.invoice_status)
            .bind(&m.subtype)
            .bind(&m.note)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Wipes every table, in one transaction.
    pub async fn reset(&self) -> DbResult<()> {
        info!("Resetting database");

        let mut tx = self.pool.begin().await?;
        delete_all(&mut tx).await?;
        tx.commit().await?;
        Ok(())
    }
}

/// Deletes every row, children before parents.
async fn delete_all(tx: &mut Transaction<'_, Sqlite>) -> DbResult<()> {
    for table in [
        "cash_movements",
        "specific_expenses",
        "event_photographers",
        "ticket_sales",
        "events",
        "photographers",
        "movement_types",
    ] {
        sqlx::query(&format!("DELETE FROM {table}"))
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
