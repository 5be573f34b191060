//! # Ledger Repository
//!
//! The global cash ledger ("caja") and the fee-type catalog.
//!
//! ## Scope Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Global-Ledger Surface                                │
//! │                                                                         │
//! │  list / create here always work on event_id IS NULL rows               │
//! │                                                                         │
//! │  update / delete fetch the row first and REJECT it when it carries     │
//! │  an event link; event movements belong to the event's own books        │
//! │                                                                         │
//! │  The catalog is seeded by an explicit idempotent step at init time     │
//! │  (the seed binary); read paths never write.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use racedesk_core::ledger::{ensure_global, normalize_movement, MovementDraft};
use racedesk_core::money::Money;
use racedesk_core::validation::{clean_optional, parse_iso_date_midnight};
use racedesk_core::{
    CashMovement, CoreError, MovementKind, MovementScope, MovementType, ValidationError,
};

use crate::error::{DbError, DbResult};

/// The catalog rows every installation starts with:
/// `(id, name, group, scope)`.
const DEFAULT_MOVEMENT_TYPES: &[(&str, &str, &str, MovementScope)] = &[
    // global ledger
    ("fixed_expense", "Fixed expense", "fixed", MovementScope::Global),
    ("operating_expense", "Operating expense", "variable", MovementScope::Global),
    ("investment", "Investment", "investment", MovementScope::Global),
    ("partner_advance", "Partner advance", "debt", MovementScope::Global),
    ("debt", "Debt / loan", "debt", MovementScope::Global),
    // event books
    ("processor_fee", "Payment processor fee", "variable", MovementScope::Event),
    ("gross_receipts_tax", "Gross receipts tax", "variable", MovementScope::Event),
    ("vat", "VAT", "variable", MovementScope::Event),
    ("provider_commission", "Provider commission", "variable", MovementScope::Event),
    (
        "organizer_presale_commission",
        "Organizer commission (presale)",
        "variable",
        MovementScope::Event,
    ),
    (
        "organizer_post_commission",
        "Organizer commission (post)",
        "variable",
        MovementScope::Event,
    ),
];

/// Repository for the cash ledger and the fee-type catalog.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Seeds the fee-type catalog. Idempotent upsert: existing entries are
    /// refreshed, user data is never touched. Invoke once at
    /// initialization (the seed binary does).
    pub async fn seed_movement_types(&self) -> DbResult<()> {
        info!(count = DEFAULT_MOVEMENT_TYPES.len(), "Seeding movement types");

        let mut tx = self.pool.begin().await?;

        for (id, name, group, scope) in DEFAULT_MOVEMENT_TYPES {
            sqlx::query(
                r#"
                INSERT INTO movement_types (id, name, movement_group, scope)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    movement_group = excluded.movement_group,
                    scope = excluded.scope
                "#,
            )
            .bind(id)
            .bind(name)
            .bind(group)
            .bind(scope.code())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Catalog entries for one scope, ordered by name.
    pub async fn movement_types(&self, scope: MovementScope) -> DbResult<Vec<MovementType>> {
        let rows = sqlx::query("SELECT * FROM movement_types WHERE scope = ?1 ORDER BY name ASC")
            .bind(scope.code())
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(map_movement_type).collect()
    }

    /// One catalog entry by id.
    pub async fn movement_type(&self, id: &str) -> DbResult<Option<MovementType>> {
        let row = sqlx::query("SELECT * FROM movement_types WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_movement_type).transpose()
    }

    // =========================================================================
    // Global Movements
    // =========================================================================

    /// All global movements, newest first.
    pub async fn list_global(&self) -> DbResult<Vec<CashMovement>> {
        let rows = sqlx::query(
            "SELECT * FROM cash_movements WHERE event_id IS NULL ORDER BY date DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_movement).collect()
    }

    /// One movement by id, regardless of scope.
    pub async fn get(&self, id: i64) -> DbResult<Option<CashMovement>> {
        let row = sqlx::query("SELECT * FROM cash_movements WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_movement).transpose()
    }

    /// Creates a global movement. The draft is validated and normalized by
    /// the core; the reporting group is copied from the catalog entry.
    pub async fn create_global(&self, draft: &MovementDraft) -> DbResult<CashMovement> {
        let type_id = draft
            .type_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(CoreError::Validation(ValidationError::Required {
                field: "type_id",
            }))?;

        let movement_type = self
            .movement_type(type_id)
            .await?
            .ok_or_else(|| DbError::not_found("Movement type", type_id))?;

        let normalized = normalize_movement(draft, &movement_type)?;

        debug!(type_id = %movement_type.id, "Creating global movement");

        let result = sqlx::query(
            r#"
            INSERT INTO cash_movements (
                event_id, date, kind, type_id, movement_group, currency,
                amount_cents, from_account, to_account,
                status, invoice_status, subtype, note
            ) VALUES (NULL, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(normalized.date)
        .bind(normalized.kind.code())
        .bind(&normalized.type_id)
        .bind(&normalized.group)
        .bind(&normalized.currency)
        .bind(normalized.amount_cents)
        .bind(normalized.from_account)
        .bind(normalized.to_account)
        .bind(&normalized.status)
        .bind(&normalized.invoice_status)
        .bind(&normalized.subtype)
        .bind(&normalized.note)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Movement", id))
    }

    /// Applies a sparse update to a global movement. Event-scoped rows are
    /// rejected outright.
    pub async fn update_global(&self, id: i64, patch: &MovementDraft) -> DbResult<CashMovement> {
        let mut movement = self
            .get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Movement", id))?;
        ensure_global(&movement)?;

        if patch.is_empty() {
            return Err(CoreError::from(ValidationError::Required {
                field: "update data",
            })
            .into());
        }

        if let Some(date) = &patch.date {
            movement.date = parse_iso_date_midnight(date)?;
        }
        if let Some(kind) = &patch.kind {
            movement.kind = MovementKind::parse(kind)?;
        }
        if let Some(type_id) = &patch.type_id {
            let movement_type = self
                .movement_type(type_id.trim())
                .await?
                .ok_or_else(|| DbError::not_found("Movement type", type_id))?;
            movement.type_id = movement_type.id;
            movement.group = movement_type.group;
        }
        if patch.currency.is_some() {
            movement.currency = clean_optional(patch.currency.as_deref())
                .map(|c| c.to_ascii_uppercase())
                .unwrap_or_else(|| racedesk_core::ledger::HOME_CURRENCY.to_string());
        }
        if let Some(amount) = &patch.amount {
            movement.amount_cents = Money::parse(amount).cents();
        }
        if patch.from_account.is_some() || patch.to_account.is_some() {
            // re-run the account coercion through the normalizer's rules
            if let Some(v) = patch.from_account {
                movement.from_account = if v.is_finite() { Some(v.trunc() as i64) } else { None };
            }
            if let Some(v) = patch.to_account {
                movement.to_account = if v.is_finite() { Some(v.trunc() as i64) } else { None };
            }
        }
        if patch.status.is_some() {
            movement.status = clean_optional(patch.status.as_deref())
                .unwrap_or_else(|| racedesk_core::ledger::DEFAULT_STATUS.to_string());
        }
        if patch.invoice_status.is_some() {
            movement.invoice_status = clean_optional(patch.invoice_status.as_deref())
                .unwrap_or_else(|| racedesk_core::ledger::DEFAULT_INVOICE_STATUS.to_string());
        }
        if patch.subtype.is_some() {
            movement.subtype = clean_optional(patch.subtype.as_deref());
        }
        if patch.note.is_some() {
            movement.note = clean_optional(patch.note.as_deref());
        }

        sqlx::query(
            r#"
            UPDATE cash_movements SET
                date = ?2, kind = ?3, type_id = ?4, movement_group = ?5,
                currency = ?6, amount_cents = ?7, from_account = ?8,
                to_account = ?9, status = ?10, invoice_status = ?11,
                subtype = ?12, note = ?13
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(movement.date)
        .bind(movement.kind.code())
        .bind(&movement.type_id)
        .bind(&movement.group)
        .bind(&movement.currency)
        .bind(movement.amount_cents)
        .bind(movement.from_account)
        .bind(movement.to_account)
        .bind(&movement.status)
        .bind(&movement.invoice_status)
        .bind(&movement.subtype)
        .bind(&movement.note)
        .execute(&self.pool)
        .await?;

        Ok(movement)
    }

    /// Deletes a global movement. Event-scoped rows are rejected.
    pub async fn delete_global(&self, id: i64) -> DbResult<()> {
        let movement = self
            .get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Movement", id))?;
        ensure_global(&movement)?;

        sqlx::query("DELETE FROM cash_movements WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// =============================================================================
// Row Mapping
// =============================================================================

pub(crate) fn map_movement_type(row: &SqliteRow) -> DbResult<MovementType> {
    let scope: String = row.try_get("scope")?;
    Ok(MovementType {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        group: row.try_get("movement_group")?,
        scope: MovementScope::parse(&scope)?,
    })
}

pub(crate) fn map_movement(row: &SqliteRow) -> DbResult<CashMovement> {
    let kind: String = row.try_get("kind")?;
    Ok(CashMovement {
        id: row.try_get("id")?,
        event_id: row.try_get("event_id")?,
        date: row.try_get("date")?,
        kind: MovementKind::parse(&kind)?,
        type_id: row.try_get("type_id")?,
        group: row.try_get("movement_group")?,
        currency: row.try_get("currency")?,
        amount_cents: row.try_get("amount_cents")?,
        from_account: row.try_get("from_account")?,
        to_account: row.try_get("to_account")?,
        status: row.try_get("status")?,
        invoice_status: row.try_get("invoice_status")?,
        subtype: row.try_get("subtype")?,
        note: row.try_get("note")?,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.ledger().seed_movement_types().await.unwrap();
        db
    }

    fn movement(date: &str, amount: &str) -> MovementDraft {
        MovementDraft {
            date: Some(date.to_string()),
            type_id: Some("fixed_expense".to_string()),
            amount: Some(amount.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_seeding_is_idempotent() {
        let db = test_db().await;

        let global = db.ledger().movement_types(MovementScope::Global).await.unwrap();
        let event = db.ledger().movement_types(MovementScope::Event).await.unwrap();
        assert_eq!(global.len(), 5);
        assert_eq!(event.len(), 6);

        // running the seed again changes nothing
        db.ledger().seed_movement_types().await.unwrap();
        let again = db.ledger().movement_types(MovementScope::Global).await.unwrap();
        assert_eq!(again.len(), 5);
    }

    #[tokio::test]
    async fn test_create_global_copies_group_from_catalog() {
        let db = test_db().await;
        let created = db
            .ledger()
            .create_global(&movement("2026-03-01", "1.250,75"))
            .await
            .unwrap();

        assert_eq!(created.event_id, None);
        assert_eq!(created.type_id, "fixed_expense");
        assert_eq!(created.group, "fixed");
        assert_eq!(created.amount_cents, 125_075);
        assert_eq!(created.currency, "ARS");
        assert_eq!(created.status, "pending");
        assert_eq!(created.kind, MovementKind::Expense);
    }

    #[tokio::test]
    async fn test_create_global_rejects_unknown_type() {
        let db = test_db().await;
        let mut draft = movement("2026-03-01", "10");
        draft.type_id = Some("confetti_budget".to_string());

        let err = db.ledger().create_global(&draft).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        draft.type_id = None;
        let err = db.ledger().create_global(&draft).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_global_excludes_event_movements() {
        let db = test_db().await;
        db.ledger()
            .create_global(&movement("2026-03-01", "10"))
            .await
            .unwrap();

        // smuggle in an event-scoped movement the way an import would
        let event = db
            .events()
            .create(&racedesk_core::NewEvent {
                name: "Race".to_string(),
                date: "2026-03-15".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        sqlx::query(
            r#"
            INSERT INTO cash_movements (
                event_id, date, kind, type_id, movement_group, currency,
                amount_cents, status, invoice_status
            ) VALUES (?1, '2026-03-15 00:00:00', 'expense', 'vat', 'variable',
                      'ARS', 500, 'pending', 'not_applicable')
            "#,
        )
        .bind(event.id)
        .execute(db.pool())
        .await
        .unwrap();

        let listed = db.ledger().list_global().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].is_global());
    }

    #[tokio::test]
    async fn test_update_and_delete_reject_event_scoped_rows() {
        let db = test_db().await;
        let event = db
            .events()
            .create(&racedesk_core::NewEvent {
                name: "Race".to_string(),
                date: "2026-03-15".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let result = sqlx::query(
            r#"
            INSERT INTO cash_movements (
                event_id, date, kind, type_id, movement_group, currency,
                amount_cents, status, invoice_status
            ) VALUES (?1, '2026-03-15 00:00:00', 'expense', 'vat', 'variable',
                      'ARS', 500, 'pending', 'not_applicable')
            "#,
        )
        .bind(event.id)
        .execute(db.pool())
        .await
        .unwrap();
        let scoped_id = result.last_insert_rowid();

        let patch = MovementDraft {
            amount: Some("999".to_string()),
            ..Default::default()
        };
        let err = db.ledger().update_global(scoped_id, &patch).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::EventScopedMovement(_))
        ));

        let err = db.ledger().delete_global(scoped_id).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::EventScopedMovement(_))
        ));

        // still there
        assert!(db.ledger().get(scoped_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_global_sparse_patch() {
        let db = test_db().await;
        let created = db
            .ledger()
            .create_global(&movement("2026-03-01", "100"))
            .await
            .unwrap();

        let patch = MovementDraft {
            amount: Some("250,50".to_string()),
            status: Some("settled".to_string()),
            type_id: Some("investment".to_string()),
            ..Default::default()
        };
        let updated = db.ledger().update_global(created.id, &patch).await.unwrap();

        assert_eq!(updated.amount_cents, 25_050);
        assert_eq!(updated.status, "settled");
        assert_eq!(updated.type_id, "investment");
        // the group follows the new catalog entry
        assert_eq!(updated.group, "investment");
        // untouched fields survive
        assert_eq!(updated.date, created.date);
        assert_eq!(updated.currency, "ARS");

        let err = db
            .ledger()
            .update_global(created.id, &MovementDraft::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_global() {
        let db = test_db().await;
        let created = db
            .ledger()
            .create_global(&movement("2026-03-01", "100"))
            .await
            .unwrap();

        db.ledger().delete_global(created.id).await.unwrap();
        assert!(db.ledger().get(created.id).await.unwrap().is_none());
        assert!(db.ledger().list_global().await.unwrap().is_empty());
    }
}
