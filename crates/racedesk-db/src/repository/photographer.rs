//! # Photographer Repository
//!
//! Database operations for the global photographer roster: CRUD, the KPI
//! read models, and the ranking query.
//!
//! ## Ranking Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET ranking (optional event filter, component toggles)                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  GROUP BY photographer over the matching assignment rows (SQL)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  racedesk_core::ranking::rank_photographers (pure)                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ordered rows with normalized scores                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use racedesk_core::ranking::{assignment_kpis, rank_photographers};
use racedesk_core::validation::{clean_optional, validate_name};
use racedesk_core::{
    AssignmentStats, CoreError, Photographer, PhotographerKpis, PhotographerPatch,
    PhotographerRank, RankingComponents, ValidationError,
};

use crate::error::{DbError, DbResult};
use crate::repository::event::map_assignment;

/// One roster row with its aggregate KPIs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotographerWithKpis {
    pub photographer: Photographer,
    pub kpis: PhotographerKpis,
}

/// One event appearance in the photographer detail view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventAppearance {
    pub assignment_id: i64,
    pub event_id: i64,
    pub event_name: String,
    pub event_date: NaiveDate,
    pub role: Option<String>,
    pub photos_taken: i64,
    pub downloads: i64,
    pub unique_downloads: i64,
    pub cost_cents: i64,
    pub invoiced: bool,
    pub paid: bool,
    pub hours_worked: f64,
    /// downloads / photos as a percentage; None when no photos.
    pub download_pct: Option<f64>,
    /// unique downloads / downloads as a percentage; None when no downloads.
    pub unique_download_pct: Option<f64>,
}

/// Photographer detail read model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotographerDetail {
    pub photographer: Photographer,
    pub events: Vec<EventAppearance>,
    pub kpis: PhotographerKpis,
}

/// Repository for photographer database operations.
#[derive(Debug, Clone)]
pub struct PhotographerRepository {
    pool: SqlitePool,
}

impl PhotographerRepository {
    /// Creates a new PhotographerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PhotographerRepository { pool }
    }

    // =========================================================================
    // CRUD
    // =========================================================================

    /// Creates a photographer from a name alone; contact and billing data
    /// arrive later through `update`.
    pub async fn create(&self, name: &str) -> DbResult<Photographer> {
        let name = validate_name("name", name).map_err(CoreError::from)?;

        debug!(name = %name, "Creating photographer");

        let result = sqlx::query("INSERT INTO photographers (name) VALUES (?1)")
            .bind(&name)
            .execute(&self.pool)
            .await?;

        let id = result.last_insert_rowid();
        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Photographer", id))
    }

    /// Gets a photographer by id.
    pub async fn get(&self, id: i64) -> DbResult<Option<Photographer>> {
        let row = sqlx::query("SELECT * FROM photographers WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_photographer).transpose()
    }

    /// Applies a sparse contact/billing update.
    pub async fn update(&self, id: i64, patch: &PhotographerPatch) -> DbResult<Photographer> {
        if patch.is_empty() {
            return Err(CoreError::from(ValidationError::Required {
                field: "update data",
            })
            .into());
        }

        let mut p = self
            .get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Photographer", id))?;

        if let Some(name) = &patch.name {
            p.name = validate_name("name", name).map_err(CoreError::from)?;
        }
        let set = |target: &mut Option<String>, raw: &Option<String>| {
            if raw.is_some() {
                *target = clean_optional(raw.as_deref());
            }
        };
        set(&mut p.email, &patch.email);
        set(&mut p.phone, &patch.phone);
        set(&mut p.location, &patch.location);
        set(&mut p.tax_id, &patch.tax_id);
        set(&mut p.national_id, &patch.national_id);
        set(&mut p.bank_account, &patch.bank_account);
        set(&mut p.bank_alias, &patch.bank_alias);
        set(&mut p.billing_kind, &patch.billing_kind);
        set(&mut p.notes, &patch.notes);

        sqlx::query(
            r#"
            UPDATE photographers SET
                name = ?2, email = ?3, phone = ?4, location = ?5,
                tax_id = ?6, national_id = ?7, bank_account = ?8,
                bank_alias = ?9, billing_kind = ?10, notes = ?11
            WHERE id = ?1
            "#,
        )
        .bind(id)
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
        .execute(&self.pool)
        .await?;

        Ok(p)
    }

    /// Deletes a photographer and all their assignments in one
    /// transaction.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM event_photographers WHERE photographer_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM photographers WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Photographer", id));
        }

        tx.commit().await?;
        Ok(())
    }

    // =========================================================================
    // Read Models
    // =========================================================================

    /// Roster ordered by name, each row with its aggregate KPIs.
    pub async fn list_with_kpis(&self) -> DbResult<Vec<PhotographerWithKpis>> {
        let rows = sqlx::query("SELECT * FROM photographers ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        let photographers: Vec<Photographer> =
            rows.iter().map(map_photographer).collect::<DbResult<_>>()?;

        let rows = sqlx::query("SELECT * FROM event_photographers")
            .fetch_all(&self.pool)
            .await?;
        let assignments: Vec<racedesk_core::PhotographerAssignment> =
            rows.iter().map(map_assignment).collect::<DbResult<_>>()?;

        Ok(photographers
            .into_iter()
            .map(|p| {
                let own: Vec<racedesk_core::PhotographerAssignment> = assignments
                    .iter()
                    .filter(|a| a.photographer_id == p.id)
                    .cloned()
                    .collect();
                PhotographerWithKpis {
                    kpis: assignment_kpis(&own),
                    photographer: p,
                }
            })
            .collect())
    }

    /// Detail view: the photographer, one row per event worked, aggregate
    /// KPIs.
    pub async fn detail(&self, id: i64) -> DbResult<Option<PhotographerDetail>> {
        let Some(photographer) = self.get(id).await? else {
            return Ok(None);
        };

        let rows = sqlx::query(
            r#"
            SELECT a.*, e.name AS event_name, e.date AS event_date
            FROM event_photographers a
            JOIN events e ON e.id = a.event_id
            WHERE a.photographer_id = ?1
            ORDER BY a.id ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let mut events = Vec::with_capacity(rows.len());
        let mut assignments = Vec::with_capacity(rows.len());
        for row in &rows {
            let assignment = map_assignment(row)?;
            let photos = assignment.photos_taken;
            let downloads = assignment.downloads;
            let unique = assignment.unique_downloads;

            events.push(EventAppearance {
                assignment_id: assignment.id,
                event_id: assignment.event_id,
                event_name: row.try_get("event_name")?,
                event_date: row.try_get("event_date")?,
                role: assignment.role.clone(),
                photos_taken: photos,
                downloads,
                unique_downloads: unique,
                cost_cents: assignment.cost_cents,
                invoiced: assignment.invoiced,
                paid: assignment.paid,
                hours_worked: assignment.hours_worked,
                download_pct: if photos > 0 {
                    Some(downloads as f64 / photos as f64 * 100.0)
                } else {
                    None
                },
                unique_download_pct: if downloads > 0 {
                    Some(unique as f64 / downloads as f64 * 100.0)
                } else {
                    None
                },
            });
            assignments.push(assignment);
        }

        Ok(Some(PhotographerDetail {
            photographer,
            kpis: assignment_kpis(&assignments),
            events,
        }))
    }

    // =========================================================================
    // Ranking
    // =========================================================================

    /// Ranks photographers over all events, or over a single event when a
    /// filter is given. Photographers with no matching assignment rows do
    /// not appear at all.
    pub async fn ranking(
        &self,
        event_id: Option<i64>,
        components: RankingComponents,
    ) -> DbResult<Vec<PhotographerRank>> {
        let rows = sqlx::query(
            r#"
            SELECT
                a.photographer_id AS photographer_id,
                p.name AS name,
                SUM(a.photos_taken) AS photos_taken,
                SUM(a.downloads) AS downloads,
                SUM(a.unique_downloads) AS unique_downloads
            FROM event_photographers a
            JOIN photographers p ON p.id = a.photographer_id
            WHERE ?1 IS NULL OR a.event_id = ?1
            GROUP BY a.photographer_id, p.name
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        let mut stats = Vec::with_capacity(rows.len());
        for row in &rows {
            stats.push(AssignmentStats {
                photographer_id: row.try_get("photographer_id")?,
                name: row.try_get("name")?,
                photos_taken: row.try_get("photos_taken")?,
                downloads: row.try_get("downloads")?,
                unique_downloads: row.try_get("unique_downloads")?,
            });
        }

        Ok(rank_photographers(stats, components))
    }
}

// =============================================================================
// Row Mapping
// =============================================================================

pub(crate) fn map_photographer(row: &SqliteRow) -> DbResult<Photographer> {
    Ok(Photographer {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        location: row.try_get("location")?,
        tax_id: row.try_get("tax_id")?,
        national_id: row.try_get("national_id")?,
        bank_account: row.try_get("bank_account")?,
        bank_alias: row.try_get("bank_alias")?,
        billing_kind: row.try_get("billing_kind")?,
        notes: row.try_get("notes")?,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use racedesk_core::{AssignmentDraft, NewEvent};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seeded_event(db: &Database, name: &str) -> i64 {
        db.events()
            .create(&NewEvent {
                name: name.to_string(),
                date: "2026-03-15".to_string(),
                ..Default::default()
            })
            .await
            .unwrap()
            .id
    }

    fn shooter(name: &str, photos: i64, downloads: i64, unique: i64) -> AssignmentDraft {
        AssignmentDraft {
            name: Some(name.to_string()),
            photos_taken: Some(photos),
            downloads: Some(downloads),
            unique_downloads: Some(unique),
            cost: Some("200".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_update() {
        let db = test_db().await;
        let p = db.photographers().create("Ana").await.unwrap();
        assert_eq!(p.name, "Ana");
        assert_eq!(p.email, None);

        let patch = PhotographerPatch {
            email: Some("ana@example.com".to_string()),
            bank_alias: Some(" ana.races ".to_string()),
            ..Default::default()
        };
        let updated = db.photographers().update(p.id, &patch).await.unwrap();
        assert_eq!(updated.email, Some("ana@example.com".to_string()));
        assert_eq!(updated.bank_alias, Some("ana.races".to_string()));
        // untouched fields survive
        assert_eq!(updated.name, "Ana");

        assert!(db.photographers().create("   ").await.is_err());
    }

    #[tokio::test]
    async fn test_delete_cascades_assignments() {
        let db = test_db().await;
        let event_id = seeded_event(&db, "Race").await;
        db.events()
            .replace_assignments(event_id, &[shooter("Ana", 10, 5, 3)])
            .await
            .unwrap();

        let roster = db.photographers().list_with_kpis().await.unwrap();
        db.photographers()
            .delete(roster[0].photographer.id)
            .await
            .unwrap();

        assert!(db.events().assignments(event_id).await.unwrap().is_empty());
        assert!(db.photographers().list_with_kpis().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_kpis_aggregate_across_events() {
        let db = test_db().await;
        let first = seeded_event(&db, "First").await;
        let second = seeded_event(&db, "Second").await;

        db.events()
            .replace_assignments(first, &[shooter("Ana", 1000, 400, 300)])
            .await
            .unwrap();
        db.events()
            .replace_assignments(second, &[shooter("Ana", 500, 100, 50)])
            .await
            .unwrap();

        let roster = db.photographers().list_with_kpis().await.unwrap();
        assert_eq!(roster.len(), 1);
        let kpis = &roster[0].kpis;
        assert_eq!(kpis.events, 2);
        assert_eq!(kpis.photos_total, 1500);
        assert_eq!(kpis.downloads_total, 500);
        assert_eq!(kpis.cost_total_cents, 40_000);
    }

    #[tokio::test]
    async fn test_detail_includes_event_rows() {
        let db = test_db().await;
        let event_id = seeded_event(&db, "Detailed").await;
        db.events()
            .replace_assignments(event_id, &[shooter("Ana", 100, 50, 25)])
            .await
            .unwrap();

        let id = db.photographers().list_with_kpis().await.unwrap()[0]
            .photographer
            .id;
        let detail = db.photographers().detail(id).await.unwrap().unwrap();

        assert_eq!(detail.events.len(), 1);
        assert_eq!(detail.events[0].event_name, "Detailed");
        assert_eq!(detail.events[0].download_pct, Some(50.0));
        assert_eq!(detail.kpis.unique_download_pct, Some(50.0));
    }

    #[tokio::test]
    async fn test_ranking_orders_and_filters() {
        let db = test_db().await;
        let first = seeded_event(&db, "First").await;
        let second = seeded_event(&db, "Second").await;

        db.events()
            .replace_assignments(
                first,
                &[shooter("Ana", 1000, 500, 400), shooter("Bruno", 200, 100, 80)],
            )
            .await
            .unwrap();
        db.events()
            .replace_assignments(second, &[shooter("Carla", 800, 700, 100)])
            .await
            .unwrap();

        // global ranking sees everyone
        let all = db
            .photographers()
            .ranking(None, RankingComponents::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 3);

        // filtered ranking only sees the event's own photographers
        let filtered = db
            .photographers()
            .ranking(Some(second), RankingComponents::default())
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "Carla");
        // alone in the set, Carla is the maximum of every metric
        assert_eq!(filtered[0].score, 1.0);
    }

    #[tokio::test]
    async fn test_ranking_ties_break_by_name() {
        let db = test_db().await;
        let event_id = seeded_event(&db, "Tied").await;
        db.events()
            .replace_assignments(
                event_id,
                &[
                    shooter("Zoe", 100, 50, 25),
                    shooter("Ana", 100, 50, 25),
                    shooter("Mia", 100, 50, 25),
                ],
            )
            .await
            .unwrap();

        let out = db
            .photographers()
            .ranking(None, RankingComponents::default())
            .await
            .unwrap();
        let names: Vec<&str> = out.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Mia", "Zoe"]);
    }
}
