//! # Repository Module
//!
//! Database repository implementations for Racedesk.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  Serving layer                                                          │
//! │       │                                                                 │
//! │       │  db.events().detail(7)                                          │
//! │       ▼                                                                 │
//! │  EventRepository                                                       │
//! │  ├── fetch the event's raw rows                                        │
//! │  ├── hand them to racedesk-core (pure computation)                     │
//! │  └── return the combined read model                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Writes follow the same shape in reverse: parse/validate via the core, │
//! │  then persist inside a single transaction.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`event::EventRepository`] - Events, ticket sales, assignments, expenses
//! - [`photographer::PhotographerRepository`] - Photographers, KPIs, ranking
//! - [`ledger::LedgerRepository`] - Cash movements and the fee-type catalog
//! - [`backup::BackupRepository`] - Bulk export/import/reset

pub mod backup;
pub mod event;
pub mod ledger;
pub mod photographer;

use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::error::{DbError, DbResult};

/// Reads an exact-decimal percentage out of a nullable TEXT column.
pub(crate) fn decimal_col(row: &SqliteRow, col: &str) -> DbResult<Option<Decimal>> {
    let raw: Option<String> = row.try_get(col)?;
    match raw {
        None => Ok(None),
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|_| DbError::Decode(format!("column {col}: bad decimal '{s}'"))),
    }
}
