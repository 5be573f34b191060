//! # racedesk-db: Database Layer for Racedesk
//!
//! This crate provides database access for the Racedesk backend. It uses
//! SQLite with sqlx for async operations, and is the "collaborator" the
//! pure core computes for: repositories fetch raw rows, hand them to
//! `racedesk-core`, and persist or return whatever the core produces.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Racedesk Data Flow                               │
//! │                                                                         │
//! │  Serving layer (outside this repo)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    racedesk-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐    │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │    │   │
//! │  │   │   (pool.rs)   │    │ event/photog/ │    │  (embedded)  │    │   │
//! │  │   │               │    │ ledger/backup │    │              │    │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘    │   │
//! │  │                                │                                │   │
//! │  │                         racedesk-core                           │   │
//! │  │                      (pure computations)                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use racedesk_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./racedesk.db")).await?;
//! db.ledger().seed_movement_types().await?;
//!
//! let summaries = db.events().list().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::backup::{BackupDocument, BackupRepository};
pub use repository::event::{EventDetail, EventRepository};
pub use repository::ledger::LedgerRepository;
pub use repository::photographer::{
    EventAppearance, PhotographerDetail, PhotographerRepository, PhotographerWithKpis,
};
