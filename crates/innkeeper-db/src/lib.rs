//! # innkeeper-db: Database Layer for Innkeeper
//!
//! SQLite storage for the hotel booking store, the consistency engine that
//! keeps `TotalCost` and `NumberOfNights` correct, and the generic record
//! repository the presentation layer talks to.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Innkeeper Data Flow                              │
//! │                                                                         │
//! │  Presentation layer (form submit)                                       │
//! │       │  Fields::parse(table, raw text)                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                   innkeeper-db (THIS CRATE)                     │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────┐  ┌────────────────┐  ┌──────────────────┐   │    │
//! │  │   │   Database    │  │ RecordRepo     │  │ consistency      │   │    │
//! │  │   │   (pool.rs)   │  │ (records.rs)   │─►│ (engine)         │   │    │
//! │  │   │ create / open │  │ insert/update/ │  │ nights, totals,  │   │    │
//! │  │   │ close/destroy │◄─│ delete/search  │  │ audit            │   │    │
//! │  │   └───────────────┘  └────────────────┘  └──────────────────┘   │    │
//! │  │                                                                 │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │  SQLite file: Hotels, Rooms, Bookings, BookedRooms              │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Configuration, connection pool, database file lifecycle
//! - [`migrations`] - Embedded schema
//! - [`consistency`] - Recomputation of derived columns
//! - [`repository`] - The record repository
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use innkeeper_core::{CmpOp, Fields, Predicate, Table};
//! use innkeeper_db::Database;
//!
//! let db = Database::create("hotels.db").await?;
//! let repo = db.records();
//!
//! let fields = Fields::parse(Table::Rooms, [("PricePerNight", "150")])?;
//! repo.update(&fields, &Predicate::by_id(Table::Rooms, 1)).await?;
//!
//! db.close().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod consistency;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{ConfigError, DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::RecordRepository;
