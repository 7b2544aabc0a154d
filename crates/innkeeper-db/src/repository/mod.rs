//! # Repository Module
//!
//! Database access for the booking store.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Presentation layer                                                     │
//! │       │                                                                 │
//! │       │  db.records().update(&fields, &predicate)                       │
//! │       ▼                                                                 │
//! │  RecordRepository                                                       │
//! │  ├── insert / update / delete / clear / clear_all                       │
//! │  ├── select_all / get / search / count / next_id / snapshot             │
//! │  └── verify / recompute_all                                             │
//! │       │                                                                 │
//! │       │  sql helpers (schema-driven QueryBuilder)                       │
//! │       │  consistency engine (derived values)                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`RecordRepository`] - Generic CRUD over Hotels, Rooms, Bookings, BookedRooms

pub mod records;
pub(crate) mod sql;

pub use records::RecordRepository;
