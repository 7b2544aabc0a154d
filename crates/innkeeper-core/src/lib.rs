//! # innkeeper-core: Pure Booking Logic for Innkeeper
//!
//! This crate holds every rule of the hotel booking store that can be
//! expressed without touching the disk: the four entities, their typed
//! column schema, coercion of raw form text, predicates, money, stay length
//! and the booking cost formula.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Innkeeper Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Presentation layer (forms, tree views)             │   │
//! │  │     raw text fields ──► Fields::parse ──► Record repository     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ innkeeper-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │  schema  │ │  fields  │ │   stay   │ │ pricing  │          │   │
//! │  │   │  Table   │ │  Fields  │ │   Stay   │ │ totals   │          │   │
//! │  │   │ ColumnDef│ │ Predicate│ │  nights  │ │  audit   │          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • PURE FUNCTIONS                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        innkeeper-db (SQLite, consistency engine, repository)    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities (Hotel, Room, Booking, BookedRoom) and cell values
//! - [`schema`] - The closed set of tables and their typed columns
//! - [`fields`] - Caller-supplied column values, coerced and type-checked
//! - [`predicate`] - Row filters for select / update / delete
//! - [`money`] - Integer money in hundredths
//! - [`stay`] - Date parsing and night counting
//! - [`pricing`] - Booking total formula and consistency audit
//! - [`validation`] - Field-level business rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use innkeeper_core::{Fields, Record, Table};
//!
//! let fields = Fields::parse(
//!     Table::Bookings,
//!     [
//!         ("HotelId", "1"),
//!         ("GuestName", "Ada Lovelace"),
//!         ("CheckInDate", "01.01.2024"),
//!         ("CheckOutDate", "04.01.2024"),
//!     ],
//! )
//! .unwrap();
//!
//! let record = Record::from_fields(&fields, 1).unwrap();
//! match record {
//!     Record::Booking(booking) => assert_eq!(booking.stay().unwrap().nights(), 3),
//!     _ => unreachable!(),
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod fields;
pub mod money;
pub mod predicate;
pub mod pricing;
pub mod schema;
pub mod stay;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use fields::Fields;
pub use money::Money;
pub use predicate::{CmpOp, Condition, Predicate};
pub use schema::{ColumnDef, ColumnType, Table};
pub use stay::Stay;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of free-text columns (names, addresses, room types).
pub const MAX_TEXT_LEN: usize = 200;

/// Maximum length of a substring search term.
pub const MAX_SEARCH_LEN: usize = 100;
