//! # Table Schema
//!
//! The closed set of tables and their typed columns.
//!
//! ## Why a Closed Enum?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Table name as a free string        Table as an enum                    │
//! │  ───────────────────────────        ─────────────────                   │
//! │  "Hotel" vs "Hotels" typo           compile error                       │
//! │  "Rooms; DROP TABLE ..."            impossible: identifiers in SQL      │
//! │                                     come only from the statics below    │
//! │  column list via PRAGMA             Table::columns(), typed             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tables
//! ```text
//! Hotels       Id, Name, City, Address, Rating?
//! Rooms        Id, HotelId→Hotels, RoomType, PricePerNight, MaxGuests
//! Bookings     Id, HotelId→Hotels, GuestName, CheckInDate, CheckOutDate, TotalCost*
//! BookedRooms  Id, BookingId→Bookings, RoomId→Rooms, NumberOfNights*
//!
//! ? nullable   * derived (maintained by the consistency engine)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::stay;
use crate::types::Value;
use crate::validation::ValidationResult;

// =============================================================================
// Table
// =============================================================================

/// One of the four tables of the booking store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Table {
    Hotels,
    Rooms,
    Bookings,
    BookedRooms,
}

impl Table {
    /// Every table, in dependency order (referenced tables first).
    pub const ALL: [Table; 4] = [Table::Hotels, Table::Rooms, Table::Bookings, Table::BookedRooms];

    /// The SQL table name.
    pub const fn name(self) -> &'static str {
        match self {
            Table::Hotels => "Hotels",
            Table::Rooms => "Rooms",
            Table::Bookings => "Bookings",
            Table::BookedRooms => "BookedRooms",
        }
    }

    /// Resolves a table by its SQL name.
    pub fn from_name(name: &str) -> CoreResult<Table> {
        Table::ALL
            .into_iter()
            .find(|table| table.name() == name)
            .ok_or_else(|| CoreError::UnknownTable(name.to_string()))
    }

    /// Column definitions in storage order. The primary key is always first.
    pub fn columns(self) -> &'static [ColumnDef] {
        match self {
            Table::Hotels => HOTEL_COLUMNS,
            Table::Rooms => ROOM_COLUMNS,
            Table::Bookings => BOOKING_COLUMNS,
            Table::BookedRooms => BOOKED_ROOM_COLUMNS,
        }
    }

    /// Looks up a column by name.
    ///
    /// ## Errors
    /// `CoreError::UnknownColumn` - a programming error in the caller.
    pub fn column(self, name: &str) -> CoreResult<&'static ColumnDef> {
        self.columns()
            .iter()
            .find(|column| column.name == name)
            .ok_or_else(|| CoreError::UnknownColumn {
                table: self.name().to_string(),
                column: name.to_string(),
            })
    }

    /// Position of a column in [`Table::columns`].
    pub fn position(self, name: &str) -> CoreResult<usize> {
        self.columns()
            .iter()
            .position(|column| column.name == name)
            .ok_or_else(|| CoreError::UnknownColumn {
                table: self.name().to_string(),
                column: name.to_string(),
            })
    }

    /// Comma-separated column list for SELECT / INSERT statements.
    pub fn column_list(self) -> String {
        self.columns()
            .iter()
            .map(|column| column.name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Columns
// =============================================================================

/// Storage and input type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ColumnType {
    /// Integer primary key.
    Id,
    Integer,
    Real,
    Text,
    /// Integer hundredths, entered and shown as a decimal.
    Money,
    /// Calendar date, entered and shown as `DD.MM.YYYY`.
    Date,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Id => "id",
            ColumnType::Integer => "integer",
            ColumnType::Real => "real",
            ColumnType::Text => "text",
            ColumnType::Money => "money",
            ColumnType::Date => "date",
        };
        f.write_str(name)
    }
}

/// Metadata for one column, enough to generate a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub ty: ColumnType,
    pub nullable: bool,
    /// Maintained by the consistency engine, never supplied by callers.
    pub derived: bool,
    /// Target table of a foreign key column.
    pub references: Option<Table>,
}

impl ColumnDef {
    const fn new(name: &'static str, ty: ColumnType) -> Self {
        ColumnDef {
            name,
            ty,
            nullable: false,
            derived: false,
            references: None,
        }
    }

    const fn key() -> Self {
        ColumnDef::new("Id", ColumnType::Id)
    }

    const fn foreign(name: &'static str, table: Table) -> Self {
        ColumnDef {
            references: Some(table),
            ..ColumnDef::new(name, ColumnType::Integer)
        }
    }

    const fn nullable(self) -> Self {
        ColumnDef {
            nullable: true,
            ..self
        }
    }

    const fn derived(self) -> Self {
        ColumnDef {
            derived: true,
            ..self
        }
    }

    /// Whether callers may supply this column on insert or update.
    pub const fn is_assignable(&self) -> bool {
        !self.derived && !matches!(self.ty, ColumnType::Id)
    }

    /// Initial value of a derived column before the engine fills it in.
    pub fn default_value(&self) -> Value {
        match self.ty {
            ColumnType::Money => Value::Money(Money::zero()),
            ColumnType::Integer | ColumnType::Id => Value::Integer(0),
            _ => Value::Null,
        }
    }

    /// Checks a typed value against this column.
    ///
    /// ## Rules
    /// - `Null` only for nullable columns
    /// - Integers widen to `Real` columns; nothing else converts
    /// - Reals must be finite
    pub fn check(&self, value: Value) -> ValidationResult<Value> {
        match (self.ty, value) {
            (_, Value::Null) if self.nullable => Ok(Value::Null),
            (_, Value::Null) => Err(ValidationError::Required {
                field: self.name.to_string(),
            }),
            (ColumnType::Id | ColumnType::Integer, value @ Value::Integer(_)) => Ok(value),
            (ColumnType::Real, Value::Real(x)) if x.is_finite() => Ok(Value::Real(x)),
            (ColumnType::Real, Value::Integer(n)) => Ok(Value::Real(n as f64)),
            (ColumnType::Text, value @ Value::Text(_)) => Ok(value),
            (ColumnType::Money, value @ Value::Money(_)) => Ok(value),
            (ColumnType::Date, value @ Value::Date(_)) => Ok(value),
            (ty, _) => Err(ValidationError::InvalidFormat {
                field: self.name.to_string(),
                reason: format!("expected a {} value", ty),
            }),
        }
    }

    /// Coerces raw form text into a typed value.
    ///
    /// ## Example
    /// ```rust
    /// use innkeeper_core::{Money, Table, Value};
    ///
    /// let price = Table::Rooms.column("PricePerNight").unwrap();
    /// assert_eq!(price.coerce("99.5").unwrap(), Value::Money(Money::from_cents(9950)));
    /// assert!(price.coerce("cheap").is_err());
    /// ```
    pub fn coerce(&self, raw: &str) -> ValidationResult<Value> {
        let raw = raw.trim();
        if raw.is_empty() {
            return self.check(Value::Null);
        }

        let invalid = |reason: String| ValidationError::InvalidFormat {
            field: self.name.to_string(),
            reason,
        };

        let value = match self.ty {
            ColumnType::Id | ColumnType::Integer => raw
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| invalid("must be a whole number".to_string()))?,
            ColumnType::Real => raw
                .replace(',', ".")
                .parse::<f64>()
                .ok()
                .filter(|x| x.is_finite())
                .map(Value::Real)
                .ok_or_else(|| invalid("must be a number".to_string()))?,
            ColumnType::Text => Value::Text(raw.to_string()),
            ColumnType::Money => raw
                .parse::<Money>()
                .map(Value::Money)
                .map_err(|e| invalid(e.to_string()))?,
            ColumnType::Date => Value::Date(stay::parse_date(self.name, raw)?),
        };

        Ok(value)
    }
}

static HOTEL_COLUMNS: &[ColumnDef] = &[
    ColumnDef::key(),
    ColumnDef::new("Name", ColumnType::Text),
    ColumnDef::new("City", ColumnType::Text),
    ColumnDef::new("Address", ColumnType::Text),
    ColumnDef::new("Rating", ColumnType::Real).nullable(),
];

static ROOM_COLUMNS: &[ColumnDef] = &[
    ColumnDef::key(),
    ColumnDef::foreign("HotelId", Table::Hotels),
    ColumnDef::new("RoomType", ColumnType::Text),
    ColumnDef::new("PricePerNight", ColumnType::Money),
    ColumnDef::new("MaxGuests", ColumnType::Integer),
];

static BOOKING_COLUMNS: &[ColumnDef] = &[
    ColumnDef::key(),
    ColumnDef::foreign("HotelId", Table::Hotels),
    ColumnDef::new("GuestName", ColumnType::Text),
    ColumnDef::new("CheckInDate", ColumnType::Date),
    ColumnDef::new("CheckOutDate", ColumnType::Date),
    ColumnDef::new("TotalCost", ColumnType::Money).derived(),
];

static BOOKED_ROOM_COLUMNS: &[ColumnDef] = &[
    ColumnDef::key(),
    ColumnDef::foreign("BookingId", Table::Bookings),
    ColumnDef::foreign("RoomId", Table::Rooms),
    ColumnDef::new("NumberOfNights", ColumnType::Integer).derived(),
];

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_primary_key_first() {
        for table in Table::ALL {
            assert_eq!(table.columns()[0].name, "Id");
            assert_eq!(table.columns()[0].ty, ColumnType::Id);
        }
    }

    #[test]
    fn test_lookup() {
        assert_eq!(Table::from_name("BookedRooms").unwrap(), Table::BookedRooms);
        assert!(matches!(Table::from_name("Guests"), Err(CoreError::UnknownTable(_))));

        let column = Table::Rooms.column("HotelId").unwrap();
        assert_eq!(column.references, Some(Table::Hotels));
        assert_eq!(Table::Bookings.position("TotalCost").unwrap(), 5);
        assert!(Table::Hotels.column("Stars").unwrap_err().is_fatal());
    }

    #[test]
    fn test_derived_columns() {
        let derived: Vec<_> = Table::ALL
            .iter()
            .flat_map(|t| t.columns())
            .filter(|c| c.derived)
            .map(|c| c.name)
            .collect();
        assert_eq!(derived, vec!["TotalCost", "NumberOfNights"]);
        assert!(!Table::Bookings.column("Id").unwrap().is_assignable());
    }

    #[test]
    fn test_column_list() {
        assert_eq!(
            Table::BookedRooms.column_list(),
            "Id, BookingId, RoomId, NumberOfNights"
        );
    }

    #[test]
    fn test_coerce_by_type() {
        let rating = Table::Hotels.column("Rating").unwrap();
        assert_eq!(rating.coerce("4,5").unwrap(), Value::Real(4.5));
        assert_eq!(rating.coerce("").unwrap(), Value::Null);
        assert!(rating.coerce("NaN").is_err());

        let guests = Table::Rooms.column("MaxGuests").unwrap();
        assert_eq!(guests.coerce(" 2 ").unwrap(), Value::Integer(2));
        assert!(guests.coerce("2.5").is_err());
        assert!(matches!(guests.coerce(""), Err(ValidationError::Required { .. })));

        let check_in = Table::Bookings.column("CheckInDate").unwrap();
        assert_eq!(
            check_in.coerce("01.01.2024").unwrap(),
            Value::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        );
    }

    #[test]
    fn test_check_rejects_wrong_type() {
        let name = Table::Hotels.column("Name").unwrap();
        assert!(name.check(Value::Integer(3)).is_err());

        let rating = Table::Hotels.column("Rating").unwrap();
        assert_eq!(rating.check(Value::Integer(4)).unwrap(), Value::Real(4.0));
    }

    #[test]
    fn test_metadata_serializes_for_forms() {
        let json = serde_json::to_value(Table::Rooms.column("HotelId").unwrap()).unwrap();
        assert_eq!(json["name"], "HotelId");
        assert_eq!(json["type"], "integer");
        assert_eq!(json["references"], "Hotels");
    }
}
