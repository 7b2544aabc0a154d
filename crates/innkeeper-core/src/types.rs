//! # Domain Types
//!
//! The four entities of the booking store and the cell values they are
//! built from.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                              │
//! │  │     Hotel       │◄──│      Room       │                              │
//! │  │  ─────────────  │   │  ─────────────  │                              │
//! │  │  id             │   │  hotel_id (FK)  │                              │
//! │  │  name, city     │   │  price_per_night│◄─────────┐                   │
//! │  │  rating?        │   │  max_guests     │          │                   │
//! │  └────────▲────────┘   └─────────────────┘          │                   │
//! │           │                                         │                   │
//! │  ┌────────┴────────┐   ┌─────────────────┐          │                   │
//! │  │    Booking      │◄──│   BookedRoom    │──────────┘                   │
//! │  │  ─────────────  │   │  ─────────────  │                              │
//! │  │  check-in / out │   │  booking_id (FK)│                              │
//! │  │  total_cost  *  │   │  room_id (FK)   │                              │
//! │  └─────────────────┘   │  nights      *  │                              │
//! │                        └─────────────────┘                              │
//! │                                        * derived, engine-maintained     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rows as Values
//! The repository moves rows around as `Vec<Value>` in [`Table::columns`]
//! order. [`Record::from_values`] and [`Record::values`] convert between
//! that shape and the typed structs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::fields::Fields;
use crate::money::Money;
use crate::schema::{ColumnDef, ColumnType, Table};
use crate::stay::{self, Stay};
use crate::validation::{
    validate_id, validate_max_guests, validate_price, validate_rating, validate_text,
    ValidationResult,
};

// =============================================================================
// Cell Value
// =============================================================================

/// A single typed cell.
///
/// Serialized untagged, so the presentation layer sees plain JSON scalars:
/// money as hundredths, dates as `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Money(Money),
    Date(NaiveDate),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

/// Display form used by tree views: dates as `DD.MM.YYYY`, money as `150.00`,
/// null as an empty cell.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Real(x) => write!(f, "{}", x),
            Value::Text(s) => f.write_str(s),
            Value::Money(m) => write!(f, "{}", m),
            Value::Date(d) => f.write_str(&stay::format_date(*d)),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Real(x)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<Money> for Value {
    fn from(m: Money) -> Self {
        Value::Money(m)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

// =============================================================================
// Entities
// =============================================================================

/// A hotel. Root of the data model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "PascalCase")]
#[ts(export)]
pub struct Hotel {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub address: String,
    pub rating: Option<f64>,
}

/// A bookable room with a nightly price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "PascalCase")]
#[ts(export)]
pub struct Room {
    pub id: i64,
    pub hotel_id: i64,
    pub room_type: String,
    pub price_per_night: Money,
    pub max_guests: i64,
}

/// A guest's stay.
///
/// `total_cost` is owned by the consistency engine: it always equals the sum
/// of `PricePerNight × NumberOfNights` over the booking's line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "PascalCase")]
#[ts(export)]
pub struct Booking {
    pub id: i64,
    pub hotel_id: i64,
    pub guest_name: String,
    #[ts(as = "String")]
    pub check_in_date: NaiveDate,
    #[ts(as = "String")]
    pub check_out_date: NaiveDate,
    pub total_cost: Money,
}

impl Booking {
    /// The validated stay of this booking.
    pub fn stay(&self) -> ValidationResult<Stay> {
        Stay::new(self.check_in_date, self.check_out_date)
    }
}

/// One room on one booking. `number_of_nights` mirrors the parent's stay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "PascalCase")]
#[ts(export)]
pub struct BookedRoom {
    pub id: i64,
    pub booking_id: i64,
    pub room_id: i64,
    pub number_of_nights: i64,
}

// =============================================================================
// Record
// =============================================================================

/// A row of any of the four tables.
///
/// ## JSON Shape
/// ```text
/// { "table": "Rooms", "row": { "Id": 1, "HotelId": 1, "PricePerNight": 10000, ... } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "table", content = "row")]
#[ts(export)]
pub enum Record {
    #[serde(rename = "Hotels")]
    Hotel(Hotel),
    #[serde(rename = "Rooms")]
    Room(Room),
    #[serde(rename = "Bookings")]
    Booking(Booking),
    #[serde(rename = "BookedRooms")]
    BookedRoom(BookedRoom),
}

impl Record {
    pub fn table(&self) -> Table {
        match self {
            Record::Hotel(_) => Table::Hotels,
            Record::Room(_) => Table::Rooms,
            Record::Booking(_) => Table::Bookings,
            Record::BookedRoom(_) => Table::BookedRooms,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Record::Hotel(hotel) => hotel.id,
            Record::Room(room) => room.id,
            Record::Booking(booking) => booking.id,
            Record::BookedRoom(line) => line.id,
        }
    }

    /// Cell values in [`Table::columns`] order.
    pub fn values(&self) -> Vec<Value> {
        match self {
            Record::Hotel(h) => vec![
                h.id.into(),
                h.name.as_str().into(),
                h.city.as_str().into(),
                h.address.as_str().into(),
                h.rating.into(),
            ],
            Record::Room(r) => vec![
                r.id.into(),
                r.hotel_id.into(),
                r.room_type.as_str().into(),
                r.price_per_night.into(),
                r.max_guests.into(),
            ],
            Record::Booking(b) => vec![
                b.id.into(),
                b.hotel_id.into(),
                b.guest_name.as_str().into(),
                b.check_in_date.into(),
                b.check_out_date.into(),
                b.total_cost.into(),
            ],
            Record::BookedRoom(l) => vec![
                l.id.into(),
                l.booking_id.into(),
                l.room_id.into(),
                l.number_of_nights.into(),
            ],
        }
    }

    /// Builds a record from cell values in column order.
    ///
    /// ## Errors
    /// - `ColumnCount` when the row has the wrong width
    /// - `Validation` when a cell has the wrong type for its column
    pub fn from_values(table: Table, values: Vec<Value>) -> CoreResult<Record> {
        let expected = table.columns().len();
        if values.len() != expected {
            return Err(CoreError::ColumnCount {
                table: table.name().to_string(),
                expected,
                found: values.len(),
            });
        }

        let mut cells = Cells::new(table, values);
        let record = match table {
            Table::Hotels => Record::Hotel(Hotel {
                id: cells.integer()?,
                name: cells.text()?,
                city: cells.text()?,
                address: cells.text()?,
                rating: cells.optional_real()?,
            }),
            Table::Rooms => Record::Room(Room {
                id: cells.integer()?,
                hotel_id: cells.integer()?,
                room_type: cells.text()?,
                price_per_night: cells.money()?,
                max_guests: cells.integer()?,
            }),
            Table::Bookings => Record::Booking(Booking {
                id: cells.integer()?,
                hotel_id: cells.integer()?,
                guest_name: cells.text()?,
                check_in_date: cells.date()?,
                check_out_date: cells.date()?,
                total_cost: cells.money()?,
            }),
            Table::BookedRooms => Record::BookedRoom(BookedRoom {
                id: cells.integer()?,
                booking_id: cells.integer()?,
                room_id: cells.integer()?,
                number_of_nights: cells.integer()?,
            }),
        };

        Ok(record)
    }

    /// Builds a new record for insertion from caller-supplied fields.
    ///
    /// Derived columns start at their defaults; the consistency engine fills
    /// them in once the row is stored.
    ///
    /// ## Errors
    /// - `Required` for a missing non-nullable column
    /// - any rule in [`Record::validate`]
    pub fn from_fields(fields: &Fields, id: i64) -> CoreResult<Record> {
        let table = fields.table();
        let mut values = Vec::with_capacity(table.columns().len());

        for column in table.columns() {
            let value = if matches!(column.ty, ColumnType::Id) {
                Value::Integer(id)
            } else if column.derived {
                column.default_value()
            } else {
                match fields.get(column.name) {
                    Some(value) => value.clone(),
                    None => column.check(Value::Null)?,
                }
            };
            values.push(value);
        }

        let record = Record::from_values(table, values)?;
        record.validate()?;
        Ok(record)
    }

    /// Returns a copy with the given assignments applied and re-validated.
    ///
    /// ## Errors
    /// - `TableMismatch` when the fields belong to another table
    /// - `NotAssignable` when the fields try to change `Id`
    pub fn apply(&self, fields: &Fields) -> CoreResult<Record> {
        let table = self.table();
        if fields.table() != table {
            return Err(CoreError::TableMismatch {
                expected: table.name().to_string(),
                found: fields.table().name().to_string(),
            });
        }

        let mut values = self.values();
        for (column, value) in fields.iter() {
            if !column.is_assignable() {
                return Err(ValidationError::NotAssignable {
                    field: column.name.to_string(),
                }
                .into());
            }
            let position = table.position(column.name)?;
            values[position] = value.clone();
        }

        let record = Record::from_values(table, values)?;
        record.validate()?;
        Ok(record)
    }

    /// Checks the field-level rules of this record.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_id("Id", self.id())?;

        match self {
            Record::Hotel(h) => {
                validate_text("Name", &h.name)?;
                validate_text("City", &h.city)?;
                validate_text("Address", &h.address)?;
                validate_rating("Rating", h.rating)?;
            }
            Record::Room(r) => {
                validate_id("HotelId", r.hotel_id)?;
                validate_text("RoomType", &r.room_type)?;
                validate_price("PricePerNight", r.price_per_night)?;
                validate_max_guests("MaxGuests", r.max_guests)?;
            }
            Record::Booking(b) => {
                validate_id("HotelId", b.hotel_id)?;
                validate_text("GuestName", &b.guest_name)?;
                b.stay()?;
            }
            Record::BookedRoom(l) => {
                validate_id("BookingId", l.booking_id)?;
                validate_id("RoomId", l.room_id)?;
            }
        }

        Ok(())
    }

    /// Foreign keys of this record: column, referenced table, referenced id.
    pub fn references(&self) -> Vec<(&'static ColumnDef, Table, i64)> {
        self.table()
            .columns()
            .iter()
            .zip(self.values())
            .filter_map(|(column, value)| {
                let target = column.references?;
                value.as_integer().map(|id| (column, target, id))
            })
            .collect()
    }

    /// The booking whose derived values depend on this row, if any.
    ///
    /// Rooms and hotels affect many bookings and are resolved by the
    /// repository with a query.
    pub fn owning_booking(&self) -> Option<i64> {
        match self {
            Record::Booking(b) => Some(b.id),
            Record::BookedRoom(l) => Some(l.booking_id),
            Record::Hotel(_) | Record::Room(_) => None,
        }
    }
}

/// Every row of one table, as returned by a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TableRows {
    pub table: Table,
    pub records: Vec<Record>,
}

// =============================================================================
// Cell Reader
// =============================================================================

/// Sequential typed reader over one row.
struct Cells {
    columns: std::slice::Iter<'static, ColumnDef>,
    values: std::vec::IntoIter<Value>,
}

impl Cells {
    fn new(table: Table, values: Vec<Value>) -> Self {
        Cells {
            columns: table.columns().iter(),
            values: values.into_iter(),
        }
    }

    fn next(&mut self) -> ValidationResult<(&'static ColumnDef, Value)> {
        match (self.columns.next(), self.values.next()) {
            (Some(column), Some(value)) => Ok((column, column.check(value)?)),
            (column, _) => Err(ValidationError::Required {
                field: column.map_or("?", |c| c.name).to_string(),
            }),
        }
    }

    fn mismatch(column: &ColumnDef) -> ValidationError {
        ValidationError::InvalidFormat {
            field: column.name.to_string(),
            reason: format!("expected a {} value", column.ty),
        }
    }

    fn integer(&mut self) -> ValidationResult<i64> {
        match self.next()? {
            (_, Value::Integer(n)) => Ok(n),
            (column, _) => Err(Self::mismatch(column)),
        }
    }

    fn text(&mut self) -> ValidationResult<String> {
        match self.next()? {
            (_, Value::Text(s)) => Ok(s),
            (column, _) => Err(Self::mismatch(column)),
        }
    }

    fn money(&mut self) -> ValidationResult<Money> {
        match self.next()? {
            (_, Value::Money(m)) => Ok(m),
            (column, _) => Err(Self::mismatch(column)),
        }
    }

    fn date(&mut self) -> ValidationResult<NaiveDate> {
        match self.next()? {
            (_, Value::Date(d)) => Ok(d),
            (column, _) => Err(Self::mismatch(column)),
        }
    }

    fn optional_real(&mut self) -> ValidationResult<Option<f64>> {
        match self.next()? {
            (_, Value::Null) => Ok(None),
            (_, Value::Real(x)) => Ok(Some(x)),
            (column, _) => Err(Self::mismatch(column)),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn booking() -> Record {
        Record::Booking(Booking {
            id: 1,
            hotel_id: 1,
            guest_name: "Ada Lovelace".to_string(),
            check_in_date: date(2024, 1, 1),
            check_out_date: date(2024, 1, 4),
            total_cost: Money::from_cents(30000),
        })
    }

    #[test]
    fn test_values_round_trip_through_from_values() {
        let record = booking();
        let rebuilt = Record::from_values(Table::Bookings, record.values()).unwrap();
        assert_eq!(rebuilt, record);
    }

    #[test]
    fn test_from_values_rejects_wrong_width() {
        let err = Record::from_values(Table::BookedRooms, vec![Value::Integer(1)]).unwrap_err();
        assert!(matches!(err, CoreError::ColumnCount { expected: 4, found: 1, .. }));
    }

    #[test]
    fn test_from_values_rejects_wrong_type() {
        let values = vec![
            Value::Integer(1),
            Value::Text("one".to_string()),
            Value::Integer(1),
            Value::Integer(3),
        ];
        let err = Record::from_values(Table::BookedRooms, values).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_from_fields_defaults_derived_columns() {
        let fields = Fields::parse(Table::BookedRooms, [("BookingId", "1"), ("RoomId", "2")]).unwrap();
        let record = Record::from_fields(&fields, 5).unwrap();

        assert_eq!(
            record,
            Record::BookedRoom(BookedRoom {
                id: 5,
                booking_id: 1,
                room_id: 2,
                number_of_nights: 0,
            })
        );
    }

    #[test]
    fn test_from_fields_requires_columns() {
        let fields = Fields::parse(Table::Hotels, [("Name", "Adlon"), ("City", "Berlin")]).unwrap();
        let err = Record::from_fields(&fields, 1).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Required { ref field }) if field == "Address"
        ));
    }

    #[test]
    fn test_from_fields_rejects_zero_night_stay() {
        let fields = Fields::parse(
            Table::Bookings,
            [
                ("HotelId", "1"),
                ("GuestName", "Ada"),
                ("CheckInDate", "04.01.2024"),
                ("CheckOutDate", "04.01.2024"),
            ],
        )
        .unwrap();
        let err = Record::from_fields(&fields, 1).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::StayTooShort { .. })));
    }

    #[test]
    fn test_apply_changes_only_assigned_columns() {
        let fields = Fields::parse(Table::Bookings, [("CheckOutDate", "06.01.2024")]).unwrap();
        let updated = booking().apply(&fields).unwrap();

        match updated {
            Record::Booking(b) => {
                assert_eq!(b.check_out_date, date(2024, 1, 6));
                assert_eq!(b.guest_name, "Ada Lovelace");
                assert_eq!(b.stay().unwrap().nights(), 5);
            }
            other => panic!("unexpected record {:?}", other),
        }
    }

    #[test]
    fn test_apply_refuses_id_and_other_tables() {
        let mut fields = Fields::new(Table::Bookings);
        fields.set("Id", 9_i64).unwrap();
        let err = booking().apply(&fields).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::NotAssignable { .. })));

        let fields = Fields::parse(Table::Rooms, [("RoomType", "Suite")]).unwrap();
        assert!(matches!(
            booking().apply(&fields),
            Err(CoreError::TableMismatch { .. })
        ));
    }

    #[test]
    fn test_references() {
        let line = Record::BookedRoom(BookedRoom {
            id: 1,
            booking_id: 7,
            room_id: 3,
            number_of_nights: 2,
        });
        let refs: Vec<_> = line
            .references()
            .into_iter()
            .map(|(column, table, id)| (column.name, table, id))
            .collect();
        assert_eq!(
            refs,
            vec![("BookingId", Table::Bookings, 7), ("RoomId", Table::Rooms, 3)]
        );
        assert_eq!(line.owning_booking(), Some(7));
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(booking()).unwrap();
        assert_eq!(json["table"], "Bookings");
        assert_eq!(json["row"]["GuestName"], "Ada Lovelace");
        assert_eq!(json["row"]["CheckInDate"], "2024-01-01");
        assert_eq!(json["row"]["TotalCost"], 30000);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Date(date(2024, 1, 4)).to_string(), "04.01.2024");
        assert_eq!(Value::Money(Money::from_cents(45000)).to_string(), "450.00");
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::from(None::<f64>), Value::Null);
    }
}
