//! # Fields
//!
//! Column assignments supplied by a caller for an insert or update.
//!
//! ## Flow
//! ```text
//! Form: { "PricePerNight": "150,00", "MaxGuests": "2" }
//!      │
//!      ▼
//! Fields::parse(Table::Rooms, ..) ← THIS MODULE
//!      │  unknown column  → CoreError::UnknownColumn (fatal)
//!      │  derived column  → ValidationError::NotAssignable
//!      │  bad text        → ValidationError::InvalidFormat
//!      ▼
//! Fields { PricePerNight: Money(15000), MaxGuests: Integer(2) }
//! ```

use crate::error::{CoreResult, ValidationError};
use crate::schema::{ColumnDef, ColumnType, Table};
use crate::types::Value;

/// Typed, schema-checked column values for one table.
#[derive(Debug, Clone, PartialEq)]
pub struct Fields {
    table: Table,
    values: Vec<(&'static ColumnDef, Value)>,
}

impl Fields {
    /// Creates an empty assignment set.
    pub fn new(table: Table) -> Self {
        Fields {
            table,
            values: Vec::new(),
        }
    }

    /// Parses raw form text, column by column.
    ///
    /// A blank `Id` is skipped so the repository can assign the next id.
    /// Later duplicates of a column replace earlier ones.
    ///
    /// ## Example
    /// ```rust
    /// use innkeeper_core::{Fields, Money, Table, Value};
    ///
    /// let fields = Fields::parse(Table::Rooms, [("Id", ""), ("PricePerNight", "150,00")]).unwrap();
    /// assert_eq!(fields.id(), None);
    /// assert_eq!(fields.get("PricePerNight"), Some(&Value::Money(Money::from_cents(15000))));
    /// ```
    pub fn parse<I, K, V>(table: Table, raw: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut fields = Fields::new(table);

        for (name, text) in raw {
            let column = table.column(name.as_ref())?;
            if matches!(column.ty, ColumnType::Id) && text.as_ref().trim().is_empty() {
                continue;
            }
            Self::ensure_settable(column)?;
            let value = column.coerce(text.as_ref())?;
            fields.insert(column, value);
        }

        Ok(fields)
    }

    /// Sets a typed value.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> CoreResult<&mut Self> {
        let column = self.table.column(name)?;
        Self::ensure_settable(column)?;
        let value = column.check(value.into())?;
        self.insert(column, value);
        Ok(self)
    }

    /// Builder form of [`Fields::set`].
    ///
    /// ## Example
    /// ```rust
    /// use innkeeper_core::{Fields, Money, Table};
    ///
    /// let fields = Fields::new(Table::Rooms)
    ///     .with("PricePerNight", Money::from_cents(15000))
    ///     .unwrap();
    /// assert_eq!(fields.len(), 1);
    /// ```
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> CoreResult<Self> {
        self.set(name, value)?;
        Ok(self)
    }

    pub fn table(&self) -> Table {
        self.table
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(column, _)| column.name == name)
            .map(|(_, value)| value)
    }

    /// The caller-supplied primary key, if any.
    pub fn id(&self) -> Option<i64> {
        self.get("Id").and_then(Value::as_integer)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static ColumnDef, &Value)> {
        self.values.iter().map(|(column, value)| (*column, value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn ensure_settable(column: &ColumnDef) -> Result<(), ValidationError> {
        if column.derived {
            return Err(ValidationError::NotAssignable {
                field: column.name.to_string(),
            });
        }
        Ok(())
    }

    fn insert(&mut self, column: &'static ColumnDef, value: Value) {
        match self.values.iter_mut().find(|(c, _)| c.name == column.name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((column, value)),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::money::Money;

    #[test]
    fn test_parse_coerces_by_column_type() {
        let fields = Fields::parse(
            Table::Rooms,
            [("HotelId", "1"), ("RoomType", " Double "), ("PricePerNight", "100")],
        )
        .unwrap();

        assert_eq!(fields.get("HotelId"), Some(&Value::Integer(1)));
        assert_eq!(fields.get("RoomType"), Some(&Value::Text("Double".to_string())));
        assert_eq!(fields.get("PricePerNight"), Some(&Value::Money(Money::from_cents(10000))));
        assert_eq!(fields.len(), 3);
    }

    #[test]
    fn test_parse_unknown_column_is_fatal() {
        let err = Fields::parse(Table::Hotels, [("Stars", "5")]).unwrap_err();
        assert!(matches!(err, CoreError::UnknownColumn { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_derived_columns_not_assignable() {
        let err = Fields::parse(Table::Bookings, [("TotalCost", "1")]).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::NotAssignable { .. })));

        let mut fields = Fields::new(Table::BookedRooms);
        assert!(fields.set("NumberOfNights", 4_i64).is_err());
    }

    #[test]
    fn test_explicit_id() {
        let fields = Fields::parse(Table::Hotels, [("Id", "42")]).unwrap();
        assert_eq!(fields.id(), Some(42));
        assert!(Fields::parse(Table::Hotels, [("Id", "x")]).is_err());
    }

    #[test]
    fn test_set_replaces_and_type_checks() {
        let mut fields = Fields::new(Table::Hotels);
        fields.set("Name", "Adlon").unwrap();
        fields.set("Name", "Kempinski").unwrap();
        assert_eq!(fields.get("Name"), Some(&Value::Text("Kempinski".to_string())));
        assert_eq!(fields.len(), 1);

        assert!(fields.set("Name", 3_i64).is_err());
    }
}
