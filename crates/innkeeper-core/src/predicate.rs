//! # Predicates
//!
//! Row filters for select, update and delete: a conjunction of
//! `column <op> value` conditions over one table.
//!
//! Column names are resolved against the static schema when the predicate
//! is built, so the SQL layer only ever interpolates names from
//! [`Table::columns`]. Values stay typed and are bound as parameters.

use serde::Serialize;

use crate::error::{CoreResult, ValidationError};
use crate::schema::{ColumnDef, Table};
use crate::types::Value;

/// Comparison operator of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    pub const fn sql(self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::Ne => "<>",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }
}

/// `column <op> value`. A `Null` value is only valid with `Eq` / `Ne` and
/// renders as `IS NULL` / `IS NOT NULL`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: &'static ColumnDef,
    pub op: CmpOp,
    pub value: Value,
}

/// All conditions must hold. An empty predicate matches every row.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    table: Table,
    conditions: Vec<Condition>,
}

impl Predicate {
    /// Matches every row of `table`.
    pub fn all(table: Table) -> Self {
        Predicate {
            table,
            conditions: Vec::new(),
        }
    }

    /// Matches the row with the given primary key.
    pub fn by_id(table: Table, id: i64) -> Self {
        Predicate {
            table,
            conditions: vec![Condition {
                column: &table.columns()[0],
                op: CmpOp::Eq,
                value: Value::Integer(id),
            }],
        }
    }

    /// Adds a typed condition.
    ///
    /// ## Example
    /// ```rust
    /// use innkeeper_core::{CmpOp, Money, Predicate, Table};
    ///
    /// let expensive = Predicate::all(Table::Rooms)
    ///     .with("PricePerNight", CmpOp::Ge, Money::from_cents(20000))
    ///     .unwrap();
    /// assert_eq!(expensive.conditions().len(), 1);
    /// ```
    pub fn with(mut self, column: &str, op: CmpOp, value: impl Into<Value>) -> CoreResult<Self> {
        let column = self.table.column(column)?;
        let value = match value.into() {
            Value::Null if matches!(op, CmpOp::Eq | CmpOp::Ne) => Value::Null,
            Value::Null => {
                return Err(ValidationError::InvalidFormat {
                    field: column.name.to_string(),
                    reason: "only = and <> can compare with an empty value".to_string(),
                }
                .into())
            }
            value => column.check(value)?,
        };

        self.conditions.push(Condition { column, op, value });
        Ok(self)
    }

    /// Adds a condition from raw form text, coerced like an insert field.
    pub fn with_raw(self, column: &str, op: CmpOp, raw: &str) -> CoreResult<Self> {
        let value = self.table.column(column)?.coerce(raw)?;
        self.with(column, op, value)
    }

    pub fn table(&self) -> Table {
        self.table
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use chrono::NaiveDate;

    #[test]
    fn test_by_id_targets_primary_key() {
        let predicate = Predicate::by_id(Table::Bookings, 3);
        let condition = &predicate.conditions()[0];
        assert_eq!(condition.column.name, "Id");
        assert_eq!(condition.op, CmpOp::Eq);
        assert_eq!(condition.value, Value::Integer(3));
    }

    #[test]
    fn test_with_raw_coerces_dates() {
        let predicate = Predicate::all(Table::Bookings)
            .with_raw("CheckInDate", CmpOp::Ge, "01.02.2024")
            .unwrap();
        assert_eq!(
            predicate.conditions()[0].value,
            Value::Date(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap())
        );
    }

    #[test]
    fn test_unknown_column_rejected() {
        let err = Predicate::all(Table::Rooms)
            .with("Floor", CmpOp::Eq, 2_i64)
            .unwrap_err();
        assert!(matches!(err, CoreError::UnknownColumn { .. }));
    }

    #[test]
    fn test_null_only_with_equality() {
        assert!(Predicate::all(Table::Hotels)
            .with("Rating", CmpOp::Eq, Value::Null)
            .is_ok());
        assert!(Predicate::all(Table::Hotels)
            .with("Rating", CmpOp::Lt, Value::Null)
            .is_err());
    }

    #[test]
    fn test_value_type_checked() {
        assert!(Predicate::all(Table::Rooms)
            .with("MaxGuests", CmpOp::Gt, "two")
            .is_err());
    }

    #[test]
    fn test_sql_operators() {
        assert_eq!(CmpOp::Ne.sql(), "<>");
        assert_eq!(CmpOp::Ge.sql(), ">=");
    }
}
