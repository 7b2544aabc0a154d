//! SQL building blocks shared by the repository and the consistency engine.
//!
//! Identifiers are only ever taken from the static schema in
//! `innkeeper_core::schema`; every value goes through `push_bind`.

use innkeeper_core::stay::{format_stored_date, parse_stored_date};
use innkeeper_core::{ColumnType, Money, Predicate, Record, Table, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection};

use crate::error::DbResult;

/// `SELECT <all columns> FROM <table>`, ready for a WHERE clause.
pub(crate) fn select_from(table: Table) -> QueryBuilder<'static, Sqlite> {
    QueryBuilder::new(format!(
        "SELECT {} FROM {}",
        table.column_list(),
        table.name()
    ))
}

/// Appends ` WHERE a = ? AND b < ? ...` for a non-empty predicate.
pub(crate) fn push_where(builder: &mut QueryBuilder<'static, Sqlite>, predicate: &Predicate) {
    for (i, condition) in predicate.conditions().iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        builder.push(condition.column.name);

        if condition.value.is_null() {
            builder.push(match condition.op {
                innkeeper_core::CmpOp::Ne => " IS NOT NULL",
                _ => " IS NULL",
            });
        } else {
            builder.push(" ").push(condition.op.sql()).push(" ");
            push_value(builder, &condition.value);
        }
    }
}

/// Binds one typed value in its storage representation.
pub(crate) fn push_value(builder: &mut QueryBuilder<'static, Sqlite>, value: &Value) {
    match value {
        Value::Null => builder.push_bind(None::<i64>),
        Value::Integer(n) => builder.push_bind(*n),
        Value::Real(x) => builder.push_bind(*x),
        Value::Text(s) => builder.push_bind(s.clone()),
        Value::Money(m) => builder.push_bind(*m),
        Value::Date(d) => builder.push_bind(format_stored_date(*d)),
    };
}

/// Decodes a full-width row selected with [`select_from`].
///
/// A stored date that is not a calendar date fails here, loudly.
pub(crate) fn decode_row(table: Table, row: &SqliteRow) -> DbResult<Record> {
    let mut values = Vec::with_capacity(table.columns().len());

    for (i, column) in table.columns().iter().enumerate() {
        let value: Value = match column.ty {
            ColumnType::Id | ColumnType::Integer => row.try_get::<Option<i64>, _>(i)?.into(),
            ColumnType::Real => row.try_get::<Option<f64>, _>(i)?.into(),
            ColumnType::Text => row.try_get::<Option<String>, _>(i)?.into(),
            ColumnType::Money => row.try_get::<Option<Money>, _>(i)?.into(),
            ColumnType::Date => match row.try_get::<Option<String>, _>(i)? {
                Some(text) => Value::Date(parse_stored_date(column.name, &text)?),
                None => Value::Null,
            },
        };
        values.push(value);
    }

    Ok(Record::from_values(table, values)?)
}

/// Runs a predicate select and decodes every row, ordered by primary key.
pub(crate) async fn select(
    conn: &mut SqliteConnection,
    predicate: &Predicate,
) -> DbResult<Vec<Record>> {
    let table = predicate.table();
    let mut builder = select_from(table);
    push_where(&mut builder, predicate);
    builder.push(" ORDER BY Id");

    let rows = builder.build().fetch_all(&mut *conn).await?;
    rows.iter().map(|row| decode_row(table, row)).collect()
}

/// Whether a row with the given primary key exists.
pub(crate) async fn exists(conn: &mut SqliteConnection, table: Table, id: i64) -> DbResult<bool> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE Id = ?)", table.name());
    let found: bool = sqlx::query_scalar(&sql).bind(id).fetch_one(&mut *conn).await?;
    Ok(found)
}

/// `MAX(Id) + 1`, or 1 for an empty table.
pub(crate) async fn next_id(conn: &mut SqliteConnection, table: Table) -> DbResult<i64> {
    let sql = format!("SELECT COALESCE(MAX(Id), 0) + 1 FROM {}", table.name());
    let id: i64 = sqlx::query_scalar(&sql).fetch_one(&mut *conn).await?;
    Ok(id)
}

/// Escapes `%`, `_` and the escape character itself for `LIKE ... ESCAPE '\'`.
pub(crate) fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use innkeeper_core::CmpOp;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like("Suite"), "Suite");
    }

    #[test]
    fn test_where_clause_shape() {
        let predicate = Predicate::all(Table::Hotels)
            .with("City", CmpOp::Eq, "Berlin")
            .unwrap()
            .with("Rating", CmpOp::Ne, Value::Null)
            .unwrap();

        let mut builder = select_from(Table::Hotels);
        push_where(&mut builder, &predicate);

        assert_eq!(
            builder.sql(),
            "SELECT Id, Name, City, Address, Rating FROM Hotels WHERE City = ? AND Rating IS NOT NULL"
        );
    }
}
