//! # Record Repository
//!
//! Generic CRUD and query operations over the four tables.
//!
//! ## One Operation, One Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  repo.update(&fields, &predicate)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  pool.begin() ──► tx  (the only connection)                             │
//! │       │                                                                 │
//! │       ├── select matching rows                                          │
//! │       ├── apply + validate every row        ─┐                          │
//! │       ├── check foreign keys                 │ any Err: tx dropped,     │
//! │       ├── write rows                         │ everything rolls back    │
//! │       ├── consistency::recompute_bookings   ─┘                          │
//! │       ▼                                                                 │
//! │  tx.commit()                                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Delete Cascade
//! - Deleting rooms deletes their `BookedRooms` lines
//! - Deleting bookings deletes their `BookedRooms` lines
//! - Deleting hotels leaves rooms and bookings in place

use std::collections::BTreeSet;

use innkeeper_core::pricing::Discrepancy;
use innkeeper_core::validation::{validate_id, validate_search_term};
use innkeeper_core::{
    ColumnType, CoreError, Fields, Predicate, Record, Table, TableRows, ValidationError,
};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::{debug, info, warn};

use crate::consistency;
use crate::error::{DbError, DbResult};
use crate::repository::sql;

/// Repository for all four tables.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.records();
///
/// let fields = Fields::parse(Table::Hotels, [("Name", "Adlon"), ("City", "Berlin"), ("Address", "Unter den Linden 77")])?;
/// let hotel = repo.insert(&fields).await?;
///
/// let berlin = repo.search(Table::Hotels, "City", "berl").await?;
/// ```
#[derive(Debug, Clone)]
pub struct RecordRepository {
    pool: SqlitePool,
}

impl RecordRepository {
    /// Creates a new RecordRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RecordRepository { pool }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Inserts one row and returns it as stored, derived columns included.
    ///
    /// ## Rules
    /// - `Id` omitted: the next id (`MAX(Id) + 1`) is used
    /// - `Id` supplied: must be positive and not taken
    /// - Every foreign key must point at an existing row
    /// - A new line item takes its night count from its booking, and the
    ///   booking total is recomputed
    pub async fn insert(&self, fields: &Fields) -> DbResult<Record> {
        let table = fields.table();
        let mut tx = self.begin().await?;

        let record = rejected("insert", table, insert_in(&mut tx, fields).await)?;

        commit(tx).await?;
        debug!(table = %table, id = record.id(), "Record inserted");
        Ok(record)
    }

    /// Applies `fields` to every row matching `predicate`.
    ///
    /// ## Returns
    /// Number of rows updated. A predicate that matches nothing is a no-op.
    pub async fn update(&self, fields: &Fields, predicate: &Predicate) -> DbResult<u64> {
        let table = predicate.table();
        let mut tx = self.begin().await?;

        let updated = rejected("update", table, update_in(&mut tx, fields, predicate).await)?;

        commit(tx).await?;
        debug!(table = %table, updated, "Records updated");
        Ok(updated)
    }

    /// Deletes every row matching `predicate`, with the cascade above.
    ///
    /// ## Returns
    /// Number of rows removed from the target table.
    pub async fn delete(&self, predicate: &Predicate) -> DbResult<u64> {
        let table = predicate.table();
        let mut tx = self.begin().await?;

        let deleted = delete_in(&mut tx, predicate).await?;

        commit(tx).await?;
        debug!(table = %table, deleted, "Records deleted");
        Ok(deleted)
    }

    /// Deletes every row of one table. Same cascade as [`Self::delete`].
    pub async fn clear(&self, table: Table) -> DbResult<u64> {
        self.delete(&Predicate::all(table)).await
    }

    /// Empties all four tables in one transaction.
    ///
    /// ## Returns
    /// Total number of rows removed.
    pub async fn clear_all(&self) -> DbResult<u64> {
        let mut tx = self.begin().await?;

        let mut removed = 0;
        for table in Table::ALL.into_iter().rev() {
            let sql = format!("DELETE FROM {}", table.name());
            removed += sqlx::query(&sql).execute(&mut *tx).await?.rows_affected();
        }

        commit(tx).await?;
        info!(removed, "All tables cleared");
        Ok(removed)
    }

    /// Re-derives every booking. Repairs files written by other tools.
    pub async fn recompute_all(&self) -> DbResult<usize> {
        let mut tx = self.begin().await?;
        let refreshed = consistency::recompute_all(&mut tx).await?;
        commit(tx).await?;
        Ok(refreshed)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Every row matching `predicate`, in primary key order.
    pub async fn select_all(&self, predicate: &Predicate) -> DbResult<Vec<Record>> {
        let mut conn = self.pool.acquire().await?;
        let records = sql::select(&mut conn, predicate).await?;
        debug!(table = %predicate.table(), count = records.len(), "Records selected");
        Ok(records)
    }

    /// One row by primary key.
    pub async fn get(&self, table: Table, id: i64) -> DbResult<Option<Record>> {
        let mut records = self.select_all(&Predicate::by_id(table, id)).await?;
        Ok(records.pop())
    }

    /// Case-insensitive (ASCII) substring search on one text column.
    ///
    /// `%` and `_` in `term` match themselves. An empty term matches every
    /// row.
    ///
    /// ## Errors
    /// `CoreError::NotSearchable` when the column does not hold text.
    pub async fn search(&self, table: Table, column: &str, term: &str) -> DbResult<Vec<Record>> {
        let column = table.column(column)?;
        if column.ty != ColumnType::Text {
            return Err(CoreError::NotSearchable {
                table: table.name().to_string(),
                column: column.name.to_string(),
            }
            .into());
        }
        let term = validate_search_term(term)?;

        let mut builder = sql::select_from(table);
        builder
            .push(" WHERE ")
            .push(column.name)
            .push(" LIKE ")
            .push_bind(format!("%{}%", sql::escape_like(&term)))
            .push(" ESCAPE '\\' ORDER BY Id");

        let mut conn = self.pool.acquire().await?;
        let rows = builder.build().fetch_all(&mut *conn).await?;
        let records = rows
            .iter()
            .map(|row| sql::decode_row(table, row))
            .collect::<DbResult<Vec<_>>>()?;

        debug!(table = %table, column = column.name, term = %term, count = records.len(), "Search complete");
        Ok(records)
    }

    /// The id the next insert without an explicit `Id` would get.
    pub async fn next_id(&self, table: Table) -> DbResult<i64> {
        let mut conn = self.pool.acquire().await?;
        sql::next_id(&mut conn, table).await
    }

    /// Number of rows in a table.
    pub async fn count(&self, table: Table) -> DbResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.name());
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(count)
    }

    /// Every row of every table.
    pub async fn snapshot(&self) -> DbResult<Vec<TableRows>> {
        let mut conn = self.pool.acquire().await?;
        let mut tables = Vec::with_capacity(Table::ALL.len());
        for table in Table::ALL {
            let records = sql::select(&mut conn, &Predicate::all(table)).await?;
            tables.push(TableRows { table, records });
        }
        Ok(tables)
    }

    /// Stored derived values that disagree with the formula.
    pub async fn verify(&self) -> DbResult<Vec<Discrepancy>> {
        let mut conn = self.pool.acquire().await?;
        let found = consistency::audit(&mut conn).await?;
        if !found.is_empty() {
            warn!(count = found.len(), "Derived values out of date");
        }
        Ok(found)
    }

    async fn begin(&self) -> DbResult<Transaction<'static, Sqlite>> {
        self.pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }
}

async fn commit(tx: Transaction<'static, Sqlite>) -> DbResult<()> {
    tx.commit()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))
}

/// Logs a user-correctable rejection before handing it back.
fn rejected<T>(operation: &str, table: Table, result: DbResult<T>) -> DbResult<T> {
    if let Err(err) = &result {
        if err.is_validation() {
            warn!(operation, table = %table, error = %err, "Write rejected");
        }
    }
    result
}

// =============================================================================
// Transaction Bodies
// =============================================================================

async fn insert_in(conn: &mut SqliteConnection, fields: &Fields) -> DbResult<Record> {
    let table = fields.table();

    let id = match fields.id() {
        Some(id) => {
            validate_id("Id", id)?;
            if sql::exists(&mut *conn, table, id).await? {
                return Err(ValidationError::Duplicate {
                    field: "Id".to_string(),
                    value: id.to_string(),
                }
                .into());
            }
            id
        }
        None => sql::next_id(&mut *conn, table).await?,
    };

    let mut record = Record::from_fields(fields, id)?;
    check_references(&mut *conn, &record, None).await?;

    if let Record::BookedRoom(line) = &mut record {
        // The parent exists: check_references just confirmed it
        if let Some(stay) = consistency::booking_stay(&mut *conn, line.booking_id).await? {
            line.number_of_nights = stay.nights();
        }
    }

    let mut builder: QueryBuilder<'static, Sqlite> = QueryBuilder::new(format!(
        "INSERT INTO {} ({}) VALUES (",
        table.name(),
        table.column_list()
    ));
    for (i, value) in record.values().iter().enumerate() {
        if i > 0 {
            builder.push(", ");
        }
        sql::push_value(&mut builder, value);
    }
    builder.push(")");
    builder.build().execute(&mut *conn).await?;

    if let Some(booking_id) = record.owning_booking() {
        consistency::recompute_booking(&mut *conn, booking_id).await?;
    }

    let stored = sql::select(&mut *conn, &Predicate::by_id(table, id)).await?;
    stored
        .into_iter()
        .next()
        .ok_or_else(|| DbError::Internal(format!("{} {} vanished after insert", table, id)))
}

async fn update_in(
    conn: &mut SqliteConnection,
    fields: &Fields,
    predicate: &Predicate,
) -> DbResult<u64> {
    let table = predicate.table();
    if fields.table() != table {
        return Err(CoreError::TableMismatch {
            expected: table.name().to_string(),
            found: fields.table().name().to_string(),
        }
        .into());
    }
    if fields.is_empty() {
        return Ok(0);
    }

    let before = sql::select(&mut *conn, predicate).await?;
    let after = before
        .iter()
        .map(|record| record.apply(fields))
        .collect::<Result<Vec<_>, _>>()?;

    let assigned: BTreeSet<&str> = fields.iter().map(|(column, _)| column.name).collect();
    for record in &after {
        check_references(&mut *conn, record, Some(&assigned)).await?;
    }

    let columns: Vec<_> = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, column)| column.is_assignable())
        .collect();

    for record in &after {
        let values = record.values();
        let mut builder: QueryBuilder<'static, Sqlite> =
            QueryBuilder::new(format!("UPDATE {} SET ", table.name()));
        for (n, (position, column)) in columns.iter().enumerate() {
            if n > 0 {
                builder.push(", ");
            }
            builder.push(column.name).push(" = ");
            sql::push_value(&mut builder, &values[*position]);
        }
        builder.push(" WHERE Id = ").push_bind(record.id());
        builder.build().execute(&mut *conn).await?;
    }

    let mut bookings = consistency::affected_bookings(&mut *conn, &before).await?;
    bookings.extend(consistency::affected_bookings(&mut *conn, &after).await?);
    let refreshed = consistency::recompute_bookings(&mut *conn, &bookings).await?;

    debug!(table = %table, rows = after.len(), refreshed, "Update cascade complete");
    Ok(after.len() as u64)
}

async fn delete_in(conn: &mut SqliteConnection, predicate: &Predicate) -> DbResult<u64> {
    let table = predicate.table();

    let doomed = sql::select(&mut *conn, predicate).await?;
    if doomed.is_empty() {
        return Ok(0);
    }
    let bookings = consistency::affected_bookings(&mut *conn, &doomed).await?;

    let cascade_column = match table {
        Table::Rooms => Some("RoomId"),
        Table::Bookings => Some("BookingId"),
        Table::Hotels | Table::BookedRooms => None,
    };
    if let Some(column) = cascade_column {
        let mut builder: QueryBuilder<'static, Sqlite> = QueryBuilder::new(format!(
            "DELETE FROM BookedRooms WHERE {} IN (SELECT Id FROM {}",
            column,
            table.name()
        ));
        sql::push_where(&mut builder, predicate);
        builder.push(")");
        let lines = builder.build().execute(&mut *conn).await?.rows_affected();
        debug!(table = %table, lines, "Cascaded line item delete");
    }

    let mut builder: QueryBuilder<'static, Sqlite> =
        QueryBuilder::new(format!("DELETE FROM {}", table.name()));
    sql::push_where(&mut builder, predicate);
    let deleted = builder.build().execute(&mut *conn).await?.rows_affected();

    let refreshed = consistency::recompute_bookings(&mut *conn, &bookings).await?;
    debug!(table = %table, deleted, refreshed, "Delete cascade complete");
    Ok(deleted)
}

/// Every foreign key of `record` must point at an existing row.
///
/// With `only`, just the listed columns are checked (the ones an update
/// assigns).
async fn check_references(
    conn: &mut SqliteConnection,
    record: &Record,
    only: Option<&BTreeSet<&str>>,
) -> DbResult<()> {
    for (column, target, id) in record.references() {
        if only.is_some_and(|names| !names.contains(column.name)) {
            continue;
        }
        if !sql::exists(&mut *conn, target, id).await? {
            return Err(ValidationError::DanglingReference {
                field: column.name.to_string(),
                table: target.name().to_string(),
                id,
            }
            .into());
        }
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use innkeeper_core::{Booking, CmpOp, Money};

    async fn repo() -> RecordRepository {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.records()
    }

    fn fields<'a>(table: Table, raw: &[(&'a str, &'a str)]) -> Fields {
        Fields::parse(table, raw.iter().copied()).unwrap()
    }

    /// Hotel 1, rooms 1 (100.00) and 2 (60.00), booking 1 for 3 nights
    /// with room 1, booking 2 for 2 nights with room 2.
    async fn seeded() -> RecordRepository {
        let repo = repo().await;
        repo.insert(&fields(
            Table::Hotels,
            &[("Name", "Adlon"), ("City", "Berlin"), ("Address", "Unter den Linden 77")],
        ))
        .await
        .unwrap();
        for (room_type, price) in [("Double", "100"), ("Single", "60")] {
            repo.insert(&fields(
                Table::Rooms,
                &[
                    ("HotelId", "1"),
                    ("RoomType", room_type),
                    ("PricePerNight", price),
                    ("MaxGuests", "2"),
                ],
            ))
            .await
            .unwrap();
        }
        for (guest, check_in, check_out) in [
            ("Ada Lovelace", "01.01.2024", "04.01.2024"),
            ("Alan Turing", "10.02.2024", "12.02.2024"),
        ] {
            repo.insert(&fields(
                Table::Bookings,
                &[
                    ("HotelId", "1"),
                    ("GuestName", guest),
                    ("CheckInDate", check_in),
                    ("CheckOutDate", check_out),
                ],
            ))
            .await
            .unwrap();
        }
        for (booking, room) in [("1", "1"), ("2", "2")] {
            repo.insert(&fields(Table::BookedRooms, &[("BookingId", booking), ("RoomId", room)]))
                .await
                .unwrap();
        }
        repo
    }

    async fn booking(repo: &RecordRepository, id: i64) -> Booking {
        match repo.get(Table::Bookings, id).await.unwrap() {
            Some(Record::Booking(booking)) => booking,
            other => panic!("expected booking {}, got {:?}", id, other),
        }
    }

    async fn nights_of(repo: &RecordRepository, booking_id: i64) -> Vec<i64> {
        let predicate = Predicate::all(Table::BookedRooms)
            .with("BookingId", CmpOp::Eq, booking_id)
            .unwrap();
        repo.select_all(&predicate)
            .await
            .unwrap()
            .into_iter()
            .map(|record| match record {
                Record::BookedRoom(line) => line.number_of_nights,
                other => panic!("unexpected record {:?}", other),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_line_item_insert_derives_nights_and_total() {
        let repo = seeded().await;

        assert_eq!(nights_of(&repo, 1).await, vec![3]);
        assert_eq!(booking(&repo, 1).await.total_cost, Money::from_cents(30000));
        assert_eq!(booking(&repo, 2).await.total_cost, Money::from_cents(12000));
        assert!(repo.verify().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_price_change_reprices_only_affected_bookings() {
        let repo = seeded().await;

        let updated = repo
            .update(
                &fields(Table::Rooms, &[("PricePerNight", "150")]),
                &Predicate::by_id(Table::Rooms, 1),
            )
            .await
            .unwrap();

        assert_eq!(updated, 1);
        assert_eq!(booking(&repo, 1).await.total_cost, Money::from_cents(45000));
        assert_eq!(booking(&repo, 2).await.total_cost, Money::from_cents(12000));
    }

    async fn room_price(repo: &RecordRepository, id: i64) -> Money {
        match repo.get(Table::Rooms, id).await.unwrap() {
            Some(Record::Room(room)) => room.price_per_night,
            other => panic!("expected room {}, got {:?}", id, other),
        }
    }

    #[tokio::test]
    async fn test_overflowing_total_rolls_back_price_change() {
        let repo = seeded().await;
        let price = Fields::new(Table::Rooms)
            .with("PricePerNight", Money::from_cents(i64::MAX / 2))
            .unwrap();

        let err = repo
            .update(&price, &Predicate::by_id(Table::Rooms, 1))
            .await
            .unwrap_err();

        assert!(matches!(err.validation(), Some(ValidationError::Overflow { .. })));
        assert_eq!(room_price(&repo, 1).await, Money::from_cents(10000));
        assert_eq!(booking(&repo, 1).await.total_cost, Money::from_cents(30000));
    }

    #[tokio::test]
    async fn test_unreadable_stored_date_rolls_back_price_change() {
        let repo = seeded().await;
        sqlx::query("UPDATE Bookings SET CheckOutDate = 'garbage' WHERE Id = 1")
            .execute(&repo.pool)
            .await
            .unwrap();

        let err = repo
            .update(
                &fields(Table::Rooms, &[("PricePerNight", "150")]),
                &Predicate::by_id(Table::Rooms, 1),
            )
            .await
            .unwrap_err();

        assert!(matches!(err.validation(), Some(ValidationError::InvalidFormat { .. })));
        assert_eq!(room_price(&repo, 1).await, Money::from_cents(10000));
        assert_eq!(room_price(&repo, 2).await, Money::from_cents(6000));
    }

    #[tokio::test]
    async fn test_date_change_updates_nights_and_total() {
        let repo = seeded().await;

        repo.update(
            &fields(Table::Bookings, &[("CheckOutDate", "06.01.2024")]),
            &Predicate::by_id(Table::Bookings, 1),
        )
        .await
        .unwrap();

        assert_eq!(nights_of(&repo, 1).await, vec![5]);
        assert_eq!(booking(&repo, 1).await.total_cost, Money::from_cents(50000));
    }

    #[tokio::test]
    async fn test_inverted_stay_is_rejected_and_nothing_persists() {
        let repo = seeded().await;
        let before = repo.count(Table::Bookings).await.unwrap();

        let err = repo
            .insert(&fields(
                Table::Bookings,
                &[
                    ("HotelId", "1"),
                    ("GuestName", "Grace Hopper"),
                    ("CheckInDate", "05.03.2024"),
                    ("CheckOutDate", "05.03.2024"),
                ],
            ))
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(repo.count(Table::Bookings).await.unwrap(), before);

        let err = repo
            .update(
                &fields(Table::Bookings, &[("CheckOutDate", "31.12.2023")]),
                &Predicate::by_id(Table::Bookings, 1),
            )
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(nights_of(&repo, 1).await, vec![3]);
        assert_eq!(
            booking(&repo, 1).await.check_out_date.format("%Y-%m-%d").to_string(),
            "2024-01-04"
        );
    }

    #[tokio::test]
    async fn test_duplicate_id_and_dangling_reference_are_rejected() {
        let repo = seeded().await;

        let err = repo
            .insert(&fields(
                Table::Hotels,
                &[("Id", "1"), ("Name", "Sacher"), ("City", "Vienna"), ("Address", "Philharmoniker Str. 4")],
            ))
            .await
            .unwrap_err();
        assert!(matches!(err.validation(), Some(ValidationError::Duplicate { .. })));

        let err = repo
            .insert(&fields(Table::BookedRooms, &[("BookingId", "7"), ("RoomId", "1")]))
            .await
            .unwrap_err();
        assert_eq!(
            err.validation(),
            Some(&ValidationError::DanglingReference {
                field: "BookingId".to_string(),
                table: "Bookings".to_string(),
                id: 7,
            })
        );

        let err = repo
            .update(
                &fields(Table::Rooms, &[("HotelId", "42")]),
                &Predicate::by_id(Table::Rooms, 1),
            )
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(repo.count(Table::BookedRooms).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_explicit_id_and_next_id() {
        let repo = seeded().await;
        assert_eq!(repo.next_id(Table::Hotels).await.unwrap(), 2);

        let hotel = repo
            .insert(&fields(
                Table::Hotels,
                &[("Id", "10"), ("Name", "Sacher"), ("City", "Vienna"), ("Address", "Philharmoniker Str. 4")],
            ))
            .await
            .unwrap();
        assert_eq!(hotel.id(), 10);
        assert_eq!(repo.next_id(Table::Hotels).await.unwrap(), 11);
    }

    #[tokio::test]
    async fn test_deleting_all_line_items_zeroes_total() {
        let repo = seeded().await;

        let deleted = repo
            .delete(
                &Predicate::all(Table::BookedRooms)
                    .with("BookingId", CmpOp::Eq, 1_i64)
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(deleted, 1);
        assert_eq!(booking(&repo, 1).await.total_cost, Money::zero());
        assert_eq!(booking(&repo, 2).await.total_cost, Money::from_cents(12000));
    }

    #[tokio::test]
    async fn test_moving_line_item_recomputes_both_bookings() {
        let repo = seeded().await;

        repo.update(
            &fields(Table::BookedRooms, &[("BookingId", "2")]),
            &Predicate::by_id(Table::BookedRooms, 1),
        )
        .await
        .unwrap();

        assert_eq!(booking(&repo, 1).await.total_cost, Money::zero());
        // 2 nights of 100.00 plus 2 nights of 60.00
        assert_eq!(booking(&repo, 2).await.total_cost, Money::from_cents(32000));
        assert_eq!(nights_of(&repo, 2).await, vec![2, 2]);
    }

    #[tokio::test]
    async fn test_room_delete_cascades_to_line_items() {
        let repo = seeded().await;

        assert_eq!(repo.delete(&Predicate::by_id(Table::Rooms, 1)).await.unwrap(), 1);

        assert!(nights_of(&repo, 1).await.is_empty());
        assert_eq!(booking(&repo, 1).await.total_cost, Money::zero());
        assert_eq!(repo.count(Table::BookedRooms).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_booking_delete_cascades_to_line_items() {
        let repo = seeded().await;

        repo.delete(&Predicate::by_id(Table::Bookings, 2)).await.unwrap();

        assert_eq!(repo.count(Table::Bookings).await.unwrap(), 1);
        assert_eq!(repo.count(Table::BookedRooms).await.unwrap(), 1);
        assert_eq!(booking(&repo, 1).await.total_cost, Money::from_cents(30000));
    }

    #[tokio::test]
    async fn test_hotel_delete_keeps_dependent_rows() {
        let repo = seeded().await;

        repo.delete(&Predicate::by_id(Table::Hotels, 1)).await.unwrap();

        assert_eq!(repo.count(Table::Hotels).await.unwrap(), 0);
        assert_eq!(repo.count(Table::Rooms).await.unwrap(), 2);
        assert_eq!(booking(&repo, 1).await.total_cost, Money::from_cents(30000));
    }

    #[tokio::test]
    async fn test_delete_matching_nothing_is_noop() {
        let repo = seeded().await;
        assert_eq!(repo.delete(&Predicate::by_id(Table::Rooms, 99)).await.unwrap(), 0);
        assert_eq!(
            repo.update(
                &fields(Table::Rooms, &[("MaxGuests", "3")]),
                &Predicate::by_id(Table::Rooms, 99)
            )
            .await
            .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_escapes_wildcards() {
        let repo = seeded().await;
        repo.insert(&fields(
            Table::Hotels,
            &[("Name", "100% Comfort"), ("City", "Riga"), ("Address", "Kalku iela 9")],
        ))
        .await
        .unwrap();

        let found = repo.search(Table::Hotels, "Name", "adl").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), 1);

        let found = repo.search(Table::Hotels, "Name", "%").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), 2);

        assert_eq!(repo.search(Table::Hotels, "Name", "").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_search_keeps_surrounding_spaces() {
        let repo = seeded().await;
        for name in ["Grand Hotel", "Hotelier"] {
            repo.insert(&fields(
                Table::Hotels,
                &[("Name", name), ("City", "Vienna"), ("Address", "Ring 1")],
            ))
            .await
            .unwrap();
        }

        let ids = |records: Vec<Record>| records.iter().map(Record::id).collect::<Vec<_>>();
        assert_eq!(ids(repo.search(Table::Hotels, "Name", " Hotel").await.unwrap()), vec![2]);
        assert_eq!(ids(repo.search(Table::Hotels, "Name", " ").await.unwrap()), vec![2]);
        assert_eq!(ids(repo.search(Table::Hotels, "Name", "hotel").await.unwrap()), vec![2, 3]);
    }

    #[tokio::test]
    async fn test_search_on_non_text_column_is_fatal() {
        let repo = seeded().await;

        let err = repo.search(Table::Rooms, "PricePerNight", "1").await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::NotSearchable { .. })));
        assert!(!err.is_validation());

        let err = repo.search(Table::Rooms, "Colour", "red").await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::UnknownColumn { .. })));
    }

    #[tokio::test]
    async fn test_table_mismatch_is_fatal() {
        let repo = seeded().await;
        let err = repo
            .update(
                &fields(Table::Hotels, &[("City", "Potsdam")]),
                &Predicate::by_id(Table::Rooms, 1),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::TableMismatch { .. })));
    }

    #[tokio::test]
    async fn test_snapshot_clear_and_clear_all() {
        let repo = seeded().await;

        let snapshot = repo.snapshot().await.unwrap();
        let sizes: Vec<usize> = snapshot.iter().map(|rows| rows.records.len()).collect();
        assert_eq!(sizes, vec![1, 2, 2, 2]);

        assert_eq!(repo.clear(Table::Bookings).await.unwrap(), 2);
        assert_eq!(repo.count(Table::BookedRooms).await.unwrap(), 0);

        assert_eq!(repo.clear_all().await.unwrap(), 3);
        for table in Table::ALL {
            assert_eq!(repo.count(table).await.unwrap(), 0);
        }
    }

    #[tokio::test]
    async fn test_real_money_from_other_tooling_is_not_decoded() {
        let repo = seeded().await;
        // Whole units as REAL, the way other tools write prices
        sqlx::query("INSERT INTO Rooms VALUES (3, 1, 'Suite', 249.5, 2)")
            .execute(&repo.pool)
            .await
            .unwrap();

        let err = repo.get(Table::Rooms, 3).await.unwrap_err();
        assert!(!err.is_validation());
        assert_eq!(room_price(&repo, 1).await, Money::from_cents(10000));
    }

    #[tokio::test]
    async fn test_recompute_all_repairs_foreign_writes() {
        let repo = seeded().await;
        sqlx::query("UPDATE Bookings SET TotalCost = 1")
            .execute(&repo.pool)
            .await
            .unwrap();
        assert_eq!(repo.verify().await.unwrap().len(), 2);

        assert_eq!(repo.recompute_all().await.unwrap(), 2);
        assert!(repo.verify().await.unwrap().is_empty());
    }
}
