//! # Consistency Engine
//!
//! Keeps the derived columns in step with the rows they are derived from.
//!
//! ## Recompute of One Booking
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  recompute_booking(conn, booking_id)                                    │
//! │       │                                                                 │
//! │       ├── booking gone? ───────────────► no-op, Ok(None)                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Stay::parse_stored(CheckInDate, CheckOutDate)                          │
//! │       │   not a date / out <= in ──────► Err, whole mutation rolls back │
//! │       ▼                                                                 │
//! │  UPDATE BookedRooms SET NumberOfNights = nights  (changed rows only)    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Σ PricePerNight × NumberOfNights   (BookedRooms ⋈ Rooms)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UPDATE Bookings SET TotalCost = Σ     (only when it changed)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Who Triggers What
//! ```text
//! Mutated row      Affected bookings
//! ───────────      ─────────────────────────────────────────────
//! BookedRoom       its BookingId (old and new on update)
//! Booking          itself
//! Room             every booking with a line item on the room
//! Hotel            every booking with that HotelId
//! ```
//!
//! Every function takes the caller's connection, which is always the open
//! transaction of one repository operation. The engine never commits.

use std::collections::BTreeSet;

use innkeeper_core::pricing::{audit_booking, booking_total, Discrepancy, LineCharge, LineItem};
use innkeeper_core::{Money, Predicate, Record, Stay, Table};
use sqlx::SqliteConnection;
use tracing::{debug, info};

use crate::error::DbResult;
use crate::repository::sql;

/// The validated stay of a booking, `None` when the booking does not exist.
pub async fn booking_stay(conn: &mut SqliteConnection, booking_id: i64) -> DbResult<Option<Stay>> {
    let dates: Option<(String, String)> =
        sqlx::query_as("SELECT CheckInDate, CheckOutDate FROM Bookings WHERE Id = ?")
            .bind(booking_id)
            .fetch_optional(&mut *conn)
            .await?;

    match dates {
        Some((check_in, check_out)) => Ok(Some(Stay::parse_stored(&check_in, &check_out)?)),
        None => Ok(None),
    }
}

/// Re-derives `NumberOfNights` and `TotalCost` for one booking.
///
/// ## Returns
/// The new total, or `None` when the booking does not exist.
pub async fn recompute_booking(
    conn: &mut SqliteConnection,
    booking_id: i64,
) -> DbResult<Option<Money>> {
    let Some(stay) = booking_stay(&mut *conn, booking_id).await? else {
        debug!(booking_id, "Booking no longer exists, nothing to recompute");
        return Ok(None);
    };
    let nights = stay.nights();

    let nights_changed = sqlx::query(
        "UPDATE BookedRooms SET NumberOfNights = ?1 WHERE BookingId = ?2 AND NumberOfNights <> ?1",
    )
    .bind(nights)
    .bind(booking_id)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    let lines: Vec<(Money, i64)> = sqlx::query_as(
        r#"
        SELECT r.PricePerNight, br.NumberOfNights
        FROM BookedRooms br
        INNER JOIN Rooms r ON r.Id = br.RoomId
        WHERE br.BookingId = ?
        ORDER BY br.Id
        "#,
    )
    .bind(booking_id)
    .fetch_all(&mut *conn)
    .await?;

    let total = booking_total(
        lines
            .iter()
            .map(|&(price, nights)| LineCharge::new(price, nights)),
    )?;

    let total_changed = sqlx::query("UPDATE Bookings SET TotalCost = ?1 WHERE Id = ?2 AND TotalCost <> ?1")
        .bind(total)
        .bind(booking_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    debug!(
        booking_id,
        nights,
        lines = lines.len(),
        total = %total,
        nights_changed,
        total_changed = total_changed > 0,
        "Booking recomputed"
    );

    Ok(Some(total))
}

/// Recomputes each booking in ascending id order.
///
/// ## Returns
/// Number of bookings that still exist and were refreshed.
pub async fn recompute_bookings(
    conn: &mut SqliteConnection,
    booking_ids: &BTreeSet<i64>,
) -> DbResult<usize> {
    let mut refreshed = 0;
    for &booking_id in booking_ids {
        if recompute_booking(&mut *conn, booking_id).await?.is_some() {
            refreshed += 1;
        }
    }
    Ok(refreshed)
}

/// Bookings whose derived values depend on any of the given rows.
pub async fn affected_bookings(
    conn: &mut SqliteConnection,
    records: &[Record],
) -> DbResult<BTreeSet<i64>> {
    let mut bookings = BTreeSet::new();

    for record in records {
        if let Some(booking_id) = record.owning_booking() {
            bookings.insert(booking_id);
            continue;
        }

        let sql = match record.table() {
            Table::Rooms => "SELECT DISTINCT BookingId FROM BookedRooms WHERE RoomId = ?",
            Table::Hotels => "SELECT Id FROM Bookings WHERE HotelId = ?",
            Table::Bookings | Table::BookedRooms => continue,
        };
        let ids: Vec<i64> = sqlx::query_scalar(sql)
            .bind(record.id())
            .fetch_all(&mut *conn)
            .await?;
        bookings.extend(ids);
    }

    Ok(bookings)
}

/// Re-derives every booking in the database.
pub async fn recompute_all(conn: &mut SqliteConnection) -> DbResult<usize> {
    let ids: Vec<i64> = sqlx::query_scalar("SELECT Id FROM Bookings ORDER BY Id")
        .fetch_all(&mut *conn)
        .await?;
    let ids: BTreeSet<i64> = ids.into_iter().collect();

    let refreshed = recompute_bookings(conn, &ids).await?;
    info!(refreshed, "All bookings recomputed");
    Ok(refreshed)
}

/// Compares every stored derived value against the formula, without writing.
///
/// Line items whose room is missing contribute nothing, the same as the
/// inner join used by [`recompute_booking`].
pub async fn audit(conn: &mut SqliteConnection) -> DbResult<Vec<Discrepancy>> {
    let bookings = sql::select(&mut *conn, &Predicate::all(Table::Bookings)).await?;
    let mut found = Vec::new();

    for record in &bookings {
        let Record::Booking(booking) = record else {
            continue;
        };

        let rows: Vec<(i64, i64, Option<Money>)> = sqlx::query_as(
            r#"
            SELECT br.Id, br.NumberOfNights, r.PricePerNight
            FROM BookedRooms br
            LEFT JOIN Rooms r ON r.Id = br.RoomId
            WHERE br.BookingId = ?
            ORDER BY br.Id
            "#,
        )
        .bind(booking.id)
        .fetch_all(&mut *conn)
        .await?;

        let lines: Vec<LineItem> = rows
            .into_iter()
            .map(|(booked_room_id, nights, price)| LineItem {
                booked_room_id,
                nights,
                price,
            })
            .collect();

        found.extend(audit_booking(booking, &lines));
    }

    debug!(bookings = bookings.len(), discrepancies = found.len(), "Audit complete");
    Ok(found)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    async fn seeded() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        for sql in [
            "INSERT INTO Hotels (Id, Name, City, Address) VALUES (1, 'Adlon', 'Berlin', 'Unter den Linden 77')",
            "INSERT INTO Rooms VALUES (1, 1, 'Double', 10000, 2)",
            "INSERT INTO Rooms VALUES (2, 1, 'Single', 6000, 1)",
            "INSERT INTO Bookings VALUES (1, 1, 'Ada', '2024-01-01', '2024-01-04', 0)",
            "INSERT INTO BookedRooms VALUES (1, 1, 1, 0)",
            "INSERT INTO BookedRooms VALUES (2, 1, 2, 0)",
        ] {
            sqlx::query(sql).execute(db.pool()).await.unwrap();
        }
        db
    }

    #[tokio::test]
    async fn test_recompute_booking_derives_nights_and_total() {
        let db = seeded().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let total = recompute_booking(&mut conn, 1).await.unwrap();
        assert_eq!(total, Some(Money::from_cents(48000)));

        let nights: Vec<i64> = sqlx::query_scalar("SELECT NumberOfNights FROM BookedRooms ORDER BY Id")
            .fetch_all(&mut *conn)
            .await
            .unwrap();
        assert_eq!(nights, vec![3, 3]);

        // Idempotent
        assert_eq!(recompute_booking(&mut conn, 1).await.unwrap(), total);
    }

    #[tokio::test]
    async fn test_total_is_stored_as_integer_hundredths() {
        let db = seeded().await;
        let mut conn = db.pool().acquire().await.unwrap();
        recompute_booking(&mut conn, 1).await.unwrap();

        let (kind, total): (String, Money) =
            sqlx::query_as("SELECT typeof(TotalCost), TotalCost FROM Bookings WHERE Id = 1")
                .fetch_one(&mut *conn)
                .await
                .unwrap();
        assert_eq!(kind, "integer");
        assert_eq!(total, Money::from_cents(48000));
    }

    #[tokio::test]
    async fn test_recompute_missing_booking_is_noop() {
        let db = seeded().await;
        let mut conn = db.pool().acquire().await.unwrap();
        assert_eq!(recompute_booking(&mut conn, 99).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unparsable_dates_fail_loudly() {
        let db = seeded().await;
        sqlx::query("UPDATE Bookings SET CheckOutDate = 'someday' WHERE Id = 1")
            .execute(db.pool())
            .await
            .unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        let err = recompute_booking(&mut conn, 1).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_audit_then_repair() {
        let db = seeded().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let found = audit(&mut conn).await.unwrap();
        // Two stale night counts and one stale total
        assert_eq!(found.len(), 3);

        assert_eq!(recompute_all(&mut conn).await.unwrap(), 1);
        assert!(audit(&mut conn).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_affected_bookings_by_room_and_hotel() {
        let db = seeded().await;
        let mut conn = db.pool().acquire().await.unwrap();
        let rows = sql::select(&mut conn, &Predicate::by_id(Table::Rooms, 2))
            .await
            .unwrap();
        let hotels = sql::select(&mut conn, &Predicate::all(Table::Hotels))
            .await
            .unwrap();

        assert_eq!(
            affected_bookings(&mut conn, &rows).await.unwrap(),
            BTreeSet::from([1])
        );
        assert_eq!(
            affected_bookings(&mut conn, &hotels).await.unwrap(),
            BTreeSet::from([1])
        );
    }
}
