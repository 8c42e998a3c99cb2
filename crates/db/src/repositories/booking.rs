use std::collections::HashMap;

use crate::models::{DbBooking, DbBookingService};
use chrono::{NaiveDate, NaiveTime};
use eyre::Result;
use sqlx::PgConnection;
use tirebook_core::models::booking::{Booking, BookingServiceLine, BookingStatus, NewBooking};
use uuid::Uuid;

const BOOKING_COLUMNS: &str = r#"
    id, client_id, service_point_id, slot_id, car_id, car_type_id, license_plate,
    booking_date, start_time, end_time, status, payment_status, total_price, notes, created_at
"#;

/// Serialises admissions for one point and date until the surrounding
/// transaction ends.
pub async fn lock_booking_day(
    conn: &mut PgConnection,
    service_point_id: Uuid,
    date: NaiveDate,
) -> Result<()> {
    let key = format!("bookings:{}:{}", service_point_id, date);
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind(&key)
        .execute(&mut *conn)
        .await?;

    tracing::debug!("Acquired booking day lock {}", key);
    Ok(())
}

pub async fn get_bookings_overlapping(
    conn: &mut PgConnection,
    service_point_id: Uuid,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    excluding: &[BookingStatus],
) -> Result<Vec<Booking>> {
    let excluding: Vec<String> = excluding.iter().map(|s| s.as_str().to_string()).collect();

    let rows = sqlx::query_as::<_, DbBooking>(&format!(
        r#"
        SELECT {BOOKING_COLUMNS}
        FROM bookings
        WHERE service_point_id = $1
          AND booking_date = $2
          AND start_time < $4
          AND end_time > $3
          AND NOT (status = ANY($5))
        ORDER BY start_time ASC
        "#
    ))
    .bind(service_point_id)
    .bind(date)
    .bind(start)
    .bind(end)
    .bind(&excluding)
    .fetch_all(&mut *conn)
    .await?;

    attach_services(conn, rows).await
}

pub async fn get_booking_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<Booking>> {
    let row = sqlx::query_as::<_, DbBooking>(&format!(
        r#"
        SELECT {BOOKING_COLUMNS}
        FROM bookings
        WHERE id = $1
        "#
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some(row) => Ok(attach_services(conn, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

pub async fn insert_booking(conn: &mut PgConnection, booking: &NewBooking) -> Result<Booking> {
    let id = Uuid::new_v4();

    let row = sqlx::query_as::<_, DbBooking>(&format!(
        r#"
        INSERT INTO bookings
            (id, client_id, service_point_id, slot_id, car_id, car_type_id, license_plate,
             booking_date, start_time, end_time, status, payment_status, total_price, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        RETURNING {BOOKING_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(booking.client_id)
    .bind(booking.service_point_id)
    .bind(booking.slot_id)
    .bind(booking.car.car_id)
    .bind(booking.car.car_type_id)
    .bind(booking.car.license_plate.as_deref())
    .bind(booking.booking_date)
    .bind(booking.start_time)
    .bind(booking.end_time)
    .bind(booking.status.as_str())
    .bind(booking.payment_status.as_str())
    .bind(booking.total_price)
    .bind(booking.notes.as_deref())
    .fetch_one(&mut *conn)
    .await?;

    for line in &booking.services {
        sqlx::query(
            r#"
            INSERT INTO booking_services (booking_id, service_id, quantity, price)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(id)
        .bind(line.service_id)
        .bind(line.quantity)
        .bind(line.price)
        .execute(&mut *conn)
        .await?;
    }

    tracing::debug!("Inserted booking {} on {} {}-{}", id, booking.booking_date, booking.start_time, booking.end_time);
    row.into_booking(booking.services.clone())
}

/// Sets `to` only while the row is still in `from`. `None` when no row matched.
pub async fn update_booking_status(
    conn: &mut PgConnection,
    id: Uuid,
    from: BookingStatus,
    to: BookingStatus,
) -> Result<Option<Booking>> {
    let row = sqlx::query_as::<_, DbBooking>(&format!(
        r#"
        UPDATE bookings
        SET status = $3
        WHERE id = $1 AND status = $2
        RETURNING {BOOKING_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(from.as_str())
    .bind(to.as_str())
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some(row) => Ok(attach_services(conn, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

async fn attach_services(conn: &mut PgConnection, rows: Vec<DbBooking>) -> Result<Vec<Booking>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let lines = sqlx::query_as::<_, DbBookingService>(
        r#"
        SELECT booking_id, service_id, quantity, price
        FROM booking_services
        WHERE booking_id = ANY($1)
        "#,
    )
    .bind(&ids)
    .fetch_all(&mut *conn)
    .await?;

    let mut by_booking: HashMap<Uuid, Vec<BookingServiceLine>> = HashMap::new();
    for line in lines {
        by_booking.entry(line.booking_id).or_default().push(line.into());
    }

    rows.into_iter()
        .map(|row| {
            let services = by_booking.remove(&row.id).unwrap_or_default();
            row.into_booking(services)
        })
        .collect()
}
