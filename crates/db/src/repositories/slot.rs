use crate::models::DbScheduleSlot;
use chrono::NaiveDate;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn get_slot_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbScheduleSlot>> {
    let slot = sqlx::query_as::<_, DbScheduleSlot>(
        r#"
        SELECT id, service_point_id, service_post_id, slot_date, start_time, end_time,
               post_number, is_available
        FROM schedule_slots
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(slot)
}

/// Replaces every cached slot of a point on `date` in one transaction.
pub async fn replace_slots_for_date(
    pool: &Pool<Postgres>,
    service_point_id: Uuid,
    date: NaiveDate,
    slots: &[DbScheduleSlot],
) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        DELETE FROM schedule_slots
        WHERE service_point_id = $1 AND slot_date = $2
        "#,
    )
    .bind(service_point_id)
    .bind(date)
    .execute(&mut *tx)
    .await?;

    for slot in slots {
        sqlx::query(
            r#"
            INSERT INTO schedule_slots
                (id, service_point_id, service_post_id, slot_date, start_time, end_time,
                 post_number, is_available)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(slot.id)
        .bind(slot.service_point_id)
        .bind(slot.service_post_id)
        .bind(slot.slot_date)
        .bind(slot.start_time)
        .bind(slot.end_time)
        .bind(slot.post_number)
        .bind(slot.is_available)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    tracing::debug!("Replaced {} cached slots for service point {} on {}", slots.len(), service_point_id, date);
    Ok(())
}
