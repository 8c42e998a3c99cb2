use crate::models::{DbScheduleException, DbScheduleTemplate};
use chrono::NaiveDate;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn get_templates_by_service_point(
    pool: &Pool<Postgres>,
    service_point_id: Uuid,
) -> Result<Vec<DbScheduleTemplate>> {
    let templates = sqlx::query_as::<_, DbScheduleTemplate>(
        r#"
        SELECT id, service_point_id, weekday, opening_time, closing_time, is_working_day
        FROM schedule_templates
        WHERE service_point_id = $1
        ORDER BY weekday ASC
        "#,
    )
    .bind(service_point_id)
    .fetch_all(pool)
    .await?;

    Ok(templates)
}

pub async fn get_exception_for_date(
    pool: &Pool<Postgres>,
    service_point_id: Uuid,
    date: NaiveDate,
) -> Result<Option<DbScheduleException>> {
    let exception = sqlx::query_as::<_, DbScheduleException>(
        r#"
        SELECT id, service_point_id, exception_date, is_closed, opening_time, closing_time, reason
        FROM schedule_exceptions
        WHERE service_point_id = $1 AND exception_date = $2
        "#,
    )
    .bind(service_point_id)
    .bind(date)
    .fetch_optional(pool)
    .await?;

    if let Some(e) = &exception {
        tracing::debug!("Schedule exception on {} for service point {}: closed={}", date, service_point_id, e.is_closed);
    }

    Ok(exception)
}
