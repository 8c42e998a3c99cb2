use crate::models::{DbServicePoint, DbServicePost, DbServicePrice};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn get_service_point_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> Result<Option<DbServicePoint>> {
    let point = sqlx::query_as::<_, DbServicePoint>(
        r#"
        SELECT id, partner_id, city_id, name, default_slot_duration, post_count,
               is_active, working_hours
        FROM service_points
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(point)
}

pub async fn get_active_posts(
    pool: &Pool<Postgres>,
    service_point_id: Uuid,
) -> Result<Vec<DbServicePost>> {
    let posts = sqlx::query_as::<_, DbServicePost>(
        r#"
        SELECT id, service_point_id, post_number, name, slot_duration, is_active,
               has_custom_schedule, working_days, custom_hours
        FROM service_posts
        WHERE service_point_id = $1 AND is_active
        ORDER BY post_number ASC
        "#,
    )
    .bind(service_point_id)
    .fetch_all(pool)
    .await?;

    tracing::debug!("Loaded {} active posts for service point {}", posts.len(), service_point_id);
    Ok(posts)
}

pub async fn get_service_prices(
    pool: &Pool<Postgres>,
    service_point_id: Uuid,
    service_ids: &[Uuid],
) -> Result<Vec<DbServicePrice>> {
    let prices = sqlx::query_as::<_, DbServicePrice>(
        r#"
        SELECT s.id AS service_id, s.base_price, sps.price AS point_price
        FROM services s
        LEFT JOIN service_point_services sps
            ON sps.service_id = s.id AND sps.service_point_id = $1
        WHERE s.id = ANY($2)
        "#,
    )
    .bind(service_point_id)
    .bind(service_ids)
    .fetch_all(pool)
    .await?;

    Ok(prices)
}
