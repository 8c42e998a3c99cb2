use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create service_points table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS service_points (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            partner_id UUID NOT NULL,
            city_id UUID NULL,
            name VARCHAR(255) NOT NULL,
            default_slot_duration INTEGER NOT NULL DEFAULT 60,
            post_count INTEGER NOT NULL DEFAULT 1,
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            working_hours JSONB NOT NULL DEFAULT '{}'::jsonb,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT positive_default_slot_duration CHECK (default_slot_duration > 0)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create service_posts table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS service_posts (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            service_point_id UUID NOT NULL REFERENCES service_points(id),
            post_number INTEGER NOT NULL,
            name VARCHAR(255) NULL,
            slot_duration INTEGER NOT NULL,
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            has_custom_schedule BOOLEAN NOT NULL DEFAULT FALSE,
            working_days JSONB NOT NULL DEFAULT '{}'::jsonb,
            custom_hours JSONB NULL,
            CONSTRAINT unique_post_number UNIQUE (service_point_id, post_number),
            CONSTRAINT positive_slot_duration CHECK (slot_duration > 0)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create schedule_templates table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schedule_templates (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            service_point_id UUID NOT NULL REFERENCES service_points(id) ON DELETE CASCADE,
            weekday SMALLINT NOT NULL,
            opening_time TIME NOT NULL,
            closing_time TIME NOT NULL,
            is_working_day BOOLEAN NOT NULL DEFAULT TRUE,
            CONSTRAINT unique_template_weekday UNIQUE (service_point_id, weekday),
            CONSTRAINT valid_weekday CHECK (weekday BETWEEN 0 AND 6)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create schedule_exceptions table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schedule_exceptions (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            service_point_id UUID NOT NULL REFERENCES service_points(id) ON DELETE CASCADE,
            exception_date DATE NOT NULL,
            is_closed BOOLEAN NOT NULL DEFAULT TRUE,
            opening_time TIME NULL,
            closing_time TIME NULL,
            reason TEXT NULL,
            CONSTRAINT unique_exception_date UNIQUE (service_point_id, exception_date)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create schedule_slots table (cache of the dynamic computation)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schedule_slots (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            service_point_id UUID NOT NULL REFERENCES service_points(id) ON DELETE CASCADE,
            service_post_id UUID NOT NULL REFERENCES service_posts(id) ON DELETE CASCADE,
            slot_date DATE NOT NULL,
            start_time TIME NOT NULL,
            end_time TIME NOT NULL,
            post_number INTEGER NOT NULL,
            is_available BOOLEAN NOT NULL DEFAULT TRUE,
            CONSTRAINT unique_post_slot UNIQUE (service_post_id, slot_date, start_time),
            CONSTRAINT valid_slot_range CHECK (end_time > start_time)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create services and per-point pricing tables
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS services (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name VARCHAR(255) NOT NULL,
            base_price BIGINT NOT NULL DEFAULT 0
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS service_point_services (
            service_point_id UUID NOT NULL REFERENCES service_points(id) ON DELETE CASCADE,
            service_id UUID NOT NULL REFERENCES services(id),
            price BIGINT NULL,
            PRIMARY KEY (service_point_id, service_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create bookings table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bookings (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            client_id UUID NOT NULL,
            service_point_id UUID NOT NULL REFERENCES service_points(id),
            slot_id UUID NULL,
            car_id UUID NULL,
            car_type_id UUID NULL,
            license_plate VARCHAR(32) NULL,
            booking_date DATE NOT NULL,
            start_time TIME NOT NULL,
            end_time TIME NOT NULL,
            status VARCHAR(32) NOT NULL DEFAULT 'pending',
            payment_status VARCHAR(32) NOT NULL DEFAULT 'not_paid',
            total_price BIGINT NOT NULL DEFAULT 0,
            notes TEXT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_booking_range CHECK (end_time > start_time),
            CONSTRAINT valid_booking_status CHECK (status IN (
                'pending', 'confirmed', 'in_progress', 'completed',
                'canceled_by_client', 'canceled_by_partner', 'no_show'
            )),
            CONSTRAINT has_car_identifier CHECK (
                car_id IS NOT NULL OR car_type_id IS NOT NULL OR license_plate IS NOT NULL
            )
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS booking_services (
            booking_id UUID NOT NULL REFERENCES bookings(id),
            service_id UUID NOT NULL REFERENCES services(id),
            quantity INTEGER NOT NULL DEFAULT 1,
            price BIGINT NOT NULL,
            PRIMARY KEY (booking_id, service_id),
            CONSTRAINT positive_quantity CHECK (quantity > 0)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    for statement in [
        "CREATE INDEX IF NOT EXISTS idx_service_posts_point ON service_posts(service_point_id)",
        "CREATE INDEX IF NOT EXISTS idx_schedule_slots_point_date ON schedule_slots(service_point_id, slot_date)",
        "CREATE INDEX IF NOT EXISTS idx_bookings_point_date ON bookings(service_point_id, booking_date)",
        "CREATE INDEX IF NOT EXISTS idx_bookings_status ON bookings(status)",
        "CREATE INDEX IF NOT EXISTS idx_booking_services_booking ON booking_services(booking_id)",
    ] {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
