use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use eyre::Result;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use tirebook_core::models::{
    booking::{Booking, BookingServiceLine, CarInfo},
    schedule::{ScheduleException, ScheduleTemplate},
    service_point::{CustomHours, ServicePoint, ServicePost, ServicePrice, WorkingHours},
    slot::ScheduleSlot,
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbServicePoint {
    pub id: Uuid,
    pub partner_id: Uuid,
    pub city_id: Option<Uuid>,
    pub name: String,
    pub default_slot_duration: i32,
    pub post_count: i32,
    pub is_active: bool,
    pub working_hours: Json<WorkingHours>,
}

impl From<DbServicePoint> for ServicePoint {
    fn from(row: DbServicePoint) -> Self {
        ServicePoint {
            id: row.id,
            partner_id: row.partner_id,
            city_id: row.city_id,
            name: row.name,
            default_slot_duration: row.default_slot_duration,
            post_count: row.post_count,
            is_active: row.is_active,
            working_hours: row.working_hours.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbServicePost {
    pub id: Uuid,
    pub service_point_id: Uuid,
    pub post_number: i32,
    pub name: Option<String>,
    pub slot_duration: i32,
    pub is_active: bool,
    pub has_custom_schedule: bool,
    pub working_days: Json<BTreeMap<String, bool>>,
    pub custom_hours: Option<Json<CustomHours>>,
}

impl From<DbServicePost> for ServicePost {
    fn from(row: DbServicePost) -> Self {
        ServicePost {
            id: row.id,
            service_point_id: row.service_point_id,
            post_number: row.post_number,
            name: row.name,
            slot_duration: row.slot_duration,
            is_active: row.is_active,
            has_custom_schedule: row.has_custom_schedule,
            working_days: row.working_days.0,
            custom_hours: row.custom_hours.map(|hours| hours.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbScheduleTemplate {
    pub id: Uuid,
    pub service_point_id: Uuid,
    pub weekday: i16,
    pub opening_time: NaiveTime,
    pub closing_time: NaiveTime,
    pub is_working_day: bool,
}

impl From<DbScheduleTemplate> for ScheduleTemplate {
    fn from(row: DbScheduleTemplate) -> Self {
        ScheduleTemplate {
            id: row.id,
            service_point_id: row.service_point_id,
            weekday: row.weekday,
            opening_time: row.opening_time,
            closing_time: row.closing_time,
            is_working_day: row.is_working_day,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbScheduleException {
    pub id: Uuid,
    pub service_point_id: Uuid,
    pub exception_date: NaiveDate,
    pub is_closed: bool,
    pub opening_time: Option<NaiveTime>,
    pub closing_time: Option<NaiveTime>,
    pub reason: Option<String>,
}

impl From<DbScheduleException> for ScheduleException {
    fn from(row: DbScheduleException) -> Self {
        ScheduleException {
            id: row.id,
            service_point_id: row.service_point_id,
            exception_date: row.exception_date,
            is_closed: row.is_closed,
            opening_time: row.opening_time,
            closing_time: row.closing_time,
            reason: row.reason,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbScheduleSlot {
    pub id: Uuid,
    pub service_point_id: Uuid,
    pub service_post_id: Uuid,
    pub slot_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub post_number: i32,
    pub is_available: bool,
}

impl From<DbScheduleSlot> for ScheduleSlot {
    fn from(row: DbScheduleSlot) -> Self {
        ScheduleSlot {
            id: row.id,
            service_point_id: row.service_point_id,
            service_post_id: row.service_post_id,
            slot_date: row.slot_date,
            start_time: row.start_time,
            end_time: row.end_time,
            post_number: row.post_number,
            is_available: row.is_available,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbServicePrice {
    pub service_id: Uuid,
    pub base_price: i64,
    pub point_price: Option<i64>,
}

impl From<DbServicePrice> for ServicePrice {
    fn from(row: DbServicePrice) -> Self {
        ServicePrice {
            service_id: row.service_id,
            base_price: row.base_price,
            point_price: row.point_price,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBooking {
    pub id: Uuid,
    pub client_id: Uuid,
    pub service_point_id: Uuid,
    pub slot_id: Option<Uuid>,
    pub car_id: Option<Uuid>,
    pub car_type_id: Option<Uuid>,
    pub license_plate: Option<String>,
    pub booking_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: String,
    pub payment_status: String,
    pub total_price: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DbBooking {
    pub fn into_booking(self, services: Vec<BookingServiceLine>) -> Result<Booking> {
        Ok(Booking {
            id: self.id,
            client_id: self.client_id,
            service_point_id: self.service_point_id,
            slot_id: self.slot_id,
            car: CarInfo {
                car_id: self.car_id,
                car_type_id: self.car_type_id,
                license_plate: self.license_plate,
            },
            booking_date: self.booking_date,
            start_time: self.start_time,
            end_time: self.end_time,
            status: self.status.parse()?,
            payment_status: self.payment_status.parse()?,
            services,
            total_price: self.total_price,
            notes: self.notes,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBookingService {
    pub booking_id: Uuid,
    pub service_id: Uuid,
    pub quantity: i32,
    pub price: i64,
}

impl From<DbBookingService> for BookingServiceLine {
    fn from(row: DbBookingService) -> Self {
        BookingServiceLine {
            service_id: row.service_id,
            quantity: row.quantity,
            price: row.price,
        }
    }
}
