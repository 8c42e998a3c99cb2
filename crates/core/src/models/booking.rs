use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::BookingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    CanceledByClient,
    CanceledByPartner,
    NoShow,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 7] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::InProgress,
        BookingStatus::Completed,
        BookingStatus::CanceledByClient,
        BookingStatus::CanceledByPartner,
        BookingStatus::NoShow,
    ];

    /// Statuses that release the booking's hold on a post.
    pub const RELEASING: [BookingStatus; 2] = [
        BookingStatus::CanceledByClient,
        BookingStatus::CanceledByPartner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::Completed => "completed",
            BookingStatus::CanceledByClient => "canceled_by_client",
            BookingStatus::CanceledByPartner => "canceled_by_partner",
            BookingStatus::NoShow => "no_show",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Completed
                | BookingStatus::CanceledByClient
                | BookingStatus::CanceledByPartner
                | BookingStatus::NoShow
        )
    }

    pub fn is_canceled(&self) -> bool {
        Self::RELEASING.contains(self)
    }

    /// Whether a booking in this status holds a post.
    pub fn occupies(&self) -> bool {
        !self.is_canceled()
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Confirmed, InProgress)
                | (InProgress, Completed)
                | (Pending | Confirmed, CanceledByClient)
                | (Pending | Confirmed, CanceledByPartner)
                | (Confirmed, NoShow)
        )
    }

    pub fn transition(self, next: BookingStatus) -> Result<BookingStatus, BookingError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(BookingError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookingStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| BookingError::Validation(format!("unknown booking status {s:?}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    NotPaid,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::NotPaid => "not_paid",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_paid" => Ok(PaymentStatus::NotPaid),
            "paid" => Ok(PaymentStatus::Paid),
            "refunded" => Ok(PaymentStatus::Refunded),
            other => Err(BookingError::Validation(format!(
                "unknown payment status {other:?}"
            ))),
        }
    }
}

/// How the client identifies the car being serviced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarInfo {
    pub car_id: Option<Uuid>,
    pub car_type_id: Option<Uuid>,
    pub license_plate: Option<String>,
}

impl CarInfo {
    pub fn is_identified(&self) -> bool {
        self.car_id.is_some()
            || self.car_type_id.is_some()
            || self
                .license_plate
                .as_deref()
                .is_some_and(|plate| !plate.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingServiceLine {
    pub service_id: Uuid,
    pub quantity: i32,
    /// Unit price in minor currency units.
    pub price: i64,
}

impl BookingServiceLine {
    pub fn total(&self) -> i64 {
        self.price * i64::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub client_id: Uuid,
    pub service_point_id: Uuid,
    pub slot_id: Option<Uuid>,
    pub car: CarInfo,
    pub booking_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub services: Vec<BookingServiceLine>,
    pub total_price: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Half-open overlap with `[start, end)`.
    pub fn overlaps(&self, start: NaiveTime, end: NaiveTime) -> bool {
        self.start_time < end && self.end_time > start
    }
}

/// Attributes of a booking about to be inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBooking {
    pub client_id: Uuid,
    pub service_point_id: Uuid,
    pub slot_id: Option<Uuid>,
    pub car: CarInfo,
    pub booking_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub services: Vec<BookingServiceLine>,
    pub total_price: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingEventType {
    Created,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingEventType {
    /// Event emitted when a booking enters `status`, if any.
    pub fn for_status(status: BookingStatus) -> Option<Self> {
        match status {
            BookingStatus::Pending => None,
            BookingStatus::Confirmed => Some(BookingEventType::Confirmed),
            BookingStatus::CanceledByClient | BookingStatus::CanceledByPartner => {
                Some(BookingEventType::Cancelled)
            }
            BookingStatus::Completed => Some(BookingEventType::Completed),
            BookingStatus::InProgress | BookingStatus::NoShow => None,
        }
    }
}

/// Fact handed to the notification collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingEvent {
    pub booking_id: Uuid,
    pub event_type: BookingEventType,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(BookingStatus::Pending, BookingStatus::Confirmed)]
    #[case(BookingStatus::Confirmed, BookingStatus::InProgress)]
    #[case(BookingStatus::InProgress, BookingStatus::Completed)]
    #[case(BookingStatus::Pending, BookingStatus::CanceledByClient)]
    #[case(BookingStatus::Confirmed, BookingStatus::CanceledByPartner)]
    #[case(BookingStatus::Confirmed, BookingStatus::NoShow)]
    fn allowed_transitions(#[case] from: BookingStatus, #[case] to: BookingStatus) {
        assert_eq!(from.transition(to).unwrap(), to);
    }

    #[rstest]
    #[case(BookingStatus::Pending, BookingStatus::Completed)]
    #[case(BookingStatus::Pending, BookingStatus::NoShow)]
    #[case(BookingStatus::InProgress, BookingStatus::CanceledByClient)]
    #[case(BookingStatus::Completed, BookingStatus::Pending)]
    #[case(BookingStatus::CanceledByClient, BookingStatus::Confirmed)]
    #[case(BookingStatus::NoShow, BookingStatus::Confirmed)]
    fn rejected_transitions(#[case] from: BookingStatus, #[case] to: BookingStatus) {
        match from.transition(to) {
            Err(BookingError::InvalidTransition { from: f, to: t }) => {
                assert_eq!((f, t), (from, to));
            }
            other => panic!("expected InvalidTransition, got {other:?}"),
        }
    }

    #[test]
    fn terminal_statuses_have_no_exits() {
        for status in BookingStatus::ALL.into_iter().filter(|s| s.is_terminal()) {
            assert!(BookingStatus::ALL
                .into_iter()
                .all(|next| !status.can_transition_to(next)));
        }
    }

    #[test]
    fn only_cancellations_release_posts() {
        let releasing: Vec<_> = BookingStatus::ALL
            .into_iter()
            .filter(|s| !s.occupies())
            .collect();
        assert_eq!(releasing, BookingStatus::RELEASING.to_vec());
    }

    #[test]
    fn status_strings_round_trip() {
        for status in BookingStatus::ALL {
            assert_eq!(status.as_str().parse::<BookingStatus>().unwrap(), status);
        }
        assert!("cancelled".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn car_requires_an_identifier() {
        assert!(!CarInfo::default().is_identified());
        let plate_only = CarInfo {
            license_plate: Some("AA1234BB".to_string()),
            ..CarInfo::default()
        };
        assert!(plate_only.is_identified());
        let blank_plate = CarInfo {
            license_plate: Some("   ".to_string()),
            ..CarInfo::default()
        };
        assert!(!blank_plate.is_identified());
    }
}
