//! Booking model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// Booking lifecycle status.
///
/// A booking starts as `Waiting` and is moved exactly once by the item owner
/// to `Approved` or `Rejected`; both are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookingStatus {
    Waiting,
    Approved,
    Rejected,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Waiting => "WAITING",
            BookingStatus::Approved => "APPROVED",
            BookingStatus::Rejected => "REJECTED",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WAITING" => Ok(BookingStatus::Waiting),
            "APPROVED" => Ok(BookingStatus::Approved),
            "REJECTED" => Ok(BookingStatus::Rejected),
            _ => Err(format!("Invalid booking status: {}", s)),
        }
    }
}

/// Filter applied when listing bookings.
///
/// `Current`, `Past` and `Future` relate the booking interval to "now";
/// `Waiting` and `Rejected` select on status irrespective of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookingState {
    #[default]
    All,
    Current,
    Past,
    Future,
    Waiting,
    Rejected,
}

/// Booking model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Booking {
    pub id: i64,
    pub item_id: i64,
    pub booker_id: i64,
    #[serde(rename = "start")]
    pub start_date: DateTime<Utc>,
    #[serde(rename = "end")]
    pub end_date: DateTime<Utc>,
    pub status: BookingStatus,
}

/// Internal row structure for database queries (status as stored text)
#[derive(Debug, Clone, FromRow)]
pub struct BookingRow {
    id: i64,
    item_id: i64,
    booker_id: i64,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    status: String,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Booking {
            id: row.id,
            item_id: row.item_id,
            booker_id: row.booker_id,
            start_date: row.start_date,
            end_date: row.end_date,
            status: row.status.parse().unwrap_or(BookingStatus::Waiting),
        }
    }
}

/// Booking to persist; the store assigns the id on insert
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub item_id: i64,
    pub booker_id: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: BookingStatus,
}

/// Short booking representation embedded in item views
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookingShort {
    pub id: i64,
    pub booker_id: i64,
    #[serde(rename = "start")]
    pub start_date: DateTime<Utc>,
    #[serde(rename = "end")]
    pub end_date: DateTime<Utc>,
}

impl From<Booking> for BookingShort {
    fn from(booking: Booking) -> Self {
        BookingShort {
            id: booking.id,
            booker_id: booking.booker_id,
            start_date: booking.start_date,
            end_date: booking.end_date,
        }
    }
}

/// Create booking request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBooking {
    pub item_id: i64,
    #[serde(rename = "start")]
    pub start_date: DateTime<Utc>,
    #[serde(rename = "end")]
    pub end_date: DateTime<Utc>,
}

/// Booking list query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct BookingQuery {
    /// State filter, defaults to ALL
    #[serde(default)]
    pub state: BookingState,
}

/// Approval decision query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct DecideQuery {
    /// true approves the booking, false rejects it
    pub approved: bool,
}
