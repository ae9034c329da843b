use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::flight::{Flight, FlightStatus};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    #[serde(alias = "id")]
    pub booking_id: i64,
    pub user_id: i64,
    pub flight_id: i64,
    #[serde(default)]
    pub flight: Option<Flight>,
    #[serde(default, with = "crate::time::flexible::option")]
    pub purchased_at: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::time::flexible::option")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Booking {
    /// Cancellation is only offered while the flight has not been flown or
    /// called off yet.
    pub fn is_cancellable(&self) -> bool {
        self.flight
            .as_ref()
            .is_some_and(|f| matches!(f.status, FlightStatus::Pending | FlightStatus::Approved))
    }

    pub fn category(&self) -> Option<BookingCategory> {
        self.flight.as_ref().and_then(|f| BookingCategory::from_status(f.status))
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CreateBookingRequest {
    pub flight_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookingList {
    pub bookings: Vec<Booking>,
}

/// Sections of the "my bookings" view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BookingCategory {
    Upcoming,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingCategory {
    pub fn from_status(status: FlightStatus) -> Option<Self> {
        match status {
            FlightStatus::Approved => Some(BookingCategory::Upcoming),
            FlightStatus::InProgress => Some(BookingCategory::InProgress),
            FlightStatus::Completed => Some(BookingCategory::Completed),
            FlightStatus::Cancelled => Some(BookingCategory::Cancelled),
            FlightStatus::Pending | FlightStatus::Rejected => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            BookingCategory::Upcoming => "Upcoming Flights",
            BookingCategory::InProgress => "In Progress",
            BookingCategory::Completed => "Completed",
            BookingCategory::Cancelled => "Cancelled",
        }
    }
}

/// Bookings grouped per section, preserving the server order inside each.
/// Bookings without an embedded flight, or on pending/rejected flights, are
/// left out.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CategorizedBookings {
    pub upcoming: Vec<Booking>,
    pub in_progress: Vec<Booking>,
    pub completed: Vec<Booking>,
    pub cancelled: Vec<Booking>,
}

impl CategorizedBookings {
    pub fn from_bookings(bookings: impl IntoIterator<Item = Booking>) -> Self {
        let mut out = Self::default();
        for booking in bookings {
            match booking.category() {
                Some(BookingCategory::Upcoming) => out.upcoming.push(booking),
                Some(BookingCategory::InProgress) => out.in_progress.push(booking),
                Some(BookingCategory::Completed) => out.completed.push(booking),
                Some(BookingCategory::Cancelled) => out.cancelled.push(booking),
                None => {}
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.upcoming.is_empty()
            && self.in_progress.is_empty()
            && self.completed.is_empty()
            && self.cancelled.is_empty()
    }
}
