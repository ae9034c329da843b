use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::reference::{self, Airline, Airport};
use crate::CoreError;

/// Flight lifecycle as reported by the backend.
///
/// PENDING → APPROVED → IN_PROGRESS → COMPLETED, with REJECTED and CANCELLED
/// as alternate terminal states. Transitions are decided server-side; the
/// client only displays the status and requests changes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum FlightStatus {
    Pending,
    Approved,
    Rejected,
    InProgress,
    Cancelled,
    Completed,
}

impl FlightStatus {
    pub const ALL: [FlightStatus; 6] = [
        FlightStatus::Pending,
        FlightStatus::Approved,
        FlightStatus::Rejected,
        FlightStatus::InProgress,
        FlightStatus::Cancelled,
        FlightStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FlightStatus::Pending => "PENDING",
            FlightStatus::Approved => "APPROVED",
            FlightStatus::Rejected => "REJECTED",
            FlightStatus::InProgress => "IN_PROGRESS",
            FlightStatus::Cancelled => "CANCELLED",
            FlightStatus::Completed => "COMPLETED",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FlightStatus::Pending => "Pending Approval",
            FlightStatus::Approved => "Approved",
            FlightStatus::Rejected => "Rejected",
            FlightStatus::InProgress => "In Progress",
            FlightStatus::Cancelled => "Cancelled",
            FlightStatus::Completed => "Completed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FlightStatus::Rejected | FlightStatus::Cancelled | FlightStatus::Completed
        )
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlightStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Some responses carry the Python enum repr, e.g. "FlightStatus.APPROVED"
        let value = s.trim().trim_start_matches("FlightStatus.");
        FlightStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| CoreError::UnknownVariant {
                kind: "flight status",
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for FlightStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Flight {
    pub flight_id: i64,
    pub flight_name: String,
    pub airline_id: i64,
    #[serde(default)]
    pub airline: Option<Airline>,
    #[serde(default)]
    pub flight_distance_km: Option<f64>,
    /// Preformatted by the backend, e.g. `"2:15:00"`.
    #[serde(default)]
    pub flight_duration: Option<String>,
    #[serde(with = "crate::time::flexible")]
    pub departure_time: DateTime<Utc>,
    #[serde(with = "crate::time::flexible")]
    pub arrival_time: DateTime<Utc>,
    pub departure_airport_id: i64,
    #[serde(default)]
    pub departure_airport: Option<Airport>,
    pub arrival_airport_id: i64,
    #[serde(default)]
    pub arrival_airport: Option<Airport>,
    #[serde(default)]
    pub created_by: Option<i64>,
    #[serde(with = "crate::decimal")]
    pub price: f64,
    pub total_seats: i64,
    #[serde(default)]
    pub available_seats: Option<i64>,
    pub status: FlightStatus,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub approved_by: Option<i64>,
    #[serde(default, with = "crate::time::flexible::option")]
    pub actual_start_time: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::time::flexible::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::time::flexible::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Flight {
    /// Only approved flights accept new bookings.
    pub fn is_bookable(&self) -> bool {
        self.status == FlightStatus::Approved && self.available_seats.map_or(true, |s| s > 0)
    }

    /// Ratings are accepted once the flight has landed.
    pub fn accepts_ratings(&self) -> bool {
        self.status == FlightStatus::Completed
    }

    /// `"BEG → LHR"`, with placeholders for missing airports.
    pub fn route_label(&self) -> String {
        format!(
            "{} → {}",
            reference::airport_code(self.departure_airport.as_ref()),
            reference::airport_code(self.arrival_airport.as_ref()),
        )
    }

    pub fn airline_label(&self) -> &str {
        reference::airline_name(self.airline.as_ref())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateFlightRequest {
    pub flight_name: String,
    pub airline_id: i64,
    pub departure_airport_id: i64,
    pub arrival_airport_id: i64,
    #[serde(with = "crate::time::flexible")]
    pub departure_time: DateTime<Utc>,
    #[serde(with = "crate::time::flexible")]
    pub arrival_time: DateTime<Utc>,
    pub price: f64,
    pub total_seats: i64,
    pub flight_distance_km: f64,
    pub flight_duration: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateFlightRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airline_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_airport_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_airport_id: Option<i64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "crate::time::flexible::option"
    )]
    pub departure_time: Option<DateTime<Utc>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "crate::time::flexible::option"
    )]
    pub arrival_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_seats: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight_distance_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight_duration: Option<i64>,
}

/// Body of `PATCH flights/{id}/status`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusChange {
    Approved,
    Rejected { rejection_reason: String },
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AvailableSeats {
    pub flight_id: i64,
    pub available_seats: i64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RemainingTime {
    pub flight_id: i64,
    #[serde(default)]
    pub remaining_seconds: Option<i64>,
    #[serde(default)]
    pub remaining_minutes: Option<i64>,
    #[serde(default, with = "crate::time::flexible::option")]
    pub arrival_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<FlightStatus>,
}
