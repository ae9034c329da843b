use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::flight::FlightStatus;
use crate::CoreError;

/// Filter and pagination parameters for `GET flights` and
/// `GET flights/tabs/{tab}`. Parameters are passed through verbatim; unset
/// ones are left off the query string.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlightQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<FlightStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airline_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_airport_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_airport_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_date: Option<NaiveDate>,
}

impl FlightQuery {
    pub fn page(page: u32, per_page: u32) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: FlightStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Server-side flight groupings behind `flights/tabs/{tab}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlightTab {
    Upcoming,
    InProgress,
    Completed,
}

impl FlightTab {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlightTab::Upcoming => "upcoming",
            FlightTab::InProgress => "in-progress",
            FlightTab::Completed => "completed",
        }
    }

    /// Booking is only offered from the upcoming tab.
    pub fn allows_booking(&self) -> bool {
        *self == FlightTab::Upcoming
    }
}

impl fmt::Display for FlightTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlightTab {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(FlightTab::Upcoming),
            "in-progress" | "in_progress" => Ok(FlightTab::InProgress),
            "completed" => Ok(FlightTab::Completed),
            _ => Err(CoreError::UnknownVariant { kind: "flight tab", value: s.to_string() }),
        }
    }
}

/// Paginated list envelope. The item key differs per resource
/// (`flights`, `ratings`, `bookings`, `users`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Page<T> {
    #[serde(
        default = "Vec::new",
        alias = "flights",
        alias = "ratings",
        alias = "bookings",
        alias = "users"
    )]
    pub items: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub pages: u32,
    #[serde(default)]
    pub tab: Option<String>,
}

fn first_page() -> u32 {
    1
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Keep the pagination metadata, narrow the items.
    pub fn retain(mut self, keep: impl FnMut(&T) -> bool) -> Self {
        self.items.retain(keep);
        self
    }
}
