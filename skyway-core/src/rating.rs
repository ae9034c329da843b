use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rating {
    #[serde(alias = "rating_id")]
    pub id: i64,
    pub user_id: i64,
    pub flight_id: i64,
    pub rating: u8,
    #[serde(default, with = "crate::time::flexible::option")]
    pub created_at: Option<DateTime<Utc>>,
    /// Present on the administrator listing only.
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub flight_name: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CreateRatingRequest {
    pub flight_id: i64,
    pub rating: u8,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct UpdateRatingRequest {
    pub rating: u8,
}

/// `"★★★☆☆"`
pub fn stars(score: u8) -> String {
    let filled = score.min(MAX_SCORE) as usize;
    let empty = MAX_SCORE as usize - filled;
    format!("{}{}", "★".repeat(filled), "☆".repeat(empty))
}
