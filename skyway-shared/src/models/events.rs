use serde::{Deserialize, Serialize};

/// Payload of the flight lifecycle events pushed by the flight service
/// (`new_flight_pending`, `flight_cancelled`, `flight_started`,
/// `flight_completed`, `flight_status_updated`, `flight_deleted`).
///
/// Cancelled, started and completed are broadcast to everyone when the
/// service has no flight id, so the id may be null or missing.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FlightNotification {
    #[serde(default)]
    pub flight_id: Option<i64>,
    #[serde(default)]
    pub flight_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub departure_time: Option<String>,
}

/// Payload of `rating_created`, `rating_updated` and `rating_deleted`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RatingNotification {
    #[serde(default, alias = "rating_id")]
    pub id: Option<i64>,
    pub flight_id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub rating: Option<u8>,
}

/// Sent with `join_admin_room`, `join_manager_room` and `join_user_room`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RoomJoin {
    pub user_id: i64,
    pub role: String,
}

/// Sent with `join_flight_room` and `leave_flight_room`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct FlightRoom {
    pub flight_id: i64,
}

/// Acknowledgements such as `connected` or `joined_admin_room`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SocketAck {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flight_notification_from_server_payload() {
        let json = r#"{
            "flight_id": 42,
            "flight_name": "SW-101",
            "status": "CANCELLED",
            "departure_time": "2025-06-01T10:00:00"
        }"#;
        let event: FlightNotification = serde_json::from_str(json).unwrap();
        assert_eq!(event.flight_id, Some(42));
        assert_eq!(event.flight_name.as_deref(), Some("SW-101"));
        assert_eq!(event.status.as_deref(), Some("CANCELLED"));
    }

    #[test]
    fn test_flight_deleted_payload_only_carries_id() {
        let event: FlightNotification = serde_json::from_str(r#"{"flight_id": 7}"#).unwrap();
        assert_eq!(event.flight_id, Some(7));
        assert!(event.flight_name.is_none());
    }

    #[test]
    fn test_broadcast_without_flight_id() {
        let event: FlightNotification =
            serde_json::from_str(r#"{"flight_id": null, "status": "CANCELLED"}"#).unwrap();
        assert_eq!(event.flight_id, None);
        let event: FlightNotification = serde_json::from_str(r#"{"status": "COMPLETED"}"#).unwrap();
        assert_eq!(event.flight_id, None);
    }

    #[test]
    fn test_rating_notification_accepts_rating_id_alias() {
        let event: RatingNotification =
            serde_json::from_str(r#"{"rating_id": 3, "flight_id": 9, "rating": 4}"#).unwrap();
        assert_eq!(event.id, Some(3));
        assert_eq!(event.flight_id, 9);
        assert_eq!(event.rating, Some(4));
    }
}
