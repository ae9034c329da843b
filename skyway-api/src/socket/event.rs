use serde::de::DeserializeOwned;
use serde_json::Value;
use skyway_shared::models::{FlightNotification, RatingNotification, SocketAck};
use tracing::warn;

/// Events pushed by the flight service.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    Connected(SocketAck),
    NewFlightPending(FlightNotification),
    FlightCancelled(FlightNotification),
    FlightStarted(FlightNotification),
    FlightCompleted(FlightNotification),
    FlightStatusUpdated(FlightNotification),
    FlightDeleted(FlightNotification),
    RatingCreated(RatingNotification),
    RatingUpdated(RatingNotification),
    RatingDeleted(RatingNotification),
    /// `joined_<room>` acknowledgements, e.g. `joined_admin_room`.
    Joined { room: String, ack: SocketAck },
    /// `left_<room>` acknowledgements.
    Left { room: String, ack: SocketAck },
    Other { name: String, data: Value },
}

impl ServerEvent {
    /// Payloads that don't match the expected shape come back as `Other`.
    pub fn from_wire(name: &str, data: Value) -> Self {
        let decoded = match name {
            "connected" => decode(&data).map(ServerEvent::Connected),
            "new_flight_pending" => decode(&data).map(ServerEvent::NewFlightPending),
            "flight_cancelled" => decode(&data).map(ServerEvent::FlightCancelled),
            "flight_started" => decode(&data).map(ServerEvent::FlightStarted),
            "flight_completed" => decode(&data).map(ServerEvent::FlightCompleted),
            "flight_status_updated" => decode(&data).map(ServerEvent::FlightStatusUpdated),
            "flight_deleted" => decode(&data).map(ServerEvent::FlightDeleted),
            "rating_created" => decode(&data).map(ServerEvent::RatingCreated),
            "rating_updated" => decode(&data).map(ServerEvent::RatingUpdated),
            "rating_deleted" => decode(&data).map(ServerEvent::RatingDeleted),
            _ => {
                if let Some(room) = name.strip_prefix("joined_") {
                    decode(&data).map(|ack| ServerEvent::Joined { room: room.to_string(), ack })
                } else if let Some(room) = name.strip_prefix("left_") {
                    decode(&data).map(|ack| ServerEvent::Left { room: room.to_string(), ack })
                } else {
                    None
                }
            }
        };

        decoded.unwrap_or_else(|| ServerEvent::Other {
            name: name.to_string(),
            data,
        })
    }

    pub fn name(&self) -> &str {
        match self {
            ServerEvent::Connected(_) => "connected",
            ServerEvent::NewFlightPending(_) => "new_flight_pending",
            ServerEvent::FlightCancelled(_) => "flight_cancelled",
            ServerEvent::FlightStarted(_) => "flight_started",
            ServerEvent::FlightCompleted(_) => "flight_completed",
            ServerEvent::FlightStatusUpdated(_) => "flight_status_updated",
            ServerEvent::FlightDeleted(_) => "flight_deleted",
            ServerEvent::RatingCreated(_) => "rating_created",
            ServerEvent::RatingUpdated(_) => "rating_updated",
            ServerEvent::RatingDeleted(_) => "rating_deleted",
            ServerEvent::Joined { .. } => "joined",
            ServerEvent::Left { .. } => "left",
            ServerEvent::Other { name, .. } => name,
        }
    }

    pub fn flight_id(&self) -> Option<i64> {
        match self {
            ServerEvent::NewFlightPending(n)
            | ServerEvent::FlightCancelled(n)
            | ServerEvent::FlightStarted(n)
            | ServerEvent::FlightCompleted(n)
            | ServerEvent::FlightStatusUpdated(n)
            | ServerEvent::FlightDeleted(n) => n.flight_id,
            ServerEvent::RatingCreated(n)
            | ServerEvent::RatingUpdated(n)
            | ServerEvent::RatingDeleted(n) => Some(n.flight_id),
            _ => None,
        }
    }
}

fn decode<T: DeserializeOwned>(data: &Value) -> Option<T> {
    match serde_json::from_value(data.clone()) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Unexpected socket payload {}: {}", data, e);
            None
        }
    }
}
