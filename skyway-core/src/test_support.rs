use crate::flight::{Flight, FlightStatus};

pub fn flight_json(status: &str) -> String {
    format!(
        r#"{{
            "flight_id": 11,
            "flight_name": "SW-200",
            "airline_id": 2,
            "airline": {{"id": 2, "name": "Skyway Air"}},
            "departure_time": "2025-07-01T08:00:00",
            "arrival_time": "2025-07-01T10:15:00",
            "departure_airport_id": 1,
            "departure_airport": {{"airport_id": 1, "airport_code": "BEG"}},
            "arrival_airport_id": 3,
            "price": 149.99,
            "total_seats": 180,
            "available_seats": 12,
            "status": "{}"
        }}"#,
        status
    )
}

pub fn flight(status: FlightStatus) -> Flight {
    serde_json::from_str(&flight_json(status.as_str())).expect("fixture flight")
}

/// A flight exactly as the flight service serializes it: Decimal price as a
/// string, preformatted duration, trimmed airport relations.
pub fn backend_flight_json() -> &'static str {
    r#"{
        "flight_id": 21,
        "flight_name": "SW-310",
        "airline_id": 2,
        "airline": {"id": 2, "name": "Skyway Air"},
        "flight_distance_km": 1700,
        "flight_duration": "2:15:00",
        "departure_time": "2025-07-01T08:00:00",
        "arrival_time": "2025-07-01T10:15:00",
        "departure_airport_id": 1,
        "departure_airport": {"id": 1, "name": "Nikola Tesla", "code": "BEG"},
        "arrival_airport_id": 3,
        "arrival_airport": {"id": 3, "name": "Heathrow", "code": "LHR"},
        "created_by": 4,
        "price": "149.99",
        "total_seats": 180,
        "available_seats": 12,
        "status": "APPROVED",
        "rejection_reason": null,
        "created_at": "2025-05-20T09:12:44.123456",
        "updated_at": "2025-05-21T11:00:00.000000"
    }"#
}
