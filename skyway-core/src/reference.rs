use serde::{Deserialize, Serialize};

/// Placeholder shown when a relation is missing from a response.
pub const UNKNOWN: &str = "Unknown";
/// Placeholder shown when an airport code is missing.
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Airline {
    #[serde(alias = "airline_id")]
    pub id: i64,
    #[serde(default, alias = "airline_name")]
    pub name: Option<String>,
    #[serde(default, alias = "airline_code")]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Airport {
    #[serde(alias = "id")]
    pub airport_id: i64,
    #[serde(default, alias = "name")]
    pub airport_name: Option<String>,
    #[serde(default, alias = "code")]
    pub airport_code: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AirlineList {
    pub airlines: Vec<Airline>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AirportList {
    pub airports: Vec<Airport>,
}

pub fn airline_name(airline: Option<&Airline>) -> &str {
    airline.and_then(|a| a.name.as_deref()).unwrap_or(UNKNOWN)
}

pub fn airport_code(airport: Option<&Airport>) -> &str {
    airport
        .and_then(|a| a.airport_code.as_deref())
        .unwrap_or(NOT_AVAILABLE)
}

pub fn airport_name(airport: Option<&Airport>) -> &str {
    airport
        .and_then(|a| a.airport_name.as_deref())
        .unwrap_or(UNKNOWN)
}

pub fn airport_city(airport: Option<&Airport>) -> &str {
    airport.and_then(|a| a.city.as_deref()).unwrap_or(UNKNOWN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_airport_accepts_short_field_names() {
        let airport: Airport =
            serde_json::from_str(r#"{"id": 1, "code": "BEG", "name": "Nikola Tesla"}"#).unwrap();
        assert_eq!(airport.airport_id, 1);
        assert_eq!(airport_code(Some(&airport)), "BEG");
        assert_eq!(airport_name(Some(&airport)), "Nikola Tesla");
        assert_eq!(airport_city(Some(&airport)), UNKNOWN);
    }

    #[test]
    fn test_missing_relations_fall_back_to_placeholders() {
        assert_eq!(airline_name(None), "Unknown");
        assert_eq!(airport_code(None), "N/A");
        assert_eq!(airport_name(None), "Unknown");
    }
}
