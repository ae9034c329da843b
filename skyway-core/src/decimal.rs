//! `#[serde(with = "crate::decimal")]` for amounts the backend sends either
//! as Decimal strings (`"149.99"`) or as plain JSON numbers.

use serde::{Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
}

pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(*value)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match RawAmount::deserialize(deserializer)? {
        RawAmount::Number(value) => Ok(value),
        RawAmount::Text(raw) => raw
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid decimal amount: {:?}", raw))),
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Priced {
        #[serde(with = "crate::decimal")]
        price: f64,
    }

    fn price(json: &str) -> Result<f64, serde_json::Error> {
        serde_json::from_str::<Priced>(json).map(|p| p.price)
    }

    #[test]
    fn test_accepts_string_and_number() {
        assert_eq!(price(r#"{"price": "149.99"}"#).unwrap(), 149.99);
        assert_eq!(price(r#"{"price": " 80 "}"#).unwrap(), 80.0);
        assert_eq!(price(r#"{"price": 12.5}"#).unwrap(), 12.5);
        assert_eq!(price(r#"{"price": 7}"#).unwrap(), 7.0);
    }

    #[test]
    fn test_rejects_non_numeric_text() {
        assert!(price(r#"{"price": "cheap"}"#).is_err());
    }
}
