use derive_more::Display;
use serde::{Deserialize, Serialize};
use snapname_coords::Coordinate;
use time::OffsetDateTime;

/// Where a cached city name came from.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Resolved by the reverse-geocoding service.
    #[default]
    #[display("network")]
    Network,
    /// Supplied up front, e.g. imported from a previous run or by hand.
    #[display("seed")]
    Seed,
}

/// A single resolved location. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Record", into = "Record")]
pub struct CacheEntry {
    coordinate: Coordinate,
    city: String,
    resolved_at: OffsetDateTime,
    source: Source,
}
impl CacheEntry {
    pub fn new(coordinate: Coordinate, city: impl Into<String>, source: Source) -> Self {
        Self::resolved_at(coordinate, city, source, OffsetDateTime::now_utc())
    }

    pub fn resolved_at(
        coordinate: Coordinate,
        city: impl Into<String>,
        source: Source,
        resolved_at: OffsetDateTime,
    ) -> Self {
        Self { coordinate, city: city.into(), resolved_at, source }
    }

    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn timestamp(&self) -> OffsetDateTime {
        self.resolved_at
    }
}

/// Persisted form of a [`CacheEntry`]: flat, with named fields so the file
/// stays readable and hand-editable.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Record {
    latitude: f64,
    longitude: f64,
    city: String,
    #[serde(with = "time::serde::rfc3339")]
    resolved_at: OffsetDateTime,
    #[serde(default)]
    source: Source,
}
impl From<CacheEntry> for Record {
    fn from(entry: CacheEntry) -> Self {
        Self {
            latitude: entry.coordinate.latitude(),
            longitude: entry.coordinate.longitude(),
            city: entry.city,
            resolved_at: entry.resolved_at,
            source: entry.source,
        }
    }
}
impl TryFrom<Record> for CacheEntry {
    type Error = String;

    fn try_from(record: Record) -> Result<Self, Self::Error> {
        let coordinate = Coordinate::new(record.latitude, record.longitude)
            .ok_or_else(|| format!("coordinate out of range: {}, {}", record.latitude, record.longitude))?;
        let city = record.city.trim();
        if city.is_empty() {
            return Err("empty city name".to_string());
        }
        Ok(Self::resolved_at(coordinate, city, record.source, record.resolved_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    #[test]
    fn test_serializes_with_field_names() {
        let entry = CacheEntry::resolved_at(
            Coordinate::new(38.015, 23.821).unwrap(),
            "NeoPsihiko",
            Source::Network,
            datetime!(2024-06-30 14:32:55 UTC),
        );
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({
                "latitude": 38.015,
                "longitude": 23.821,
                "city": "NeoPsihiko",
                "resolvedAt": "2024-06-30T14:32:55Z",
                "source": "network",
            })
        );
    }

    #[test]
    fn test_source_defaults_to_network() {
        let entry: CacheEntry = serde_json::from_value(json!({
            "latitude": 41.0,
            "longitude": 2.0,
            "city": "Barcelona",
            "resolvedAt": "2024-01-01T00:00:00Z",
        }))
        .unwrap();
        assert_eq!(entry.source(), Source::Network);
    }

    #[test]
    fn test_rejects_invalid_records() {
        let out_of_range = json!({"latitude": 91.0, "longitude": 0.0, "city": "Nowhere", "resolvedAt": "2024-01-01T00:00:00Z"});
        assert!(serde_json::from_value::<CacheEntry>(out_of_range).is_err());
        let blank = json!({"latitude": 1.0, "longitude": 0.0, "city": "  ", "resolvedAt": "2024-01-01T00:00:00Z"});
        assert!(serde_json::from_value::<CacheEntry>(blank).is_err());
        let missing = json!({"latitude": 1.0, "longitude": 0.0, "resolvedAt": "2024-01-01T00:00:00Z"});
        assert!(serde_json::from_value::<CacheEntry>(missing).is_err());
    }
}
