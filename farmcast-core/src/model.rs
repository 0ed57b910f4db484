use chrono::{DateTime, FixedOffset, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Best-effort human-readable name for a coordinate. Never authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceLabel {
    pub city: String,
    pub country: String,
}

impl PlaceLabel {
    pub fn new(city: impl Into<String>, country: impl Into<String>) -> Self {
        Self { city: city.into(), country: country.into() }
    }

    /// Label used when reverse lookup fails: the coordinate itself.
    pub fn from_coordinate(coord: Coordinate) -> Self {
        Self {
            city: format!("{:.4}, {:.4}", coord.latitude, coord.longitude),
            country: String::new(),
        }
    }
}

impl std::fmt::Display for PlaceLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.country.is_empty() {
            f.write_str(&self.city)
        } else {
            write!(f, "{}, {}", self.city, self.country)
        }
    }
}

/// How a coordinate was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Provenance {
    /// Device fix or caller-supplied coordinate, whatever the label source.
    Precise,
    /// Coordinate derived from a place-name lookup rather than measured.
    ReverseGeocoded,
    DefaultFallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationResult {
    pub coordinate: Coordinate,
    pub label: PlaceLabel,
    pub provenance: Provenance,
}

/// Current conditions as reported by the provider, already unit-normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCurrent {
    pub temperature: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub description: String,
    pub icon: String,
}

/// One sub-daily forecast entry, stamped in the location's local offset.
#[derive(Debug, Clone, PartialEq)]
pub struct RawWeatherSample {
    pub timestamp: DateTime<FixedOffset>,
    pub temperature: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub precipitation_pct: u8,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub high: f64,
    pub low: f64,
    pub description: String,
    pub icon: String,
    pub precipitation_pct: u8,
}

/// Where the data in a snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Source {
    Live,
    Cached,
    Synthetic,
}

/// The only weather object handed to callers.
///
/// Temperatures are whole degrees Celsius, `humidity` is a percentage and
/// `wind_speed` is km/h.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: LocationResult,
    pub temperature: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub description: String,
    pub icon: String,
    pub forecast: Vec<DailyForecast>,
    pub last_updated: DateTime<Utc>,
    pub source: Source,
}

impl WeatherSnapshot {
    /// Time elapsed since the data was produced, clamped at zero.
    pub fn age(&self, now: DateTime<Utc>) -> TimeDelta {
        (now - self.last_updated).max(TimeDelta::zero())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdvisoryCategory {
    Temperature,
    Humidity,
    Wind,
    Rain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Info,
    Warn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisory {
    pub category: AdvisoryCategory,
    pub message: String,
    pub severity: Severity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_label_formats_coordinate() {
        let label = PlaceLabel::from_coordinate(Coordinate::new(28.613_912, 77.209_01));
        assert_eq!(label.city, "28.6139, 77.2090");
        assert!(label.country.is_empty());
        assert_eq!(label.to_string(), "28.6139, 77.2090");
    }

    #[test]
    fn label_display_includes_country() {
        assert_eq!(PlaceLabel::new("Pune", "IN").to_string(), "Pune, IN");
    }

    #[test]
    fn coordinate_validity() {
        assert!(Coordinate::new(0.0, 0.0).is_valid());
        assert!(!Coordinate::new(91.0, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, -180.5).is_valid());
    }

    #[test]
    fn source_serializes_as_screaming_tag() {
        let json = serde_json::to_string(&Source::Synthetic).unwrap();
        assert_eq!(json, "\"SYNTHETIC\"");
        let json = serde_json::to_string(&Provenance::DefaultFallback).unwrap();
        assert_eq!(json, "\"DEFAULT_FALLBACK\"");
    }

    #[test]
    fn snapshot_age_never_negative() {
        let now = Utc::now();
        let snapshot = WeatherSnapshot {
            location: LocationResult {
                coordinate: Coordinate::new(1.0, 2.0),
                label: PlaceLabel::new("A", "B"),
                provenance: Provenance::Precise,
            },
            temperature: 20.0,
            humidity: 50,
            wind_speed: 3.0,
            description: "clear sky".into(),
            icon: "01d".into(),
            forecast: Vec::new(),
            last_updated: now + TimeDelta::seconds(5),
            source: Source::Live,
        };
        assert_eq!(snapshot.age(now), TimeDelta::zero());
        assert_eq!(snapshot.age(now + TimeDelta::minutes(2)), TimeDelta::seconds(115));
    }
}
