//! Fixed baseline weather used when no live or cached data exists.
//!
//! Values never vary between calls so offline demos and tests are repeatable;
//! only the dates follow the calendar.

use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::model::{DailyForecast, LocationResult, Source, WeatherSnapshot};

pub const CURRENT_TEMPERATURE: f64 = 28.0;
pub const CURRENT_HUMIDITY: u8 = 65;
pub const CURRENT_WIND_SPEED: f64 = 12.0;
pub const CURRENT_DESCRIPTION: &str = "sunny";
pub const CURRENT_ICON: &str = "01d";

struct BaselineDay {
    high: f64,
    low: f64,
    description: &'static str,
    icon: &'static str,
    precipitation_pct: u8,
}

const BASELINE: [BaselineDay; 5] = [
    BaselineDay {
        high: 30.0,
        low: 22.0,
        description: "sunny",
        icon: "01d",
        precipitation_pct: 10,
    },
    BaselineDay {
        high: 31.0,
        low: 23.0,
        description: "partly cloudy",
        icon: "02d",
        precipitation_pct: 20,
    },
    BaselineDay {
        high: 28.0,
        low: 21.0,
        description: "light rain",
        icon: "10d",
        precipitation_pct: 60,
    },
    BaselineDay {
        high: 27.0,
        low: 20.0,
        description: "overcast",
        icon: "04d",
        precipitation_pct: 40,
    },
    BaselineDay {
        high: 29.0,
        low: 21.0,
        description: "sunny",
        icon: "01d",
        precipitation_pct: 5,
    },
];

/// Baseline daily forecast starting at `today`, at most `horizon` days.
pub fn forecast(today: NaiveDate, horizon: usize) -> Vec<DailyForecast> {
    BASELINE
        .iter()
        .take(horizon)
        .enumerate()
        .filter_map(|(offset, day)| {
            Some(DailyForecast {
                date: today.checked_add_days(Days::new(offset as u64))?,
                high: day.high,
                low: day.low,
                description: day.description.to_string(),
                icon: day.icon.to_string(),
                precipitation_pct: day.precipitation_pct,
            })
        })
        .collect()
}

/// Baseline snapshot for `location`, stamped `now`.
pub fn snapshot(location: LocationResult, now: DateTime<Utc>, horizon: usize) -> WeatherSnapshot {
    WeatherSnapshot {
        location,
        temperature: CURRENT_TEMPERATURE,
        humidity: CURRENT_HUMIDITY,
        wind_speed: CURRENT_WIND_SPEED,
        description: CURRENT_DESCRIPTION.to_string(),
        icon: CURRENT_ICON.to_string(),
        forecast: forecast(now.date_naive(), horizon),
        last_updated: now,
        source: Source::Synthetic,
    }
}
