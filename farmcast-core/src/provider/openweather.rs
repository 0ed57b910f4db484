use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;

use crate::{
    error::ProviderError,
    location::ReverseGeocoder,
    model::{Coordinate, PlaceLabel, RawCurrent, RawWeatherSample},
};

use super::WeatherProvider;

const CURRENT_PATH: &str = "/data/2.5/weather";
const FORECAST_PATH: &str = "/data/2.5/forecast";
const REVERSE_PATH: &str = "/geo/1.0/reverse";

/// OpenWeather 2.5 client. Current conditions, 3-hourly forecast and reverse
/// geocoding all share one key and one HTTP client.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: Option<String>,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(
        api_key: Option<String>,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        coord: Coordinate,
        extra: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::MissingApiKey)?;
        let url = format!("{}{}", self.base_url, path);
        let lat = coord.latitude.to_string();
        let lon = coord.longitude.to_string();

        let res = self
            .http
            .get(&url)
            .query(&[("lat", lat.as_str()), ("lon", lon.as_str()), ("appid", api_key)])
            .query(extra)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    /// Shift in seconds from UTC.
    #[serde(default)]
    timezone: i32,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    pop: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwGeoEntry {
    name: String,
    country: String,
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_current(&self, coord: Coordinate) -> Result<RawCurrent, ProviderError> {
        let parsed: OwCurrentResponse =
            self.get_json(CURRENT_PATH, coord, &[("units", "metric")]).await?;

        let condition =
            parsed.weather.into_iter().next().ok_or(ProviderError::MissingField("weather"))?;

        Ok(RawCurrent {
            temperature: parsed.main.temp.round(),
            humidity: parsed.main.humidity,
            wind_speed: mps_to_kmh(parsed.wind.speed),
            description: condition.description,
            icon: condition.icon,
        })
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_forecast_samples(
        &self,
        coord: Coordinate,
    ) -> Result<Vec<RawWeatherSample>, ProviderError> {
        let parsed: OwForecastResponse =
            self.get_json(FORECAST_PATH, coord, &[("units", "metric")]).await?;

        let offset = FixedOffset::east_opt(parsed.city.timezone)
            .ok_or(ProviderError::MissingField("city.timezone"))?;

        let samples = parsed
            .list
            .into_iter()
            .map(|entry| {
                let timestamp = DateTime::from_timestamp(entry.dt, 0)
                    .ok_or(ProviderError::MissingField("list.dt"))?
                    .with_timezone(&offset);
                let condition = entry
                    .weather
                    .into_iter()
                    .next()
                    .ok_or(ProviderError::MissingField("list.weather"))?;

                Ok(RawWeatherSample {
                    timestamp,
                    temperature: entry.main.temp.round(),
                    humidity: entry.main.humidity,
                    wind_speed: mps_to_kmh(entry.wind.speed),
                    precipitation_pct: pop_to_pct(entry.pop),
                    description: condition.description,
                    icon: condition.icon,
                })
            })
            .collect::<Result<Vec<_>, ProviderError>>()?;

        tracing::debug!(count = samples.len(), "parsed forecast samples");
        Ok(samples)
    }
}

#[async_trait]
impl ReverseGeocoder for OpenWeatherClient {
    #[tracing::instrument(skip(self))]
    async fn reverse(&self, coord: Coordinate) -> Result<PlaceLabel, ProviderError> {
        let entries: Vec<OwGeoEntry> =
            self.get_json(REVERSE_PATH, coord, &[("limit", "1")]).await?;

        let first = entries.into_iter().next().ok_or(ProviderError::MissingField("name"))?;
        Ok(PlaceLabel::new(first.name, first.country))
    }
}

fn mps_to_kmh(speed: f64) -> f64 {
    (speed * 3.6 * 10.0).round() / 10.0
}

fn pop_to_pct(pop: f64) -> u8 {
    (pop * 100.0).round().clamp(0.0, 100.0) as u8
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
