use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    config::Config,
    error::ProviderError,
    model::{Coordinate, RawCurrent, RawWeatherSample},
};

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// Upstream weather source.
///
/// Each call is a single request with no retries; the caller decides what a
/// failure means.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// False when the provider cannot possibly succeed (e.g. no API key), so
    /// callers can skip network access entirely.
    fn is_configured(&self) -> bool {
        true
    }

    async fn fetch_current(&self, coord: Coordinate) -> Result<RawCurrent, ProviderError>;

    async fn fetch_forecast_samples(
        &self,
        coord: Coordinate,
    ) -> Result<Vec<RawWeatherSample>, ProviderError>;
}

/// Construct the OpenWeather client described by `config`.
pub fn provider_from_config(config: &Config) -> Result<OpenWeatherClient, ProviderError> {
    OpenWeatherClient::new(
        config.api_key().map(str::to_owned),
        &config.provider.base_url,
        config.request_timeout(),
    )
}
