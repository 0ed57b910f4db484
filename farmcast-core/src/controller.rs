//! Orchestration of location, provider and normalizer with graceful fallback.
//!
//! A fetch walks `RESOLVING_LOCATION -> FETCHING_LIVE -> NORMALIZING -> LIVE`
//! and may stop early at `CACHED` or `SYNTHETIC`. [`DegradationController::fetch`]
//! always yields a snapshot.

use chrono::{TimeDelta, Utc};
use parking_lot::RwLock;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use crate::{
    config::Config,
    error::ProviderError,
    location::{Geolocator, LocationResolver},
    model::{Coordinate, DailyForecast, LocationResult, RawCurrent, Source, WeatherSnapshot},
    normalize::normalize,
    provider::{WeatherProvider, provider_from_config},
    synthetic,
};

/// Last LIVE snapshot and the sequence number of the fetch that produced it.
#[derive(Debug, Clone)]
struct CacheEntry {
    seq: u64,
    snapshot: WeatherSnapshot,
}

#[derive(Debug)]
pub struct DegradationController {
    resolver: LocationResolver,
    provider: Arc<dyn WeatherProvider>,
    horizon: usize,
    cache: RwLock<Option<CacheEntry>>,
    sequence: AtomicU64,
}

impl DegradationController {
    pub fn new(
        resolver: LocationResolver,
        provider: Arc<dyn WeatherProvider>,
        horizon: usize,
    ) -> Self {
        Self { resolver, provider, horizon, cache: RwLock::new(None), sequence: AtomicU64::new(0) }
    }

    /// Wire the OpenWeather client as both weather provider and reverse geocoder.
    pub fn from_config(
        config: &Config,
        geolocator: Arc<dyn Geolocator>,
    ) -> Result<Self, ProviderError> {
        let client = Arc::new(provider_from_config(config)?);
        let resolver = LocationResolver::new(geolocator, client.clone(), config);
        Ok(Self::new(resolver, client, config.forecast_horizon_days))
    }

    /// Fetch weather for `coord`, or for the device position when `None`.
    ///
    /// Never fails: provider trouble degrades to the last LIVE snapshot
    /// (tagged `Cached`, original `last_updated`) or to the synthetic baseline.
    pub async fn fetch(&self, coord: Option<Coordinate>) -> WeatherSnapshot {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;

        tracing::debug!(seq, stage = "RESOLVING_LOCATION", "fetch started");
        let location = match coord {
            Some(coord) => self.resolver.resolve_at(coord).await,
            None => self.resolver.resolve().await,
        };

        if !self.provider.is_configured() {
            tracing::info!(seq, "no provider API key configured, serving synthetic weather");
            return synthetic::snapshot(location, Utc::now(), self.horizon);
        }

        tracing::debug!(seq, stage = "FETCHING_LIVE", coord = ?location.coordinate, "requesting");
        let coordinate = location.coordinate;
        let fetched = tokio::try_join!(
            self.provider.fetch_current(coordinate),
            self.provider.fetch_forecast_samples(coordinate),
        );

        match fetched {
            Ok((current, samples)) => {
                tracing::debug!(seq, stage = "NORMALIZING", samples = samples.len(), "grouping");
                let forecast = normalize(&samples, self.horizon);
                let snapshot = self.commit(seq, location, current, forecast);
                tracing::info!(seq, place = %snapshot.location.label, "serving live weather");
                snapshot
            }
            Err(e) => {
                tracing::warn!(seq, cause = %e, "live weather unavailable");
                self.degrade(location)
            }
        }
    }

    /// The most recent LIVE snapshot, if any fetch has succeeded.
    pub fn cached(&self) -> Option<WeatherSnapshot> {
        self.cache.read().as_ref().map(|entry| entry.snapshot.clone())
    }

    fn degrade(&self, location: LocationResult) -> WeatherSnapshot {
        match self.cached() {
            Some(mut snapshot) => {
                tracing::info!(last_updated = %snapshot.last_updated, "serving cached weather");
                snapshot.source = Source::Cached;
                snapshot
            }
            None => {
                tracing::info!("no cached weather yet, serving synthetic weather");
                synthetic::snapshot(location, Utc::now(), self.horizon)
            }
        }
    }

    /// Build the LIVE snapshot and store it unless a later fetch already did.
    fn commit(
        &self,
        seq: u64,
        location: LocationResult,
        current: RawCurrent,
        forecast: Vec<DailyForecast>,
    ) -> WeatherSnapshot {
        let mut slot = self.cache.write();

        let now = Utc::now();
        let last_updated = match slot.as_ref() {
            Some(prev) if prev.snapshot.last_updated >= now => {
                prev.snapshot.last_updated + TimeDelta::microseconds(1)
            }
            _ => now,
        };

        let snapshot = WeatherSnapshot {
            location,
            temperature: current.temperature,
            humidity: current.humidity,
            wind_speed: current.wind_speed,
            description: current.description,
            icon: current.icon,
            forecast,
            last_updated,
            source: Source::Live,
        };

        match slot.as_ref() {
            Some(prev) if prev.seq > seq => {
                tracing::debug!(seq, newer = prev.seq, "newer fetch already cached, not replacing");
            }
            _ => *slot = Some(CacheEntry { seq, snapshot: snapshot.clone() }),
        }

        snapshot
    }
}
