//! Best-effort resolution of where the farm is.
//!
//! [`LocationResolver::resolve`] is total: every geolocation failure collapses
//! into the configured default location.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::{fmt::Debug, sync::Arc, time::Duration};
use tokio::time::{Instant, timeout};

use crate::{
    config::Config,
    error::{LocationError, ProviderError},
    model::{Coordinate, LocationResult, PlaceLabel, Provenance},
};

/// Device position capability.
#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn current_position(&self) -> Result<Coordinate, LocationError>;
}

/// Coordinate to place-name lookup.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync + Debug {
    async fn reverse(&self, coord: Coordinate) -> Result<PlaceLabel, ProviderError>;
}

/// Geolocator for hosts without any positioning hardware or service.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedGeolocator;

#[async_trait]
impl Geolocator for UnsupportedGeolocator {
    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        Err(LocationError::Unsupported)
    }
}

#[derive(Debug)]
pub struct LocationResolver {
    geolocator: Arc<dyn Geolocator>,
    geocoder: Arc<dyn ReverseGeocoder>,
    fallback: LocationResult,
    position_timeout: Duration,
    lookup_timeout: Duration,
    max_fix_age: Duration,
    last_fix: Mutex<Option<(Instant, Coordinate)>>,
}

impl LocationResolver {
    pub fn new(
        geolocator: Arc<dyn Geolocator>,
        geocoder: Arc<dyn ReverseGeocoder>,
        config: &Config,
    ) -> Self {
        Self {
            geolocator,
            geocoder,
            fallback: config.default_location.to_location(),
            position_timeout: config.geolocation_timeout(),
            lookup_timeout: config.request_timeout(),
            max_fix_age: config.fix_max_age(),
            last_fix: Mutex::new(None),
        }
    }

    /// The value returned whenever no device position is available.
    pub fn fallback(&self) -> &LocationResult {
        &self.fallback
    }

    /// Resolve the device position, never failing.
    pub async fn resolve(&self) -> LocationResult {
        match self.position().await {
            Ok(coord) => self.label(coord).await,
            Err(e) => {
                tracing::warn!(cause = %e, "device location unavailable, using default location");
                self.fallback.clone()
            }
        }
    }

    /// Resolve a coordinate supplied by the caller instead of the device.
    pub async fn resolve_at(&self, coord: Coordinate) -> LocationResult {
        self.label(coord).await
    }

    async fn position(&self) -> Result<Coordinate, LocationError> {
        if let Some(coord) = self.recent_fix() {
            tracing::debug!(?coord, "reusing recent position fix");
            return Ok(coord);
        }

        let coord = bounded(self.position_timeout, self.geolocator.current_position())
            .await
            .ok_or(LocationError::Timeout)??;

        if !coord.is_valid() {
            return Err(LocationError::PositionUnavailable);
        }

        *self.last_fix.lock() = Some((Instant::now(), coord));
        Ok(coord)
    }

    fn recent_fix(&self) -> Option<Coordinate> {
        let guard = self.last_fix.lock();
        guard
            .as_ref()
            .filter(|(taken, _)| taken.elapsed() <= self.max_fix_age)
            .map(|(_, coord)| *coord)
    }

    /// Attach a place name to `coord`. Provenance stays `Precise` whether or
    /// not the lookup succeeds.
    async fn label(&self, coord: Coordinate) -> LocationResult {
        let label = match bounded(self.lookup_timeout, self.geocoder.reverse(coord)).await {
            Some(Ok(label)) => label,
            Some(Err(e)) => {
                tracing::debug!(cause = %e, "reverse lookup failed, labelling by coordinate");
                PlaceLabel::from_coordinate(coord)
            }
            None => {
                tracing::debug!("reverse lookup timed out, labelling by coordinate");
                PlaceLabel::from_coordinate(coord)
            }
        };

        LocationResult { coordinate: coord, label, provenance: Provenance::Precise }
    }
}

async fn bounded<T>(limit: Duration, fut: impl Future<Output = T>) -> Option<T> {
    timeout(limit, fut).await.ok()
}
