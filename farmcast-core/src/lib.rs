//! Location-aware weather resilience layer for farm advisories.
//!
//! This crate defines:
//! - Configuration (provider key, fallback location, timeouts)
//! - Location resolution with a fixed fallback
//! - The OpenWeather client and forecast normalization
//! - A degradation controller that always yields a snapshot
//! - Rule-based farming advisories
//!
//! Consumers need only two entry points: [`DegradationController::fetch`] and
//! [`advise`].

pub mod advisory;
pub mod config;
pub mod controller;
pub mod error;
pub mod location;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod synthetic;

pub use advisory::advise;
pub use config::{Config, DefaultLocation, ProviderConfig};
pub use controller::DegradationController;
pub use error::{LocationError, ProviderError};
pub use location::{Geolocator, LocationResolver, ReverseGeocoder, UnsupportedGeolocator};
pub use model::{
    Advisory, AdvisoryCategory, Coordinate, DailyForecast, LocationResult, PlaceLabel,
    Provenance, Severity, Source, WeatherSnapshot,
};
pub use normalize::normalize;
pub use provider::{OpenWeatherClient, WeatherProvider};
