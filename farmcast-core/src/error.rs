//! Failure kinds absorbed by the resilience layer.
//!
//! None of these ever reach a caller of [`crate::DegradationController::fetch`];
//! they exist so that diagnostics can name the cause.

use thiserror::Error;

/// Why the device position could not be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("position unavailable")]
    PositionUnavailable,
    #[error("location request timed out")]
    Timeout,
    #[error("geolocation is not supported on this host")]
    Unsupported,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no API key configured for the weather provider")]
    MissingApiKey,

    #[error("request to weather provider failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("weather provider responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to parse weather provider response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("weather provider response is missing `{0}`")]
    MissingField(&'static str),
}
