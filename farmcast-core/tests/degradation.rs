//! End-to-end degradation scenarios against a mock OpenWeather server.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use farmcast_core::{
    Config, Coordinate, DegradationController, Geolocator, LocationError, Provenance, Source,
    UnsupportedGeolocator, advise,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FARM: Coordinate = Coordinate { latitude: 21.15, longitude: 79.09 };

#[derive(Debug)]
struct DeviceAt(Result<Coordinate, LocationError>);

#[async_trait]
impl Geolocator for DeviceAt {
    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        self.0
    }
}

fn config(server: &MockServer, key: Option<&str>) -> Config {
    let mut cfg = Config::default();
    cfg.provider.base_url = server.uri();
    cfg.provider.api_key = key.map(str::to_owned);
    cfg.request_timeout_ms = 500;
    cfg
}

fn current_body(temp: f64) -> serde_json::Value {
    serde_json::json!({
        "name": "Nagpur",
        "main": { "temp": temp, "humidity": 40 },
        "weather": [{ "description": "clear sky", "icon": "01d" }],
        "wind": { "speed": 3.0 }
    })
}

/// Three-hourly forecast covering six UTC days from 2024-05-01.
fn forecast_body() -> serde_json::Value {
    let start = 1_714_521_600_i64;
    let list: Vec<_> = (0..48)
        .map(|i| {
            let temp = 25.0 + (i % 8) as f64;
            let pop = if i == 8 { 0.7 } else { 0.1 };
            serde_json::json!({
                "dt": start + i * 3 * 3600,
                "main": { "temp": temp, "humidity": 50 },
                "weather": [{ "description": format!("step {i}"), "icon": "02d" }],
                "wind": { "speed": 4.0 },
                "pop": pop
            })
        })
        .collect();

    serde_json::json!({
        "city": { "name": "Nagpur", "country": "IN", "timezone": 0 },
        "list": list
    })
}

/// Well-formed forecast except that one entry lacks `pop`.
fn forecast_body_missing_pop() -> serde_json::Value {
    let mut body = forecast_body();
    if let Some(entry) = body["list"][3].as_object_mut() {
        entry.remove("pop");
    }
    body
}

async fn mount_live(server: &MockServer, temp: f64) {
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body(temp)))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/reverse"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([{ "name": "Nagpur", "country": "IN" }])),
        )
        .mount(server)
        .await;
}

async fn mount_responses(
    server: &MockServer,
    current: ResponseTemplate,
    forecast: ResponseTemplate,
) {
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(current)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(forecast)
        .mount(server)
        .await;
}

async fn mount_failing_current(server: &MockServer, response: ResponseTemplate) {
    let forecast = ResponseTemplate::new(200).set_body_json(forecast_body());
    mount_responses(server, response, forecast).await;
}

async fn mount_partial_forecast(server: &MockServer) {
    let current = ResponseTemplate::new(200).set_body_json(current_body(24.0));
    let forecast = ResponseTemplate::new(200).set_body_json(forecast_body_missing_pop());
    mount_responses(server, current, forecast).await;
}

fn controller(cfg: &Config, geolocator: Arc<dyn Geolocator>) -> DegradationController {
    DegradationController::from_config(cfg, geolocator).expect("client should build")
}

#[tokio::test]
async fn missing_api_key_serves_baseline_dataset() {
    let server = MockServer::start().await;
    let controller = controller(&config(&server, None), Arc::new(UnsupportedGeolocator));

    let snapshot = controller.fetch(None).await;

    assert_eq!(snapshot.source, Source::Synthetic);
    assert_eq!(snapshot.forecast.len(), 5);
    assert_eq!(snapshot.forecast[0].high, 30.0);
    assert_eq!(snapshot.forecast[0].low, 22.0);
    assert_eq!(snapshot.forecast[0].description, "sunny");
    assert_eq!(snapshot.location.provenance, Provenance::DefaultFallback);
    assert_eq!(snapshot.location.label.city, "New Delhi");
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn live_fetch_uses_device_position_and_label() {
    let server = MockServer::start().await;
    mount_live(&server, 33.4).await;
    let controller = controller(&config(&server, Some("KEY")), Arc::new(DeviceAt(Ok(FARM))));

    let snapshot = controller.fetch(None).await;

    assert_eq!(snapshot.source, Source::Live);
    assert_eq!(snapshot.temperature, 33.0);
    assert_eq!(snapshot.wind_speed, 10.8);
    assert_eq!(snapshot.location.coordinate, FARM);
    assert_eq!(snapshot.location.label.city, "Nagpur");
    assert_eq!(snapshot.location.provenance, Provenance::Precise);
    assert_eq!(snapshot.forecast.len(), 5);
    assert_eq!(snapshot.forecast[0].high, 32.0);
    assert_eq!(snapshot.forecast[0].low, 25.0);
    assert_eq!(snapshot.forecast[0].description, "step 0");
    assert_eq!(snapshot.forecast[1].precipitation_pct, 70);
}

#[tokio::test]
async fn provider_failure_after_success_serves_cached_snapshot() {
    let server = MockServer::start().await;
    mount_live(&server, 30.0).await;
    let controller = controller(&config(&server, Some("KEY")), Arc::new(UnsupportedGeolocator));

    let live = controller.fetch(None).await;
    assert_eq!(live.source, Source::Live);

    server.reset().await;
    mount_failing_current(&server, ResponseTemplate::new(500)).await;

    let degraded = controller.fetch(None).await;
    assert_eq!(degraded.source, Source::Cached);
    assert_eq!(degraded.last_updated, live.last_updated);
    assert_eq!(degraded.forecast, live.forecast);
    assert_eq!(degraded.temperature, live.temperature);
    assert_eq!(degraded.location, live.location);
}

#[tokio::test]
async fn partial_forecast_after_success_serves_cached_snapshot() {
    let server = MockServer::start().await;
    mount_live(&server, 30.0).await;
    let controller = controller(&config(&server, Some("KEY")), Arc::new(UnsupportedGeolocator));

    let live = controller.fetch(None).await;
    assert_eq!(live.source, Source::Live);

    server.reset().await;
    mount_partial_forecast(&server).await;

    let degraded = controller.fetch(None).await;
    assert_eq!(degraded.source, Source::Cached);
    assert_eq!(degraded.temperature, live.temperature);
    assert_eq!(degraded.last_updated, live.last_updated);
    assert_eq!(degraded.forecast, live.forecast);
}

#[tokio::test]
async fn partial_forecast_without_history_is_synthetic() {
    let server = MockServer::start().await;
    mount_partial_forecast(&server).await;
    let controller = controller(&config(&server, Some("KEY")), Arc::new(UnsupportedGeolocator));

    let snapshot = controller.fetch(None).await;

    assert_eq!(snapshot.source, Source::Synthetic);
    assert_eq!(snapshot.temperature, 28.0);
    assert_eq!(snapshot.forecast[0].high, 30.0);
    assert!(controller.cached().is_none());
}

#[tokio::test]
async fn consecutive_successes_advance_last_updated() {
    let server = MockServer::start().await;
    mount_live(&server, 30.0).await;
    let controller = controller(&config(&server, Some("KEY")), Arc::new(UnsupportedGeolocator));

    let first = controller.fetch(None).await;
    let second = controller.fetch(None).await;

    assert!(second.last_updated > first.last_updated);
    assert_eq!(controller.cached(), Some(second));
}

#[tokio::test]
async fn every_failure_combination_still_yields_a_snapshot() {
    let failures = [
        ResponseTemplate::new(503),
        ResponseTemplate::new(200).set_body_string("not json"),
        ResponseTemplate::new(200).set_body_json(serde_json::json!({ "main": {} })),
        ResponseTemplate::new(200)
            .set_body_json(current_body(20.0))
            .set_delay(Duration::from_secs(3)),
    ];

    for response in failures {
        let server = MockServer::start().await;
        mount_failing_current(&server, response).await;

        let denied = Arc::new(DeviceAt(Err(LocationError::PermissionDenied)));
        let controller = controller(&config(&server, Some("KEY")), denied);

        let snapshot = controller.fetch(None).await;
        assert_eq!(snapshot.source, Source::Synthetic);
        assert_eq!(snapshot.location.provenance, Provenance::DefaultFallback);
        assert!(!advise(&snapshot).is_empty());
    }
}

#[tokio::test]
async fn explicit_coordinate_with_failed_lookup_is_precise() {
    let server = MockServer::start().await;
    mount_failing_current(&server, ResponseTemplate::new(500)).await;
    let controller = controller(&config(&server, Some("KEY")), Arc::new(UnsupportedGeolocator));

    let snapshot = controller.fetch(Some(FARM)).await;

    assert_eq!(snapshot.location.provenance, Provenance::Precise);
    assert_eq!(snapshot.location.label.city, "21.1500, 79.0900");
    assert_eq!(snapshot.source, Source::Synthetic);
}
