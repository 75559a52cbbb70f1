//! Open-Meteo clients and the search pipeline against a mock HTTP server.

use std::time::Duration;

use citycast_core::{
    Config, GeoResult, Providers, RawForecastPayload, SearchOrchestrator, SearchOutcome,
    SearchPhase, WeatherError, orchestrator::PLACE_NOT_FOUND,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn geocoding_response() -> serde_json::Value {
    serde_json::json!({
        "results": [{
            "id": 2988507,
            "name": "Paris",
            "latitude": 48.85341,
            "longitude": 2.3488,
            "country_code": "FR",
            "country": "France",
            "timezone": "Europe/Paris"
        }],
        "generationtime_ms": 0.72
    })
}

fn forecast_response() -> serde_json::Value {
    serde_json::json!({
        "latitude": 48.86,
        "longitude": 2.3399997,
        "utc_offset_seconds": 3600,
        "timezone": "Europe/Paris",
        "current": {
            "time": "2024-01-15T12:00",
            "interval": 900,
            "temperature_2m": 5.5,
            "apparent_temperature": 2.0,
            "wind_speed_10m": 5.0,
            "weather_code": 3,
            "uv_index": 1.2,
            "is_day": 1
        },
        "hourly": {
            "time": ["2024-01-15T12:00", "2024-01-15T13:00", "2024-01-15T14:00"],
            "temperature_2m": [5.5, 6.1, 6.4],
            "weather_code": [3, 3, 61]
        },
        "daily": {
            "time": ["2024-01-15", "2024-01-16", "2024-01-17"],
            "weather_code": [3, 61, 2],
            "temperature_2m_max": [8.0, 6.0, 10.0],
            "temperature_2m_min": [2.0, 1.0, 3.0],
            "precipitation_probability_max": [10, 80, null]
        }
    })
}

fn config_for(server: &MockServer) -> Config {
    Config {
        geocoding_url: server.uri(),
        forecast_url: server.uri(),
        request_timeout_secs: 5,
        ..Config::default()
    }
}

fn providers_for(server: &MockServer) -> Providers {
    Providers::from_config(&config_for(server))
        .expect("Failed to create providers")
}

fn orchestrator_for(server: &MockServer) -> SearchOrchestrator {
    SearchOrchestrator::from_config(&config_for(server))
        .expect("Failed to create orchestrator")
}

async fn resolve(server: &MockServer, query: &str) -> Result<GeoResult, WeatherError> {
    providers_for(server).geocoder.resolve(query).await
}

async fn fetch(
    server: &MockServer,
    lat: f64,
    lon: f64,
) -> Result<RawForecastPayload, WeatherError> {
    let providers = providers_for(server);
    providers.forecast.fetch_forecast(lat, lon).await
}

fn ok(body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

fn text(status: u16, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_string(body)
}

async fn mount_geocoding(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn mount_forecast(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(response)
        .mount(server)
        .await;
}

// ============================================================================
// Geocoding
// ============================================================================

#[tokio::test]
async fn geocoding_returns_best_match_with_country() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("name", "Paris"))
        .and(query_param("count", "1"))
        .and(query_param("language", "fr"))
        .respond_with(ok(geocoding_response()))
        .expect(1)
        .mount(&server)
        .await;

    let geo = resolve(&server, "  Paris ").await.expect("should resolve");

    assert_eq!(geo.display_name, "Paris, France");
    assert!((geo.latitude - 48.85341).abs() < 1e-9);
    assert!((geo.longitude - 2.3488).abs() < 1e-9);
}

#[tokio::test]
async fn geocoding_without_country_uses_place_name() {
    let server = MockServer::start().await;
    let body = serde_json::json!({
        "results": [{ "name": "Nowhere", "latitude": 0.0, "longitude": 0.0 }]
    });
    mount_geocoding(&server, ok(body)).await;

    let geo = resolve(&server, "Nowhere").await.expect("should resolve");
    assert_eq!(geo.display_name, "Nowhere");
}

#[tokio::test]
async fn geocoding_without_results_is_not_found() {
    let server = MockServer::start().await;
    let body = serde_json::json!({ "generationtime_ms": 0.3 });
    mount_geocoding(&server, ok(body)).await;

    let err = resolve(&server, "Atlantis").await.unwrap_err();
    assert!(matches!(err, WeatherError::NotFound(_)));
}

#[tokio::test]
async fn geocoding_error_status_is_not_found() {
    let server = MockServer::start().await;
    let body = serde_json::json!({ "error": true, "reason": "bad" });
    let response = ResponseTemplate::new(400).set_body_json(body);
    mount_geocoding(&server, response).await;

    let err = resolve(&server, "Paris").await.unwrap_err();
    assert!(matches!(err, WeatherError::NotFound(_)));
    assert!(err.to_string().contains("400"));
}

#[tokio::test]
async fn geocoding_garbage_body_is_malformed() {
    let server = MockServer::start().await;
    let garbage = text(200, "<html>oops</html>");
    mount_geocoding(&server, garbage).await;

    let err = resolve(&server, "Paris").await.unwrap_err();
    assert!(matches!(err, WeatherError::MalformedPayload(_)));
}

#[tokio::test]
async fn unreachable_geocoder_is_transport_error() {
    let config = Config {
        geocoding_url: "http://127.0.0.1:9".to_string(),
        request_timeout_secs: 2,
        ..Config::default()
    };
    let providers = Providers::from_config(&config)
        .expect("Failed to create providers");

    let err = providers.geocoder.resolve("Paris").await.unwrap_err();
    assert!(err.is_retryable());
}

// ============================================================================
// Forecast
// ============================================================================

#[tokio::test]
async fn forecast_requests_metric_fields_in_metres_per_second() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("latitude", "48.85"))
        .and(query_param("longitude", "2.35"))
        .and(query_param("wind_speed_unit", "ms"))
        .and(query_param("timezone", "auto"))
        .and(query_param("forecast_days", "7"))
        .and(query_param("hourly", "temperature_2m,weather_code"))
        .respond_with(ok(forecast_response()))
        .expect(1)
        .mount(&server)
        .await;

    let raw = fetch(&server, 48.85, 2.35).await.expect("should fetch");

    assert_eq!(raw.utc_offset_seconds, Some(3600));
    assert_eq!(raw.current.map(|c| c.weather_code), Some(3));
    assert_eq!(raw.hourly.map(|h| h.time.len()), Some(3));
    assert_eq!(
        raw.daily.map(|d| d.precipitation_probability_max),
        Some(vec![Some(10.0), Some(80.0), None])
    );
}

#[tokio::test]
async fn forecast_server_error_is_transport() {
    let server = MockServer::start().await;
    mount_forecast(&server, text(503, "maintenance")).await;

    let err = fetch(&server, 48.85, 2.35).await.unwrap_err();
    assert!(matches!(err, WeatherError::Transport(_)));
    assert!(err.to_string().contains("maintenance"));
}

#[tokio::test]
async fn forecast_missing_sections_still_decodes() {
    let server = MockServer::start().await;
    let body = serde_json::json!({ "latitude": 1.0, "longitude": 2.0 });
    mount_forecast(&server, ok(body)).await;

    let raw = fetch(&server, 1.0, 2.0).await.expect("should fetch");
    assert!(raw.current.is_none());
    assert!(raw.hourly.is_none());
    assert!(raw.daily.is_none());
}

#[tokio::test]
async fn forecast_invalid_json_is_malformed() {
    let server = MockServer::start().await;
    mount_forecast(&server, text(200, "{not json")).await;

    let err = fetch(&server, 1.0, 2.0).await.unwrap_err();
    assert!(matches!(err, WeatherError::MalformedPayload(_)));
}

// ============================================================================
// End-to-end search
// ============================================================================

#[tokio::test]
async fn search_pipeline_updates_snapshot_and_watchlist() {
    let server = MockServer::start().await;
    mount_geocoding(&server, ok(geocoding_response())).await;
    mount_forecast(&server, ok(forecast_response())).await;

    let orch = orchestrator_for(&server);
    let outcome = orch.initialize("Paris").await;

    let SearchOutcome::Completed(snapshot) = outcome else {
        panic!("expected completion, got {outcome:?}");
    };
    let rain_tomorrow = snapshot.daily[1].precipitation_probability;
    assert_eq!(snapshot.current.name, "Paris, France");
    assert!((snapshot.current.wind_speed_kmh - 18.0).abs() < 1e-9);
    assert_eq!(snapshot.daily.len(), 3);
    assert_eq!(snapshot.daily[0].day_label.as_str(), "Today");
    assert!((rain_tomorrow - 0.8).abs() < 1e-9);

    let list = orch.watchlist();
    assert_eq!(list.len(), 3);
    assert_eq!(list[0].name, "Paris, France");
    assert!(list[0].active);
    assert_eq!(list.iter().filter(|e| e.active).count(), 1);
}

#[tokio::test]
async fn search_for_unknown_place_reports_not_found() {
    let server = MockServer::start().await;
    mount_geocoding(&server, ok(serde_json::json!({}))).await;

    let orch = orchestrator_for(&server);
    orch.search("Atlantis").await;

    let state = orch.state();
    assert_eq!(state.phase, SearchPhase::Failed);
    assert_eq!(state.error.map(|e| e.message), Some(PLACE_NOT_FOUND));
    assert!(state.snapshot.is_none());
}

#[tokio::test]
async fn slow_forecast_times_out_and_keeps_previous_snapshot() {
    let server = MockServer::start().await;
    mount_geocoding(&server, ok(geocoding_response())).await;
    mount_forecast(&server, ok(forecast_response())).await;

    let orch = orchestrator_for(&server);
    orch.search("Paris").await;

    server.reset().await;
    let slow = ok(forecast_response()).set_delay(Duration::from_millis(500));
    mount_geocoding(&server, ok(geocoding_response())).await;
    mount_forecast(&server, slow).await;

    let orch = orch.with_timeout(Some(Duration::from_millis(100)));
    let outcome = orch.search("Paris").await;

    let SearchOutcome::Failed(failure) = outcome else {
        panic!("expected failure, got {outcome:?}");
    };
    assert!(failure.detail.contains("timed out"));

    let shown = orch.state().snapshot.map(|s| s.current.name.clone());
    assert_eq!(shown.as_deref(), Some("Paris, France"));
}
