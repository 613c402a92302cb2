use common::errors::{AppError, WeatherError};
use common::http_client::{HttpClient, redact};
use common::models::{CitySuggestion, PermissionStatus};
use common::temperature::{format_temperature, round_temperature};
use serde_json::json;
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

#[test]
fn test_format_positive_temperatures() {
    assert_eq!(format_temperature(20.0), "20°C");
    assert_eq!(format_temperature(25.7), "26°C");
    assert_eq!(format_temperature(0.0), "0°C");
}

#[test]
fn test_format_negative_temperatures() {
    assert_eq!(format_temperature(-5.0), "-5°C");
    assert_eq!(format_temperature(-10.3), "-10°C");
    assert_eq!(format_temperature(-25.8), "-26°C");
}

#[test]
fn test_half_values_round_toward_positive_infinity() {
    assert_eq!(format_temperature(20.4), "20°C");
    assert_eq!(format_temperature(20.5), "21°C");
    assert_eq!(format_temperature(20.6), "21°C");
    assert_eq!(format_temperature(-20.4), "-20°C");
    assert_eq!(format_temperature(-20.5), "-20°C");
    assert_eq!(format_temperature(0.5), "1°C");
    assert_eq!(format_temperature(99.5), "100°C");
}

#[test]
fn test_values_just_below_half_round_down() {
    assert_eq!(round_temperature(0.49999999999999994), 0);
    assert_eq!(format_temperature(0.49999999999999994), "0°C");
    assert_eq!(format_temperature(20.499999999999996), "20°C");
    assert_eq!(format_temperature(-0.5000000000000001), "-1°C");
}

#[test]
fn test_negative_zero_has_no_sign() {
    assert_eq!(format_temperature(-0.0), "0°C");
    assert_eq!(round_temperature(-0.4), 0);
    assert_eq!(format_temperature(-0.4), "0°C");
}

#[test]
fn test_format_extremes() {
    assert_eq!(format_temperature(100.0), "100°C");
    assert_eq!(format_temperature(-100.0), "-100°C");
    assert_eq!(format_temperature(99.4), "99°C");
    assert_eq!(format_temperature(0.9), "1°C");
}

#[test]
fn test_status_classification() {
    assert_eq!(
        WeatherError::from_weather_failure(AppError::http(404, "Not Found")),
        WeatherError::CityNotFound
    );
    assert_eq!(
        WeatherError::from_weather_failure(AppError::http(401, "Unauthorized")),
        WeatherError::InvalidCredentials
    );
    assert!(matches!(
        WeatherError::from_weather_failure(AppError::http(500, "boom")),
        WeatherError::NetworkFailure(_)
    ));
    assert!(matches!(
        WeatherError::from_weather_failure(AppError::timeout("slow")),
        WeatherError::NetworkFailure(_)
    ));
}

#[test]
fn test_user_messages() {
    assert_eq!(
        WeatherError::CityNotFound.user_message(),
        "City not found. Please check the spelling and try again."
    );
    assert_eq!(WeatherError::InvalidCredentials.user_message(), "Invalid API key");
    assert_eq!(
        WeatherError::NetworkFailure("x".into()).user_message(),
        "Failed to fetch weather data"
    );
}

#[test]
fn test_suggestion_display_name() {
    let mut suggestion = CitySuggestion {
        name: "Portland".into(),
        country: "US".into(),
        state: Some("Oregon".into()),
        latitude: 45.5,
        longitude: -122.6,
    };
    assert_eq!(suggestion.display_name(), "Portland, Oregon, US");

    suggestion.state = None;
    assert_eq!(suggestion.display_name(), "Portland, US");

    suggestion.state = Some(String::new());
    assert_eq!(suggestion.display_name(), "Portland, US");
}

#[test]
fn test_permission_status_parse() {
    assert_eq!(PermissionStatus::parse("Granted"), Some(PermissionStatus::Granted));
    assert_eq!(PermissionStatus::parse(" denied "), Some(PermissionStatus::Denied));
    assert_eq!(PermissionStatus::parse("maybe"), None);
}

#[test]
fn test_redact_strips_query() {
    assert_eq!(
        redact("https://api.example.com/weather?q=London&appid=secret"),
        "https://api.example.com/weather"
    );
    assert_eq!(redact("https://api.example.com/weather"), "https://api.example.com/weather");
}

#[tokio::test]
async fn test_get_json_returns_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": 7 })))
        .mount(&mock_server)
        .await;

    let client = HttpClient::new(Duration::from_secs(2));
    let body: serde_json::Value = client
        .get_json(&format!("{}/ok", mock_server.uri()))
        .await
        .expect("request should succeed");

    assert_eq!(body["value"], 7);
}

#[tokio::test]
async fn test_get_json_surfaces_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = HttpClient::new(Duration::from_secs(2));
    let err = client
        .get_json::<serde_json::Value>(&format!("{}/missing?appid=secret", mock_server.uri()))
        .await
        .expect_err("404 should fail");

    assert_eq!(err.status(), Some(404));
    assert!(!err.to_string().contains("secret"));
}

#[tokio::test]
async fn test_get_json_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let client = HttpClient::new(Duration::from_millis(100));
    let err = client
        .get_json::<serde_json::Value>(&format!("{}/slow", mock_server.uri()))
        .await
        .expect_err("slow response should time out");

    assert!(matches!(err, AppError::TimeoutError(_)));
}

#[tokio::test]
async fn test_get_json_rejects_malformed_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/garbage"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let client = HttpClient::new(Duration::from_secs(2));
    let err = client
        .get_json::<serde_json::Value>(&format!("{}/garbage", mock_server.uri()))
        .await
        .expect_err("malformed body should fail");

    assert!(matches!(err, AppError::ParseError(_)));
}
