#![allow(dead_code)]

use async_trait::async_trait;
use chrono::DateTime;
use common::errors::WeatherError;
use common::models::{
    CitySuggestion, Condition, ForecastDay, LocationData, PermissionStatus, WeatherRecord,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use weather_app::geocoding::SuggestionSource;
use weather_app::location::Geolocator;
use weather_app::WeatherApi;

pub fn record(name: &str, temperature: f64) -> WeatherRecord {
    WeatherRecord {
        name: name.to_string(),
        temperature,
        feels_like: temperature - 1.0,
        humidity: 60,
        pressure: 1012,
        condition: Condition {
            main: "Clouds".to_string(),
            description: "broken clouds".to_string(),
            icon: "04d".to_string(),
        },
        wind_speed: 3.5,
    }
}

pub fn forecast_days(count: usize) -> Vec<ForecastDay> {
    (0..count)
        .map(|i| ForecastDay {
            timestamp: DateTime::from_timestamp(1_700_000_000 + i as i64 * 86_400, 0).unwrap(),
            temperature: 10.0 + i as f64,
            min_temp: 5.0 + i as f64,
            max_temp: 15.0 + i as f64,
            humidity: 70,
            condition: Condition::default(),
        })
        .collect()
}

pub fn suggestion(name: &str, state: Option<&str>, country: &str) -> CitySuggestion {
    CitySuggestion {
        name: name.to_string(),
        country: country.to_string(),
        state: state.map(str::to_string),
        latitude: 0.0,
        longitude: 0.0,
    }
}

/// In-memory weather API keyed by lowercased query. Unknown cities are not found.
#[derive(Default)]
pub struct FakeWeatherApi {
    weather: Mutex<HashMap<String, Result<WeatherRecord, WeatherError>>>,
    forecasts: Mutex<HashMap<String, Result<Vec<ForecastDay>, WeatherError>>>,
    delays: Mutex<HashMap<String, Duration>>,
    weather_calls: Mutex<Vec<String>>,
    forecast_calls: Mutex<Vec<String>>,
}

impl FakeWeatherApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `query` with a record named `name`.
    pub fn with_weather(self, query: &str, name: &str, temperature: f64) -> Self {
        self.set_weather(query, Ok(record(name, temperature)));
        self
    }

    pub fn with_forecast(self, query: &str, days: Vec<ForecastDay>) -> Self {
        self.forecasts
            .lock()
            .unwrap()
            .insert(query.to_lowercase(), Ok(days));
        self
    }

    pub fn with_delay(self, query: &str, delay: Duration) -> Self {
        self.delays
            .lock()
            .unwrap()
            .insert(query.to_lowercase(), delay);
        self
    }

    pub fn set_weather(&self, query: &str, response: Result<WeatherRecord, WeatherError>) {
        self.weather
            .lock()
            .unwrap()
            .insert(query.to_lowercase(), response);
    }

    pub fn fail_forecast(&self, query: &str, error: WeatherError) {
        self.forecasts
            .lock()
            .unwrap()
            .insert(query.to_lowercase(), Err(error));
    }

    pub fn weather_calls(&self) -> Vec<String> {
        self.weather_calls.lock().unwrap().clone()
    }

    pub fn forecast_calls(&self) -> Vec<String> {
        self.forecast_calls.lock().unwrap().clone()
    }

    fn delay_for(&self, query: &str) -> Option<Duration> {
        self.delays.lock().unwrap().get(&query.to_lowercase()).copied()
    }
}

#[async_trait]
impl WeatherApi for FakeWeatherApi {
    async fn current_weather(&self, city: &str) -> Result<WeatherRecord, WeatherError> {
        self.weather_calls.lock().unwrap().push(city.to_string());
        if let Some(delay) = self.delay_for(city) {
            tokio::time::sleep(delay).await;
        }
        self.weather
            .lock()
            .unwrap()
            .get(&city.to_lowercase())
            .cloned()
            .unwrap_or(Err(WeatherError::CityNotFound))
    }

    async fn forecast(&self, city: &str) -> Result<Vec<ForecastDay>, WeatherError> {
        self.forecast_calls.lock().unwrap().push(city.to_string());
        self.forecasts
            .lock()
            .unwrap()
            .get(&city.to_lowercase())
            .cloned()
            .unwrap_or_else(|| Err(WeatherError::ForecastFetchFailure("HTTP error: 404".into())))
    }
}

#[derive(Default)]
pub struct FakeSuggestions {
    results: Mutex<HashMap<String, Vec<CitySuggestion>>>,
    delay: Mutex<Option<Duration>>,
    queries: Mutex<Vec<String>>,
}

impl FakeSuggestions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(self, query: &str, suggestions: Vec<CitySuggestion>) -> Self {
        self.results
            .lock()
            .unwrap()
            .insert(query.to_string(), suggestions);
        self
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock().unwrap() = Some(delay);
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SuggestionSource for FakeSuggestions {
    async fn suggestions(&self, query: &str) -> Vec<CitySuggestion> {
        self.queries.lock().unwrap().push(query.to_string());
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.results
            .lock()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_default()
    }
}

pub struct FakeGeolocator {
    permission: Mutex<PermissionStatus>,
    location: Option<LocationData>,
    lookups: Mutex<usize>,
}

impl FakeGeolocator {
    pub fn new(permission: PermissionStatus, city: Option<&str>) -> Self {
        Self {
            permission: Mutex::new(permission),
            location: city.map(|c| LocationData {
                city: c.to_string(),
                country: "GB".to_string(),
                latitude: 51.5,
                longitude: -0.12,
            }),
            lookups: Mutex::new(0),
        }
    }

    pub fn lookups(&self) -> usize {
        *self.lookups.lock().unwrap()
    }
}

#[async_trait]
impl Geolocator for FakeGeolocator {
    async fn request_permission(&self) -> PermissionStatus {
        let mut permission = self.permission.lock().unwrap();
        if *permission == PermissionStatus::Undetermined {
            *permission = PermissionStatus::Granted;
        }
        *permission
    }

    async fn current_location(&self) -> Option<LocationData> {
        *self.lookups.lock().unwrap() += 1;
        self.location.clone()
    }

    async fn permission_status(&self) -> PermissionStatus {
        *self.permission.lock().unwrap()
    }
}
