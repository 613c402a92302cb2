use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::errors::WeatherError;
use common::http_client::HttpClient;
use common::models::{Condition, ForecastDay, WeatherRecord};
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Length of the upstream 3-hourly series.
pub const FORECAST_SERIES_LEN: usize = 40;
/// Entries per day in a 3-hourly series.
pub const SAMPLES_PER_DAY: usize = 8;
pub const FORECAST_DAYS: usize = 5;

/// Remote source of current conditions and forecasts for a city name.
#[async_trait]
pub trait WeatherApi: Send + Sync {
    async fn current_weather(&self, city: &str) -> Result<WeatherRecord, WeatherError>;

    async fn forecast(&self, city: &str) -> Result<Vec<ForecastDay>, WeatherError>;
}

#[derive(Debug, Deserialize)]
struct OpenWeatherCurrent {
    name: String,
    main: MainReadings,
    #[serde(default)]
    weather: Vec<OpenWeatherCondition>,
    wind: Wind,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct Wind {
    speed: f64,
}

#[derive(Debug, Deserialize, Clone)]
struct OpenWeatherCondition {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherForecast {
    list: Vec<ForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct ForecastEntry {
    #[serde(with = "chrono::serde::ts_seconds")]
    dt: DateTime<Utc>,
    main: ForecastReadings,
    #[serde(default)]
    weather: Vec<OpenWeatherCondition>,
}

#[derive(Debug, Deserialize)]
struct ForecastReadings {
    temp: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: u8,
}

/// First reported condition, or an empty one when the list is missing.
fn primary_condition(conditions: Vec<OpenWeatherCondition>) -> Condition {
    conditions
        .into_iter()
        .next()
        .map(|c| Condition {
            main: c.main,
            description: c.description,
            icon: c.icon,
        })
        .unwrap_or_default()
}

impl From<OpenWeatherCurrent> for WeatherRecord {
    fn from(response: OpenWeatherCurrent) -> Self {
        WeatherRecord {
            name: response.name,
            temperature: response.main.temp,
            feels_like: response.main.feels_like,
            humidity: response.main.humidity,
            pressure: response.main.pressure,
            condition: primary_condition(response.weather),
            wind_speed: response.wind.speed,
        }
    }
}

impl From<ForecastEntry> for ForecastDay {
    fn from(entry: ForecastEntry) -> Self {
        ForecastDay {
            timestamp: entry.dt,
            temperature: entry.main.temp,
            min_temp: entry.main.temp_min,
            max_temp: entry.main.temp_max,
            humidity: entry.main.humidity,
            condition: primary_condition(entry.weather),
        }
    }
}

/// Reduce a 3-hourly series to one sample per day: indices 0, 8, 16, 24, 32.
pub fn daily_samples<T>(series: impl IntoIterator<Item = T>) -> Vec<T> {
    series
        .into_iter()
        .take(FORECAST_SERIES_LEN)
        .step_by(SAMPLES_PER_DAY)
        .take(FORECAST_DAYS)
        .collect()
}

/// Client for the OpenWeather current-weather and forecast endpoints.
pub struct OpenWeatherClient {
    http_client: HttpClient,
    base_url: String,
    api_key: String,
    units: String,
}

impl OpenWeatherClient {
    pub fn new(base_url: String, api_key: String, units: String, timeout: Duration) -> Self {
        if api_key.is_empty() {
            warn!("No OpenWeather API key configured, requests will be rejected upstream");
        }
        Self {
            http_client: HttpClient::new(timeout),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            units,
        }
    }

    fn weather_url(&self, city: &str) -> String {
        format!(
            "{}/weather?q={}&appid={}&units={}",
            self.base_url,
            urlencoding::encode(city),
            urlencoding::encode(&self.api_key),
            urlencoding::encode(&self.units)
        )
    }

    fn forecast_url(&self, city: &str) -> String {
        format!(
            "{}/forecast?q={}&appid={}&units={}&cnt={}",
            self.base_url,
            urlencoding::encode(city),
            urlencoding::encode(&self.api_key),
            urlencoding::encode(&self.units),
            FORECAST_SERIES_LEN
        )
    }
}

#[async_trait]
impl WeatherApi for OpenWeatherClient {
    #[instrument(skip(self), fields(city = %city))]
    async fn current_weather(&self, city: &str) -> Result<WeatherRecord, WeatherError> {
        info!(city = %city, "Fetching weather from API");

        let response: OpenWeatherCurrent = self
            .http_client
            .get_json(&self.weather_url(city))
            .await
            .map_err(WeatherError::from_weather_failure)?;

        Ok(response.into())
    }

    #[instrument(skip(self), fields(city = %city))]
    async fn forecast(&self, city: &str) -> Result<Vec<ForecastDay>, WeatherError> {
        info!(city = %city, "Fetching forecast from API");

        let response: OpenWeatherForecast = self
            .http_client
            .get_json(&self.forecast_url(city))
            .await
            .map_err(WeatherError::from_forecast_failure)?;

        Ok(daily_samples(response.list)
            .into_iter()
            .map(ForecastDay::from)
            .collect())
    }
}
