use common::models::PermissionStatus;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::search_input::DebounceTiming;
use crate::store::FreshnessWindows;

pub struct Config {
    pub api_key: String,
    pub weather_base_url: String,
    pub geocoding_base_url: String,
    pub units: String,
    pub http_timeout_seconds: u64,
    pub weather_cache_ttl_ms: u64,
    pub forecast_cache_ttl_ms: u64,
    pub suggestion_limit: usize,
    pub autocomplete_debounce_ms: u64,
    pub search_debounce_ms: u64,
    pub geolocation_url: String,
    pub location_permission: PermissionStatus,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            api_key: env::var("OPENWEATHER_API_KEY").unwrap_or_default(),
            weather_base_url: env::var("OPENWEATHER_BASE_URL")
                .unwrap_or_else(|_| "https://api.openweathermap.org/data/2.5".to_string()),
            geocoding_base_url: env::var("OPENWEATHER_GEOCODING_URL")
                .unwrap_or_else(|_| "https://api.openweathermap.org/geo/1.0".to_string()),
            units: env::var("OPENWEATHER_UNITS").unwrap_or_else(|_| "metric".to_string()),
            http_timeout_seconds: parsed("HTTP_TIMEOUT_SECONDS", 10),
            weather_cache_ttl_ms: parsed("WEATHER_CACHE_TTL_MS", 30_000),
            forecast_cache_ttl_ms: parsed("FORECAST_CACHE_TTL_MS", 300_000), // 5 minutes
            suggestion_limit: parsed("SUGGESTION_LIMIT", 5),
            autocomplete_debounce_ms: parsed("AUTOCOMPLETE_DEBOUNCE_MS", 300),
            search_debounce_ms: parsed("SEARCH_DEBOUNCE_MS", 800),
            geolocation_url: env::var("GEOLOCATION_URL")
                .unwrap_or_else(|_| "http://ip-api.com/json".to_string()),
            location_permission: env::var("LOCATION_PERMISSION")
                .ok()
                .and_then(|p| PermissionStatus::parse(&p))
                .unwrap_or_default(),
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }

    pub fn freshness(&self) -> FreshnessWindows {
        FreshnessWindows {
            weather: Duration::from_millis(self.weather_cache_ttl_ms),
            forecast: Duration::from_millis(self.forecast_cache_ttl_ms),
        }
    }

    pub fn debounce(&self) -> DebounceTiming {
        DebounceTiming {
            autocomplete: Duration::from_millis(self.autocomplete_debounce_ms),
            search: Duration::from_millis(self.search_debounce_ms),
        }
    }
}

fn parsed<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
