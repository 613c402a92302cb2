use common::models::{ForecastDay, WeatherRecord};
use std::collections::HashMap;
use tokio::time::{Duration, Instant};

const FORECAST_KEY_SUFFIX: &str = "_forecast";

/// Case-insensitive cache key for a city name.
pub fn city_key(city: &str) -> String {
    city.to_lowercase()
}

/// Freshness key for a forecast entry. Shares the timestamp namespace with weather keys.
pub fn forecast_key(city: &str) -> String {
    format!("{}{}", city_key(city), FORECAST_KEY_SUFFIX)
}

/// Per-city weather and forecast caches with last-fetch timestamps.
///
/// Grows for the life of the process; nothing is ever evicted.
#[derive(Debug, Clone, Default)]
pub struct WeatherCache {
    weather: HashMap<String, WeatherRecord>,
    forecast: HashMap<String, Vec<ForecastDay>>,
    last_fetch: HashMap<String, Instant>,
}

impl WeatherCache {
    pub fn weather(&self, city: &str) -> Option<&WeatherRecord> {
        self.weather.get(&city_key(city))
    }

    pub fn forecast(&self, city: &str) -> Option<&[ForecastDay]> {
        self.forecast.get(&city_key(city)).map(Vec::as_slice)
    }

    /// Cached record, only if it was fetched less than `window` ago.
    pub fn fresh_weather(&self, city: &str, window: Duration) -> Option<&WeatherRecord> {
        let key = city_key(city);
        let record = self.weather.get(&key)?;
        self.is_fresh(&key, window).then_some(record)
    }

    pub fn fresh_forecast(&self, city: &str, window: Duration) -> Option<&[ForecastDay]> {
        let days = self.forecast.get(&city_key(city))?;
        self.is_fresh(&forecast_key(city), window)
            .then_some(days.as_slice())
    }

    /// Store a fetched record under `city` and stamp it.
    pub fn store_weather(&mut self, city: &str, record: WeatherRecord) {
        let key = city_key(city);
        self.last_fetch.insert(key.clone(), Instant::now());
        self.weather.insert(key, record);
    }

    pub fn store_forecast(&mut self, city: &str, days: Vec<ForecastDay>) {
        self.last_fetch.insert(forecast_key(city), Instant::now());
        self.forecast.insert(city_key(city), days);
    }

    /// Write without a timestamp. The entry stays stale until a real fetch.
    pub fn set_weather(&mut self, city: &str, record: WeatherRecord) {
        self.weather.insert(city_key(city), record);
    }

    pub fn set_forecast(&mut self, city: &str, days: Vec<ForecastDay>) {
        self.forecast.insert(city_key(city), days);
    }

    /// Time since `key` was last stamped. `None` means never fetched.
    pub fn age(&self, key: &str) -> Option<Duration> {
        self.last_fetch.get(key).map(Instant::elapsed)
    }

    fn is_fresh(&self, key: &str, window: Duration) -> bool {
        // No timestamp counts as infinitely stale
        self.age(key).is_some_and(|age| age < window)
    }
}
