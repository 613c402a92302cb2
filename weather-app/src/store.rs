//! Weather cache and search coordinator.
//!
//! `WeatherStore` owns the single `WeatherState` of the application. Every
//! mutation is one of the operations below and happens under a write lock, so
//! each operation is atomic; the only suspension points are the network calls,
//! which run with the lock released.
//!
//! Responses are tagged with a request generation. Any operation that replaces
//! the displayed result takes a new generation, and a response that arrives
//! after its generation was superseded only refreshes the caches.

use common::errors::WeatherError;
use common::models::{ForecastDay, WeatherRecord};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::api_client::WeatherApi;
use crate::cache::{WeatherCache, city_key};
use crate::recent::RecentSearches;

pub const WEATHER_FRESHNESS: Duration = Duration::from_secs(30);
pub const FORECAST_FRESHNESS: Duration = Duration::from_secs(300);

/// Maximum age of a cached entry still served without a refetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessWindows {
    pub weather: Duration,
    pub forecast: Duration,
}

impl Default for FreshnessWindows {
    fn default() -> Self {
        Self {
            weather: WEATHER_FRESHNESS,
            forecast: FORECAST_FRESHNESS,
        }
    }
}

/// What the result area should show. Error and result are exclusive.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherView {
    Empty,
    Loading,
    Success(WeatherRecord),
    Failure(WeatherError),
}

#[derive(Debug, Clone, Default)]
pub struct WeatherState {
    pub current: Option<WeatherRecord>,
    pub loading: bool,
    pub error: Option<WeatherError>,
    pub cache: WeatherCache,
    pub recent: RecentSearches,
    generation: u64,
}

impl WeatherState {
    pub fn view(&self) -> WeatherView {
        if self.loading {
            return WeatherView::Loading;
        }
        match (&self.error, &self.current) {
            (Some(error), _) => WeatherView::Failure(error.clone()),
            (None, Some(record)) => WeatherView::Success(record.clone()),
            (None, None) => WeatherView::Empty,
        }
    }

    /// Supersede every in-flight request. They can no longer settle `loading`.
    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.loading = false;
        self.generation
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    fn show(&mut self, record: WeatherRecord) {
        self.current = Some(record);
        self.error = None;
        self.loading = false;
    }

    fn fail(&mut self, error: WeatherError) {
        self.current = None;
        self.error = Some(error);
        self.loading = false;
    }

    /// Cache under the requested name and, if it differs, the name the API returned.
    fn cache_record(&mut self, requested: &str, record: &WeatherRecord) {
        self.cache.store_weather(requested, record.clone());
        if city_key(requested) != city_key(&record.name) {
            self.cache.store_weather(&record.name, record.clone());
        }
    }
}

pub struct WeatherStore {
    api: Arc<dyn WeatherApi>,
    state: RwLock<WeatherState>,
    freshness: FreshnessWindows,
}

impl WeatherStore {
    pub fn new(api: Arc<dyn WeatherApi>) -> Self {
        Self::with_freshness(api, FreshnessWindows::default())
    }

    pub fn with_freshness(api: Arc<dyn WeatherApi>, freshness: FreshnessWindows) -> Self {
        Self {
            api,
            state: RwLock::new(WeatherState::default()),
            freshness,
        }
    }

    /// Cache-aware fetch for a new search.
    ///
    /// Served from cache when fetched less than 30 s ago; otherwise goes to the
    /// network. Either way the record becomes current and its name moves to the
    /// front of the recent searches.
    #[instrument(skip(self), fields(city = %city))]
    pub async fn fetch_weather(&self, city: &str) -> Result<WeatherRecord, WeatherError> {
        let generation = {
            let mut state = self.state.write().await;
            let generation = state.next_generation();

            if let Some(cached) = state
                .cache
                .fresh_weather(city, self.freshness.weather)
                .cloned()
            {
                let age_ms = state
                    .cache
                    .age(&city_key(city))
                    .map(|age| age.as_millis() as u64)
                    .unwrap_or_default();
                info!(city = %city, age_ms, "Cache hit");
                state.recent.promote(&cached.name);
                state.show(cached.clone());
                return Ok(cached);
            }

            state.loading = true;
            state.error = None;
            generation
        };

        let result = self.api.current_weather(city).await;

        let mut state = self.state.write().await;
        match result {
            Ok(record) => {
                state.cache_record(city, &record);
                if state.is_current(generation) {
                    state.recent.promote(&record.name);
                    state.show(record.clone());
                } else {
                    debug!(city = %city, "Dropping superseded weather response");
                }
                Ok(record)
            }
            Err(e) => {
                warn!(city = %city, error = %e, "Weather fetch failed");
                if state.is_current(generation) {
                    state.fail(e.clone());
                }
                Err(e)
            }
        }
    }

    /// Unconditional fetch for the shown city. Leaves recent searches alone.
    #[instrument(skip(self), fields(city = %city))]
    pub async fn refresh_weather(&self, city: &str) -> Result<WeatherRecord, WeatherError> {
        let generation = self.state.write().await.next_generation();

        let result = self.api.current_weather(city).await;

        let mut state = self.state.write().await;
        match result {
            Ok(record) => {
                state.cache_record(city, &record);
                if state.is_current(generation) {
                    state.show(record.clone());
                }
                Ok(record)
            }
            Err(e) => {
                warn!(city = %city, error = %e, "Weather refresh failed");
                if state.is_current(generation) {
                    state.fail(e.clone());
                }
                Err(e)
            }
        }
    }

    /// Show a cached record without touching the network. Returns whether one existed.
    pub async fn load_cached_weather(&self, city: &str) -> bool {
        let mut state = self.state.write().await;
        let Some(record) = state.cache.weather(city).cloned() else {
            debug!(city = %city, "No cached weather");
            return false;
        };
        state.next_generation();
        state.show(record);
        true
    }

    /// Cache-aware forecast fetch with a 5 minute window.
    ///
    /// Failures are logged and returned to the caller; they never reach
    /// `WeatherState::error`.
    #[instrument(skip(self), fields(city = %city))]
    pub async fn fetch_forecast(&self, city: &str) -> Result<Vec<ForecastDay>, WeatherError> {
        {
            let state = self.state.read().await;
            if let Some(days) = state.cache.fresh_forecast(city, self.freshness.forecast) {
                debug!(city = %city, "Using cached forecast");
                return Ok(days.to_vec());
            }
        }
        self.load_forecast(city).await
    }

    /// Forecast fetch that ignores the freshness window.
    #[instrument(skip(self), fields(city = %city))]
    pub async fn refresh_forecast(&self, city: &str) -> Result<Vec<ForecastDay>, WeatherError> {
        self.load_forecast(city).await
    }

    async fn load_forecast(&self, city: &str) -> Result<Vec<ForecastDay>, WeatherError> {
        match self.api.forecast(city).await {
            Ok(days) => {
                self.state
                    .write()
                    .await
                    .cache
                    .store_forecast(city, days.clone());
                Ok(days)
            }
            Err(e) => {
                warn!(city = %city, error = %e, "Forecast fetch failed");
                Err(e)
            }
        }
    }

    /// Merge forecast data fetched elsewhere. Not stamped.
    pub async fn set_cached_forecast(&self, city: &str, days: Vec<ForecastDay>) {
        self.state.write().await.cache.set_forecast(city, days);
    }

    /// Merge a record fetched elsewhere. Not stamped.
    pub async fn set_cached_weather(&self, city: &str, record: WeatherRecord) {
        self.state.write().await.cache.set_weather(city, record);
    }

    pub async fn add_recent_search(&self, city: &str) {
        self.state.write().await.recent.promote(city);
    }

    pub async fn remove_recent_search(&self, city: &str) {
        self.state.write().await.recent.remove(city);
    }

    pub async fn clear_recent_searches(&self) {
        self.state.write().await.recent.clear();
    }

    /// Drop the shown result and error. Caches and recent searches stay.
    pub async fn clear_weather(&self) {
        let mut state = self.state.write().await;
        state.next_generation();
        state.current = None;
        state.error = None;
    }

    /// Consume a committed search: blank input clears, anything else fetches.
    pub async fn search(&self, city: &str) {
        if city.trim().is_empty() {
            self.clear_weather().await;
            return;
        }
        // Failures are already recorded in the state
        let _ = self.fetch_weather(city).await;
    }

    pub async fn view(&self) -> WeatherView {
        self.state.read().await.view()
    }

    pub async fn snapshot(&self) -> WeatherState {
        self.state.read().await.clone()
    }

    pub async fn current(&self) -> Option<WeatherRecord> {
        self.state.read().await.current.clone()
    }

    pub async fn error(&self) -> Option<WeatherError> {
        self.state.read().await.error.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn recent_searches(&self) -> Vec<String> {
        self.state.read().await.recent.to_vec()
    }

    pub async fn cached_weather(&self, city: &str) -> Option<WeatherRecord> {
        self.state.read().await.cache.weather(city).cloned()
    }

    pub async fn cached_forecast(&self, city: &str) -> Option<Vec<ForecastDay>> {
        self.state
            .read()
            .await
            .cache
            .forecast(city)
            .map(<[ForecastDay]>::to_vec)
    }
}
