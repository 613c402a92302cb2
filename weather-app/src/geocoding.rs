use async_trait::async_trait;
use common::errors::WeatherError;
use common::http_client::HttpClient;
use common::models::CitySuggestion;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Shortest partial city name worth querying.
pub const MIN_QUERY_CHARS: usize = 2;
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

/// Autocomplete source. Failures degrade to an empty list.
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    async fn suggestions(&self, query: &str) -> Vec<CitySuggestion>;
}

#[derive(Debug, Deserialize)]
struct DirectGeocodeEntry {
    name: String,
    country: String,
    #[serde(default)]
    state: Option<String>,
    lat: f64,
    lon: f64,
}

impl From<DirectGeocodeEntry> for CitySuggestion {
    fn from(entry: DirectGeocodeEntry) -> Self {
        CitySuggestion {
            name: entry.name,
            country: entry.country,
            state: entry.state,
            latitude: entry.lat,
            longitude: entry.lon,
        }
    }
}

pub struct GeocodingClient {
    http_client: HttpClient,
    base_url: String,
    api_key: String,
    limit: usize,
}

impl GeocodingClient {
    pub fn new(base_url: String, api_key: String, limit: usize, timeout: Duration) -> Self {
        Self {
            http_client: HttpClient::new(timeout),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            limit: limit.max(1),
        }
    }

    /// Query the direct geocoding endpoint, keeping upstream ranking.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn fetch_suggestions(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<CitySuggestion>, WeatherError> {
        if query.chars().count() < MIN_QUERY_CHARS {
            return Ok(Vec::new());
        }

        let url = format!(
            "{}/direct?q={}&limit={}&appid={}",
            self.base_url,
            urlencoding::encode(query),
            limit,
            urlencoding::encode(&self.api_key)
        );

        let entries: Vec<DirectGeocodeEntry> = self
            .http_client
            .get_json(&url)
            .await
            .map_err(WeatherError::from_suggestion_failure)?;

        debug!(query = %query, count = entries.len(), "Suggestions received");

        Ok(entries
            .into_iter()
            .take(limit)
            .map(CitySuggestion::from)
            .collect())
    }
}

#[async_trait]
impl SuggestionSource for GeocodingClient {
    async fn suggestions(&self, query: &str) -> Vec<CitySuggestion> {
        match self.fetch_suggestions(query, self.limit).await {
            Ok(suggestions) => suggestions,
            Err(e) => {
                warn!(query = %query, error = %e, "Suggestion lookup failed");
                Vec::new()
            }
        }
    }
}
