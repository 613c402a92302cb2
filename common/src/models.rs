use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Weather condition as reported upstream
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Condition {
    pub main: String,
    pub description: String,
    pub icon: String,
}

/// Current conditions for one city. Replaced wholesale on every successful fetch.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherRecord {
    pub name: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub pressure: u32,
    pub condition: Condition,
    pub wind_speed: f64,
}

/// One daily sample of a forecast series
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastDay {
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub min_temp: f64,
    pub max_temp: f64,
    pub humidity: u8,
    pub condition: Condition,
}

/// Autocomplete suggestion returned by the geocoding endpoint
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CitySuggestion {
    pub name: String,
    pub country: String,
    pub state: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl CitySuggestion {
    /// "name, state, country", or "name, country" when there is no state.
    pub fn display_name(&self) -> String {
        match self.state.as_deref().filter(|s| !s.is_empty()) {
            Some(state) => format!("{}, {}, {}", self.name, state, self.country),
            None => format!("{}, {}", self.name, self.country),
        }
    }
}

/// Position resolved by the device location collaborator
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LocationData {
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    Granted,
    Denied,
    #[default]
    Undetermined,
}

impl PermissionStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "granted" => Some(Self::Granted),
            "denied" => Some(Self::Denied),
            "undetermined" => Some(Self::Undetermined),
            _ => None,
        }
    }
}
