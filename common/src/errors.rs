use reqwest::StatusCode;
use thiserror::Error;

/// Transport-level failures raised by the HTTP client
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Timeout error: {0}")]
    TimeoutError(String),

    #[error("HTTP error: {status} - {message}")]
    HttpError { status: u16, message: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    ParseError(#[from] serde_json::Error),
}

impl AppError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::HttpError {
            status,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::TimeoutError(message.into())
    }

    /// Upstream status code, if the failure carried one.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::HttpError { status, .. } => Some(*status),
            AppError::NetworkError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Domain failures surfaced to the weather store and its consumers.
///
/// Only the first three variants ever reach `WeatherState::error`. Forecast
/// and suggestion failures stay inside their own components.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WeatherError {
    #[error("City not found")]
    CityNotFound,

    #[error("Invalid API key")]
    InvalidCredentials,

    #[error("Failed to fetch weather data: {0}")]
    NetworkFailure(String),

    #[error("Failed to fetch forecast data: {0}")]
    ForecastFetchFailure(String),

    #[error("Failed to fetch city suggestions: {0}")]
    SuggestionFetchFailure(String),
}

impl WeatherError {
    /// Classify a failed current-weather request.
    pub fn from_weather_failure(err: AppError) -> Self {
        match err.status().and_then(|s| StatusCode::from_u16(s).ok()) {
            Some(StatusCode::NOT_FOUND) => Self::CityNotFound,
            Some(StatusCode::UNAUTHORIZED) => Self::InvalidCredentials,
            _ => Self::NetworkFailure(err.to_string()),
        }
    }

    pub fn from_forecast_failure(err: AppError) -> Self {
        Self::ForecastFetchFailure(err.to_string())
    }

    pub fn from_suggestion_failure(err: AppError) -> Self {
        Self::SuggestionFetchFailure(err.to_string())
    }

    /// Message suitable for showing in place of a weather result.
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::CityNotFound => {
                "City not found. Please check the spelling and try again."
            }
            WeatherError::InvalidCredentials => "Invalid API key",
            WeatherError::NetworkFailure(_) => "Failed to fetch weather data",
            WeatherError::ForecastFetchFailure(_) => "Failed to fetch forecast data",
            WeatherError::SuggestionFetchFailure(_) => "Failed to fetch city suggestions",
        }
    }
}
