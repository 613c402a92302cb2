use crate::errors::AppError;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// HTTP client with a hard per-request timeout.
///
/// Requests are attempted exactly once; retrying is left to the user.
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, timeout }
    }

    /// Fetch and decode a JSON body. Non-2xx statuses become `AppError::HttpError`.
    #[instrument(skip(self, url), fields(endpoint = %redact(url)))]
    pub async fn get_json<T>(&self, url: &str) -> Result<T, AppError>
    where
        T: serde::de::DeserializeOwned,
    {
        let endpoint = redact(url);

        let response = tokio::time::timeout(self.timeout, self.client.get(url).send())
            .await
            .map_err(|_| AppError::timeout(format!("Request to {} timed out", endpoint)))?
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::timeout(format!("Request to {} timed out", endpoint))
                } else {
                    AppError::NetworkError(e.without_url())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(endpoint = %endpoint, status = status.as_u16(), "Request rejected");
            return Err(AppError::http(
                status.as_u16(),
                format!("HTTP error: {}", status),
            ));
        }

        let text = response
            .text()
            .await
            .map_err(|e| AppError::NetworkError(e.without_url()))?;
        let json: T = serde_json::from_str(&text).map_err(AppError::ParseError)?;

        debug!(endpoint = %endpoint, "Request successful");
        Ok(json)
    }
}

/// Strip the query string so credentials never reach logs or error messages.
pub fn redact(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}
