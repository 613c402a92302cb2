//! Device location collaborator.
//!
//! `IpGeolocator` resolves the current city from the public IP address. The
//! permission model mirrors a mobile location prompt: an undetermined status
//! is granted on request, a denied one stays denied.

use async_trait::async_trait;
use common::http_client::HttpClient;
use common::models::{LocationData, PermissionStatus};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

const UNKNOWN_CITY: &str = "Unknown City";
const UNKNOWN_COUNTRY: &str = "Unknown Country";

#[async_trait]
pub trait Geolocator: Send + Sync {
    /// Prompt for permission. Returns `Granted` or `Denied`.
    async fn request_permission(&self) -> PermissionStatus;

    async fn current_location(&self) -> Option<LocationData>;

    async fn permission_status(&self) -> PermissionStatus;
}

/// Ask for permission, then resolve the current city.
///
/// Refusals and lookup failures are silent: the caller just gets `None`.
pub async fn locate(geolocator: &dyn Geolocator) -> Option<LocationData> {
    if geolocator.request_permission().await != PermissionStatus::Granted {
        debug!("Location permission denied");
        return None;
    }

    let location = geolocator.current_location().await;
    match &location {
        Some(loc) => info!(city = %loc.city, "Geolocation found"),
        None => debug!("Could not determine location"),
    }
    location
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    region_name: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    lat: f64,
    #[serde(default)]
    lon: f64,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub struct IpGeolocator {
    http_client: HttpClient,
    base_url: String,
    permission: RwLock<PermissionStatus>,
}

impl IpGeolocator {
    pub fn new(base_url: String, permission: PermissionStatus, timeout: Duration) -> Self {
        Self {
            http_client: HttpClient::new(timeout),
            base_url: base_url.trim_end_matches('/').to_string(),
            permission: RwLock::new(permission),
        }
    }
}

#[async_trait]
impl Geolocator for IpGeolocator {
    async fn request_permission(&self) -> PermissionStatus {
        let mut permission = self.permission.write().await;
        if *permission == PermissionStatus::Undetermined {
            *permission = PermissionStatus::Granted;
        }
        *permission
    }

    #[instrument(skip(self))]
    async fn current_location(&self) -> Option<LocationData> {
        if *self.permission.read().await != PermissionStatus::Granted {
            return None;
        }

        let url = format!(
            "{}/?fields=status,country,regionName,city,lat,lon",
            self.base_url
        );

        let response: IpApiResponse = match self.http_client.get_json(&url).await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "Error getting location");
                return None;
            }
        };

        if response.status != "success" {
            debug!(status = %response.status, "Location lookup unsuccessful");
            return None;
        }

        let city = non_empty(response.city)
            .or_else(|| non_empty(response.region_name))
            .unwrap_or_else(|| UNKNOWN_CITY.to_string());
        let country = non_empty(response.country).unwrap_or_else(|| UNKNOWN_COUNTRY.to_string());

        Some(LocationData {
            city,
            country,
            latitude: response.lat,
            longitude: response.lon,
        })
    }

    async fn permission_status(&self) -> PermissionStatus {
        *self.permission.read().await
    }
}
