//! City weather search: cache-aware fetching, recent searches and a debounced
//! search box coordinator on top of the OpenWeather API.

pub mod api_client;
pub mod cache;
pub mod config;
pub mod geocoding;
pub mod location;
pub mod recent;
pub mod search_input;
pub mod store;

pub use api_client::{OpenWeatherClient, WeatherApi};
pub use geocoding::{GeocodingClient, SuggestionSource};
pub use location::{Geolocator, IpGeolocator};
pub use search_input::SearchInput;
pub use store::{WeatherStore, WeatherView};
