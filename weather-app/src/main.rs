use common::models::{ForecastDay, WeatherRecord};
use common::temperature::format_temperature;
use common::tracing::{init_tracing, init_tracing_pretty};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use weather_app::config::Config;
use weather_app::{
    GeocodingClient, IpGeolocator, OpenWeatherClient, SearchInput, WeatherStore, WeatherView,
};

const HELP: &str = "\
Type text to edit the search box (each line replaces the whole value).
  /submit       search the current text now
  /select N     pick suggestion N
  /location     toggle searching by current location
  /clear        clear the search box
  /show         show the search box and current weather
  /recent       list recent searches
  /open N       show recent search N from cache
  /remove N     forget recent search N
  /refresh      refetch the shown city
  /forecast     5-day forecast for the shown city
  /quit         exit";

enum Command<'a> {
    Text(&'a str),
    Submit,
    Select(usize),
    Location,
    Clear,
    Show,
    Recent,
    Open(usize),
    Remove(usize),
    Refresh,
    Forecast,
    Help,
    Quit,
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        let Some(rest) = line.strip_prefix('/') else {
            return Command::Text(line);
        };
        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default();
        // Numbered arguments are 1-based on screen
        let index = parts
            .next()
            .and_then(|n| n.parse::<usize>().ok())
            .and_then(|n| n.checked_sub(1));

        match (name, index) {
            ("submit", _) => Command::Submit,
            ("select", Some(i)) => Command::Select(i),
            ("location", _) => Command::Location,
            ("clear", _) => Command::Clear,
            ("show", _) => Command::Show,
            ("recent", _) => Command::Recent,
            ("open", Some(i)) => Command::Open(i),
            ("remove", Some(i)) => Command::Remove(i),
            ("refresh", _) => Command::Refresh,
            ("forecast", _) => Command::Forecast,
            ("help", _) => Command::Help,
            ("quit", _) => Command::Quit,
            _ => Command::Unknown(line),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => init_tracing(),
        _ => init_tracing_pretty(),
    }

    let config = Config::from_env();
    let cancellation_token = CancellationToken::new();

    let api = Arc::new(OpenWeatherClient::new(
        config.weather_base_url.clone(),
        config.api_key.clone(),
        config.units.clone(),
        config.http_timeout(),
    ));
    let store = Arc::new(WeatherStore::with_freshness(api, config.freshness()));
    let suggestions = Arc::new(GeocodingClient::new(
        config.geocoding_base_url.clone(),
        config.api_key.clone(),
        config.suggestion_limit,
        config.http_timeout(),
    ));
    let geolocator = Arc::new(IpGeolocator::new(
        config.geolocation_url.clone(),
        config.location_permission,
        config.http_timeout(),
    ));
    let input = SearchInput::new(store.clone(), suggestions, geolocator, config.debounce());

    tokio::spawn(shutdown_signal(cancellation_token.clone()));

    info!("Weather search ready");
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = cancellation_token.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            break;
        };

        match Command::parse(&line) {
            Command::Text(text) => input.on_text_changed(text).await,
            Command::Submit => {
                input.submit().await;
                render_view(&store.view().await);
            }
            Command::Select(index) => {
                if input.select_suggestion_at(index).await {
                    render_view(&store.view().await);
                } else {
                    println!("No suggestion {}", index + 1);
                }
            }
            Command::Location => {
                input.use_current_location().await;
                render_view(&store.view().await);
            }
            Command::Clear => input.clear().await,
            Command::Show => show(&input, &store).await,
            Command::Recent => render_recent(&store.recent_searches().await),
            Command::Open(index) => {
                let recent = store.recent_searches().await;
                match recent.get(index) {
                    Some(city) => {
                        if store.load_cached_weather(city).await {
                            render_view(&store.view().await);
                        } else {
                            println!("Nothing cached for {city}");
                        }
                    }
                    None => println!("No recent search {}", index + 1),
                }
            }
            Command::Remove(index) => {
                let recent = store.recent_searches().await;
                if let Some(city) = recent.get(index) {
                    store.remove_recent_search(city).await;
                }
                render_recent(&store.recent_searches().await);
            }
            Command::Refresh => match store.current().await {
                Some(record) => {
                    // Failures land in the store state and are rendered below
                    let _ = store.refresh_weather(&record.name).await;
                    render_view(&store.view().await);
                }
                None => println!("Nothing to refresh"),
            },
            Command::Forecast => match store.current().await {
                Some(record) => match store.fetch_forecast(&record.name).await {
                    Ok(days) => render_forecast(&days),
                    Err(e) => println!("{}", e.user_message()),
                },
                None => println!("Search for a city first"),
            },
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
            Command::Unknown(line) => println!("Unknown command: {line}"),
        }
    }

    info!("Weather search stopped");
    Ok(())
}

async fn show(input: &SearchInput, store: &WeatherStore) {
    let snapshot = input.snapshot().await;
    let mode = if snapshot.using_location { " (current location)" } else { "" };
    println!("Search: \"{}\"{}", snapshot.value, mode);
    if snapshot.loading_suggestions {
        println!("  looking up suggestions...");
    }
    if snapshot.show_suggestions {
        for (i, suggestion) in snapshot.suggestions.iter().enumerate() {
            println!("  {}. {}", i + 1, suggestion.display_name());
        }
    }
    render_view(&store.view().await);
}

fn render_view(view: &WeatherView) {
    match view {
        WeatherView::Empty => println!("No city selected"),
        WeatherView::Loading => println!("Loading weather data..."),
        WeatherView::Success(record) => render_record(record),
        WeatherView::Failure(error) => println!("{}", error.user_message()),
    }
}

fn render_record(record: &WeatherRecord) {
    println!(
        "{}: {} (feels like {}), {}",
        record.name,
        format_temperature(record.temperature),
        format_temperature(record.feels_like),
        record.condition.description
    );
    println!(
        "  humidity {}%, pressure {} hPa, wind {} m/s",
        record.humidity, record.pressure, record.wind_speed
    );
}

fn render_forecast(days: &[ForecastDay]) {
    for day in days {
        println!(
            "{}  {} / {}  {}",
            day.timestamp.format("%a"),
            format_temperature(day.min_temp),
            format_temperature(day.max_temp),
            day.condition.description
        );
    }
}

fn render_recent(recent: &[String]) {
    if recent.is_empty() {
        println!("No recent searches");
    }
    for (i, city) in recent.iter().enumerate() {
        println!("{}. {}", i + 1, city);
    }
}

async fn shutdown_signal(cancellation_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT, shutting down...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        },
    }

    cancellation_token.cancel();
}
