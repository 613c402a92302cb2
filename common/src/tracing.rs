use tracing_subscriber::fmt::layer;
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_DIRECTIVES: &str = "info,hyper=warn,reqwest=warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Initialize tracing with structured JSON output
pub fn init_tracing() {
    let _ = Registry::default()
        .with(env_filter())
        .with(layer().json())
        .try_init();
}

/// Initialize tracing with pretty output for interactive use.
///
/// Logs go to stderr so they never interleave with rendered results on stdout.
pub fn init_tracing_pretty() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .try_init();
}
