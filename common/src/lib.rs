//! Shared models, errors and plumbing for the weather search workspace.

pub mod errors;
pub mod http_client;
pub mod models;
pub mod temperature;
pub mod tracing;
