mod config;
mod logging;
pub mod models;

pub use config::{AppConfig, DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_TTL};
pub use logging::init_tracing;
