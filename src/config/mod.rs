/// Database configuration and connection management
pub mod database;

/// Application settings loaded from config.toml
pub mod settings;

pub use settings::{AppConfig, load_app_config, load_config};
