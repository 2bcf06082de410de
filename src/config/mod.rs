/// Database connection and schema creation
pub mod database;

/// Runtime settings from config.toml and the environment
pub mod settings;

pub use settings::{AppConfig, load_app_configuration};
