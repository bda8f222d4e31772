/// Database configuration and connection management
pub mod database;

/// Farm and cost settings loading from config.toml
pub mod settings;
