/// Database configuration and connection management
pub mod database;

/// Ledger settings and owner seeds loaded from config.toml
pub mod settings;
