/// Database connection and schema creation for the snapshot cache
pub mod database;

/// Ledger settings from config.toml, `.env` and the environment
pub mod settings;
