use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// The TOML file or a `REPLIDB_*` variable could not be read or parsed.
    #[error("Failed to load settings from the config file or REPLIDB_* environment: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Invalid target configuration: {0}")]
    ValidationError(String),
}
