use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
#[cfg(feature = "clap")]
pub mod args;
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
#[cfg(feature = "clap")]
pub use args::TargetArgs;
pub use settings::{
    Config, DEFAULT_ENGINE_IDENTITY, DEFAULT_MAX_CONNECTIONS, ENV_LITESTREAM_ACCESS_KEY_ID,
    ENV_LITESTREAM_SECRET_ACCESS_KEY, ENV_LITESTREAM_URL, Settings, credentials_from_lookup,
};

/// Name of the optional configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "replidb";

/// Prefix of the environment variables that override file settings,
/// e.g. `REPLIDB_REMOTE`.
pub const ENV_PREFIX: &str = "REPLIDB";

/// Reads the layered [`Settings`] without resolving them.
///
/// Sources, lowest precedence first: the TOML file at `file` (or an optional
/// `replidb.toml` in the working directory), then `REPLIDB_*` environment
/// variables. `LITESTREAM_*` variables are applied later by
/// [`Settings::into_config`].
pub fn load_settings(file: Option<&Path>) -> Result<Settings, ConfigError> {
    let file_source = match file {
        Some(path) => config::File::from(path),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let settings = config::Config::builder()
        .add_source(file_source)
        .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
        .build()?
        .try_deserialize::<Settings>()?;

    tracing::debug!(?settings, "configuration loaded");
    Ok(settings)
}
