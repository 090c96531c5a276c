use crate::error::ConfigError;
use crate::settings::{Config, Settings};
use std::path::PathBuf;

/// Command-line flags that select a database and its replica.
///
/// Flags override the configuration file and `REPLIDB_*` variables.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct TargetArgs {
    /// Path of the local database file.
    pub path: Option<PathBuf>,

    /// Replica descriptor, e.g. `s3://bucket/prefix` or `file:/backups/app`.
    /// Defaults to $LITESTREAM_URL.
    #[arg(long)]
    pub remote: Option<String>,

    /// Driver used to open the database file.
    #[arg(long)]
    pub engine_identity: Option<String>,

    /// Maximum number of pooled connections.
    #[arg(long)]
    pub max_connections: Option<u32>,

    /// Configuration file (TOML). Defaults to an optional `replidb.toml`.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl TargetArgs {
    /// Layers the flags over the loaded settings and resolves a [`Config`].
    pub fn resolve(self) -> Result<Config, ConfigError> {
        let loaded = crate::load_settings(self.config.as_deref())?;
        let settings = Settings {
            path: self.path.or(loaded.path),
            remote: self.remote.or(loaded.remote),
            engine_identity: self.engine_identity.or(loaded.engine_identity),
            max_connections: self.max_connections.or(loaded.max_connections),
        };
        settings.into_config(|key| std::env::var(key).ok())
    }
}
