use crate::error::ConfigError;
use core_types::Credentials;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default replica descriptor when none is configured explicitly.
pub const ENV_LITESTREAM_URL: &str = "LITESTREAM_URL";
pub const ENV_LITESTREAM_ACCESS_KEY_ID: &str = "LITESTREAM_ACCESS_KEY_ID";
pub const ENV_LITESTREAM_SECRET_ACCESS_KEY: &str = "LITESTREAM_SECRET_ACCESS_KEY";

pub const DEFAULT_ENGINE_IDENTITY: &str = "sqlite3";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 1;

/// Which database to open and where it is replicated to.
///
/// Built once per session, either directly with [`Config::new`] and the
/// `with_*` setters or through `TargetArgs::resolve`. Environment variables
/// are read at construction time only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    path: PathBuf,
    remote: Option<String>,
    engine_identity: String,
    credentials: Credentials,
    max_connections: u32,
}

impl Config {
    /// Creates a configuration for the database at `path`, taking the replica
    /// descriptor and credentials from the `LITESTREAM_*` environment variables.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::from_lookup(path, |key| std::env::var(key).ok())
    }

    /// Like [`Config::new`], reading variables through `lookup` instead of the
    /// process environment.
    pub fn from_lookup<F>(path: impl Into<PathBuf>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            path: path.into(),
            remote: lookup(ENV_LITESTREAM_URL).filter(|url| !url.is_empty()),
            engine_identity: DEFAULT_ENGINE_IDENTITY.to_string(),
            credentials: credentials_from_lookup(&lookup),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    /// Sets the replica descriptor. An empty descriptor disables replication.
    pub fn with_remote(mut self, descriptor: impl Into<String>) -> Self {
        let descriptor = descriptor.into();
        self.remote = (!descriptor.is_empty()).then_some(descriptor);
        self
    }

    pub fn with_engine_identity(mut self, identity: impl Into<String>) -> Self {
        self.engine_identity = identity.into();
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The raw replica descriptor, if replication is configured.
    pub fn remote(&self) -> Option<&str> {
        self.remote.as_deref()
    }

    pub fn engine_identity(&self) -> &str {
        &self.engine_identity
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn max_connections(&self) -> u32 {
        self.max_connections
    }

    /// Checks the invariants a session relies on.
    ///
    /// The replica descriptor is not parsed here; a malformed descriptor is
    /// reported when the session opens.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "database path must not be empty".to_string(),
            ));
        }
        if self.engine_identity.is_empty() {
            return Err(ConfigError::ValidationError(
                "engine identity must not be empty".to_string(),
            ));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Reads the `LITESTREAM_*` object-store credentials through `lookup`.
/// Unset variables leave the corresponding half empty.
pub fn credentials_from_lookup<F>(lookup: F) -> Credentials
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).unwrap_or_default();
    Credentials::new(
        var(ENV_LITESTREAM_ACCESS_KEY_ID),
        var(ENV_LITESTREAM_SECRET_ACCESS_KEY),
    )
}

/// Settings as they appear in `replidb.toml` or `REPLIDB_*` variables.
///
/// Every field is optional; unset fields fall back to [`Config::new`] defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    pub path: Option<PathBuf>,
    pub remote: Option<String>,
    pub engine_identity: Option<String>,
    pub max_connections: Option<u32>,
}

impl Settings {
    /// Resolves these settings into a [`Config`].
    ///
    /// An explicitly configured `remote` takes precedence over `LITESTREAM_URL`.
    pub fn into_config<F>(self, lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = self.path.ok_or_else(|| {
            ConfigError::ValidationError("database path must be set".to_string())
        })?;

        let mut config = Config::from_lookup(path, lookup);
        if let Some(remote) = self.remote {
            config = config.with_remote(remote);
        }
        if let Some(identity) = self.engine_identity {
            config = config.with_engine_identity(identity);
        }
        if let Some(max_connections) = self.max_connections {
            config = config.with_max_connections(max_connections);
        }
        Ok(config)
    }
}
