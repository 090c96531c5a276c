use configuration::error::ConfigError;
use core_types::ContextError;
use engine::{EngineError, Generation};
use replica::DescriptorError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Invalid session configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid replica descriptor: {0}")]
    DescriptorSyntax(#[from] DescriptorError),

    #[error("Failed to attach replica '{replica}': {source}")]
    ReplicaAttach {
        replica: String,
        #[source]
        source: EngineError,
    },

    #[error("Failed to check for an existing database at {path}: {source}")]
    ExistenceCheck {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to look up the latest generation on the replica: {0}")]
    GenerationLookup(#[source] EngineError),

    #[error("Failed to restore generation {generation}: {source}")]
    Restore {
        generation: Generation,
        #[source]
        source: EngineError,
    },

    #[error("Failed to open the replication engine: {0}")]
    EngineOpen(#[source] EngineError),

    #[error("Unsupported engine identity '{0}'.")]
    UnsupportedEngineIdentity(String),

    #[error("Failed to open the database at {path}: {source}")]
    DatabaseOpen {
        path: PathBuf,
        #[source]
        source: sqlx::Error,
    },

    #[error("Database ping failed: {0}")]
    Ping(#[source] sqlx::Error),

    #[error("Failed to soft-close the replication engine: {0}")]
    SoftClose(#[source] EngineError),

    #[error("Operation aborted: {0}")]
    Context(#[from] ContextError),

    #[error("Cannot {operation} a session that is {state}.")]
    InvalidState {
        state: &'static str,
        operation: &'static str,
    },
}

impl SessionError {
    /// Wraps an engine failure, surfacing cancellation as `Context` regardless
    /// of which step observed it.
    pub(crate) fn from_engine(
        err: EngineError,
        wrap: impl FnOnce(EngineError) -> SessionError,
    ) -> Self {
        match err {
            EngineError::Context(e) => SessionError::Context(e),
            other => wrap(other),
        }
    }
}
