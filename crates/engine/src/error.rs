use crate::generation::Generation;
use core_types::ContextError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Replica '{replica}' uses a {kind} client, which this engine cannot drive.")]
    UnsupportedClient { replica: String, kind: &'static str },

    #[error("A replica named '{0}' is already attached.")]
    DuplicateReplica(String),

    #[error("No replica named '{0}' is attached.")]
    UnknownReplica(String),

    #[error("Generation '{0}' was not found on the replica.")]
    GenerationNotFound(Generation),

    #[error("A restore requires a generation, but none was given.")]
    NoGeneration,

    #[error("Refusing to restore over existing file {0}.")]
    OutputExists(PathBuf),
}

impl EngineError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| EngineError::Io { path, source }
    }
}
