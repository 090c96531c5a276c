use crate::descriptor::ReplicaUrl;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DescriptorError {
    #[error("invalid replica url {raw:?}: {source}")]
    Syntax {
        raw: String,
        #[source]
        source: url::ParseError,
    },

    /// Carries whatever host and path could be read from the descriptor.
    #[error("replica url scheme required: {raw}")]
    MissingScheme { raw: String, partial: ReplicaUrl },

    #[error("replica url bucket required: {raw}")]
    MissingBucket { raw: String },

    #[error("unsupported replica url scheme {scheme:?}: {raw}")]
    UnsupportedScheme { raw: String, scheme: String },
}
