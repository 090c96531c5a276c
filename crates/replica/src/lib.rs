//! # Replica Crate
//!
//! Turns a replica descriptor string into the connection parameters a
//! replication engine needs to reach its replica.
//!
//! ## Public API
//!
//! - `parse_replica_url`: splits a descriptor into scheme, host and path.
//! - `clean_path`: purely lexical path normalisation used by the parser.
//! - `parse_host`: decodes an object-store host into bucket, region and endpoint.
//! - `ConnectionParams`: the fully resolved parameters, including the replica
//!   client settings (`ReplicaClientConfig`).
//! - `DescriptorError`: the errors a descriptor can be rejected with.

pub mod client;
pub mod descriptor;
pub mod error;
pub mod host;
pub mod path;

// --- Public API ---
pub use client::{ConnectionParams, FileClientConfig, ReplicaClientConfig, S3ClientConfig};
pub use descriptor::{FILE_SCHEME, ReplicaUrl, S3_SCHEME, parse_replica_url};
pub use error::DescriptorError;
pub use host::{S3Host, parse_host};
pub use path::clean_path;
