//! # Replication Engine Crate
//!
//! The interface between a database session and the replication engine that
//! keeps the local database file durable.
//!
//! ## Architectural Principles
//!
//! - **Collaborator Boundary:** The session only talks to the engine through the
//!   `EngineFactory`, `ReplicationEngine` and `Replica` traits, so engines backed
//!   by different replica stores (or test doubles) can be swapped in.
//! - **Cancellable I/O:** Every call that touches a replica receives a
//!   `core_types::Context` and must return promptly once it is done.
//!
//! ## Public API
//!
//! - `EngineFactory` / `ReplicationEngine` / `Replica`: the collaborator traits.
//! - `RestoreOptions`: what to restore and where to write it.
//! - `Generation`: an identifier for one replication history.
//! - `LocalEngine` / `LocalEngineFactory`: a snapshot engine for `file` replicas.
//! - `EngineError`: the specific error types that can be returned from this crate.

use async_trait::async_trait;
use core_types::Context;
use replica::ReplicaClientConfig;
use std::path::{Path, PathBuf};

pub mod error;
pub mod generation;
pub mod local;

// --- Public API ---
pub use error::EngineError;
pub use generation::Generation;
pub use local::{LocalEngine, LocalEngineFactory, LocalReplica};

/// Parameters for locating and applying a restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreOptions {
    /// Where the restored database file is written.
    pub output_path: PathBuf,
    /// Driver identity the restored file will be opened with.
    pub engine_identity: String,
    /// Generation to restore. `None` asks for the latest one.
    pub generation: Option<Generation>,
}

impl RestoreOptions {
    pub fn new(output_path: impl Into<PathBuf>, engine_identity: impl Into<String>) -> Self {
        Self {
            output_path: output_path.into(),
            engine_identity: engine_identity.into(),
            generation: None,
        }
    }
}

/// A remote target to which database changes are shipped.
#[async_trait]
pub trait Replica: Send + Sync {
    fn name(&self) -> &str;

    /// Path of the local database this replica belongs to.
    fn db_path(&self) -> &Path;

    /// Resolves the generation a restore with `opts` would use.
    ///
    /// Returns `Ok(None)` when the replica holds no generation at all.
    async fn calculate_restore_target(
        &self,
        ctx: &Context,
        opts: &RestoreOptions,
    ) -> Result<Option<Generation>, EngineError>;

    /// Writes the database from `opts.generation` to `opts.output_path`.
    async fn restore(&self, ctx: &Context, opts: &RestoreOptions) -> Result<(), EngineError>;
}

/// One replication-engine instance, bound to a single local database file.
#[async_trait]
pub trait ReplicationEngine: Send + Sync {
    fn path(&self) -> &Path;

    fn set_engine_identity(&mut self, identity: &str);

    fn attach_replica(&mut self, name: &str, client: ReplicaClientConfig) -> Result<(), EngineError>;

    fn replica(&self, name: &str) -> Option<&dyn Replica>;

    /// Makes the local file consistent and starts replicating it.
    async fn open(&mut self) -> Result<(), EngineError>;

    /// Flushes pending work to the replicas and stops the engine.
    async fn soft_close(&mut self, ctx: &Context) -> Result<(), EngineError>;
}

/// Creates engine instances for a session.
pub trait EngineFactory: Send + Sync {
    fn new_instance(&self, path: &Path) -> Box<dyn ReplicationEngine>;
}
