//! A snapshot-based engine for replicas kept in a local directory.
//!
//! Replica layout:
//!
//! ```text
//! <root>/generations/<generation>/snapshot.db
//! ```
//!
//! Each `open` starts a new generation and each `soft_close` writes the
//! current database file into it. The latest generation with a snapshot is
//! the restore target. Snapshots are taken from the main database file only,
//! so the database must be closed (and its WAL checkpointed) before
//! `soft_close` runs.

use crate::error::EngineError;
use crate::generation::Generation;
use crate::{EngineFactory, Replica, ReplicationEngine, RestoreOptions};
use async_trait::async_trait;
use core_types::Context;
use replica::ReplicaClientConfig;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

const GENERATIONS_DIR: &str = "generations";
const SNAPSHOT_FILE: &str = "snapshot.db";
const TEMP_PREFIX: &str = ".replidb-";

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalEngineFactory;

impl EngineFactory for LocalEngineFactory {
    fn new_instance(&self, path: &Path) -> Box<dyn ReplicationEngine> {
        Box::new(LocalEngine::new(path))
    }
}

#[derive(Debug)]
pub struct LocalEngine {
    path: PathBuf,
    engine_identity: String,
    replicas: Vec<LocalReplica>,
    /// Set between `open` and `soft_close`.
    generation: Option<Generation>,
}

impl LocalEngine {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            engine_identity: String::new(),
            replicas: Vec::new(),
            generation: None,
        }
    }

    pub fn engine_identity(&self) -> &str {
        &self.engine_identity
    }

    /// The generation being written, if the engine is open.
    pub fn generation(&self) -> Option<&Generation> {
        self.generation.as_ref()
    }
}

#[async_trait]
impl ReplicationEngine for LocalEngine {
    fn path(&self) -> &Path {
        &self.path
    }

    fn set_engine_identity(&mut self, identity: &str) {
        self.engine_identity = identity.to_string();
    }

    fn attach_replica(&mut self, name: &str, client: ReplicaClientConfig) -> Result<(), EngineError> {
        if self.replicas.iter().any(|r| r.name == name) {
            return Err(EngineError::DuplicateReplica(name.to_string()));
        }
        let root = match client {
            ReplicaClientConfig::File(file) => file.path,
            other => {
                return Err(EngineError::UnsupportedClient {
                    replica: name.to_string(),
                    kind: other.kind(),
                });
            }
        };
        self.replicas.push(LocalReplica {
            name: name.to_string(),
            db_path: self.path.clone(),
            root,
        });
        Ok(())
    }

    fn replica(&self, name: &str) -> Option<&dyn Replica> {
        self.replicas
            .iter()
            .find(|r| r.name == name)
            .map(|r| r as &dyn Replica)
    }

    async fn open(&mut self) -> Result<(), EngineError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(EngineError::io(parent))?;
        }

        let generation = Generation::new();
        for replica in &self.replicas {
            let dir = replica.generation_dir(&generation);
            fs::create_dir_all(&dir).await.map_err(EngineError::io(&dir))?;
        }
        info!(path = %self.path.display(), %generation, "replication engine opened");
        self.generation = Some(generation);
        Ok(())
    }

    async fn soft_close(&mut self, ctx: &Context) -> Result<(), EngineError> {
        let Some(generation) = self.generation.take() else {
            return Ok(());
        };

        for replica in &self.replicas {
            ctx.run(replica.snapshot(&generation)).await??;
        }
        info!(path = %self.path.display(), %generation, "replication engine closed");
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct LocalReplica {
    name: String,
    db_path: PathBuf,
    root: PathBuf,
}

impl LocalReplica {
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn generations_dir(&self) -> PathBuf {
        self.root.join(GENERATIONS_DIR)
    }

    fn generation_dir(&self, generation: &Generation) -> PathBuf {
        self.generations_dir().join(generation.as_str())
    }

    fn snapshot_path(&self, generation: &Generation) -> PathBuf {
        self.generation_dir(generation).join(SNAPSHOT_FILE)
    }

    async fn has_snapshot(&self, generation: &Generation) -> Result<bool, EngineError> {
        let snapshot = self.snapshot_path(generation);
        fs::try_exists(&snapshot)
            .await
            .map_err(EngineError::io(snapshot))
    }

    async fn latest_generation(&self) -> Result<Option<Generation>, EngineError> {
        let dir = self.generations_dir();
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(EngineError::io(dir)(e)),
        };

        let mut latest: Option<Generation> = None;
        while let Some(entry) = entries.next_entry().await.map_err(EngineError::io(&dir))? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            let generation = Generation::from(name);
            if !self.has_snapshot(&generation).await? {
                debug!(%generation, "skipping generation without snapshot");
                continue;
            }
            if latest.as_ref().is_none_or(|l| generation > *l) {
                latest = Some(generation);
            }
        }
        Ok(latest)
    }

    async fn resolve_target(&self, opts: &RestoreOptions) -> Result<Option<Generation>, EngineError> {
        match &opts.generation {
            Some(generation) if self.has_snapshot(generation).await? => Ok(Some(generation.clone())),
            Some(generation) => Err(EngineError::GenerationNotFound(generation.clone())),
            None => self.latest_generation().await,
        }
    }

    async fn restore_into(&self, generation: &Generation, output: &Path) -> Result<(), EngineError> {
        if fs::try_exists(output).await.map_err(EngineError::io(output))? {
            return Err(EngineError::OutputExists(output.to_path_buf()));
        }
        if !self.has_snapshot(generation).await? {
            return Err(EngineError::GenerationNotFound(generation.clone()));
        }
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(EngineError::io(parent))?;
        }
        copy_atomic(&self.snapshot_path(generation), output).await?;
        info!(replica = %self.name, %generation, output = %output.display(), "replica restored");
        Ok(())
    }

    /// Copies the local database into `generation`.
    async fn snapshot(&self, generation: &Generation) -> Result<(), EngineError> {
        if !fs::try_exists(&self.db_path)
            .await
            .map_err(EngineError::io(&self.db_path))?
        {
            debug!(path = %self.db_path.display(), "no database file to snapshot");
            return Ok(());
        }

        let dir = self.generation_dir(generation);
        fs::create_dir_all(&dir).await.map_err(EngineError::io(&dir))?;
        copy_atomic(&self.db_path, &self.snapshot_path(generation)).await?;
        info!(replica = %self.name, %generation, "snapshot written");
        Ok(())
    }
}

#[async_trait]
impl Replica for LocalReplica {
    fn name(&self) -> &str {
        &self.name
    }

    fn db_path(&self) -> &Path {
        &self.db_path
    }

    async fn calculate_restore_target(
        &self,
        ctx: &Context,
        opts: &RestoreOptions,
    ) -> Result<Option<Generation>, EngineError> {
        ctx.run(self.resolve_target(opts)).await?
    }

    async fn restore(&self, ctx: &Context, opts: &RestoreOptions) -> Result<(), EngineError> {
        let generation = opts.generation.as_ref().ok_or(EngineError::NoGeneration)?;
        ctx.run(self.restore_into(generation, &opts.output_path)).await?
    }
}

/// Copies `from` to `to` through a temporary file in the same directory, so
/// `to` is either absent or complete.
///
/// The temporary file is unlinked if the copy fails or this future is dropped
/// mid-copy, e.g. when its context expires.
async fn copy_atomic(from: &Path, to: &Path) -> Result<(), EngineError> {
    let dir = to
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let tmp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile_in(dir)
        .map_err(EngineError::io(dir))?;

    // Write through the open handle so nothing recreates the path after the
    // temporary file is dropped.
    let mut src = fs::File::open(from).await.map_err(EngineError::io(from))?;
    let handle = tmp.as_file().try_clone().map_err(EngineError::io(tmp.path()))?;
    let mut dst = fs::File::from_std(handle);
    tokio::io::copy(&mut src, &mut dst)
        .await
        .map_err(EngineError::io(from))?;
    dst.sync_all().await.map_err(EngineError::io(tmp.path()))?;

    tmp.persist(to).map_err(|e| EngineError::io(to)(e.error))?;
    Ok(())
}
