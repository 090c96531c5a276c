use crate::connection::{check_engine_identity, open_database};
use crate::error::SessionError;
use crate::restore::restore_if_needed;
use configuration::Config;
use core_types::Context;
use engine::{EngineError, EngineFactory, LocalEngineFactory, ReplicationEngine};
use replica::ConnectionParams;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where a session is in its lifecycle.
enum SessionState {
    Unopened,
    LocalOnly(SqlitePool),
    Replicated(SqlitePool, Box<dyn ReplicationEngine>),
    Closed,
}

impl SessionState {
    fn name(&self) -> &'static str {
        match self {
            SessionState::Unopened => "unopened",
            SessionState::LocalOnly(_) | SessionState::Replicated(..) => "open",
            SessionState::Closed => "closed",
        }
    }
}

/// Owns a local database and, when a replica is configured, the replication
/// engine that keeps it durable.
///
/// A session is opened and closed exactly once. Both transitions take
/// `&mut self`, so a session cannot be opened and closed concurrently.
pub struct Session {
    config: Config,
    factory: Arc<dyn EngineFactory>,
    state: SessionState,
}

impl Session {
    /// Creates a session that replicates through the built-in local engine.
    pub fn new(config: Config) -> Self {
        Self::with_engine(config, Arc::new(LocalEngineFactory))
    }

    /// Creates a session whose replication engines come from `factory`.
    pub fn with_engine(config: Config, factory: Arc<dyn EngineFactory>) -> Self {
        Self {
            config,
            factory,
            state: SessionState::Unopened,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        matches!(
            self.state,
            SessionState::LocalOnly(_) | SessionState::Replicated(..)
        )
    }

    /// True while a replication engine is running for this session.
    pub fn is_replicated(&self) -> bool {
        matches!(self.state, SessionState::Replicated(..))
    }

    /// Opens the database, restoring it from the replica first if needed.
    ///
    /// When a replica is configured, the replication engine is opened before
    /// the database, so the returned pool never points at a file that is still
    /// being restored. `ctx` bounds the restore and the engine open.
    pub async fn open(&mut self, ctx: &Context) -> Result<SqlitePool, SessionError> {
        if !matches!(self.state, SessionState::Unopened) {
            return Err(SessionError::InvalidState {
                state: self.state.name(),
                operation: "open",
            });
        }
        self.config.validate()?;
        check_engine_identity(self.config.engine_identity())?;

        let engine = match self.config.remote() {
            Some(descriptor) => Some(self.replicate(ctx, descriptor).await?),
            None => None,
        };

        let pool = match open_database(&self.config).await {
            Ok(pool) => pool,
            Err(err) => {
                if let Some(mut engine) = engine {
                    if let Err(close_err) = soft_close(ctx, engine.as_mut()).await {
                        warn!(error = %close_err, "failed to stop replication after database open failed");
                    }
                }
                return Err(err);
            }
        };

        let handle = pool.clone();
        self.state = match engine {
            Some(engine) => SessionState::Replicated(pool, engine),
            None => SessionState::LocalOnly(pool),
        };
        Ok(handle)
    }

    /// Attaches the configured replica, restores if needed and opens the engine.
    async fn replicate(
        &self,
        ctx: &Context,
        descriptor: &str,
    ) -> Result<Box<dyn ReplicationEngine>, SessionError> {
        let params = ConnectionParams::from_descriptor(descriptor, self.config.credentials())?;
        let name = params.replica_name().to_string();

        let mut engine = self.factory.new_instance(self.config.path());
        engine.set_engine_identity(self.config.engine_identity());
        engine
            .attach_replica(&name, params.client)
            .map_err(|source| SessionError::ReplicaAttach {
                replica: name.clone(),
                source,
            })?;

        let replica = engine
            .replica(&name)
            .ok_or_else(|| SessionError::ReplicaAttach {
                replica: name.clone(),
                source: EngineError::UnknownReplica(name.clone()),
            })?;
        let outcome = restore_if_needed(ctx, replica, self.config.engine_identity()).await?;
        debug!(replica = %name, ?outcome, "restore evaluated");

        ctx.run(engine.open())
            .await?
            .map_err(|e| SessionError::from_engine(e, SessionError::EngineOpen))?;
        info!(replica = %name, path = %self.config.path().display(), "replication started");
        Ok(engine)
    }

    /// Closes the database and softly stops the replication engine.
    ///
    /// The database is closed first so its WAL is checkpointed before the
    /// engine flushes. Both steps always run; a failure is logged and the
    /// engine's error returned. Closing a session that is not open does nothing.
    pub async fn close(&mut self, ctx: &Context) -> Result<(), SessionError> {
        let (pool, engine) = match std::mem::replace(&mut self.state, SessionState::Closed) {
            SessionState::LocalOnly(pool) => (pool, None),
            SessionState::Replicated(pool, engine) => (pool, Some(engine)),
            state @ (SessionState::Unopened | SessionState::Closed) => {
                self.state = state;
                return Ok(());
            }
        };

        pool.close().await;
        debug!(path = %self.config.path().display(), "database closed");

        let Some(mut engine) = engine else {
            return Ok(());
        };
        soft_close(ctx, engine.as_mut()).await.inspect_err(|e| {
            warn!(error = %e, "failed to soft-close replication engine");
        })
    }
}

async fn soft_close(ctx: &Context, engine: &mut dyn ReplicationEngine) -> Result<(), SessionError> {
    ctx.run(engine.soft_close(ctx))
        .await?
        .map_err(|e| SessionError::from_engine(e, SessionError::SoftClose))
}
