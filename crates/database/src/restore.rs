use crate::error::SessionError;
use core_types::Context;
use engine::{Generation, Replica, RestoreOptions};
use std::io::ErrorKind;
use tracing::info;

/// What [`restore_if_needed`] decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// A local database already exists; the replica was not consulted.
    LocalExists,
    /// The replica holds no generation; the application starts a fresh database.
    NoGeneration,
    /// The database was restored from this generation.
    Restored(Generation),
}

/// Restores the replica's latest generation into the local database path,
/// unless a local database already exists.
///
/// An existing local file is never overwritten. Any failure to check for it,
/// other than the file not existing, is returned as
/// [`SessionError::ExistenceCheck`].
pub async fn restore_if_needed(
    ctx: &Context,
    replica: &dyn Replica,
    engine_identity: &str,
) -> Result<RestoreOutcome, SessionError> {
    let path = replica.db_path();
    match tokio::fs::metadata(path).await {
        Ok(_) => {
            info!(path = %path.display(), "local database already exists, skipping restore");
            return Ok(RestoreOutcome::LocalExists);
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(source) => {
            return Err(SessionError::ExistenceCheck {
                path: path.to_path_buf(),
                source,
            });
        }
    }

    let mut opts = RestoreOptions::new(path, engine_identity);
    let target = ctx
        .run(replica.calculate_restore_target(ctx, &opts))
        .await?
        .map_err(|e| SessionError::from_engine(e, SessionError::GenerationLookup))?;

    let Some(generation) = target else {
        info!(replica = replica.name(), "no generation found, creating new database");
        return Ok(RestoreOutcome::NoGeneration);
    };

    info!(replica = replica.name(), %generation, "restoring replica for generation");
    opts.generation = Some(generation.clone());
    ctx.run(replica.restore(ctx, &opts))
        .await?
        .map_err(|e| {
            SessionError::from_engine(e, |source| SessionError::Restore {
                generation: generation.clone(),
                source,
            })
        })?;

    info!(path = %path.display(), %generation, "restore complete");
    Ok(RestoreOutcome::Restored(generation))
}
