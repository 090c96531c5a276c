//! Recording test doubles for the replication-engine traits.

#![allow(dead_code)]

use async_trait::async_trait;
use core_types::Context;
use engine::{EngineError, EngineFactory, Generation, Replica, ReplicationEngine, RestoreOptions};
use replica::ReplicaClientConfig;
use std::future::pending;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    NewInstance(PathBuf),
    SetEngineIdentity(String),
    Attach(String, &'static str),
    Lookup,
    Restore(Option<Generation>),
    Open,
    SoftClose,
}

/// How the mock engine behaves.
#[derive(Debug, Clone, Default)]
pub struct Script {
    pub generation: Option<Generation>,
    pub fail_lookup: bool,
    pub hang_lookup: bool,
    pub fail_restore: bool,
    pub hang_restore: bool,
    pub fail_open: bool,
    pub hang_open: bool,
    pub fail_soft_close: bool,
    pub hang_soft_close: bool,
}

pub type Calls = Arc<Mutex<Vec<Call>>>;

pub struct MockFactory {
    pub calls: Calls,
    pub script: Script,
}

impl MockFactory {
    pub fn new(script: Script) -> (Arc<Self>, Calls) {
        let calls = Calls::default();
        let factory = Arc::new(Self {
            calls: calls.clone(),
            script,
        });
        (factory, calls)
    }
}

impl EngineFactory for MockFactory {
    fn new_instance(&self, path: &Path) -> Box<dyn ReplicationEngine> {
        record(&self.calls, Call::NewInstance(path.to_path_buf()));
        Box::new(MockEngine {
            path: path.to_path_buf(),
            calls: self.calls.clone(),
            script: self.script.clone(),
            replica: None,
        })
    }
}

pub struct MockEngine {
    path: PathBuf,
    calls: Calls,
    script: Script,
    replica: Option<MockReplica>,
}

#[async_trait]
impl ReplicationEngine for MockEngine {
    fn path(&self) -> &Path {
        &self.path
    }

    fn set_engine_identity(&mut self, identity: &str) {
        record(&self.calls, Call::SetEngineIdentity(identity.to_string()));
    }

    fn attach_replica(&mut self, name: &str, client: ReplicaClientConfig) -> Result<(), EngineError> {
        record(&self.calls, Call::Attach(name.to_string(), client.kind()));
        self.replica = Some(MockReplica::new(
            name,
            &self.path,
            self.calls.clone(),
            self.script.clone(),
        ));
        Ok(())
    }

    fn replica(&self, name: &str) -> Option<&dyn Replica> {
        self.replica
            .as_ref()
            .filter(|r| r.name == name)
            .map(|r| r as &dyn Replica)
    }

    async fn open(&mut self) -> Result<(), EngineError> {
        record(&self.calls, Call::Open);
        if self.script.hang_open {
            pending::<()>().await;
        }
        if self.script.fail_open {
            return Err(EngineError::UnknownReplica("engine open failure".to_string()));
        }
        Ok(())
    }

    async fn soft_close(&mut self, _ctx: &Context) -> Result<(), EngineError> {
        record(&self.calls, Call::SoftClose);
        if self.script.hang_soft_close {
            pending::<()>().await;
        }
        if self.script.fail_soft_close {
            return Err(EngineError::UnknownReplica("soft close failure".to_string()));
        }
        Ok(())
    }
}

pub struct MockReplica {
    name: String,
    db_path: PathBuf,
    calls: Calls,
    script: Script,
}

impl MockReplica {
    pub fn new(name: &str, db_path: &Path, calls: Calls, script: Script) -> Self {
        Self {
            name: name.to_string(),
            db_path: db_path.to_path_buf(),
            calls,
            script,
        }
    }
}

#[async_trait]
impl Replica for MockReplica {
    fn name(&self) -> &str {
        &self.name
    }

    fn db_path(&self) -> &Path {
        &self.db_path
    }

    async fn calculate_restore_target(
        &self,
        _ctx: &Context,
        _opts: &RestoreOptions,
    ) -> Result<Option<Generation>, EngineError> {
        record(&self.calls, Call::Lookup);
        if self.script.hang_lookup {
            pending::<()>().await;
        }
        if self.script.fail_lookup {
            return Err(EngineError::UnknownReplica("lookup failure".to_string()));
        }
        Ok(self.script.generation.clone())
    }

    async fn restore(&self, _ctx: &Context, opts: &RestoreOptions) -> Result<(), EngineError> {
        record(&self.calls, Call::Restore(opts.generation.clone()));
        if self.script.hang_restore {
            pending::<()>().await;
        }
        if self.script.fail_restore {
            return Err(EngineError::NoGeneration);
        }
        // An empty file is a valid, empty SQLite database.
        tokio::fs::write(&opts.output_path, b"")
            .await
            .map_err(|source| EngineError::Io {
                path: opts.output_path.clone(),
                source,
            })
    }
}

pub fn record(calls: &Calls, call: Call) {
    calls.lock().unwrap().push(call);
}

pub fn recorded(calls: &Calls) -> Vec<Call> {
    calls.lock().unwrap().clone()
}
