//! Task Manager - the entry point the collector framework calls into
//!
//! Features:
//! - `store` / `fetch` verbs for every registered task type
//! - Per-session container tags forwarded to that session's workers
//! - Cleanup of records left by a previous process

use crate::dispatcher::{Accepted, LaunchDispatcher};
use crate::error::Result;
use crate::executor::{DetachedLauncher, Launcher};
use crate::registry::TaskRegistry;
use crate::resolver::StatusResolver;
use crate::store::StatusStore;
use crate::task::SessionId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use vector_foundation::VectorConfig;

/// Task Manager - owns the store, registry and both request paths
pub struct TaskManager {
    registry: Arc<TaskRegistry>,
    store: Arc<StatusStore>,
    dispatcher: LaunchDispatcher,
    resolver: StatusResolver,

    /// Container tag per session
    namespaces: RwLock<HashMap<SessionId, String>>,
}

impl TaskManager {
    /// Create a manager with the built-in catalog and a detached launcher
    pub fn new(config: &VectorConfig) -> Self {
        Self::with_launcher(config, Arc::new(DetachedLauncher::new()))
    }

    /// Create with a custom launcher
    pub fn with_launcher(config: &VectorConfig, launcher: Arc<dyn Launcher>) -> Self {
        Self::with_parts(config, TaskRegistry::builtin(), launcher)
    }

    /// Create with a custom registry and launcher
    pub fn with_parts(
        config: &VectorConfig,
        registry: TaskRegistry,
        launcher: Arc<dyn Launcher>,
    ) -> Self {
        let registry = Arc::new(registry);
        let store = Arc::new(StatusStore::new(&config.working_dir));

        Self {
            dispatcher: LaunchDispatcher::new(
                Arc::clone(&registry),
                Arc::clone(&store),
                launcher,
                &config.script_dir,
            ),
            resolver: StatusResolver::new(Arc::clone(&registry), Arc::clone(&store)),
            registry,
            store,
            namespaces: RwLock::new(HashMap::new()),
        }
    }

    /// Launch `task` for `session`
    pub fn store(&self, task: &str, session: SessionId, argument: Option<&str>) -> Result<Accepted> {
        let namespace = self.namespace(session);
        self.dispatcher
            .store(task, session, argument, namespace.as_deref())
    }

    /// Current status of `task` for `session`
    pub fn fetch(&self, task: &str, session: SessionId) -> Result<String> {
        self.resolver.fetch(task, session)
    }

    /// Bind a container tag to a session; an empty tag removes the binding
    pub fn bind_namespace(&self, session: SessionId, tag: &str) {
        if tag.is_empty() {
            self.unbind_namespace(session);
            return;
        }
        debug!("Session {} bound to container {}", session, tag);
        self.namespaces.write().insert(session, tag.to_string());
    }

    pub fn unbind_namespace(&self, session: SessionId) {
        if self.namespaces.write().remove(&session).is_some() {
            debug!("Session {} unbound from container", session);
        }
    }

    /// Container tag bound to a session, if any
    pub fn namespace(&self, session: SessionId) -> Option<String> {
        self.namespaces.read().get(&session).cloned()
    }

    /// Forget per-session state when the client goes away.
    ///
    /// Status records are left alone; a worker may still be writing them.
    pub fn end_session(&self, session: SessionId) {
        self.unbind_namespace(session);
    }

    /// Remove every status record under the working directory.
    ///
    /// Only safe before any request is served; in-flight runs lose their
    /// reservation and undelivered results are dropped.
    pub fn clear_stale(&self) -> usize {
        let removed = self.store.clear_all();
        info!(
            "Removed {} stale status record(s) under {}",
            removed,
            self.store.root().display()
        );
        removed
    }

    /// Get the registry
    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// Get the status store
    pub fn status_store(&self) -> &StatusStore {
        &self.store
    }
}
