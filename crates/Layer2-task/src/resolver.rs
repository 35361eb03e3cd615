//! Status resolver - the fetch path
//!
//! Turns a status record into the string shown to the client. A "DONE"
//! record is delivered once and then removed; "ERROR" records stay until a
//! new launch supersedes them; everything else is passed through untouched.

use crate::error::Result;
use crate::registry::{TaskDef, TaskRegistry};
use crate::state::{TaskStatus, STATUS_IDLE};
use crate::store::StatusStore;
use crate::task::SessionId;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fetch-path handler
pub struct StatusResolver {
    registry: Arc<TaskRegistry>,
    store: Arc<StatusStore>,
}

impl StatusResolver {
    pub fn new(registry: Arc<TaskRegistry>, store: Arc<StatusStore>) -> Self {
        Self { registry, store }
    }

    /// Current status of `task` for `session`
    pub fn fetch(&self, task: &str, session: SessionId) -> Result<String> {
        let def = self.registry.lookup(task)?;

        // DONE를 두 번 내주지 않도록 확인과 삭제를 묶는다
        let _guard = self.store.lock();

        if !self.store.has(def.task, session) {
            return Ok(STATUS_IDLE.to_string());
        }

        let raw = self.store.get(def.task, session);
        match TaskStatus::parse(&raw) {
            TaskStatus::Done(_) => Ok(self.deliver(def, session, raw)),
            status => {
                debug!("{} for session {} is {}: {}", def.name(), session, status, raw);
                Ok(raw)
            }
        }
    }

    /// Remove a finished record and turn it into the client-facing message.
    ///
    /// Another process may fetch the same key at the same time; only the
    /// caller whose removal wins reports DONE, the other sees IDLE.
    fn deliver(&self, def: &TaskDef, session: SessionId, raw: String) -> String {
        let taken = match self.store.remove(def.task, session) {
            Ok(Some(taken)) => taken,
            Ok(None) => {
                debug!("{} for session {} already delivered", def.name(), session);
                return STATUS_IDLE.to_string();
            }
            Err(e) => {
                warn!(
                    "Failed to remove finished {} record for session {}: {}",
                    def.name(),
                    session,
                    e
                );
                raw
            }
        };

        match TaskStatus::parse(&taken) {
            TaskStatus::Done(None) => {
                let message = def.done_message(session);
                info!("{} finished for session {}: {}", def.name(), session, message);
                message
            }
            TaskStatus::Done(Some(_)) => {
                info!("{} finished for session {}: {}", def.name(), session, taken);
                taken
            }
            _ => {
                // 읽은 뒤 다른 프로세스가 새로 예약함 - 되돌려 놓는다
                if let Err(e) = self.store.write(def.task, session, &taken) {
                    warn!(
                        "Could not restore {} record for session {}: {}",
                        def.name(),
                        session,
                        e
                    );
                }
                self.store.get(def.task, session)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::task::TaskType;

    fn resolver() -> (tempfile::TempDir, Arc<StatusStore>, StatusResolver) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(StatusStore::new(dir.path()));
        let resolver = StatusResolver::new(Arc::new(TaskRegistry::builtin()), Arc::clone(&store));
        (dir, store, resolver)
    }

    #[test]
    fn test_idle_is_stable() {
        let (_dir, _store, resolver) = resolver();
        for _ in 0..3 {
            assert_eq!(resolver.fetch("cpuflamegraph", SessionId(1)).unwrap(), "IDLE");
        }
    }

    #[test]
    fn test_done_synthesized_once() {
        let (_dir, store, resolver) = resolver();
        store.write(TaskType::CpuFlamegraph, SessionId(8), "DONE").unwrap();

        assert_eq!(
            resolver.fetch("cpuflamegraph", SessionId(8)).unwrap(),
            "DONE cpuflamegraph/cpuflamegraph.8.svg"
        );
        assert!(!store.has(TaskType::CpuFlamegraph, SessionId(8)));
        assert_eq!(resolver.fetch("cpuflamegraph", SessionId(8)).unwrap(), "IDLE");
    }

    #[test]
    fn test_done_verbatim_policy() {
        let (_dir, store, resolver) = resolver();
        store
            .write(TaskType::DiskLatencyHeatmap, SessionId(2), "DONE")
            .unwrap();

        assert_eq!(
            resolver.fetch("disklatencyheatmap", SessionId(2)).unwrap(),
            "DONE"
        );
        assert_eq!(
            resolver.fetch("disklatencyheatmap", SessionId(2)).unwrap(),
            "IDLE"
        );
    }

    #[test]
    fn test_done_with_argument_returned_verbatim() {
        let (_dir, store, resolver) = resolver();
        store
            .write(TaskType::JstackFlamegraph, SessionId(2), "DONE jstack/j.2.svg")
            .unwrap();
        store
            .write(TaskType::CpuFlamegraph, SessionId(2), "DONE custom.svg")
            .unwrap();

        assert_eq!(
            resolver.fetch("jstackflamegraph", SessionId(2)).unwrap(),
            "DONE jstack/j.2.svg"
        );
        assert_eq!(
            resolver.fetch("cpuflamegraph", SessionId(2)).unwrap(),
            "DONE custom.svg"
        );
        assert!(!store.has(TaskType::JstackFlamegraph, SessionId(2)));
        assert!(!store.has(TaskType::CpuFlamegraph, SessionId(2)));
    }

    #[test]
    fn test_error_is_durable() {
        let (_dir, store, resolver) = resolver();
        store
            .write(TaskType::JstackFlamegraph, SessionId(4), "ERROR disk full")
            .unwrap();

        for _ in 0..3 {
            assert_eq!(
                resolver.fetch("jstackflamegraph", SessionId(4)).unwrap(),
                "ERROR disk full"
            );
        }
        assert!(store.has(TaskType::JstackFlamegraph, SessionId(4)));
    }

    #[test]
    fn test_progress_untouched() {
        let (_dir, store, resolver) = resolver();
        store
            .write(TaskType::IpcFlamegraph, SessionId(1), "profiling 50%")
            .unwrap();

        for _ in 0..3 {
            assert_eq!(
                resolver.fetch("ipcflamegraph", SessionId(1)).unwrap(),
                "profiling 50%"
            );
        }
        assert!(store.has(TaskType::IpcFlamegraph, SessionId(1)));
    }

    #[test]
    fn test_empty_record_is_unknown() {
        let (_dir, store, resolver) = resolver();
        let path = store.path_for(TaskType::CswFlamegraph, SessionId(1));
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "").unwrap();

        assert_eq!(
            resolver.fetch("cswflamegraph", SessionId(1)).unwrap(),
            "UNKNOWN"
        );
        assert!(store.has(TaskType::CswFlamegraph, SessionId(1)));
    }

    #[test]
    fn test_other_sessions_unaffected() {
        let (_dir, store, resolver) = resolver();
        store.write(TaskType::CpuFlamegraph, SessionId(1), "DONE").unwrap();
        store.write(TaskType::CpuFlamegraph, SessionId(2), "DONE").unwrap();

        resolver.fetch("cpuflamegraph", SessionId(1)).unwrap();
        assert!(store.has(TaskType::CpuFlamegraph, SessionId(2)));
    }

    #[test]
    fn test_done_delivered_once_across_stores() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(TaskRegistry::builtin());
        StatusStore::new(dir.path())
            .write(TaskType::CpuFlamegraph, SessionId(6), "DONE")
            .unwrap();

        // no shared lock between the two, as with two front-end processes
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let resolver = StatusResolver::new(
                    Arc::clone(&registry),
                    Arc::new(StatusStore::new(dir.path())),
                );
                std::thread::spawn(move || resolver.fetch("cpuflamegraph", SessionId(6)).unwrap())
            })
            .collect();

        let mut results: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        results.sort();
        assert_eq!(
            results,
            vec![
                "DONE cpuflamegraph/cpuflamegraph.6.svg".to_string(),
                "IDLE".to_string()
            ]
        );
    }

    #[test]
    fn test_unknown_task() {
        let (_dir, _store, resolver) = resolver();
        assert!(matches!(
            resolver.fetch("nosuchtask", SessionId(1)),
            Err(TaskError::InvalidKey(_))
        ));
    }
}
