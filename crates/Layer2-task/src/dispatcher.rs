//! Launch dispatcher - the store path
//!
//! Decides whether a new run may start for a (task type, session) key and,
//! if so, reserves the key and hands the worker to a [`Launcher`].
//!
//! ```text
//! store(task, session, arg)
//!   ├─ lookup ─────────────── InvalidKey
//!   ├─ validate(arg) ──────── InvalidArgument
//!   ├─ reserve key
//!   │    ├─ created ───────── launch
//!   │    └─ exists
//!   │         ├─ in flight ── Busy
//!   │         └─ terminal ─── overwrite with REQUESTED, launch
//!   └─ launch failure ─────── logged, record set to ERROR, still Accepted
//! ```

use crate::error::{Result, TaskError};
use crate::executor::{LaunchSpec, Launcher};
use crate::registry::{TaskDef, TaskRegistry};
use crate::state::{TaskStatus, STATUS_ERROR, STATUS_REQUESTED};
use crate::store::{Reservation, StatusStore};
use crate::task::{SessionId, TaskType};
use crate::validate::validate;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use vector_foundation::{ENV_PCP_CONTAINER_NAME, ENV_PCP_CONTEXT, ENV_WORKING_DIR};

/// A store request that was accepted.
///
/// Acceptance means the worker was submitted, not that it succeeded; the
/// outcome is only visible through later fetches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    pub task: TaskType,
    pub session: SessionId,
    /// A finished (DONE/ERROR) record was replaced by this launch
    pub superseded: bool,
}

/// Store-path handler
pub struct LaunchDispatcher {
    registry: Arc<TaskRegistry>,
    store: Arc<StatusStore>,
    launcher: Arc<dyn Launcher>,
    script_dir: PathBuf,
}

impl LaunchDispatcher {
    pub fn new(
        registry: Arc<TaskRegistry>,
        store: Arc<StatusStore>,
        launcher: Arc<dyn Launcher>,
        script_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            registry,
            store,
            launcher,
            script_dir: script_dir.into(),
        }
    }

    /// Start a run for `task` on behalf of `session`.
    ///
    /// `namespace` is an opaque container tag forwarded to the worker.
    pub fn store(
        &self,
        task: &str,
        session: SessionId,
        argument: Option<&str>,
        namespace: Option<&str>,
    ) -> Result<Accepted> {
        let def = self.registry.lookup(task)?;

        if let Some(arg) = argument {
            if !validate(arg) {
                warn!("Rejected argument {:?} for {} (session {})", arg, def.name(), session);
                return Err(TaskError::InvalidArgument {
                    task: def.name().to_string(),
                    argument: arg.to_string(),
                });
            }
        }

        let superseded = self.claim(def, session)?;

        let spec = self.launch_spec(def, session, argument, namespace);
        match self.launcher.launch(&spec) {
            Ok(()) => info!(
                "Launched {} for session {} via {} launcher",
                def.name(),
                session,
                self.launcher.name()
            ),
            Err(e) => {
                error!("Launch of {} for session {} failed: {}", def.name(), session, e);
                // 예약 상태로 남으면 영원히 Busy이므로 ERROR로 바꿔둔다
                let status = format!("{} failed to launch {}: {}", STATUS_ERROR, def.name(), e);
                if let Err(write_err) = self.store.write(def.task, session, &status) {
                    warn!(
                        "Could not record launch failure for {} (session {}): {}",
                        def.name(),
                        session,
                        write_err
                    );
                }
            }
        }

        Ok(Accepted {
            task: def.task,
            session,
            superseded,
        })
    }

    /// Busy check plus reservation. Returns whether a terminal record was
    /// superseded.
    fn claim(&self, def: &TaskDef, session: SessionId) -> Result<bool> {
        let _guard = self.store.lock();

        match self.store.reserve(def.task, session) {
            Ok(Reservation::Created) => {
                debug!("Reserved {} for session {}", def.name(), session);
                Ok(false)
            }
            Ok(Reservation::Exists) => {
                let current = self.store.get(def.task, session);
                if !TaskStatus::parse(&current).is_terminal() {
                    debug!("{} busy for session {}: {}", def.name(), session, current);
                    return Err(self.busy(def, session));
                }
                if let Err(e) = self.store.write(def.task, session, STATUS_REQUESTED) {
                    warn!(
                        "Could not supersede {} record for session {}: {}",
                        def.name(),
                        session,
                        e
                    );
                }
                Ok(true)
            }
            Err(e) => {
                // 예약 불가 (디렉토리 권한 등) - 예약 없이 검사만 하고 진행
                warn!(
                    "Could not reserve {} for session {}: {}; launching unreserved",
                    def.name(),
                    session,
                    e
                );
                if self.store.has(def.task, session) {
                    let current = self.store.get(def.task, session);
                    if !TaskStatus::parse(&current).is_terminal() {
                        return Err(self.busy(def, session));
                    }
                    return Ok(true);
                }
                Ok(false)
            }
        }
    }

    fn busy(&self, def: &TaskDef, session: SessionId) -> TaskError {
        TaskError::Busy {
            task: def.name().to_string(),
            session,
        }
    }

    /// Build the worker command and its per-launch environment
    fn launch_spec(
        &self,
        def: &TaskDef,
        session: SessionId,
        argument: Option<&str>,
        namespace: Option<&str>,
    ) -> LaunchSpec {
        let mut spec = LaunchSpec::new(self.script_dir.join(def.script))
            .env(ENV_PCP_CONTEXT, session.to_string())
            .env(ENV_WORKING_DIR, self.store.root().display().to_string());

        if def.takes_argument {
            if let Some(arg) = argument.filter(|a| !a.is_empty()) {
                spec = spec.arg(arg);
            }
        }

        if let Some(tag) = namespace.filter(|t| !t.is_empty()) {
            spec = spec.env(ENV_PCP_CONTAINER_NAME, tag);
        }

        spec
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LaunchError;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingLauncher {
        launched: Mutex<Vec<LaunchSpec>>,
    }

    impl Launcher for RecordingLauncher {
        fn launch(&self, spec: &LaunchSpec) -> std::result::Result<(), LaunchError> {
            self.launched.lock().push(spec.clone());
            Ok(())
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    struct FailingLauncher;

    impl Launcher for FailingLauncher {
        fn launch(&self, spec: &LaunchSpec) -> std::result::Result<(), LaunchError> {
            Err(LaunchError::MissingProgram(spec.program.clone()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        store: Arc<StatusStore>,
        launcher: Arc<RecordingLauncher>,
        dispatcher: LaunchDispatcher,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(StatusStore::new(dir.path().join("status")));
        let launcher = Arc::new(RecordingLauncher::default());
        let dispatcher = LaunchDispatcher::new(
            Arc::new(TaskRegistry::builtin()),
            Arc::clone(&store),
            launcher.clone(),
            "/opt/vector",
        );
        Fixture {
            _dir: dir,
            store,
            launcher,
            dispatcher,
        }
    }

    #[test]
    fn test_idle_key_launches_once() {
        let f = fixture();
        let accepted = f
            .dispatcher
            .store("cpuflamegraph", SessionId(3), Some("60"), None)
            .unwrap();

        assert_eq!(accepted.task, TaskType::CpuFlamegraph);
        assert!(!accepted.superseded);
        assert_eq!(f.store.get(TaskType::CpuFlamegraph, SessionId(3)), "REQUESTED");

        let launched = f.launcher.launched.lock();
        assert_eq!(launched.len(), 1);
        let spec = &launched[0];
        assert_eq!(spec.program, PathBuf::from("/opt/vector/cpuflamegraph.sh"));
        assert_eq!(spec.args, vec!["60".to_string()]);
        assert_eq!(spec.env_value("PCP_CONTEXT"), Some("3"));
        assert_eq!(spec.env_value("PCP_CONTAINER_NAME"), None);
        assert_eq!(
            spec.env_value("VECTOR_WORKING_DIR"),
            Some(f.store.root().display().to_string().as_str())
        );
    }

    #[test]
    fn test_second_store_is_busy() {
        let f = fixture();
        f.dispatcher
            .store("cpuflamegraph", SessionId(1), None, None)
            .unwrap();
        let err = f
            .dispatcher
            .store("cpuflamegraph", SessionId(1), None, None)
            .unwrap_err();

        assert!(matches!(err, TaskError::Busy { .. }));
        assert_eq!(f.launcher.launched.lock().len(), 1);
    }

    #[test]
    fn test_progress_record_blocks() {
        let f = fixture();
        f.store
            .write(TaskType::OffCpuFlamegraph, SessionId(1), "profiling 50%")
            .unwrap();

        let err = f
            .dispatcher
            .store("offcpuflamegraph", SessionId(1), None, None)
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(
            f.store.get(TaskType::OffCpuFlamegraph, SessionId(1)),
            "profiling 50%"
        );
        assert!(f.launcher.launched.lock().is_empty());
    }

    #[test]
    fn test_terminal_records_are_superseded() {
        let f = fixture();
        for (i, terminal) in ["DONE", "ERROR", "ERROR disk full"].iter().enumerate() {
            let session = SessionId(i as u32);
            f.store
                .write(TaskType::CpuFlamegraph, session, terminal)
                .unwrap();

            let accepted = f
                .dispatcher
                .store("cpuflamegraph", session, None, None)
                .unwrap();
            assert!(accepted.superseded, "{} should not block", terminal);
            assert_eq!(f.store.get(TaskType::CpuFlamegraph, session), "REQUESTED");
        }
        assert_eq!(f.launcher.launched.lock().len(), 3);
    }

    #[test]
    fn test_unfetched_done_with_argument_blocks() {
        let f = fixture();
        f.store
            .write(TaskType::JstackFlamegraph, SessionId(1), "DONE jstack/out.svg")
            .unwrap();

        let err = f
            .dispatcher
            .store("jstackflamegraph", SessionId(1), None, None)
            .unwrap_err();
        assert!(matches!(err, TaskError::Busy { .. }));
        assert_eq!(
            f.store.get(TaskType::JstackFlamegraph, SessionId(1)),
            "DONE jstack/out.svg"
        );
        assert!(f.launcher.launched.lock().is_empty());
    }

    #[test]
    fn test_sessions_do_not_collide() {
        let f = fixture();
        f.dispatcher
            .store("cpuflamegraph", SessionId(1), None, None)
            .unwrap();
        f.dispatcher
            .store("cpuflamegraph", SessionId(2), None, None)
            .unwrap();
        f.dispatcher
            .store("jstackflamegraph", SessionId(1), None, None)
            .unwrap();
        assert_eq!(f.launcher.launched.lock().len(), 3);
    }

    #[test]
    fn test_invalid_argument_rejected_before_reserve() {
        let f = fixture();
        let err = f
            .dispatcher
            .store("cpuflamegraph", SessionId(1), Some("5; reboot"), None)
            .unwrap_err();

        assert!(matches!(err, TaskError::InvalidArgument { .. }));
        assert!(!f.store.has(TaskType::CpuFlamegraph, SessionId(1)));
        assert!(f.launcher.launched.lock().is_empty());
    }

    #[test]
    fn test_empty_argument_accepted_and_not_passed() {
        let f = fixture();
        f.dispatcher
            .store("cpuflamegraph", SessionId(1), Some(""), None)
            .unwrap();
        assert!(f.launcher.launched.lock()[0].args.is_empty());
    }

    #[test]
    fn test_argument_ignored_for_fixed_scripts() {
        let f = fixture();
        f.dispatcher
            .store("disklatencyheatmap", SessionId(1), Some("30"), None)
            .unwrap();

        let launched = f.launcher.launched.lock();
        assert_eq!(launched[0].program, PathBuf::from("/opt/vector/heatmap.sh"));
        assert!(launched[0].args.is_empty());
    }

    #[test]
    fn test_unknown_task() {
        let f = fixture();
        let err = f
            .dispatcher
            .store("gpuflamegraph", SessionId(1), None, None)
            .unwrap_err();
        assert!(matches!(err, TaskError::InvalidKey(_)));
    }

    #[test]
    fn test_namespace_forwarded() {
        let f = fixture();
        f.dispatcher
            .store("cpuflamegraph", SessionId(1), None, Some("db-0"))
            .unwrap();
        f.dispatcher
            .store("cpuflamegraph", SessionId(2), None, Some(""))
            .unwrap();

        let launched = f.launcher.launched.lock();
        assert_eq!(launched[0].env_value("PCP_CONTAINER_NAME"), Some("db-0"));
        assert_eq!(launched[1].env_value("PCP_CONTAINER_NAME"), None);
    }

    #[test]
    fn test_launch_failure_still_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(StatusStore::new(dir.path()));
        let dispatcher = LaunchDispatcher::new(
            Arc::new(TaskRegistry::builtin()),
            Arc::clone(&store),
            Arc::new(FailingLauncher),
            "/nonexistent",
        );

        let accepted = dispatcher
            .store("jstackflamegraph", SessionId(5), None, None)
            .unwrap();
        assert_eq!(accepted.task, TaskType::JstackFlamegraph);

        let status = store.get(TaskType::JstackFlamegraph, SessionId(5));
        assert!(status.starts_with("ERROR failed to launch jstackflamegraph"));

        // ERROR는 terminal - 다시 시도 가능
        assert!(dispatcher
            .store("jstackflamegraph", SessionId(5), None, None)
            .is_ok());
    }
}
