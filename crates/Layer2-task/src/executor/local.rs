//! Detached launcher - starts workers on the host and forgets them
//!
//! Features:
//! - Own process group (Unix) so the worker outlives signals aimed at us
//! - stdin closed, output inherited or discarded
//! - Background reaping so a long-lived host does not collect zombies

use crate::error::LaunchError;
use crate::executor::{LaunchSpec, Launcher};
use std::process::{Child, Command, Stdio};
use tracing::{debug, info, warn};
use vector_foundation::ENV_PCP_CONTAINER_NAME;

/// Detached launcher configuration
#[derive(Debug, Clone)]
pub struct DetachedLauncherConfig {
    /// Start the worker in a new process group (Unix only)
    pub new_process_group: bool,
    /// Send worker stdout/stderr to /dev/null instead of our own
    pub discard_output: bool,
}

impl Default for DetachedLauncherConfig {
    fn default() -> Self {
        Self {
            new_process_group: true,
            discard_output: false,
        }
    }
}

/// Launcher that spawns a host process and keeps no handle to it
#[derive(Debug, Clone, Default)]
pub struct DetachedLauncher {
    config: DetachedLauncherConfig,
}

impl DetachedLauncher {
    /// Create a new detached launcher
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with configuration
    pub fn with_config(config: DetachedLauncherConfig) -> Self {
        Self { config }
    }

    fn command(&self, spec: &LaunchSpec) -> Command {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null());

        // 바인딩 없는 세션에 호스트의 컨테이너 이름이 새지 않도록
        if spec.env_value(ENV_PCP_CONTAINER_NAME).is_none() {
            cmd.env_remove(ENV_PCP_CONTAINER_NAME);
        }

        if self.config.discard_output {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }

        #[cfg(unix)]
        if self.config.new_process_group {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        cmd
    }
}

impl Launcher for DetachedLauncher {
    fn launch(&self, spec: &LaunchSpec) -> Result<(), LaunchError> {
        if !spec.program.is_file() {
            return Err(LaunchError::MissingProgram(spec.program.clone()));
        }

        let child = self
            .command(spec)
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                program: spec.program.clone(),
                source,
            })?;

        info!("Spawned worker pid={} cmd={}", child.id(), spec.command_line());
        reap(child, spec.command_line());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "detached"
    }
}

/// Wait for the child on a background thread purely to collect its exit.
fn reap(mut child: Child, label: String) {
    let pid = child.id();
    let spawned = std::thread::Builder::new()
        .name(format!("vector-reap-{}", pid))
        .spawn(move || match child.wait() {
            Ok(status) => debug!("Worker pid={} ({}) exited: {}", pid, label, status),
            Err(e) => warn!("Failed to wait for worker pid={}: {}", pid, e),
        });

    if let Err(e) = spawned {
        // 프로세스는 이미 떠 있음; 종료 상태만 못 거둘 뿐
        warn!("Could not start reaper for pid={}: {}", pid, e);
    }
}
