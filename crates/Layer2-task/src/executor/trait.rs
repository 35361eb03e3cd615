//! Launcher trait

use crate::error::LaunchError;
use std::path::PathBuf;

/// Everything needed to start one worker process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchSpec {
    /// Program to execute
    pub program: PathBuf,

    /// Command-line arguments
    pub args: Vec<String>,

    /// Environment added on top of the inherited one
    pub env: Vec<(String, String)>,
}

impl LaunchSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Value of an environment entry, if set
    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Command line for logs
    pub fn command_line(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Launcher trait - implement to add new ways of starting workers
///
/// A launcher only reports whether the worker could be submitted. It never
/// waits for it; completion is observed through the status store.
pub trait Launcher: Send + Sync {
    /// Start a detached worker
    fn launch(&self, spec: &LaunchSpec) -> Result<(), LaunchError>;

    /// Get launcher name
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_command_line() {
        let spec = LaunchSpec::new("/opt/vector/cpuflamegraph.sh")
            .arg("60")
            .env("PCP_CONTEXT", "4")
            .env("PCP_CONTEXT", "5");

        assert_eq!(spec.command_line(), "/opt/vector/cpuflamegraph.sh 60");
        // 마지막 값 우선
        assert_eq!(spec.env_value("PCP_CONTEXT"), Some("5"));
        assert_eq!(spec.env_value("PCP_CONTAINER_NAME"), None);
    }
}
