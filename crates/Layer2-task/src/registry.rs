//! Task registry - static catalog of launchable task types
//!
//! Each entry binds a [`TaskType`] to its worker script and to how a bare
//! "DONE" is presented to the client. Built once at startup and read-only
//! afterwards.

use crate::error::{Result, TaskError};
use crate::state::STATUS_DONE;
use crate::task::{SessionId, TaskType};

/// How a bare "DONE" record is turned into the message returned by fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DonePolicy {
    /// Build "DONE <name>/<name>.<session>.<extension>" pointing at the artifact
    Synthesize { extension: &'static str },

    /// Return the record as written; the worker names its own output
    Verbatim,
}

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDef {
    pub task: TaskType,

    /// Worker script, relative to the script directory
    pub script: &'static str,

    /// Whether the worker takes the optional seconds argument
    pub takes_argument: bool,

    pub done: DonePolicy,

    pub description: &'static str,
}

impl TaskDef {
    /// Flame graph family: `<name>.sh [secs]`, result is `<name>.<session>.svg`
    pub const fn flamegraph(task: TaskType, script: &'static str, description: &'static str) -> Self {
        Self {
            task,
            script,
            takes_argument: true,
            done: DonePolicy::Synthesize { extension: "svg" },
            description,
        }
    }

    /// Fixed script, no argument, worker-formed done message
    pub const fn fixed(task: TaskType, script: &'static str, description: &'static str) -> Self {
        Self {
            task,
            script,
            takes_argument: false,
            done: DonePolicy::Verbatim,
            description,
        }
    }

    pub fn name(&self) -> &'static str {
        self.task.name()
    }

    /// Message delivered for a bare "DONE" record
    pub fn done_message(&self, session: SessionId) -> String {
        match self.done {
            DonePolicy::Synthesize { extension } => format!(
                "{} {}/{}.{}.{}",
                STATUS_DONE,
                self.name(),
                self.name(),
                session,
                extension
            ),
            DonePolicy::Verbatim => STATUS_DONE.to_string(),
        }
    }
}

const BUILTIN: [TaskDef; 11] = [
    TaskDef::flamegraph(
        TaskType::CpuFlamegraph,
        "cpuflamegraph.sh",
        "Profile CPU stack traces and create a flame graph.",
    ),
    TaskDef::fixed(
        TaskType::DiskLatencyHeatmap,
        "heatmap.sh",
        "Collect block layer latency using perf and display as a heatmap.",
    ),
    TaskDef::fixed(
        TaskType::JstackFlamegraph,
        "jstack.sh",
        "Process java stacks using jstack and display as a flamegraph.",
    ),
    TaskDef::flamegraph(
        TaskType::PnameCpuFlamegraph,
        "pnamecpuflamegraph.sh",
        "Profile CPU instruction pointer and create a package name flame graph.",
    ),
    TaskDef::flamegraph(
        TaskType::UninlinedCpuFlamegraph,
        "uninlinedcpuflamegraph.sh",
        "Profile CPU stack traces with some uninlining for a flame graph.",
    ),
    TaskDef::flamegraph(
        TaskType::PageFaultFlamegraph,
        "pagefaultflamegraph.sh",
        "Trace page faults with stacks and create a flame graph.",
    ),
    TaskDef::flamegraph(
        TaskType::DiskIoFlamegraph,
        "diskioflamegraph.sh",
        "Trace disk I/O issues with stacks and create a flame graph.",
    ),
    TaskDef::flamegraph(
        TaskType::IpcFlamegraph,
        "ipcflamegraph.sh",
        "Profile cycles and instructions for an IPC flame graph (needs PMCs).",
    ),
    TaskDef::flamegraph(
        TaskType::CswFlamegraph,
        "cswflamegraph.sh",
        "Trace context switches with stacks and create a flame graph.",
    ),
    TaskDef::flamegraph(
        TaskType::OffCpuFlamegraph,
        "offcpuflamegraph.sh",
        "Trace scheduler events and create an off-CPU time flame graph.",
    ),
    TaskDef::flamegraph(
        TaskType::OffWakeFlamegraph,
        "offwakeflamegraph.sh",
        "Trace scheduler events and create an off-wake time flame graph.",
    ),
];

/// Read-only catalog of task definitions
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    entries: Vec<TaskDef>,
}

impl TaskRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in task type
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN.to_vec(),
        }
    }

    /// Add or replace an entry (construction time only)
    pub fn with(mut self, def: TaskDef) -> Self {
        self.entries.retain(|existing| existing.task != def.task);
        self.entries.push(def);
        self.entries.sort_by_key(|def| def.task);
        self
    }

    pub fn get(&self, task: TaskType) -> Result<&TaskDef> {
        self.entries
            .iter()
            .find(|def| def.task == task)
            .ok_or_else(|| TaskError::InvalidKey(task.name().to_string()))
    }

    /// Look up by task name (or full metric name)
    pub fn lookup(&self, name: &str) -> Result<&TaskDef> {
        let task: TaskType = name.parse()?;
        self.get(task)
    }

    /// Look up by metric item number
    pub fn lookup_item(&self, item: u32) -> Result<&TaskDef> {
        let task = TaskType::from_item(item)
            .ok_or_else(|| TaskError::InvalidKey(format!("item {}", item)))?;
        self.get(task)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskDef> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
