//! Task type and session identifiers

use crate::error::TaskError;
use std::str::FromStr;

/// A diagnostic capability that can be launched in the background.
///
/// The discriminant is the metric item number the collector framework uses
/// to address the task, so the order here is part of the external contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskType {
    /// Profile CPU stack traces and create a flame graph
    CpuFlamegraph = 0,
    /// Collect block layer latency and display as a heat map
    DiskLatencyHeatmap = 1,
    /// Process java stacks and display as a flame graph
    JstackFlamegraph = 2,
    /// Profile CPU instruction pointer for a package name flame graph
    PnameCpuFlamegraph = 3,
    /// Profile CPU stack traces with some uninlining
    UninlinedCpuFlamegraph = 4,
    /// Trace page faults with stacks
    PageFaultFlamegraph = 5,
    /// Trace disk I/O issues with stacks
    DiskIoFlamegraph = 6,
    /// Profile cycles and instructions for an IPC flame graph
    IpcFlamegraph = 7,
    /// Trace context switches with stacks
    CswFlamegraph = 8,
    /// Trace scheduler events for an off-CPU time flame graph
    OffCpuFlamegraph = 9,
    /// Trace scheduler events for an off-wake time flame graph
    OffWakeFlamegraph = 10,
}

impl TaskType {
    /// Every task type, in item order
    pub const ALL: [TaskType; 11] = [
        TaskType::CpuFlamegraph,
        TaskType::DiskLatencyHeatmap,
        TaskType::JstackFlamegraph,
        TaskType::PnameCpuFlamegraph,
        TaskType::UninlinedCpuFlamegraph,
        TaskType::PageFaultFlamegraph,
        TaskType::DiskIoFlamegraph,
        TaskType::IpcFlamegraph,
        TaskType::CswFlamegraph,
        TaskType::OffCpuFlamegraph,
        TaskType::OffWakeFlamegraph,
    ];

    /// Metric item number
    pub fn item(self) -> u32 {
        self as u32
    }

    /// Look up a task type by metric item number
    pub fn from_item(item: u32) -> Option<Self> {
        Self::ALL.get(item as usize).copied()
    }

    /// Name used as the storage key and in the worker command
    pub fn name(self) -> &'static str {
        match self {
            TaskType::CpuFlamegraph => "cpuflamegraph",
            TaskType::DiskLatencyHeatmap => "disklatencyheatmap",
            TaskType::JstackFlamegraph => "jstackflamegraph",
            TaskType::PnameCpuFlamegraph => "pnamecpuflamegraph",
            TaskType::UninlinedCpuFlamegraph => "uninlinedcpuflamegraph",
            TaskType::PageFaultFlamegraph => "pagefaultflamegraph",
            TaskType::DiskIoFlamegraph => "diskioflamegraph",
            TaskType::IpcFlamegraph => "ipcflamegraph",
            TaskType::CswFlamegraph => "cswflamegraph",
            TaskType::OffCpuFlamegraph => "offcpuflamegraph",
            TaskType::OffWakeFlamegraph => "offwakeflamegraph",
        }
    }
}

impl FromStr for TaskType {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // metric 이름 전체("vector.task.cpuflamegraph")도 허용
        let name = s.strip_prefix("vector.task.").unwrap_or(s);
        Self::ALL
            .iter()
            .copied()
            .find(|task| task.name() == name)
            .ok_or_else(|| TaskError::InvalidKey(s.to_string()))
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Opaque per-client identifier assigned by the collector framework
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u32);

impl SessionId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl From<u32> for SessionId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
