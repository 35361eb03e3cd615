//! Task status keywords and classification
//!
//! A status record holds one line of free text written by the worker. A few
//! leading keywords carry meaning; everything else is a progress message
//! shown to the user as-is.

/// No record exists for the key
pub const STATUS_IDLE: &str = "IDLE";
/// Provisional record written when a launch is accepted
pub const STATUS_REQUESTED: &str = "REQUESTED";
/// Record exists but could not be read, or is empty
pub const STATUS_UNKNOWN: &str = "UNKNOWN";
/// Run finished; optionally followed by an argument
pub const STATUS_DONE: &str = "DONE";
/// Run failed; optionally followed by a message
pub const STATUS_ERROR: &str = "ERROR";

/// Classified content of a status record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    /// Provisional reservation, worker not yet reporting
    Requested,

    /// Record unreadable or empty
    Unknown,

    /// Finished. `None` for a bare "DONE", otherwise the argument
    Done(Option<String>),

    /// Failed. `None` for a bare "ERROR", otherwise the message
    Error(Option<String>),

    /// Anything else the worker reports while running
    Progress(String),
}

impl TaskStatus {
    /// Classify raw record content (already newline-stripped)
    pub fn parse(raw: &str) -> Self {
        if raw == STATUS_DONE {
            return TaskStatus::Done(None);
        }
        if let Some(arg) = raw.strip_prefix("DONE ") {
            return TaskStatus::Done(non_empty(arg));
        }
        if let Some(rest) = raw.strip_prefix(STATUS_ERROR) {
            return TaskStatus::Error(non_empty(rest));
        }
        match raw {
            STATUS_REQUESTED => TaskStatus::Requested,
            "" | STATUS_UNKNOWN => TaskStatus::Unknown,
            other => TaskStatus::Progress(other.to_string()),
        }
    }

    /// Finished and safe to overwrite; the key may be relaunched.
    ///
    /// "DONE <arg>" is not: its argument has not been handed out yet.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Done(None) | TaskStatus::Error(_))
    }

    /// Get display name for the state
    pub fn display_name(&self) -> &'static str {
        match self {
            TaskStatus::Requested => "Requested",
            TaskStatus::Unknown => "Unknown",
            TaskStatus::Done(_) => "Done",
            TaskStatus::Error(_) => "Error",
            TaskStatus::Progress(_) => "Running",
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
