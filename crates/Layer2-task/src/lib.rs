//! # vector-task
//!
//! Per-session background task launching for Vector.
//! Each client session may run one task of each type at a time and polls
//! its status until a one-shot "DONE" is delivered.
//!
//! ## Features
//!
//! - Static catalog of diagnostic task types and their worker scripts
//! - File-backed status records, one per (task type, session)
//! - Busy detection with an atomic provisional reservation
//! - Detached, unsupervised worker launching
//! - Exactly-once delivery of completion

pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod manager;
pub mod registry;
pub mod resolver;
pub mod state;
pub mod store;
pub mod task;
pub mod validate;

// Task protocol
pub use dispatcher::{Accepted, LaunchDispatcher};
pub use error::{LaunchError, Result, TaskError};
pub use manager::TaskManager;
pub use registry::{DonePolicy, TaskDef, TaskRegistry};
pub use resolver::StatusResolver;
pub use state::{
    TaskStatus, STATUS_DONE, STATUS_ERROR, STATUS_IDLE, STATUS_REQUESTED, STATUS_UNKNOWN,
};
pub use store::{Reservation, StatusStore};
pub use task::{SessionId, TaskType};
pub use validate::validate;

// Launchers
pub use executor::{DetachedLauncher, DetachedLauncherConfig, LaunchSpec, Launcher};
