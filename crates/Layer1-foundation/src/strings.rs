//! Shared string constants
//!
//! Environment variable names exchanged with worker scripts and the
//! config layer. Workers are shell scripts that read these by name, so the
//! values are part of the external contract.

// ============================================================================
// Worker Environment
// ============================================================================

/// Session identifier handed to a worker (the collector's context number)
pub const ENV_PCP_CONTEXT: &str = "PCP_CONTEXT";
/// Container name the worker should target, when one is bound
pub const ENV_PCP_CONTAINER_NAME: &str = "PCP_CONTAINER_NAME";
/// Directory the worker writes its status record under
pub const ENV_WORKING_DIR: &str = "VECTOR_WORKING_DIR";

// ============================================================================
// Config Overrides
// ============================================================================

/// Overrides the directory worker scripts are launched from
pub const ENV_SCRIPT_DIR: &str = "VECTOR_SCRIPT_DIR";

// ============================================================================
// Paths
// ============================================================================

/// Default root for status records
pub const DEFAULT_WORKING_DIR: &str = "/var/log/pcp/vector";
/// Default location of the worker scripts
pub const DEFAULT_SCRIPT_DIR: &str = "/var/lib/pcp/pmdas/vector";
