//! # vector-foundation
//!
//! Foundation layer for Vector:
//! - Error: 공통 에러 타입
//! - Config: 통합 설정 (VectorConfig)
//! - Storage: JsonStore (설정 파일)
//! - Strings: 워커와 주고받는 환경변수 이름

pub mod config;
pub mod error;
pub mod storage;
pub mod strings;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{VectorConfig, VECTOR_CONFIG_FILE};

// ============================================================================
// Storage (저장소)
// ============================================================================
pub use storage::JsonStore;

// ============================================================================
// Strings (환경변수)
// ============================================================================
pub use strings::{
    DEFAULT_SCRIPT_DIR, DEFAULT_WORKING_DIR, ENV_PCP_CONTAINER_NAME, ENV_PCP_CONTEXT,
    ENV_SCRIPT_DIR, ENV_WORKING_DIR,
};
