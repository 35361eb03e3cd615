//! Vector Config - 통합 설정
//!
//! 상태 파일 위치, 워커 스크립트 위치 등 런타임 설정

use crate::storage::JsonStore;
use crate::strings::{DEFAULT_SCRIPT_DIR, DEFAULT_WORKING_DIR, ENV_SCRIPT_DIR, ENV_WORKING_DIR};
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// 설정 파일명
pub const VECTOR_CONFIG_FILE: &str = "config.json";

/// Vector 런타임 설정
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorConfig {
    /// Root directory for per-task status records
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,

    /// Directory the worker scripts live in
    #[serde(default = "default_script_dir")]
    pub script_dir: PathBuf,

    /// Log filter directive (e.g. "info", "vector_task=debug")
    #[serde(default)]
    pub log_level: Option<String>,
}

fn default_working_dir() -> PathBuf {
    PathBuf::from(DEFAULT_WORKING_DIR)
}

fn default_script_dir() -> PathBuf {
    PathBuf::from(DEFAULT_SCRIPT_DIR)
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            working_dir: default_working_dir(),
            script_dir: default_script_dir(),
            log_level: None,
        }
    }
}

impl VectorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Load
    // ========================================================================

    /// 글로벌 설정 + 명시적 파일 + 환경변수 순서로 병합 로드
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = Self::new();

        // 1. 글로벌 설정
        if let Ok(global) = JsonStore::global() {
            if let Some(global_config) = global.load_optional::<VectorConfig>(VECTOR_CONFIG_FILE)? {
                config = global_config;
            }
        }

        // 2. 명시적 설정 파일
        if let Some(path) = explicit {
            config = Self::load_file(path)?;
        }

        // 3. 환경변수
        config.apply_env(|key| std::env::var(key).ok());

        Ok(config)
    }

    /// 지정한 파일에서 로드 (없으면 에러)
    pub fn load_file(path: &Path) -> Result<Self> {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| Error::Config(format!("Invalid config path: {}", path.display())))?;
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        JsonStore::new(dir).load(filename)
    }

    /// 환경변수 오버라이드 적용
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_WORKING_DIR).filter(|v| !v.is_empty()) {
            self.working_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(ENV_SCRIPT_DIR).filter(|v| !v.is_empty()) {
            self.script_dir = PathBuf::from(dir);
        }
    }

    // ========================================================================
    // Builder
    // ========================================================================

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    pub fn with_script_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.script_dir = dir.into();
        self
    }

    /// 설정값 검증
    pub fn validate(&self) -> Result<()> {
        if self.working_dir.as_os_str().is_empty() {
            return Err(Error::Config("workingDir must not be empty".to_string()));
        }
        if self.script_dir.as_os_str().is_empty() {
            return Err(Error::Config("scriptDir must not be empty".to_string()));
        }
        Ok(())
    }
}
