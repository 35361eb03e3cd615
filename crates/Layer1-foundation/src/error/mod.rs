//! Error types for Vector
//!
//! 설정 파일 관련 에러를 중앙에서 관리

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Vector 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_names_file() {
        let source = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        let err = Error::Parse {
            path: PathBuf::from("/etc/vector/config.json"),
            source,
        };
        let message = err.to_string();
        assert!(message.starts_with("Failed to parse /etc/vector/config.json: "));
        assert!(std::error::Error::source(&err).is_some());
    }
}
