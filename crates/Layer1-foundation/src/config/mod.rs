//! Config - 통합 설정 관리
//!
//! - `vector.rs` - VectorConfig 통합 설정

mod vector;

pub use vector::{VectorConfig, VECTOR_CONFIG_FILE};
