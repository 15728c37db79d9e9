//! Simulation engines.
//!
//! - [`grading`]: 팀 등급
//! - [`match_sim`]: 득점 모델, 스토리 생성, 경기 상태 머신
//! - [`resolution`]: 경기 후 퍼포먼스 확정
//! - [`competition`]: 레이스와 승부차기 토너먼트
//! - [`kick`]: 승부차기 공용 킥 모델

pub mod competition;
pub mod config;
pub mod grading;
pub mod kick;
pub mod match_sim;
pub mod resolution;
pub mod sampling;

use std::hash::{Hash, Hasher};

use fxhash::FxHasher;
use once_cell::sync::Lazy;

use config::SimConfig;

/// 기본 설정. 설정 파일 없이 호출되는 경로에서 공유한다.
pub static DEFAULT_CONFIG: Lazy<SimConfig> = Lazy::new(SimConfig::default);

/// Per-match seed from a batch seed and a match id.
///
/// FxHasher 는 Rust 버전이 바뀌어도 값이 같다 (DefaultHasher 는 보장하지 않음).
pub fn derive_seed(base_seed: u64, match_id: &str) -> u64 {
    let mut hasher = FxHasher::default();
    base_seed.hash(&mut hasher);
    match_id.hash(&mut hasher);
    hasher.finish()
}
