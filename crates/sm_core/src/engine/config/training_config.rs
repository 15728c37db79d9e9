//! Training and between-match upkeep parameters.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Light / Medium / Intense 기본 향상치
    pub base_improvement: [f32; 3],
    /// 피로도 = base_fatigue - Endurance / endurance_divisor + intensity_fatigue
    pub base_fatigue: f32,
    pub endurance_divisor: f32,
    pub intensity_fatigue: [f32; 3],
    /// 세션당 향상되는 능력치 개수 (포함 범위)
    pub attributes_per_session: (usize, usize),
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            base_improvement: [0.005, 0.008, 0.012],
            base_fatigue: 25.0,
            endurance_divisor: 4.0,
            intensity_fatigue: [0.0, 2.0, 5.0],
            attributes_per_session: (1, 2),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpkeepConfig {
    /// 시간당 회복 = base + endurance_coeff × Endurance / endurance_divisor
    pub recovery_base_per_hour: f32,
    pub recovery_endurance_coeff: f32,
    pub recovery_endurance_divisor: f32,
    /// 훈련 없이 지난 일수가 이 주기의 배수일 때 만족도 감소
    pub idle_decay_period_days: i64,
    pub idle_decay: f32,
}

impl Default for UpkeepConfig {
    fn default() -> Self {
        Self {
            recovery_base_per_hour: 0.65625,
            recovery_endurance_coeff: 2.5,
            recovery_endurance_divisor: 2400.0,
            idle_decay_period_days: 7,
            idle_decay: 2.0,
        }
    }
}
