//! Post-game resolution parameters (score, satisfaction, freshness, growth, MOTM, shootout).

use serde::{Deserialize, Serialize};

use crate::models::{Attribute, Position};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    pub baseline: (f32, f32),
    /// 연장전까지 간 경기: uniform(2.0, 3.0) × 피로 계수
    pub extra_time_baseline: (f32, f32),
    pub win_bonus: f32,
    pub defensive_bonus: f32,
    /// 실점이 이 값 이하일 때 수비 보너스
    pub defensive_max_conceded: u32,
    /// 수비 보너스를 받는 포지션 (풀백 Winger 는 제외)
    pub defensive_bonus_positions: Vec<Position>,
    pub attacking_bonus: f32,
    /// 득점이 이 값을 초과할 때 공격 보너스
    pub attacking_min_scored: u32,
    pub attacking_bonus_positions: Vec<Position>,
    pub goal_weight: f32,
    pub assist_weight: f32,
    pub defense_action_weight: f32,
    pub card_penalty: f32,
    pub max_score: f32,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            baseline: (2.5, 3.5),
            extra_time_baseline: (2.0, 3.0),
            win_bonus: 0.5,
            defensive_bonus: 0.5,
            defensive_max_conceded: 1,
            defensive_bonus_positions: vec![Position::CentreBack, Position::Goalkeeper],
            attacking_bonus: 0.5,
            attacking_min_scored: 2,
            attacking_bonus_positions: vec![
                Position::Striker,
                Position::Forward,
                Position::WideMidfielder,
                Position::Winger,
            ],
            goal_weight: 0.4,
            assist_weight: 0.2,
            defense_action_weight: 0.2,
            card_penalty: 0.3,
            max_score: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SatisfactionConfig {
    /// 상위 20% 부터 하위 20% 까지
    pub quintile_deltas: [f32; 5],
    pub motm_bonus: f32,
    pub goal_bonus: f32,
    pub assist_bonus: f32,
    pub improvement_bonus: f32,
    /// (최소 출전 시간, 보정값) 내림차순. 0분은 `unused_minutes_delta`.
    pub minutes_tiers: Vec<(u8, f32)>,
    pub unused_minutes_delta: f32,
    /// 결과 보정에서 "오래 뛴" 기준 (초과)
    pub long_minutes: u8,
    pub win_long: f32,
    pub win_short: f32,
    pub draw_long: f32,
    pub draw_short: f32,
    pub loss_long: f32,
    pub loss_short: f32,
    pub blowout_margin: u32,
    pub blowout_delta: f32,
    pub non_participant: f32,
    pub dnf: f32,
}

impl Default for SatisfactionConfig {
    fn default() -> Self {
        Self {
            quintile_deltas: [10.0, 5.0, 0.0, -5.0, -10.0],
            motm_bonus: 4.0,
            goal_bonus: 2.0,
            assist_bonus: 2.0,
            improvement_bonus: 4.0,
            minutes_tiers: vec![(72, 4.0), (36, 2.0), (1, 0.0)],
            unused_minutes_delta: -2.0,
            long_minutes: 45,
            win_long: 4.0,
            win_short: 2.0,
            draw_long: 2.0,
            draw_short: 0.0,
            loss_long: -4.0,
            loss_short: -2.0,
            blowout_margin: 3,
            blowout_delta: 2.0,
            non_participant: -2.0,
            dnf: -15.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FreshnessConfig {
    /// 기본 소모량 (35 - Endurance / 4)
    pub base_drain: f32,
    pub endurance_divisor: f32,
    pub regular_minutes: f32,
    /// 연장 전반 / 후반 배율
    pub extra_time_multipliers: [f32; 2],
}

impl Default for FreshnessConfig {
    fn default() -> Self {
        Self {
            base_drain: 35.0,
            endurance_divisor: 4.0,
            regular_minutes: 90.0,
            extra_time_multipliers: [1.3, 1.5],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthConfig {
    pub pool: Vec<Attribute>,
    /// 승리 시 성장 능력치 개수 범위 (포함)
    pub win_count: (u8, u8),
    pub win_value: f32,
    pub other_count: (u8, u8),
    pub other_value: f32,
    /// 연장 기간마다 성장 확률
    pub extra_time_chance: f32,
    pub extra_time_win_value: f32,
    pub extra_time_other_value: f32,
    /// 이벤트당 델타 상한
    pub max_delta: f32,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        use Attribute::*;
        Self {
            pool: vec![Speed, Dribble, ShootPrecision, PassPrecision, TacklePrecision, GameVision, Physicality, Endurance],
            win_count: (1, 3),
            win_value: 0.01,
            other_count: (0, 2),
            other_value: 0.005,
            extra_time_chance: 0.3,
            extra_time_win_value: 0.005,
            extra_time_other_value: 0.003,
            max_delta: 0.05,
        }
    }
}

/// Man-of-the-match composite weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotmWeights {
    pub team_won: f32,
    pub overall_score: f32,
    pub goal: f32,
    pub assist: f32,
    pub defense_action: f32,
}

impl Default for MotmWeights {
    fn default() -> Self {
        Self { team_won: 100.0, overall_score: 50.0, goal: 5.0, assist: 3.0, defense_action: 3.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShootoutConfig {
    pub kicks_per_side: u32,
    /// 서든데스 포함 안전 상한
    pub max_rounds: u32,
}

impl Default for ShootoutConfig {
    fn default() -> Self {
        Self { kicks_per_side: 5, max_rounds: 20 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ResolutionConfig {
    pub score: ScoreConfig,
    pub satisfaction: SatisfactionConfig,
    pub freshness: FreshnessConfig,
    pub growth: GrowthConfig,
    pub motm: MotmWeights,
    pub shootout: ShootoutConfig,
}
