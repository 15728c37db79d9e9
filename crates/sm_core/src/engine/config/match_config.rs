//! Match outcome and event generation parameters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::match_sim::zone::{Zone, ZoneRole};
use crate::models::Attribute;

/// 사용할 득점 모델
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeModelKind {
    /// 6-zone attack opportunity model
    #[default]
    Zone,
    /// Rank → expected goals → Poisson
    Poisson,
}

/// 단계별 득점 확률: `base + gap * per_gap`, [base, max] 클램프
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalChance {
    pub base: f32,
    pub per_gap: f32,
    pub max: f32,
}

impl GoalChance {
    pub fn probability(&self, gap: f32) -> f32 {
        (self.base + gap * self.per_gap).clamp(self.base, self.max)
    }
}

/// Per-zone role weights for one formation shape. Indexed by `Zone::index()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneTable {
    pub zones: Vec<BTreeMap<ZoneRole, f32>>,
}

impl ZoneTable {
    pub fn weight(&self, zone: Zone, role: ZoneRole) -> Option<f32> {
        self.zones.get(zone.index()).and_then(|w| w.get(&role).copied())
    }

    /// 4-3-3 기본 테이블
    pub fn four_three_three() -> Self {
        use ZoneRole::*;

        let flank_defense = |winger: ZoneRole| -> BTreeMap<ZoneRole, f32> {
            BTreeMap::from([
                (CentreBack, 0.35),
                (FullBack, 0.30),
                (CentralMidfielder, 0.15),
                (Goalkeeper, 0.10),
                (winger, 0.10),
            ])
        };
        let flank_attack = |winger: ZoneRole| -> BTreeMap<ZoneRole, f32> {
            BTreeMap::from([
                (winger, 0.30),
                (FullBack, 0.25),
                (CentralMidfielder, 0.20),
                (Striker, 0.15),
                (CentreBack, 0.09),
                (Goalkeeper, 0.01),
            ])
        };

        Self {
            zones: vec![
                flank_attack(LeftWinger),
                BTreeMap::from([
                    (CentralMidfielder, 0.35),
                    (Striker, 0.27),
                    (LeftWinger, 0.15),
                    (RightWinger, 0.15),
                    (WideMidfielder, 0.07),
                    (Goalkeeper, 0.01),
                ]),
                flank_attack(RightWinger),
                flank_defense(RightWinger),
                BTreeMap::from([(CentreBack, 0.60), (Goalkeeper, 0.25), (CentralMidfielder, 0.15)]),
                flank_defense(LeftWinger),
            ],
        }
    }
}

/// Extra-time adjustments shared by the simulators and the event generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtraTimeConfig {
    /// 연장 전반 / 후반 피로 계수
    pub fatigue_factors: [f32; 2],
    /// 위험도 1-5 재가중 (연장전엔 신중한 플레이)
    pub cautious_multipliers: [f32; 5],
    pub level4_goal: f32,
    pub level5_goal: f32,
}

impl Default for ExtraTimeConfig {
    fn default() -> Self {
        Self {
            fatigue_factors: [0.8, 0.7],
            cautious_multipliers: [1.2, 1.1, 0.9, 0.8, 0.6],
            level4_goal: 0.08,
            level5_goal: 0.20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneModelConfig {
    /// 90분 기준 공격 횟수 (짧은 기간은 비례 축소)
    pub attacks_per_90: u32,
    pub danger_baseline: [f32; 5],
    /// advantage = (attack - defense) / advantage_scale
    pub advantage_scale: f32,
    pub max_advantage: f32,
    pub shift_slopes: [f32; 5],
    /// 공격 우세 시 위험도 한계
    pub attacking_bounds: [f32; 5],
    /// 수비 우세 시 위험도 한계
    pub defending_bounds: [f32; 5],
    /// 득점 확률 보정용 gap = (attack - defense) / gap_scale
    pub gap_scale: f32,
    pub level4_goal: GoalChance,
    pub level5_goal: GoalChance,
    /// 공격당 파울 확률
    pub foul_probability: f32,
    pub attack_weights: BTreeMap<ZoneRole, BTreeMap<Attribute, f32>>,
    pub midfield_strength_weights: BTreeMap<Attribute, f32>,
    pub zone_tables: BTreeMap<String, ZoneTable>,
    pub default_shape: String,
}

pub const SUPPORTED_SHAPES: [&str; 6] = ["3-4-3", "3-5-2", "4-2-4", "4-3-3", "4-4-2", "5-3-2"];

impl Default for ZoneModelConfig {
    fn default() -> Self {
        use Attribute::*;

        let winger: BTreeMap<Attribute, f32> = BTreeMap::from([(Dribble, 0.35), (Speed, 0.30), (PassPrecision, 0.20), (GameVision, 0.15)]);
        let midfielder: BTreeMap<Attribute, f32> = BTreeMap::from([
            (GameVision, 0.35),
            (PassPrecision, 0.35),
            (Dribble, 0.15),
            (Speed, 0.10),
            (Physicality, 0.05),
        ]);
        let attack_weights = BTreeMap::from([
            (ZoneRole::Goalkeeper, BTreeMap::from([(GameVision, 0.5), (GkKicking, 0.3), (PassPrecision, 0.2)])),
            (
                ZoneRole::CentreBack,
                BTreeMap::from([(PassPrecision, 0.4), (GameVision, 0.3), (Heading, 0.15), (Physicality, 0.15)]),
            ),
            (
                ZoneRole::FullBack,
                BTreeMap::from([
                    (Speed, 0.25),
                    (PassPrecision, 0.25),
                    (Dribble, 0.25),
                    (GameVision, 0.15),
                    (Endurance, 0.10),
                ]),
            ),
            (ZoneRole::CentralMidfielder, midfielder.clone()),
            (ZoneRole::WideMidfielder, midfielder),
            (
                ZoneRole::Striker,
                BTreeMap::from([
                    (GameVision, 0.25),
                    (Dribble, 0.25),
                    (Speed, 0.20),
                    (PassPrecision, 0.15),
                    (Physicality, 0.10),
                    (Heading, 0.05),
                ]),
            ),
            (ZoneRole::LeftWinger, winger.clone()),
            (ZoneRole::RightWinger, winger),
        ]);

        let table = ZoneTable::four_three_three();
        let zone_tables = SUPPORTED_SHAPES.iter().map(|shape| (shape.to_string(), table.clone())).collect();

        Self {
            attacks_per_90: 200,
            danger_baseline: [0.55, 0.20, 0.15, 0.07, 0.03],
            advantage_scale: 50.0,
            max_advantage: 0.25,
            shift_slopes: [-0.9, -0.3, 0.5, 0.3, 0.4],
            attacking_bounds: [0.30, 0.15, 0.25, 0.15, 0.15],
            defending_bounds: [0.75, 0.25, 0.05, 0.02, 0.01],
            gap_scale: 10.0,
            level4_goal: GoalChance { base: 0.10, per_gap: 0.01, max: 0.15 },
            level5_goal: GoalChance { base: 0.30, per_gap: 0.02, max: 0.40 },
            foul_probability: 0.02,
            attack_weights,
            midfield_strength_weights: BTreeMap::from([
                (GameVision, 0.4),
                (PassPrecision, 0.3),
                (Dribble, 0.2),
                (Endurance, 0.1),
            ]),
            zone_tables,
            default_shape: "4-3-3".to_string(),
        }
    }
}

impl ZoneModelConfig {
    /// 등록되지 않은 포메이션은 기본 포메이션 테이블 사용
    pub fn table_for(&self, shape: &str) -> Option<&ZoneTable> {
        self.zone_tables.get(shape).or_else(|| {
            log::debug!("no zone table for shape {shape}, using {}", self.default_shape);
            self.zone_tables.get(&self.default_shape)
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoissonConfig {
    pub league_average_goals: f32,
    pub rank_exponent: f32,
    /// 결과 열거 시 양 팀 합계 상한
    pub max_total_goals: u32,
    pub max_resamples: u32,
    /// 빗나간 슈팅 수 = Poisson(xG × 이 값)
    pub missed_shots_per_goal: f32,
    pub fouls_per_90: f32,
}

impl Default for PoissonConfig {
    fn default() -> Self {
        Self {
            league_average_goals: 1.4,
            rank_exponent: 1.5,
            max_total_goals: 7,
            max_resamples: 64,
            missed_shots_per_goal: 2.5,
            fouls_per_90: 4.0,
        }
    }
}

/// Event & story generator parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    pub assist_probability: f32,
    /// 도움 이벤트는 골보다 2-6초 앞선다
    pub assist_lead_seconds: (u8, u8),
    pub gk_save_probability: f32,
    /// 존 테이블에 없는 역할의 기본 가중치
    pub default_zone_weight: f32,
    pub wide_zone_bonus: f32,
    pub central_zone_bonus: f32,
    pub pass_ability_weights: BTreeMap<Attribute, f32>,
    pub block_roles: Vec<ZoneRole>,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            assist_probability: 0.60,
            assist_lead_seconds: (2, 6),
            gk_save_probability: 0.40,
            default_zone_weight: 0.05,
            wide_zone_bonus: 1.5,
            central_zone_bonus: 1.3,
            pass_ability_weights: BTreeMap::from([
                (Attribute::PassPrecision, 0.40),
                (Attribute::GameVision, 0.35),
                (Attribute::Dribble, 0.15),
                (Attribute::Speed, 0.10),
            ]),
            block_roles: vec![ZoneRole::CentreBack, ZoneRole::FullBack, ZoneRole::CentralMidfielder],
        }
    }
}
