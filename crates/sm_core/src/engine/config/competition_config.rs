//! Race and knockout competition parameters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::Attribute;

/// Race parameters. A race block in a config file must be complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceConfig {
    pub min_time: f32,
    pub max_time: f32,
    /// DNF 센티널 (항상 최하위 정렬)
    pub dnf_time: f32,
    /// 기록에 더해지는 uniform(-R, R)
    pub random_range: f32,
    /// 이 값 미만 Freshness 는 DNF
    pub freshness_threshold: f32,
    pub curve_exponent: f32,
    pub weights: BTreeMap<Attribute, f32>,
    /// 정규 경기 피로도 대비 비율
    pub fatigue_share: f32,
    pub podium_size: usize,
    pub podium_growth: BTreeMap<Attribute, f32>,
}

impl RaceConfig {
    pub fn dash100() -> Self {
        Self {
            min_time: 9.5,
            max_time: 15.0,
            dnf_time: 100.0,
            random_range: 0.15,
            freshness_threshold: 10.0,
            curve_exponent: 1.5,
            weights: BTreeMap::from([
                (Attribute::Speed, 0.60),
                (Attribute::Physicality, 0.25),
                (Attribute::Endurance, 0.10),
                (Attribute::Satisfaction, 0.05),
            ]),
            fatigue_share: 0.10,
            podium_size: 3,
            podium_growth: BTreeMap::from([(Attribute::Speed, 0.02), (Attribute::Physicality, 0.01)]),
        }
    }

    pub fn run5k() -> Self {
        Self {
            min_time: 840.0,
            max_time: 1800.0,
            dnf_time: 5000.0,
            random_range: 15.0,
            freshness_threshold: 10.0,
            curve_exponent: 1.5,
            weights: BTreeMap::from([
                (Attribute::Endurance, 0.60),
                (Attribute::Speed, 0.25),
                (Attribute::Satisfaction, 0.10),
                (Attribute::Physicality, 0.05),
            ]),
            fatigue_share: 0.50,
            podium_size: 3,
            podium_growth: BTreeMap::from([(Attribute::Endurance, 0.02), (Attribute::Speed, 0.01)]),
        }
    }
}

/// Single penalty kick: save chance = base + (keeper - kicker)/100 × skill_weight ± noise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KickModelConfig {
    pub kicker_weights: BTreeMap<Attribute, f32>,
    pub keeper_weights: BTreeMap<Attribute, f32>,
    pub base_save_probability: f32,
    pub skill_weight: f32,
    pub noise: f32,
}

impl Default for KickModelConfig {
    fn default() -> Self {
        Self {
            kicker_weights: BTreeMap::from([
                (Attribute::ShootPrecision, 0.4),
                (Attribute::ShootPower, 0.3),
                (Attribute::Leadership, 0.2),
                (Attribute::Satisfaction, 0.1),
            ]),
            keeper_weights: BTreeMap::from([
                (Attribute::Reflexes, 0.4),
                (Attribute::Diving, 0.3),
                (Attribute::GameVision, 0.2),
                (Attribute::Satisfaction, 0.1),
            ]),
            base_save_probability: 0.5,
            skill_weight: 0.2,
            noise: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnockoutConfig {
    pub shots_per_round: u32,
    pub max_rounds: u32,
    pub kick: KickModelConfig,
    pub scoring_winner_growth: BTreeMap<Attribute, f32>,
    pub saving_winner_growth: BTreeMap<Attribute, f32>,
}

impl Default for KnockoutConfig {
    fn default() -> Self {
        Self {
            shots_per_round: 5,
            max_rounds: 10,
            kick: KickModelConfig::default(),
            scoring_winner_growth: BTreeMap::from([
                (Attribute::ShootPrecision, 0.05),
                (Attribute::ShootPower, 0.03),
            ]),
            saving_winner_growth: BTreeMap::from([(Attribute::Reflexes, 0.05), (Attribute::Diving, 0.03)]),
        }
    }
}
