// 훈련 세션: 훈련 종류별 능력치 묶음에서 1-2개를 골라 소폭 향상, 대가로 Freshness 소모
use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::engine::config::TrainingConfig;
use crate::error::Result;
use crate::models::{Attribute, Player, PlayerToken};

/// 훈련 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
pub enum TrainingType {
    Attack,
    Defense,
    Midfield,
    PersonalSkills,
    /// 능력치 향상 없이 Freshness 회복
    Recovery,
}

impl TrainingType {
    /// 훈련이 다루는 능력치
    pub fn attributes(self) -> &'static [Attribute] {
        match self {
            TrainingType::Attack => &[Attribute::ShootPrecision, Attribute::ShootPower, Attribute::Heading],
            TrainingType::Defense => &[Attribute::Heading, Attribute::Aggression, Attribute::TacklePrecision],
            TrainingType::Midfield => &[Attribute::Dribble, Attribute::GameVision, Attribute::PassPrecision],
            TrainingType::PersonalSkills => {
                &[Attribute::Speed, Attribute::Endurance, Attribute::Leadership, Attribute::Physicality]
            }
            TrainingType::Recovery => &[],
        }
    }
}

/// 훈련 강도
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
pub enum TrainingIntensity {
    Light,
    Medium,
    Intense,
}

impl TrainingIntensity {
    fn index(self) -> usize {
        match self {
            TrainingIntensity::Light => 0,
            TrainingIntensity::Medium => 1,
            TrainingIntensity::Intense => 2,
        }
    }
}

/// 한 선수의 훈련 결과 (델타만, 적용은 영속성 계층)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingOutcome {
    pub player: PlayerToken,
    pub attribute_deltas: BTreeMap<Attribute, f32>,
    pub freshness_delta: f32,
}

/// `25 - Endurance/4 + intensity_bonus`, never negative.
pub fn fatigue_cost(endurance: f32, intensity: TrainingIntensity, config: &TrainingConfig) -> f32 {
    (config.base_fatigue - endurance / config.endurance_divisor + config.intensity_fatigue[intensity.index()]).max(0.0)
}

/// Trainability, Freshness, Endurance 가 모두 있어야 한다.
pub fn train_player(
    player: &Player,
    training: TrainingType,
    intensity: TrainingIntensity,
    config: &TrainingConfig,
    rng: &mut dyn RngCore,
) -> Result<TrainingOutcome> {
    let trainability = player.attributes.require(Attribute::Trainability, &player.token)?;
    let freshness = player.freshness()?;
    let endurance = player.endurance()?;

    let improvement = config.base_improvement[intensity.index()] * (trainability / 100.0) * (freshness / 100.0);
    let (lo, hi) = config.attributes_per_session;
    let count = rng.gen_range(lo..=hi.max(lo));
    let attribute_deltas: BTreeMap<Attribute, f32> =
        training.attributes().choose_multiple(rng, count).map(|attr| (*attr, improvement)).collect();

    let cost = fatigue_cost(endurance, intensity, config);
    let freshness_delta = if training == TrainingType::Recovery { cost } else { -cost };
    Ok(TrainingOutcome { player: player.token.clone(), attribute_deltas, freshness_delta })
}

/// 팀 훈련 세션. 데이터가 빠진 선수가 있으면 세션 전체가 실패한다.
pub fn run_session(
    players: &[Player],
    training: TrainingType,
    intensity: TrainingIntensity,
    config: &TrainingConfig,
    seed: u64,
) -> Result<Vec<TrainingOutcome>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let outcomes = players
        .iter()
        .map(|p| train_player(p, training, intensity, config, &mut rng))
        .collect::<Result<Vec<_>>>()?;
    log::info!("{training:?} training ({intensity:?}) completed for {} players", outcomes.len());
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use strum::IntoEnumIterator;

    fn trainee(endurance: f32) -> Player {
        Player::new("t", "Trainee").with_attributes(&[
            (Attribute::Trainability, 80.0),
            (Attribute::Freshness, 50.0),
            (Attribute::Endurance, endurance),
        ])
    }

    #[test]
    fn test_intense_attack_session() {
        let cfg = TrainingConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let out = train_player(&trainee(60.0), TrainingType::Attack, TrainingIntensity::Intense, &cfg, &mut rng)
            .unwrap();
        assert!((1..=2).contains(&out.attribute_deltas.len()));
        for (attr, delta) in &out.attribute_deltas {
            assert!(TrainingType::Attack.attributes().contains(attr));
            // 0.012 × 0.8 × 0.5
            assert!((delta - 0.0048).abs() < 1e-6);
        }
        // 25 - 15 + 5
        assert_eq!(out.freshness_delta, -15.0);
    }

    #[test]
    fn test_recovery_restores_freshness() {
        let cfg = TrainingConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let out = train_player(&trainee(40.0), TrainingType::Recovery, TrainingIntensity::Light, &cfg, &mut rng)
            .unwrap();
        assert!(out.attribute_deltas.is_empty());
        assert_eq!(out.freshness_delta, 15.0);
    }

    #[test]
    fn test_fatigue_cost_grows_with_intensity() {
        let cfg = TrainingConfig::default();
        let costs: Vec<f32> = TrainingIntensity::iter().map(|i| fatigue_cost(100.0, i, &cfg)).collect();
        assert_eq!(costs, vec![0.0, 2.0, 5.0]);
        for training in TrainingType::iter().filter(|t| *t != TrainingType::Recovery) {
            assert!(!training.attributes().is_empty());
        }
    }

    #[test]
    fn test_session_requires_trainability() {
        let players = vec![trainee(50.0), Player::new("x", "X").with_attribute(Attribute::Freshness, 90.0)];
        let err = run_session(&players, TrainingType::Midfield, TrainingIntensity::Medium, &TrainingConfig::default(), 7)
            .unwrap_err();
        assert!(matches!(err, EngineError::MissingData { attribute: Attribute::Trainability, .. }));
    }
}
