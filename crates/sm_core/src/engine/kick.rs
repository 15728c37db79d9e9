//! Penalty kick model shared by the in-match shootout and knockout competitions.
//!
//! save_p = 0.5 + (keeper − kicker)/100 × 0.2 + uniform(−0.1, 0.1), clamped to [0, 1].

use std::collections::BTreeMap;

use rand::{Rng, RngCore};

use crate::engine::config::KickModelConfig;
use crate::error::Result;
use crate::models::{Attribute, Player};

fn weighted_rating(player: &Player, weights: &BTreeMap<Attribute, f32>) -> Result<f32> {
    let freshness = player.freshness()?;
    let total: f32 = weights.values().sum();
    if total <= 0.0 {
        return Ok(0.0);
    }
    Ok(player.attributes.weighted_average(weights) * freshness / 100.0)
}

/// 키커 능력 (Freshness 필수)
pub fn kicker_rating(player: &Player, config: &KickModelConfig) -> Result<f32> {
    weighted_rating(player, &config.kicker_weights)
}

pub fn keeper_rating(player: &Player, config: &KickModelConfig) -> Result<f32> {
    weighted_rating(player, &config.keeper_weights)
}

pub fn save_probability(kicker: f32, keeper: f32, config: &KickModelConfig, rng: &mut dyn RngCore) -> f32 {
    let noise = if config.noise > 0.0 { rng.gen_range(-config.noise..=config.noise) } else { 0.0 };
    (config.base_save_probability + (keeper - kicker) / 100.0 * config.skill_weight + noise).clamp(0.0, 1.0)
}

/// `true` when the kick goes in.
pub fn take_kick(kicker: f32, keeper: f32, config: &KickModelConfig, rng: &mut dyn RngCore) -> bool {
    let save = save_probability(kicker, keeper, config, rng);
    rng.gen::<f32>() >= save
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_rating_requires_freshness() {
        let cfg = KickModelConfig::default();
        let p = Player::new("k", "Kicker").with_attribute(Attribute::ShootPrecision, 90.0);
        assert!(matches!(kicker_rating(&p, &cfg), Err(EngineError::MissingData { .. })));
        let p = p.with_attribute(Attribute::Freshness, 50.0);
        let rating = kicker_rating(&p, &cfg).unwrap();
        // (90×.4 + 50×.3 + 50×.2 + 50×.1) × 0.5
        assert!((rating - 33.0).abs() < 1e-3);
    }

    #[test]
    fn test_save_probability_bounds() {
        let cfg = KickModelConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for _ in 0..100 {
            let even = save_probability(60.0, 60.0, &cfg, &mut rng);
            assert!((0.4..=0.6).contains(&even));
            let elite_keeper = save_probability(0.0, 100.0, &cfg, &mut rng);
            assert!((0.6..=0.8).contains(&elite_keeper));
        }
    }

    #[test]
    fn test_better_kicker_scores_more() {
        let cfg = KickModelConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(10);
        let strong = (0..2000).filter(|_| take_kick(95.0, 30.0, &cfg, &mut rng)).count();
        let weak = (0..2000).filter(|_| take_kick(30.0, 95.0, &cfg, &mut rng)).count();
        assert!(strong > weak);
    }
}
