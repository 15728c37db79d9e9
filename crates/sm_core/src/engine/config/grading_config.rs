//! Team grading weights

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{Attribute, Position};

/// 포지션별 기여 비율 (수비/미드필드/공격)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryFactors {
    pub defense: f32,
    pub midfield: f32,
    pub offense: f32,
}

/// Positional-count correction: `balanced_factor` at exactly `balanced`,
/// `above_factor` once the count exceeds `above`, 1.0 otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CountRule {
    pub balanced: usize,
    pub balanced_factor: f32,
    pub above: usize,
    pub above_factor: f32,
}

impl CountRule {
    pub fn factor(&self, count: usize) -> f32 {
        if count == self.balanced {
            self.balanced_factor
        } else if count > self.above {
            self.above_factor
        } else {
            1.0
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GradingConfig {
    /// Primary-grade weights in `Attribute::CORE` order.
    pub primary_weights: BTreeMap<Position, [f32; 16]>,
    pub offense_subset: Vec<Attribute>,
    pub midfield_subset: Vec<Attribute>,
    pub defense_subset: Vec<Attribute>,
    pub category_factors: BTreeMap<Position, CategoryFactors>,
    pub attack_count: CountRule,
    pub defense_count: CountRule,
    pub midfield_count: CountRule,
}

impl Default for GradingConfig {
    fn default() -> Self {
        use Attribute::*;

        let primary_weights = BTreeMap::from([
            (Position::Goalkeeper, [2.0, 2.0, 3.0, 3.0, 2.0, 2.0, 2.0, 4.0, 4.0, 5.0, 30.0, 30.0, 30.0, 10.0, 0.0, 7.0]),
            (Position::CentreBack, [10.0, 0.0, 5.0, 5.0, 5.0, 14.0, 0.0, 9.0, 30.0, 25.0, 0.0, 0.0, 0.0, 9.0, 0.0, 24.0]),
            (Position::Winger, [15.0, 0.0, 12.0, 10.0, 12.0, 5.0, 0.0, 20.0, 23.0, 15.0, 0.0, 0.0, 0.0, 14.0, 0.0, 10.0]),
            (Position::CentralMidfielder, [10.0, 0.0, 15.0, 15.0, 15.0, 5.0, 0.0, 23.0, 7.0, 16.0, 0.0, 0.0, 0.0, 20.0, 0.0, 10.0]),
            (Position::WideMidfielder, [22.0, 0.0, 15.0, 15.0, 20.0, 5.0, 0.0, 25.0, 6.0, 6.0, 0.0, 0.0, 0.0, 12.0, 0.0, 10.0]),
            (Position::Striker, [15.0, 0.0, 30.0, 30.0, 15.0, 10.0, 0.0, 5.0, 3.0, 10.0, 0.0, 0.0, 0.0, 8.0, 0.0, 10.0]),
            (Position::Forward, [25.0, 0.0, 20.0, 20.0, 25.0, 5.0, 0.0, 20.0, 3.0, 3.0, 0.0, 0.0, 0.0, 10.0, 0.0, 5.0]),
        ]);

        let factors = |defense, midfield, offense| CategoryFactors { defense, midfield, offense };
        let category_factors = BTreeMap::from([
            (Position::Goalkeeper, factors(0.2, 0.002, 0.0005)),
            (Position::CentreBack, factors(0.25, 0.01, 0.003)),
            (Position::Winger, factors(0.15, 0.03, 0.01)),
            (Position::CentralMidfielder, factors(0.007, 0.3, 0.007)),
            (Position::WideMidfielder, factors(0.02, 0.2, 0.02)),
            (Position::Striker, factors(0.002, 0.005, 0.5)),
            (Position::Forward, factors(0.003, 0.01, 0.3)),
        ]);

        Self {
            primary_weights,
            offense_subset: vec![Speed, ShootPrecision, ShootPower, Dribble, Heading, PassPrecision, GameVision, Leadership],
            midfield_subset: vec![Speed, Dribble, PassPrecision, GameVision, Leadership],
            defense_subset: vec![Speed, Heading, TacklePrecision, Aggression, Leadership],
            category_factors,
            attack_count: CountRule { balanced: 3, balanced_factor: 1.0, above: 3, above_factor: 0.731 },
            defense_count: CountRule { balanced: 3, balanced_factor: 1.0, above: 4, above_factor: 0.90 },
            midfield_count: CountRule { balanced: 2, balanced_factor: 1.31, above: 4, above_factor: 0.9 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_rules() {
        let cfg = GradingConfig::default();
        assert_eq!(cfg.attack_count.factor(3), 1.0);
        assert_eq!(cfg.attack_count.factor(4), 0.731);
        assert_eq!(cfg.attack_count.factor(2), 1.0);
        assert_eq!(cfg.defense_count.factor(4), 1.0);
        assert_eq!(cfg.defense_count.factor(5), 0.90);
        assert_eq!(cfg.midfield_count.factor(2), 1.31);
        assert_eq!(cfg.midfield_count.factor(3), 1.0);
        assert_eq!(cfg.midfield_count.factor(5), 0.9);
    }

    #[test]
    fn test_every_position_has_tables() {
        let cfg = GradingConfig::default();
        assert_eq!(cfg.primary_weights.len(), 7);
        assert_eq!(cfg.category_factors.len(), 7);
    }
}
