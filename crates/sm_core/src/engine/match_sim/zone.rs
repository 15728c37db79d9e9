//! Six-zone pitch model.
//!
//! 공격 존 1-3 (좌/중/우) 은 상대의 수비 존 4-6 (우/중/좌) 과 짝을 이룬다: 1→4, 2→5, 3→6.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::engine::config::{ZoneModelConfig, ZoneTable};
use crate::error::Result;
use crate::models::{Attribute, Lineup, LineupEntry, PlayerToken, Position, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Zone {
    AttackLeft,
    AttackCentre,
    AttackRight,
    DefendRight,
    DefendCentre,
    DefendLeft,
}

impl Zone {
    pub const ALL: [Zone; 6] = [
        Zone::AttackLeft,
        Zone::AttackCentre,
        Zone::AttackRight,
        Zone::DefendRight,
        Zone::DefendCentre,
        Zone::DefendLeft,
    ];

    pub const ATTACKING: [Zone; 3] = [Zone::AttackLeft, Zone::AttackCentre, Zone::AttackRight];

    pub fn index(self) -> usize {
        match self {
            Zone::AttackLeft => 0,
            Zone::AttackCentre => 1,
            Zone::AttackRight => 2,
            Zone::DefendRight => 3,
            Zone::DefendCentre => 4,
            Zone::DefendLeft => 5,
        }
    }

    /// 1-based zone number
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    pub fn is_attacking(self) -> bool {
        self.index() < 3
    }

    /// The opponent's defensive zone facing this attacking zone (and back).
    pub fn mirrored(self) -> Zone {
        match self {
            Zone::AttackLeft => Zone::DefendRight,
            Zone::AttackCentre => Zone::DefendCentre,
            Zone::AttackRight => Zone::DefendLeft,
            Zone::DefendRight => Zone::AttackLeft,
            Zone::DefendCentre => Zone::AttackCentre,
            Zone::DefendLeft => Zone::AttackRight,
        }
    }

    pub fn side(self) -> Side {
        match self {
            Zone::AttackLeft | Zone::DefendLeft => Side::Left,
            Zone::AttackCentre | Zone::DefendCentre => Side::Centre,
            Zone::AttackRight | Zone::DefendRight => Side::Right,
        }
    }
}

/// Role of a player inside the zone tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ZoneRole {
    Goalkeeper,
    CentreBack,
    FullBack,
    CentralMidfielder,
    WideMidfielder,
    Striker,
    LeftWinger,
    RightWinger,
}

impl ZoneRole {
    /// 풀백 라인의 Winger 는 FullBack, 최전방 측면 Forward 는 좌/우 윙어
    pub fn from_slot(position: Position, side: Side) -> Self {
        match position {
            Position::Goalkeeper => ZoneRole::Goalkeeper,
            Position::CentreBack => ZoneRole::CentreBack,
            Position::Winger => ZoneRole::FullBack,
            Position::CentralMidfielder => ZoneRole::CentralMidfielder,
            Position::WideMidfielder => ZoneRole::WideMidfielder,
            Position::Striker => ZoneRole::Striker,
            Position::Forward => match side {
                Side::Left => ZoneRole::LeftWinger,
                Side::Right => ZoneRole::RightWinger,
                Side::Centre => ZoneRole::Striker,
            },
        }
    }

    pub fn of(entry: &LineupEntry) -> Self {
        Self::from_slot(entry.position, entry.side())
    }
}

/// Normalized (0-1) attack contribution scaled by Freshness/100.
pub fn player_attack_rating(entry: &LineupEntry, weights: &BTreeMap<Attribute, f32>) -> Result<f32> {
    let freshness = entry.player.freshness()?;
    let total: f32 = weights.values().sum();
    if total <= 0.0 {
        return Ok(0.0);
    }
    let raw: f32 = weights.iter().map(|(a, w)| entry.player.attr(*a) * w).sum();
    Ok(raw / (total * 100.0) * (freshness / 100.0))
}

/// 미드필더 평균 능력 (미드필더가 없으면 50)
pub fn midfield_strength(lineup: &Lineup, weights: &BTreeMap<Attribute, f32>) -> f32 {
    let total: f32 = weights.values().sum();
    let values: Vec<f32> = lineup
        .entries
        .iter()
        .filter(|e| matches!(e.position, Position::CentralMidfielder | Position::WideMidfielder))
        .map(|e| {
            if total <= 0.0 {
                return 50.0;
            }
            weights.iter().map(|(a, w)| e.player.attr(*a) * w).sum::<f32>() / total
        })
        .collect();
    if values.is_empty() {
        50.0
    } else {
        values.iter().sum::<f32>() / values.len() as f32
    }
}

/// Per-team zone ratings plus each player's attack rating.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ZoneRatings {
    /// Indexed by `Zone::index()`.
    pub zones: [f32; 6],
    pub player_ratings: HashMap<PlayerToken, f32>,
}

impl ZoneRatings {
    /// `is_available` 가 false 인 선수(퇴장)는 집계에서 빠진다.
    pub fn compute<F>(lineup: &Lineup, table: &ZoneTable, config: &ZoneModelConfig, is_available: F) -> Result<Self>
    where
        F: Fn(&PlayerToken) -> bool,
    {
        let mut ratings = ZoneRatings::default();
        for entry in &lineup.entries {
            let role = ZoneRole::of(entry);
            let rating = match config.attack_weights.get(&role) {
                Some(weights) => player_attack_rating(entry, weights)?,
                None => {
                    entry.player.freshness()?;
                    0.0
                }
            };
            ratings.player_ratings.insert(entry.player.token.clone(), rating);
            if !is_available(&entry.player.token) {
                continue;
            }
            for zone in Zone::ALL {
                if let Some(w) = table.weight(zone, role) {
                    ratings.zones[zone.index()] += w * rating * 100.0;
                }
            }
        }
        Ok(ratings)
    }

    pub fn rating(&self, zone: Zone) -> f32 {
        self.zones[zone.index()]
    }

    pub fn attack_zones(&self) -> [f32; 3] {
        [self.zones[0], self.zones[1], self.zones[2]]
    }
}

/// Five-level danger distribution shifted by the attack/defense gap.
pub fn danger_distribution(attack: f32, defense: f32, config: &ZoneModelConfig) -> [f32; 5] {
    let advantage = if config.advantage_scale > 0.0 {
        ((attack - defense) / config.advantage_scale).clamp(-config.max_advantage, config.max_advantage)
    } else {
        0.0
    };

    let bounds = if advantage >= 0.0 { &config.attacking_bounds } else { &config.defending_bounds };
    let mut dist = [0.0f32; 5];
    for level in 0..5 {
        let shift = config.shift_slopes[level] * advantage;
        let value = config.danger_baseline[level] + shift;
        dist[level] = if shift > 0.0 {
            value.min(bounds[level])
        } else if shift < 0.0 {
            value.max(bounds[level])
        } else {
            value
        };
    }
    crate::engine::sampling::normalize(&mut dist);
    dist
}

/// 연장전 신중 모드 재가중
pub fn apply_caution(dist: &mut [f32; 5], multipliers: &[f32; 5]) {
    for (p, m) in dist.iter_mut().zip(multipliers.iter()) {
        *p *= m;
    }
    crate::engine::sampling::normalize(dist);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Player, Slot, TeamId};

    fn entry(token: &str, slot: Slot, value: f32) -> LineupEntry {
        let mut player = Player::new(token, token);
        for attr in Attribute::CORE {
            player.attributes.set(attr, value);
        }
        player.attributes.set(Attribute::Freshness, 100.0);
        LineupEntry { player, slot, position: slot.position().unwrap() }
    }

    #[test]
    fn test_mirroring_pairs() {
        assert_eq!(Zone::AttackLeft.mirrored(), Zone::DefendRight);
        assert_eq!(Zone::AttackCentre.mirrored(), Zone::DefendCentre);
        assert_eq!(Zone::AttackRight.mirrored(), Zone::DefendLeft);
        for zone in Zone::ALL {
            assert_eq!(zone.mirrored().mirrored(), zone);
        }
        assert_eq!(Zone::DefendLeft.number(), 6);
    }

    #[test]
    fn test_zone_roles_from_slots() {
        assert_eq!(ZoneRole::from_slot(Position::Winger, Side::Left), ZoneRole::FullBack);
        assert_eq!(ZoneRole::from_slot(Position::Forward, Side::Right), ZoneRole::RightWinger);
        assert_eq!(ZoneRole::from_slot(Position::Striker, Side::Centre), ZoneRole::Striker);
    }

    #[test]
    fn test_player_rating_scales_with_freshness() {
        let cfg = ZoneModelConfig::default();
        let mut e = entry("st", Slot::new(5, 2), 80.0);
        let weights = &cfg.attack_weights[&ZoneRole::Striker];
        let fresh = player_attack_rating(&e, weights).unwrap();
        assert!((fresh - 0.8).abs() < 1e-5);
        e.player.attributes.set(Attribute::Freshness, 50.0);
        let tired = player_attack_rating(&e, weights).unwrap();
        assert!((tired - 0.4).abs() < 1e-5);
    }

    #[test]
    fn test_zone_ratings_skip_unavailable_players() {
        let cfg = ZoneModelConfig::default();
        let table = ZoneTable::four_three_three();
        let lineup = Lineup::from_entries(
            TeamId::from("t"),
            vec![entry("lw", Slot::new(4, 0), 70.0), entry("st", Slot::new(5, 2), 70.0)],
        )
        .unwrap();
        let all = ZoneRatings::compute(&lineup, &table, &cfg, |_| true).unwrap();
        let without_lw = ZoneRatings::compute(&lineup, &table, &cfg, |t| t.as_str() != "lw").unwrap();
        // zone 1: LW .30 × 0.7 × 100 + ST .15 × 0.7 × 100
        assert!((all.rating(Zone::AttackLeft) - 31.5).abs() < 1e-3);
        assert!((without_lw.rating(Zone::AttackLeft) - 10.5).abs() < 1e-3);
        assert_eq!(without_lw.player_ratings.len(), 2);
    }

    #[test]
    fn test_danger_shift_direction() {
        let cfg = ZoneModelConfig::default();
        let even = danger_distribution(50.0, 50.0, &cfg);
        let strong = danger_distribution(80.0, 40.0, &cfg);
        let weak = danger_distribution(40.0, 80.0, &cfg);
        for (a, b) in even.iter().zip(cfg.danger_baseline.iter()) {
            assert!((a - b).abs() < 1e-5);
        }
        assert!(strong[4] > even[4] && strong[0] < even[0]);
        assert!(weak[4] < even[4] && weak[0] > even[0]);
        assert!((strong.iter().sum::<f32>() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_shift_is_capped() {
        let cfg = ZoneModelConfig::default();
        let huge = danger_distribution(1000.0, 0.0, &cfg);
        let capped = danger_distribution(62.5, 50.0, &cfg);
        for (a, b) in huge.iter().zip(capped.iter()) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn test_caution_dampens_high_danger() {
        let cfg = ZoneModelConfig::default();
        let mut dist = danger_distribution(50.0, 50.0, &cfg);
        let before = dist;
        apply_caution(&mut dist, &[1.2, 1.1, 0.9, 0.8, 0.6]);
        assert!(dist[4] < before[4]);
        assert!(dist[0] > before[0]);
    }
}
