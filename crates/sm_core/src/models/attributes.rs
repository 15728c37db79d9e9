//! Player attribute names and the attribute map.
//!
//! 모든 능력치는 0-100 스케일. Freshness / Satisfaction 은 경기마다 바뀌는 동적 값,
//! 나머지는 훈련과 경기 성장으로만 천천히 변한다.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::models::PlayerToken;

/// 누락된 능력치의 기본값
pub const DEFAULT_ATTRIBUTE_VALUE: f32 = 50.0;

pub const ATTRIBUTE_MIN: f32 = 0.0;
pub const ATTRIBUTE_MAX: f32 = 100.0;

/// Closed set of attribute names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
pub enum Attribute {
    #[serde(rename = "Speed")]
    Speed,
    #[serde(rename = "Endurance")]
    Endurance,
    #[serde(rename = "Shoot_Precision")]
    ShootPrecision,
    #[serde(rename = "Shoot_Power")]
    ShootPower,
    #[serde(rename = "Dribble")]
    Dribble,
    #[serde(rename = "Heading")]
    Heading,
    #[serde(rename = "Injury_Risk")]
    InjuryRisk,
    #[serde(rename = "Pass_Precision")]
    PassPrecision,
    #[serde(rename = "Tackle_Precision")]
    TacklePrecision,
    #[serde(rename = "Aggression")]
    Aggression,
    #[serde(rename = "Diving")]
    Diving,
    #[serde(rename = "GK_Kicking")]
    GkKicking,
    #[serde(rename = "Reflexes")]
    Reflexes,
    #[serde(rename = "Game_vision")]
    GameVision,
    #[serde(rename = "Leadership")]
    Leadership,
    #[serde(rename = "Physicality")]
    Physicality,
    #[serde(rename = "Freshness")]
    Freshness,
    #[serde(rename = "Satisfaction")]
    Satisfaction,
    #[serde(rename = "Trainability")]
    Trainability,
}

impl Attribute {
    /// The 16 attributes that feed the primary grade, in weight-vector order.
    pub const CORE: [Attribute; 16] = [
        Attribute::Speed,
        Attribute::Endurance,
        Attribute::ShootPrecision,
        Attribute::ShootPower,
        Attribute::Dribble,
        Attribute::Heading,
        Attribute::InjuryRisk,
        Attribute::PassPrecision,
        Attribute::TacklePrecision,
        Attribute::Aggression,
        Attribute::Diving,
        Attribute::GkKicking,
        Attribute::Reflexes,
        Attribute::GameVision,
        Attribute::Leadership,
        Attribute::Physicality,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Attribute::Speed => "Speed",
            Attribute::Endurance => "Endurance",
            Attribute::ShootPrecision => "Shoot_Precision",
            Attribute::ShootPower => "Shoot_Power",
            Attribute::Dribble => "Dribble",
            Attribute::Heading => "Heading",
            Attribute::InjuryRisk => "Injury_Risk",
            Attribute::PassPrecision => "Pass_Precision",
            Attribute::TacklePrecision => "Tackle_Precision",
            Attribute::Aggression => "Aggression",
            Attribute::Diving => "Diving",
            Attribute::GkKicking => "GK_Kicking",
            Attribute::Reflexes => "Reflexes",
            Attribute::GameVision => "Game_vision",
            Attribute::Leadership => "Leadership",
            Attribute::Physicality => "Physicality",
            Attribute::Freshness => "Freshness",
            Attribute::Satisfaction => "Satisfaction",
            Attribute::Trainability => "Trainability",
        }
    }

    /// 이름 파싱. 저장소에 따라 공백 표기("Injury Risk")도 섞여 있어 둘 다 받는다.
    pub fn from_name(name: &str) -> Option<Attribute> {
        let normalized = name.trim().replace(' ', "_");
        match normalized.as_str() {
            "Speed" => Some(Attribute::Speed),
            "Endurance" => Some(Attribute::Endurance),
            "Shoot_Precision" => Some(Attribute::ShootPrecision),
            "Shoot_Power" => Some(Attribute::ShootPower),
            "Dribble" => Some(Attribute::Dribble),
            "Heading" => Some(Attribute::Heading),
            "Injury_Risk" => Some(Attribute::InjuryRisk),
            "Pass_Precision" => Some(Attribute::PassPrecision),
            "Tackle_Precision" => Some(Attribute::TacklePrecision),
            "Aggression" => Some(Attribute::Aggression),
            "Diving" => Some(Attribute::Diving),
            "GK_Kicking" => Some(Attribute::GkKicking),
            "Reflexes" => Some(Attribute::Reflexes),
            "Game_vision" => Some(Attribute::GameVision),
            "Leadership" => Some(Attribute::Leadership),
            "Physicality" => Some(Attribute::Physicality),
            "Freshness" => Some(Attribute::Freshness),
            "Satisfaction" => Some(Attribute::Satisfaction),
            "Trainability" => Some(Attribute::Trainability),
            _ => None,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Attribute name → value, clamped to [0, 100] on write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeMap(BTreeMap<Attribute, f32>);

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, attr: Attribute) -> Option<f32> {
        self.0.get(&attr).copied()
    }

    /// 없으면 50
    pub fn value_or_default(&self, attr: Attribute) -> f32 {
        self.get(attr).unwrap_or(DEFAULT_ATTRIBUTE_VALUE)
    }

    /// Attributes whose absence materially changes the outcome must not default.
    pub fn require(&self, attr: Attribute, player: &PlayerToken) -> Result<f32> {
        self.get(attr).ok_or_else(|| EngineError::MissingData {
            player: player.clone(),
            attribute: attr,
        })
    }

    pub fn set(&mut self, attr: Attribute, value: f32) {
        self.0.insert(attr, value.clamp(ATTRIBUTE_MIN, ATTRIBUTE_MAX));
    }

    /// 델타 적용 후 클램프. 값이 없던 능력치는 기본값에서 시작한다.
    pub fn apply_delta(&mut self, attr: Attribute, delta: f32) -> f32 {
        let next = self.value_or_default(attr) + delta;
        self.set(attr, next);
        self.value_or_default(attr)
    }

    pub fn remove(&mut self, attr: Attribute) -> Option<f32> {
        self.0.remove(&attr)
    }

    pub fn contains(&self, attr: Attribute) -> bool {
        self.0.contains_key(&attr)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Attribute, f32)> + '_ {
        self.0.iter().map(|(a, v)| (*a, *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Weighted average over `weights`, missing values default to 50.
    pub fn weighted_average(&self, weights: &BTreeMap<Attribute, f32>) -> f32 {
        let total: f32 = weights.values().sum();
        if total <= 0.0 {
            return DEFAULT_ATTRIBUTE_VALUE;
        }
        weights.iter().map(|(a, w)| self.value_or_default(*a) * w).sum::<f32>() / total
    }
}

impl FromIterator<(Attribute, f32)> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = (Attribute, f32)>>(iter: I) -> Self {
        let mut map = AttributeMap::new();
        for (attr, value) in iter {
            map.set(attr, value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_name_round_trip_for_every_attribute() {
        for attr in Attribute::iter() {
            assert_eq!(Attribute::from_name(attr.name()), Some(attr));
        }
        assert_eq!(Attribute::iter().count(), 19);
    }

    #[test]
    fn test_space_separated_names_accepted() {
        assert_eq!(Attribute::from_name("Injury Risk"), Some(Attribute::InjuryRisk));
        assert_eq!(Attribute::from_name("Unknown"), None);
    }

    #[test]
    fn test_set_clamps_to_scale() {
        let mut map = AttributeMap::new();
        map.set(Attribute::Speed, 140.0);
        map.set(Attribute::Dribble, -3.0);
        assert_eq!(map.get(Attribute::Speed), Some(100.0));
        assert_eq!(map.get(Attribute::Dribble), Some(0.0));
    }

    #[test]
    fn test_missing_attribute_defaults_to_fifty() {
        let map = AttributeMap::new();
        assert_eq!(map.value_or_default(Attribute::Heading), DEFAULT_ATTRIBUTE_VALUE);
    }

    #[test]
    fn test_require_reports_missing_freshness() {
        let map: AttributeMap = [(Attribute::Speed, 70.0)].into_iter().collect();
        let token = PlayerToken::from("p-1");
        let err = map.require(Attribute::Freshness, &token).unwrap_err();
        assert_eq!(
            err,
            EngineError::MissingData { player: token, attribute: Attribute::Freshness }
        );
    }

    #[test]
    fn test_json_uses_canonical_names() {
        let map: AttributeMap =
            [(Attribute::GameVision, 61.0), (Attribute::GkKicking, 40.0)].into_iter().collect();
        let json = serde_json::to_string(&map).unwrap();
        assert!(json.contains("\"Game_vision\""));
        assert!(json.contains("\"GK_Kicking\""));
        let back: AttributeMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}
