//! Team Grading Engine
//!
//! 포메이션 + 선수 능력치 → {defense, midfield, offense} 팀 등급.
//!
//! 1. 선수마다 개인 등급 3개: primary (포지션 가중합) + 2개의 secondary (부분집합 평균)
//! 2. primary 는 역할 그룹에 따라 defense / midfield / offense 중 하나를 대체
//! 3. 개인 등급 × Freshness/100
//! 4. 포지션 × 카테고리 가중치로 팀 합산
//! 5. 포지션 수 보정

use serde::{Deserialize, Serialize};

use crate::engine::config::GradingConfig;
use crate::error::Result;
use crate::models::{Attribute, Lineup, LineupEntry, RoleGroup};

/// Derived team ratings. Recomputed on demand, never a source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TeamRating {
    pub defense: f32,
    pub midfield: f32,
    pub offense: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PersonalGrades {
    pub defense: f32,
    pub midfield: f32,
    pub offense: f32,
}

fn subset_average(entry: &LineupEntry, subset: &[Attribute]) -> f32 {
    if subset.is_empty() {
        return 0.0;
    }
    subset.iter().map(|a| entry.player.attr(*a)).sum::<f32>() / subset.len() as f32
}

/// Primary grade: position weight vector over the 16 core attributes, normalized by the weight sum.
pub fn primary_grade(entry: &LineupEntry, config: &GradingConfig) -> f32 {
    let Some(weights) = config.primary_weights.get(&entry.position) else {
        return 0.0;
    };
    let total: f32 = weights.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    Attribute::CORE
        .iter()
        .zip(weights.iter())
        .map(|(attr, w)| entry.player.attr(*attr) * w)
        .sum::<f32>()
        / total
}

/// Freshness 누락은 조용히 기본값 처리하지 않는다.
pub fn personal_grades(entry: &LineupEntry, config: &GradingConfig) -> Result<PersonalGrades> {
    let freshness = entry.player.freshness()?;
    let primary = primary_grade(entry, config);
    let mut grades = PersonalGrades {
        defense: subset_average(entry, &config.defense_subset),
        midfield: subset_average(entry, &config.midfield_subset),
        offense: subset_average(entry, &config.offense_subset),
    };
    match entry.position.role_group() {
        RoleGroup::Defensive => grades.defense = primary,
        RoleGroup::Midfield => grades.midfield = primary,
        RoleGroup::Attacking => grades.offense = primary,
    }

    let scale = freshness / 100.0;
    grades.defense *= scale;
    grades.midfield *= scale;
    grades.offense *= scale;
    Ok(grades)
}

/// `grade(formation) -> {defense, midfield, offense}`
pub fn grade(lineup: &Lineup, config: &GradingConfig) -> Result<TeamRating> {
    // 슬롯 순으로 정렬해 합산 순서를 고정한다 (입력 순서와 무관한 결과)
    let mut entries: Vec<&LineupEntry> = lineup.entries.iter().collect();
    entries.sort_by(|a, b| a.slot.cmp(&b.slot).then_with(|| a.player.token.cmp(&b.player.token)));

    let mut rating = TeamRating::default();
    for entry in entries {
        let grades = personal_grades(entry, config)?;
        let Some(factors) = config.category_factors.get(&entry.position) else {
            continue;
        };
        rating.defense += grades.defense * factors.defense;
        rating.midfield += grades.midfield * factors.midfield;
        rating.offense += grades.offense * factors.offense;
    }

    rating.offense *= config.attack_count.factor(lineup.count(RoleGroup::Attacking));
    rating.defense *= config.defense_count.factor(lineup.count(RoleGroup::Defensive));
    rating.midfield *= config.midfield_count.factor(lineup.count(RoleGroup::Midfield));

    log::debug!(
        "graded {}: defense {:.2}, midfield {:.2}, offense {:.2}",
        lineup.team,
        rating.defense,
        rating.midfield,
        rating.offense
    );
    Ok(rating)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::models::{Player, Position, Slot, TeamId};
    use proptest::prelude::*;

    fn entry(token: &str, slot: Slot, attrs: &[(Attribute, f32)]) -> LineupEntry {
        let player = Player::new(token, token).with_attributes(attrs);
        let position = slot.position().unwrap();
        LineupEntry { player, slot, position }
    }

    fn gk_and_cb(gk_fresh: f32, cb_fresh: f32) -> Lineup {
        use Attribute::*;
        let gk = entry(
            "gk",
            Slot::new(0, 2),
            &[(Reflexes, 80.0), (Diving, 70.0), (GkKicking, 60.0), (GameVision, 50.0), (Freshness, gk_fresh)],
        );
        let cb = entry(
            "cb",
            Slot::new(1, 2),
            &[
                (TacklePrecision, 70.0),
                (Aggression, 60.0),
                (Physicality, 65.0),
                (Heading, 50.0),
                (PassPrecision, 55.0),
                (GameVision, 50.0),
                (Freshness, cb_fresh),
            ],
        );
        let st = entry("st", Slot::new(5, 2), &[(Freshness, 100.0)]);
        Lineup::from_entries(TeamId::from("t"), vec![gk, cb, st]).unwrap()
    }

    #[test]
    fn test_fresh_defense_beats_tired_defense() {
        let cfg = GradingConfig::default();
        let fresh = grade(&gk_and_cb(100.0, 100.0), &cfg).unwrap();
        let tired_gk = grade(&gk_and_cb(50.0, 100.0), &cfg).unwrap();
        let tired_cb = grade(&gk_and_cb(100.0, 50.0), &cfg).unwrap();
        assert!(fresh.defense > tired_gk.defense);
        assert!(fresh.defense > tired_cb.defense);
    }

    #[test]
    fn test_missing_freshness_is_an_error() {
        let cfg = GradingConfig::default();
        let cb = entry("cb", Slot::new(1, 2), &[(Attribute::TacklePrecision, 70.0)]);
        let st = entry("st", Slot::new(5, 2), &[(Attribute::Freshness, 100.0)]);
        let lineup = Lineup::from_entries(TeamId::from("t"), vec![cb, st]).unwrap();
        let err = grade(&lineup, &cfg).unwrap_err();
        assert!(matches!(err, EngineError::MissingData { attribute: Attribute::Freshness, .. }));
    }

    #[test]
    fn test_primary_grade_goes_to_role_group() {
        let cfg = GradingConfig::default();
        let st = entry(
            "st",
            Slot::new(5, 2),
            &[(Attribute::ShootPrecision, 90.0), (Attribute::ShootPower, 90.0), (Attribute::Freshness, 100.0)],
        );
        let grades = personal_grades(&st, &cfg).unwrap();
        assert!((grades.offense - primary_grade(&st, &cfg)).abs() < 1e-4);
        // defense subset untouched: Speed, Heading, Tackle, Aggression, Leadership all default 50
        assert!((grades.defense - 50.0).abs() < 1e-4);
        assert_eq!(st.position, Position::Striker);
    }

    #[test]
    fn test_midfield_pair_gets_balanced_bonus() {
        let cfg = GradingConfig::default();
        let fresh = [(Attribute::Freshness, 100.0)];
        let two = Lineup::from_entries(
            TeamId::from("t"),
            vec![entry("m1", Slot::new(2, 1), &fresh), entry("m2", Slot::new(2, 3), &fresh)],
        )
        .unwrap();
        let three = Lineup::from_entries(
            TeamId::from("t"),
            vec![
                entry("m1", Slot::new(2, 1), &fresh),
                entry("m2", Slot::new(2, 3), &fresh),
                entry("m3", Slot::new(2, 2), &fresh),
            ],
        )
        .unwrap();
        let pair = grade(&two, &cfg).unwrap().midfield;
        let trio = grade(&three, &cfg).unwrap().midfield;
        // 2명: 2×50×0.3×1.31 = 39.3, 3명: 3×50×0.3 = 45
        assert!((pair - 39.3).abs() < 0.01, "pair {pair}");
        assert!((trio - 45.0).abs() < 0.01, "trio {trio}");
    }

    proptest! {
        #[test]
        fn prop_grade_ignores_entry_order(
            values in prop::collection::vec(20.0f32..100.0, 6),
            rotation in 0usize..6,
        ) {
            let cfg = GradingConfig::default();
            let slots = [Slot::new(0, 2), Slot::new(1, 1), Slot::new(1, 3), Slot::new(2, 2), Slot::new(4, 0), Slot::new(5, 2)];
            let entries: Vec<LineupEntry> = slots
                .iter()
                .zip(values.iter())
                .enumerate()
                .map(|(i, (slot, v))| {
                    entry(
                        &format!("p{i}"),
                        *slot,
                        &[(Attribute::Speed, *v), (Attribute::PassPrecision, 100.0 - v), (Attribute::Freshness, *v)],
                    )
                })
                .collect();
            let mut rotated = entries.clone();
            rotated.rotate_left(rotation);
            rotated.reverse();

            let a = grade(&Lineup { team: TeamId::from("t"), entries, bench: vec![] }, &cfg).unwrap();
            let b = grade(&Lineup { team: TeamId::from("t"), entries: rotated, bench: vec![] }, &cfg).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
