//! Satisfaction deltas: quintile bands shared by matches and competitions, plus match modifiers.

use crate::engine::config::SatisfactionConfig;

use super::scoring::TeamResult;

/// 0 (상위 20%) ~ 4 (하위 20%). `rank_index` 는 0부터.
///
/// `floor(rank_index * 5 / count)` gives five contiguous bands whose sizes differ by at most one.
pub fn quintile_band(rank_index: usize, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    (rank_index.min(count - 1) * 5 / count).min(4)
}

pub fn quintile_delta(rank_index: usize, count: usize, config: &SatisfactionConfig) -> f32 {
    config.quintile_deltas[quintile_band(rank_index, count)]
}

/// Inputs for one participant's match satisfaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchMood {
    pub quintile_delta: f32,
    pub minutes_played: u8,
    pub goals: u32,
    pub assists: u32,
    pub man_of_the_match: bool,
    pub improved: bool,
    pub result: TeamResult,
}

pub fn minutes_delta(minutes: u8, config: &SatisfactionConfig) -> f32 {
    if minutes == 0 {
        return config.unused_minutes_delta;
    }
    config
        .minutes_tiers
        .iter()
        .find(|(min, _)| minutes >= *min)
        .map(|(_, delta)| *delta)
        .unwrap_or(0.0)
}

/// 결과 보정: 오래 뛴 선수일수록 승패의 영향이 크다. 대승/대패는 ±2 추가.
pub fn result_delta(result: TeamResult, minutes: u8, config: &SatisfactionConfig) -> f32 {
    let long = minutes > config.long_minutes;
    let mut delta = if result.won() {
        if long { config.win_long } else { config.win_short }
    } else if result.drew() {
        if long { config.draw_long } else { config.draw_short }
    } else if long {
        config.loss_long
    } else {
        config.loss_short
    };
    if result.margin() >= config.blowout_margin {
        delta += if result.won() { config.blowout_delta } else { -config.blowout_delta };
    }
    delta
}

pub fn match_delta(mood: &MatchMood, config: &SatisfactionConfig) -> f32 {
    let mut delta = mood.quintile_delta;
    if mood.man_of_the_match {
        delta += config.motm_bonus;
    }
    delta += config.goal_bonus * mood.goals as f32;
    delta += config.assist_bonus * mood.assists as f32;
    if mood.improved {
        delta += config.improvement_bonus;
    }
    delta += minutes_delta(mood.minutes_played, config);
    delta += result_delta(mood.result, mood.minutes_played, config);
    delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_quintile_examples() {
        let cfg = SatisfactionConfig::default();
        let deltas: Vec<f32> = (0..10).map(|i| quintile_delta(i, 10, &cfg)).collect();
        assert_eq!(deltas, vec![10.0, 10.0, 5.0, 5.0, 0.0, 0.0, -5.0, -5.0, -10.0, -10.0]);
        assert_eq!(quintile_delta(0, 1, &cfg), 10.0);
    }

    #[test]
    fn test_minutes_tiers() {
        let cfg = SatisfactionConfig::default();
        assert_eq!(minutes_delta(90, &cfg), 4.0);
        assert_eq!(minutes_delta(72, &cfg), 4.0);
        assert_eq!(minutes_delta(71, &cfg), 2.0);
        assert_eq!(minutes_delta(36, &cfg), 2.0);
        assert_eq!(minutes_delta(35, &cfg), 0.0);
        assert_eq!(minutes_delta(0, &cfg), -2.0);
    }

    #[test]
    fn test_blowout_result() {
        let cfg = SatisfactionConfig::default();
        assert_eq!(result_delta(TeamResult::new(4, 0), 90, &cfg), 6.0);
        assert_eq!(result_delta(TeamResult::new(0, 3), 30, &cfg), -4.0);
        assert_eq!(result_delta(TeamResult::new(1, 1), 30, &cfg), 0.0);
    }

    #[test]
    fn test_full_match_delta() {
        let cfg = SatisfactionConfig::default();
        let mood = MatchMood {
            quintile_delta: 10.0,
            minutes_played: 90,
            goals: 2,
            assists: 1,
            man_of_the_match: true,
            improved: true,
            result: TeamResult::new(2, 1),
        };
        // 10 + 4 + 4 + 2 + 4 + 4 + 4
        assert_eq!(match_delta(&mood, &cfg), 32.0);
    }

    proptest! {
        #[test]
        fn prop_quintiles_partition_contiguously(count in 1usize..200) {
            let bands: Vec<usize> = (0..count).map(|i| quintile_band(i, count)).collect();
            prop_assert!(bands.windows(2).all(|w| w[0] <= w[1]));
            let mut sizes = [0usize; 5];
            for b in &bands {
                sizes[*b] += 1;
            }
            prop_assert_eq!(sizes.iter().sum::<usize>(), count);
            let expected = count as f32 / 5.0;
            for size in sizes {
                prop_assert!((size as f32 - expected).abs() <= 1.0);
            }
        }
    }
}
