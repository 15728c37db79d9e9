//! Calibration batch
//!
//! 같은 두 팀으로 `n` 경기를 병렬 시뮬레이션해서 득점 분포를 요약한다.
//! 경기마다 `derive_seed(base_seed, "calibration-{i}")` 로 독립 시드를 쓰므로 스레드 수와 무관하게
//! 결과가 같다.

use std::collections::HashSet;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::config::SimConfig;
use crate::engine::derive_seed;
use crate::engine::match_sim::{build_outcome_model, TeamSheet};
use crate::error::Result;
use crate::models::Lineup;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub matches: usize,
    pub mean_home_goals: f64,
    pub mean_away_goals: f64,
    /// mean(home − away)
    pub mean_goal_difference: f64,
    pub home_wins: usize,
    pub draws: usize,
    pub away_wins: usize,
}

/// Simulate `n` regular-time scores between `home` and `away`.
pub fn run_batch(home: &Lineup, away: &Lineup, config: &SimConfig, base_seed: u64, n: usize) -> Result<BatchSummary> {
    let home_sheet = TeamSheet::build(home.clone(), config, HashSet::new())?;
    let away_sheet = TeamSheet::build(away.clone(), config, HashSet::new())?;
    let model = build_outcome_model(config);
    let duration = config.regular_minutes;

    let scores: Vec<(u32, u32)> = (0..n)
        .into_par_iter()
        .map(|i| {
            let seed = derive_seed(base_seed, &format!("calibration-{i}"));
            let score = model.simulate(&home_sheet, &away_sheet, duration, seed);
            (score.home, score.away)
        })
        .collect();

    if scores.is_empty() {
        return Ok(BatchSummary::default());
    }
    let count = scores.len() as f64;
    let home_goals: u64 = scores.iter().map(|(h, _)| *h as u64).sum();
    let away_goals: u64 = scores.iter().map(|(_, a)| *a as u64).sum();
    let summary = BatchSummary {
        matches: scores.len(),
        mean_home_goals: home_goals as f64 / count,
        mean_away_goals: away_goals as f64 / count,
        mean_goal_difference: (home_goals as f64 - away_goals as f64) / count,
        home_wins: scores.iter().filter(|(h, a)| h > a).count(),
        draws: scores.iter().filter(|(h, a)| h == a).count(),
        away_wins: scores.iter().filter(|(h, a)| h < a).count(),
    };
    log::info!(
        "calibration ({} model): {} matches, {:.2}-{:.2} mean, diff {:+.3}",
        model.name(),
        summary.matches,
        summary.mean_home_goals,
        summary.mean_away_goals,
        summary.mean_goal_difference
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::match_sim::test_support::lineup;

    #[test]
    fn test_identical_teams_balance_out() {
        let team = lineup("h", 70.0);
        let twin = lineup("a", 70.0);
        let summary = run_batch(&team, &twin, &SimConfig::default(), 2024, 1000).unwrap();
        assert_eq!(summary.matches, 1000);
        assert_eq!(summary.home_wins + summary.draws + summary.away_wins, 1000);
        assert!(summary.mean_goal_difference.abs() < 0.25, "{summary:?}");
        assert!(summary.mean_home_goals > 0.0);
    }

    #[test]
    fn test_stronger_side_scores_more_under_both_models() {
        let strong = lineup("s", 90.0);
        let weak = lineup("w", 40.0);
        for config in [SimConfig::realistic(), SimConfig::low_fidelity()] {
            let summary = run_batch(&strong, &weak, &config, 7, 300).unwrap();
            assert!(summary.mean_goal_difference > 0.0, "{summary:?}");
        }
    }

    #[test]
    fn test_batch_is_reproducible() {
        let (h, a) = (lineup("h", 65.0), lineup("a", 75.0));
        let first = run_batch(&h, &a, &SimConfig::default(), 99, 64).unwrap();
        let second = run_batch(&h, &a, &SimConfig::default(), 99, 64).unwrap();
        assert_eq!(first, second);
        assert_eq!(run_batch(&h, &a, &SimConfig::default(), 99, 0).unwrap().matches, 0);
    }
}
