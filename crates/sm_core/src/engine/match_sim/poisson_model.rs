//! Poisson / rank outcome model for lower-fidelity fixtures.
//!
//! rank(1-100) → 0.5-1.5 배율^1.5, xG = offense × opponent defense × 리그 평균(1.4).

use rand::{Rng, RngCore};
use rand_distr::{Distribution, Poisson};

use super::zone::Zone;
use super::{random_clock, Chance, ChanceKind, OutcomeModel, PeriodSpec, PeriodTimeline, TeamSheet, TeamSide};
use crate::engine::config::{PoissonConfig, SimConfig};
use crate::engine::grading::TeamRating;

#[derive(Debug, Clone)]
pub struct PoissonOutcomeModel {
    config: PoissonConfig,
    regular_minutes: u8,
}

/// Sample once from Poisson(λ); λ ≤ 0 yields 0.
fn sample_poisson(rng: &mut dyn RngCore, lambda: f32) -> u32 {
    if lambda <= 0.0 || !lambda.is_finite() {
        return 0;
    }
    match Poisson::new(lambda as f64) {
        Ok(dist) => {
            let n: f64 = dist.sample(rng);
            n as u32
        }
        Err(_) => 0,
    }
}

/// 존은 균등, 위험도는 슈팅 4-5 / 파울 1-3
fn push_chance(
    rng: &mut dyn RngCore,
    timeline: &mut PeriodTimeline,
    period: &PeriodSpec,
    side: TeamSide,
    kind: ChanceKind,
) {
    let zone = Zone::ATTACKING[rng.gen_range(0..Zone::ATTACKING.len())];
    let danger = match kind {
        ChanceKind::Shot { .. } => rng.gen_range(4..=5),
        ChanceKind::Foul => rng.gen_range(1..=3),
    };
    let clock = random_clock(rng, period.start_minute, period.end_minute);
    timeline.record(Chance { clock, side, zone, danger, kind });
}

impl PoissonOutcomeModel {
    pub fn new(config: &SimConfig) -> Self {
        Self { config: config.poisson.clone(), regular_minutes: config.regular_minutes }
    }

    /// `(0.5 + (rank - 1) / 99) ^ exponent`, rank clamped to 1-100.
    pub fn rank_multiplier(&self, rank: f32) -> f32 {
        let rank = rank.clamp(1.0, 100.0);
        (0.5 + (rank - 1.0) / 99.0).powf(self.config.rank_exponent)
    }

    /// Expected goals for `attacker` against `defender` over a full regular match.
    pub fn expected_goals(&self, attacker: &TeamRating, defender: &TeamRating) -> f32 {
        let offense = self.rank_multiplier(attacker.offense) * self.rank_multiplier(attacker.midfield);
        let defense = (2.0 - self.rank_multiplier(defender.defense)) * self.rank_multiplier(defender.midfield);
        (offense * defense * self.config.league_average_goals).max(0.0)
    }

    /// 합계가 `cap` 을 넘는 결과는 다시 뽑는다 (상한 이내 결과 열거와 같은 분포).
    fn sample_score(&self, rng: &mut dyn RngCore, home_xg: f32, away_xg: f32, cap: u32) -> (u32, u32) {
        for _ in 0..self.config.max_resamples.max(1) {
            let h = sample_poisson(rng, home_xg);
            let a = sample_poisson(rng, away_xg);
            if h + a <= cap {
                return (h, a);
            }
        }
        // 재추출 한도 초과: 비율을 유지한 채 상한으로 축소
        let h = sample_poisson(rng, home_xg);
        let a = sample_poisson(rng, away_xg);
        let total = (h + a).max(1) as f32;
        let h_capped = ((h as f32 / total) * cap as f32).round() as u32;
        (h_capped.min(cap), cap.saturating_sub(h_capped.min(cap)).min(a))
    }
}

impl OutcomeModel for PoissonOutcomeModel {
    fn name(&self) -> &'static str {
        "poisson"
    }

    fn simulate_period(
        &self,
        home: &TeamSheet,
        away: &TeamSheet,
        period: &PeriodSpec,
        goals_so_far: u32,
        rng: &mut dyn RngCore,
    ) -> PeriodTimeline {
        let mut timeline = PeriodTimeline::default();
        if period.duration() == 0 {
            return timeline;
        }
        let share = period.duration() as f32 / self.regular_minutes.max(1) as f32;
        let home_xg = self.expected_goals(&home.rating, &away.rating) * share;
        let away_xg = self.expected_goals(&away.rating, &home.rating) * share;
        // 상한은 경기 전체 합계 기준, 앞 구간 득점만큼 줄어든다
        let headroom = self.config.max_total_goals.saturating_sub(goals_so_far);
        let (home_goals, away_goals) = self.sample_score(rng, home_xg, away_xg, headroom);

        for (side, goals, xg) in [(TeamSide::Home, home_goals, home_xg), (TeamSide::Away, away_goals, away_xg)] {
            for _ in 0..goals {
                push_chance(rng, &mut timeline, period, side, ChanceKind::Shot { goal: true });
            }
            let misses = sample_poisson(rng, xg * self.config.missed_shots_per_goal);
            for _ in 0..misses {
                push_chance(rng, &mut timeline, period, side, ChanceKind::Shot { goal: false });
            }
        }

        let fouls = sample_poisson(rng, self.config.fouls_per_90 * share);
        for _ in 0..fouls {
            let side = if rng.gen_bool(0.5) { TeamSide::Home } else { TeamSide::Away };
            push_chance(rng, &mut timeline, period, side, ChanceKind::Foul);
        }

        timeline.sort();
        log::debug!(
            "poisson model {}: xG {home_xg:.2}-{away_xg:.2}, score {home_goals}-{away_goals}",
            period.kind
        );
        timeline
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::sheet;
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_rank_multiplier_range() {
        let model = PoissonOutcomeModel::new(&SimConfig::low_fidelity());
        assert!((model.rank_multiplier(1.0) - 0.5f32.powf(1.5)).abs() < 1e-6);
        assert!((model.rank_multiplier(100.0) - 1.5f32.powf(1.5)).abs() < 1e-6);
        assert_eq!(model.rank_multiplier(-20.0), model.rank_multiplier(1.0));
    }

    #[test]
    fn test_expected_goals_favor_stronger_attack() {
        let model = PoissonOutcomeModel::new(&SimConfig::low_fidelity());
        let strong = TeamRating { defense: 50.0, midfield: 50.0, offense: 90.0 };
        let weak = TeamRating { defense: 50.0, midfield: 50.0, offense: 20.0 };
        assert!(model.expected_goals(&strong, &weak) > model.expected_goals(&weak, &strong));
    }

    #[test]
    fn test_total_goals_capped() {
        let mut cfg = SimConfig::low_fidelity();
        cfg.poisson.league_average_goals = 6.0;
        let model = PoissonOutcomeModel::new(&cfg);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..200 {
            let (h, a) = model.sample_score(&mut rng, 5.0, 5.0, cfg.poisson.max_total_goals);
            assert!(h + a <= cfg.poisson.max_total_goals);
        }
    }

    #[test]
    fn test_later_slices_respect_match_total() {
        let mut cfg = SimConfig::low_fidelity();
        cfg.poisson.league_average_goals = 8.0;
        let model = PoissonOutcomeModel::new(&cfg);
        let (home, away) = (sheet("h", 95.0), sheet("a", 95.0));
        let cap = cfg.poisson.max_total_goals;
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        for _ in 0..50 {
            let mut total = 0;
            for start in (0..90u8).step_by(15) {
                let period = PeriodSpec::regular(start, start + 15);
                let timeline = model.simulate_period(&home, &away, &period, total, &mut rng);
                total += timeline.home_goals + timeline.away_goals;
            }
            assert!(total <= cap, "{total} goals");
        }
        let spent = model.simulate_period(&home, &away, &PeriodSpec::regular(75, 90), cap, &mut rng);
        assert_eq!(spent.home_goals + spent.away_goals, 0);
    }

    #[test]
    fn test_timeline_goals_match_score() {
        let model = PoissonOutcomeModel::new(&SimConfig::low_fidelity());
        let (home, away) = (sheet("h", 75.0), sheet("a", 60.0));
        for seed in 0..20 {
            let result = model.simulate(&home, &away, 90, seed);
            let goals = |side| {
                result
                    .timeline
                    .chances
                    .iter()
                    .filter(|c| c.side == side && c.kind == ChanceKind::Shot { goal: true })
                    .count() as u32
            };
            assert_eq!(goals(TeamSide::Home), result.home);
            assert_eq!(goals(TeamSide::Away), result.away);
            assert!(result.timeline.chances.windows(2).all(|w| w[0].clock <= w[1].clock));
        }
    }
}
