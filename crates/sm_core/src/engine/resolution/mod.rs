//! Post-Game Resolution Pipeline
//!
//! 경기 중 누적된 [`PerformanceBook`] 을 최종 [`PlayerPerformance`] 로 확정한다.
//!
//! 1. 출전 시간, 기준 점수, 종합 점수 (0.5 단위)
//! 2. 능력치 성장 (출전 선수만)
//! 3. 최우수 선수 (MOTM)
//! 4. 종합 점수 순위 → 5분위 만족도 + 보정
//! 5. 경기 종류 계수 (만족도 / 피로도)

pub mod freshness;
pub mod growth;
pub mod satisfaction;
pub mod scoring;

use rand::RngCore;

use crate::engine::config::{KindFactors, MotmWeights, ResolutionConfig};
use crate::models::{PerformanceBook, PlayerPerformance, PlayerToken, TeamId};

pub use scoring::{round_to_half, TeamResult};

/// Final-whistle facts the pipeline needs.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchContext {
    pub home: TeamId,
    pub away: TeamId,
    pub home_score: u32,
    pub away_score: u32,
    /// 경기가 끝난 분 (90 / 105 / 120)
    pub final_minute: u8,
    /// 치른 연장 기간 수 (0-2)
    pub extra_periods: u8,
    /// 마지막으로 치른 기간의 피로 계수
    pub last_period_fatigue: f32,
    pub shootout_winner: Option<TeamId>,
    pub kind_factors: KindFactors,
}

impl MatchContext {
    pub fn result_for(&self, team: &TeamId) -> TeamResult {
        let result = if team == &self.home {
            TeamResult::new(self.home_score, self.away_score)
        } else {
            TeamResult::new(self.away_score, self.home_score)
        };
        match &self.shootout_winner {
            Some(winner) => result.with_shootout(winner == team),
            None => result,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub performances: Vec<PlayerPerformance>,
    pub man_of_the_match: Option<PlayerToken>,
}

/// `100·team_won + 50·overall_score + 5·goals + 3·assists + 3·defense_actions`.
pub fn motm_composite(perf: &PlayerPerformance, weights: &MotmWeights) -> f32 {
    let won = if perf.team_won { 1.0 } else { 0.0 };
    weights.team_won * won
        + weights.overall_score * perf.overall_score
        + weights.goal * perf.scored_goal as f32
        + weights.assist * perf.assist as f32
        + weights.defense_action * perf.defense_action as f32
}

/// 출전 선수 중 최고 점수. 동점이면 먼저 등록된 선수.
pub fn man_of_the_match(performances: &[PlayerPerformance], weights: &MotmWeights) -> Option<PlayerToken> {
    let mut best: Option<(&PlayerPerformance, f32)> = None;
    for perf in performances.iter().filter(|p| p.minutes_played > 0) {
        let score = motm_composite(perf, weights);
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((perf, score));
        }
    }
    best.map(|(p, _)| p.player.clone())
}

pub fn resolve_match(
    book: &PerformanceBook,
    ctx: &MatchContext,
    config: &ResolutionConfig,
    rng: &mut dyn RngCore,
) -> Resolution {
    let extra_time_fatigue = (ctx.extra_periods > 0).then_some(ctx.last_period_fatigue);
    let mut performances: Vec<PlayerPerformance> = Vec::with_capacity(book.len());

    for sheet in book.sheets() {
        let result = ctx.result_for(&sheet.team_id);
        let minutes = sheet.minutes_played(ctx.final_minute);
        let mut attribute_deltas = sheet.attribute_deltas.clone();
        let overall = if minutes > 0 {
            let baseline = scoring::draw_baseline(rng, &config.score, extra_time_fatigue);
            let earned = growth::match_growth(result.won(), ctx.extra_periods, &config.growth, rng);
            growth::merge_growth(&mut attribute_deltas, &earned, config.growth.max_delta);
            scoring::overall_score(sheet, result, baseline, &config.score)
        } else {
            0.0
        };

        performances.push(PlayerPerformance {
            player: sheet.player.clone(),
            team_id: sheet.team_id.clone(),
            position: sheet.position,
            minutes_played: minutes,
            overall_score: overall,
            scored_goal: sheet.goals,
            assist: sheet.assists,
            defense_action: sheet.defense_actions,
            shots: sheet.shots,
            yellow_cards: sheet.yellow_cards,
            red_card: sheet.red_card,
            attribute_deltas,
            freshness_delta: (sheet.freshness_delta * ctx.kind_factors.freshness).min(0.0),
            satisfaction_delta: 0.0,
            team_won: result.won(),
            injured: false,
            punished: sheet.punished(),
            man_of_the_match: false,
        });
    }

    let motm = man_of_the_match(&performances, &config.motm);

    // 안정 정렬: 동점은 먼저 등록된 선수가 앞
    let mut ranked: Vec<usize> = (0..performances.len()).filter(|&i| performances[i].minutes_played > 0).collect();
    ranked.sort_by(|&a, &b| performances[b].overall_score.total_cmp(&performances[a].overall_score));
    let mut quintiles = vec![0.0f32; performances.len()];
    for (rank, &idx) in ranked.iter().enumerate() {
        quintiles[idx] = satisfaction::quintile_delta(rank, ranked.len(), &config.satisfaction);
    }

    for (perf, quintile_delta) in performances.iter_mut().zip(quintiles) {
        perf.man_of_the_match = motm.as_ref() == Some(&perf.player);
        let raw = if perf.minutes_played > 0 {
            let mood = satisfaction::MatchMood {
                quintile_delta,
                minutes_played: perf.minutes_played,
                goals: perf.scored_goal,
                assists: perf.assist,
                man_of_the_match: perf.man_of_the_match,
                improved: perf.improved(),
                result: ctx.result_for(&perf.team_id),
            };
            satisfaction::match_delta(&mood, &config.satisfaction)
        } else {
            config.satisfaction.non_participant
        };
        perf.satisfaction_delta = raw * ctx.kind_factors.satisfaction;
    }

    log::debug!(
        "resolved {} performances for {} {}-{} {}, motm {:?}",
        performances.len(),
        ctx.home,
        ctx.home_score,
        ctx.away_score,
        ctx.away,
        motm
    );
    Resolution { performances, man_of_the_match: motm }
}
