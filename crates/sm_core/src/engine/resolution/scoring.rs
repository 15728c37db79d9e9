//! Per-player overall score (0-5, 0.5 단위).

use rand::{Rng, RngCore};

use crate::engine::config::ScoreConfig;
use crate::models::PerformanceSheet;

/// One side's view of the final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamResult {
    pub scored: u32,
    pub conceded: u32,
    /// 승부차기 결과 (동점 경기만 의미 있음)
    pub shootout: Option<bool>,
}

impl TeamResult {
    pub fn new(scored: u32, conceded: u32) -> Self {
        Self { scored, conceded, shootout: None }
    }

    pub fn with_shootout(mut self, won: bool) -> Self {
        self.shootout = Some(won);
        self
    }

    pub fn won(&self) -> bool {
        self.scored > self.conceded || (self.scored == self.conceded && self.shootout == Some(true))
    }

    pub fn drew(&self) -> bool {
        self.scored == self.conceded && self.shootout.is_none()
    }

    pub fn margin(&self) -> u32 {
        self.scored.abs_diff(self.conceded)
    }
}

/// `floor(2x + 0.5) / 2`: nearest half, ties round up. Result clamped to `[0, max]`.
pub fn round_to_half(value: f32, max: f32) -> f32 {
    if !value.is_finite() {
        return 0.0;
    }
    let clamped = value.clamp(0.0, max);
    ((clamped * 2.0 + 0.5).floor() / 2.0).clamp(0.0, max)
}

/// 기준 점수. 연장전까지 간 경기는 낮은 범위 × 마지막 기간의 피로 계수.
pub fn draw_baseline(rng: &mut dyn RngCore, config: &ScoreConfig, extra_time_fatigue: Option<f32>) -> f32 {
    match extra_time_fatigue {
        Some(fatigue) => {
            let (lo, hi) = config.extra_time_baseline;
            rng.gen_range(lo..=hi) * fatigue
        }
        None => {
            let (lo, hi) = config.baseline;
            rng.gen_range(lo..=hi)
        }
    }
}

/// Baseline plus result, positional, contribution and card adjustments, rounded to a half step.
pub fn overall_score(sheet: &PerformanceSheet, result: TeamResult, baseline: f32, config: &ScoreConfig) -> f32 {
    let mut score = baseline;
    if result.won() {
        score += config.win_bonus;
    }
    if let Some(position) = sheet.position {
        if config.defensive_bonus_positions.contains(&position) && result.conceded <= config.defensive_max_conceded {
            score += config.defensive_bonus;
        }
        if config.attacking_bonus_positions.contains(&position) && result.scored > config.attacking_min_scored {
            score += config.attacking_bonus;
        }
    }
    score += config.goal_weight * sheet.goals as f32;
    score += config.assist_weight * sheet.assists as f32;
    score += config.defense_action_weight * sheet.defense_actions as f32;
    if sheet.punished() {
        score -= config.card_penalty;
    }
    round_to_half(score, config.max_score)
}
