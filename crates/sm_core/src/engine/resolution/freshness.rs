//! Freshness (fatigue) deltas. The engine only computes raw deltas; persistence clamps to [0, 100].

use crate::engine::config::FreshnessConfig;
use crate::engine::match_sim::PeriodKind;

/// 정규 1.0, 연장 전반 1.3, 후반 1.5
pub fn period_multiplier(kind: PeriodKind, config: &FreshnessConfig) -> f32 {
    match kind {
        PeriodKind::Regular => 1.0,
        PeriodKind::ExtraTime1 => config.extra_time_multipliers[0],
        PeriodKind::ExtraTime2 => config.extra_time_multipliers[1],
    }
}

/// `-(35 - endurance/4) * (minutes/90) * multiplier`, never positive.
pub fn drain(endurance: f32, minutes: f32, multiplier: f32, config: &FreshnessConfig) -> f32 {
    if config.regular_minutes <= 0.0 || minutes <= 0.0 {
        return 0.0;
    }
    let per_match = (config.base_drain - endurance / config.endurance_divisor).max(0.0);
    -(per_match * (minutes / config.regular_minutes) * multiplier.max(0.0))
}

/// Drain for `minutes` played inside one period.
pub fn period_drain(endurance: f32, minutes: u8, kind: PeriodKind, config: &FreshnessConfig) -> f32 {
    drain(endurance, minutes as f32, period_multiplier(kind, config), config)
}

/// 레이스: 풀 매치 소모량의 `share` 만큼
pub fn competition_drain(endurance: f32, share: f32, config: &FreshnessConfig) -> f32 {
    drain(endurance, config.regular_minutes, 1.0, config) * share
}
