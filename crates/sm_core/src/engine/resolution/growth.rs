//! Post-match attribute growth.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

use crate::engine::config::GrowthConfig;
use crate::models::Attribute;

/// 승리 팀은 1-3개 능력치 +0.01, 그 외 0-2개 +0.005.
/// 연장 기간마다 30% 확률로 능력치 하나가 추가로 성장한다.
pub fn match_growth(
    team_won: bool,
    extra_periods: u8,
    config: &GrowthConfig,
    rng: &mut dyn RngCore,
) -> BTreeMap<Attribute, f32> {
    let mut deltas = BTreeMap::new();
    if config.pool.is_empty() {
        return deltas;
    }

    let ((lo, hi), value) =
        if team_won { (config.win_count, config.win_value) } else { (config.other_count, config.other_value) };
    let count = rng.gen_range(lo..=hi.max(lo)) as usize;
    for attr in config.pool.choose_multiple(rng, count) {
        *deltas.entry(*attr).or_insert(0.0) += value;
    }

    let extra_value = if team_won { config.extra_time_win_value } else { config.extra_time_other_value };
    for _ in 0..extra_periods {
        if rng.gen::<f32>() < config.extra_time_chance {
            if let Some(attr) = config.pool.choose(rng) {
                *deltas.entry(*attr).or_insert(0.0) += extra_value;
            }
        }
    }

    for delta in deltas.values_mut() {
        *delta = delta.min(config.max_delta);
    }
    deltas
}

/// Merge `extra` into `into`, capping every entry at `max_delta`.
pub fn merge_growth(into: &mut BTreeMap<Attribute, f32>, extra: &BTreeMap<Attribute, f32>, max_delta: f32) {
    for (attr, delta) in extra {
        let entry = into.entry(*attr).or_insert(0.0);
        *entry = (*entry + delta).min(max_delta);
    }
}
