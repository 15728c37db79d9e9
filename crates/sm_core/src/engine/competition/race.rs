//! Time-trial races (100m dash, 5K run).
//!
//! ```text
//! adjusted   = weighted_attributes × Freshness/100
//! race_time  = MIN + (MAX − MIN) × (1 − adjusted/100)^1.5 + uniform(−R, R)
//! score      = round(100 × clamp((MAX − time)/(MAX − MIN), 0, 1)), DNF → 0
//! ```
//!
//! Freshness 가 임계값(10) 미만이면 기록은 정확히 DNF_TIME 이고 항상 최하위로 정렬된다.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::ranked_satisfaction;
use crate::engine::config::{FreshnessConfig, RaceConfig, SatisfactionConfig, SimConfig};
use crate::engine::resolution::freshness;
use crate::error::{EngineError, Result};
use crate::models::{CompetitionDetail, CompetitionKind, CompetitionOutcome, CompetitionResult, Player};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaceTime {
    pub seconds: f32,
    pub dnf: bool,
}

/// 가중 능력치 × Freshness/100
pub fn adjusted_score(player: &Player, config: &RaceConfig) -> Result<f32> {
    let freshness = player.freshness()?;
    Ok(player.attributes.weighted_average(&config.weights) * freshness / 100.0)
}

pub fn race_time(player: &Player, config: &RaceConfig, rng: &mut dyn RngCore) -> Result<RaceTime> {
    let freshness = player.freshness()?;
    if freshness < config.freshness_threshold {
        return Ok(RaceTime { seconds: config.dnf_time, dnf: true });
    }
    let adjusted = adjusted_score(player, config)?;
    let deficit = (1.0 - adjusted / 100.0).clamp(0.0, 1.0);
    let noise = if config.random_range > 0.0 { rng.gen_range(-config.random_range..=config.random_range) } else { 0.0 };
    let seconds = config.min_time + (config.max_time - config.min_time) * deficit.powf(config.curve_exponent) + noise;
    Ok(RaceTime { seconds: seconds.max(0.0), dnf: false })
}

/// 0-100 정규화 점수
pub fn race_score(time: RaceTime, config: &RaceConfig) -> f32 {
    if time.dnf {
        return 0.0;
    }
    let span = config.max_time - config.min_time;
    if span <= 0.0 {
        return 0.0;
    }
    (100.0 * ((config.max_time - time.seconds) / span).clamp(0.0, 1.0)).round()
}

pub struct RaceEngine {
    kind: CompetitionKind,
    race: RaceConfig,
    freshness: FreshnessConfig,
    satisfaction: SatisfactionConfig,
    rng: ChaCha8Rng,
}

impl RaceEngine {
    pub fn new(kind: CompetitionKind, config: &SimConfig, seed: u64) -> Result<Self> {
        let race = match kind {
            CompetitionKind::Dash100 => config.race_dash100.clone(),
            CompetitionKind::Run5k => config.race_run5k.clone(),
            other => return Err(EngineError::Config(format!("{other} is not a race"))),
        };
        Ok(Self {
            kind,
            race,
            freshness: config.resolution.freshness.clone(),
            satisfaction: config.resolution.satisfaction.clone(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// 모든 참가자에게 Freshness 와 Endurance 가 필요하다. DNF 도 피로는 쌓인다.
    pub fn run(&mut self, competition_id: &str, participants: &[Player]) -> Result<CompetitionOutcome> {
        let mut timed = Vec::with_capacity(participants.len());
        for player in participants {
            let time = race_time(player, &self.race, &mut self.rng)?;
            let endurance = player.endurance()?;
            timed.push((player, time, endurance));
        }
        // 완주자 먼저, 기록 순. 안정 정렬이라 같은 기록은 등록 순서
        timed.sort_by(|a, b| a.1.dnf.cmp(&b.1.dnf).then(a.1.seconds.total_cmp(&b.1.seconds)));

        let finishers = timed.iter().filter(|(_, t, _)| !t.dnf).count();
        let quintiles = ranked_satisfaction(finishers, &self.satisfaction);
        let drain = |endurance: f32| freshness::competition_drain(endurance, self.race.fatigue_share, &self.freshness);

        let mut results = Vec::with_capacity(timed.len());
        for (i, (player, time, endurance)) in timed.iter().enumerate() {
            let podium = !time.dnf && i < self.race.podium_size;
            let satisfaction_delta =
                if time.dnf { self.satisfaction.dnf } else { quintiles.get(i).copied().unwrap_or(self.satisfaction.dnf) };
            results.push(CompetitionResult {
                player: player.token.clone(),
                rank_position: i as u32 + 1,
                score: race_score(*time, &self.race),
                is_winner: podium,
                satisfaction_delta,
                freshness_delta: drain(*endurance),
                growth: if podium { self.race.podium_growth.clone() } else { Default::default() },
                detail: CompetitionDetail::Race { time_seconds: time.seconds, dnf: time.dnf },
            });
        }

        if let Some(best) = results.first() {
            log::info!(
                "{} {competition_id}: {} runners, {} finished, winner {}",
                self.kind,
                results.len(),
                finishers,
                best.player
            );
        } else {
            log::warn!("{} {competition_id}: no participants", self.kind);
        }
        Ok(CompetitionOutcome {
            competition_id: competition_id.to_string(),
            kind: self.kind,
            results,
            opponent: None,
            opponent_score: 0,
            rounds_played: 1,
        })
    }
}
