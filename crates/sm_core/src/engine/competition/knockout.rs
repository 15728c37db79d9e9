//! Penalty knockout against a fixed opponent.
//!
//! 매 라운드 생존자 전원이 고정 상대를 상대로 `shots_per_round` 번 찬다(또는 막는다).
//! 라운드 최고점 동점자만 다음 라운드로 진출하고, 최고점이 한 명이면 즉시 종료.
//! 라운드 상한을 넘기면 남은 전원이 공동 우승.
//!
//! 순위: (도달 라운드 desc, 마지막 라운드 점수 desc, 누적 점수 desc), 동점은 등록 순서.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::ranked_satisfaction;
use crate::engine::config::{KickModelConfig, KnockoutConfig, SatisfactionConfig, SimConfig};
use crate::engine::kick;
use crate::error::{EngineError, Result};
use crate::models::{Attribute, CompetitionDetail, CompetitionKind, CompetitionOutcome, CompetitionResult, Player};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnockoutMode {
    /// 참가자 = 키커, 상대 = 최고 골키퍼, 점수 = 득점
    Scoring,
    /// 참가자 = 골키퍼, 상대 = 최고 키커, 점수 = 선방
    Saving,
}

impl KnockoutMode {
    pub fn from_kind(kind: CompetitionKind) -> Option<Self> {
        match kind {
            CompetitionKind::PenaltyScoring => Some(KnockoutMode::Scoring),
            CompetitionKind::PenaltySaving => Some(KnockoutMode::Saving),
            _ => None,
        }
    }

    pub fn kind(self) -> CompetitionKind {
        match self {
            KnockoutMode::Scoring => CompetitionKind::PenaltyScoring,
            KnockoutMode::Saving => CompetitionKind::PenaltySaving,
        }
    }
}

#[derive(Debug, Clone)]
struct Contestant<'a> {
    player: &'a Player,
    rating: f32,
    total: u32,
    last: u32,
    round_reached: u32,
    alive: bool,
}

/// Round-by-round shape of a finished knockout.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct KnockoutTrace {
    pub rounds_played: u32,
    /// 각 라운드 시작 시 생존자 수
    pub survivors_per_round: Vec<usize>,
    pub opponent_score: u32,
}

pub struct KnockoutEngine {
    mode: KnockoutMode,
    config: KnockoutConfig,
    satisfaction: SatisfactionConfig,
    rng: ChaCha8Rng,
}

impl KnockoutEngine {
    pub fn new(kind: CompetitionKind, config: &SimConfig, seed: u64) -> Result<Self> {
        let mode = KnockoutMode::from_kind(kind)
            .ok_or_else(|| EngineError::Config(format!("{kind} is not a knockout competition")))?;
        Ok(Self {
            mode,
            config: config.knockout.clone(),
            satisfaction: config.resolution.satisfaction.clone(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    fn winner_growth(&self) -> &BTreeMap<Attribute, f32> {
        match self.mode {
            KnockoutMode::Scoring => &self.config.scoring_winner_growth,
            KnockoutMode::Saving => &self.config.saving_winner_growth,
        }
    }

    /// One contestant's round: (contestant points, opponent points).
    fn play_series(&mut self, rating: f32, opponent_rating: f32) -> (u32, u32) {
        let mut points = 0;
        for _ in 0..self.config.shots_per_round {
            let goal = match self.mode {
                KnockoutMode::Scoring => kick::take_kick(rating, opponent_rating, &self.config.kick, &mut self.rng),
                KnockoutMode::Saving => kick::take_kick(opponent_rating, rating, &self.config.kick, &mut self.rng),
            };
            let contestant_point = match self.mode {
                KnockoutMode::Scoring => goal,
                KnockoutMode::Saving => !goal,
            };
            if contestant_point {
                points += 1;
            }
        }
        (points, self.config.shots_per_round - points)
    }

    fn play(&mut self, contestants: &mut [Contestant<'_>], opponent_rating: f32) -> KnockoutTrace {
        let mut trace = KnockoutTrace::default();
        if contestants.is_empty() {
            return trace;
        }
        for round in 1..=self.config.max_rounds {
            let survivors = contestants.iter().filter(|c| c.alive).count();
            trace.survivors_per_round.push(survivors);
            trace.rounds_played = round;

            let mut best = 0;
            for contestant in contestants.iter_mut().filter(|c| c.alive) {
                let (points, conceded) = self.play_series(contestant.rating, opponent_rating);
                contestant.last = points;
                contestant.total += points;
                contestant.round_reached = round;
                trace.opponent_score += conceded;
                best = best.max(points);
            }
            for contestant in contestants.iter_mut().filter(|c| c.alive) {
                contestant.alive = contestant.last == best;
            }

            let advancing = contestants.iter().filter(|c| c.alive).count();
            log::debug!("{:?} knockout round {round}: {survivors} → {advancing} (max {best})", self.mode);
            if advancing <= 1 {
                return trace;
            }
        }
        log::warn!(
            "{:?} knockout hit the {} round cap, {} co-winners",
            self.mode,
            self.config.max_rounds,
            contestants.iter().filter(|c| c.alive).count()
        );
        trace
    }

    /// 참가자와 상대 모두 Freshness 가 필요하다. 승부차기 종목은 피로가 없다.
    pub fn run(&mut self, competition_id: &str, participants: &[Player], opponent: &Player) -> Result<CompetitionOutcome> {
        let (opponent_rating, rate): (f32, fn(&Player, &KickModelConfig) -> Result<f32>) =
            match self.mode {
                KnockoutMode::Scoring => (kick::keeper_rating(opponent, &self.config.kick)?, kick::kicker_rating),
                KnockoutMode::Saving => (kick::kicker_rating(opponent, &self.config.kick)?, kick::keeper_rating),
            };
        let mut contestants = Vec::with_capacity(participants.len());
        for player in participants {
            contestants.push(Contestant {
                player,
                rating: rate(player, &self.config.kick)?,
                total: 0,
                last: 0,
                round_reached: 0,
                alive: true,
            });
        }

        let trace = self.play(&mut contestants, opponent_rating);

        // 안정 정렬
        contestants.sort_by(|a, b| {
            b.round_reached
                .cmp(&a.round_reached)
                .then(b.last.cmp(&a.last))
                .then(b.total.cmp(&a.total))
        });
        let quintiles = ranked_satisfaction(contestants.len(), &self.satisfaction);
        let growth = self.winner_growth().clone();

        let results: Vec<CompetitionResult> = contestants
            .iter()
            .zip(quintiles)
            .enumerate()
            .map(|(i, (c, satisfaction_delta))| CompetitionResult {
                player: c.player.token.clone(),
                rank_position: i as u32 + 1,
                score: c.total as f32,
                is_winner: c.alive,
                satisfaction_delta,
                freshness_delta: 0.0,
                growth: if c.alive { growth.clone() } else { BTreeMap::new() },
                detail: CompetitionDetail::Knockout {
                    round_reached: c.round_reached,
                    last_round_score: c.last,
                    total_score: c.total,
                },
            })
            .collect();

        log::info!(
            "{} {competition_id}: {} contestants, {} rounds, {} winner(s), opponent {} scored {}",
            self.mode.kind(),
            results.len(),
            trace.rounds_played,
            results.iter().filter(|r| r.is_winner).count(),
            opponent.token,
            trace.opponent_score
        );
        Ok(CompetitionOutcome {
            competition_id: competition_id.to_string(),
            kind: self.mode.kind(),
            results,
            opponent: Some(opponent.token.clone()),
            opponent_score: trace.opponent_score,
            rounds_played: trace.rounds_played,
        })
    }
}
