//! Competition Engines
//!
//! 경기 시뮬레이터 대신 자체 코어를 쓰는 개인 종목:
//! - [`race`]: 기록 경기 (100m, 5K)
//! - [`knockout`]: 고정 상대와의 승부차기 토너먼트 (Scoring / Saving)
//!
//! 순위 → 5분위 만족도는 경기 후 파이프라인과 같은 규칙을 쓴다.

pub mod knockout;
pub mod race;

use crate::engine::config::{SatisfactionConfig, SimConfig};
use crate::engine::resolution::satisfaction;
use crate::error::{EngineError, Result};
use crate::models::{CompetitionKind, CompetitionOutcome, Player};

pub use knockout::{KnockoutEngine, KnockoutMode};
pub use race::{RaceEngine, RaceTime};

/// Quintile deltas for `count` ranked participants, best first.
pub fn ranked_satisfaction(count: usize, config: &SatisfactionConfig) -> Vec<f32> {
    (0..count).map(|rank| satisfaction::quintile_delta(rank, count, config)).collect()
}

/// Run any competition format. Knockouts need the fixed `opponent`.
pub fn run_competition(
    competition_id: &str,
    kind: CompetitionKind,
    participants: &[Player],
    opponent: Option<&Player>,
    config: &SimConfig,
    seed: u64,
) -> Result<CompetitionOutcome> {
    if kind.is_race() {
        return RaceEngine::new(kind, config, seed)?.run(competition_id, participants);
    }
    let opponent = opponent.ok_or(EngineError::NotFound { kind: "knockout opponent", id: competition_id.to_string() })?;
    KnockoutEngine::new(kind, config, seed)?.run(competition_id, participants, opponent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranked_satisfaction_bands() {
        let cfg = SatisfactionConfig::default();
        assert_eq!(ranked_satisfaction(5, &cfg), vec![10.0, 5.0, 0.0, -5.0, -10.0]);
        let ten = ranked_satisfaction(10, &cfg);
        assert_eq!(&ten[..2], &[10.0, 10.0]);
        assert_eq!(&ten[8..], &[-10.0, -10.0]);
        assert!(ranked_satisfaction(0, &cfg).is_empty());
    }

    #[test]
    fn test_knockout_without_opponent_is_not_found() {
        let players = vec![Player::new("p", "P")];
        let err =
            run_competition("c1", CompetitionKind::PenaltyScoring, &players, None, &SimConfig::default(), 1).unwrap_err();
        assert!(matches!(err, EngineError::NotFound { .. }));
    }
}
