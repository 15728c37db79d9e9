//! In-match penalty shootout for must-win games still level after extra time.
//!
//! 5명씩 번갈아 차고, 그래도 같으면 서든데스. 안전 상한 라운드를 넘기면 동전 던지기.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use super::story::StoryLedger;
use super::{TeamSheet, TeamSide};
use crate::engine::config::{KickModelConfig, ShootoutConfig};
use crate::engine::kick;
use crate::error::Result;
use crate::models::{ActionKind, LineupEntry, MatchClock, MatchEvent, Position};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShootoutResult {
    pub home_goals: u32,
    pub away_goals: u32,
    pub rounds: u32,
    pub winner: TeamSide,
    pub decided_by_coin_toss: bool,
}

struct Taker<'a> {
    entry: &'a LineupEntry,
    rating: f32,
}

/// 키킹 능력 내림차순. 동점은 슬롯 순서 유지.
fn kicking_order<'a>(sheet: &'a TeamSheet, ledger: &StoryLedger, config: &KickModelConfig) -> Result<Vec<Taker<'a>>> {
    let mut takers = Vec::new();
    for entry in sheet.available().filter(|e| !ledger.cards.is_ejected(e.token())) {
        takers.push(Taker { entry, rating: kick::kicker_rating(&entry.player, config)? });
    }
    takers.sort_by(|a, b| b.rating.total_cmp(&a.rating));
    Ok(takers)
}

/// GK 가 없거나 퇴장당했으면 선방 능력이 가장 좋은 필드 선수가 장갑을 낀다.
fn keeper_rating(sheet: &TeamSheet, ledger: &StoryLedger, config: &KickModelConfig) -> Result<f32> {
    let mut best: Option<f32> = None;
    for entry in sheet.available().filter(|e| !ledger.cards.is_ejected(e.token())) {
        let rating = kick::keeper_rating(&entry.player, config)?;
        if entry.position == Position::Goalkeeper {
            return Ok(rating);
        }
        best = Some(best.map_or(rating, |b: f32| b.max(rating)));
    }
    Ok(best.unwrap_or(0.0))
}

/// Cannot be caught any more with the kicks left in the regular five.
fn decided_early(scored: u32, kicks_taken: u32, other_scored: u32, other_kicks_taken: u32, per_side: u32) -> bool {
    let remaining = per_side.saturating_sub(kicks_taken);
    let other_remaining = per_side.saturating_sub(other_kicks_taken);
    scored + remaining < other_scored || other_scored + other_remaining < scored
}

pub fn run_shootout(
    home: &TeamSheet,
    away: &TeamSheet,
    start_minute: u8,
    shootout: &ShootoutConfig,
    kick_config: &KickModelConfig,
    ledger: &mut StoryLedger,
    rng: &mut dyn RngCore,
) -> Result<ShootoutResult> {
    let home_takers = kicking_order(home, ledger, kick_config)?;
    let away_takers = kicking_order(away, ledger, kick_config)?;
    let home_keeper = keeper_rating(home, ledger, kick_config)?;
    let away_keeper = keeper_rating(away, ledger, kick_config)?;

    let mut goals = [0u32; 2];
    let mut kicks = [0u32; 2];
    let mut sequence: u32 = 0;
    let mut rounds = 0;

    'rounds: for round in 0..shootout.max_rounds {
        rounds = round + 1;
        for side in [TeamSide::Home, TeamSide::Away] {
            let (takers, keeper, sheet, i) = match side {
                TeamSide::Home => (&home_takers, away_keeper, home, 0),
                TeamSide::Away => (&away_takers, home_keeper, away, 1),
            };
            if takers.is_empty() {
                kicks[i] += 1;
                continue;
            }
            let taker = &takers[(round as usize) % takers.len()];
            let clock = MatchClock::new(start_minute, sequence.min(59) as u8);
            sequence += 1;

            let scored = kick::take_kick(taker.rating, keeper, kick_config, rng);
            let name = taker.entry.player.display_name();
            ledger.events.push(MatchEvent::player(
                clock,
                taker.entry.token().clone(),
                sheet.team().clone(),
                ActionKind::PenaltyKick,
                format!("{name} steps up for penalty {}", kicks[i] + 1),
            ));
            let (kind, description) = if scored {
                (ActionKind::PenaltyScore, format!("{name} converts"))
            } else {
                (ActionKind::PenaltyMiss, format!("{name} fails to score"))
            };
            ledger.events.push(MatchEvent::player(clock, taker.entry.token().clone(), sheet.team().clone(), kind, description));

            kicks[i] += 1;
            if scored {
                goals[i] += 1;
            }
            if round < shootout.kicks_per_side
                && decided_early(goals[0], kicks[0], goals[1], kicks[1], shootout.kicks_per_side)
            {
                break 'rounds;
            }
        }
        if round + 1 >= shootout.kicks_per_side && goals[0] != goals[1] {
            break;
        }
    }

    let (winner, decided_by_coin_toss) = match goals[0].cmp(&goals[1]) {
        std::cmp::Ordering::Greater => (TeamSide::Home, false),
        std::cmp::Ordering::Less => (TeamSide::Away, false),
        std::cmp::Ordering::Equal => {
            let side = if rng.gen_bool(0.5) { TeamSide::Home } else { TeamSide::Away };
            log::warn!("shootout still level after {rounds} rounds, coin toss to {side:?}");
            (side, true)
        }
    };
    log::debug!("shootout {}-{} after {rounds} rounds, {winner:?} wins", goals[0], goals[1]);
    Ok(ShootoutResult { home_goals: goals[0], away_goals: goals[1], rounds, winner, decided_by_coin_toss })
}

#[cfg(test)]
mod tests {
    use super::super::test_support::sheet;
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_shootout_always_has_a_winner() {
        let (home, away) = (sheet("h", 70.0), sheet("a", 70.0));
        for seed in 0..30 {
            let mut ledger = StoryLedger::default();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let r = run_shootout(
                &home,
                &away,
                120,
                &ShootoutConfig::default(),
                &KickModelConfig::default(),
                &mut ledger,
                &mut rng,
            )
            .unwrap();
            assert!(r.rounds >= 3 && r.rounds <= 20);
            if !r.decided_by_coin_toss {
                assert_ne!(r.home_goals, r.away_goals);
            }
            let kicks = ledger.events.count(ActionKind::PenaltyKick);
            assert_eq!(kicks, ledger.events.count(ActionKind::PenaltyScore) + ledger.events.count(ActionKind::PenaltyMiss));
            assert_eq!(ledger.events.count(ActionKind::PenaltyScore) as u32, r.home_goals + r.away_goals);
            assert!(ledger.events.events().iter().all(|e| e.minute == 120));
        }
    }

    #[test]
    fn test_sure_kicks_go_to_sudden_death_cap() {
        let (home, away) = (sheet("h", 70.0), sheet("a", 70.0));
        // 선방 확률 0: 모든 킥 성공 → 상한까지 동점 → 동전 던지기
        let never_save = KickModelConfig { base_save_probability: -1.0, noise: 0.0, ..KickModelConfig::default() };
        let mut ledger = StoryLedger::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let r = run_shootout(&home, &away, 120, &ShootoutConfig::default(), &never_save, &mut ledger, &mut rng)
            .unwrap();
        assert_eq!(r.rounds, 20);
        assert_eq!((r.home_goals, r.away_goals), (20, 20));
        assert!(r.decided_by_coin_toss);
        let last = ledger.events.events().last().unwrap();
        assert_eq!(last.second, 39);
    }

    #[test]
    fn test_early_decision_detection() {
        // 3-0 after three kicks each: the trailing side has two left
        assert!(decided_early(3, 3, 0, 3, 5));
        assert!(!decided_early(3, 3, 1, 3, 5));
        assert!(!decided_early(0, 0, 0, 0, 5));
    }
}
