//! Zone / attack-opportunity outcome model.
//!
//! 기간마다 정해진 횟수의 공격을 굴린다:
//! 점유율로 공격 팀 → 존 등급으로 공격 존 → 미러 수비 존 → 위험도 1-5 → 4-5 단계만 슈팅.

use rand::{Rng, RngCore};

use super::zone::{apply_caution, danger_distribution, Zone};
use super::{possession_share, Chance, ChanceKind, OutcomeModel, PeriodSpec, PeriodTimeline, TeamSheet, TeamSide};
use crate::engine::config::{ExtraTimeConfig, SimConfig, ZoneModelConfig};
use crate::engine::sampling::weighted_index;
use crate::models::MatchClock;

#[derive(Debug, Clone)]
pub struct ZoneOutcomeModel {
    config: ZoneModelConfig,
    extra_time: ExtraTimeConfig,
    regular_minutes: u8,
}

impl ZoneOutcomeModel {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            config: config.zone_model.clone(),
            extra_time: config.extra_time.clone(),
            regular_minutes: config.regular_minutes,
        }
    }

    /// 90분 기준 공격 수를 기간 길이에 비례해 환산
    pub fn attacks_for(&self, period: &PeriodSpec) -> u32 {
        let per_minute = self.config.attacks_per_90 as f32 / self.regular_minutes.max(1) as f32;
        let attacks = (per_minute * period.duration() as f32).round() as u32;
        if period.duration() > 0 {
            attacks.max(1)
        } else {
            0
        }
    }

    /// 득점 확률. 연장전에는 고정 확률 × 피로 계수.
    pub fn goal_probability(&self, danger: u8, attack: f32, defense: f32, period: &PeriodSpec) -> f32 {
        if period.is_extra_time() {
            let fatigue = period.fatigue_factor(&self.extra_time);
            return match danger {
                5 => self.extra_time.level5_goal * fatigue,
                4 => self.extra_time.level4_goal * fatigue,
                _ => 0.0,
            };
        }
        let gap = if self.config.gap_scale > 0.0 { (attack - defense) / self.config.gap_scale } else { 0.0 };
        match danger {
            5 => self.config.level5_goal.probability(gap),
            4 => self.config.level4_goal.probability(gap),
            _ => 0.0,
        }
    }
}

impl OutcomeModel for ZoneOutcomeModel {
    fn name(&self) -> &'static str {
        "zone"
    }

    fn simulate_period(
        &self,
        home: &TeamSheet,
        away: &TeamSheet,
        period: &PeriodSpec,
        _goals_so_far: u32,
        rng: &mut dyn RngCore,
    ) -> PeriodTimeline {
        let mut timeline = PeriodTimeline::default();
        let attacks = self.attacks_for(period);
        if attacks == 0 {
            return timeline;
        }

        let fatigue = period.fatigue_factor(&self.extra_time);
        let possession = possession_share(home, away);
        let duration = period.duration() as u32;

        for i in 0..attacks {
            let minute = period.start_minute as u32 + i * duration / attacks;
            let clock = MatchClock::new(minute as u8, rng.gen_range(0..60));

            let side = if rng.gen::<f32>() < possession { TeamSide::Home } else { TeamSide::Away };
            let (attacking, defending) = match side {
                TeamSide::Home => (home, away),
                TeamSide::Away => (away, home),
            };

            let zone_idx = weighted_index(rng, &attacking.zones.attack_zones()).unwrap_or(1);
            let zone = Zone::ATTACKING[zone_idx];
            let attack = attacking.zones.rating(zone) * fatigue;
            let defense = defending.zones.rating(zone.mirrored()) * fatigue;

            let mut dist = danger_distribution(attack, defense, &self.config);
            if period.is_extra_time() {
                apply_caution(&mut dist, &self.extra_time.cautious_multipliers);
            }
            let danger = weighted_index(rng, &dist).map(|i| i as u8 + 1).unwrap_or(1);

            if rng.gen::<f32>() < self.config.foul_probability {
                timeline.record(Chance { clock, side: side.opponent(), zone, danger, kind: ChanceKind::Foul });
            }

            if danger >= 4 {
                let p = self.goal_probability(danger, attack, defense, period);
                let goal = rng.gen::<f32>() < p;
                log::trace!("{clock:?} {side:?} zone {} danger {danger} p={p:.3} goal={goal}", zone.number());
                timeline.record(Chance { clock, side, zone, danger, kind: ChanceKind::Shot { goal } });
            }
        }

        log::debug!(
            "zone model {} [{}-{}): {} attacks, {}-{}",
            period.kind,
            period.start_minute,
            period.end_minute,
            attacks,
            timeline.home_goals,
            timeline.away_goals
        );
        timeline
    }
}
