//! Match Outcome Simulator
//!
//! 두 팀의 시트(라인업 + 등급 + 존 등급)를 받아 기간별 득점과 찬스 타임라인을 만든다.
//! 존 모델과 포아송 모델은 같은 [`OutcomeModel`] 계약 뒤에서 교체 가능하다.

pub mod card_system;
pub mod match_engine;
pub mod match_phase;
pub mod poisson_model;
pub mod shootout;
pub mod story;
pub mod zone;
pub mod zone_model;

use std::collections::HashSet;
use std::fmt;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::engine::config::{ExtraTimeConfig, OutcomeModelKind, SimConfig, ZoneTable};
use crate::engine::grading::{grade, TeamRating};
use crate::error::{EngineError, Result};
use crate::models::{FormationShape, Lineup, LineupEntry, MatchClock, PlayerToken, TeamId};

pub use match_engine::{MatchEngine, MatchReport, MatchSetup, PeriodReport};
pub use match_phase::MatchPhase;
pub use poisson_model::PoissonOutcomeModel;
pub use shootout::ShootoutResult;
pub use story::{StoryGenerator, StoryLedger};
pub use zone::{Zone, ZoneRatings, ZoneRole};
pub use zone_model::ZoneOutcomeModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamSide {
    Home,
    Away,
}

impl TeamSide {
    pub fn opponent(self) -> TeamSide {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodKind {
    Regular,
    ExtraTime1,
    ExtraTime2,
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PeriodKind::Regular => "regular time",
            PeriodKind::ExtraTime1 => "first extra period",
            PeriodKind::ExtraTime2 => "second extra period",
        };
        f.write_str(label)
    }
}

/// A slice of match time to simulate, `[start_minute, end_minute)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSpec {
    pub kind: PeriodKind,
    pub start_minute: u8,
    pub end_minute: u8,
}

impl PeriodSpec {
    pub fn regular(start_minute: u8, end_minute: u8) -> Self {
        Self { kind: PeriodKind::Regular, start_minute, end_minute }
    }

    pub fn duration(&self) -> u8 {
        self.end_minute.saturating_sub(self.start_minute)
    }

    pub fn is_extra_time(&self) -> bool {
        self.kind != PeriodKind::Regular
    }

    /// 정규 시간 1.0, 연장 전반 0.8, 후반 0.7
    pub fn fatigue_factor(&self, config: &ExtraTimeConfig) -> f32 {
        match self.kind {
            PeriodKind::Regular => 1.0,
            PeriodKind::ExtraTime1 => config.fatigue_factors[0],
            PeriodKind::ExtraTime2 => config.fatigue_factors[1],
        }
    }
}

/// One team as seen by the simulators for a single period.
#[derive(Debug, Clone)]
pub struct TeamSheet {
    pub lineup: Lineup,
    pub rating: TeamRating,
    pub shape: FormationShape,
    pub zones: ZoneRatings,
    pub table: ZoneTable,
    pub midfield_strength: f32,
    pub unavailable: HashSet<PlayerToken>,
}

impl TeamSheet {
    /// 퇴장 선수(`unavailable`)는 등급과 존 집계에서 제외된다.
    pub fn build(lineup: Lineup, config: &SimConfig, unavailable: HashSet<PlayerToken>) -> Result<Self> {
        let active = Lineup {
            team: lineup.team.clone(),
            entries: lineup.entries.iter().filter(|e| !unavailable.contains(&e.player.token)).cloned().collect(),
            bench: Vec::new(),
        };
        let rating = grade(&active, &config.grading)?;
        let shape = lineup.shape();
        let table = config
            .zone_model
            .table_for(shape.as_str())
            .cloned()
            .ok_or_else(|| EngineError::Config(format!("no zone table for {shape}")))?;
        let zones = ZoneRatings::compute(&lineup, &table, &config.zone_model, |t| !unavailable.contains(t))?;
        let midfield_strength = zone::midfield_strength(&active, &config.zone_model.midfield_strength_weights);
        Ok(Self { lineup, rating, shape, zones, table, midfield_strength, unavailable })
    }

    pub fn team(&self) -> &TeamId {
        &self.lineup.team
    }

    pub fn is_available(&self, token: &PlayerToken) -> bool {
        !self.unavailable.contains(token)
    }

    pub fn available(&self) -> impl Iterator<Item = &LineupEntry> + '_ {
        self.lineup.entries.iter().filter(move |e| self.is_available(&e.player.token))
    }

    pub fn attack_rating(&self, token: &PlayerToken) -> f32 {
        self.zones.player_ratings.get(token).copied().unwrap_or(0.0)
    }
}

/// Possession share for the home side.
///
/// 등급 미드필드 합이 0 이면 능력치 기반 미드필드 강도, 그것도 0 이면 0.5.
pub fn possession_share(home: &TeamSheet, away: &TeamSheet) -> f32 {
    let (h, a) = (home.rating.midfield, away.rating.midfield);
    if h + a > 0.0 {
        return h / (h + a);
    }
    let (h, a) = (home.midfield_strength, away.midfield_strength);
    if h + a > 0.0 {
        h / (h + a)
    } else {
        0.5
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChanceKind {
    Shot { goal: bool },
    Foul,
}

/// A timeline entry. For shots `side` attacks; for fouls `side` commits the foul.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Chance {
    pub clock: MatchClock,
    pub side: TeamSide,
    /// 공격 존 (1-3)
    pub zone: Zone,
    pub danger: u8,
    pub kind: ChanceKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodTimeline {
    pub home_goals: u32,
    pub away_goals: u32,
    pub chances: Vec<Chance>,
}

impl PeriodTimeline {
    pub fn record(&mut self, chance: Chance) {
        if let ChanceKind::Shot { goal: true } = chance.kind {
            match chance.side {
                TeamSide::Home => self.home_goals += 1,
                TeamSide::Away => self.away_goals += 1,
            }
        }
        self.chances.push(chance);
    }

    pub fn sort(&mut self) {
        self.chances.sort_by_key(|c| c.clock);
    }
}

/// Result of the stand-alone `simulate` contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedScore {
    pub home: u32,
    pub away: u32,
    pub timeline_seed: u64,
    pub timeline: PeriodTimeline,
}

pub trait OutcomeModel: Send + Sync {
    fn name(&self) -> &'static str;

    /// Simulate one period. Goals are counted in the returned timeline.
    ///
    /// `goals_so_far` 는 이 경기에서 이미 나온 양 팀 득점 합계 (경기 단위 상한용).
    fn simulate_period(
        &self,
        home: &TeamSheet,
        away: &TeamSheet,
        period: &PeriodSpec,
        goals_so_far: u32,
        rng: &mut dyn RngCore,
    ) -> PeriodTimeline;

    /// `simulate(team1, team2, duration) -> (score1, score2, timeline_seed)`
    fn simulate(&self, home: &TeamSheet, away: &TeamSheet, duration_minutes: u8, seed: u64) -> SimulatedScore {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let period = PeriodSpec::regular(0, duration_minutes);
        let timeline = self.simulate_period(home, away, &period, 0, &mut rng);
        SimulatedScore { home: timeline.home_goals, away: timeline.away_goals, timeline_seed: seed, timeline }
    }
}

pub fn build_outcome_model(config: &SimConfig) -> Box<dyn OutcomeModel> {
    match config.outcome_model {
        OutcomeModelKind::Zone => Box::new(ZoneOutcomeModel::new(config)),
        OutcomeModelKind::Poisson => Box::new(PoissonOutcomeModel::new(config)),
    }
}

/// Random clock inside `[start, end)` minutes.
pub(crate) fn random_clock(rng: &mut dyn RngCore, start: u8, end: u8) -> MatchClock {
    use rand::Rng;
    let minute = if end > start { rng.gen_range(start..end) } else { start };
    MatchClock::new(minute, rng.gen_range(0..60))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::models::{Attribute, Formation, Player, Slot};

    /// 4-3-3 with every core attribute at `value`.
    pub fn lineup(team: &str, value: f32) -> Lineup {
        let slots = [
            (0, 2),
            (1, 0),
            (1, 1),
            (1, 3),
            (1, 4),
            (2, 1),
            (2, 2),
            (2, 3),
            (4, 0),
            (5, 2),
            (4, 4),
        ];
        let formation = Formation::from_slots(
            slots.iter().enumerate().map(|(i, (r, c))| (Slot::new(*r, *c), format!("{team}-{i}"))),
        );
        Lineup::resolve(TeamId::from(team), &formation, |token| {
            let mut player = Player::new(token.clone(), token.as_str()).with_team(team);
            for attr in Attribute::CORE {
                player.attributes.set(attr, value);
            }
            player.attributes.set(Attribute::Freshness, 100.0);
            player.attributes.set(Attribute::Satisfaction, 60.0);
            Ok(player)
        })
        .expect("valid test lineup")
    }

    pub fn sheet(team: &str, value: f32) -> TeamSheet {
        TeamSheet::build(lineup(team, value), &SimConfig::default(), HashSet::new()).expect("sheet")
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::sheet;
    use super::*;

    #[test]
    fn test_equal_midfields_split_possession() {
        let home = sheet("h", 60.0);
        let away = sheet("a", 60.0);
        assert!((possession_share(&home, &away) - 0.5).abs() < 1e-6);
        let strong = sheet("s", 90.0);
        assert!(possession_share(&strong, &away) > 0.5);
    }

    #[test]
    fn test_fatigue_factors() {
        let cfg = ExtraTimeConfig::default();
        assert_eq!(PeriodSpec::regular(0, 90).fatigue_factor(&cfg), 1.0);
        let et2 = PeriodSpec { kind: PeriodKind::ExtraTime2, start_minute: 105, end_minute: 120 };
        assert_eq!(et2.fatigue_factor(&cfg), 0.7);
        assert_eq!(et2.duration(), 15);
    }

    #[test]
    fn test_unavailable_players_leave_the_sheet_ratings() {
        let full = sheet("h", 70.0);
        let striker = full.lineup.entries.iter().find(|e| e.position == crate::models::Position::Striker).unwrap();
        let token = striker.player.token.clone();
        let reduced =
            TeamSheet::build(full.lineup.clone(), &SimConfig::default(), HashSet::from([token.clone()])).unwrap();
        assert!(reduced.rating.offense < full.rating.offense);
        assert!(!reduced.is_available(&token));
        assert_eq!(reduced.available().count(), full.lineup.entries.len() - 1);
    }

    #[test]
    fn test_timeline_counts_goals() {
        let mut t = PeriodTimeline::default();
        let shot = |side, goal| Chance {
            clock: MatchClock::new(10, 0),
            side,
            zone: Zone::AttackCentre,
            danger: 5,
            kind: ChanceKind::Shot { goal },
        };
        t.record(shot(TeamSide::Home, true));
        t.record(shot(TeamSide::Home, false));
        t.record(shot(TeamSide::Away, true));
        assert_eq!((t.home_goals, t.away_goals), (1, 1));
        assert_eq!(t.chances.len(), 3);
    }
}
