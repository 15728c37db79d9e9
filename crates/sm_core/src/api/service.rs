//! Match / competition orchestration over the collaborator traits.
//!
//! 순서는 항상 같다: 조회 → 시뮬레이션 → 저장. 저장 실패는 시뮬레이션이 끝난 뒤
//! `EngineError::Persistence` 로만 올라오므로 호출자가 두 실패를 구분할 수 있다.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::budget::SimBudget;
use super::repository::{PlayerRepository, ResultSink};
use crate::engine::competition::{run_competition, KnockoutMode};
use crate::engine::config::{MatchKind, SimConfig};
use crate::engine::derive_seed;
use crate::engine::match_sim::{MatchEngine, MatchReport, MatchSetup};
use crate::error::{EngineError, Result};
use crate::models::{CompetitionKind, CompetitionOutcome, Formation, Lineup, PlayerToken, TeamId};

/// 라이브 진행 단위 (분). 구간마다 예산을 확인한다.
const SLICE_MINUTES: u8 = 15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRequest {
    pub match_id: String,
    pub home: TeamId,
    pub away: TeamId,
    #[serde(default)]
    pub must_win: bool,
    #[serde(default)]
    pub kind: MatchKind,
    /// 없으면 `derive_seed(base_seed, match_id)`
    #[serde(default)]
    pub seed: Option<u64>,
}

impl MatchRequest {
    pub fn new(match_id: impl Into<String>, home: impl Into<TeamId>, away: impl Into<TeamId>) -> Self {
        Self {
            match_id: match_id.into(),
            home: home.into(),
            away: away.into(),
            must_win: false,
            kind: MatchKind::default(),
            seed: None,
        }
    }

    pub fn must_win(mut self, must_win: bool) -> Self {
        self.must_win = must_win;
        self
    }
}

/// 저장 단계의 에러는 모두 Persistence 로 감싼다.
fn persistence_error(operation: &'static str, err: EngineError) -> EngineError {
    log::error!("{operation} failed after simulation: {err}");
    match err {
        EngineError::Persistence { .. } => err,
        other => EngineError::Persistence { operation, message: other.to_string() },
    }
}

pub struct MatchService<'a, R: ?Sized, S: ?Sized> {
    repository: &'a R,
    sink: &'a S,
    config: SimConfig,
    base_seed: u64,
    budget_ms: Option<u64>,
}

impl<'a, R, S> MatchService<'a, R, S>
where
    R: PlayerRepository + ?Sized,
    S: ResultSink + ?Sized,
{
    pub fn new(repository: &'a R, sink: &'a S, config: SimConfig) -> Self {
        Self { repository, sink, config, base_seed: 0, budget_ms: None }
    }

    pub fn with_base_seed(mut self, base_seed: u64) -> Self {
        self.base_seed = base_seed;
        self
    }

    pub fn with_budget_ms(mut self, budget_ms: Option<u64>) -> Self {
        self.budget_ms = budget_ms;
        self
    }

    /// 포메이션 → 라인업. 없는 선수는 경고 후 건너뛰고 나머지 팀원은 벤치가 된다.
    pub fn load_lineup(&self, team: &TeamId) -> Result<Lineup> {
        let formation = match self.repository.get_team_formation(team) {
            Ok(Some(formation)) => formation,
            Ok(None) => {
                log::warn!("team {team} has no formation");
                Formation::default()
            }
            Err(err) if err.is_skippable() => {
                log::warn!("team {team}: {err}, formation ignored");
                Formation::default()
            }
            Err(err) => return Err(err),
        };
        let lineup = Lineup::resolve(team.clone(), &formation, |token| self.repository.get_player(token))?;

        let starters: HashSet<&PlayerToken> = lineup.entries.iter().map(|e| e.token()).collect();
        let bench: Vec<_> =
            self.repository.get_team_players(team)?.into_iter().filter(|p| !starters.contains(&p.token)).collect();
        Ok(lineup.with_bench(bench))
    }

    /// Fetch, simulate and persist one match.
    pub fn play(&self, request: &MatchRequest) -> Result<MatchReport> {
        let budget = SimBudget::from_option(self.budget_ms);
        let setup = MatchSetup {
            match_id: request.match_id.clone(),
            home: self.load_lineup(&request.home)?,
            away: self.load_lineup(&request.away)?,
            must_win: request.must_win,
            kind: request.kind,
            seed: request.seed.unwrap_or_else(|| derive_seed(self.base_seed, &request.match_id)),
        };

        let mut engine = MatchEngine::new(setup, self.config.clone())?;
        while !engine.is_over() {
            engine.simulate_next_period(SLICE_MINUTES)?;
            budget.check()?;
        }
        let report = engine.finalize()?;

        self.sink.apply_match_result(&report).map_err(|e| persistence_error("apply_match_result", e))?;
        Ok(report)
    }
}

pub struct CompetitionService<'a, R: ?Sized, S: ?Sized> {
    repository: &'a R,
    sink: &'a S,
    config: SimConfig,
    base_seed: u64,
    budget_ms: Option<u64>,
}

impl<'a, R, S> CompetitionService<'a, R, S>
where
    R: PlayerRepository + ?Sized,
    S: ResultSink + ?Sized,
{
    pub fn new(repository: &'a R, sink: &'a S, config: SimConfig) -> Self {
        Self { repository, sink, config, base_seed: 0, budget_ms: None }
    }

    pub fn with_base_seed(mut self, base_seed: u64) -> Self {
        self.base_seed = base_seed;
        self
    }

    pub fn with_budget_ms(mut self, budget_ms: Option<u64>) -> Self {
        self.budget_ms = budget_ms;
        self
    }

    pub fn run(&self, competition_id: &str, kind: CompetitionKind) -> Result<CompetitionOutcome> {
        let budget = SimBudget::from_option(self.budget_ms);
        let participants = self.repository.select_players_for_competition(competition_id)?;
        let opponent = match KnockoutMode::from_kind(kind) {
            Some(KnockoutMode::Scoring) => Some(self.repository.get_top_goalkeeper(competition_id)?),
            Some(KnockoutMode::Saving) => Some(self.repository.get_top_kicker(competition_id)?),
            None => None,
        };

        let seed = derive_seed(self.base_seed, competition_id);
        let outcome = run_competition(competition_id, kind, &participants, opponent.as_ref(), &self.config, seed)?;
        budget.check()?;

        self.sink.apply_competition_result(&outcome).map_err(|e| persistence_error("apply_competition_result", e))?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::memory::{FormationRecord, InMemoryStore};
    use crate::models::{Attribute, Player, Slot};

    const SLOTS: [(u8, u8); 11] =
        [(0, 2), (1, 0), (1, 1), (1, 3), (1, 4), (2, 1), (2, 2), (2, 3), (4, 0), (5, 2), (4, 4)];

    fn squad_player(token: &str, team: &str, value: f32) -> Player {
        let mut player = Player::new(token, token).with_team(team);
        for attr in Attribute::CORE {
            player.attributes.set(attr, value);
        }
        player.attributes.set(Attribute::Freshness, 100.0);
        player.attributes.set(Attribute::Satisfaction, 60.0);
        player
    }

    /// 11명 선발 + 벤치 1명
    fn add_team(store: &mut InMemoryStore, team: &str, value: f32) {
        let mut slots = Vec::new();
        for (i, (r, c)) in SLOTS.iter().enumerate() {
            let token = format!("{team}-{i}");
            store.insert_player(squad_player(&token, team, value));
            slots.push((Slot::new(*r, *c), token));
        }
        store.insert_player(squad_player(&format!("{team}-bench"), team, value));
        store.set_formation(team, FormationRecord::Grid(Formation::from_slots(slots)));
    }

    fn league_store() -> InMemoryStore {
        let mut store = InMemoryStore::new();
        add_team(&mut store, "home", 70.0);
        add_team(&mut store, "away", 65.0);
        store
    }

    fn satisfaction(store: &InMemoryStore, token: &str) -> f32 {
        store.get_player(&PlayerToken::from(token)).unwrap().attr(Attribute::Satisfaction)
    }

    #[test]
    fn test_play_persists_report_and_player_state() {
        let store = league_store();
        let service = MatchService::new(&store, &store, SimConfig::default()).with_base_seed(7);
        let report = service.play(&MatchRequest::new("m1", "home", "away")).unwrap();

        assert_eq!(report.goals_for(&TeamId::from("home")), report.home_score);
        assert_eq!(report.timeline_seed, derive_seed(7, "m1"));
        assert_eq!(store.match_results(), vec![report.clone()]);

        // 벤치는 출전하지 않았으므로 -2
        let bench = report.performance(&PlayerToken::from("home-bench")).unwrap();
        assert_eq!(bench.minutes_played, 0);
        assert_eq!(satisfaction(&store, "home-bench"), 58.0);

        let keeper = store.get_player(&PlayerToken::from("home-0")).unwrap();
        assert!(keeper.attr(Attribute::Freshness) < 100.0);
    }

    #[test]
    fn test_same_seed_same_report() {
        let (a, b) = (league_store(), league_store());
        let request = MatchRequest::new("derby", "home", "away");
        let first = MatchService::new(&a, &a, SimConfig::default()).with_base_seed(3).play(&request).unwrap();
        let second = MatchService::new(&b, &b, SimConfig::default()).with_base_seed(3).play(&request).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_low_fidelity_match_total_stays_under_cap() {
        let mut store = InMemoryStore::new();
        add_team(&mut store, "home", 95.0);
        add_team(&mut store, "away", 95.0);
        let config = SimConfig::low_fidelity();
        let cap = config.poisson.max_total_goals;
        let service = MatchService::new(&store, &store, config);
        for i in 0..200 {
            let report = service.play(&MatchRequest::new(format!("m{i}"), "home", "away")).unwrap();
            assert!(report.home_score + report.away_score <= cap, "m{i}: {}-{}", report.home_score, report.away_score);
        }
    }

    #[test]
    fn test_missing_player_slot_is_skipped() {
        let mut store = league_store();
        let mut slots: Vec<(Slot, String)> =
            SLOTS.iter().enumerate().map(|(i, (r, c))| (Slot::new(*r, *c), format!("home-{i}"))).collect();
        slots[10].1 = "ghost".to_string();
        store.set_formation("home", FormationRecord::Grid(Formation::from_slots(slots)));

        let service = MatchService::new(&store, &store, SimConfig::default());
        let lineup = service.load_lineup(&TeamId::from("home")).unwrap();
        assert_eq!(lineup.entries.len(), 10);
        // 빠진 선수는 벤치로
        assert_eq!(lineup.bench.len(), 2);
        assert!(service.play(&MatchRequest::new("m2", "home", "away")).is_ok());
    }

    #[test]
    fn test_team_without_formation_cannot_play() {
        let mut store = league_store();
        add_team(&mut store, "empty", 60.0);
        store.set_formation("empty", FormationRecord::Raw("[['0', '0', 'empty-0']]".to_string()));
        let service = MatchService::new(&store, &store, SimConfig::default());
        let err = service.play(&MatchRequest::new("m3", "empty", "away")).unwrap_err();
        assert!(matches!(err, EngineError::InsufficientPlayers { found: 0, .. }));
        assert!(store.match_results().is_empty());

        let err = service.play(&MatchRequest::new("m4", "nobody", "away")).unwrap_err();
        assert!(matches!(err, EngineError::InsufficientPlayers { .. }));
    }

    #[test]
    fn test_persistence_failure_is_reported_after_simulation() {
        let store = league_store().reject_writes(true);
        let service = MatchService::new(&store, &store, SimConfig::default());
        let err = service.play(&MatchRequest::new("m5", "home", "away")).unwrap_err();
        assert!(matches!(err, EngineError::Persistence { operation: "apply_match_result", .. }));
        assert!(!err.is_simulation_failure());
    }

    #[test]
    fn test_budget_exceeded_aborts_without_persisting() {
        let store = league_store();
        let service = MatchService::new(&store, &store, SimConfig::default()).with_budget_ms(Some(0));
        std::thread::sleep(std::time::Duration::from_millis(1));
        let err = service.play(&MatchRequest::new("m6", "home", "away")).unwrap_err();
        assert_eq!(err, EngineError::BudgetExceeded { budget_ms: 0 });
        assert!(err.is_simulation_failure());
        assert!(store.match_results().is_empty());
    }

    #[test]
    fn test_race_competition_updates_runners() {
        let mut store = league_store();
        let runners: Vec<PlayerToken> = (0..5).map(|i| PlayerToken::from(format!("home-{i}"))).collect();
        store.add_competition("dash", CompetitionKind::Dash100, runners);

        let service = CompetitionService::new(&store, &store, SimConfig::default()).with_base_seed(11);
        let outcome = service.run("dash", CompetitionKind::Dash100).unwrap();
        assert_eq!(outcome.results.len(), 5);
        assert_eq!(store.competition_results().len(), 1);

        let winner = &outcome.results[0];
        assert_eq!(satisfaction(&store, winner.player.as_str()), 60.0 + winner.satisfaction_delta);
    }

    #[test]
    fn test_knockout_faces_top_goalkeeper_outside_the_field() {
        let mut store = league_store();
        let mut keeper = squad_player("star-gk", "away", 50.0);
        keeper.attributes.set(Attribute::Reflexes, 99.0);
        keeper.attributes.set(Attribute::Diving, 99.0);
        store.insert_player(keeper);
        let kickers: Vec<PlayerToken> = (8..11).map(|i| PlayerToken::from(format!("home-{i}"))).collect();
        store.add_competition("pk", CompetitionKind::PenaltyScoring, kickers);

        let service = CompetitionService::new(&store, &store, SimConfig::default());
        let outcome = service.run("pk", CompetitionKind::PenaltyScoring).unwrap();
        assert_eq!(outcome.opponent, Some(PlayerToken::from("star-gk")));
        assert!(outcome.winners().count() >= 1);
        assert!(outcome.results.iter().all(|r| r.freshness_delta == 0.0));
    }

    #[test]
    fn test_unknown_competition_is_not_found() {
        let store = league_store();
        let service = CompetitionService::new(&store, &store, SimConfig::default());
        let err = service.run("missing", CompetitionKind::Run5k).unwrap_err();
        assert!(matches!(err, EngineError::NotFound { kind: "competition", .. }));
    }
}
