//! In-memory collaborator for tests and the CLI.
//!
//! JSON 픽스처(`StoreFixture`)에서 만들고, 결과를 저장할 때 선수 상태(Freshness, Satisfaction,
//! 성장치)도 같이 갱신한다.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::{Mutex, RwLock};

use serde::{Deserialize, Serialize};

use super::repository::{PlayerRepository, ResultSink};
use crate::engine::config::KickModelConfig;
use crate::engine::kick;
use crate::engine::match_sim::MatchReport;
use crate::error::{EngineError, Result};
use crate::models::{Attribute, CompetitionKind, CompetitionOutcome, Formation, Player, PlayerToken, TeamId};

/// 포메이션은 격자 그대로 또는 저장소 문자열(작은따옴표 허용)로 들어온다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormationRecord {
    Grid(Formation),
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionEntry {
    pub kind: CompetitionKind,
    #[serde(default)]
    pub participants: Vec<PlayerToken>,
}

/// Serialized store contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreFixture {
    pub players: Vec<Player>,
    pub formations: BTreeMap<TeamId, FormationRecord>,
    pub competitions: BTreeMap<String, CompetitionEntry>,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    players: RwLock<BTreeMap<PlayerToken, Player>>,
    formations: BTreeMap<TeamId, FormationRecord>,
    competitions: BTreeMap<String, CompetitionEntry>,
    kick: KickModelConfig,
    match_results: Mutex<Vec<MatchReport>>,
    competition_results: Mutex<Vec<CompetitionOutcome>>,
    reject_writes: bool,
}

fn poisoned(operation: &'static str) -> EngineError {
    EngineError::Persistence { operation, message: "store lock poisoned".to_string() }
}

impl From<StoreFixture> for InMemoryStore {
    fn from(fixture: StoreFixture) -> Self {
        let players = fixture.players.into_iter().map(|p| (p.token.clone(), p)).collect();
        Self {
            players: RwLock::new(players),
            formations: fixture.formations,
            competitions: fixture.competitions,
            ..Default::default()
        }
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let fixture: StoreFixture =
            serde_json::from_str(content).map_err(|e| EngineError::Config(format!("fixture: {e}")))?;
        Ok(fixture.into())
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json(&content)
    }

    /// 고정 상대 선정에 쓰는 킥 모델 가중치
    pub fn with_kick_model(mut self, kick: KickModelConfig) -> Self {
        self.kick = kick;
        self
    }

    /// 모든 저장 요청을 실패시킨다 (저장 실패 경로 확인용).
    pub fn reject_writes(mut self, reject: bool) -> Self {
        self.reject_writes = reject;
        self
    }

    pub fn insert_player(&mut self, player: Player) {
        if let Ok(players) = self.players.get_mut() {
            players.insert(player.token.clone(), player);
        }
    }

    pub fn set_formation(&mut self, team: impl Into<TeamId>, formation: FormationRecord) {
        self.formations.insert(team.into(), formation);
    }

    pub fn add_competition(&mut self, id: impl Into<String>, kind: CompetitionKind, participants: Vec<PlayerToken>) {
        self.competitions.insert(id.into(), CompetitionEntry { kind, participants });
    }

    pub fn competition_kind(&self, competition_id: &str) -> Result<CompetitionKind> {
        self.competition(competition_id).map(|c| c.kind)
    }

    pub fn match_results(&self) -> Vec<MatchReport> {
        self.match_results.lock().map(|r| r.to_vec()).unwrap_or_default()
    }

    pub fn competition_results(&self) -> Vec<CompetitionOutcome> {
        self.competition_results.lock().map(|r| r.to_vec()).unwrap_or_default()
    }

    fn competition(&self, competition_id: &str) -> Result<&CompetitionEntry> {
        self.competitions
            .get(competition_id)
            .ok_or_else(|| EngineError::NotFound { kind: "competition", id: competition_id.to_string() })
    }

    /// 참가자가 아닌 선수 중 `rating` 최고. 후보가 없으면 전체에서 고른다.
    fn top_by(
        &self,
        competition_id: &str,
        kind: &'static str,
        rating: fn(&Player, &KickModelConfig) -> Result<f32>,
    ) -> Result<Player> {
        let entered: BTreeSet<&PlayerToken> = match self.competitions.get(competition_id) {
            Some(entry) => entry.participants.iter().collect(),
            None => BTreeSet::new(),
        };
        let players = self.players.read().map_err(|_| poisoned("select_opponent"))?;

        let pick = |exclude: bool| {
            players
                .values()
                .filter(|p| !exclude || !entered.contains(&p.token))
                .filter_map(|p| match rating(p, &self.kick) {
                    Ok(r) => Some((r, p)),
                    Err(e) => {
                        log::debug!("{kind} candidate skipped: {e}");
                        None
                    }
                })
                // 동률이면 토큰 순으로 먼저 나온 선수
                .fold(None::<(f32, &Player)>, |best, (r, p)| match best {
                    Some((b, _)) if b >= r => best,
                    _ => Some((r, p)),
                })
        };

        pick(true)
            .or_else(|| pick(false))
            .map(|(_, p)| p.clone())
            .ok_or_else(|| EngineError::NotFound { kind, id: competition_id.to_string() })
    }

    fn apply_deltas(
        &self,
        token: &PlayerToken,
        freshness: f32,
        satisfaction: f32,
        growth: &BTreeMap<Attribute, f32>,
    ) -> Result<()> {
        let mut players = self.players.write().map_err(|_| poisoned("update_player"))?;
        let Some(player) = players.get_mut(token) else {
            log::warn!("result for unknown player {token}, skipped");
            return Ok(());
        };
        player.attributes.apply_delta(Attribute::Freshness, freshness);
        player.attributes.apply_delta(Attribute::Satisfaction, satisfaction);
        for (attr, delta) in growth {
            player.attributes.apply_delta(*attr, *delta);
        }
        Ok(())
    }

    fn check_writable(&self, operation: &'static str) -> Result<()> {
        if self.reject_writes {
            return Err(EngineError::Persistence { operation, message: "store is read-only".to_string() });
        }
        Ok(())
    }
}

impl PlayerRepository for InMemoryStore {
    fn get_player(&self, token: &PlayerToken) -> Result<Player> {
        let players = self.players.read().map_err(|_| poisoned("get_player"))?;
        players.get(token).cloned().ok_or_else(|| EngineError::NotFound { kind: "player", id: token.to_string() })
    }

    fn get_team_formation(&self, team: &TeamId) -> Result<Option<Formation>> {
        match self.formations.get(team) {
            None => Ok(None),
            Some(FormationRecord::Grid(formation)) => Ok(Some(formation.clone())),
            Some(FormationRecord::Raw(raw)) => Formation::parse(team, raw).map(Some),
        }
    }

    fn get_team_players(&self, team: &TeamId) -> Result<Vec<Player>> {
        let players = self.players.read().map_err(|_| poisoned("get_team_players"))?;
        Ok(players.values().filter(|p| p.team_id.as_ref() == Some(team)).cloned().collect())
    }

    fn select_players_for_competition(&self, competition_id: &str) -> Result<Vec<Player>> {
        let entry = self.competition(competition_id)?;
        let mut selected = Vec::with_capacity(entry.participants.len());
        for token in &entry.participants {
            match self.get_player(token) {
                Ok(player) => selected.push(player),
                Err(EngineError::NotFound { .. }) => {
                    log::warn!("competition {competition_id}: player {token} not found, skipped");
                }
                Err(other) => return Err(other),
            }
        }
        Ok(selected)
    }

    fn get_top_goalkeeper(&self, competition_id: &str) -> Result<Player> {
        self.top_by(competition_id, "goalkeeper", kick::keeper_rating)
    }

    fn get_top_kicker(&self, competition_id: &str) -> Result<Player> {
        self.top_by(competition_id, "kicker", kick::kicker_rating)
    }
}

impl ResultSink for InMemoryStore {
    fn apply_match_result(&self, report: &MatchReport) -> Result<()> {
        self.check_writable("apply_match_result")?;
        for perf in &report.performances {
            self.apply_deltas(&perf.player, perf.freshness_delta, perf.satisfaction_delta, &perf.attribute_deltas)?;
        }
        self.match_results.lock().map_err(|_| poisoned("apply_match_result"))?.push(report.clone());
        log::debug!("stored match {} ({} performances)", report.match_id, report.performances.len());
        Ok(())
    }

    fn apply_competition_result(&self, outcome: &CompetitionOutcome) -> Result<()> {
        self.check_writable("apply_competition_result")?;
        for result in &outcome.results {
            self.apply_deltas(&result.player, result.freshness_delta, result.satisfaction_delta, &result.growth)?;
        }
        self.competition_results.lock().map_err(|_| poisoned("apply_competition_result"))?.push(outcome.clone());
        log::debug!("stored competition {} ({} results)", outcome.competition_id, outcome.results.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keeper(token: &str, reflexes: f32) -> Player {
        Player::new(token, token).with_attributes(&[
            (Attribute::Reflexes, reflexes),
            (Attribute::Diving, reflexes),
            (Attribute::Freshness, 100.0),
        ])
    }

    #[test]
    fn test_fixture_accepts_grid_and_raw_formations() {
        let json = r#"{
            "players": [{"token": "p1", "name": "One", "team_id": "t1", "attributes": {"Speed": 70}}],
            "formations": {
                "t1": {"rows": [[null, null, "p1"]]},
                "t2": "[['0', '0', 'p9']]"
            },
            "competitions": {"c1": {"kind": "dash100", "participants": ["p1", "ghost"]}}
        }"#;
        let store = InMemoryStore::from_json(json).unwrap();
        assert_eq!(store.get_player(&PlayerToken::from("p1")).unwrap().attr(Attribute::Speed), 70.0);
        for team in ["t1", "t2"] {
            let formation = store.get_team_formation(&TeamId::from(team)).unwrap().unwrap();
            assert_eq!(formation.occupied().count(), 1);
        }
        assert_eq!(store.get_team_formation(&TeamId::from("t3")).unwrap(), None);
        // 없는 참가자는 건너뛴다
        assert_eq!(store.select_players_for_competition("c1").unwrap().len(), 1);
        assert_eq!(store.get_team_players(&TeamId::from("t1")).unwrap().len(), 1);
        assert_eq!(store.competition_kind("c1").unwrap(), CompetitionKind::Dash100);
    }

    #[test]
    fn test_malformed_raw_formation_is_reported() {
        let mut store = InMemoryStore::new();
        store.set_formation("t1", FormationRecord::Raw("[[oops".to_string()));
        let err = store.get_team_formation(&TeamId::from("t1")).unwrap_err();
        assert!(err.is_skippable());
    }

    #[test]
    fn test_top_goalkeeper_excludes_participants() {
        let mut store = InMemoryStore::new();
        store.insert_player(keeper("best", 95.0));
        store.insert_player(keeper("second", 80.0));
        store.insert_player(keeper("third", 60.0));
        store.add_competition("c1", CompetitionKind::PenaltyScoring, vec![PlayerToken::from("best")]);
        assert_eq!(store.get_top_goalkeeper("c1").unwrap().token.as_str(), "second");
        // 대회가 없으면 전체에서
        assert_eq!(store.get_top_goalkeeper("other").unwrap().token.as_str(), "best");
    }

    #[test]
    fn test_kick_model_weights_drive_opponent_choice() {
        let mut store = InMemoryStore::new();
        store.insert_player(keeper("reflex", 90.0));
        store.insert_player(
            Player::new("reader", "reader")
                .with_attributes(&[(Attribute::GameVision, 99.0), (Attribute::Freshness, 100.0)]),
        );
        assert_eq!(store.get_top_goalkeeper("c1").unwrap().token.as_str(), "reflex");

        let vision_only = KickModelConfig {
            keeper_weights: BTreeMap::from([(Attribute::GameVision, 1.0)]),
            ..KickModelConfig::default()
        };
        let store = store.with_kick_model(vision_only);
        assert_eq!(store.get_top_goalkeeper("c1").unwrap().token.as_str(), "reader");
    }

    #[test]
    fn test_missing_player_is_not_found() {
        let store = InMemoryStore::new();
        assert!(matches!(store.get_player(&PlayerToken::from("x")), Err(EngineError::NotFound { .. })));
        assert!(matches!(store.get_top_kicker("c1"), Err(EngineError::NotFound { .. })));
    }

    #[test]
    fn test_rejected_write_is_persistence_error() {
        let store = InMemoryStore::new().reject_writes(true);
        let outcome = CompetitionOutcome {
            competition_id: "c1".into(),
            kind: CompetitionKind::Run5k,
            results: Vec::new(),
            opponent: None,
            opponent_score: 0,
            rounds_played: 1,
        };
        let err = store.apply_competition_result(&outcome).unwrap_err();
        assert!(!err.is_simulation_failure());
        assert!(store.competition_results().is_empty());
    }
}
