//! Collaborator boundary: player lookup in, results out.
//!
//! 엔진은 시뮬레이션 전에 한 번 조회하고, 끝난 뒤 한 번 저장한다. 그 사이에는 I/O 가 없다.

use crate::engine::match_sim::MatchReport;
use crate::error::Result;
use crate::models::{CompetitionOutcome, Formation, Player, PlayerToken, TeamId};

pub trait PlayerRepository {
    /// 없으면 `EngineError::NotFound`
    fn get_player(&self, token: &PlayerToken) -> Result<Player>;

    /// 포메이션이 설정되지 않은 팀은 `None`
    fn get_team_formation(&self, team: &TeamId) -> Result<Option<Formation>>;

    /// Whole squad, used to find the bench. 기본 구현은 빈 목록.
    fn get_team_players(&self, _team: &TeamId) -> Result<Vec<Player>> {
        Ok(Vec::new())
    }

    fn select_players_for_competition(&self, competition_id: &str) -> Result<Vec<Player>>;

    /// Fixed opponent for penalty-scoring knockouts.
    fn get_top_goalkeeper(&self, competition_id: &str) -> Result<Player>;

    /// Fixed opponent for penalty-saving knockouts.
    fn get_top_kicker(&self, competition_id: &str) -> Result<Player>;
}

/// Persistence for finalized results. Failures surface as `EngineError::Persistence`.
pub trait ResultSink {
    fn apply_match_result(&self, report: &MatchReport) -> Result<()>;

    fn apply_competition_result(&self, outcome: &CompetitionOutcome) -> Result<()>;
}
