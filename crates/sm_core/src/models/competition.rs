use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::attributes::Attribute;
use super::player::PlayerToken;

/// Competition formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitionKind {
    Dash100,
    Run5k,
    /// 참가자가 키커, 고정 상대는 최고 골키퍼
    PenaltyScoring,
    /// 참가자가 골키퍼, 고정 상대는 최고 키커
    PenaltySaving,
}

impl CompetitionKind {
    pub fn is_race(self) -> bool {
        matches!(self, CompetitionKind::Dash100 | CompetitionKind::Run5k)
    }
}

impl fmt::Display for CompetitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CompetitionKind::Dash100 => "100m dash",
            CompetitionKind::Run5k => "5K run",
            CompetitionKind::PenaltyScoring => "penalty scoring",
            CompetitionKind::PenaltySaving => "penalty saving",
        };
        f.write_str(label)
    }
}

/// Format-specific outcome detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CompetitionDetail {
    Race {
        time_seconds: f32,
        dnf: bool,
    },
    Knockout {
        round_reached: u32,
        last_round_score: u32,
        total_score: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionResult {
    pub player: PlayerToken,
    /// 1부터 시작
    pub rank_position: u32,
    /// 레이스: 0-100 정규화 점수, 승부차기: 골/선방 수
    pub score: f32,
    pub is_winner: bool,
    pub satisfaction_delta: f32,
    pub freshness_delta: f32,
    pub growth: BTreeMap<Attribute, f32>,
    pub detail: CompetitionDetail,
}

impl CompetitionResult {
    pub fn is_dnf(&self) -> bool {
        matches!(self.detail, CompetitionDetail::Race { dnf: true, .. })
    }
}

/// Everything a competition run hands to persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionOutcome {
    pub competition_id: String,
    pub kind: CompetitionKind,
    pub results: Vec<CompetitionResult>,
    /// 고정 상대 (승부차기 전용)
    pub opponent: Option<PlayerToken>,
    /// 고정 상대의 누적 점수 (Scoring: 선방 수, Saving: 득점 수)
    pub opponent_score: u32,
    pub rounds_played: u32,
}

impl CompetitionOutcome {
    pub fn winners(&self) -> impl Iterator<Item = &CompetitionResult> {
        self.results.iter().filter(|r| r.is_winner)
    }
}
