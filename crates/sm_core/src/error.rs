use thiserror::Error;

use crate::models::{Attribute, PlayerToken, TeamId};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Missing attribute {attribute} for player {player}")]
    MissingData { player: PlayerToken, attribute: Attribute },

    #[error("Team {team} has {found} outfield players, at least {required} required")]
    InsufficientPlayers { team: TeamId, found: usize, required: usize },

    #[error("Cannot {operation} while match is {phase}")]
    InvalidState { phase: String, operation: &'static str },

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Malformed formation for team {team}: {reason}")]
    MalformedFormation { team: TeamId, reason: String },

    #[error("Persistence failed during {operation}: {message}")]
    Persistence { operation: &'static str, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Simulation exceeded wall-clock budget of {budget_ms} ms")]
    BudgetExceeded { budget_ms: u64 },
}

impl EngineError {
    /// false 면 시뮬레이션 자체는 성공했고 저장만 실패한 경우
    pub fn is_simulation_failure(&self) -> bool {
        !matches!(self, EngineError::Persistence { .. })
    }

    /// 경고 후 건너뛰어도 되는 이상 (선수 누락, 깨진 포메이션 필드)
    pub fn is_skippable(&self) -> bool {
        matches!(self, EngineError::NotFound { .. } | EngineError::MalformedFormation { .. })
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
