//! # sm_core - Sports Management Simulation Core
//!
//! 축구 경기와 개인 종목 대회를 시뮬레이션하고, 선수 상태 변화(피로, 성장, 만족도)를 계산한다.
//!
//! ## Features
//! - Seeded, instance-owned RNG (same seed = same match)
//! - Zone/opportunity and Poisson outcome models behind one trait
//! - Play-by-play event log, always sorted by match clock
//! - Post-game resolution: overall score, satisfaction quintiles, freshness, growth, MOTM
//! - Extra time and in-match penalty shootout for must-win games
//! - Races (100m, 5K) and penalty knockouts
//!
//! 영속성 계층은 [`api::PlayerRepository`] / [`api::ResultSink`] 뒤에 있는 외부 협력자다.

#![allow(clippy::too_many_arguments)]

pub mod api;
pub mod calibration;
pub mod engine;
pub mod error;
pub mod models;
pub mod training;

pub use api::{CompetitionService, InMemoryStore, MatchService, PlayerRepository, ResultSink};
pub use engine::config::SimConfig;
pub use engine::match_sim::{MatchEngine, MatchPhase, MatchReport, MatchSetup};
pub use error::{EngineError, Result};
pub use models::{CompetitionOutcome, CompetitionResult, MatchEvent, Player, PlayerPerformance, PlayerToken, TeamId};
