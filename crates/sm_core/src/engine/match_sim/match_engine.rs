//! Match Engine
//!
//! 한 경기의 상태를 단독으로 소유한다: 라인업, 점수, 이벤트 로그, 퍼포먼스 시트, RNG.
//!
//! ```text
//! NotStarted ─kick_off─▶ RegularTime ─(must_win && 동점)─▶ ExtraTime1 ─▶ ExtraTime2 ─▶ PenaltyShootout
//!                              │                               │             │               │
//!                              └──────────── 결정 ──────────────┴─────────────┴───────────────┴─▶ (over) ─finalize─▶ Finalized
//! ```
//!
//! 한 번에 끝까지 돌릴 수도 있고 (`play_to_completion`), 라이브 모드처럼 구간 단위로
//! 진행할 수도 있다 (`simulate_next_period`). 구간마다 경기 중 Freshness 로 등급을 다시 계산한다.

use std::collections::HashMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::match_phase::{next_phase, MatchPhase};
use super::shootout::{run_shootout, ShootoutResult};
use super::story::{StoryGenerator, StoryLedger};
use super::{build_outcome_model, OutcomeModel, PeriodSpec, TeamSheet, TeamSide};
use crate::engine::config::{MatchKind, SimConfig};
use crate::engine::resolution::{self, freshness, MatchContext};
use crate::error::{EngineError, Result};
use crate::models::{
    ActionKind, Attribute, EventLog, Lineup, MatchClock, MatchEvent, PerformanceSheet, PlayerPerformance, PlayerToken,
    TeamId,
};

/// Everything needed to start one match.
#[derive(Debug, Clone)]
pub struct MatchSetup {
    pub match_id: String,
    pub home: Lineup,
    pub away: Lineup,
    /// 무승부 불가 경기 (연장 + 승부차기)
    pub must_win: bool,
    pub kind: MatchKind,
    pub seed: u64,
}

/// Result of one `simulate_next_period` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodReport {
    pub phase: MatchPhase,
    pub start_minute: u8,
    pub end_minute: u8,
    /// 이번 구간 득점
    pub home_goals: u32,
    pub away_goals: u32,
    /// 누적 점수
    pub home_score: u32,
    pub away_score: u32,
    pub events: Vec<MatchEvent>,
    /// 구간 종료 후 단계
    pub next_phase: MatchPhase,
    pub finished: bool,
    pub shootout: Option<ShootoutResult>,
}

/// Finalized match, ready for the result sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub match_id: String,
    pub home: TeamId,
    pub away: TeamId,
    pub home_score: u32,
    pub away_score: u32,
    /// 경기가 끝난 분 (90 / 105 / 120)
    pub duration: u8,
    pub events: Vec<MatchEvent>,
    pub performances: Vec<PlayerPerformance>,
    pub man_of_the_match: Option<PlayerToken>,
    pub timeline_seed: u64,
    pub shootout: Option<ShootoutResult>,
    /// 무승부면 `None`
    pub winner: Option<TeamId>,
}

impl MatchReport {
    pub fn performance(&self, token: &PlayerToken) -> Option<&PlayerPerformance> {
        self.performances.iter().find(|p| &p.player == token)
    }

    pub fn goals_for(&self, team: &TeamId) -> u32 {
        self.performances.iter().filter(|p| &p.team_id == team).map(|p| p.scored_goal).sum()
    }
}

pub struct MatchEngine {
    config: SimConfig,
    model: Box<dyn OutcomeModel>,
    story: StoryGenerator,
    match_id: String,
    home: Lineup,
    away: Lineup,
    must_win: bool,
    kind: MatchKind,
    seed: u64,
    rng: ChaCha8Rng,
    phase: MatchPhase,
    minute: u8,
    over: bool,
    home_score: u32,
    away_score: u32,
    ledger: StoryLedger,
    extra_periods: u8,
    last_fatigue: f32,
    shootout: Option<ShootoutResult>,
    endurance: HashMap<PlayerToken, f32>,
    start_freshness: HashMap<PlayerToken, f32>,
}

impl MatchEngine {
    /// 선발 선수는 Endurance 와 Freshness 가 반드시 있어야 한다.
    pub fn new(setup: MatchSetup, config: SimConfig) -> Result<Self> {
        setup.home.ensure_playable()?;
        setup.away.ensure_playable()?;

        let mut endurance = HashMap::new();
        let mut start_freshness = HashMap::new();
        for entry in setup.home.entries.iter().chain(setup.away.entries.iter()) {
            endurance.insert(entry.token().clone(), entry.player.endurance()?);
            start_freshness.insert(entry.token().clone(), entry.player.freshness()?);
        }

        let model = build_outcome_model(&config);
        let story = StoryGenerator::new(config.events.clone());
        log::debug!(
            "match {} prepared: {} vs {} ({} model, seed {})",
            setup.match_id,
            setup.home.team,
            setup.away.team,
            model.name(),
            setup.seed
        );
        Ok(Self {
            model,
            story,
            rng: ChaCha8Rng::seed_from_u64(setup.seed),
            match_id: setup.match_id,
            home: setup.home,
            away: setup.away,
            must_win: setup.must_win,
            kind: setup.kind,
            seed: setup.seed,
            config,
            phase: MatchPhase::NotStarted,
            minute: 0,
            over: false,
            home_score: 0,
            away_score: 0,
            ledger: StoryLedger::default(),
            extra_periods: 0,
            last_fatigue: 1.0,
            shootout: None,
            endurance,
            start_freshness,
        })
    }

    pub fn match_id(&self) -> &str {
        &self.match_id
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn score(&self) -> (u32, u32) {
        (self.home_score, self.away_score)
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn events(&self) -> &EventLog {
        &self.ledger.events
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn kick_off(&mut self) {
        for lineup in [&self.home, &self.away] {
            for entry in &lineup.entries {
                self.ledger.book.register(PerformanceSheet::new(
                    entry.token().clone(),
                    lineup.team.clone(),
                    Some(entry.position),
                    true,
                ));
            }
            for player in &lineup.bench {
                self.ledger.book.register(PerformanceSheet::new(
                    player.token.clone(),
                    lineup.team.clone(),
                    None,
                    false,
                ));
            }
        }
        self.ledger.events.push(MatchEvent::system(
            MatchClock::new(0, 0),
            ActionKind::PeriodTransition,
            format!("Kick-off: {} vs {}", self.home.team, self.away.team),
        ));
        self.phase = MatchPhase::RegularTime;
        log::debug!("match {} kicked off", self.match_id);
    }

    fn team_of(&self, side: TeamSide) -> &TeamId {
        match side {
            TeamSide::Home => &self.home.team,
            TeamSide::Away => &self.away.team,
        }
    }

    /// 시작 Freshness + 지금까지 누적된 피로
    fn in_match_lineup(&self, lineup: &Lineup) -> Lineup {
        let mut current = lineup.clone();
        for entry in &mut current.entries {
            let start = self.start_freshness.get(entry.token()).copied().unwrap_or(100.0);
            let spent = self.ledger.book.get(entry.token()).map_or(0.0, |s| s.freshness_delta);
            entry.player.attributes.set(Attribute::Freshness, (start + spent).clamp(0.0, 100.0));
        }
        current
    }

    fn build_sheets(&self) -> Result<(TeamSheet, TeamSheet)> {
        let ejected = self.ledger.cards.ejected_players();
        let home = TeamSheet::build(self.in_match_lineup(&self.home), &self.config, ejected.clone())?;
        let away = TeamSheet::build(self.in_match_lineup(&self.away), &self.config, ejected)?;
        Ok((home, away))
    }

    fn invalid(&self, operation: &'static str) -> EngineError {
        EngineError::InvalidState { phase: self.phase.to_string(), operation }
    }

    /// Advance by `length` minutes, clamped to the end of the current phase.
    ///
    /// 승부차기 단계에서는 `length` 와 상관없이 승부차기 전체를 한 번에 치른다.
    pub fn simulate_next_period(&mut self, length: u8) -> Result<PeriodReport> {
        if self.phase == MatchPhase::NotStarted {
            self.kick_off();
        }
        if self.over || self.phase.is_terminal() {
            return Err(self.invalid("simulate_next_period"));
        }
        if self.phase == MatchPhase::PenaltyShootout {
            return self.play_shootout();
        }

        let phase = self.phase;
        let kind = phase.period_kind().ok_or_else(|| self.invalid("simulate_next_period"))?;
        let phase_end = phase
            .end_minute(self.config.regular_minutes, self.config.extra_time_minutes)
            .ok_or_else(|| self.invalid("simulate_next_period"))?;
        let start = self.minute;
        let end = start.saturating_add(length.max(1)).min(phase_end);
        let period = PeriodSpec { kind, start_minute: start, end_minute: end };
        let fatigue = period.fatigue_factor(&self.config.extra_time);

        let (home, away) = self.build_sheets()?;
        let goals_so_far = self.home_score + self.away_score;
        let mut timeline = self.model.simulate_period(&home, &away, &period, goals_so_far, &mut self.rng);
        timeline.sort();

        let previous = std::mem::take(&mut self.ledger.events);
        let (mut home_goals, mut away_goals) = (0u32, 0u32);
        for chance in &timeline.chances {
            let beat = self.story.narrate(chance, &home, &away, fatigue, &mut self.ledger, &mut self.rng);
            if beat.scored {
                match chance.side {
                    TeamSide::Home => home_goals += 1,
                    TeamSide::Away => away_goals += 1,
                }
            }
        }
        if (home_goals, away_goals) != (timeline.home_goals, timeline.away_goals) {
            log::warn!(
                "match {}: {}-{} goals in the timeline but {}-{} attributed to players",
                self.match_id,
                timeline.home_goals,
                timeline.away_goals,
                home_goals,
                away_goals
            );
        }
        self.home_score += home_goals;
        self.away_score += away_goals;

        self.drain_freshness(&period);
        self.minute = end;
        self.last_fatigue = fatigue;
        log::trace!("match {} {period:?}: {} chances", self.match_id, timeline.chances.len());

        if end >= phase_end {
            self.close_phase(phase, end);
        }

        let slice = std::mem::replace(&mut self.ledger.events, previous);
        let events = slice.into_vec();
        self.ledger.events.extend(events.iter().cloned());

        Ok(PeriodReport {
            phase,
            start_minute: start,
            end_minute: end,
            home_goals,
            away_goals,
            home_score: self.home_score,
            away_score: self.away_score,
            events,
            next_phase: self.phase,
            finished: self.over,
            shootout: None,
        })
    }

    /// 퇴장 선수는 퇴장 시각까지만 피로가 쌓인다.
    fn drain_freshness(&mut self, period: &PeriodSpec) {
        let config = &self.config.resolution.freshness;
        for entry in self.home.entries.iter().chain(self.away.entries.iter()) {
            let Some(sheet) = self.ledger.book.get_mut(entry.token()) else {
                continue;
            };
            let until = sheet.sent_off_at.map_or(period.end_minute, |m| m.clamp(period.start_minute, period.end_minute));
            let minutes = until.saturating_sub(period.start_minute);
            let endurance = self.endurance.get(entry.token()).copied().unwrap_or(0.0);
            sheet.freshness_delta += freshness::period_drain(endurance, minutes, period.kind, config);
        }
    }

    fn close_phase(&mut self, phase: MatchPhase, minute: u8) {
        let level = self.home_score == self.away_score;
        let clock = MatchClock::new(minute, 0);
        match next_phase(phase, self.must_win, level) {
            Some(next) => {
                if next.period_kind().is_some() {
                    self.extra_periods += 1;
                }
                let description = match next {
                    MatchPhase::PenaltyShootout => format!("Still level at {minute}', penalty shootout"),
                    _ => format!("Level at {minute}', {next} begins"),
                };
                self.ledger.events.push(MatchEvent::system(clock, ActionKind::PeriodTransition, description));
                log::debug!("match {} moves to {next} at {}-{}", self.match_id, self.home_score, self.away_score);
                self.phase = next;
            }
            None => {
                self.ledger.events.push(MatchEvent::system(
                    clock,
                    ActionKind::PeriodTransition,
                    format!("Full time: {} {}-{} {}", self.home.team, self.home_score, self.away_score, self.away.team),
                ));
                self.over = true;
            }
        }
    }

    fn play_shootout(&mut self) -> Result<PeriodReport> {
        let (home, away) = self.build_sheets()?;
        let previous = std::mem::take(&mut self.ledger.events);
        let result = run_shootout(
            &home,
            &away,
            self.minute,
            &self.config.resolution.shootout,
            &self.config.knockout.kick,
            &mut self.ledger,
            &mut self.rng,
        );
        let result = match result {
            Ok(result) => result,
            Err(err) => {
                self.ledger.events = previous;
                return Err(err);
            }
        };

        let winner = self.team_of(result.winner).clone();
        self.ledger.events.push(MatchEvent::system(
            MatchClock::new(self.minute, 59),
            ActionKind::PeriodTransition,
            format!("{winner} win the shootout {}-{}", result.home_goals, result.away_goals),
        ));
        self.over = true;

        let slice = std::mem::replace(&mut self.ledger.events, previous);
        let events = slice.into_vec();
        self.ledger.events.extend(events.iter().cloned());
        self.shootout = Some(result.clone());

        Ok(PeriodReport {
            phase: MatchPhase::PenaltyShootout,
            start_minute: self.minute,
            end_minute: self.minute,
            home_goals: 0,
            away_goals: 0,
            home_score: self.home_score,
            away_score: self.away_score,
            events,
            next_phase: self.phase,
            finished: true,
            shootout: Some(result),
        })
    }

    /// 남은 기간을 모두 치르고 확정한다.
    pub fn play_to_completion(&mut self) -> Result<MatchReport> {
        while !self.over && !self.phase.is_terminal() {
            self.simulate_next_period(u8::MAX)?;
        }
        self.finalize()
    }

    /// Run the resolution pipeline once and move to `Finalized`.
    pub fn finalize(&mut self) -> Result<MatchReport> {
        if !self.over || self.phase.is_terminal() {
            return Err(self.invalid("finalize"));
        }

        let shootout_winner = self.shootout.as_ref().map(|s| self.team_of(s.winner).clone());
        let ctx = MatchContext {
            home: self.home.team.clone(),
            away: self.away.team.clone(),
            home_score: self.home_score,
            away_score: self.away_score,
            final_minute: self.minute,
            extra_periods: self.extra_periods,
            last_period_fatigue: self.last_fatigue,
            shootout_winner: shootout_winner.clone(),
            kind_factors: self.config.match_kinds.factors(self.kind),
        };
        let resolved = resolution::resolve_match(&self.ledger.book, &ctx, &self.config.resolution, &mut self.rng);
        self.phase = MatchPhase::Finalized;

        let winner = match self.home_score.cmp(&self.away_score) {
            std::cmp::Ordering::Greater => Some(self.home.team.clone()),
            std::cmp::Ordering::Less => Some(self.away.team.clone()),
            std::cmp::Ordering::Equal => shootout_winner,
        };
        log::info!(
            "match {} finished {} {}-{} {} after {}' (motm {:?})",
            self.match_id,
            self.home.team,
            self.home_score,
            self.away_score,
            self.away.team,
            self.minute,
            resolved.man_of_the_match
        );

        Ok(MatchReport {
            match_id: self.match_id.clone(),
            home: self.home.team.clone(),
            away: self.away.team.clone(),
            home_score: self.home_score,
            away_score: self.away_score,
            duration: self.minute,
            events: std::mem::take(&mut self.ledger.events).into_vec(),
            performances: resolved.performances,
            man_of_the_match: resolved.man_of_the_match,
            timeline_seed: self.seed,
            shootout: self.shootout.clone(),
            winner,
        })
    }
}
