//! Match phase state machine.
//!
//! `NotStarted → RegularTime → [ExtraTime1 → ExtraTime2 → PenaltyShootout] → Finalized`

use std::fmt;

use serde::{Deserialize, Serialize};

use super::PeriodKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
pub enum MatchPhase {
    NotStarted,
    RegularTime,
    ExtraTime1,
    ExtraTime2,
    PenaltyShootout,
    Finalized,
}

impl MatchPhase {
    /// 시간 기반 기간만 `Some`
    pub fn period_kind(self) -> Option<PeriodKind> {
        match self {
            MatchPhase::RegularTime => Some(PeriodKind::Regular),
            MatchPhase::ExtraTime1 => Some(PeriodKind::ExtraTime1),
            MatchPhase::ExtraTime2 => Some(PeriodKind::ExtraTime2),
            _ => None,
        }
    }

    /// Minute at which this phase ends.
    pub fn end_minute(self, regular_minutes: u8, extra_time_minutes: u8) -> Option<u8> {
        match self {
            MatchPhase::RegularTime => Some(regular_minutes),
            MatchPhase::ExtraTime1 => Some(regular_minutes.saturating_add(extra_time_minutes)),
            MatchPhase::ExtraTime2 => Some(regular_minutes.saturating_add(extra_time_minutes.saturating_mul(2))),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == MatchPhase::Finalized
    }
}

impl fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MatchPhase::NotStarted => "not started",
            MatchPhase::RegularTime => "regular time",
            MatchPhase::ExtraTime1 => "extra time (1st)",
            MatchPhase::ExtraTime2 => "extra time (2nd)",
            MatchPhase::PenaltyShootout => "penalty shootout",
            MatchPhase::Finalized => "finalized",
        };
        f.write_str(label)
    }
}

/// Phase that follows a completed timed phase, or `None` when the game is over.
///
/// 동점이고 `must_win` 일 때만 다음 기간으로 넘어간다.
pub fn next_phase(current: MatchPhase, must_win: bool, level: bool) -> Option<MatchPhase> {
    if !(must_win && level) {
        return None;
    }
    match current {
        MatchPhase::RegularTime => Some(MatchPhase::ExtraTime1),
        MatchPhase::ExtraTime1 => Some(MatchPhase::ExtraTime2),
        MatchPhase::ExtraTime2 => Some(MatchPhase::PenaltyShootout),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_draw_in_must_win_game_walks_to_penalties() {
        let mut phase = MatchPhase::RegularTime;
        let mut path = vec![phase];
        while let Some(next) = next_phase(phase, true, true) {
            phase = next;
            path.push(phase);
        }
        assert_eq!(
            path,
            vec![MatchPhase::RegularTime, MatchPhase::ExtraTime1, MatchPhase::ExtraTime2, MatchPhase::PenaltyShootout]
        );
    }

    #[test]
    fn test_decided_or_ordinary_games_end() {
        assert_eq!(next_phase(MatchPhase::RegularTime, false, true), None);
        assert_eq!(next_phase(MatchPhase::RegularTime, true, false), None);
        assert_eq!(next_phase(MatchPhase::ExtraTime1, true, false), None);
    }

    #[test]
    fn test_only_timed_phases_have_end_minutes() {
        for phase in MatchPhase::iter() {
            assert_eq!(phase.end_minute(90, 15).is_some(), phase.period_kind().is_some(), "{phase}");
        }
        assert_eq!(MatchPhase::ExtraTime2.end_minute(90, 15), Some(120));
        assert!(MatchPhase::Finalized.is_terminal());
    }
}
