//! Per-player match performance: running counters during play, final record after resolution.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::attributes::Attribute;
use super::player::{PlayerToken, TeamId};
use super::position::Position;

/// Running counters mutated additively while events are generated.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceSheet {
    pub player: PlayerToken,
    pub team_id: TeamId,
    pub position: Option<Position>,
    /// 선발 출전 여부. 벤치 선수는 false.
    pub participated: bool,
    pub goals: u32,
    pub assists: u32,
    pub defense_actions: u32,
    pub shots: u32,
    pub yellow_cards: u8,
    pub red_card: bool,
    /// 퇴장 시각 (분)
    pub sent_off_at: Option<u8>,
    /// 기간별 누적 피로도 (음수)
    pub freshness_delta: f32,
    pub attribute_deltas: BTreeMap<Attribute, f32>,
}

impl PerformanceSheet {
    pub fn new(player: PlayerToken, team_id: TeamId, position: Option<Position>, participated: bool) -> Self {
        Self {
            player,
            team_id,
            position,
            participated,
            goals: 0,
            assists: 0,
            defense_actions: 0,
            shots: 0,
            yellow_cards: 0,
            red_card: false,
            sent_off_at: None,
            freshness_delta: 0.0,
            attribute_deltas: BTreeMap::new(),
        }
    }

    pub fn punished(&self) -> bool {
        self.yellow_cards > 0 || self.red_card
    }

    /// 경기 종료 시각 기준 출전 시간
    pub fn minutes_played(&self, final_minute: u8) -> u8 {
        if !self.participated {
            return 0;
        }
        match self.sent_off_at {
            Some(minute) => minute.min(final_minute),
            None => final_minute,
        }
    }

    pub fn add_attribute_delta(&mut self, attr: Attribute, delta: f32) {
        *self.attribute_deltas.entry(attr).or_insert(0.0) += delta;
    }
}

/// Sheets in first-seen order with token lookup.
#[derive(Debug, Clone, Default)]
pub struct PerformanceBook {
    sheets: Vec<PerformanceSheet>,
    index: HashMap<PlayerToken, usize>,
}

impl PerformanceBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// 이미 있으면 무시 (첫 등록 순서 유지)
    pub fn register(&mut self, sheet: PerformanceSheet) {
        if self.index.contains_key(&sheet.player) {
            return;
        }
        self.index.insert(sheet.player.clone(), self.sheets.len());
        self.sheets.push(sheet);
    }

    pub fn get(&self, token: &PlayerToken) -> Option<&PerformanceSheet> {
        self.index.get(token).map(|&i| &self.sheets[i])
    }

    pub fn get_mut(&mut self, token: &PlayerToken) -> Option<&mut PerformanceSheet> {
        match self.index.get(token) {
            Some(&i) => self.sheets.get_mut(i),
            None => None,
        }
    }

    pub fn sheets(&self) -> &[PerformanceSheet] {
        &self.sheets
    }

    pub fn sheets_mut(&mut self) -> impl Iterator<Item = &mut PerformanceSheet> {
        self.sheets.iter_mut()
    }

    pub fn goals_for(&self, team: &TeamId) -> u32 {
        self.sheets.iter().filter(|s| &s.team_id == team).map(|s| s.goals).sum()
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

/// Finalized per-player record handed to persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerPerformance {
    pub player: PlayerToken,
    pub team_id: TeamId,
    pub position: Option<Position>,
    pub minutes_played: u8,
    /// 0-5, 0.5 단위
    pub overall_score: f32,
    pub scored_goal: u32,
    pub assist: u32,
    pub defense_action: u32,
    pub shots: u32,
    pub yellow_cards: u8,
    pub red_card: bool,
    pub attribute_deltas: BTreeMap<Attribute, f32>,
    /// 항상 0 이하
    pub freshness_delta: f32,
    pub satisfaction_delta: f32,
    pub team_won: bool,
    pub injured: bool,
    pub punished: bool,
    pub man_of_the_match: bool,
}

impl PlayerPerformance {
    pub fn improved(&self) -> bool {
        self.attribute_deltas.values().any(|d| *d > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(token: &str, team: &str) -> PerformanceSheet {
        PerformanceSheet::new(PlayerToken::from(token), TeamId::from(team), Some(Position::Striker), true)
    }

    #[test]
    fn test_register_keeps_first_seen_order() {
        let mut book = PerformanceBook::new();
        book.register(sheet("a", "t1"));
        book.register(sheet("b", "t2"));
        book.register(sheet("a", "t2"));
        let order: Vec<_> = book.sheets().iter().map(|s| s.player.as_str()).collect();
        assert_eq!(order, vec!["a", "b"]);
        assert_eq!(book.get(&PlayerToken::from("a")).map(|s| s.team_id.0.as_str()), Some("t1"));
    }

    #[test]
    fn test_minutes_played_stops_at_red_card() {
        let mut s = sheet("a", "t1");
        assert_eq!(s.minutes_played(90), 90);
        s.sent_off_at = Some(63);
        assert_eq!(s.minutes_played(90), 63);
        let bench = PerformanceSheet::new(PlayerToken::from("b"), TeamId::from("t1"), None, false);
        assert_eq!(bench.minutes_played(120), 0);
    }

    #[test]
    fn test_goals_for_team() {
        let mut book = PerformanceBook::new();
        book.register(sheet("a", "t1"));
        book.register(sheet("b", "t1"));
        book.register(sheet("c", "t2"));
        book.get_mut(&PlayerToken::from("a")).unwrap().goals += 2;
        book.get_mut(&PlayerToken::from("b")).unwrap().goals += 1;
        assert_eq!(book.goals_for(&TeamId::from("t1")), 3);
        assert_eq!(book.goals_for(&TeamId::from("t2")), 0);
    }
}
