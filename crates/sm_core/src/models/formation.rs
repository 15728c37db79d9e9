//! Formation grid, resolved lineups and formation shape labels.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::player::{Player, PlayerToken, TeamId};
use super::position::{Position, RoleGroup, Side, Slot};
use crate::error::{EngineError, Result};

/// 경기 진행에 필요한 최소 필드 플레이어 수
pub const MIN_OUTFIELD_PLAYERS: usize = 2;

/// Starting XI upper bound.
pub const MAX_STARTERS: usize = 11;

/// Ordered grid of player tokens. `None` marks an empty slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Formation {
    pub rows: Vec<Vec<Option<PlayerToken>>>,
}

impl Formation {
    pub fn new(rows: Vec<Vec<Option<PlayerToken>>>) -> Self {
        Self { rows }
    }

    /// Build from `(slot, token)` pairs.
    pub fn from_slots<I, T>(slots: I) -> Self
    where
        I: IntoIterator<Item = (Slot, T)>,
        T: Into<PlayerToken>,
    {
        let mut rows: Vec<Vec<Option<PlayerToken>>> = Vec::new();
        for (slot, token) in slots {
            let (r, c) = (slot.row as usize, slot.col as usize);
            if rows.len() <= r {
                rows.resize(r + 1, Vec::new());
            }
            if rows[r].len() <= c {
                rows[r].resize(c + 1, None);
            }
            rows[r][c] = Some(token.into());
        }
        Self { rows }
    }

    /// 저장소의 JSON 문자열 포메이션 파싱.
    ///
    /// 작은따옴표 표기도 허용한다. `"0"`, `""`, `0`, `null` 은 빈 슬롯.
    pub fn parse(team: &TeamId, raw: &str) -> Result<Self> {
        let normalized = raw.replace('\'', "\"");
        let value: serde_json::Value =
            serde_json::from_str(&normalized).map_err(|e| EngineError::MalformedFormation {
                team: team.clone(),
                reason: e.to_string(),
            })?;

        let rows = value.as_array().ok_or_else(|| EngineError::MalformedFormation {
            team: team.clone(),
            reason: "top level is not a list of rows".to_string(),
        })?;

        let mut grid = Vec::with_capacity(rows.len());
        for row in rows {
            let cells = row.as_array().ok_or_else(|| EngineError::MalformedFormation {
                team: team.clone(),
                reason: "row is not a list".to_string(),
            })?;
            grid.push(cells.iter().map(parse_cell).collect());
        }
        Ok(Self { rows: grid })
    }

    /// Occupied slots in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = (Slot, &PlayerToken)> + '_ {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter().enumerate().filter_map(move |(c, cell)| {
                cell.as_ref().map(|token| (Slot::new(r as u8, c as u8), token))
            })
        })
    }
}

fn parse_cell(cell: &serde_json::Value) -> Option<PlayerToken> {
    match cell {
        serde_json::Value::String(s) => {
            let s = s.trim();
            if s.is_empty() || s == "0" {
                None
            } else {
                Some(PlayerToken(s.to_string()))
            }
        }
        serde_json::Value::Number(n) if n.as_i64() != Some(0) => Some(PlayerToken(n.to_string())),
        _ => None,
    }
}

/// A resolved starter: player record plus the slot-derived position.
#[derive(Debug, Clone, PartialEq)]
pub struct LineupEntry {
    pub player: Player,
    pub slot: Slot,
    pub position: Position,
}

impl LineupEntry {
    pub fn token(&self) -> &PlayerToken {
        &self.player.token
    }

    pub fn side(&self) -> Side {
        self.slot.side()
    }
}

/// Players on the pitch for one team, sorted by slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Lineup {
    pub team: TeamId,
    pub entries: Vec<LineupEntry>,
    /// 벤치 (출전하지 않은 선수). 만족도 -2 대상.
    pub bench: Vec<Player>,
}

impl Lineup {
    /// Resolve a formation through a player lookup.
    ///
    /// 조회 실패(NotFound)는 경고 후 해당 슬롯만 건너뛴다. 그 외 에러는 그대로 전파.
    pub fn resolve<F>(team: TeamId, formation: &Formation, mut lookup: F) -> Result<Self>
    where
        F: FnMut(&PlayerToken) -> Result<Player>,
    {
        let mut entries = Vec::new();
        for (slot, token) in formation.occupied() {
            let Some(position) = slot.position() else {
                log::debug!("team {team}: slot ({}, {}) outside slot table, ignored", slot.row, slot.col);
                continue;
            };
            if entries.len() >= MAX_STARTERS {
                log::warn!("team {team}: more than {MAX_STARTERS} starters, ignoring {token}");
                continue;
            }
            match lookup(token) {
                Ok(player) => entries.push(LineupEntry { player, slot, position }),
                Err(EngineError::NotFound { kind, id }) => {
                    log::warn!("team {team}: {kind} {id} not found, slot skipped");
                }
                Err(other) => return Err(other),
            }
        }
        Self::from_entries(team, entries)
    }

    /// Validates the outfield minimum and sorts by slot.
    pub fn from_entries(team: TeamId, mut entries: Vec<LineupEntry>) -> Result<Self> {
        entries.sort_by(|a, b| a.slot.cmp(&b.slot).then_with(|| a.player.token.cmp(&b.player.token)));
        let lineup = Self { team, entries, bench: Vec::new() };
        lineup.ensure_playable()?;
        Ok(lineup)
    }

    /// 필드 플레이어가 2명 미만이면 시뮬레이션 불가
    pub fn ensure_playable(&self) -> Result<()> {
        let outfield = self.entries.iter().filter(|e| e.position.is_outfield()).count();
        if outfield < MIN_OUTFIELD_PLAYERS {
            return Err(EngineError::InsufficientPlayers {
                team: self.team.clone(),
                found: outfield,
                required: MIN_OUTFIELD_PLAYERS,
            });
        }
        Ok(())
    }

    pub fn with_bench(mut self, bench: Vec<Player>) -> Self {
        self.bench = bench;
        self
    }

    pub fn goalkeeper(&self) -> Option<&LineupEntry> {
        self.entries.iter().find(|e| e.position == Position::Goalkeeper)
    }

    pub fn count(&self, group: RoleGroup) -> usize {
        self.entries.iter().filter(|e| e.position.count_group() == Some(group)).count()
    }

    pub fn shape(&self) -> FormationShape {
        FormationShape::from_counts(
            self.count(RoleGroup::Defensive),
            self.count(RoleGroup::Midfield),
            self.count(RoleGroup::Attacking),
        )
    }
}

/// "D-M-A" label such as `4-3-3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormationShape(pub String);

impl FormationShape {
    pub fn from_counts(defenders: usize, midfielders: usize, attackers: usize) -> Self {
        FormationShape(format!("{defenders}-{midfielders}-{attackers}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FormationShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
