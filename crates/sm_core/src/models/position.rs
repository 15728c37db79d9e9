//! Positions and the fixed slot → position lookup table.
//!
//! 포메이션 그리드 좌표 (row, col):
//! - (0, 2): GK
//! - row 1: 양쪽 끝은 Winger(풀백 라인), 가운데 셋은 Centre-back
//! - row 2-3: 양쪽 끝은 Wide Midfielder, 가운데는 Central Midfielder
//! - row 4-5: 양쪽 끝은 Forward, 가운데는 Striker

use std::fmt;

use serde::{Deserialize, Serialize};

pub const GRID_COLUMNS: u8 = 5;
pub const GRID_ROWS: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
pub enum Position {
    #[serde(rename = "GK")]
    Goalkeeper,
    #[serde(rename = "Centre-back")]
    CentreBack,
    #[serde(rename = "Winger")]
    Winger,
    #[serde(rename = "Central Midfielder")]
    CentralMidfielder,
    #[serde(rename = "Wide Midfielder")]
    WideMidfielder,
    #[serde(rename = "Striker")]
    Striker,
    #[serde(rename = "Forward")]
    Forward,
}

/// Which team grade receives the primary personal grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleGroup {
    Defensive,
    Midfield,
    Attacking,
}

impl Position {
    pub fn label(self) -> &'static str {
        match self {
            Position::Goalkeeper => "GK",
            Position::CentreBack => "Centre-back",
            Position::Winger => "Winger",
            Position::CentralMidfielder => "Central Midfielder",
            Position::WideMidfielder => "Wide Midfielder",
            Position::Striker => "Striker",
            Position::Forward => "Forward",
        }
    }

    pub fn role_group(self) -> RoleGroup {
        match self {
            Position::Goalkeeper | Position::CentreBack | Position::Winger => RoleGroup::Defensive,
            Position::CentralMidfielder | Position::WideMidfielder => RoleGroup::Midfield,
            Position::Striker | Position::Forward => RoleGroup::Attacking,
        }
    }

    pub fn is_outfield(self) -> bool {
        self != Position::Goalkeeper
    }

    /// 포지션 수 보정에 쓰는 그룹 (GK 는 어디에도 속하지 않음)
    pub fn count_group(self) -> Option<RoleGroup> {
        if self.is_outfield() {
            Some(self.role_group())
        } else {
            None
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Centre,
    Right,
}

/// A formation grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Slot {
    pub row: u8,
    pub col: u8,
}

impl Slot {
    pub fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Fixed lookup table. Coordinates outside the table yield `None`.
    pub fn position(self) -> Option<Position> {
        let wide = self.col == 0 || self.col == GRID_COLUMNS - 1;
        match (self.row, self.col) {
            (0, 2) => Some(Position::Goalkeeper),
            (0, _) => None,
            (_, c) if c >= GRID_COLUMNS => None,
            (1, _) if wide => Some(Position::Winger),
            (1, _) => Some(Position::CentreBack),
            (2..=3, _) if wide => Some(Position::WideMidfielder),
            (2..=3, _) => Some(Position::CentralMidfielder),
            (4..=5, _) if wide => Some(Position::Forward),
            (4..=5, _) => Some(Position::Striker),
            _ => None,
        }
    }

    pub fn side(self) -> Side {
        match self.col {
            0 => Side::Left,
            c if c == GRID_COLUMNS - 1 => Side::Right,
            _ => Side::Centre,
        }
    }
}
