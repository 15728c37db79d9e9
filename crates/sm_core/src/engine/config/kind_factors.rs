//! Match-kind factor table (league / friendly / cup).
//!
//! 값은 주입형. 기본값은 모두 1.0 이고 인자는 기본 델타에 곱해진다.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    #[default]
    League,
    Friendly,
    Cup,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KindFactors {
    pub satisfaction: f32,
    pub freshness: f32,
}

impl Default for KindFactors {
    fn default() -> Self {
        Self { satisfaction: 1.0, freshness: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchKindTable(BTreeMap<MatchKind, KindFactors>);

impl MatchKindTable {
    /// 등록되지 않은 종류는 1.0
    pub fn factors(&self, kind: MatchKind) -> KindFactors {
        self.0.get(&kind).copied().unwrap_or_default()
    }

    pub fn with(mut self, kind: MatchKind, factors: KindFactors) -> Self {
        self.0.insert(kind, factors);
        self
    }
}
