use std::fmt;

use serde::{Deserialize, Serialize};

use super::attributes::{Attribute, AttributeMap};
use crate::error::Result;

/// Opaque player identity handed out by the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerToken(pub String);

impl PlayerToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerToken {
    fn from(value: &str) -> Self {
        PlayerToken(value.to_string())
    }
}

impl From<String> for PlayerToken {
    fn from(value: String) -> Self {
        PlayerToken(value)
    }
}

/// Team identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub String);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TeamId {
    fn from(value: &str) -> Self {
        TeamId(value.to_string())
    }
}

/// 선수 레코드 (능력치 + 동적 상태)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub token: PlayerToken,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub team_id: Option<TeamId>,
    #[serde(default)]
    pub attributes: AttributeMap,
}

impl Player {
    pub fn new(token: impl Into<PlayerToken>, name: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            name: name.into(),
            team_id: None,
            attributes: AttributeMap::new(),
        }
    }

    pub fn with_team(mut self, team: impl Into<TeamId>) -> Self {
        self.team_id = Some(team.into());
        self
    }

    pub fn with_attribute(mut self, attr: Attribute, value: f32) -> Self {
        self.attributes.set(attr, value);
        self
    }

    pub fn with_attributes(mut self, values: &[(Attribute, f32)]) -> Self {
        for (attr, value) in values {
            self.attributes.set(*attr, *value);
        }
        self
    }

    /// 표시용 이름. 이름이 비어 있으면 토큰을 쓴다.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            self.token.as_str()
        } else {
            &self.name
        }
    }

    pub fn attr(&self, attr: Attribute) -> f32 {
        self.attributes.value_or_default(attr)
    }

    pub fn freshness(&self) -> Result<f32> {
        self.attributes.require(Attribute::Freshness, &self.token)
    }

    pub fn endurance(&self) -> Result<f32> {
        self.attributes.require(Attribute::Endurance, &self.token)
    }
}
