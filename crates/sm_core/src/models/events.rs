//! Match events and the time-ordered event log.

use serde::{Deserialize, Serialize};

use super::player::{PlayerToken, TeamId};

/// Closed set of event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
pub enum ActionKind {
    ShotAttempt,
    Goal,
    Assist,
    Block,
    GkSave,
    YellowCard,
    RedCard,
    PenaltyKick,
    PenaltyScore,
    PenaltyMiss,
    PeriodTransition,
}

impl ActionKind {
    /// Numeric action code used by the persistence layer's action table.
    pub fn action_code(self) -> u8 {
        match self {
            ActionKind::Goal => 1,
            ActionKind::Assist => 2,
            ActionKind::YellowCard => 4,
            ActionKind::RedCard => 5,
            ActionKind::ShotAttempt => 6,
            ActionKind::Block => 7,
            ActionKind::GkSave => 8,
            ActionKind::PeriodTransition => 9,
            ActionKind::PenaltyKick => 11,
            ActionKind::PenaltyScore => 14,
            ActionKind::PenaltyMiss => 15,
        }
    }

    /// 수비 기여로 집계되는 이벤트
    pub fn is_defense_action(self) -> bool {
        matches!(self, ActionKind::Block | ActionKind::GkSave)
    }
}

/// Who an event is attributed to. Serialized as the player token or `"system"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventActor {
    System,
    Player(PlayerToken),
}

const SYSTEM_ACTOR: &str = "system";

impl From<String> for EventActor {
    fn from(value: String) -> Self {
        if value == SYSTEM_ACTOR {
            EventActor::System
        } else {
            EventActor::Player(PlayerToken(value))
        }
    }
}

impl From<EventActor> for String {
    fn from(value: EventActor) -> Self {
        match value {
            EventActor::System => SYSTEM_ACTOR.to_string(),
            EventActor::Player(token) => token.0,
        }
    }
}

impl EventActor {
    pub fn player(&self) -> Option<&PlayerToken> {
        match self {
            EventActor::Player(token) => Some(token),
            EventActor::System => None,
        }
    }
}

/// Match clock position. Minutes run 0-120, seconds 0-59.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MatchClock {
    pub minute: u8,
    pub second: u8,
}

impl MatchClock {
    pub fn new(minute: u8, second: u8) -> Self {
        Self { minute, second: second.min(59) }
    }

    /// 초가 음수가 되면 분을 하나 되돌린다. 0:00 아래로는 내려가지 않는다.
    pub fn rewind(self, seconds: u8) -> Self {
        let total = self.minute as i32 * 60 + self.second as i32 - seconds as i32;
        let total = total.max(0);
        Self { minute: (total / 60) as u8, second: (total % 60) as u8 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEvent {
    pub minute: u8,
    pub second: u8,
    pub actor: EventActor,
    pub team_id: Option<TeamId>,
    pub action_kind: ActionKind,
    pub description: String,
}

impl MatchEvent {
    pub fn player(
        clock: MatchClock,
        token: PlayerToken,
        team: TeamId,
        kind: ActionKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            minute: clock.minute,
            second: clock.second,
            actor: EventActor::Player(token),
            team_id: Some(team),
            action_kind: kind,
            description: description.into(),
        }
    }

    pub fn system(clock: MatchClock, kind: ActionKind, description: impl Into<String>) -> Self {
        Self {
            minute: clock.minute,
            second: clock.second,
            actor: EventActor::System,
            team_id: None,
            action_kind: kind,
            description: description.into(),
        }
    }

    pub fn clock(&self) -> MatchClock {
        MatchClock { minute: self.minute, second: self.second }
    }
}

/// Event list kept sorted by `(minute, second)`; equal timestamps keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventLog {
    events: Vec<MatchEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: MatchEvent) {
        let key = event.clock();
        let idx = self.events.partition_point(|e| e.clock() <= key);
        self.events.insert(idx, event);
    }

    pub fn extend<I: IntoIterator<Item = MatchEvent>>(&mut self, events: I) {
        for event in events {
            self.push(event);
        }
    }

    pub fn events(&self) -> &[MatchEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn count(&self, kind: ActionKind) -> usize {
        self.events.iter().filter(|e| e.action_kind == kind).count()
    }

    pub fn into_vec(self) -> Vec<MatchEvent> {
        self.events
    }
}
