//! Data model: players, formations, events, performances, competition results.

pub mod attributes;
pub mod competition;
pub mod events;
pub mod formation;
pub mod performance;
pub mod player;
pub mod position;

pub use attributes::{Attribute, AttributeMap, DEFAULT_ATTRIBUTE_VALUE};
pub use competition::{CompetitionDetail, CompetitionKind, CompetitionOutcome, CompetitionResult};
pub use events::{ActionKind, EventActor, EventLog, MatchClock, MatchEvent};
pub use formation::{Formation, FormationShape, Lineup, LineupEntry, MIN_OUTFIELD_PLAYERS};
pub use performance::{PerformanceBook, PerformanceSheet, PlayerPerformance};
pub use player::{Player, PlayerToken, TeamId};
pub use position::{Position, RoleGroup, Side, Slot};
