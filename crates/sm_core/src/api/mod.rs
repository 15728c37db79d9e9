pub mod budget;
pub mod memory;
pub mod repository;
pub mod service;

pub use budget::SimBudget;
pub use memory::{CompetitionEntry, FormationRecord, InMemoryStore, StoreFixture};
pub use repository::{PlayerRepository, ResultSink};
pub use service::{CompetitionService, MatchRequest, MatchService};
