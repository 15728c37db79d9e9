// 훈련 세션과 경기 사이 컨디션 관리

pub mod session;
pub mod upkeep;

pub use session::{run_session, train_player, TrainingIntensity, TrainingOutcome, TrainingType};
pub use upkeep::{idle_satisfaction_decay, recover_freshness, recovery_per_hour, UpkeepDelta};
