use std::time::{Duration, Instant};

use crate::error::{EngineError, Result};

/// Wall-clock budget for one simulation.
///
/// 초과하면 재시도 없이 중단한다. `None` 이면 무제한.
#[derive(Debug, Clone)]
pub struct SimBudget {
    start_time: Instant,
    max_wall_ms: Option<u64>,
}

impl Default for SimBudget {
    fn default() -> Self {
        Self::unlimited()
    }
}

impl SimBudget {
    pub fn new(max_wall_ms: u64) -> Self {
        Self { start_time: Instant::now(), max_wall_ms: Some(max_wall_ms) }
    }

    pub fn unlimited() -> Self {
        Self { start_time: Instant::now(), max_wall_ms: None }
    }

    pub fn from_option(max_wall_ms: Option<u64>) -> Self {
        Self { start_time: Instant::now(), max_wall_ms }
    }

    /// Reset the budget timer (for reuse)
    pub fn reset(&mut self) {
        self.start_time = Instant::now();
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    #[inline]
    pub fn is_timeout(&self) -> bool {
        match self.max_wall_ms {
            Some(ms) => self.start_time.elapsed() > Duration::from_millis(ms),
            None => false,
        }
    }

    pub fn check(&self) -> Result<()> {
        match self.max_wall_ms {
            Some(budget_ms) if self.is_timeout() => {
                log::warn!("simulation aborted: {}ms > {budget_ms}ms", self.elapsed_ms());
                Err(EngineError::BudgetExceeded { budget_ms })
            }
            _ => Ok(()),
        }
    }
}
