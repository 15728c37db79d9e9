//! # Simulation Configuration
//!
//! 모든 튜닝 상수를 한 곳에서 관리한다. 엔진 로직을 건드리지 않고 밸런스를 조정할 수 있도록
//! 가중치, 임계값, 확률은 전부 여기 있는 필드다.
//!
//! ## 사용법
//! ```rust
//! use sm_core::engine::config::SimConfig;
//!
//! let config = SimConfig::default();
//! let low_fidelity = SimConfig::low_fidelity();
//! assert!(config.validate().is_ok());
//! ```

mod competition_config;
mod grading_config;
mod kind_factors;
mod match_config;
mod resolution_config;
mod training_config;

pub use competition_config::{KickModelConfig, KnockoutConfig, RaceConfig};
pub use grading_config::{CategoryFactors, CountRule, GradingConfig};
pub use kind_factors::{KindFactors, MatchKind, MatchKindTable};
pub use match_config::{
    EventConfig, ExtraTimeConfig, GoalChance, OutcomeModelKind, PoissonConfig, ZoneModelConfig, ZoneTable,
    SUPPORTED_SHAPES,
};
pub use resolution_config::{
    FreshnessConfig, GrowthConfig, MotmWeights, ResolutionConfig, SatisfactionConfig, ScoreConfig, ShootoutConfig,
};
pub use training_config::{TrainingConfig, UpkeepConfig};

use std::path::Path;
use std::{env, fs};

use serde::{Deserialize, Serialize};

use crate::engine::match_sim::zone::Zone;
use crate::error::{EngineError, Result};

/// Environment variable naming a JSON or YAML config file.
pub const CONFIG_PATH_ENV: &str = "SM_CONFIG_PATH";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub outcome_model: OutcomeModelKind,
    /// 정규 시간 길이 (분)
    pub regular_minutes: u8,
    /// 연장 각 기간 길이 (분)
    pub extra_time_minutes: u8,
    pub grading: GradingConfig,
    pub zone_model: ZoneModelConfig,
    pub poisson: PoissonConfig,
    pub extra_time: ExtraTimeConfig,
    pub events: EventConfig,
    pub resolution: ResolutionConfig,
    pub race_dash100: RaceConfig,
    pub race_run5k: RaceConfig,
    pub knockout: KnockoutConfig,
    pub training: TrainingConfig,
    pub upkeep: UpkeepConfig,
    pub match_kinds: MatchKindTable,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            outcome_model: OutcomeModelKind::Zone,
            regular_minutes: 90,
            extra_time_minutes: 15,
            grading: GradingConfig::default(),
            zone_model: ZoneModelConfig::default(),
            poisson: PoissonConfig::default(),
            extra_time: ExtraTimeConfig::default(),
            events: EventConfig::default(),
            resolution: ResolutionConfig::default(),
            race_dash100: RaceConfig::dash100(),
            race_run5k: RaceConfig::run5k(),
            knockout: KnockoutConfig::default(),
            training: TrainingConfig::default(),
            upkeep: UpkeepConfig::default(),
            match_kinds: MatchKindTable::default(),
        }
    }
}

impl SimConfig {
    /// 존 모델 (기본)
    pub fn realistic() -> Self {
        Self::default()
    }

    /// 저충실도 대회용: 포아송 득점 모델
    pub fn low_fidelity() -> Self {
        Self { outcome_model: OutcomeModelKind::Poisson, ..Self::default() }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| EngineError::Config(format!("JSON: {e}")))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| EngineError::Config(format!("YAML: {e}")))
    }

    /// `.yaml` / `.yml` 은 YAML, 나머지는 JSON 으로 읽고 검증한다.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("failed to read {}: {e}", path.display())))?;
        let is_yaml = matches!(path.extension().and_then(|e| e.to_str()), Some("yaml") | Some("yml"));
        let config = if is_yaml { Self::from_yaml(&content)? } else { Self::from_json(&content)? };
        config.validate()?;
        Ok(config)
    }

    /// `SM_CONFIG_PATH` 가 없거나 비어 있으면 `None`.
    pub fn from_env() -> Result<Option<Self>> {
        let Ok(path) = env::var(CONFIG_PATH_ENV) else {
            return Ok(None);
        };
        let path = path.trim();
        if path.is_empty() {
            return Ok(None);
        }
        let config = Self::from_path(path)
            .map_err(|e| EngineError::Config(format!("{CONFIG_PATH_ENV}='{path}': {e}")))?;
        log::info!("loaded simulation config from {path}");
        Ok(Some(config))
    }

    /// 환경 변수 설정이 있으면 그것을, 없으면 기본값
    pub fn from_env_or_default() -> Result<Self> {
        Ok(Self::from_env()?.unwrap_or_default())
    }

    pub fn validate(&self) -> Result<()> {
        let probabilities = [
            ("events.assist_probability", self.events.assist_probability),
            ("events.gk_save_probability", self.events.gk_save_probability),
            ("zone_model.foul_probability", self.zone_model.foul_probability),
            ("resolution.growth.extra_time_chance", self.resolution.growth.extra_time_chance),
            ("knockout.kick.base_save_probability", self.knockout.kick.base_save_probability),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(EngineError::Config(format!("{name} must be within [0, 1], got {value}")));
            }
        }

        if self.regular_minutes == 0 || self.extra_time_minutes == 0 {
            return Err(EngineError::Config("period lengths must be positive".into()));
        }
        if self.zone_model.attacks_per_90 == 0 {
            return Err(EngineError::Config("zone_model.attacks_per_90 must be positive".into()));
        }
        if self.zone_model.danger_baseline.iter().any(|p| *p < 0.0)
            || self.zone_model.danger_baseline.iter().sum::<f32>() <= 0.0
        {
            return Err(EngineError::Config("zone_model.danger_baseline must be a non-negative distribution".into()));
        }
        if self.zone_model.table_for(&self.zone_model.default_shape).is_none() {
            return Err(EngineError::Config(format!(
                "no zone table for default shape {}",
                self.zone_model.default_shape
            )));
        }
        for (shape, table) in &self.zone_model.zone_tables {
            if table.zones.len() != Zone::ALL.len() {
                return Err(EngineError::Config(format!(
                    "zone table {shape} has {} zones, expected {}",
                    table.zones.len(),
                    Zone::ALL.len()
                )));
            }
        }
        if self.events.assist_lead_seconds.0 > self.events.assist_lead_seconds.1 {
            return Err(EngineError::Config("events.assist_lead_seconds must be (min, max)".into()));
        }

        for (name, race) in [("race_dash100", &self.race_dash100), ("race_run5k", &self.race_run5k)] {
            if race.max_time <= race.min_time {
                return Err(EngineError::Config(format!("{name}: max_time must exceed min_time")));
            }
            if race.dnf_time <= race.max_time + race.random_range {
                return Err(EngineError::Config(format!("{name}: dnf_time must sort after every finish")));
            }
            if race.weights.is_empty() {
                return Err(EngineError::Config(format!("{name}: weights must not be empty")));
            }
        }

        if self.knockout.shots_per_round == 0 || self.knockout.max_rounds == 0 {
            return Err(EngineError::Config("knockout rounds and shots must be positive".into()));
        }
        if self.resolution.shootout.max_rounds < self.resolution.shootout.kicks_per_side {
            return Err(EngineError::Config("shootout.max_rounds must cover the regular kicks".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = SimConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.outcome_model, OutcomeModelKind::Zone);
        assert_eq!(cfg.zone_model.attacks_per_90, 200);
        assert!((cfg.events.assist_probability - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_low_fidelity_uses_poisson() {
        assert_eq!(SimConfig::low_fidelity().outcome_model, OutcomeModelKind::Poisson);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg = SimConfig::from_json(r#"{"events": {"assist_probability": 0.5}}"#).unwrap();
        assert!((cfg.events.assist_probability - 0.5).abs() < 1e-6);
        assert!((cfg.events.gk_save_probability - 0.4).abs() < 1e-6);
        assert_eq!(cfg.race_run5k.min_time, 840.0);
    }

    #[test]
    fn test_validate_rejects_bad_probability() {
        let mut cfg = SimConfig::default();
        cfg.events.gk_save_probability = 1.5;
        assert!(matches!(cfg.validate(), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_dnf_inside_finish_range() {
        let mut cfg = SimConfig::default();
        cfg.race_dash100.dnf_time = 12.0;
        assert!(cfg.validate().is_err());

        // 최대 기록 + 노이즈와 같으면 완주자와 겹칠 수 있다
        let mut cfg = SimConfig::default();
        cfg.race_run5k.dnf_time = cfg.race_run5k.max_time + cfg.race_run5k.random_range;
        assert!(cfg.validate().is_err());
        cfg.race_run5k.dnf_time += 1.0;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_from_path_reads_yaml_and_json() {
        let dir = tempfile::tempdir().unwrap();

        let yaml_path = dir.path().join("sim.yaml");
        let mut f = fs::File::create(&yaml_path).unwrap();
        writeln!(f, "regular_minutes: 80\nknockout:\n  max_rounds: 6").unwrap();
        let cfg = SimConfig::from_path(&yaml_path).unwrap();
        assert_eq!(cfg.regular_minutes, 80);
        assert_eq!(cfg.knockout.max_rounds, 6);
        assert_eq!(cfg.knockout.shots_per_round, 5);

        let json_path = dir.path().join("sim.json");
        fs::write(&json_path, r#"{"outcome_model": "poisson"}"#).unwrap();
        let cfg = SimConfig::from_path(&json_path).unwrap();
        assert_eq!(cfg.outcome_model, OutcomeModelKind::Poisson);
    }

    #[test]
    fn test_from_path_reports_missing_file() {
        let err = SimConfig::from_path("/nonexistent/sim.json").unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }
}
