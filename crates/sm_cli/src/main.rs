//! Sports Manager CLI
//!
//! JSON 픽스처를 메모리 저장소에 올리고 경기 / 대회 / 보정 배치를 돌려 결과를 JSON 으로 출력한다.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use sm_core::api::{CompetitionService, InMemoryStore, MatchRequest, MatchService};
use sm_core::calibration::run_batch;
use sm_core::engine::config::{MatchKind, OutcomeModelKind, SimConfig};
use sm_core::models::TeamId;

#[derive(Parser)]
#[command(name = "sm")]
#[command(about = "Simulate matches and competitions from a JSON fixture", long_about = None)]
struct Cli {
    /// Config file (JSON or YAML). Falls back to SM_CONFIG_PATH, then built-in defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use the Poisson outcome model
    #[arg(long, global = true, default_value = "false")]
    low_fidelity: bool,

    /// Debug logging
    #[arg(short, long, global = true, default_value = "false")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one match and persist it into the fixture store
    Match {
        /// Store fixture (players, formations, competitions)
        #[arg(long)]
        fixture: PathBuf,

        #[arg(long)]
        home: String,

        #[arg(long)]
        away: String,

        #[arg(long, default_value = "match-1")]
        match_id: String,

        /// No draws: extra time, then penalties
        #[arg(long, default_value = "false")]
        must_win: bool,

        /// league | friendly | cup
        #[arg(long, default_value = "league")]
        kind: String,

        /// Explicit seed (default: derived from base seed and match id)
        #[arg(long)]
        seed: Option<u64>,

        #[arg(long, default_value = "0")]
        base_seed: u64,

        /// Wall-clock budget in milliseconds
        #[arg(long)]
        budget_ms: Option<u64>,
    },

    /// Run a race or a penalty knockout registered in the fixture
    Compete {
        #[arg(long)]
        fixture: PathBuf,

        /// Competition id (kind comes from the fixture)
        #[arg(long)]
        id: String,

        #[arg(long, default_value = "0")]
        base_seed: u64,

        #[arg(long)]
        budget_ms: Option<u64>,
    },

    /// Simulate the same pairing many times and summarize goals
    Calibrate {
        #[arg(long)]
        fixture: PathBuf,

        #[arg(long)]
        home: String,

        #[arg(long)]
        away: String,

        /// Number of matches
        #[arg(short, long, default_value = "1000")]
        n: usize,

        #[arg(long, default_value = "0")]
        base_seed: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let config = load_config(cli.config.as_deref(), cli.low_fidelity)?;

    match cli.command {
        Commands::Match { fixture, home, away, match_id, must_win, kind, seed, base_seed, budget_ms } => {
            let store = load_store(&fixture, &config)?;
            let mut request = MatchRequest::new(match_id, home.as_str(), away.as_str()).must_win(must_win);
            request.kind = parse_kind(&kind)?;
            request.seed = seed;

            let report = MatchService::new(&store, &store, config)
                .with_base_seed(base_seed)
                .with_budget_ms(budget_ms)
                .play(&request)
                .context("match simulation failed")?;
            print_json(&report)?;
        }

        Commands::Compete { fixture, id, base_seed, budget_ms } => {
            let store = load_store(&fixture, &config)?;
            let kind = store.competition_kind(&id)?;
            let outcome = CompetitionService::new(&store, &store, config)
                .with_base_seed(base_seed)
                .with_budget_ms(budget_ms)
                .run(&id, kind)
                .with_context(|| format!("competition {id} failed"))?;
            print_json(&outcome)?;
        }

        Commands::Calibrate { fixture, home, away, n, base_seed } => {
            let store = load_store(&fixture, &config)?;
            let service = MatchService::new(&store, &store, config.clone());
            let home = service.load_lineup(&TeamId::from(home.as_str()))?;
            let away = service.load_lineup(&TeamId::from(away.as_str()))?;
            let summary = run_batch(&home, &away, &config, base_seed, n)?;
            print_json(&summary)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>, low_fidelity: bool) -> Result<SimConfig> {
    let mut config = match path {
        Some(path) => SimConfig::from_path(path).with_context(|| format!("loading {}", path.display()))?,
        None => SimConfig::from_env_or_default()?,
    };
    if low_fidelity {
        config.outcome_model = OutcomeModelKind::Poisson;
    }
    Ok(config)
}

/// 대회 상대(최고 골키퍼 / 키커) 선정도 설정의 킥 모델을 따른다.
fn load_store(path: &Path, config: &SimConfig) -> Result<InMemoryStore> {
    let store = InMemoryStore::from_path(path).with_context(|| format!("loading fixture {}", path.display()))?;
    Ok(store.with_kick_model(config.knockout.kick.clone()))
}

fn parse_kind(raw: &str) -> Result<MatchKind> {
    match raw.to_ascii_lowercase().as_str() {
        "league" => Ok(MatchKind::League),
        "friendly" => Ok(MatchKind::Friendly),
        "cup" => Ok(MatchKind::Cup),
        other => bail!("unknown match kind: {other}"),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sm_core::api::PlayerRepository;
    use std::io::Write;

    #[test]
    fn test_parse_kind() {
        assert_eq!(parse_kind("Cup").unwrap(), MatchKind::Cup);
        assert!(parse_kind("exhibition").is_err());
    }

    #[test]
    fn test_load_store_from_fixture_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"players": [{{"token": "p1", "team_id": "t1"}}], "competitions": {{"c1": {{"kind": "run5k", "participants": ["p1"]}}}}}}"#
        )
        .unwrap();
        let store = load_store(file.path(), &SimConfig::default()).unwrap();
        assert_eq!(store.get_team_players(&TeamId::from("t1")).unwrap().len(), 1);
        assert!(store.competition_kind("c1").is_ok());
    }

    #[test]
    fn test_low_fidelity_flag_switches_outcome_model() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"regular_minutes": 60}}"#).unwrap();
        let config = load_config(Some(file.path()), true).unwrap();
        assert_eq!(config.outcome_model, OutcomeModelKind::Poisson);
        assert_eq!(config.regular_minutes, 60);
    }
}
