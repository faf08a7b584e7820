use anyhow::Context;
use cartpath_engine::backend::BackendError;
use cartpath_engine::config::{CartpathConfig, ConfigLoader, SettleMode};
use cartpath_engine::fixture::{FixtureLoader, FixtureStore};
use cartpath_engine::scenario::{ScenarioLoader, ScenarioRegistry};
use cartpath_engine::{RunError, RunReport, prepare};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "cartpath", version, about = "Add-to-cart journeys against a live storefront")]
pub struct Cli {
    /// Config file (defaults to ./cartpath.yaml, then ~/.cartpath/config.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one scenario to its final click
    Run {
        /// Scenario name; also selects the fixture
        scenario: String,

        /// Replay a previous run's choices
        #[arg(long)]
        seed: Option<u64>,

        /// WebDriver server to drive
        #[arg(long, env = "WEBDRIVER_URL", default_value = "http://localhost:4444")]
        webdriver_url: String,

        /// Show the browser window
        #[arg(long)]
        visible: bool,

        /// Poll for each awaited role instead of sleeping fixed delays
        #[arg(long)]
        poll: bool,

        #[command(flatten)]
        sources: Sources,
    },
    /// List known scenarios and whether a fixture backs them
    List {
        #[command(flatten)]
        sources: Sources,
    },
}

#[derive(Args, Debug, Default)]
pub struct Sources {
    /// Storefront base URL
    #[arg(long, env = "CARTPATH_BASE_URL")]
    pub base_url: Option<String>,

    /// Fixture directory
    #[arg(long)]
    pub fixtures: Option<PathBuf>,

    /// Extra scenario definitions directory
    #[arg(long)]
    pub scenarios: Option<PathBuf>,
}

pub async fn load_config(path: Option<&PathBuf>) -> anyhow::Result<CartpathConfig> {
    match path {
        Some(path) => ConfigLoader::load_from(path)
            .await
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(ConfigLoader::load_default().await?),
    }
}

/// Command-line values win over the config file.
pub fn apply_overrides(config: &mut CartpathConfig, sources: &Sources, poll: bool) {
    if let Some(base_url) = &sources.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(dir) = &sources.fixtures {
        config.fixtures_dir = dir.clone();
    }
    if let Some(dir) = &sources.scenarios {
        config.scenarios_dir = Some(dir.clone());
    }
    if poll {
        config.settle.mode = SettleMode::Poll;
    }
}

pub async fn load_fixtures(config: &CartpathConfig) -> anyhow::Result<FixtureStore> {
    let store = FixtureLoader::load_dir(&config.fixtures_dir)
        .await
        .with_context(|| format!("loading fixtures from {}", config.fixtures_dir.display()))?;
    info!(count = store.len(), "Fixtures loaded");
    Ok(store)
}

pub async fn load_registry(config: &CartpathConfig) -> anyhow::Result<ScenarioRegistry> {
    let mut registry = ScenarioRegistry::with_builtins();
    if let Some(dir) = &config.scenarios_dir {
        let loaded = ScenarioLoader::load_dir(dir, &mut registry)
            .await
            .with_context(|| format!("loading scenarios from {}", dir.display()))?;
        info!(count = loaded, "Scenario definitions loaded");
    }
    Ok(registry)
}

/// Fail on an unknown or unusable scenario before a browser session exists.
pub fn preflight(
    registry: &ScenarioRegistry,
    fixtures: &FixtureStore,
    scenario: &str,
) -> Result<(), RunError> {
    let (definition, _) = prepare(registry, fixtures, scenario)?;
    info!(scenario, stages = definition.stages.len(), "Scenario checked");
    Ok(())
}

/// Combine the run result with the outcome of closing the session. A failed
/// close is only logged; the run result is what gets reported.
pub fn finish_run(
    result: Result<RunReport, RunError>,
    closed: Result<(), BackendError>,
) -> Result<RunReport, RunError> {
    if let Err(e) = closed {
        warn!("Failed to close browser session: {}", e);
    }
    result
}

/// One line per scenario: name, stage count, fixture presence, description.
pub fn describe(registry: &ScenarioRegistry, fixtures: &FixtureStore) -> Vec<String> {
    registry
        .list()
        .into_iter()
        .map(|def| {
            let fixture = if fixtures.resolve(&def.name).is_ok() {
                "fixture"
            } else {
                "no fixture"
            };
            format!(
                "{:<24} {:>2} stages  {:<10}  {}",
                def.name,
                def.stages.len(),
                fixture,
                def.description.as_deref().unwrap_or("")
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartpath_engine::fixture::{Fixture, FixtureError};
    use cartpath_engine::protocol::Role;

    #[test]
    fn test_run_arguments() {
        let cli = Cli::try_parse_from([
            "cartpath",
            "-v",
            "run",
            "addToCartFromPDP",
            "--seed",
            "42",
            "--webdriver-url",
            "http://driver:9515",
            "--fixtures",
            "fx",
            "--poll",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Command::Run {
                scenario,
                seed,
                webdriver_url,
                poll,
                sources,
                ..
            } => {
                assert_eq!(scenario, "addToCartFromPDP");
                assert_eq!(seed, Some(42));
                assert_eq!(webdriver_url, "http://driver:9515");
                assert!(poll);
                assert_eq!(sources.fixtures, Some(PathBuf::from("fx")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_overrides_win() {
        let mut config = CartpathConfig::default();
        let sources = Sources {
            base_url: Some("https://shop.example.com".into()),
            fixtures: None,
            scenarios: Some(PathBuf::from("journeys")),
        };
        apply_overrides(&mut config, &sources, true);

        assert_eq!(config.base_url, "https://shop.example.com");
        assert_eq!(config.fixtures_dir, PathBuf::from("./fixtures"));
        assert_eq!(config.scenarios_dir, Some(PathBuf::from("journeys")));
        assert_eq!(config.settle.mode, SettleMode::Poll);
    }

    #[test]
    fn test_describe_flags_missing_fixtures() {
        let registry = ScenarioRegistry::with_builtins();
        let mut fixtures = FixtureStore::new();
        fixtures.insert("addToCart", Fixture::default());

        let lines = describe(&registry, &fixtures);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("addToCart "));
        assert!(lines[0].contains(" fixture "));
        assert!(lines[1].contains("no fixture"));
    }

    #[test]
    fn test_preflight_reports_unknown_scenario() {
        let registry = ScenarioRegistry::with_builtins();
        let mut fixtures = FixtureStore::new();
        fixtures.insert("addToCart", Fixture::default());

        let err = preflight(&registry, &fixtures, "noSuchScenario").unwrap_err();
        assert!(matches!(
            err,
            RunError::Fixture(FixtureError::FixtureNotFound(ref name)) if name == "noSuchScenario"
        ));

        // the listing fixture exists but has none of the roles it needs
        let err = preflight(&registry, &fixtures, "addToCart").unwrap_err();
        assert!(matches!(
            err,
            RunError::Fixture(FixtureError::MissingLocator { .. })
        ));
    }

    #[test]
    fn test_preflight_accepts_complete_fixture() {
        let registry = ScenarioRegistry::with_builtins();
        let mut fixtures = FixtureStore::new();
        fixtures.insert(
            "addToCart",
            Fixture::default()
                .with_locator(Role::ProductSummary, ".summary")
                .with_locator(Role::AddToCartButton, ".buy")
                .with_locator(Role::CartButton, ".minicart"),
        );

        assert!(preflight(&registry, &fixtures, "addToCart").is_ok());
    }

    #[test]
    fn test_run_error_survives_failed_close() {
        let run: Result<RunReport, RunError> = Err(RunError::EmptyCandidateSet {
            stage: 2,
            role: Role::ProductSummary,
            locator: ".summary".into(),
        });

        let err = finish_run(run, Err(BackendError::ConnectionLost)).unwrap_err();
        assert!(matches!(err, RunError::EmptyCandidateSet { stage: 2, .. }));
    }

    #[test]
    fn test_report_survives_failed_close() {
        let report = RunReport {
            scenario: "addToCart".into(),
            seed: 7,
            outcomes: vec![],
        };

        let kept = finish_run(Ok(report), Err(BackendError::ConnectionLost)).unwrap();
        assert_eq!(kept.seed, 7);
    }

    #[tokio::test]
    async fn test_registry_merges_scenario_dir() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(
            dir.path().join("pdp.yaml"),
            "name: addToCartOnPDP\nstages:\n  - stage: navigate\n    url: /p\n  - stage: click\n    role: addToCartButton\n",
        )
        .await
        .unwrap();
        let config = CartpathConfig {
            scenarios_dir: Some(dir.path().to_path_buf()),
            ..CartpathConfig::default()
        };

        let registry = load_registry(&config).await.unwrap();
        assert!(registry.get("addToCartOnPDP").is_some());
        assert!(registry.get("addToCart").is_some());
    }
}
