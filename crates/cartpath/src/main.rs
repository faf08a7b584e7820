mod cli;

use cartpath_engine::Orchestrator;
use cartpath_engine::backend::Backend;
use cartpath_wd::WebDriverBackend;
use clap::Parser;
use cli::{Cli, Command};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    // Logs go to stderr; stdout carries the run report.
    let default_filter = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = cli::load_config(args.config.as_ref()).await?;

    match args.command {
        Command::List { sources } => {
            cli::apply_overrides(&mut config, &sources, false);
            let fixtures = cli::load_fixtures(&config).await?;
            let registry = cli::load_registry(&config).await?;
            for line in cli::describe(&registry, &fixtures) {
                println!("{}", line);
            }
        }
        Command::Run {
            scenario,
            seed,
            webdriver_url,
            visible,
            poll,
            sources,
        } => {
            cli::apply_overrides(&mut config, &sources, poll);
            let fixtures = cli::load_fixtures(&config).await?;
            let registry = cli::load_registry(&config).await?;
            cli::preflight(&registry, &fixtures, &scenario)?;

            let mut backend = if visible {
                WebDriverBackend::new(webdriver_url)
            } else {
                WebDriverBackend::new_headless(webdriver_url)
            };
            backend.launch().await?;
            info!("Backend ready.");

            let result = Orchestrator::new(&mut backend, &registry, &fixtures, &config)
                .run(&scenario, seed)
                .await;
            let closed = backend.close().await;

            match cli::finish_run(result, closed) {
                Ok(report) => println!("{}", serde_json::to_string_pretty(&report)?),
                Err(e) => {
                    error!(scenario = %scenario, "Scenario run failed: {}", e);
                    return Err(e.into());
                }
            }
        }
    }

    Ok(())
}
