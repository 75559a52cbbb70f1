use anyhow::{Context, anyhow, bail};
use citycast_core::{
    CityPanel, Config, Providers, SearchOrchestrator, SearchOutcome, orchestrator::SearchFailure,
};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Select, Text};
use tracing::{debug, info};

use crate::render;

const QUIT: &str = ":q";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "citycast", version, about = "City weather search and watchlist")]
pub struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show current, hourly and 7-day weather for a place.
    Show {
        /// Place name, e.g. "Paris" or "Tokyo".
        place: String,
    },

    /// Search repeatedly, keeping a watchlist of the last three cities.
    Interactive,

    /// Current conditions for the configured panel cities.
    Panel {
        /// Keep refreshing until Ctrl-C.
        #[arg(long)]
        watch: bool,
    },

    /// Print the effective configuration.
    Config {
        /// Write the effective configuration to the config file.
        #[arg(long)]
        write: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;
        debug!(?config, "Loaded configuration");

        match self.command {
            Command::Show { place } => show(&config, &place, self.verbose).await,
            Command::Interactive => interactive(&config, self.verbose).await,
            Command::Panel { watch } => panel(&config, watch).await,
            Command::Config { write } => print_config(&config, write),
        }
    }
}

async fn show(config: &Config, place: &str, verbose: bool) -> anyhow::Result<()> {
    let orchestrator = SearchOrchestrator::from_config(config)?;

    match orchestrator.search(place).await {
        SearchOutcome::Completed(snapshot) => {
            println!("{}", render::Snapshot(&snapshot));
            Ok(())
        }
        SearchOutcome::Failed(failure) => Err(failure_error(&failure, verbose)),
        SearchOutcome::Ignored | SearchOutcome::Superseded => bail!("Please enter a place name"),
    }
}

async fn interactive(config: &Config, verbose: bool) -> anyhow::Result<()> {
    let orchestrator = SearchOrchestrator::from_config(config)?;

    println!("Loading weather for {}...", config.seed_query);
    orchestrator.initialize(&config.seed_query).await;
    print_state(&orchestrator, verbose);

    loop {
        let Some(input) = prompt_query().await? else {
            break;
        };

        let input = input.trim().to_string();
        if input == QUIT {
            break;
        }

        if input.is_empty() {
            let names = orchestrator
                .watchlist()
                .into_iter()
                .map(|entry| entry.name)
                .collect();
            let Some(name) = prompt_city(names).await? else {
                continue;
            };
            orchestrator.select(&name).await;
        } else {
            orchestrator.search(&input).await;
        }

        print_state(&orchestrator, verbose);
    }

    info!("Leaving interactive mode");
    Ok(())
}

async fn panel(config: &Config, watch: bool) -> anyhow::Result<()> {
    let providers = Providers::from_config(config)?;
    let panel = CityPanel::new(providers.forecast, config.panel.cities.clone());

    if !watch {
        let readings = panel
            .refresh()
            .await
            .context("Failed to refresh city panel")?;
        println!("{}", render::PanelReadings(&readings));
        return Ok(());
    }

    let mut handle = panel.spawn(config.panel.refresh_interval());
    loop {
        tokio::select! {
            state = handle.changed() => match state {
                Some(state) => println!("{}", render::Panel(&state)),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(())
}

fn print_config(config: &Config, write: bool) -> anyhow::Result<()> {
    println!("# {}", Config::config_file_path()?.display());
    println!("{}", config.to_toml()?);

    if write {
        let path = config.save()?;
        println!("Configuration written to {}", path.display());
    }

    Ok(())
}

fn print_state(orchestrator: &SearchOrchestrator, verbose: bool) {
    let state = orchestrator.state();

    if let Some(failure) = &state.error {
        println!("{}", failure_error(failure, verbose));
    }
    match &state.snapshot {
        Some(snapshot) => println!("{}", render::Snapshot(snapshot)),
        None => println!("No weather to show. Try another search."),
    }
    println!("{}", render::Watchlist(&orchestrator.watchlist()));
}

fn failure_error(failure: &SearchFailure, verbose: bool) -> anyhow::Error {
    if verbose {
        anyhow!("Error: {} ({})", failure.message, failure.detail)
    } else {
        anyhow!("Error: {}", failure.message)
    }
}

/// `None` when the user cancels the prompt.
async fn prompt_query() -> anyhow::Result<Option<String>> {
    let answer = tokio::task::spawn_blocking(|| {
        Text::new("Search a city:")
            .with_help_message("empty input picks from the watchlist, :q quits")
            .prompt()
    })
    .await?;

    cancellable(answer)
}

async fn prompt_city(names: Vec<String>) -> anyhow::Result<Option<String>> {
    if names.is_empty() {
        return Ok(None);
    }

    let prompt = tokio::task::spawn_blocking(move || Select::new("Watchlist:", names).prompt());
    cancellable(prompt.await?)
}

fn cancellable(answer: Result<String, InquireError>) -> anyhow::Result<Option<String>> {
    match answer {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e).context("Failed to read input"),
    }
}
