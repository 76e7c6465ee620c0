use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use phlam_channels::DiscordBot;
use phlam_core::{Orchestrator, SearchGate};
use phlam_features::{ExchangeClient, FeatureSet, LotteryClient, PriceClient, WeatherClient};
use phlam_memory::MemoryStore;
use phlam_provider::{CompletionBackend, GoogleSearch, OpenAiResponses, WebSearch};
use phlam_schema::config::{load_config, MainConfig};

const STORE_OPEN_ATTEMPTS: u32 = 3;
const STORE_OPEN_BACKOFF: Duration = Duration::from_secs(2);

#[derive(Parser)]
#[command(name = "phlam", version, about = "Thai Discord chat assistant")]
struct Cli {
    #[arg(long, global = true, default_value = "phlam.yaml", help = "Path to the config file")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Connect to Discord and serve the configured channel")]
    Start,
    #[command(about = "Check the config file and exit")]
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Validate => {
            load_checked_config(&cli.config)?;
            println!("config ok: {}", cli.config.display());
            Ok(())
        }
        Commands::Start => start(&cli.config).await,
    }
}

fn load_checked_config(path: &Path) -> Result<MainConfig> {
    let mut config = load_config(path)?;
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

async fn start(path: &Path) -> Result<()> {
    let config = load_checked_config(path)?;

    let memory = open_store_with_retry(&config.memory.db_path).await?;

    let backend: Arc<dyn CompletionBackend> = Arc::new(OpenAiResponses::new(
        config.openai.api_key.clone(),
        config.openai.api_base.clone(),
    ));
    let search: Arc<dyn WebSearch> = Arc::new(GoogleSearch::new(
        config.search.api_key.clone(),
        config.search.cse_id.clone(),
        config.search.api_base.clone(),
    ));
    let weather = WeatherClient::new(config.features.weather_base.clone());

    let gate = SearchGate::new(backend.clone(), config.openai.model.clone());
    let orchestrator = Orchestrator::new(
        backend,
        gate,
        search.clone(),
        memory.clone(),
        config.openai.model.clone(),
    )
    .with_weather(Arc::new(weather.clone()));

    let features = FeatureSet::new(
        PriceClient::new(config.features.prices_base.clone()),
        LotteryClient::new(config.features.lottery_base.clone()),
        ExchangeClient::new(config.features.exchange_base.clone()),
        search,
        weather,
    );

    tracing::info!(app = %config.app.name, env = %config.app.env, "starting discord bot");
    let bot = DiscordBot::new(
        config.discord.token,
        config.discord.channel_id,
        features,
        orchestrator,
        memory,
    );
    bot.run().await
}

async fn open_store_with_retry(db_path: &str) -> Result<MemoryStore> {
    let mut last_err = None;
    for attempt in 1..=STORE_OPEN_ATTEMPTS {
        match MemoryStore::open(db_path) {
            Ok(store) => return Ok(store),
            Err(err) => {
                tracing::warn!(attempt, "memory store open failed: {err}");
                last_err = Some(err);
                if attempt < STORE_OPEN_ATTEMPTS {
                    tokio::time::sleep(STORE_OPEN_BACKOFF).await;
                }
            }
        }
    }
    Err(last_err
        .unwrap_or_else(|| anyhow!("memory store open failed"))
        .context(format!("could not open memory store at {db_path}")))
}
