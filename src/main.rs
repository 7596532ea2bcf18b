//! dreamwork binary entry point.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use dreamwork::api::server::{start_server, AppState};
use dreamwork::config::{Config, StoreBackend};
use dreamwork::provider::{GenerationProvider, OpenAiProvider};
use dreamwork::store::{MemoryStore, RedisStore, SessionStore};
use dreamwork::workflow::SessionWorkflow;

#[derive(Parser)]
#[command(name = "dreamwork", version, about = "Dream reflection session API")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API server.
    Serve {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Override the bind address.
        #[arg(long)]
        bind: Option<String>,
        /// Override the listen port.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Load and print the resolved configuration, then exit.
    CheckConfig {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("dreamwork=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { config, bind, port } => serve(config, bind, port).await,
        Command::CheckConfig { config } => {
            let mut cfg = Config::load(config.as_deref())?;
            cfg.apply_env_overrides();
            println!("{}", toml::to_string_pretty(&cfg).context("render config")?);
            Ok(())
        }
    }
}

async fn serve(
    config_path: Option<PathBuf>,
    bind: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let mut config = Config::load(config_path.as_deref())?;
    config.apply_env_overrides();
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let store: Arc<dyn SessionStore> = match config.store.backend {
        StoreBackend::Memory => {
            warn!("using in-memory session store: sessions are lost on restart");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Redis => Arc::new(RedisStore::connect(&config.store.redis_url).await?),
    };

    let provider: Arc<dyn GenerationProvider> = Arc::new(
        OpenAiProvider::from_config(&config.provider).ok_or_else(|| {
            anyhow!("no generation API key: set provider.api_key or OPENAI_API_KEY")
        })?,
    );

    info!(
        store = store.name(),
        provider = provider.name(),
        ttl_secs = config.store.session_ttl().as_secs(),
        "starting dreamwork"
    );

    let workflow = SessionWorkflow::new(
        provider,
        store,
        config.store.session_ttl(),
        config.provider.max_output_tokens,
    );
    let state = AppState::new(Arc::new(workflow));

    start_server(&config.server, state)
        .await
        .map_err(|e| anyhow!("server error: {e}"))
}
