// ABOUTME: Entry point for the agentflow binary.
// ABOUTME: Parses CLI arguments, initializes tracing, and serves the editor or moves flow.json in and out of storage.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use agentflow_core::FlowState;
use agentflow_server::{AgentflowConfig, AppState, create_router};
use agentflow_store::{FlowStorage, export_to_file, import_from_file};
use anyhow::Context;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "agentflow", version, about = "Visual editor backend for agent flows")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the editor server (the default).
    Serve {
        /// Override AGENTFLOW_BIND.
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Write the stored flow to <out>/flow.json.
    Export {
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Validate a flow file and replace the stored flow with it.
    Import { file: PathBuf },
    /// Remove the stored flow so the next start is empty.
    Reset,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agentflow=debug,tower_http=debug".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = AgentflowConfig::from_env()?;
    let storage = FlowStorage::open(&config.home, config.storage_key.clone())
        .with_context(|| format!("failed to open storage under {}", config.home.display()))?;

    match cli.command.unwrap_or(Commands::Serve { bind: None }) {
        Commands::Serve { bind } => serve(config, storage, bind).await,
        Commands::Export { out } => {
            let document = storage.restore_on_startup()?.unwrap_or_default();
            let path = export_to_file(&out, &document)?;
            println!("{}", path.display());
            Ok(())
        }
        Commands::Import { file } => {
            let document = import_from_file(&file)
                .with_context(|| format!("{} is not a valid flow file", file.display()))?;
            storage.persist(&document)?;
            tracing::info!(
                agents = document.agents.len(),
                nodes = document.nodes.len(),
                edges = document.edges.len(),
                "replaced stored flow"
            );
            Ok(())
        }
        Commands::Reset => {
            storage.clear()?;
            tracing::info!(key = storage.key(), "removed stored flow");
            Ok(())
        }
    }
}

async fn serve(
    config: AgentflowConfig,
    storage: FlowStorage,
    bind: Option<SocketAddr>,
) -> anyhow::Result<()> {
    // A stored flow that does not parse stops startup so it is never overwritten.
    let restored = storage.restore_on_startup().with_context(|| {
        format!(
            "stored flow under key {} is malformed; fix or remove it before starting",
            storage.key()
        )
    })?;
    let initial = restored.map(FlowState::from_document).unwrap_or_default();

    let state = Arc::new(AppState::new(initial, storage));
    let app = create_router(state);

    let addr = bind.unwrap_or(config.bind);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("agentflow listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
